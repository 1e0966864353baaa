//! Wall-clock blending between the previous and current viewport.

use serde::{Deserialize, Serialize};

use crate::viewport::{Rect, Viewport};

/// Previous/current viewport pair and the timestamp (ms) the switch happened.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransition {
    previous: Option<Viewport>,
    current: Option<Viewport>,
    start_ms: f64,
}

impl ViewportTransition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `viewport` as current, shifting the old current into previous.
    pub fn set_viewport(&mut self, viewport: Viewport, now_ms: f64) {
        self.previous = self.current.take();
        self.current = Some(viewport);
        self.start_ms = now_ms;
    }

    #[inline]
    pub fn current(&self) -> Option<&Viewport> {
        self.current.as_ref()
    }

    #[inline]
    pub fn previous(&self) -> Option<&Viewport> {
        self.previous.as_ref()
    }

    #[inline]
    pub fn start_ms(&self) -> f64 {
        self.start_ms
    }

    /// Blend progress at `now_ms` for a transition lasting `duration_s`.
    /// Not clamped: a timestamp before the start yields a negative value.
    #[inline]
    pub fn alpha(&self, now_ms: f64, duration_s: f32) -> f32 {
        ((now_ms - self.start_ms) / 1000.0 / f64::from(duration_s)) as f32
    }

    /// Effective viewport to frame at `now_ms`, or `None` before any viewport
    /// has been installed.
    pub fn blended(&self, now_ms: f64, duration_s: f32) -> Option<Rect> {
        let current = self.current.as_ref()?.effective();
        let alpha = self.alpha(now_ms, duration_s);
        match &self.previous {
            Some(prev) if alpha < 1.0 => Some(prev.effective().lerp(&current, alpha)),
            _ => Some(current),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::ViewportPadding;

    fn vp(x: f32, y: f32, w: f32, h: f32) -> Viewport {
        Viewport::from_base(Rect::new(x, y, w, h), &ViewportPadding::default())
    }

    #[test]
    fn empty_transition_has_nothing_to_blend() {
        assert!(ViewportTransition::new().blended(0.0, 0.2).is_none());
    }

    #[test]
    fn first_viewport_is_used_verbatim() {
        let mut t = ViewportTransition::new();
        let a = vp(0.0, 0.0, 100.0, 100.0);
        t.set_viewport(a, 1000.0);
        assert!(t.previous().is_none());
        assert_eq!(t.blended(1000.0, 0.2), Some(a.effective()));
    }

    #[test]
    fn blends_linearly_between_previous_and_current() {
        let mut t = ViewportTransition::new();
        let a = vp(0.0, 0.0, 100.0, 100.0);
        let b = vp(100.0, 50.0, 300.0, 200.0);
        t.set_viewport(a, 0.0);
        t.set_viewport(b, 1000.0);
        assert_eq!(t.previous(), Some(&a));

        // alpha == 0
        assert_eq!(t.blended(1000.0, 0.25), Some(a.effective()));
        // alpha == 0.5
        let mid = t.blended(1125.0, 0.25).unwrap();
        let (ea, eb) = (a.effective(), b.effective());
        assert!((mid.x - (ea.x + eb.x) / 2.0).abs() < 1e-4);
        assert!((mid.width - (ea.width + eb.width) / 2.0).abs() < 1e-4);
        assert!((mid.height - (ea.height + eb.height) / 2.0).abs() < 1e-4);
        // alpha == 1 and beyond
        assert_eq!(t.blended(1250.0, 0.25), Some(eb));
        assert_eq!(t.blended(5000.0, 0.25), Some(eb));
    }

    #[test]
    fn regressing_timestamps_overshoot() {
        let mut t = ViewportTransition::new();
        t.set_viewport(vp(0.0, 0.0, 100.0, 100.0), 0.0);
        t.set_viewport(vp(100.0, 0.0, 100.0, 100.0), 1000.0);
        assert!(t.alpha(900.0, 0.2) < 0.0);
        let r = t.blended(900.0, 0.2).unwrap();
        // Moves away from the current viewport rather than clamping at previous.
        assert!(r.x < -10.0);
    }
}
