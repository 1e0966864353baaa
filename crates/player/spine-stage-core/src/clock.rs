//! Real-time clock and looping playhead.

use serde::{Deserialize, Serialize};

/// Loops past which a delta is reduced with a remainder instead of
/// repeated subtraction.
const MAX_SUBTRACTED_LOOPS: f32 = 16.0;

/// Advance `playhead` by `delta` and wrap it into `[0, duration]`.
///
/// Wrapping subtracts whole durations one at a time so the remainder carries
/// over exactly across loops; a final clamp removes floating-point residue.
/// Deltas spanning many loops are reduced with `rem_euclid` first, since
/// subtracting a small duration from a huge `f32` may not change it.
/// A zero duration pins the playhead at 0.
pub fn wrap_playhead(playhead: f32, delta: f32, duration: f32) -> f32 {
    let mut t = playhead + delta;
    if duration > 0.0 {
        if t / duration > MAX_SUBTRACTED_LOOPS {
            t = t.rem_euclid(duration);
        }
        while t >= duration {
            t -= duration;
        }
    }
    t.min(duration).max(0.0)
}

/// Tracks wall-clock deltas between frames, the speed multiplier, the paused
/// flag and the playhead within the current animation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaybackClock {
    #[serde(skip)]
    last_ms: Option<f64>,
    elapsed: f64,
    playhead: f32,
    speed: f32,
    paused: bool,
    max_delta: Option<f32>,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(1.0, None)
    }
}

impl PlaybackClock {
    /// A paused clock with the given speed and optional per-frame delta cap (seconds).
    pub fn new(speed: f32, max_delta: Option<f32>) -> Self {
        Self {
            last_ms: None,
            elapsed: 0.0,
            playhead: 0.0,
            speed,
            paused: true,
            max_delta,
        }
    }

    #[inline]
    pub fn playhead(&self) -> f32 {
        self.playhead
    }

    /// Total unscaled real time (seconds) that has driven playback.
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Pause and forget the last frame timestamp so resuming does not jump.
    pub fn pause(&mut self) {
        self.paused = true;
        self.last_ms = None;
    }

    pub fn reset_playhead(&mut self) {
        self.playhead = 0.0;
    }

    /// Real seconds since the previous tick. The first tick after a (re)start
    /// measures zero; regressing timestamps also measure zero.
    fn real_delta(&mut self, now_ms: f64) -> f32 {
        let delta = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0).max(0.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        match self.max_delta {
            Some(cap) if delta > cap => {
                log::trace!("frame delta {delta:.4}s capped to {cap:.4}s");
                cap
            }
            _ => delta,
        }
    }

    /// Advance for a frame at `now_ms` against an animation of `duration`
    /// seconds. Returns the speed-scaled delta to feed the pose evaluator, or
    /// `None` while paused.
    pub fn tick(&mut self, now_ms: f64, duration: f32) -> Option<f32> {
        if self.paused {
            return None;
        }
        let real = self.real_delta(now_ms);
        self.elapsed += f64::from(real);
        let delta = real * self.speed;
        self.advance_by(delta, duration);
        Some(delta)
    }

    /// Move the playhead by an already scaled delta.
    pub fn advance_by(&mut self, delta: f32, duration: f32) {
        self.playhead = wrap_playhead(self.playhead, delta, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_repeatedly_for_large_deltas() {
        // 1.5 + 3.0 = 4.5 -> 2.5 -> 0.5
        assert_eq!(wrap_playhead(1.5, 3.0, 2.0), 0.5);
        assert_eq!(wrap_playhead(0.0, 20.25, 2.0), 0.25);
    }

    #[test]
    fn huge_deltas_wrap_without_spinning() {
        assert_eq!(wrap_playhead(0.0, 1.0e8, 1.0), 0.0);
        let t = wrap_playhead(0.5, 6.4e8, 2.0);
        assert!((0.0..=2.0).contains(&t));
        let t = wrap_playhead(0.0, f32::MAX, 2.0);
        assert!((0.0..=2.0).contains(&t));
        let t = wrap_playhead(0.0, f32::INFINITY, 2.0);
        assert!((0.0..=2.0).contains(&t));
    }

    #[test]
    fn zero_duration_pins_playhead() {
        assert_eq!(wrap_playhead(0.0, 1.0, 0.0), 0.0);
        assert_eq!(wrap_playhead(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn playhead_stays_in_range() {
        let mut t = 0.0;
        for _ in 0..1000 {
            t = wrap_playhead(t, 0.0167, 1.3);
            assert!((0.0..=1.3).contains(&t));
        }
        assert_eq!(wrap_playhead(0.2, -1.0, 1.0), 0.0);
    }

    #[test]
    fn paused_clock_does_not_advance() {
        let mut clock = PlaybackClock::new(1.0, None);
        assert_eq!(clock.tick(0.0, 2.0), None);
        assert_eq!(clock.tick(500.0, 2.0), None);
        assert_eq!(clock.playhead(), 0.0);
    }

    #[test]
    fn tick_scales_by_speed() {
        let mut clock = PlaybackClock::new(2.0, None);
        clock.resume();
        assert_eq!(clock.tick(1000.0, 10.0), Some(0.0));
        assert_eq!(clock.tick(1500.0, 10.0), Some(1.0));
        assert_eq!(clock.playhead(), 1.0);
        assert_eq!(clock.elapsed(), 0.5);
    }

    #[test]
    fn delta_cap_limits_long_frames() {
        let mut clock = PlaybackClock::new(1.0, Some(0.064));
        clock.resume();
        clock.tick(0.0, 10.0);
        assert_eq!(clock.tick(5000.0, 10.0), Some(0.064));
    }

    #[test]
    fn resume_after_pause_starts_from_zero_delta() {
        let mut clock = PlaybackClock::new(1.0, None);
        clock.resume();
        clock.tick(0.0, 10.0);
        clock.tick(250.0, 10.0);
        clock.pause();
        clock.resume();
        assert_eq!(clock.tick(10_000.0, 10.0), Some(0.0));
        assert_eq!(clock.playhead(), 0.25);
    }
}
