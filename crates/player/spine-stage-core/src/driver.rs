//! Frame driver: owns the skeleton, the pose evaluator, the playback clock and
//! the viewport transition, and turns one host frame callback into one
//! rendered frame.
//!
//! Per frame: advance clock -> evaluate pose -> blend viewport -> fit camera
//! -> draw. Selecting an animation re-estimates its viewport and starts a new
//! viewport transition; selecting a skin only swaps attachments.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::camera::{self, CameraFit};
use crate::clock::PlaybackClock;
use crate::config::{validate_speed, AssetSources, PlayerConfig};
use crate::error::PlayerError;
use crate::estimator::ViewportEstimator;
use crate::events::{Observers, PlayerEvent, SubscriptionId};
use crate::loader::AssetLoader;
use crate::pose::{AnimationClip, PoseEvaluator};
use crate::rig::{RigEvaluator, Skeleton};
use crate::transition::ViewportTransition;
use crate::viewport::{Rect, Viewport};
use crate::Result;

/// Lifecycle of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    /// No skeleton yet.
    Uninitialized,
    /// Skeleton set up, playback not started.
    Ready,
    Playing,
    Paused,
}

impl PlayerState {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        !matches!(self, Self::Uninitialized)
    }
}

/// Drawing side of a frame.
pub trait FrameRenderer<S> {
    /// Current canvas size in pixels, after any host-side resize.
    fn canvas_size(&mut self) -> (f32, f32);
    fn clear(&mut self);
    fn draw(&mut self, camera: &CameraFit, skeleton: &S, premultiplied_alpha: bool);
}

/// Cancellation token for a started frame loop. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct FrameHandle {
    cancelled: Arc<AtomicBool>,
}

impl FrameHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// What a frame callback did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameStatus {
    Rendered(CameraFit),
    /// Loop running but nothing to draw yet.
    Idle,
    /// Loop stopped; the host should not request another frame.
    Stopped,
}

impl FrameStatus {
    #[inline]
    pub fn should_continue(&self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

pub struct FrameDriver<P: PoseEvaluator> {
    cfg: PlayerConfig,
    evaluator: P,
    skeleton: Option<P::Skeleton>,
    state: PlayerState,
    clock: PlaybackClock,
    transition: ViewportTransition,
    estimator: ViewportEstimator,
    animation: Option<String>,
    animations: Vec<String>,
    skin: Option<String>,
    skins: Vec<String>,
    frames: Option<FrameHandle>,
    observers: Observers,
}

impl<P: PoseEvaluator> std::fmt::Debug for FrameDriver<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDriver")
            .field("state", &self.state)
            .field("animation", &self.animation)
            .field("skin", &self.skin)
            .field("clock", &self.clock)
            .field("transition", &self.transition)
            .finish_non_exhaustive()
    }
}

/// Pick `requested` from `available`, the first entry when nothing was
/// requested, or the first entry for unknown names when `fallback` is set.
fn resolve_name(
    requested: Option<&str>,
    available: &[String],
    fallback: bool,
    unknown: impl FnOnce(String, Vec<String>) -> PlayerError,
) -> Result<String> {
    let first = available.first().cloned();
    match (requested, first) {
        (Some(name), _) if available.iter().any(|a| a == name) => Ok(name.to_string()),
        (Some(name), Some(first)) if fallback => {
            log::warn!("'{name}' is not available, falling back to '{first}'");
            Ok(first)
        }
        (Some(name), _) => Err(unknown(name.to_string(), available.to_vec())),
        (None, Some(first)) => Ok(first),
        (None, None) => Err(unknown(String::new(), Vec::new())),
    }
}

impl<P: PoseEvaluator> FrameDriver<P> {
    pub fn new(cfg: PlayerConfig, evaluator: P) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            clock: PlaybackClock::new(cfg.speed, cfg.max_frame_delta),
            estimator: ViewportEstimator::new(cfg.viewport_steps),
            animation: cfg.animation.clone(),
            skin: cfg.skin.clone(),
            cfg,
            evaluator,
            skeleton: None,
            state: PlayerState::Uninitialized,
            transition: ViewportTransition::new(),
            animations: Vec::new(),
            skins: Vec::new(),
            frames: None,
            observers: Observers::new(),
        })
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&PlayerEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Install a loaded skeleton: validate skins and animations, apply the
    /// requested skin, select the requested animation and start playing.
    ///
    /// On error the driver stays uninitialized.
    pub fn setup(&mut self, mut skeleton: P::Skeleton, now_ms: f64) -> Result<()> {
        self.observers.emit(PlayerEvent::Loaded(false));
        let fallback = self.cfg.fallback_to_first;

        let skins = self.evaluator.skin_names(&skeleton);
        if skins.is_empty() {
            return Err(PlayerError::NoSkins);
        }
        let skin = resolve_name(self.skin.as_deref(), &skins, fallback, |name, available| {
            PlayerError::UnknownSkin { name, available }
        })?;

        let animations = self.evaluator.animation_names(&skeleton);
        if animations.is_empty() {
            return Err(PlayerError::NoAnimations);
        }
        let animation_name = resolve_name(
            self.animation.as_deref(),
            &animations,
            fallback,
            |name, available| PlayerError::UnknownAnimation { name, available },
        )?;
        let animation = self
            .evaluator
            .find_animation(&skeleton, &animation_name)
            .ok_or_else(|| PlayerError::UnknownAnimation {
                name: animation_name.clone(),
                available: animations.clone(),
            })?;

        if !self.evaluator.set_skin(&mut skeleton, &skin) {
            return Err(PlayerError::UnknownSkin {
                name: skin,
                available: skins,
            });
        }
        self.evaluator.apply_slots_setup_pose(&mut skeleton);

        self.skeleton = Some(skeleton);
        self.state = PlayerState::Ready;
        self.skins = skins;
        self.animations = animations;
        self.skin = Some(skin.clone());
        self.observers.emit(PlayerEvent::SkinsChanged(self.skins.clone()));
        self.observers.emit(PlayerEvent::SkinChanged(skin));
        self.observers
            .emit(PlayerEvent::AnimationsChanged(self.animations.clone()));

        self.select_animation(animation, now_ms);
        self.play();
        log::info!(
            "skeleton ready: {} skins, {} animations, playing '{animation_name}'",
            self.skins.len(),
            self.animations.len()
        );
        self.observers.emit(PlayerEvent::Loaded(true));
        Ok(())
    }

    /// Clear tracks, estimate and install the new framing, then play
    /// `animation` from the start.
    fn select_animation(&mut self, animation: P::Animation, now_ms: f64) {
        let Some(skeleton) = self.skeleton.as_mut() else {
            return;
        };
        self.evaluator.clear_tracks();
        self.evaluator.apply_setup_pose(skeleton);
        let base = self
            .estimator
            .estimate(&mut self.evaluator, skeleton, &animation);
        let viewport = Viewport::from_base(base, &self.cfg.padding);
        self.transition.set_viewport(viewport, now_ms);

        // Estimation leaves an arbitrary sampled pose behind.
        self.evaluator.clear_tracks();
        self.evaluator.apply_setup_pose(skeleton);
        self.evaluator.set_track_animation(0, &animation, true);
        self.clock.reset_playhead();

        log::debug!(
            "animation '{}' ({:.3}s) framed at {:?}",
            animation.name(),
            animation.duration(),
            viewport.effective()
        );
        let name = animation.name().to_string();
        self.animation = Some(name.clone());
        self.observers.emit(PlayerEvent::AnimationChanged(name));
    }

    /// Select an animation by name.
    ///
    /// Before setup the name is only recorded and validated at setup time.
    /// Unknown names are rejected without touching the viewport or playback
    /// state, unless fallback is enabled.
    pub fn set_animation(&mut self, name: &str, now_ms: f64) -> Result<()> {
        let Some(skeleton) = self.skeleton.as_ref() else {
            self.animation = Some(name.to_string());
            self.observers
                .emit(PlayerEvent::AnimationChanged(name.to_string()));
            return Ok(());
        };
        let resolved = resolve_name(
            Some(name),
            &self.animations,
            self.cfg.fallback_to_first,
            |name, available| PlayerError::UnknownAnimation { name, available },
        )?;
        let animation = self
            .evaluator
            .find_animation(skeleton, &resolved)
            .ok_or_else(|| PlayerError::UnknownAnimation {
                name: resolved.clone(),
                available: self.animations.clone(),
            })?;
        self.select_animation(animation, now_ms);
        Ok(())
    }

    /// Select a skin by name. Does not touch framing or playback.
    pub fn set_skin(&mut self, name: &str) -> Result<()> {
        let Some(skeleton) = self.skeleton.as_mut() else {
            self.skin = Some(name.to_string());
            self.observers.emit(PlayerEvent::SkinChanged(name.to_string()));
            return Ok(());
        };
        let resolved = resolve_name(
            Some(name),
            &self.skins,
            self.cfg.fallback_to_first,
            |name, available| PlayerError::UnknownSkin { name, available },
        )?;
        if !self.evaluator.set_skin(skeleton, &resolved) {
            return Err(PlayerError::UnknownSkin {
                name: resolved,
                available: self.skins.clone(),
            });
        }
        self.evaluator.apply_slots_setup_pose(skeleton);
        log::debug!("skin '{resolved}' applied");
        self.skin = Some(resolved.clone());
        self.observers.emit(PlayerEvent::SkinChanged(resolved));
        Ok(())
    }

    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        validate_speed(speed)?;
        self.cfg.speed = speed;
        self.clock.set_speed(speed);
        self.observers.emit(PlayerEvent::SpeedChanged(speed));
        Ok(())
    }

    /// Resume playback. No effect before setup.
    pub fn play(&mut self) {
        if matches!(self.state, PlayerState::Ready | PlayerState::Paused) {
            self.clock.resume();
            self.state = PlayerState::Playing;
        }
    }

    pub fn pause(&mut self) {
        if self.state == PlayerState::Playing {
            self.clock.pause();
            self.state = PlayerState::Paused;
        }
    }

    /// Begin accepting frame callbacks. Any previous loop is cancelled.
    pub fn start(&mut self) -> FrameHandle {
        if let Some(old) = self.frames.take() {
            old.cancel();
        }
        let handle = FrameHandle::default();
        self.frames = Some(handle.clone());
        handle
    }

    /// Cancel the running loop; the next callback reports [`FrameStatus::Stopped`].
    pub fn stop(&mut self) {
        if let Some(handle) = &self.frames {
            handle.cancel();
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.frames.as_ref().is_some_and(|h| !h.is_cancelled())
    }

    /// Run one frame at host timestamp `now_ms` (milliseconds).
    pub fn frame<R>(&mut self, now_ms: f64, renderer: &mut R) -> FrameStatus
    where
        R: FrameRenderer<P::Skeleton>,
    {
        if !self.is_running() {
            return FrameStatus::Stopped;
        }
        let Some(skeleton) = self.skeleton.as_mut() else {
            return FrameStatus::Idle;
        };

        renderer.clear();
        let (canvas_w, canvas_h) = renderer.canvas_size();

        if self.state == PlayerState::Playing && self.animation.is_some() {
            let duration = self
                .evaluator
                .current_animation(0)
                .map_or(0.0, |a| a.duration());
            if let Some(delta) = self.clock.tick(now_ms, duration) {
                self.evaluator.advance(delta);
                self.evaluator.apply(skeleton);
            }
        }
        self.evaluator.update_world_transform(skeleton);

        let Some(framing) = self.transition.blended(now_ms, self.cfg.transition_time) else {
            return FrameStatus::Idle;
        };
        let camera = camera::fit(&framing, canvas_w, canvas_h);
        renderer.draw(&camera, skeleton, self.cfg.premultiplied_alpha);
        FrameStatus::Rendered(camera)
    }

    #[inline]
    pub fn state(&self) -> PlayerState {
        self.state
    }

    #[inline]
    pub fn config(&self) -> &PlayerConfig {
        &self.cfg
    }

    #[inline]
    pub fn animation(&self) -> Option<&str> {
        self.animation.as_deref()
    }

    #[inline]
    pub fn animations(&self) -> &[String] {
        &self.animations
    }

    #[inline]
    pub fn skin(&self) -> Option<&str> {
        self.skin.as_deref()
    }

    #[inline]
    pub fn skins(&self) -> &[String] {
        &self.skins
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.clock.speed()
    }

    #[inline]
    pub fn playhead(&self) -> f32 {
        self.clock.playhead()
    }

    #[inline]
    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Current (target) viewport.
    #[inline]
    pub fn viewport(&self) -> Option<&Viewport> {
        self.transition.current()
    }

    #[inline]
    pub fn transition(&self) -> &ViewportTransition {
        &self.transition
    }

    /// Effective viewport the camera frames at `now_ms`.
    pub fn framing(&self, now_ms: f64) -> Option<Rect> {
        self.transition.blended(now_ms, self.cfg.transition_time)
    }

    #[inline]
    pub fn skeleton(&self) -> Option<&P::Skeleton> {
        self.skeleton.as_ref()
    }

    #[inline]
    pub fn evaluator(&self) -> &P {
        &self.evaluator
    }
}

impl FrameDriver<RigEvaluator> {
    /// Validate sources, load through `loader` and set up with the reference
    /// runtime. Nothing is loaded when the sources are incomplete.
    pub fn load(
        cfg: PlayerConfig,
        loader: &mut dyn AssetLoader,
        sources: &AssetSources,
        now_ms: f64,
    ) -> Result<Self> {
        sources.validate()?;
        let evaluator = RigEvaluator::new(cfg.default_mix);
        let mut driver = Self::new(cfg, evaluator)?;
        let data = loader.load(sources)?;
        driver.setup(Skeleton::new(Arc::new(data))?, now_ms)?;
        Ok(driver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["idle".into(), "walk".into()]
    }

    fn unknown(name: String, available: Vec<String>) -> PlayerError {
        PlayerError::UnknownAnimation { name, available }
    }

    #[test]
    fn resolve_name_prefers_request_then_first() {
        assert_eq!(
            resolve_name(Some("walk"), &names(), false, unknown).unwrap(),
            "walk"
        );
        assert_eq!(resolve_name(None, &names(), false, unknown).unwrap(), "idle");
    }

    #[test]
    fn resolve_name_falls_back_only_when_enabled() {
        let err = resolve_name(Some("run"), &names(), false, unknown).unwrap_err();
        assert_eq!(
            err,
            PlayerError::UnknownAnimation {
                name: "run".into(),
                available: names(),
            }
        );
        assert_eq!(
            resolve_name(Some("run"), &names(), true, unknown).unwrap(),
            "idle"
        );
    }

    #[test]
    fn state_names_and_flags() {
        assert_eq!(PlayerState::Paused.name(), "paused");
        assert!(!PlayerState::Uninitialized.is_initialized());
        assert!(PlayerState::Ready.is_initialized());
        assert!(FrameStatus::Idle.should_continue());
        assert!(!FrameStatus::Stopped.should_continue());
    }

    #[test]
    fn handle_clones_share_cancellation() {
        let handle = FrameHandle::default();
        let clone = handle.clone();
        clone.cancel();
        assert!(handle.is_cancelled());
    }
}
