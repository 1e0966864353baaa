//! Spine Stage Core (engine-agnostic)
//!
//! Frames skinned-skeleton animations on a canvas: estimates each animation's
//! world-space viewport by sampling its poses, pads it, blends between
//! framings when the animation changes, and drives looping playback from host
//! frame timestamps.
//!
//! Rendering and texture decoding stay with the host; the animation runtime is
//! reached through [`PoseEvaluator`], with [`rig::RigEvaluator`] as the
//! reference implementation.

pub mod camera;
pub mod clock;
pub mod config;
pub mod driver;
pub mod error;
pub mod estimator;
pub mod events;
pub mod loader;
pub mod pose;
pub mod rig;
pub mod transition;
pub mod viewport;

// Re-exports for hosts
pub use camera::{fit, scale_to_fit, CameraFit};
pub use clock::{wrap_playhead, PlaybackClock};
pub use config::{AssetSources, PlayerConfig};
pub use driver::{FrameDriver, FrameHandle, FrameRenderer, FrameStatus, PlayerState};
pub use error::{ErrorKind, PlayerError};
pub use estimator::{ViewportEstimator, DEFAULT_STEPS};
pub use events::{Observers, PlayerEvent, SubscriptionId};
pub use loader::{AssetLoader, FsAssetLoader, SkeletonSource, StaticAssetLoader};
pub use pose::{AnimationClip, Bounds, PoseEvaluator};
pub use rig::{RigAnimation, RigEvaluator, Skeleton, SkeletonData};
pub use transition::ViewportTransition;
pub use viewport::{resolve_padding, Padding, Rect, Viewport, ViewportPadding};

pub type Result<T> = std::result::Result<T, PlayerError>;
