//! Contract between the player core and an animation runtime.
//!
//! The core never composes bone transforms itself; it drives a
//! [`PoseEvaluator`] and reads back world-space [`Bounds`].

use serde::{Deserialize, Serialize};

/// World-space axis-aligned bounds of a posed skeleton.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub offset_x: f32,
    pub offset_y: f32,
    pub size_x: f32,
    pub size_y: f32,
}

impl Bounds {
    /// Bounds spanning two corners; sizes are never negative.
    pub fn from_min_max(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            offset_x: min_x,
            offset_y: min_y,
            size_x: (max_x - min_x).max(0.0),
            size_y: (max_y - min_y).max(0.0),
        }
    }
}

/// An animation handle as seen by the player.
pub trait AnimationClip: Clone {
    fn name(&self) -> &str;
    /// Length of one loop in seconds.
    fn duration(&self) -> f32;
}

/// Pose evaluation over a runtime-owned skeleton type.
///
/// Implementations hold the track/mixing state; the skeleton is passed in so
/// the caller keeps ownership of it.
pub trait PoseEvaluator {
    type Skeleton;
    type Animation: AnimationClip;

    /// Reset bones and slots to the setup pose.
    fn apply_setup_pose(&mut self, skeleton: &mut Self::Skeleton);
    /// Reset only slots (attachments) to the setup pose.
    fn apply_slots_setup_pose(&mut self, skeleton: &mut Self::Skeleton);
    /// Activate a skin by name. Returns `false` if the skeleton has no such skin.
    fn set_skin(&mut self, skeleton: &mut Self::Skeleton, name: &str) -> bool;

    fn set_track_animation(&mut self, track: usize, animation: &Self::Animation, looping: bool);
    fn clear_tracks(&mut self);
    /// Advance all tracks by `delta` seconds.
    fn advance(&mut self, delta: f32);
    /// Pose the skeleton's local transforms from the tracks.
    fn apply(&mut self, skeleton: &mut Self::Skeleton);
    fn update_world_transform(&mut self, skeleton: &mut Self::Skeleton);
    fn bounds(&self, skeleton: &Self::Skeleton) -> Bounds;

    fn find_animation(&self, skeleton: &Self::Skeleton, name: &str) -> Option<Self::Animation>;
    fn current_animation(&self, track: usize) -> Option<&Self::Animation>;

    fn skin_names(&self, skeleton: &Self::Skeleton) -> Vec<String>;
    fn animation_names(&self, skeleton: &Self::Skeleton) -> Vec<String>;
}
