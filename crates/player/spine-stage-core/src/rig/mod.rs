//! Reference skeletal runtime implementing [`PoseEvaluator`].
//!
//! Bones with affine world transforms, slots showing box attachments,
//! skins, and linearly keyframed animations played on mixable tracks.

pub mod data;
pub mod skeleton;
pub mod state;

pub use data::{AnimationData, BoneData, BoxAttachment, SkeletonData, SkinData, SlotData};
pub use skeleton::{Bone, Skeleton, Slot};
pub use state::{AnimationState, RigAnimation, TrackEntry};

use crate::pose::{Bounds, PoseEvaluator};

/// [`PoseEvaluator`] over [`Skeleton`] and [`AnimationState`].
#[derive(Clone, Debug, Default)]
pub struct RigEvaluator {
    state: AnimationState,
}

impl RigEvaluator {
    pub fn new(default_mix: f32) -> Self {
        Self {
            state: AnimationState::new(default_mix),
        }
    }

    #[inline]
    pub fn state(&self) -> &AnimationState {
        &self.state
    }
}

impl PoseEvaluator for RigEvaluator {
    type Skeleton = Skeleton;
    type Animation = RigAnimation;

    fn apply_setup_pose(&mut self, skeleton: &mut Skeleton) {
        skeleton.set_to_setup_pose();
    }

    fn apply_slots_setup_pose(&mut self, skeleton: &mut Skeleton) {
        skeleton.set_slots_to_setup_pose();
    }

    fn set_skin(&mut self, skeleton: &mut Skeleton, name: &str) -> bool {
        skeleton.set_skin_by_name(name)
    }

    fn set_track_animation(&mut self, track: usize, animation: &RigAnimation, looping: bool) {
        self.state.set_animation(track, animation.clone(), looping);
    }

    fn clear_tracks(&mut self) {
        self.state.clear_tracks();
    }

    fn advance(&mut self, delta: f32) {
        self.state.update(delta);
    }

    fn apply(&mut self, skeleton: &mut Skeleton) {
        self.state.apply(skeleton);
    }

    fn update_world_transform(&mut self, skeleton: &mut Skeleton) {
        skeleton.update_world_transform();
    }

    fn bounds(&self, skeleton: &Skeleton) -> Bounds {
        skeleton.bounds()
    }

    fn find_animation(&self, skeleton: &Skeleton, name: &str) -> Option<RigAnimation> {
        RigAnimation::find(skeleton.data(), name)
    }

    fn current_animation(&self, track: usize) -> Option<&RigAnimation> {
        self.state.current(track).map(|e| &e.animation)
    }

    fn skin_names(&self, skeleton: &Skeleton) -> Vec<String> {
        skeleton.data().skin_names()
    }

    fn animation_names(&self, skeleton: &Skeleton) -> Vec<String> {
        skeleton.data().animation_names()
    }
}
