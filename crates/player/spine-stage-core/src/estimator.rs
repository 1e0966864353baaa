//! Sampling-based viewport estimation.
//!
//! Bounds of a deforming skeleton change continuously over an animation and
//! have no closed form, so the animation is stepped through and the bounds of
//! every sampled pose are unioned.

use crate::pose::{AnimationClip, PoseEvaluator};
use crate::viewport::Rect;

pub const DEFAULT_STEPS: usize = 100;

/// Estimates the unpadded world rectangle an animation occupies.
#[derive(Clone, Copy, Debug)]
pub struct ViewportEstimator {
    steps: usize,
}

impl Default for ViewportEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_STEPS)
    }
}

impl ViewportEstimator {
    pub fn new(steps: usize) -> Self {
        Self {
            steps: steps.max(1),
        }
    }

    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Union of the bounds sampled at `steps` equal intervals over one loop.
    ///
    /// Leaves `skeleton` in the last sampled pose and `evaluator` with the
    /// animation on track 0; callers re-seed the pose they actually want.
    pub fn estimate<P: PoseEvaluator>(
        &self,
        evaluator: &mut P,
        skeleton: &mut P::Skeleton,
        animation: &P::Animation,
    ) -> Rect {
        evaluator.clear_tracks();
        evaluator.apply_setup_pose(skeleton);
        evaluator.set_track_animation(0, animation, true);

        let duration = animation.duration();
        let (steps, step_time) = if duration > 0.0 {
            (self.steps, duration / self.steps as f32)
        } else {
            (1, 0.0)
        };

        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;
        for _ in 0..steps {
            evaluator.advance(step_time);
            evaluator.apply(skeleton);
            evaluator.update_world_transform(skeleton);
            let b = evaluator.bounds(skeleton);
            min_x = min_x.min(b.offset_x);
            max_x = max_x.max(b.offset_x + b.size_x);
            min_y = min_y.min(b.offset_y);
            max_y = max_y.max(b.offset_y + b.size_y);
        }

        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}
