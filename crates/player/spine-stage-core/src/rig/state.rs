//! Track-based animation state with crossfade mixing.

use std::sync::Arc;

use crate::pose::AnimationClip;
use crate::rig::data::{AnimationData, Keyframe, SkeletonData};
use crate::rig::skeleton::Skeleton;

/// Handle to one animation of a skeleton description.
#[derive(Clone, Debug)]
pub struct RigAnimation {
    data: Arc<SkeletonData>,
    index: usize,
}

impl RigAnimation {
    pub fn find(data: &Arc<SkeletonData>, name: &str) -> Option<Self> {
        data.animation_index(name).map(|index| Self {
            data: Arc::clone(data),
            index,
        })
    }

    #[inline]
    pub fn data(&self) -> &AnimationData {
        &self.data.animations[self.index]
    }

    #[inline]
    pub fn skeleton_data(&self) -> &SkeletonData {
        &self.data
    }
}

impl PartialEq for RigAnimation {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data) && self.index == other.index
    }
}

impl AnimationClip for RigAnimation {
    fn name(&self) -> &str {
        &self.data().name
    }

    fn duration(&self) -> f32 {
        self.data().duration()
    }
}

/// Playback of one animation on a track.
#[derive(Clone, Debug)]
pub struct TrackEntry {
    pub animation: RigAnimation,
    pub looping: bool,
    pub track_time: f32,
    /// Entry being faded out while this one fades in.
    pub mixing_from: Option<Box<TrackEntry>>,
    pub mix_time: f32,
    pub mix_duration: f32,
}

impl TrackEntry {
    fn new(animation: RigAnimation, looping: bool) -> Self {
        Self {
            animation,
            looping,
            track_time: 0.0,
            mixing_from: None,
            mix_time: 0.0,
            mix_duration: 0.0,
        }
    }

    /// Move track time forward, keeping it within one loop (or at the end)
    /// so small deltas stay representable however long playback runs.
    fn advance(&mut self, delta: f32) {
        let duration = self.animation.duration();
        let time = self.track_time + delta;
        self.track_time = if self.looping && duration > 0.0 {
            time.rem_euclid(duration)
        } else {
            time.min(duration)
        };
    }

    /// Time within the animation: wrapped when looping, held at the end otherwise.
    pub fn animation_time(&self) -> f32 {
        let duration = self.animation.duration();
        if self.looping && duration > 0.0 {
            self.track_time.rem_euclid(duration)
        } else {
            self.track_time.min(duration)
        }
    }

    /// Fade-in weight of this entry over its mixing source.
    pub fn mix_alpha(&self) -> f32 {
        if self.mix_duration > 0.0 {
            (self.mix_time / self.mix_duration).min(1.0)
        } else {
            1.0
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AnimationState {
    default_mix: f32,
    tracks: Vec<Option<TrackEntry>>,
}

impl AnimationState {
    pub fn new(default_mix: f32) -> Self {
        Self {
            default_mix: default_mix.max(0.0),
            tracks: Vec::new(),
        }
    }

    #[inline]
    pub fn default_mix(&self) -> f32 {
        self.default_mix
    }

    pub fn current(&self, track: usize) -> Option<&TrackEntry> {
        self.tracks.get(track).and_then(Option::as_ref)
    }

    /// Play `animation` on `track`. An entry already playing there is faded
    /// out over the default mix duration.
    pub fn set_animation(
        &mut self,
        track: usize,
        animation: RigAnimation,
        looping: bool,
    ) -> &TrackEntry {
        if self.tracks.len() <= track {
            self.tracks.resize_with(track + 1, || None);
        }
        let mut entry = TrackEntry::new(animation, looping);
        if let Some(mut previous) = self.tracks[track].take() {
            if self.default_mix > 0.0 {
                previous.mixing_from = None;
                entry.mixing_from = Some(Box::new(previous));
                entry.mix_duration = self.default_mix;
            }
        }
        self.tracks[track].insert(entry)
    }

    pub fn clear_tracks(&mut self) {
        self.tracks.clear();
    }

    pub fn update(&mut self, delta: f32) {
        for entry in self.tracks.iter_mut().flatten() {
            entry.advance(delta);
            if let Some(from) = entry.mixing_from.as_deref_mut() {
                from.advance(delta);
                entry.mix_time += delta;
                if entry.mix_time >= entry.mix_duration {
                    entry.mixing_from = None;
                }
            }
        }
    }

    /// Pose `skeleton` from every track, lower tracks first.
    pub fn apply(&self, skeleton: &mut Skeleton) {
        for entry in self.tracks.iter().flatten() {
            match entry.mixing_from.as_deref() {
                Some(from) => {
                    apply_entry(from, 1.0, skeleton);
                    apply_entry(entry, entry.mix_alpha(), skeleton);
                }
                None => apply_entry(entry, 1.0, skeleton),
            }
        }
    }
}

/// Keys bracketing `time`: `None` before the first key, the last key alone
/// past the end, otherwise the pair and the fraction between them.
fn bracket<K: Keyframe>(keys: &[K], time: f32) -> Option<(&K, Option<(&K, f32)>)> {
    let first = keys.first()?;
    if time < first.time() {
        return None;
    }
    let idx = keys.partition_point(|k| k.time() <= time);
    if idx >= keys.len() {
        return keys.last().map(|k| (k, None));
    }
    let (a, b) = (&keys[idx - 1], &keys[idx]);
    let span = b.time() - a.time();
    let pct = if span > 0.0 {
        (time - a.time()) / span
    } else {
        0.0
    };
    Some((a, Some((b, pct))))
}

/// Signed difference in degrees, wrapped to [-180, 180).
#[inline]
fn wrap_degrees(delta: f32) -> f32 {
    (delta + 180.0).rem_euclid(360.0) - 180.0
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn apply_entry(entry: &TrackEntry, alpha: f32, skeleton: &mut Skeleton) {
    let time = entry.animation_time();
    let anim = entry.animation.data();
    let data = entry.animation.skeleton_data();

    for (bone_name, timelines) in &anim.bones {
        let Some(index) = data.bone_index(bone_name) else {
            continue;
        };
        let setup = &data.bones[index];
        let bone = &mut skeleton.bones_mut()[index];

        if let Some((a, next)) = bracket(&timelines.rotate, time) {
            let angle = match next {
                Some((b, pct)) => a.angle + wrap_degrees(b.angle - a.angle) * pct,
                None => a.angle,
            };
            let target = setup.rotation + angle;
            bone.rotation += wrap_degrees(target - bone.rotation) * alpha;
        }
        if let Some((a, next)) = bracket(&timelines.translate, time) {
            let (x, y) = match next {
                Some((b, pct)) => (lerp(a.x, b.x, pct), lerp(a.y, b.y, pct)),
                None => (a.x, a.y),
            };
            bone.x = lerp(bone.x, setup.x + x, alpha);
            bone.y = lerp(bone.y, setup.y + y, alpha);
        }
        if let Some((a, next)) = bracket(&timelines.scale, time) {
            let (sx, sy) = match next {
                Some((b, pct)) => (lerp(a.x, b.x, pct), lerp(a.y, b.y, pct)),
                None => (a.x, a.y),
            };
            bone.scale_x = lerp(bone.scale_x, setup.scale_x * sx, alpha);
            bone.scale_y = lerp(bone.scale_y, setup.scale_y * sy, alpha);
        }
    }

    // Attachments switch discretely once the entry dominates the mix.
    if alpha < 0.5 {
        return;
    }
    for (slot_name, timelines) in &anim.slots {
        let Some(index) = data.slot_index(slot_name) else {
            continue;
        };
        if let Some((key, _)) = bracket(&timelines.attachment, time) {
            skeleton.slots_mut()[index].attachment = key.name.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> Arc<SkeletonData> {
        Arc::new(
            SkeletonData::from_json(
                r#"{
                "bones":[{"name":"root","rotation":10}],
                "slots":[{"name":"body","bone":"root","attachment":"a"}],
                "animations":[
                  {"name":"spin","bones":{"root":{"rotate":[{"time":0,"angle":0},{"time":1,"angle":90}]}}},
                  {"name":"slide","duration":2,"bones":{"root":{"translate":[{"time":0},{"time":2,"x":20}]}},
                   "slots":{"body":{"attachment":[{"time":0,"name":"b"}]}}}
                ]
            }"#,
            )
            .unwrap(),
        )
    }

    #[test]
    fn samples_relative_to_setup_pose() {
        let d = data();
        let mut sk = Skeleton::new(Arc::clone(&d)).unwrap();
        let mut state = AnimationState::new(0.0);
        state.set_animation(0, RigAnimation::find(&d, "spin").unwrap(), true);
        state.update(0.5);
        state.apply(&mut sk);
        assert!((sk.bones()[0].rotation - 55.0).abs() < 1e-4);
    }

    #[test]
    fn looping_wraps_track_time() {
        let d = data();
        let mut state = AnimationState::new(0.0);
        state.set_animation(0, RigAnimation::find(&d, "slide").unwrap(), true);
        state.update(2.5);
        assert!((state.current(0).unwrap().animation_time() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn replacing_an_entry_crossfades() {
        let d = data();
        let mut sk = Skeleton::new(Arc::clone(&d)).unwrap();
        let mut state = AnimationState::new(0.25);
        state.set_animation(0, RigAnimation::find(&d, "spin").unwrap(), true);
        state.update(1.0);
        let entry = state.set_animation(0, RigAnimation::find(&d, "slide").unwrap(), true);
        assert!(entry.mixing_from.is_some());
        state.update(0.125);
        assert!((state.current(0).unwrap().mix_alpha() - 0.5).abs() < 1e-6);
        state.apply(&mut sk);
        assert_eq!(sk.slots()[0].attachment.as_deref(), Some("b"));
        state.update(0.25);
        assert!(state.current(0).unwrap().mixing_from.is_none());
    }

    #[test]
    fn clear_tracks_removes_everything() {
        let d = data();
        let mut state = AnimationState::new(0.25);
        state.set_animation(2, RigAnimation::find(&d, "spin").unwrap(), false);
        assert!(state.current(2).is_some());
        state.clear_tracks();
        assert!(state.current(2).is_none());
    }

    #[test]
    fn long_playback_keeps_advancing() {
        let d = data();
        let mut state = AnimationState::new(0.0);
        state.set_animation(0, RigAnimation::find(&d, "slide").unwrap(), true);
        // About a week of playback.
        state.update(600_000.0);
        let before = state.current(0).unwrap().animation_time();
        for _ in 0..30 {
            state.update(1.0 / 60.0);
        }
        let after = state.current(0).unwrap().animation_time();
        assert!((after - before - 0.5).abs() < 1e-3, "{before} -> {after}");
        assert!(state.current(0).unwrap().track_time < 2.0);
    }
}
