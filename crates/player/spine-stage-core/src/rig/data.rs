//! Skeleton description: bones, slots, skins and keyframed animations.
//!
//! Loaded from JSON. Bone rotations are in degrees; animation key values are
//! relative to the setup pose (rotation/translation are added, scale is
//! multiplied).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::PlayerError;

fn one() -> f32 {
    1.0
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoneData {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "one")]
    pub scale_x: f32,
    #[serde(default = "one")]
    pub scale_y: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SlotData {
    pub name: String,
    pub bone: String,
    /// Attachment shown in the setup pose.
    #[serde(default)]
    pub attachment: Option<String>,
}

/// Rectangular attachment centred at `(x, y)` in bone space.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct BoxAttachment {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub rotation: f32,
}

impl BoxAttachment {
    /// Corners in bone space.
    pub fn corners(&self) -> [(f32, f32); 4] {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)].map(|(lx, ly)| {
            (
                self.x + lx * cos - ly * sin,
                self.y + lx * sin + ly * cos,
            )
        })
    }
}

/// slot name -> attachment name -> attachment
pub type SkinAttachments = BTreeMap<String, BTreeMap<String, BoxAttachment>>;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SkinData {
    pub name: String,
    #[serde(default)]
    pub attachments: SkinAttachments,
}

pub trait Keyframe {
    fn time(&self) -> f32;
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct RotateKey {
    pub time: f32,
    #[serde(default)]
    pub angle: f32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TranslateKey {
    pub time: f32,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScaleKey {
    pub time: f32,
    #[serde(default = "one")]
    pub x: f32,
    #[serde(default = "one")]
    pub y: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AttachmentKey {
    pub time: f32,
    /// `None` hides the slot.
    #[serde(default)]
    pub name: Option<String>,
}

macro_rules! keyframe {
    ($($t:ty),*) => {
        $(impl Keyframe for $t {
            #[inline]
            fn time(&self) -> f32 {
                self.time
            }
        })*
    };
}
keyframe!(RotateKey, TranslateKey, ScaleKey, AttachmentKey);

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct BoneTimelines {
    #[serde(default)]
    pub rotate: Vec<RotateKey>,
    #[serde(default)]
    pub translate: Vec<TranslateKey>,
    #[serde(default)]
    pub scale: Vec<ScaleKey>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SlotTimelines {
    #[serde(default)]
    pub attachment: Vec<AttachmentKey>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnimationData {
    pub name: String,
    /// Explicit loop length; defaults to the last key time.
    #[serde(default)]
    pub duration: Option<f32>,
    #[serde(default)]
    pub bones: BTreeMap<String, BoneTimelines>,
    #[serde(default)]
    pub slots: BTreeMap<String, SlotTimelines>,
}

impl AnimationData {
    /// Loop length in seconds.
    pub fn duration(&self) -> f32 {
        if let Some(d) = self.duration {
            return d;
        }
        let bone_keys = self.bones.values().flat_map(|tl| {
            let rotate = tl.rotate.last().map(Keyframe::time);
            let translate = tl.translate.last().map(Keyframe::time);
            let scale = tl.scale.last().map(Keyframe::time);
            [rotate, translate, scale].into_iter().flatten()
        });
        let slot_keys = self
            .slots
            .values()
            .filter_map(|tl| tl.attachment.last().map(Keyframe::time));
        bone_keys.chain(slot_keys).fold(0.0, f32::max)
    }
}

/// Complete skeleton description.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SkeletonData {
    #[serde(default)]
    pub name: Option<String>,
    pub bones: Vec<BoneData>,
    #[serde(default)]
    pub slots: Vec<SlotData>,
    #[serde(default)]
    pub skins: Vec<SkinData>,
    #[serde(default)]
    pub animations: Vec<AnimationData>,
}

impl SkeletonData {
    /// Parse and validate a JSON skeleton description.
    pub fn from_json(json: &str) -> Result<Self, PlayerError> {
        let data: SkeletonData = serde_json::from_str(json)?;
        data.validate()?;
        Ok(data)
    }

    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    pub fn slot_index(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    pub fn skin_index(&self, name: &str) -> Option<usize> {
        self.skins.iter().position(|s| s.name == name)
    }

    pub fn animation_index(&self, name: &str) -> Option<usize> {
        self.animations.iter().position(|a| a.name == name)
    }

    pub fn skin_names(&self) -> Vec<String> {
        self.skins.iter().map(|s| s.name.clone()).collect()
    }

    pub fn animation_names(&self) -> Vec<String> {
        self.animations.iter().map(|a| a.name.clone()).collect()
    }

    /// Structural checks: parents precede children, every reference
    /// resolves, key times are finite and non-decreasing.
    pub fn validate(&self) -> Result<(), PlayerError> {
        if self.bones.is_empty() {
            return Err(PlayerError::parse("skeleton has no bones"));
        }
        for (i, bone) in self.bones.iter().enumerate() {
            if self.bones[..i].iter().any(|b| b.name == bone.name) {
                return Err(PlayerError::parse(format!(
                    "duplicate bone '{}'",
                    bone.name
                )));
            }
            if let Some(parent) = &bone.parent {
                if !self.bones[..i].iter().any(|b| &b.name == parent) {
                    return Err(PlayerError::parse(format!(
                        "bone '{}' has parent '{parent}' which is not declared before it",
                        bone.name
                    )));
                }
            }
        }
        for slot in &self.slots {
            if self.bone_index(&slot.bone).is_none() {
                return Err(PlayerError::parse(format!(
                    "slot '{}' references unknown bone '{}'",
                    slot.name, slot.bone
                )));
            }
        }
        for skin in &self.skins {
            for slot in skin.attachments.keys() {
                if self.slot_index(slot).is_none() {
                    return Err(PlayerError::parse(format!(
                        "skin '{}' references unknown slot '{slot}'",
                        skin.name
                    )));
                }
            }
        }
        for anim in &self.animations {
            if let Some(d) = anim.duration {
                if !d.is_finite() || d < 0.0 {
                    return Err(PlayerError::parse(format!(
                        "animation '{}' has invalid duration {d}",
                        anim.name
                    )));
                }
            }
            for (bone, tl) in &anim.bones {
                if self.bone_index(bone).is_none() {
                    return Err(PlayerError::parse(format!(
                        "animation '{}' references unknown bone '{bone}'",
                        anim.name
                    )));
                }
                check_keys(&anim.name, bone, &tl.rotate)?;
                check_keys(&anim.name, bone, &tl.translate)?;
                check_keys(&anim.name, bone, &tl.scale)?;
            }
            for (slot, tl) in &anim.slots {
                if self.slot_index(slot).is_none() {
                    return Err(PlayerError::parse(format!(
                        "animation '{}' references unknown slot '{slot}'",
                        anim.name
                    )));
                }
                check_keys(&anim.name, slot, &tl.attachment)?;
            }
        }
        Ok(())
    }
}

fn check_keys<K: Keyframe>(anim: &str, target: &str, keys: &[K]) -> Result<(), PlayerError> {
    let mut last = 0.0f32;
    for k in keys {
        let t = k.time();
        if !t.is_finite() || t < last {
            return Err(PlayerError::parse(format!(
                "animation '{anim}': key times for '{target}' must be finite, non-negative and non-decreasing"
            )));
        }
        last = t;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn duration_defaults_to_last_key() {
        let anim: AnimationData = serde_json::from_str(
            r#"{"name":"walk","bones":{"root":{"rotate":[{"time":0},{"time":0.8,"angle":30}],
                 "translate":[{"time":1.25,"x":4}]}}}"#,
        )
        .unwrap();
        assert_eq!(anim.duration(), 1.25);
    }

    #[test]
    fn rejects_child_before_parent() {
        let err = SkeletonData::from_json(
            r#"{"bones":[{"name":"arm","parent":"root"},{"name":"root"}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RuntimeParse);
    }

    #[test]
    fn rejects_unsorted_keys() {
        let err = SkeletonData::from_json(
            r#"{"bones":[{"name":"root"}],"animations":[{"name":"a",
                "bones":{"root":{"rotate":[{"time":1},{"time":0.5}]}}}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RuntimeParse);
    }

    #[test]
    fn box_corners_follow_rotation() {
        let a = BoxAttachment {
            x: 0.0,
            y: 0.0,
            width: 2.0,
            height: 4.0,
            rotation: 90.0,
        };
        let xs: Vec<f32> = a.corners().iter().map(|c| c.0).collect();
        let max_x = xs.iter().cloned().fold(f32::MIN, f32::max);
        assert!((max_x - 2.0).abs() < 1e-5);
    }
}
