//! Posable skeleton instance.

use std::sync::Arc;

use crate::error::PlayerError;
use crate::pose::Bounds;
use crate::rig::data::{BoxAttachment, SkeletonData, SkinData};

/// Name of the skin consulted when the active skin lacks an attachment.
pub const DEFAULT_SKIN: &str = "default";

/// Bone with an animated local transform and a composed world transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
    pub parent: Option<usize>,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    // world = [a b; c d] * local + (world_x, world_y)
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub world_x: f32,
    pub world_y: f32,
}

impl Bone {
    /// Transform a bone-space point to world space.
    #[inline]
    pub fn local_to_world(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.b * y + self.world_x,
            self.c * x + self.d * y + self.world_y,
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    pub bone: usize,
    pub attachment: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Skeleton {
    data: Arc<SkeletonData>,
    bones: Vec<Bone>,
    slots: Vec<Slot>,
    skin: Option<usize>,
}

impl Skeleton {
    /// Instance in the setup pose with world transforms computed.
    ///
    /// `data` is validated first, so hand-built descriptions with dangling
    /// references or children declared before their parents are rejected.
    pub fn new(data: Arc<SkeletonData>) -> Result<Self, PlayerError> {
        data.validate()?;
        let bones = data
            .bones
            .iter()
            .map(|b| Bone {
                parent: b.parent.as_deref().and_then(|p| data.bone_index(p)),
                x: b.x,
                y: b.y,
                rotation: b.rotation,
                scale_x: b.scale_x,
                scale_y: b.scale_y,
                a: 1.0,
                b: 0.0,
                c: 0.0,
                d: 1.0,
                world_x: 0.0,
                world_y: 0.0,
            })
            .collect();
        let slots = data
            .slots
            .iter()
            .map(|s| {
                let bone = data.bone_index(&s.bone).ok_or_else(|| {
                    PlayerError::parse(format!(
                        "slot '{}' references unknown bone '{}'",
                        s.name, s.bone
                    ))
                })?;
                Ok(Slot {
                    bone,
                    attachment: s.attachment.clone(),
                })
            })
            .collect::<Result<Vec<_>, PlayerError>>()?;
        let mut skeleton = Self {
            data,
            bones,
            slots,
            skin: None,
        };
        skeleton.update_world_transform();
        Ok(skeleton)
    }

    #[inline]
    pub fn data(&self) -> &Arc<SkeletonData> {
        &self.data
    }

    #[inline]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    #[inline]
    pub fn bones_mut(&mut self) -> &mut [Bone] {
        &mut self.bones
    }

    #[inline]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    #[inline]
    pub fn slots_mut(&mut self) -> &mut [Slot] {
        &mut self.slots
    }

    pub fn skin_name(&self) -> Option<&str> {
        self.skin.map(|i| self.data.skins[i].name.as_str())
    }

    pub fn set_to_setup_pose(&mut self) {
        self.set_bones_to_setup_pose();
        self.set_slots_to_setup_pose();
    }

    pub fn set_bones_to_setup_pose(&mut self) {
        for (bone, setup) in self.bones.iter_mut().zip(&self.data.bones) {
            bone.x = setup.x;
            bone.y = setup.y;
            bone.rotation = setup.rotation;
            bone.scale_x = setup.scale_x;
            bone.scale_y = setup.scale_y;
        }
    }

    pub fn set_slots_to_setup_pose(&mut self) {
        for (slot, setup) in self.slots.iter_mut().zip(&self.data.slots) {
            slot.attachment = setup.attachment.clone();
        }
    }

    /// Returns `false` and leaves the skin unchanged if `name` is unknown.
    pub fn set_skin_by_name(&mut self, name: &str) -> bool {
        match self.data.skin_index(name) {
            Some(i) => {
                self.skin = Some(i);
                true
            }
            None => false,
        }
    }

    /// Compose local transforms into world transforms, parents first.
    pub fn update_world_transform(&mut self) {
        for i in 0..self.bones.len() {
            let parent = self.bones[i]
                .parent
                .map(|p| {
                    let pb = &self.bones[p];
                    (pb.a, pb.b, pb.c, pb.d, pb.world_x, pb.world_y)
                })
                .unwrap_or((1.0, 0.0, 0.0, 1.0, 0.0, 0.0));
            let (pa, pb, pc, pd, px, py) = parent;
            let bone = &mut self.bones[i];
            let (sin, cos) = bone.rotation.to_radians().sin_cos();
            let la = cos * bone.scale_x;
            let lb = -sin * bone.scale_y;
            let lc = sin * bone.scale_x;
            let ld = cos * bone.scale_y;
            bone.world_x = pa * bone.x + pb * bone.y + px;
            bone.world_y = pc * bone.x + pd * bone.y + py;
            bone.a = pa * la + pb * lc;
            bone.b = pa * lb + pb * ld;
            bone.c = pc * la + pd * lc;
            bone.d = pc * lb + pd * ld;
        }
    }

    /// Attachment `name` for slot `slot`, from the active skin or the default skin.
    pub fn attachment(&self, slot: usize, name: &str) -> Option<&BoxAttachment> {
        let slot_name = &self.data.slots.get(slot)?.name;
        self.skin
            .and_then(|i| skin_attachment(&self.data.skins[i], slot_name, name))
            .or_else(|| {
                self.data
                    .skin_index(DEFAULT_SKIN)
                    .and_then(|i| skin_attachment(&self.data.skins[i], slot_name, name))
            })
    }

    /// World-space bounds of every visible attachment. A skeleton with nothing
    /// visible has zero bounds at the origin.
    pub fn bounds(&self) -> Bounds {
        let mut min = (f32::MAX, f32::MAX);
        let mut max = (f32::MIN, f32::MIN);
        let mut any = false;
        for (i, slot) in self.slots.iter().enumerate() {
            let Some(name) = slot.attachment.as_deref() else {
                continue;
            };
            let Some(att) = self.attachment(i, name) else {
                continue;
            };
            let bone = &self.bones[slot.bone];
            for (lx, ly) in att.corners() {
                let (wx, wy) = bone.local_to_world(lx, ly);
                min = (min.0.min(wx), min.1.min(wy));
                max = (max.0.max(wx), max.1.max(wy));
                any = true;
            }
        }
        if any {
            Bounds::from_min_max(min.0, min.1, max.0, max.1)
        } else {
            Bounds::default()
        }
    }
}

fn skin_attachment<'a>(skin: &'a SkinData, slot: &str, name: &str) -> Option<&'a BoxAttachment> {
    skin.attachments.get(slot).and_then(|m| m.get(name))
}
