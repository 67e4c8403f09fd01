//! Explicit pose evaluation.
//!
//! A `Pose` holds one local transform per bone of a skeleton, relative to rest.
//! `PoseEvaluator` binds a clip's tracks to a skeleton once and then fills a
//! caller-owned pose for any frame, so no shared playhead is involved.

use tracing::debug;

use crate::data::{AnimationClip, Track};
use crate::error::RigError;
use crate::rotation::{euler_to_quat, quat_to_euler, IDENTITY_QUAT};
use crate::sampling::sample_track;
use crate::skeleton::{RotationMode, Skeleton};
use crate::value::{Channel, Value};

/// Local transform of one bone. The default value is the rest pose.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneTransform {
    pub location: [f32; 3],
    pub rotation_quaternion: [f32; 4],
    pub rotation_euler: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self {
            location: [0.0; 3],
            rotation_quaternion: IDENTITY_QUAT,
            rotation_euler: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl BoneTransform {
    pub fn get(&self, channel: Channel) -> Value {
        match channel {
            Channel::Location => Value::Vec3(self.location),
            Channel::RotationQuaternion => Value::Quat(self.rotation_quaternion),
            Channel::RotationEuler => Value::Vec3(self.rotation_euler),
            Channel::Scale => Value::Vec3(self.scale),
        }
    }

    /// Set one channel; mismatched value kinds are ignored.
    pub fn set(&mut self, channel: Channel, value: Value) {
        match (channel, value) {
            (Channel::Location, Value::Vec3(v)) => self.location = v,
            (Channel::RotationQuaternion, Value::Quat(q)) => self.rotation_quaternion = q,
            (Channel::RotationEuler, Value::Vec3(v)) => self.rotation_euler = v,
            (Channel::Scale, Value::Vec3(v)) => self.scale = v,
            _ => {}
        }
    }
}

/// Current pose of one skeleton, indexed like `Skeleton::bones()`.
#[derive(Clone, Debug, PartialEq)]
pub struct Pose {
    transforms: Vec<BoneTransform>,
}

impl Pose {
    pub fn rest(skeleton: &Skeleton) -> Self {
        Self {
            transforms: vec![BoneTransform::default(); skeleton.len()],
        }
    }

    /// Clear every bone back to rest.
    #[inline]
    pub fn reset(&mut self) {
        self.transforms.fill(BoneTransform::default());
    }

    #[inline]
    pub fn get(&self, bone: usize) -> Option<&BoneTransform> {
        self.transforms.get(bone)
    }

    #[inline]
    pub fn get_mut(&mut self, bone: usize) -> Option<&mut BoneTransform> {
        self.transforms.get_mut(bone)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

/// Tracks of one bone, by channel (`Channel::ALL` order).
type ChannelTracks<'a> = [Option<&'a Track>; 4];

fn slot(channel: Channel) -> usize {
    match channel {
        Channel::Location => 0,
        Channel::RotationQuaternion => 1,
        Channel::RotationEuler => 2,
        Channel::Scale => 3,
    }
}

pub struct PoseEvaluator<'a> {
    skeleton: &'a Skeleton,
    bindings: Vec<ChannelTracks<'a>>,
}

impl<'a> PoseEvaluator<'a> {
    /// Bind `clip` to `skeleton`. Fails for clips the core cannot read.
    pub fn new(skeleton: &'a Skeleton, clip: &'a AnimationClip) -> Result<Self, RigError> {
        if !clip.format.is_samplable() {
            return Err(RigError::UnsupportedClipFormat {
                clip: clip.name.clone(),
                format: clip.format.as_str().to_string(),
            });
        }
        let mut bindings: Vec<ChannelTracks<'a>> = vec![[None; 4]; skeleton.len()];
        for track in &clip.tracks {
            match skeleton.index_of(&track.bone) {
                Some(idx) => bindings[idx][slot(track.channel)] = Some(track),
                None => debug!(
                    "track '{}.{}' has no bone in '{}'; ignored",
                    track.bone,
                    track.channel.as_str(),
                    skeleton.name
                ),
            }
        }
        Ok(Self { skeleton, bindings })
    }

    /// Overwrite `pose` with the clip's pose at `frame`.
    pub fn evaluate(&self, frame: f32, pose: &mut Pose) {
        pose.reset();
        for (idx, tracks) in self.bindings.iter().enumerate() {
            let Some(xf) = pose.get_mut(idx) else {
                continue;
            };
            let sample = |c: Channel| tracks[slot(c)].and_then(|t| sample_track(t, frame));

            if let Some(Value::Vec3(v)) = sample(Channel::Location) {
                xf.location = v;
            }
            if let Some(Value::Vec3(v)) = sample(Channel::Scale) {
                xf.scale = v;
            }

            let quat = sample(Channel::RotationQuaternion).and_then(|v| v.as_quat());
            let euler = sample(Channel::RotationEuler).and_then(|v| v.as_vec3());
            let mode = self.skeleton.bones()[idx].rotation_mode;
            match (quat, euler) {
                (Some(q), Some(e)) => match mode {
                    RotationMode::Quaternion => {
                        xf.rotation_quaternion = q;
                        xf.rotation_euler = quat_to_euler(q);
                    }
                    RotationMode::EulerXyz => {
                        xf.rotation_euler = e;
                        xf.rotation_quaternion = euler_to_quat(e);
                    }
                },
                (Some(q), None) => {
                    xf.rotation_quaternion = q;
                    xf.rotation_euler = quat_to_euler(q);
                }
                (None, Some(e)) => {
                    xf.rotation_euler = e;
                    xf.rotation_quaternion = euler_to_quat(e);
                }
                (None, None) => {}
            }
        }
    }
}

/// One-shot pose evaluation at `frame`.
pub fn evaluate_pose(
    skeleton: &Skeleton,
    clip: &AnimationClip,
    frame: f32,
) -> Result<Pose, RigError> {
    let evaluator = PoseEvaluator::new(skeleton, clip)?;
    let mut pose = Pose::rest(skeleton);
    evaluator.evaluate(frame, &mut pose);
    Ok(pose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ClipFormat, FrameRange, Interpolation};
    use crate::skeleton::BoneDef;

    #[test]
    fn rotation_mode_picks_the_authoritative_channel() {
        let sk = Skeleton::new(
            "s",
            [
                BoneDef::new("Quat"),
                BoneDef::new("Euler").rotation_mode(RotationMode::EulerXyz),
                BoneDef::new("Still"),
            ],
        )
        .unwrap();
        let mut clip = AnimationClip::new("c", FrameRange::new(0, 1), ClipFormat::Keyframed);
        for bone in ["Quat", "Euler"] {
            clip.track_mut(bone, Channel::RotationQuaternion).insert(
                0,
                Value::Quat(IDENTITY_QUAT),
                Interpolation::Linear,
            );
            clip.track_mut(bone, Channel::RotationEuler).insert(
                0,
                Value::Vec3([0.4, 0.0, 0.0]),
                Interpolation::Linear,
            );
        }

        let pose = evaluate_pose(&sk, &clip, 0.0).unwrap();
        let quat_bone = pose.get(0).unwrap();
        assert_eq!(quat_bone.rotation_quaternion, IDENTITY_QUAT);
        assert!(quat_bone.rotation_euler[0].abs() < 1e-6);

        let euler_bone = pose.get(1).unwrap();
        assert_eq!(euler_bone.rotation_euler, [0.4, 0.0, 0.0]);
        assert!((euler_bone.rotation_quaternion[0] - 0.2f32.sin()).abs() < 1e-6);

        assert_eq!(*pose.get(2).unwrap(), BoneTransform::default());
    }
}
