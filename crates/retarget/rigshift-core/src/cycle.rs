//! Procedural sprint cycle.
//!
//! One stride spans `duration` frames; the phase at frame `f` is
//! `φ = f / duration · 2π`. Every animated joint is a closed-form function of
//! φ. Right limbs run half a cycle (π) behind left limbs, and each upper arm
//! swings in phase with the opposite thigh. Knee bends only grow from a rest
//! bend, so the hinge never hyperextends.

use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::alias::{canonical_joint, find_joint};
use crate::data::{AnimationClip, ClipFormat, FrameRange, Interpolation};
use crate::skeleton::Skeleton;
use crate::value::{Channel, Value};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SprintParams {
    pub clip_name: String,
    /// Frames per stride; the clip spans [0, duration].
    pub duration: u32,
    /// Vertical hip bob (location z, twice per stride).
    pub hip_bob: f32,
    /// Forward/back hip sway (location y, once per stride).
    pub hip_sway: f32,
    /// Spine counter-rotation amplitude about z, radians.
    pub spine_twist: f32,
    pub thigh_swing_deg: f32,
    pub thigh_bias_deg: f32,
    pub knee_rest_deg: f32,
    pub knee_swing_deg: f32,
    pub arm_swing_deg: f32,
    /// Arm abduction that brings an A-pose rig's arms down to the sides.
    pub arm_apose_deg: f32,
    pub elbow_bend_deg: f32,
}

impl Default for SprintParams {
    fn default() -> Self {
        Self {
            clip_name: "Sprint_Pro".to_string(),
            duration: 18,
            hip_bob: 0.05,
            hip_sway: 0.05,
            spine_twist: 0.1,
            thigh_swing_deg: 40.0,
            thigh_bias_deg: 10.0,
            knee_rest_deg: 10.0,
            knee_swing_deg: 100.0,
            arm_swing_deg: 50.0,
            arm_apose_deg: 20.0,
            elbow_bend_deg: 80.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Phase shift of this side's legs.
    #[inline]
    fn leg_phase(self) -> f32 {
        match self {
            Side::Left => 0.0,
            Side::Right => PI,
        }
    }

    /// Sign applied to the A-pose correction.
    #[inline]
    fn outward(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LocomotionRole {
    Hips,
    Spine,
    Thigh(Side),
    Shin(Side),
    UpperArm(Side),
    Forearm(Side),
}

impl LocomotionRole {
    pub const ALL: [LocomotionRole; 10] = [
        LocomotionRole::Hips,
        LocomotionRole::Spine,
        LocomotionRole::Thigh(Side::Left),
        LocomotionRole::Shin(Side::Left),
        LocomotionRole::Thigh(Side::Right),
        LocomotionRole::Shin(Side::Right),
        LocomotionRole::Forearm(Side::Left),
        LocomotionRole::Forearm(Side::Right),
        LocomotionRole::UpperArm(Side::Left),
        LocomotionRole::UpperArm(Side::Right),
    ];

    fn canonical_id(self) -> &'static str {
        use LocomotionRole::*;
        match self {
            Hips => "hips",
            Spine => "spine",
            Thigh(Side::Left) => "l_upleg",
            Thigh(Side::Right) => "r_upleg",
            Shin(Side::Left) => "l_leg",
            Shin(Side::Right) => "r_leg",
            UpperArm(Side::Left) => "l_arm",
            UpperArm(Side::Right) => "r_arm",
            Forearm(Side::Left) => "l_forearm",
            Forearm(Side::Right) => "r_forearm",
        }
    }

    /// Name fragments tried as case-insensitive substrings when no alias matches.
    fn fragments(self) -> &'static [&'static str] {
        use LocomotionRole::*;
        match self {
            Hips => &["Hips", "Root", "Pelvis"],
            Spine => &["Spine"],
            Thigh(Side::Left) => &["LeftUpLeg", "L_Thigh", "Thigh_L", "UpLeg.L"],
            Thigh(Side::Right) => &["RightUpLeg", "R_Thigh", "Thigh_R", "UpLeg.R"],
            Shin(Side::Left) => &["LeftLeg", "L_Shin", "Shin_L", "Leg.L"],
            Shin(Side::Right) => &["RightLeg", "R_Shin", "Shin_R", "Leg.R"],
            UpperArm(Side::Left) => &["LeftArm", "L_UpperArm", "Arm_L"],
            UpperArm(Side::Right) => &["RightArm", "R_UpperArm", "Arm_R"],
            Forearm(Side::Left) => &["LeftForeArm", "L_ForeArm", "ForeArm_L"],
            Forearm(Side::Right) => &["RightForeArm", "R_ForeArm", "ForeArm_R"],
        }
    }
}

/// Bone for each locomotion role present on `skeleton`, each bone used once.
///
/// Aliases are tried for every role first; roles still open then take the
/// first unclaimed bone containing one of their fragments.
pub fn resolve_roles(skeleton: &Skeleton) -> Vec<(LocomotionRole, &str)> {
    fn claimed(found: &[(LocomotionRole, &str)], name: &str) -> bool {
        found.iter().any(|(_, n)| *n == name)
    }

    let mut found: Vec<(LocomotionRole, &str)> = Vec::new();

    for role in LocomotionRole::ALL {
        let hit = canonical_joint(role.canonical_id())
            .and_then(|j| find_joint(skeleton, j.variants))
            .filter(|n| !claimed(&found, n));
        if let Some(name) = hit {
            found.push((role, name));
        }
    }

    for role in LocomotionRole::ALL {
        if found.iter().any(|(r, _)| *r == role) {
            continue;
        }
        let hit = role.fragments().iter().find_map(|frag| {
            let frag = frag.to_ascii_lowercase();
            skeleton
                .names()
                .find(|n| n.to_ascii_lowercase().contains(&frag) && !claimed(&found, *n))
        });
        if let Some(name) = hit {
            found.push((role, name));
        }
    }

    for (role, name) in &found {
        debug!("locomotion role {role:?} -> '{name}'");
    }
    found
}

/// Phase at `frame` for a stride of `duration` frames.
#[inline]
pub fn phase(frame: i32, duration: u32) -> f32 {
    frame as f32 / duration as f32 * TAU
}

/// Last frame of a stride: `duration`, at least 2 and at most `i32::MAX`.
pub fn stride_end(duration: u32) -> i32 {
    i32::try_from(duration.max(2)).unwrap_or(i32::MAX)
}

/// Channel values of `role` at phase `phi`.
pub fn role_pose(role: LocomotionRole, phi: f32, p: &SprintParams) -> Vec<(Channel, Value)> {
    let rad = f32::to_radians;
    match role {
        LocomotionRole::Hips => vec![(
            Channel::Location,
            Value::Vec3([0.0, phi.sin() * p.hip_sway, (phi * 2.0).sin() * p.hip_bob]),
        )],
        LocomotionRole::Spine => vec![(
            Channel::RotationEuler,
            Value::Vec3([0.0, 0.0, phi.sin() * p.spine_twist]),
        )],
        LocomotionRole::Thigh(side) => {
            let x = rad(p.thigh_swing_deg) * (phi + side.leg_phase()).sin() + rad(p.thigh_bias_deg);
            vec![(Channel::RotationEuler, Value::Vec3([x, 0.0, 0.0]))]
        }
        LocomotionRole::Shin(side) => {
            let lift = 0.5 * (1.0 + (phi + side.leg_phase()).sin());
            let x = rad(p.knee_rest_deg) + rad(p.knee_swing_deg) * lift;
            vec![(Channel::RotationEuler, Value::Vec3([x, 0.0, 0.0]))]
        }
        LocomotionRole::UpperArm(side) => {
            // Swings with the opposite-side thigh.
            let opposite = match side {
                Side::Left => Side::Right,
                Side::Right => Side::Left,
            };
            let x = rad(p.arm_swing_deg) * (phi + opposite.leg_phase()).sin();
            let z = side.outward() * rad(p.arm_apose_deg);
            vec![(Channel::RotationEuler, Value::Vec3([x, 0.0, z]))]
        }
        LocomotionRole::Forearm(_) => vec![(
            Channel::RotationEuler,
            Value::Vec3([rad(p.elbow_bend_deg), 0.0, 0.0]),
        )],
    }
}

/// Generate one sprint stride for `target`. Roles the skeleton lacks are skipped.
pub fn generate_sprint(target: &Skeleton, params: &SprintParams) -> AnimationClip {
    let end = stride_end(params.duration);
    let duration = end as u32;
    let range = FrameRange::new(0, end);
    let mut clip = AnimationClip::new(params.clip_name.clone(), range, ClipFormat::Keyframed);

    let roles = resolve_roles(target);
    for frame in range.frames() {
        let phi = phase(frame, duration);
        for (role, bone) in &roles {
            for (channel, value) in role_pose(*role, phi, params) {
                clip.track_mut(bone, channel)
                    .insert(frame, value, Interpolation::Linear);
            }
        }
    }

    info!(
        "generated '{}' over [0, {duration}] for {} of {} locomotion roles",
        clip.name,
        roles.len(),
        LocomotionRole::ALL.len()
    );
    clip
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knee_never_bends_below_rest() {
        let p = SprintParams::default();
        for f in 0..=p.duration as i32 {
            for side in [Side::Left, Side::Right] {
                let v = role_pose(LocomotionRole::Shin(side), phase(f, p.duration), &p);
                let x = v[0].1.as_vec3().unwrap()[0];
                assert!(x >= p.knee_rest_deg.to_radians() - 1e-6);
            }
        }
    }

    #[test]
    fn stride_end_stays_in_frame_range() {
        assert_eq!(stride_end(0), 2);
        assert_eq!(stride_end(18), 18);
        assert_eq!(stride_end(i32::MAX as u32), i32::MAX);
        assert_eq!(stride_end(u32::MAX), i32::MAX);
        assert!(phase(stride_end(u32::MAX), i32::MAX as u32) > 0.0);
    }
}
