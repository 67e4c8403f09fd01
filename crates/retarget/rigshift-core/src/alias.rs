//! Canonical joint alias table.
//!
//! Each canonical joint lists the concrete bone names it goes by across common
//! rig conventions (Mixamo-style `LeftArm`, game-rig `UpperArm_L`, Rigify-style
//! `upper_arm.L`, ...). Variant order matters: the first variant found wins.

use crate::skeleton::Skeleton;

#[derive(Debug, Clone, Copy)]
pub struct CanonicalJoint {
    pub id: &'static str,
    pub variants: &'static [&'static str],
}

const fn joint(id: &'static str, variants: &'static [&'static str]) -> CanonicalJoint {
    CanonicalJoint { id, variants }
}

pub static CANONICAL_JOINTS: &[CanonicalJoint] = &[
    joint("hips", &["Hips", "hips", "pelvis", "Pelvis", "Root"]),
    joint("spine", &["Spine", "spine", "Spine1", "Spine_01"]),
    joint("chest", &["Chest", "chest", "Spine2", "UpperSpine", "UpperChest"]),
    joint("neck", &["Neck", "neck", "Neck1"]),
    joint("head", &["Head", "head", "HeadTop_End"]),
    // Left arm
    joint(
        "l_shoulder",
        &["LeftShoulder", "L_Shoulder", "shoulder.L", "Shoulder_L", "L_Clavicle", "Clavicle_L"],
    ),
    joint("l_arm", &["LeftArm", "L_UpperArm", "upper_arm.L", "UpperArm_L"]),
    joint("l_forearm", &["LeftForeArm", "L_ForeArm", "forearm.L", "ForeArm_L"]),
    joint("l_hand", &["LeftHand", "L_Hand", "hand.L", "Hand_L", "L_Wrist"]),
    // Right arm
    joint(
        "r_shoulder",
        &["RightShoulder", "R_Shoulder", "shoulder.R", "Shoulder_R", "R_Clavicle", "Clavicle_R"],
    ),
    joint("r_arm", &["RightArm", "R_UpperArm", "upper_arm.R", "UpperArm_R"]),
    joint("r_forearm", &["RightForeArm", "R_ForeArm", "forearm.R", "ForeArm_R"]),
    joint("r_hand", &["RightHand", "R_Hand", "hand.R", "Hand_R", "R_Wrist"]),
    // Left leg
    joint("l_upleg", &["LeftUpLeg", "L_Thigh", "thigh.L", "Thigh_L", "Left_Thigh"]),
    joint("l_leg", &["LeftLeg", "L_Shin", "shin.L", "Shin_L", "L_Calf", "Calf_L"]),
    joint("l_foot", &["LeftFoot", "L_Foot", "foot.L", "Foot_L", "L_Ankle"]),
    // Right leg
    joint("r_upleg", &["RightUpLeg", "R_Thigh", "thigh.R", "Thigh_R", "Right_Thigh"]),
    joint("r_leg", &["RightLeg", "R_Shin", "shin.R", "Shin_R", "R_Calf", "Calf_R"]),
    joint("r_foot", &["RightFoot", "R_Foot", "foot.R", "Foot_R", "R_Ankle"]),
];

pub fn canonical_joint(id: &str) -> Option<&'static CanonicalJoint> {
    CANONICAL_JOINTS.iter().find(|j| j.id == id)
}

/// Strip an exporter namespace such as `mixamorig:` from a bone name.
#[inline]
pub fn strip_namespace(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// Bone matching one variant: exact name, then the first case-insensitive
/// match in skeleton order, then the same on namespace-stripped names.
pub fn find_variant<'s>(skeleton: &'s Skeleton, variant: &str) -> Option<&'s str> {
    if let Some(idx) = skeleton.index_of(variant) {
        return skeleton.bone(idx).map(|b| b.name.as_str());
    }
    if let Some(bone) = skeleton.find_case_insensitive(variant) {
        return Some(&bone.name);
    }
    skeleton
        .names()
        .find(|name| name.contains(':') && strip_namespace(name).eq_ignore_ascii_case(variant))
}

/// Bone for the first variant in `variants` that resolves on `skeleton`.
pub fn find_joint<'s>(skeleton: &'s Skeleton, variants: &[&str]) -> Option<&'s str> {
    variants.iter().find_map(|v| find_variant(skeleton, v))
}
