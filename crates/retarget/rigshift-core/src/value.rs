//! Pose channel kinds and the typed values stored in keyframes.

use serde::{Deserialize, Serialize};

/// Local transform channel of a bone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Location,
    RotationQuaternion,
    RotationEuler,
    Scale,
}

impl Channel {
    /// All channels in the order the baker writes them.
    pub const ALL: [Channel; 4] = [
        Channel::Location,
        Channel::RotationQuaternion,
        Channel::RotationEuler,
        Channel::Scale,
    ];

    /// Value kind a track on this channel must hold.
    #[inline]
    pub fn value_kind(self) -> ValueKind {
        match self {
            Channel::RotationQuaternion => ValueKind::Quat,
            _ => ValueKind::Vec3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Location => "location",
            Channel::RotationQuaternion => "rotation_quaternion",
            Channel::RotationEuler => "rotation_euler",
            Channel::Scale => "scale",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Vec3,
    Quat,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Value {
    /// Location, euler angles (radians, XYZ order) or scale.
    Vec3([f32; 3]),
    /// Quaternion (x, y, z, w)
    Quat([f32; 4]),
}

impl Value {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Quat(_) => ValueKind::Quat,
        }
    }

    pub fn as_vec3(&self) -> Option<[f32; 3]> {
        match self {
            Value::Vec3(v) => Some(*v),
            Value::Quat(_) => None,
        }
    }

    pub fn as_quat(&self) -> Option<[f32; 4]> {
        match self {
            Value::Quat(q) => Some(*q),
            Value::Vec3(_) => None,
        }
    }

    /// Component-wise `self + other * k`; quaternions are returned unchanged.
    pub(crate) fn offset_by(&self, other: &Value, k: f32) -> Value {
        match (self, other) {
            (Value::Vec3(a), Value::Vec3(b)) => {
                Value::Vec3([a[0] + b[0] * k, a[1] + b[1] * k, a[2] + b[2] * k])
            }
            _ => *self,
        }
    }

    /// Component-wise `self - other`; quaternions yield identity deltas.
    pub(crate) fn delta(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Vec3(a), Value::Vec3(b)) => {
                Value::Vec3([a[0] - b[0], a[1] - b[1], a[2] - b[2]])
            }
            _ => Value::Quat([0.0, 0.0, 0.0, 1.0]),
        }
    }
}
