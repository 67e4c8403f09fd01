//! Euler (XYZ) <-> quaternion conversion.

use nalgebra::{Quaternion, UnitQuaternion};

pub const IDENTITY_QUAT: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Quaternion (x, y, z, w) for euler angles applied X, then Y, then Z.
pub fn euler_to_quat(e: [f32; 3]) -> [f32; 4] {
    let q = UnitQuaternion::from_euler_angles(e[0], e[1], e[2]).into_inner();
    [q.i, q.j, q.k, q.w]
}

/// XYZ euler angles for a quaternion (x, y, z, w); the input is normalized first.
pub fn quat_to_euler(q: [f32; 4]) -> [f32; 3] {
    let uq = UnitQuaternion::from_quaternion(Quaternion::new(q[3], q[0], q[1], q[2]));
    let (roll, pitch, yaw) = uq.euler_angles();
    [roll, pitch, yaw]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_within_gimbal_limits() {
        let e = [0.3, -0.4, 1.1];
        let back = quat_to_euler(euler_to_quat(e));
        for k in 0..3 {
            assert!((e[k] - back[k]).abs() < 1e-5, "{e:?} vs {back:?}");
        }
    }

    #[test]
    fn zero_is_identity() {
        assert_eq!(euler_to_quat([0.0; 3]), IDENTITY_QUAT);
    }
}
