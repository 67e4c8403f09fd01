//! Interpolation primitives:
//! - lerp / NLERP with shortest-arc correction
//! - auto-clamped cubic bezier over neighbouring keys
//! - `interpolate_segment` dispatching on the left key's mode

use crate::data::{Interpolation, Keyframe};
use crate::value::Value;

#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_vec3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
    ]
}

#[inline]
fn dot4(a: [f32; 4], b: [f32; 4]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

#[inline]
pub(crate) fn normalize4(mut q: [f32; 4]) -> [f32; 4] {
    let len2 = dot4(q, q);
    if len2 > 0.0 {
        let inv_len = len2.sqrt().recip();
        for c in &mut q {
            *c *= inv_len;
        }
    }
    q
}

/// Quaternion NLERP with shortest-arc correction.
/// If dot < 0, negate the second quaternion to ensure the shortest path.
/// Returns a normalized quaternion (x,y,z,w).
#[inline]
pub fn nlerp_quat(a: [f32; 4], mut b: [f32; 4], t: f32) -> [f32; 4] {
    if dot4(a, b) < 0.0 {
        for c in &mut b {
            *c = -*c;
        }
    }
    normalize4([
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
        lerp_f32(a[3], b[3], t),
    ])
}

/// Linear interpolation across value kinds.
pub fn linear_value(a: &Value, b: &Value, t: f32) -> Value {
    match (a, b) {
        (Value::Vec3(va), Value::Vec3(vb)) => Value::Vec3(lerp_vec3(*va, *vb, t)),
        (Value::Quat(qa), Value::Quat(qb)) => Value::Quat(nlerp_quat(*qa, *qb, t)),
        // Mismatched kinds: hold the left value.
        _ => *a,
    }
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Slope at `cur` from its neighbours, flattened at local extrema and at the
/// ends of the track so the curve never overshoots the keyed values.
#[inline]
fn clamped_slope(prev: Option<(f32, f32)>, cur: (f32, f32), next: Option<(f32, f32)>) -> f32 {
    let (Some((fp, vp)), Some((fn_, vn))) = (prev, next) else {
        return 0.0;
    };
    if (cur.1 - vp) * (vn - cur.1) <= 0.0 {
        return 0.0;
    }
    let span = fn_ - fp;
    if span <= 0.0 {
        return 0.0;
    }
    (vn - vp) / span
}

fn components(v: &Value) -> ([f32; 4], usize) {
    match v {
        Value::Vec3(a) => ([a[0], a[1], a[2], 0.0], 3),
        Value::Quat(q) => (*q, 4),
    }
}

/// Bezier segment between `keys[i]` and `keys[i + 1]` at local `t` in [0, 1].
fn bezier_segment(keys: &[Keyframe], i: usize, t: f32) -> Value {
    let k0 = &keys[i];
    let k1 = &keys[i + 1];
    let (a, n) = components(&k0.value);
    let (mut b, _) = components(&k1.value);
    if k0.value.kind() != k1.value.kind() {
        return k0.value;
    }
    let is_quat = matches!(k0.value, Value::Quat(_));
    if is_quat && dot4(a, b) < 0.0 {
        for c in &mut b {
            *c = -*c;
        }
    }

    let f0 = k0.frame as f32;
    let f1 = k1.frame as f32;
    let dt = f1 - f0;
    let prev = i.checked_sub(1).map(|p| &keys[p]);
    let next = keys.get(i + 2);

    let mut out = [0.0f32; 4];
    for c in 0..n {
        let pick = |k: &Keyframe| (k.frame as f32, components(&k.value).0[c]);
        let m0 = clamped_slope(prev.map(pick), (f0, a[c]), Some((f1, b[c])));
        let m1 = clamped_slope(Some((f0, a[c])), (f1, b[c]), next.map(pick));
        let h0 = a[c] + m0 * dt / 3.0;
        let h1 = b[c] - m1 * dt / 3.0;
        out[c] = cubic_bezier(a[c], h0, h1, b[c], t);
    }

    if is_quat {
        Value::Quat(normalize4(out))
    } else {
        Value::Vec3([out[0], out[1], out[2]])
    }
}

/// Interpolate between `keys[i]` and `keys[i + 1]` using the left key's mode.
pub fn interpolate_segment(keys: &[Keyframe], i: usize, t: f32) -> Value {
    let left = &keys[i];
    let Some(right) = keys.get(i + 1) else {
        return left.value;
    };
    let t = t.clamp(0.0, 1.0);
    match left.interpolation {
        Interpolation::Constant => left.value,
        Interpolation::Linear => linear_value(&left.value, &right.value, t),
        Interpolation::Bezier => bezier_segment(keys, i, t),
    }
}
