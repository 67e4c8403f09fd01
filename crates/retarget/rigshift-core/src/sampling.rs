//! Track sampling at arbitrary (fractional) frames.
//!
//! Model:
//! - Inside the keyed span, the segment [Ki -> K(i+1)] is interpolated with
//!   Ki's interpolation mode.
//! - Outside the span a track holds its first/last value, unless it carries a
//!   cycle modifier: then it repeats with period `last - first`, and
//!   `RepeatOffset` shifts each repetition by `last.value - first.value`
//!   (vector channels only; quaternions repeat verbatim).

use crate::data::{CycleMode, Keyframe, Track};
use crate::interp::interpolate_segment;
use crate::value::Value;

/// Find the segment containing `frame`; returns (i, local_t) for [i, i+1].
/// Callers guarantee `keys[0].frame <= frame <= keys[last].frame` and len >= 2.
fn find_segment(keys: &[Keyframe], frame: f32) -> (usize, f32) {
    let n = keys.len();
    // Index of the first key strictly after `frame`.
    let upper = keys.partition_point(|k| (k.frame as f32) <= frame);
    let i = upper.saturating_sub(1).min(n - 2);
    let f0 = keys[i].frame as f32;
    let f1 = keys[i + 1].frame as f32;
    let denom = (f1 - f0).max(f32::EPSILON);
    (i, ((frame - f0) / denom).clamp(0.0, 1.0))
}

fn sample_within(keys: &[Keyframe], frame: f32) -> Value {
    let first = &keys[0];
    let last = &keys[keys.len() - 1];
    if keys.len() == 1 || frame <= first.frame as f32 {
        return first.value;
    }
    if frame >= last.frame as f32 {
        return last.value;
    }
    let (i, t) = find_segment(keys, frame);
    interpolate_segment(keys, i, t)
}

/// Sample a track at `frame`. Returns `None` for a track without keys.
pub fn sample_track(track: &Track, frame: f32) -> Option<Value> {
    let keys = &track.keys;
    let first = keys.first()?;
    let last = keys.last()?;
    let f0 = first.frame as f32;
    let f1 = last.frame as f32;
    let period = f1 - f0;

    let mode = match track.cycles {
        Some(m) if frame > f1 => Some(m.after),
        Some(m) if frame < f0 => Some(m.before),
        _ => None,
    };
    let Some(mode) = mode.filter(|_| period > 0.0) else {
        return Some(sample_within(keys, frame));
    };

    let cycle = ((frame - f0) / period).floor();
    let local = frame - cycle * period;
    let value = sample_within(keys, local);
    Some(match mode {
        CycleMode::Repeat => value,
        CycleMode::RepeatOffset => value.offset_by(&last.value.delta(&first.value), cycle),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CycleModifier, Interpolation};
    use crate::value::Channel;

    fn ramp() -> Track {
        let mut t = Track::new("Hips", Channel::Location);
        t.insert(0, Value::Vec3([0.0, 0.0, 0.0]), Interpolation::Linear);
        t.insert(10, Value::Vec3([1.0, 0.0, 0.0]), Interpolation::Linear);
        t
    }

    #[test]
    fn holds_outside_without_modifier() {
        let t = ramp();
        assert_eq!(sample_track(&t, -5.0), Some(Value::Vec3([0.0; 3])));
        assert_eq!(sample_track(&t, 25.0), Some(Value::Vec3([1.0, 0.0, 0.0])));
        assert_eq!(sample_track(&t, 5.0), Some(Value::Vec3([0.5, 0.0, 0.0])));
    }

    #[test]
    fn repeat_offset_accumulates() {
        let mut t = ramp();
        t.cycles = Some(CycleModifier::REPEAT_OFFSET);
        let v = sample_track(&t, 15.0).unwrap().as_vec3().unwrap();
        assert!((v[0] - 1.5).abs() < 1e-6);
        let v = sample_track(&t, -5.0).unwrap().as_vec3().unwrap();
        assert!((v[0] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn empty_track_has_no_sample() {
        assert_eq!(sample_track(&Track::new("Hips", Channel::Scale), 0.0), None);
    }
}
