use rigshift_core::{
    finalize, sample_track, AnimationClip, Channel, ClipFormat, CycleModifier, FrameRange,
    Interpolation, LoopStatus, Value,
};

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn stride(format: ClipFormat) -> AnimationClip {
    let mut clip = AnimationClip::new("Stride", FrameRange::new(0, 8), format);
    let loc = clip.track_mut("Hips", Channel::Location);
    loc.insert(0, Value::Vec3([0.0, 0.0, 0.0]), Interpolation::Bezier);
    loc.insert(4, Value::Vec3([0.0, 0.5, 0.1]), Interpolation::Constant);
    loc.insert(8, Value::Vec3([0.0, 1.0, 0.0]), Interpolation::Bezier);
    let rot = clip.track_mut("Hips", Channel::RotationQuaternion);
    rot.insert(0, Value::Quat([0.0, 0.0, 0.0, 1.0]), Interpolation::Linear);
    rot.insert(8, Value::Quat([0.0, 0.0, 0.0, 1.0]), Interpolation::Linear);
    clip
}

#[test]
fn finalize_is_idempotent() {
    let mut once = stride(ClipFormat::Keyframed);
    assert_eq!(finalize(&mut once), LoopStatus::Looped);
    let mut twice = once.clone();
    assert_eq!(finalize(&mut twice), LoopStatus::Looped);
    assert_eq!(once, twice);
    for track in &once.tracks {
        assert_eq!(track.cycles, Some(CycleModifier::REPEAT_OFFSET));
        assert!(track.keys.iter().all(|k| k.interpolation == Interpolation::Linear));
    }
}

#[test]
fn repeat_offset_continues_travel_past_the_range() {
    let mut clip = stride(ClipFormat::Captured);
    finalize(&mut clip);
    let loc = clip.track("Hips", Channel::Location).unwrap();

    let at = |f: f32| sample_track(loc, f).unwrap().as_vec3().unwrap();
    // One stride later the hips are one stride further forward.
    assert!(approx(at(10.0)[1], at(2.0)[1] + 1.0, 1e-5));
    assert!(approx(at(10.0)[2], at(2.0)[2], 1e-5));
    // And one stride earlier, one stride behind.
    assert!(approx(at(-6.0)[1], at(2.0)[1] - 1.0, 1e-5));

    let rot = clip.track("Hips", Channel::RotationQuaternion).unwrap();
    assert_eq!(sample_track(rot, 20.0), Some(Value::Quat([0.0, 0.0, 0.0, 1.0])));
}

#[test]
fn degraded_formats_are_untouched() {
    for format in [ClipFormat::Layered, ClipFormat::Opaque] {
        let mut clip = stride(format);
        let before = clip.clone();
        assert_eq!(finalize(&mut clip), LoopStatus::Degraded);
        assert_eq!(clip, before);
    }
}
