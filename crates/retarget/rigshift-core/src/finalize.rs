//! Loop post-processing applied to every clip before export.

use tracing::{debug, warn};

use crate::data::{AnimationClip, CycleModifier, Interpolation};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopStatus {
    /// Keys are linear and every track repeats with offset.
    Looped,
    /// The clip format cannot hold cycle modifiers; the clip is untouched.
    Degraded,
}

/// Make `clip` loop seamlessly: linear keys everywhere and a repeat-with-offset
/// cycle modifier before and after every track. Running it twice is the same
/// as running it once.
pub fn finalize(clip: &mut AnimationClip) -> LoopStatus {
    if !clip.format.supports_cycle_modifiers() {
        warn!(
            "clip '{}' is {}; cycle modifiers unavailable, loop seamlessness not guaranteed",
            clip.name,
            clip.format.as_str()
        );
        return LoopStatus::Degraded;
    }

    for track in &mut clip.tracks {
        for key in &mut track.keys {
            key.interpolation = Interpolation::Linear;
        }
        track.cycles = Some(CycleModifier::REPEAT_OFFSET);
    }
    clip.cyclic = true;
    debug!("finalized '{}' ({} tracks)", clip.name, clip.tracks.len());
    LoopStatus::Looped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ClipFormat, FrameRange};
    use crate::value::{Channel, Value};

    fn clip(format: ClipFormat) -> AnimationClip {
        let mut c = AnimationClip::new("c", FrameRange::new(0, 4), format);
        let t = c.track_mut("Hips", Channel::Location);
        t.insert(0, Value::Vec3([0.0; 3]), Interpolation::Bezier);
        t.insert(4, Value::Vec3([1.0, 0.0, 0.0]), Interpolation::Constant);
        c
    }

    #[test]
    fn layered_clip_is_left_alone() {
        let mut c = clip(ClipFormat::Layered);
        let before = c.clone();
        assert_eq!(finalize(&mut c), LoopStatus::Degraded);
        assert_eq!(c, before);
    }

    #[test]
    fn keyed_clip_gets_linear_keys_and_offsets() {
        let mut c = clip(ClipFormat::Keyframed);
        assert_eq!(finalize(&mut c), LoopStatus::Looped);
        assert!(c.cyclic);
        let t = &c.tracks[0];
        assert_eq!(t.cycles, Some(CycleModifier::REPEAT_OFFSET));
        assert!(t.keys.iter().all(|k| k.interpolation == Interpolation::Linear));
    }
}
