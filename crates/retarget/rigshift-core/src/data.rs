//! Animation clip data model: keyframes, per-(bone, channel) tracks and clips.

use serde::{Deserialize, Serialize};

use crate::error::RigError;
use crate::value::{Channel, Value};

/// How a key blends towards the next one.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Interpolation {
    Constant,
    #[default]
    Linear,
    Bezier,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub frame: i32,
    pub value: Value,
    #[serde(default)]
    pub interpolation: Interpolation,
}

/// Extrapolation applied outside a track's keyed span.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleMode {
    Repeat,
    /// Repeat, shifting each cycle by the end-minus-start delta.
    RepeatOffset,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleModifier {
    pub before: CycleMode,
    pub after: CycleMode,
}

impl CycleModifier {
    pub const REPEAT_OFFSET: CycleModifier = CycleModifier {
        before: CycleMode::RepeatOffset,
        after: CycleMode::RepeatOffset,
    };
}

/// Keys for one channel of one bone, frames strictly increasing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub bone: String,
    pub channel: Channel,
    pub keys: Vec<Keyframe>,
    #[serde(default)]
    pub cycles: Option<CycleModifier>,
}

impl Track {
    pub fn new(bone: impl Into<String>, channel: Channel) -> Self {
        Self {
            bone: bone.into(),
            channel,
            keys: Vec::new(),
            cycles: None,
        }
    }

    /// Insert a key, replacing any key already at `frame`.
    pub fn insert(&mut self, frame: i32, value: Value, interpolation: Interpolation) {
        let key = Keyframe {
            frame,
            value,
            interpolation,
        };
        match self.keys.binary_search_by_key(&frame, |k| k.frame) {
            Ok(pos) => self.keys[pos] = key,
            Err(pos) => self.keys.insert(pos, key),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn first_frame(&self) -> Option<i32> {
        self.keys.first().map(|k| k.frame)
    }

    pub fn last_frame(&self) -> Option<i32> {
        self.keys.last().map(|k| k.frame)
    }
}

/// Storage representation of a clip, as reported by the importer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipFormat {
    /// Sparse keyframes with per-track modifiers.
    #[default]
    Keyframed,
    /// Raw captured motion: one key per frame.
    Captured,
    /// Samplable, but per-track modifiers cannot be attached.
    Layered,
    /// Not readable by the core.
    Opaque,
}

impl ClipFormat {
    #[inline]
    pub fn is_samplable(self) -> bool {
        !matches!(self, ClipFormat::Opaque)
    }

    #[inline]
    pub fn supports_cycle_modifiers(self) -> bool {
        matches!(self, ClipFormat::Keyframed | ClipFormat::Captured)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClipFormat::Keyframed => "keyframed",
            ClipFormat::Captured => "captured",
            ClipFormat::Layered => "layered",
            ClipFormat::Opaque => "opaque",
        }
    }
}

/// Inclusive integer frame range.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: i32,
    pub end: i32,
}

impl FrameRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// A bakeable range spans at least two frames.
    pub fn validate(self) -> Result<Self, RigError> {
        if self.start >= self.end {
            return Err(RigError::InvalidFrameRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(self)
    }

    #[inline]
    pub fn frame_count(self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start) as usize + 1
        }
    }

    pub fn frames(self) -> std::ops::RangeInclusive<i32> {
        self.start..=self.end
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub tracks: Vec<Track>,
    pub range: FrameRange,
    #[serde(default)]
    pub cyclic: bool,
    #[serde(default)]
    pub format: ClipFormat,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, range: FrameRange, format: ClipFormat) -> Self {
        Self {
            name: name.into(),
            tracks: Vec::new(),
            range,
            cyclic: false,
            format,
        }
    }

    pub fn track(&self, bone: &str, channel: Channel) -> Option<&Track> {
        self.tracks
            .iter()
            .find(|t| t.channel == channel && t.bone == bone)
    }

    /// Track for `(bone, channel)`, created at the end of the list if missing.
    pub fn track_mut(&mut self, bone: &str, channel: Channel) -> &mut Track {
        let pos = match self
            .tracks
            .iter()
            .position(|t| t.channel == channel && t.bone == bone)
        {
            Some(pos) => pos,
            None => {
                self.tracks.push(Track::new(bone, channel));
                self.tracks.len() - 1
            }
        };
        &mut self.tracks[pos]
    }

    pub fn tracks_for<'a>(&'a self, bone: &'a str) -> impl Iterator<Item = &'a Track> + 'a {
        self.tracks.iter().filter(move |t| t.bone == bone)
    }

    /// Distinct animated bone names in first-seen order.
    pub fn bones(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for t in &self.tracks {
            if !out.contains(&t.bone.as_str()) {
                out.push(&t.bone);
            }
        }
        out
    }

    pub fn key_count(&self) -> usize {
        self.tracks.iter().map(Track::len).sum()
    }

    /// Smallest range covering every key, if any track is keyed.
    pub fn keyed_range(&self) -> Option<FrameRange> {
        let start = self.tracks.iter().filter_map(Track::first_frame).min()?;
        let end = self.tracks.iter().filter_map(Track::last_frame).max()?;
        Some(FrameRange { start, end })
    }

    /// Check strictly increasing frames and channel/value agreement.
    pub fn validate_basic(&self) -> Result<(), String> {
        for track in &self.tracks {
            let mut last = i32::MIN;
            for (i, k) in track.keys.iter().enumerate() {
                if i > 0 && k.frame <= last {
                    return Err(format!(
                        "Keyframe frames must be strictly increasing for '{}.{}'",
                        track.bone,
                        track.channel.as_str()
                    ));
                }
                if k.value.kind() != track.channel.value_kind() {
                    return Err(format!(
                        "Keyframe value kind {:?} does not fit channel '{}' of '{}'",
                        k.value.kind(),
                        track.channel.as_str(),
                        track.bone
                    ));
                }
                last = k.frame;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_frames_sorted_and_replaces_duplicates() {
        let mut t = Track::new("Hips", Channel::Location);
        t.insert(5, Value::Vec3([5.0; 3]), Interpolation::Linear);
        t.insert(1, Value::Vec3([1.0; 3]), Interpolation::Linear);
        t.insert(5, Value::Vec3([6.0; 3]), Interpolation::Constant);
        assert_eq!(t.keys.iter().map(|k| k.frame).collect::<Vec<_>>(), vec![1, 5]);
        assert_eq!(t.keys[1].value, Value::Vec3([6.0; 3]));
        assert_eq!(t.keys[1].interpolation, Interpolation::Constant);
    }

    #[test]
    fn frame_range_validation() {
        assert!(FrameRange::new(1, 10).validate().is_ok());
        assert!(FrameRange::new(4, 4).validate().is_err());
        assert!(FrameRange::new(9, 2).validate().is_err());
        assert_eq!(FrameRange::new(1, 10).frame_count(), 10);
    }
}
