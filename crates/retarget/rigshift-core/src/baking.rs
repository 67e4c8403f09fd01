//! Baking API: transfer a source clip onto a target skeleton, one key per
//! mapped channel per integer frame.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::alias::{canonical_joint, find_joint};
use crate::data::{AnimationClip, ClipFormat, FrameRange, Interpolation};
use crate::error::RigError;
use crate::pose::{Pose, PoseEvaluator};
use crate::resolver::BoneMap;
use crate::skeleton::{Skeleton, UP_AXIS};
use crate::value::Channel;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakingConfig {
    /// Interpolation written on every baked key. LINEAR avoids cubic overshoot
    /// between frames of differently proportioned skeletons.
    pub interpolation: Interpolation,
    /// Multiplier applied to baked locations.
    pub translation_scale: f32,
    /// Multiply `translation_scale` by the target/source hip rest-height ratio.
    pub auto_translation_scale: bool,
}

impl Default for BakingConfig {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::Linear,
            translation_scale: 1.0,
            auto_translation_scale: false,
        }
    }
}

/// Ratio of target to source hip rest height, or 1.0 when either is too close
/// to the ground (|h| <= 0.1) or no hips can be found.
pub fn estimate_translation_scale(source: &Skeleton, target: &Skeleton, map: &BoneMap) -> f32 {
    let Some(hips) = canonical_joint("hips") else {
        return 1.0;
    };
    let Some(src_name) = find_joint(source, hips.variants) else {
        return 1.0;
    };
    let tgt_name = map
        .get(src_name)
        .or_else(|| find_joint(target, hips.variants));
    let height = |sk: &Skeleton, name: &str| {
        sk.index_of(name)
            .and_then(|i| sk.bone(i))
            .map(|b| b.head[UP_AXIS])
    };
    match (height(source, src_name), tgt_name.and_then(|t| height(target, t))) {
        (Some(hs), Some(ht)) if hs.abs() > 0.1 && ht.abs() > 0.1 => (ht / hs).abs(),
        _ => 1.0,
    }
}

/// Bake `clip` (authored for `source`) onto `target` over `range`.
///
/// Fails with `InvalidFrameRange` unless `range.start < range.end`, and with
/// `UnsupportedClipFormat` when the clip cannot be sampled. The returned clip
/// spans exactly `range`; nothing is produced on failure.
pub fn bake(
    source: &Skeleton,
    clip: &AnimationClip,
    target: &Skeleton,
    map: &BoneMap,
    range: FrameRange,
    cfg: &BakingConfig,
) -> Result<AnimationClip, RigError> {
    let range = range.validate()?;
    let evaluator = PoseEvaluator::new(source, clip)?;

    let mut pairs: Vec<(usize, usize)> = Vec::with_capacity(map.len());
    for (s, t) in map.iter() {
        match (source.index_of(s), target.index_of(t)) {
            (Some(si), Some(ti)) => pairs.push((si, ti)),
            _ => warn!("mapping '{s}' -> '{t}' names a missing bone; skipped"),
        }
    }

    let mut loc_scale = cfg.translation_scale;
    if cfg.auto_translation_scale {
        loc_scale *= estimate_translation_scale(source, target, map);
    }
    debug!("baking with location scale {loc_scale}");

    let mut out = AnimationClip::new(clip.name.clone(), range, ClipFormat::Keyframed);
    for &(_, ti) in &pairs {
        let name = &target.bones()[ti].name;
        for channel in Channel::ALL {
            out.track_mut(name, channel).keys.reserve(range.frame_count());
        }
    }

    let mut source_pose = Pose::rest(source);
    let mut target_pose = Pose::rest(target);
    for frame in range.frames() {
        evaluator.evaluate(frame as f32, &mut source_pose);
        for &(si, ti) in &pairs {
            let (Some(src), Some(dst)) = (source_pose.get(si), target_pose.get_mut(ti)) else {
                continue;
            };
            *dst = *src;
            for (d, s) in dst.location.iter_mut().zip(src.location) {
                *d = s * loc_scale;
            }
        }
        for &(_, ti) in &pairs {
            let name = &target.bones()[ti].name;
            let Some(xf) = target_pose.get(ti) else {
                continue;
            };
            for channel in Channel::ALL {
                out.track_mut(name, channel)
                    .insert(frame, xf.get(channel), cfg.interpolation);
            }
        }
    }

    info!(
        "baked {} frames [{}, {}] for {} bones",
        range.frame_count(),
        range.start,
        range.end,
        pairs.len()
    );
    Ok(out)
}

/// Copy every mapped track under its target bone name, keeping keys and
/// interpolation as authored.
pub fn transfer_tracks(
    clip: &AnimationClip,
    target: &Skeleton,
    map: &BoneMap,
) -> Result<AnimationClip, RigError> {
    if !clip.format.is_samplable() {
        return Err(RigError::UnsupportedClipFormat {
            clip: clip.name.clone(),
            format: clip.format.as_str().to_string(),
        });
    }
    let mut out = AnimationClip::new(clip.name.clone(), clip.range, ClipFormat::Keyframed);
    for track in &clip.tracks {
        let Some(t) = map.get(&track.bone).filter(|t| target.contains(t)) else {
            continue;
        };
        if out.track(t, track.channel).is_some() {
            warn!("'{}' already receives {}; skipped", t, track.channel.as_str());
            continue;
        }
        let mut copy = track.clone();
        copy.bone = t.to_string();
        out.tracks.push(copy);
    }
    info!("copied {} of {} tracks", out.tracks.len(), clip.tracks.len());
    Ok(out)
}
