//! JSON scene interchange: the reference [`AssetImporter`]/[`AssetExporter`].
//!
//! A scene document holds an optional skeleton, any number of clips and any
//! number of meshes:
//!
//! ```json
//! {
//!   "skeleton": { "name": "Armature", "bones": [{ "name": "Hips", "head": [0, 0, 1] }] },
//!   "clips": [{
//!     "format": "keyframed", "name": "Walk", "range": { "start": 1, "end": 10 },
//!     "tracks": [{ "bone": "Hips", "channel": "location",
//!                  "keys": [{ "frame": 1, "value": { "type": "vec3", "data": [0, 0, 0] } }] }]
//!   }],
//!   "meshes": []
//! }
//! ```
//!
//! Clip `format` is one of `keyframed`, `captured`, `layered` or `opaque`.
//! Captured clips carry one sample per frame from `start` and are expanded to
//! linear keys on import. Every clip is kept in file order; the first is
//! [`ImportedAsset::primary_clip`].

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::{AnimationClip, ClipFormat, CycleModifier, FrameRange, Interpolation, Track};
use crate::error::RigError;
use crate::host::{AssetExporter, AssetImporter, ExportBundle, ImportedAsset, Mesh};
use crate::sampling::sample_track;
use crate::skeleton::{BoneDef, Skeleton};
use crate::value::{Channel, Value};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skeleton: Option<SkeletonDoc>,
    #[serde(default)]
    pub clips: Vec<ClipDoc>,
    #[serde(default)]
    pub meshes: Vec<Mesh>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkeletonDoc {
    pub name: String,
    #[serde(default)]
    pub bones: Vec<BoneDef>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum ClipDoc {
    Keyframed(KeyedClipDoc),
    Captured(CapturedClipDoc),
    Layered(KeyedClipDoc),
    Opaque(OpaqueClipDoc),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyedClipDoc {
    pub name: String,
    /// Defaults to the span of the keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<FrameRange>,
    #[serde(default)]
    pub cyclic: bool,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapturedClipDoc {
    pub name: String,
    /// Frame of the first sample.
    #[serde(default)]
    pub start: i32,
    #[serde(default)]
    pub cyclic: bool,
    pub channels: Vec<CapturedChannel>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapturedChannel {
    pub bone: String,
    pub channel: Channel,
    pub samples: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycles: Option<CycleModifier>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OpaqueClipDoc {
    pub name: String,
    pub range: FrameRange,
}

/// Reads and writes [`SceneDocument`] files.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSceneIo;

impl JsonSceneIo {
    /// Parse a scene document; `path` only labels errors.
    pub fn parse(&self, text: &str, path: &Path) -> Result<ImportedAsset, RigError> {
        let doc: SceneDocument = serde_json::from_str(text).map_err(|e| import_err(path, e))?;
        into_asset(doc, path)
    }

    pub fn to_document(&self, bundle: &ExportBundle) -> SceneDocument {
        SceneDocument {
            skeleton: Some(SkeletonDoc {
                name: bundle.skeleton.name.clone(),
                bones: bundle.skeleton.to_defs(),
            }),
            clips: bundle.clips.iter().map(clip_to_doc).collect(),
            meshes: bundle.meshes.clone(),
        }
    }
}

impl AssetImporter for JsonSceneIo {
    fn import(&self, path: &Path) -> Result<ImportedAsset, RigError> {
        let text = fs::read_to_string(path).map_err(|e| import_err(path, e))?;
        let asset = self.parse(&text, path)?;
        info!(
            "imported {}: skeleton {}, {} clips, {} meshes",
            path.display(),
            asset.skeleton.as_ref().map_or("-", |s| s.name.as_str()),
            asset.clips.len(),
            asset.meshes.len()
        );
        Ok(asset)
    }
}

impl AssetExporter for JsonSceneIo {
    fn export(&self, path: &Path, bundle: &ExportBundle) -> Result<(), RigError> {
        let export_err = |reason: String| RigError::Export {
            path: path.to_path_buf(),
            reason,
        };
        let bytes = serde_json::to_vec_pretty(&self.to_document(bundle))
            .map_err(|e| export_err(e.to_string()))?;

        let tmp = temp_path(path);
        let written = fs::write(&tmp, &bytes).and_then(|()| fs::rename(&tmp, path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(export_err(e.to_string()));
        }
        info!("exported {} ({} clips)", path.display(), bundle.clips.len());
        Ok(())
    }
}

fn import_err(path: &Path, e: impl std::fmt::Display) -> RigError {
    RigError::Import {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn into_asset(doc: SceneDocument, path: &Path) -> Result<ImportedAsset, RigError> {
    let skeleton = match doc.skeleton {
        Some(sk) => Some(Skeleton::new(sk.name, sk.bones).map_err(|e| import_err(path, e))?),
        None => None,
    };

    let mut clips = Vec::with_capacity(doc.clips.len());
    for cd in doc.clips {
        let clip = doc_to_clip(cd).map_err(|reason| import_err(path, reason))?;
        debug!(
            "clip '{}' ({}) [{}, {}], {} tracks",
            clip.name,
            clip.format.as_str(),
            clip.range.start,
            clip.range.end,
            clip.tracks.len()
        );
        clips.push(clip);
    }

    Ok(ImportedAsset {
        skeleton,
        clips,
        meshes: doc.meshes,
    })
}

fn doc_to_clip(doc: ClipDoc) -> Result<AnimationClip, String> {
    let clip = match doc {
        ClipDoc::Keyframed(k) => keyed_clip(k, ClipFormat::Keyframed)?,
        ClipDoc::Layered(k) => keyed_clip(k, ClipFormat::Layered)?,
        ClipDoc::Captured(c) => captured_clip(c)?,
        ClipDoc::Opaque(o) => AnimationClip::new(o.name, o.range, ClipFormat::Opaque),
    };
    clip.validate_basic()?;
    Ok(clip)
}

fn keyed_clip(doc: KeyedClipDoc, format: ClipFormat) -> Result<AnimationClip, String> {
    let mut clip = AnimationClip::new(doc.name, FrameRange::new(0, 0), format);
    clip.cyclic = doc.cyclic;
    for track in doc.tracks {
        // Re-insert so keys come out sorted with unique frames.
        let dst = clip.track_mut(&track.bone, track.channel);
        dst.cycles = track.cycles;
        for k in track.keys {
            dst.insert(k.frame, k.value, k.interpolation);
        }
    }
    clip.range = match doc.range.or_else(|| clip.keyed_range()) {
        Some(r) => r,
        None => return Err(format!("clip '{}' has neither keys nor a range", clip.name)),
    };
    Ok(clip)
}

fn captured_clip(doc: CapturedClipDoc) -> Result<AnimationClip, String> {
    let frames = doc.channels.iter().map(|c| c.samples.len()).max().unwrap_or(0);
    if frames == 0 {
        return Err(format!("captured clip '{}' has no samples", doc.name));
    }
    let range = FrameRange::new(doc.start, doc.start + frames as i32 - 1);
    let mut clip = AnimationClip::new(doc.name, range, ClipFormat::Captured);
    clip.cyclic = doc.cyclic;
    for ch in doc.channels {
        let track = clip.track_mut(&ch.bone, ch.channel);
        track.cycles = ch.cycles;
        for (i, value) in ch.samples.into_iter().enumerate() {
            track.insert(doc.start + i as i32, value, Interpolation::Linear);
        }
    }
    Ok(clip)
}

fn clip_to_doc(clip: &AnimationClip) -> ClipDoc {
    let keyed = || KeyedClipDoc {
        name: clip.name.clone(),
        range: Some(clip.range),
        cyclic: clip.cyclic,
        tracks: clip.tracks.clone(),
    };
    match clip.format {
        ClipFormat::Keyframed => ClipDoc::Keyframed(keyed()),
        ClipFormat::Layered => ClipDoc::Layered(keyed()),
        ClipFormat::Opaque => ClipDoc::Opaque(OpaqueClipDoc {
            name: clip.name.clone(),
            range: clip.range,
        }),
        ClipFormat::Captured => ClipDoc::Captured(CapturedClipDoc {
            name: clip.name.clone(),
            start: clip.range.start,
            cyclic: clip.cyclic,
            channels: clip
                .tracks
                .iter()
                .map(|t| CapturedChannel {
                    bone: t.bone.clone(),
                    channel: t.channel,
                    samples: clip
                        .range
                        .frames()
                        .filter_map(|f| sample_track(t, f as f32))
                        .collect(),
                    cycles: t.cycles,
                })
                .collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_sorted_and_range_defaults_to_key_span() {
        let text = r#"{
            "clips": [{
                "format": "keyframed", "name": "c",
                "tracks": [{ "bone": "Hips", "channel": "scale", "keys": [
                    { "frame": 7, "value": { "type": "vec3", "data": [1, 1, 1] } },
                    { "frame": 2, "value": { "type": "vec3", "data": [2, 2, 2] } }
                ]}]
            }]
        }"#;
        let asset = JsonSceneIo.parse(text, Path::new("mem.json")).unwrap();
        assert!(asset.skeleton.is_none());
        let clip = asset.primary_clip().unwrap();
        assert_eq!(clip.range, FrameRange::new(2, 7));
        assert_eq!(clip.tracks[0].keys[0].frame, 2);
    }

    #[test]
    fn mismatched_value_kind_is_an_import_error() {
        let text = r#"{ "clips": [{ "format": "keyframed", "name": "c", "tracks": [
            { "bone": "Hips", "channel": "rotation_quaternion",
              "keys": [{ "frame": 0, "value": { "type": "vec3", "data": [0, 0, 0] } }] }
        ]}]}"#;
        let err = JsonSceneIo.parse(text, Path::new("mem.json")).unwrap_err();
        assert!(matches!(err, RigError::Import { .. }));
    }

    #[test]
    fn temp_path_is_a_sibling() {
        assert_eq!(temp_path(Path::new("out/a.json")), PathBuf::from("out/a.json.tmp"));
    }
}
