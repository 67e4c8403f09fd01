//! Collaborator interfaces the pipelines are written against.
//!
//! Decoding and encoding asset files and skinning meshes live outside the
//! retargeting core; a host supplies them through these traits. [`crate::scene`]
//! and [`crate::skinning`] provide reference implementations.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::data::AnimationClip;
use crate::error::RigError;
use crate::skeleton::Skeleton;

/// Per-vertex bone influence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoneWeight {
    pub bone: String,
    pub weight: f32,
}

/// Result of skinning one mesh to a skeleton.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinBinding {
    pub skeleton: String,
    /// One entry per mesh vertex; weights of a vertex sum to 1.
    pub weights: Vec<Vec<BoneWeight>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    #[serde(default)]
    pub vertices: Vec<[f32; 3]>,
    /// Owning object, if the mesh is already attached to something.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub binding: Option<SkinBinding>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, vertices: Vec<[f32; 3]>) -> Self {
        Self {
            name: name.into(),
            vertices,
            parent: None,
            binding: None,
        }
    }
}

/// Everything read from one asset file. Any part may be missing.
#[derive(Clone, Debug, Default)]
pub struct ImportedAsset {
    pub skeleton: Option<Skeleton>,
    /// Every clip in file order.
    pub clips: Vec<AnimationClip>,
    pub meshes: Vec<Mesh>,
}

impl ImportedAsset {
    /// The clip a run acts on: the first one in the file.
    pub fn primary_clip(&self) -> Option<&AnimationClip> {
        self.clips.first()
    }
}

/// Append `existing` to `clips`, skipping any whose name is already taken.
pub fn merge_clips(clips: &mut Vec<AnimationClip>, existing: Vec<AnimationClip>) {
    for clip in existing {
        if clips.iter().any(|c| c.name == clip.name) {
            warn!("replacing existing clip '{}'", clip.name);
        } else {
            clips.push(clip);
        }
    }
}

/// Everything written to one output file.
#[derive(Clone, Debug)]
pub struct ExportBundle {
    pub skeleton: Skeleton,
    pub clips: Vec<AnimationClip>,
    pub meshes: Vec<Mesh>,
}

pub trait AssetImporter {
    fn import(&self, path: &Path) -> Result<ImportedAsset, RigError>;
}

pub trait AssetExporter {
    /// Write `bundle` to `path`. On failure no partial file may remain.
    fn export(&self, path: &Path, bundle: &ExportBundle) -> Result<(), RigError>;
}

pub trait MeshBinder {
    fn name(&self) -> &'static str;

    fn bind(&self, mesh: &Mesh, skeleton: &Skeleton) -> Result<SkinBinding, RigError>;
}

/// Bind with `primary`; if that fails recoverably, log and retry with `fallback`.
pub fn bind_with_fallback(
    primary: &dyn MeshBinder,
    fallback: &dyn MeshBinder,
    mesh: &Mesh,
    skeleton: &Skeleton,
) -> Result<SkinBinding, RigError> {
    match primary.bind(mesh, skeleton) {
        Ok(binding) => Ok(binding),
        Err(err) if err.is_recoverable() => {
            warn!(
                "{} binding failed ({err}); falling back to {}",
                primary.name(),
                fallback.name()
            );
            fallback.bind(mesh, skeleton)
        }
        Err(err) => Err(err),
    }
}
