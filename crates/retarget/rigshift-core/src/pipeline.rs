//! End-to-end runs driven by the executables.

use std::path::Path;

use tracing::{info, warn};

use crate::baking::{bake, transfer_tracks};
use crate::config::{Config, RetargetMode};
use crate::cycle::{generate_sprint, resolve_roles};
use crate::data::FrameRange;
use crate::error::RigError;
use crate::finalize::{finalize, LoopStatus};
use crate::host::{
    bind_with_fallback, merge_clips, AssetExporter, AssetImporter, ExportBundle, MeshBinder,
};
use crate::resolver::Resolver;
use crate::rig::{humanoid_in, Bounds};
use crate::scene::JsonSceneIo;
use crate::skinning::{EnvelopeBinder, ProximityBinder};

const PROXIMITY: ProximityBinder = ProximityBinder { radius_factor: 0.35 };

/// The collaborators a run talks to.
#[derive(Clone, Copy)]
pub struct Host<'a> {
    pub importer: &'a dyn AssetImporter,
    pub exporter: &'a dyn AssetExporter,
    pub binder: &'a dyn MeshBinder,
    pub fallback_binder: &'a dyn MeshBinder,
}

impl Host<'static> {
    /// JSON scene files with the reference binders.
    pub fn json() -> Self {
        Self {
            importer: &JsonSceneIo,
            exporter: &JsonSceneIo,
            binder: &PROXIMITY,
            fallback_binder: &EnvelopeBinder,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RetargetReport {
    pub clip_name: String,
    pub range: FrameRange,
    /// Mapped bone pairs, or the borrowed skeleton's size when auto-rigged.
    pub mapped_bones: usize,
    pub auto_rigged: bool,
    pub loop_status: LoopStatus,
}

/// Retarget the clip in `animation` onto the character in `character` and
/// write the result to `output`.
///
/// A character without a skeleton is auto-rigged: its first unparented mesh
/// is bound to a copy of the animation's skeleton, which then plays the source
/// clip unchanged. Clips the character already carries are written after the
/// result unless one shares its name.
pub fn run_retarget(
    host: Host<'_>,
    character: &Path,
    animation: &Path,
    output: &Path,
    cfg: &Config,
) -> Result<RetargetReport, RigError> {
    let char_asset = host.importer.import(character)?;
    let anim_asset = host.importer.import(animation)?;

    let source = anim_asset.skeleton.ok_or_else(|| RigError::NoSkeletonFound {
        path: animation.to_path_buf(),
    })?;
    let source_clip = anim_asset
        .clips
        .into_iter()
        .next()
        .ok_or_else(|| RigError::NoAnimationData {
            path: animation.to_path_buf(),
        })?;
    let existing = char_asset.clips;

    let auto_rigged = char_asset.skeleton.is_none();
    let (skeleton, mut clip, meshes, mapped_bones) = match char_asset.skeleton {
        None => {
            let mut meshes = char_asset.meshes;
            let idx = meshes
                .iter()
                .position(|m| m.parent.is_none())
                .ok_or(RigError::NoMeshFound)?;
            // The borrowed skeleton is bound in its rest pose at its own
            // scale; a mesh at a very different scale falls to the envelope binder.
            let skeleton = source.clone();
            info!(
                "character has no skeleton; auto-rigging '{}' to borrowed '{}'",
                meshes[idx].name, skeleton.name
            );
            let binding =
                bind_with_fallback(host.binder, host.fallback_binder, &meshes[idx], &skeleton)?;
            meshes[idx].binding = Some(binding);
            meshes[idx].parent = Some(skeleton.name.clone());
            let bones = skeleton.len();
            (skeleton, source_clip.clone(), meshes, bones)
        }
        Some(target) => {
            let map = Resolver::from_config(cfg).resolve(&source, &target);
            if map.is_empty() {
                return Err(RigError::MappingFailure {
                    source_skeleton: source.name.clone(),
                    target_skeleton: target.name.clone(),
                });
            }
            info!(
                "mapped {} of {} source bones onto '{}'",
                map.len(),
                source.len(),
                target.name
            );
            let clip = match cfg.mode {
                RetargetMode::Bake => bake(
                    &source,
                    &source_clip,
                    &target,
                    &map,
                    source_clip.range,
                    &cfg.baking,
                )?,
                RetargetMode::CopyCurves => transfer_tracks(&source_clip, &target, &map)?,
            };
            (target, clip, char_asset.meshes, map.len())
        }
    };

    let loop_status = finalize(&mut clip);
    clip.name = source_clip.name.clone();

    let report = RetargetReport {
        clip_name: clip.name.clone(),
        range: clip.range,
        mapped_bones,
        auto_rigged,
        loop_status,
    };
    let mut clips = vec![clip];
    merge_clips(&mut clips, existing);
    let bundle = ExportBundle {
        skeleton,
        clips,
        meshes,
    };
    host.exporter.export(output, &bundle)?;
    info!("retargeted '{}' -> {}", report.clip_name, output.display());
    Ok(report)
}

#[derive(Clone, Debug, PartialEq)]
pub struct GenerateReport {
    pub clip_name: String,
    pub range: FrameRange,
    /// Locomotion roles found on the skeleton.
    pub roles: usize,
    pub loop_status: LoopStatus,
}

/// Generate a sprint cycle for the skeleton in `input` and write the scene,
/// with the new clip first and every other existing clip after it, to `output`.
pub fn run_generate_cycle(
    host: Host<'_>,
    input: &Path,
    output: &Path,
    cfg: &Config,
) -> Result<GenerateReport, RigError> {
    let asset = host.importer.import(input)?;
    let skeleton = asset.skeleton.ok_or_else(|| RigError::NoSkeletonFound {
        path: input.to_path_buf(),
    })?;

    let roles = resolve_roles(&skeleton).len();
    if roles == 0 {
        warn!("'{}' has no recognisable locomotion bones; clip will be empty", skeleton.name);
    }
    let mut clip = generate_sprint(&skeleton, &cfg.sprint);
    let loop_status = finalize(&mut clip);

    let report = GenerateReport {
        clip_name: clip.name.clone(),
        range: clip.range,
        roles,
        loop_status,
    };

    let mut clips = vec![clip];
    merge_clips(&mut clips, asset.clips);
    let bundle = ExportBundle {
        skeleton,
        clips,
        meshes: asset.meshes,
    };
    host.exporter.export(output, &bundle)?;
    info!("generated '{}' -> {}", report.clip_name, output.display());
    Ok(report)
}

#[derive(Clone, Debug, PartialEq)]
pub struct AutoRigReport {
    pub skeleton: String,
    pub bones: usize,
    /// Meshes bound to the new rig.
    pub meshes: usize,
    pub height: f32,
}

/// Build a humanoid rig sized to the unparented meshes in `input`, bind each
/// of them to it and write the scene to `output`.
pub fn run_auto_rig(
    host: Host<'_>,
    input: &Path,
    output: &Path,
) -> Result<AutoRigReport, RigError> {
    let asset = host.importer.import(input)?;
    let mut meshes = asset.meshes;
    let free: Vec<usize> = meshes
        .iter()
        .enumerate()
        .filter(|(_, m)| m.parent.is_none() && !m.vertices.is_empty())
        .map(|(i, _)| i)
        .collect();
    let bounds =
        Bounds::enclosing(free.iter().map(|&i| &meshes[i])).ok_or(RigError::NoMeshFound)?;
    if let Some(old) = &asset.skeleton {
        warn!("replacing existing skeleton '{}'", old.name);
    }

    let skeleton = humanoid_in(&bounds).map_err(|reason| RigError::Binding {
        mesh: meshes[free[0]].name.clone(),
        reason,
    })?;
    for &i in &free {
        let binding =
            bind_with_fallback(host.binder, host.fallback_binder, &meshes[i], &skeleton)?;
        meshes[i].binding = Some(binding);
        meshes[i].parent = Some(skeleton.name.clone());
    }

    let report = AutoRigReport {
        skeleton: skeleton.name.clone(),
        bones: skeleton.len(),
        meshes: free.len(),
        height: bounds.height(),
    };
    let bundle = ExportBundle {
        skeleton,
        clips: asset.clips,
        meshes,
    };
    host.exporter.export(output, &bundle)?;
    info!("rigged {} meshes -> {}", report.meshes, output.display());
    Ok(report)
}
