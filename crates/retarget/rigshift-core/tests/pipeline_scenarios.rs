use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rigshift_core::{
    run_auto_rig, run_generate_cycle, run_retarget, AnimationClip, AssetExporter, AssetImporter,
    Channel, ClipFormat, Config, EnvelopeBinder, ExportBundle, FrameRange, Host, ImportedAsset,
    Interpolation, JsonSceneIo, LoopStatus, ProximityBinder, RetargetMode, RigError,
};
use rigshift_test_fixtures::scenes;

/// Importer that serves fixture scenes by name and records exports in memory.
#[derive(Default)]
struct MemoryHost {
    assets: HashMap<PathBuf, ImportedAsset>,
    exported: RefCell<Vec<(PathBuf, ExportBundle)>>,
}

impl MemoryHost {
    fn with(names: &[&str]) -> Self {
        let mut host = Self::default();
        for name in names {
            let asset = JsonSceneIo.import(&scenes::path(name).unwrap()).unwrap();
            host.assets.insert(PathBuf::from(name), asset);
        }
        host
    }

    fn host(&self) -> Host<'_> {
        Host {
            importer: self,
            exporter: self,
            binder: &ProximityBinder { radius_factor: 0.35 },
            fallback_binder: &EnvelopeBinder,
        }
    }

    fn clip_names(bundle: &ExportBundle) -> Vec<&str> {
        bundle.clips.iter().map(|c| c.name.as_str()).collect()
    }

    fn only_export(&self) -> ExportBundle {
        let exported = self.exported.borrow();
        assert_eq!(exported.len(), 1);
        exported[0].1.clone()
    }
}

impl AssetImporter for MemoryHost {
    fn import(&self, path: &Path) -> Result<ImportedAsset, RigError> {
        self.assets.get(path).cloned().ok_or_else(|| RigError::Import {
            path: path.to_path_buf(),
            reason: "not found".into(),
        })
    }
}

impl AssetExporter for MemoryHost {
    fn export(&self, path: &Path, bundle: &ExportBundle) -> Result<(), RigError> {
        self.exported
            .borrow_mut()
            .push((path.to_path_buf(), bundle.clone()));
        Ok(())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn retarget(
    host: &MemoryHost,
    character: &str,
    animation: &str,
) -> Result<rigshift_core::RetargetReport, RigError> {
    init_tracing();
    run_retarget(
        host.host(),
        Path::new(character),
        Path::new(animation),
        Path::new("out.json"),
        &Config::default(),
    )
}

#[test]
fn identical_rig_receives_every_frame_of_the_source_range() {
    let host = MemoryHost::with(&["mixamo_character", "mixamo_walk"]);
    let report = retarget(&host, "mixamo_character", "mixamo_walk").unwrap();
    assert_eq!(report.range, FrameRange::new(1, 10));
    assert_eq!(report.mapped_bones, 4);
    assert!(!report.auto_rigged);
    assert_eq!(report.loop_status, LoopStatus::Looped);

    let bundle = host.only_export();
    assert_eq!(bundle.skeleton.name, "Character");
    assert_eq!(bundle.meshes.len(), 1);
    let clip = &bundle.clips[0];
    assert_eq!(clip.name, "Walk");
    assert!(clip.cyclic);
    for bone in ["Hips", "Spine", "LeftArm", "RightArm"] {
        for channel in Channel::ALL {
            let t = clip.track(bone, channel).unwrap();
            assert_eq!(t.keys.len(), 10);
            assert!(t.cycles.is_some());
            assert!(t.keys.iter().all(|k| k.interpolation == Interpolation::Linear));
        }
    }
}

#[test]
fn rig_without_bones_is_a_mapping_failure() {
    let host = MemoryHost::with(&["empty_rig", "mixamo_walk"]);
    let err = retarget(&host, "empty_rig", "mixamo_walk").unwrap_err();
    assert!(matches!(err, RigError::MappingFailure { .. }));
    assert!(host.exported.borrow().is_empty());
}

#[test]
fn missing_content_is_reported_precisely() {
    let host = MemoryHost::with(&[
        "mixamo_character",
        "clip_without_skeleton",
        "skeleton_only",
        "props_only",
        "mixamo_walk",
    ]);
    assert!(matches!(
        retarget(&host, "mixamo_character", "clip_without_skeleton"),
        Err(RigError::NoSkeletonFound { .. })
    ));
    assert!(matches!(
        retarget(&host, "mixamo_character", "skeleton_only"),
        Err(RigError::NoAnimationData { .. })
    ));
    assert!(matches!(
        retarget(&host, "props_only", "mixamo_walk"),
        Err(RigError::NoMeshFound)
    ));
    assert!(matches!(
        retarget(&host, "nowhere", "mixamo_walk"),
        Err(RigError::Import { .. })
    ));
    assert!(host.exported.borrow().is_empty());
}

#[test]
fn unrigged_character_borrows_the_source_skeleton() {
    let host = MemoryHost::with(&["unrigged_character", "mixamo_walk"]);
    let report = retarget(&host, "unrigged_character", "mixamo_walk").unwrap();
    assert!(report.auto_rigged);

    let bundle = host.only_export();
    assert_eq!(bundle.skeleton.name, "Armature");
    let body = &bundle.meshes[0];
    assert_eq!(body.parent.as_deref(), Some("Armature"));
    let binding = body.binding.as_ref().unwrap();
    assert_eq!(binding.weights.len(), body.vertices.len());

    // The source clip is reassigned as-is, then looped.
    let clip = &bundle.clips[0];
    assert_eq!(clip.range, FrameRange::new(1, 10));
    assert_eq!(clip.tracks.len(), 4);
    assert!(clip.cyclic);
}

#[test]
fn layered_source_bakes_to_a_loopable_clip_but_degrades_when_reassigned() {
    let host = MemoryHost::with(&["mixamo_character", "unrigged_character", "layered_walk"]);
    let baked = retarget(&host, "mixamo_character", "layered_walk").unwrap();
    assert_eq!(baked.loop_status, LoopStatus::Looped);
    assert_eq!(baked.clip_name, "LayeredWalk");

    let reassigned = retarget(&host, "unrigged_character", "layered_walk").unwrap();
    assert_eq!(reassigned.loop_status, LoopStatus::Degraded);
    let exported = host.exported.borrow();
    assert!(!exported[1].1.clips[0].cyclic);
}

#[test]
fn copy_curves_mode_keeps_authored_keys() {
    let host = MemoryHost::with(&["game_rig", "mixamo_walk"]);
    let cfg = Config {
        mode: RetargetMode::CopyCurves,
        ..Config::default()
    };
    run_retarget(
        host.host(),
        Path::new("game_rig"),
        Path::new("mixamo_walk"),
        Path::new("out.json"),
        &cfg,
    )
    .unwrap();
    let clip = &host.only_export().clips[0];
    assert_eq!(clip.tracks.len(), 4);
    assert_eq!(clip.track("Spine_01", Channel::RotationEuler).unwrap().keys.len(), 3);
}

#[test]
fn generated_cycle_is_written_ahead_of_existing_clips() {
    let dir = std::env::temp_dir().join(format!("rigshift-pipeline-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let out = dir.join("runner_sprint.json");

    let report = run_generate_cycle(
        Host::json(),
        &scenes::path("humanoid").unwrap(),
        &out,
        &Config::default(),
    )
    .unwrap();
    assert_eq!(report.roles, 10);
    assert_eq!(report.range, FrameRange::new(0, 18));

    let text = fs::read_to_string(&out).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    let names: Vec<&str> = doc["clips"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Sprint_Pro", "Idle", "Wave"]);

    let back = JsonSceneIo.import(&out).unwrap();
    assert_eq!(back.clips.len(), 3);
    assert!(back.primary_clip().unwrap().cyclic);
    assert_eq!(back.clips[2].range, FrameRange::new(0, 12));
    fs::remove_file(out).ok();
}

#[test]
fn generate_requires_a_skeleton() {
    let err = run_generate_cycle(
        Host::json(),
        &scenes::path("unrigged_character").unwrap(),
        Path::new("unused.json"),
        &Config::default(),
    )
    .unwrap_err();
    assert!(matches!(err, RigError::NoSkeletonFound { .. }));
}

#[test]
fn regenerating_replaces_only_the_clip_with_the_same_name() {
    let mut host = MemoryHost::with(&["humanoid"]);
    let asset = host.assets.get_mut(Path::new("humanoid")).unwrap();
    asset.clips.insert(
        1,
        AnimationClip::new("Sprint_Pro", FrameRange::new(0, 4), ClipFormat::Keyframed),
    );
    init_tracing();
    run_generate_cycle(
        host.host(),
        Path::new("humanoid"),
        Path::new("out.json"),
        &Config::default(),
    )
    .unwrap();
    let bundle = host.only_export();
    assert_eq!(MemoryHost::clip_names(&bundle), ["Sprint_Pro", "Idle", "Wave"]);
    assert_eq!(bundle.clips[0].range, FrameRange::new(0, 18));
}

#[test]
fn retarget_keeps_the_characters_own_clips() {
    let mut host = MemoryHost::with(&["humanoid", "mixamo_walk"]);
    let asset = host.assets.get_mut(Path::new("humanoid")).unwrap();
    asset
        .clips
        .push(AnimationClip::new("Walk", FrameRange::new(0, 2), ClipFormat::Keyframed));

    let report = retarget(&host, "humanoid", "mixamo_walk").unwrap();
    assert_eq!(report.clip_name, "Walk");
    let bundle = host.only_export();
    assert_eq!(MemoryHost::clip_names(&bundle), ["Walk", "Idle", "Wave"]);
    // The retargeted clip wins over the character's stale one.
    assert_eq!(bundle.clips[0].range, FrameRange::new(1, 10));
}

#[test]
fn auto_rig_builds_and_binds_a_humanoid() {
    init_tracing();
    let host = MemoryHost::with(&["unrigged_character"]);
    let report = run_auto_rig(
        host.host(),
        Path::new("unrigged_character"),
        Path::new("out.json"),
    )
    .unwrap();
    assert_eq!(report.skeleton, "AutoRig_Armature");
    assert_eq!(report.bones, 19);
    assert_eq!(report.meshes, 1);

    let bundle = host.only_export();
    assert_eq!(bundle.skeleton.len(), 19);
    let body = &bundle.meshes[0];
    assert_eq!(body.parent.as_deref(), Some("AutoRig_Armature"));
    let binding = body.binding.as_ref().unwrap();
    assert_eq!(binding.skeleton, "AutoRig_Armature");
    assert_eq!(binding.weights.len(), body.vertices.len());
    for vw in &binding.weights {
        assert!(vw.iter().all(|w| bundle.skeleton.contains(&w.bone)));
    }
}

#[test]
fn auto_rig_needs_a_free_mesh() {
    let host = MemoryHost::with(&["props_only", "game_rig"]);
    for name in ["props_only", "game_rig"] {
        let err = run_auto_rig(host.host(), Path::new(name), Path::new("out.json")).unwrap_err();
        assert!(matches!(err, RigError::NoMeshFound), "{name}: {err}");
    }
    assert!(host.exported.borrow().is_empty());
}
