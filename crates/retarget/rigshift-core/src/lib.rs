//! Rigshift core (engine-agnostic)
//!
//! Skeleton and clip data models, bone correspondence resolution between two
//! skeletons, frame-by-frame pose baking, a procedural sprint cycle and the
//! loop post-processing applied before export, plus a humanoid auto-rig for
//! bare meshes. Asset IO and skinning sit behind the traits in [`host`].

pub mod alias;
pub mod baking;
pub mod config;
pub mod cycle;
pub mod data;
pub mod error;
pub mod finalize;
pub mod host;
pub mod interp;
pub mod pipeline;
pub mod pose;
pub mod resolver;
pub mod rig;
pub mod rotation;
pub mod sampling;
pub mod scene;
pub mod skeleton;
pub mod skinning;
pub mod value;

// Re-exports for hosts
pub use baking::{bake, estimate_translation_scale, transfer_tracks, BakingConfig};
pub use config::{Config, RetargetMode};
pub use cycle::{generate_sprint, LocomotionRole, Side, SprintParams};
pub use data::{
    AnimationClip, ClipFormat, CycleMode, CycleModifier, FrameRange, Interpolation, Keyframe,
    Track,
};
pub use error::RigError;
pub use finalize::{finalize, LoopStatus};
pub use host::{
    bind_with_fallback, merge_clips, AssetExporter, AssetImporter, ExportBundle, ImportedAsset,
    Mesh, MeshBinder, SkinBinding,
};
pub use pipeline::{
    run_auto_rig, run_generate_cycle, run_retarget, AutoRigReport, GenerateReport, Host,
    RetargetReport,
};
pub use pose::{evaluate_pose, BoneTransform, Pose, PoseEvaluator};
pub use resolver::{resolve, BoneMap, Matcher, Resolver};
pub use rig::{build_humanoid, Bounds};
pub use sampling::sample_track;
pub use scene::JsonSceneIo;
pub use skeleton::{Bone, BoneDef, RotationMode, Skeleton};
pub use skinning::{EnvelopeBinder, ProximityBinder};
pub use value::{Channel, Value, ValueKind};
