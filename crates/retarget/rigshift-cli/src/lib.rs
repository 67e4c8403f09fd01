//! Shared plumbing for the `retarget`, `generate-cycle` and `auto-rig` executables.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use rigshift_core::{Config, RetargetMode, RigError};
use tracing_subscriber::EnvFilter;

/// Exit code of a failed `retarget` run.
pub fn exit_code(err: &RigError) -> u8 {
    match err {
        RigError::NoMeshFound => 2,
        RigError::NoSkeletonFound { .. } => 3,
        RigError::NoAnimationData { .. } => 4,
        RigError::MappingFailure { .. }
        | RigError::InvalidFrameRange { .. }
        | RigError::UnsupportedClipFormat { .. } => 5,
        RigError::Export { .. } => 6,
        _ => 1,
    }
}

/// Exit code for an error that reached the top level; anything that is not a
/// [`RigError`] is a generic failure.
pub fn exit_code_of(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<RigError>().map_or(1, exit_code)
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Parse arguments; usage errors exit 1, `--help`/`--version` exit 0.
pub fn parse_or_exit<T: Parser>() -> Result<T, ExitCode> {
    T::try_parse().map_err(|e| {
        let _ = e.print();
        if e.use_stderr() {
            ExitCode::from(1)
        } else {
            ExitCode::SUCCESS
        }
    })
}

/// Load `--config` if given, otherwise defaults.
pub fn load_config(path: Option<&PathBuf>) -> Result<Config, RigError> {
    match path {
        Some(p) => Config::load(p),
        None => Ok(Config::default()),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Bake,
    CopyCurves,
}

impl From<ModeArg> for RetargetMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Bake => RetargetMode::Bake,
            ModeArg::CopyCurves => RetargetMode::CopyCurves,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "retarget",
    version,
    about = "Retarget an animation clip onto a character skeleton"
)]
pub struct RetargetArgs {
    /// Character scene (skeleton and/or meshes)
    #[arg(long)]
    pub character: PathBuf,
    /// Animation scene (skeleton and clip)
    #[arg(long)]
    pub animation: PathBuf,
    /// Output scene
    #[arg(long)]
    pub output: PathBuf,
    /// JSON run configuration
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Overrides the configured mode
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
}

#[derive(Parser, Debug)]
#[command(
    name = "generate-cycle",
    version,
    about = "Generate a looping sprint cycle for a rigged character"
)]
pub struct GenerateArgs {
    /// Rigged character scene
    pub input: PathBuf,
    /// Output scene
    pub output: PathBuf,
    /// JSON run configuration
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(
    name = "auto-rig",
    version,
    about = "Build a humanoid rig for an unrigged mesh and bind the mesh to it"
)]
pub struct AutoRigArgs {
    /// Scene with the mesh to rig
    pub input: PathBuf,
    /// Output scene
    pub output: PathBuf,
}
