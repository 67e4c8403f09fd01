//! Error types for retargeting, generation and the host collaborators.

use std::path::PathBuf;

/// Every failure class a retarget or generate run can hit.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum RigError {
    /// File could not be read or decoded
    #[error("Import failed for {path}: {reason}")]
    Import { path: PathBuf, reason: String },

    /// Asset carries no skeleton
    #[error("No skeleton found in {path}")]
    NoSkeletonFound { path: PathBuf },

    /// Asset carries a skeleton but no clip
    #[error("No animation data found in {path}")]
    NoAnimationData { path: PathBuf },

    /// Auto-rig requested but there is no unparented mesh to bind
    #[error("No suitable mesh found for auto-rigging")]
    NoMeshFound,

    /// Resolver produced an empty correspondence
    #[error("Bone mapping failed between '{source_skeleton}' and '{target_skeleton}'")]
    MappingFailure {
        source_skeleton: String,
        target_skeleton: String,
    },

    /// Source clip representation cannot be sampled
    #[error("Unsupported clip format for '{clip}': {format}")]
    UnsupportedClipFormat { clip: String, format: String },

    /// Empty or inverted frame range
    #[error("Invalid frame range [{start}, {end}]")]
    InvalidFrameRange { start: i32, end: i32 },

    /// Skeleton invariants violated
    #[error("Invalid skeleton: {reason}")]
    InvalidSkeleton { reason: String },

    /// Mesh skinning failed
    #[error("Binding failed for mesh '{mesh}': {reason}")]
    Binding { mesh: String, reason: String },

    /// Output could not be written
    #[error("Export failed for {path}: {reason}")]
    Export { path: PathBuf, reason: String },

    /// Configuration could not be parsed
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
}

impl RigError {
    /// Conditions the pipeline handles locally and keeps going.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Binding { .. })
    }

    /// Coarse category for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Import { .. } | Self::Config { .. } => "input",
            Self::NoSkeletonFound { .. } | Self::NoAnimationData { .. } | Self::NoMeshFound => {
                "content"
            }
            Self::MappingFailure { .. }
            | Self::UnsupportedClipFormat { .. }
            | Self::InvalidFrameRange { .. }
            | Self::InvalidSkeleton { .. } => "retarget",
            Self::Binding { .. } => "binding",
            Self::Export { .. } => "export",
        }
    }
}

impl From<serde_json::Error> for RigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config {
            reason: err.to_string(),
        }
    }
}
