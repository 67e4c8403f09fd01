//! Run configuration for retargeting and cycle generation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::baking::BakingConfig;
use crate::cycle::SprintParams;
use crate::error::RigError;
use crate::resolver::{DEFAULT_FUZZY_MIN_SCORE, DEFAULT_FUZZY_TRIGGER_BELOW};

/// How a resolved mapping is turned into target animation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetargetMode {
    /// Sample the source pose at every frame and key the target.
    #[default]
    Bake,
    /// Copy mapped tracks verbatim under the target bone names.
    CopyCurves,
}

/// Every field is optional in JSON; missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fuzzy matching runs while the map has fewer entries than this.
    pub fuzzy_trigger_below: usize,
    /// Minimum (exclusive) fuzzy similarity score.
    pub fuzzy_min_score: f32,
    pub mode: RetargetMode,
    pub baking: BakingConfig,
    pub sprint: SprintParams,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fuzzy_trigger_below: DEFAULT_FUZZY_TRIGGER_BELOW,
            fuzzy_min_score: DEFAULT_FUZZY_MIN_SCORE,
            mode: RetargetMode::default(),
            baking: BakingConfig::default(),
            sprint: SprintParams::default(),
        }
    }
}

impl Config {
    pub fn from_json_str(s: &str) -> Result<Self, RigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, RigError> {
        let text = std::fs::read_to_string(path).map_err(|e| RigError::Config {
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::from_json_str(&text)
    }
}
