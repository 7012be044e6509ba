//! Serializable analysis configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use designlab_core::domain::Condition;

use crate::compensation::CompensationSchedule;
use crate::pareto::{DuplicatePolicy, ParetoWindow};
use crate::regions::RegionThresholds;

/// One condition's data directory, relative to the data root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDir {
    pub condition: Condition,
    pub dir: String,
}

/// Configuration for a full analysis run.
///
/// Captures everything needed to reproduce a pass: data layout, evaluation
/// seed and trial count, window and thresholds, and the tie-break policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Root directory holding one subdirectory per condition.
    pub data_root: PathBuf,

    /// Condition directories, in the fixed cross-condition processing order.
    #[serde(default = "default_condition_dirs")]
    pub conditions: Vec<ConditionDir>,

    /// Master seed for robustness evaluation.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Monte Carlo trials per evaluated point.
    #[serde(default = "default_trial_count")]
    pub trial_count: usize,

    #[serde(default)]
    pub window: ParetoWindow,

    #[serde(default)]
    pub regions: RegionThresholds,

    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    #[serde(default)]
    pub compensation: CompensationSchedule,
}

fn default_condition_dirs() -> Vec<ConditionDir> {
    Condition::ALL
        .into_iter()
        .map(|condition| ConditionDir {
            condition,
            dir: condition.dir_name().to_string(),
        })
        .collect()
}

fn default_seed() -> u64 {
    246
}

fn default_trial_count() -> usize {
    100
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl AnalysisConfig {
    /// Defaults rooted at `data_root`.
    pub fn with_root(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            conditions: default_condition_dirs(),
            seed: default_seed(),
            trial_count: default_trial_count(),
            window: ParetoWindow::default(),
            regions: RegionThresholds::default(),
            duplicate_policy: DuplicatePolicy::default(),
            compensation: CompensationSchedule::default(),
        }
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Directory for one condition's records.
    pub fn condition_root(&self, condition: Condition) -> Option<PathBuf> {
        self.conditions
            .iter()
            .find(|cd| cd.condition == condition)
            .map(|cd| self.data_root.join(&cd.dir))
    }

    /// Deterministic content hash of this configuration.
    ///
    /// Two analysis runs with identical configs have the same id and produce
    /// identical derived views; the id tags exported reports.
    pub fn config_id(&self) -> String {
        let json = serde_json::to_string(self).expect("AnalysisConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
