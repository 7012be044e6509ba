//! DesignLab Runner — robustness evaluation and Pareto/region analysis.
//!
//! This crate builds on `designlab-core` to provide:
//! - Monte Carlo robustness evaluation with warm-started re-solves
//! - Performance correction via constrained nominal re-solves
//! - Pareto frontier maintenance per condition and across conditions
//! - Region classification with per-subject coverage scoring
//! - Directory-backed point-record persistence
//! - Per-condition summary statistics with Welch pairwise testing
//! - Compensation computation and CSV export

pub mod compare;
pub mod compensation;
pub mod config;
pub mod corrector;
pub mod pareto;
pub mod records;
pub mod regions;
pub mod robustness;
pub mod stats;
pub mod store;
pub mod welch;

pub use compare::{compare_conditions, Contribution, CrossConditionFront};
pub use compensation::{
    compute_payouts, write_csv, CompensationError, CompensationSchedule, Payout,
};
pub use config::{AnalysisConfig, ConditionDir, ConfigError};
pub use corrector::{correct, Correction};
pub use pareto::{pareto_front, DuplicatePolicy, Offer, ParetoFront, ParetoWindow};
pub use records::{PointRecord, RecordError, Settings};
pub use regions::{count_regions, Region, RegionCounts, RegionThresholds};
pub use robustness::{evaluate, RobustnessConfig, RobustnessSummary};
pub use stats::{combined_pareto_counts, summarize_condition, ConditionSummary};
pub use store::{
    ConditionData, CorrectionSource, RecordStore, SettingsSource, StoreError,
};
pub use welch::{pairwise_welch, welch_t_test, PairwiseComparison, StatsError, WelchTest};
