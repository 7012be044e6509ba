//! Robustness evaluation — warm-started Monte Carlo re-solves under
//! parameter perturbation.
//!
//! One evaluation turns a nominal solution into a scalar performance value
//! and a failure-rate estimate: freeze the design (fixed variables at their
//! nominal solved values, margin variables at 1), then re-solve the program
//! `trial_count` times with every probabilistic variable perturbed by a
//! truncated-normal multiplicative factor, warm-starting each trial from the
//! nominal assignment. A trial that fails to converge counts as a failure;
//! any converged result counts as a success with no quality check.
//!
//! Determinism: each trial draws from its own BLAKE3-derived sub-seed keyed
//! by trial index, so results are bit-identical for a fixed seed whether the
//! sweep runs sequentially or under rayon.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use designlab_core::domain::DesignPoint;
use designlab_core::perturb::TruncatedNormal;
use designlab_core::rng::SeedHierarchy;
use designlab_core::solver::{DesignProgram, Solution, Substitutions};

const TRIAL_LABEL: &str = "mc-trial";

/// Configuration for one robustness evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobustnessConfig {
    /// Number of Monte Carlo trials (default 100).
    pub trial_count: usize,
    /// Master seed for the perturbation streams.
    pub seed: u64,
    /// Run trials under rayon. Never changes the result, only wall-clock.
    pub parallel: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            trial_count: 100,
            seed: 246,
            parallel: true,
        }
    }
}

/// Outcome of a usable evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobustnessSummary {
    /// Nominal performance metric, in the program's natural units.
    pub performance: f64,
    /// `100 * failures / trials` — a multiple of `100 / trials` in [0, 100].
    pub failure_rate: f64,
    pub failures: usize,
    pub trials: usize,
}

impl RobustnessSummary {
    /// The (performance, failure_rate) analysis key for this evaluation.
    pub fn point(&self) -> Option<DesignPoint> {
        DesignPoint::new(self.performance, self.failure_rate).ok()
    }
}

/// Evaluate one design's robustness.
///
/// `nominal` is the already-solved design under evaluation; pass `None` to
/// let the evaluator obtain it with an unconstrained solve. Returns `None`
/// when no nominal solution can be obtained or the program does not report
/// its objective — the point is unusable, which is a domain outcome, not an
/// error.
pub fn evaluate(
    program: &dyn DesignProgram,
    nominal: Option<&Solution>,
    config: &RobustnessConfig,
) -> Option<RobustnessSummary> {
    assert!(config.trial_count > 0, "trial_count must be > 0");

    let owned_nominal;
    let nominal = match nominal {
        Some(sol) => sol,
        None => {
            owned_nominal = program.solve(&Substitutions::new(), None).ok()?;
            &owned_nominal
        }
    };

    let performance = nominal.magnitude(program.objective())?;
    let base = frozen_substitutions(program, nominal)?;
    let perturbed = perturbation_plan(program, nominal)?;

    let hierarchy = SeedHierarchy::new(config.seed);
    let run_trial = |index: usize| -> bool {
        let mut rng = hierarchy.rng(TRIAL_LABEL, index as u64);
        let mut subs = base.clone();
        for (name, value, dist) in &perturbed {
            subs.set(name.clone(), value * dist.sample(&mut rng));
        }
        program.solve(&subs, Some(nominal)).is_err()
    };

    let failures = if config.parallel {
        (0..config.trial_count)
            .into_par_iter()
            .filter(|&i| run_trial(i))
            .count()
    } else {
        (0..config.trial_count).filter(|&i| run_trial(i)).count()
    };

    Some(RobustnessSummary {
        performance,
        failure_rate: 100.0 * failures as f64 / config.trial_count as f64,
        failures,
        trials: config.trial_count,
    })
}

/// Freeze the design: fixed variables at their nominal solved values, margin
/// variables at 1. Returns `None` if a fixed variable is missing from the
/// nominal assignment (adapter contract violation → point unusable).
fn frozen_substitutions(
    program: &dyn DesignProgram,
    nominal: &Solution,
) -> Option<Substitutions> {
    let mut subs = Substitutions::new();
    for var in program.variables() {
        if var.fixed {
            subs.set(var.name.clone(), nominal.magnitude(&var.name)?);
        }
        if var.margin {
            subs.set(var.name.clone(), 1.0);
        }
    }
    Some(subs)
}

/// Per-trial perturbation plan: (name, nominal value, factor distribution)
/// for every probabilistic variable, in declaration order so the draw order
/// inside a trial is fixed.
fn perturbation_plan(
    program: &dyn DesignProgram,
    nominal: &Solution,
) -> Option<Vec<(String, f64, TruncatedNormal)>> {
    program
        .variables()
        .iter()
        .filter(|var| var.probabilistic)
        .map(|var| {
            nominal.magnitude(&var.name).map(|value| {
                (
                    var.name.clone(),
                    value,
                    TruncatedNormal::for_tolerance(var.tolerance_pct),
                )
            })
        })
        .collect()
}
