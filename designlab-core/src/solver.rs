//! Solver-adapter contract.
//!
//! The nonlinear design program is consumed purely as a capability: given a
//! substitution map and an optional warm start, return a locally optimal
//! solution or a distinguishable failure. Adapters are pure functions of
//! `(program, substitutions, warm_start)` — substitution state never lives on
//! the adapter between calls, so a sweep can never leak stale substitutions
//! into the caller's next use of the same program.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A solved variable value with its physical unit.
///
/// The unit travels with the magnitude for reporting; the analysis itself
/// only reads magnitudes, in the program's natural units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub magnitude: f64,
    pub unit: String,
}

impl Quantity {
    pub fn new(magnitude: f64, unit: impl Into<String>) -> Self {
        Self {
            magnitude,
            unit: unit.into(),
        }
    }

    /// Dimensionless value.
    pub fn bare(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: String::new(),
        }
    }
}

/// Result of one nonlinear-program solve. Immutable once returned; the full
/// assignment doubles as a warm start for subsequent solves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    assignments: BTreeMap<String, Quantity>,
}

impl Solution {
    pub fn new(assignments: BTreeMap<String, Quantity>) -> Self {
        Self { assignments }
    }

    pub fn quantity(&self, name: &str) -> Option<&Quantity> {
        self.assignments.get(name)
    }

    /// Numeric magnitude of a named variable, if solved.
    pub fn magnitude(&self, name: &str) -> Option<f64> {
        self.assignments.get(name).map(|q| q.magnitude)
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.assignments.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl FromIterator<(String, Quantity)> for Solution {
    fn from_iter<I: IntoIterator<Item = (String, Quantity)>>(iter: I) -> Self {
        Self {
            assignments: iter.into_iter().collect(),
        }
    }
}

/// A declared model variable and its robustness flags.
///
/// - `fixed`: frozen at its nominal solved value during the robustness sweep.
/// - `margin`: overridden to the constant 1 during the sweep (a deliberate
///   safety margin, not a free design choice).
/// - `probabilistic`: perturbed multiplicatively each trial, with the declared
///   tolerance percentage setting the spread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarSpec {
    pub name: String,
    pub fixed: bool,
    pub margin: bool,
    pub probabilistic: bool,
    /// Declared tolerance percentage; meaningful only when `probabilistic`.
    pub tolerance_pct: f64,
}

impl VarSpec {
    /// A free design variable with no robustness role.
    pub fn free(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fixed: false,
            margin: false,
            probabilistic: false,
            tolerance_pct: 0.0,
        }
    }

    pub fn fixed(name: impl Into<String>) -> Self {
        Self {
            fixed: true,
            ..Self::free(name)
        }
    }

    pub fn margin(name: impl Into<String>) -> Self {
        Self {
            margin: true,
            ..Self::free(name)
        }
    }

    pub fn probabilistic(name: impl Into<String>, tolerance_pct: f64) -> Self {
        Self {
            probabilistic: true,
            tolerance_pct,
            ..Self::free(name)
        }
    }
}

/// Explicit substitution map passed per solve call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Substitutions(BTreeMap<String, f64>);

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) -> &mut Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for Substitutions {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The solve did not produce a feasible/optimal point. Always recovered
/// locally (failure count, skip, or unusable point) — never propagated past
/// the evaluator/corrector boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolveFailure {
    #[error("solver failed to converge: {0}")]
    NonConvergence(String),
    #[error("solve exceeded {limit_secs}s time limit")]
    Timeout { limit_secs: u64 },
}

/// The design-program capability.
///
/// Implementations must be re-entrant: concurrent `solve` calls with
/// different substitution maps must not interfere.
pub trait DesignProgram: Send + Sync {
    /// Declared variables with their robustness flags.
    fn variables(&self) -> &[VarSpec];

    /// Name of the performance objective variable (fuel-consumed equivalent).
    fn objective(&self) -> &str;

    /// Solve with the given substitutions, optionally warm-started from a
    /// previous solution's assignment.
    fn solve(
        &self,
        substitutions: &Substitutions,
        warm_start: Option<&Solution>,
    ) -> Result<Solution, SolveFailure>;
}
