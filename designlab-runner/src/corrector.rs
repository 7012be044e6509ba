//! Performance correction — comparable nominal re-solves.
//!
//! Raw recorded performance values are not directly comparable across
//! subjects: some were computed without pinning the same free design
//! variables. The corrector re-solves the nominal (uncertainty-free) program
//! with exactly the subject's chosen free variables substituted in and takes
//! the resulting objective as the corrected performance. A non-converging
//! constrained solve marks the point `Skip`: it is excluded from Pareto and
//! region analysis but still counted in the subject's totals.

use serde::{Deserialize, Serialize};

use designlab_core::solver::{DesignProgram, Substitutions};

/// Result of a correction attempt. Persisted to the point record's third
/// line and never recomputed once stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correction {
    /// Corrected nominal performance, in the program's natural units.
    Value(f64),
    /// Constrained nominal solve failed; point unusable for analysis.
    Skip,
}

impl Correction {
    pub fn value(&self) -> Option<f64> {
        match self {
            Correction::Value(v) => Some(*v),
            Correction::Skip => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Correction::Skip)
    }
}

/// Re-solve the nominal program with the subject's chosen free variables
/// pinned. Any solver failure, or an objective missing from the solution,
/// becomes `Skip` — never an error.
pub fn correct(program: &dyn DesignProgram, pinned: &Substitutions) -> Correction {
    match program.solve(pinned, None) {
        Ok(solution) => match solution.magnitude(program.objective()) {
            Some(value) if value.is_finite() => Correction::Value(value),
            _ => Correction::Skip,
        },
        Err(_) => Correction::Skip,
    }
}
