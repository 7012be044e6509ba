//! Design points and owner attribution.
//!
//! A `DesignPoint` is the (performance, failure_rate) pair produced by the
//! robustness evaluator for one recorded design. Equality and hashing use the
//! exact bit pattern of both coordinates: two points are the same analysis key
//! only when both floats match exactly. Tolerance-based matching would merge
//! points that different subjects legitimately produced apart, so exact
//! equality is the documented contract.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

use crate::domain::SubjectId;

/// Invalid coordinate values rejected at construction.
#[derive(Debug, Error, PartialEq)]
pub enum PointError {
    #[error("{field} is not a finite number: {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("failure rate {0} outside [0, 100]")]
    FailureRateOutOfRange(f64),
}

/// One evaluated design: nominal performance and Monte Carlo failure rate.
///
/// `failure_rate` is a percentage in `[0, 100]`, always a multiple of
/// `100 / trial_count` for the trial count that produced it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DesignPoint {
    performance: f64,
    failure_rate: f64,
}

impl DesignPoint {
    /// Build a point, rejecting non-finite coordinates and failure rates
    /// outside `[0, 100]`.
    pub fn new(performance: f64, failure_rate: f64) -> Result<Self, PointError> {
        if !performance.is_finite() {
            return Err(PointError::NonFinite {
                field: "performance",
                value: performance,
            });
        }
        if !failure_rate.is_finite() {
            return Err(PointError::NonFinite {
                field: "failure_rate",
                value: failure_rate,
            });
        }
        if !(0.0..=100.0).contains(&failure_rate) {
            return Err(PointError::FailureRateOutOfRange(failure_rate));
        }
        Ok(Self {
            performance,
            failure_rate,
        })
    }

    pub fn performance(&self) -> f64 {
        self.performance
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    /// Weak dominance in the minimize-both sense: `self` is at least as good
    /// as `other` in both coordinates. An identical point weakly dominates.
    pub fn weakly_dominates(&self, other: &DesignPoint) -> bool {
        self.performance <= other.performance && self.failure_rate <= other.failure_rate
    }
}

// Exact bit equality. Constructor guarantees finite values, so there is no
// NaN to break reflexivity, and 0.0/-0.0 hashing to different keys is accepted
// as part of the exact-match contract.
impl PartialEq for DesignPoint {
    fn eq(&self, other: &Self) -> bool {
        self.performance.to_bits() == other.performance.to_bits()
            && self.failure_rate.to_bits() == other.failure_rate.to_bits()
    }
}

impl Eq for DesignPoint {}

impl std::hash::Hash for DesignPoint {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.performance.to_bits().hash(state);
        self.failure_rate.to_bits().hash(state);
    }
}

impl fmt::Display for DesignPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.performance, self.failure_rate)
    }
}

/// A collection of design points with many-valued ownership: the same point
/// may have been produced independently by several subjects.
#[derive(Debug, Clone, Default)]
pub struct PointSet {
    owners: HashMap<DesignPoint, BTreeSet<SubjectId>>,
}

impl PointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `subject` produced `point`. Owner sets merge on repeat.
    pub fn add(&mut self, point: DesignPoint, subject: SubjectId) {
        self.owners.entry(point).or_default().insert(subject);
    }

    pub fn owners(&self, point: &DesignPoint) -> Option<&BTreeSet<SubjectId>> {
        self.owners.get(point)
    }

    pub fn contains(&self, point: &DesignPoint) -> bool {
        self.owners.contains_key(point)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DesignPoint, &BTreeSet<SubjectId>)> {
        self.owners.iter()
    }

    pub fn points(&self) -> impl Iterator<Item = &DesignPoint> {
        self.owners.keys()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

impl FromIterator<(DesignPoint, SubjectId)> for PointSet {
    fn from_iter<I: IntoIterator<Item = (DesignPoint, SubjectId)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (point, subject) in iter {
            set.add(point, subject);
        }
        set
    }
}
