//! Pareto frontier maintenance — minimize performance and failure rate.
//!
//! The frontier is a derived, recomputable view: one full incremental pass
//! over a point collection, one candidate at a time, in arbitrary input
//! order. Dominance is a strict partial order on distinct points, so the
//! resulting point set is order-independent; only owner attribution under
//! `DuplicatePolicy::FirstSeenWins` depends on input order.
//!
//! Exact-coordinate duplicates are resolved before the dominance check: under
//! the default `MergeOwners` policy the duplicate is not re-added and its
//! owners merge into the existing entry. Dominated-member removal is
//! two-phase (collect, then remove, then insert) — the frontier is never
//! mutated while being iterated.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use designlab_core::domain::{DesignPoint, PointSet, SubjectId};

/// Eligibility window on the performance axis. Points outside the window are
/// excluded from dominance competition but remain valid for region
/// classification and raw counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParetoWindow {
    pub min_performance: f64,
    pub max_performance: f64,
}

impl Default for ParetoWindow {
    fn default() -> Self {
        Self {
            min_performance: 900.0,
            max_performance: 2000.0,
        }
    }
}

impl ParetoWindow {
    pub fn contains(&self, point: &DesignPoint) -> bool {
        let perf = point.performance();
        perf >= self.min_performance && perf <= self.max_performance
    }
}

/// Resolution of an exact-coordinate duplicate offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Merge the new owners into the existing entry's owner set.
    #[default]
    MergeOwners,
    /// Keep the first-seen attribution; drop the late owners.
    FirstSeenWins,
}

/// Outcome of offering one candidate to the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// Candidate admitted; `removed` frontier members it dominated were dropped.
    Admitted { removed: usize },
    /// A frontier member weakly dominates the candidate.
    Dominated,
    /// Exact coordinates already on the frontier; handled per policy.
    Duplicate,
    /// Performance outside the eligibility window; not considered.
    OutsideWindow,
}

/// The non-dominated subset of an attributed point collection.
///
/// Invariant: no member weakly dominates another member.
#[derive(Debug, Clone, Default)]
pub struct ParetoFront {
    entries: HashMap<DesignPoint, BTreeSet<SubjectId>>,
}

impl ParetoFront {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer one candidate point with its owners.
    pub fn offer(
        &mut self,
        point: DesignPoint,
        owners: &BTreeSet<SubjectId>,
        window: &ParetoWindow,
        policy: DuplicatePolicy,
    ) -> Offer {
        if !window.contains(&point) {
            return Offer::OutsideWindow;
        }

        if let Some(existing) = self.entries.get_mut(&point) {
            if policy == DuplicatePolicy::MergeOwners {
                existing.extend(owners.iter().cloned());
            }
            return Offer::Duplicate;
        }

        if self.entries.keys().any(|member| member.weakly_dominates(&point)) {
            return Offer::Dominated;
        }

        // Two-phase removal of members the candidate weakly dominates.
        // Exact duplicates were already intercepted, so every removed member
        // is strictly worse in at least one coordinate.
        let dominated: Vec<DesignPoint> = self
            .entries
            .keys()
            .filter(|member| point.weakly_dominates(member))
            .copied()
            .collect();
        let removed = dominated.len();
        for member in dominated {
            self.entries.remove(&member);
        }

        self.entries.insert(point, owners.clone());
        Offer::Admitted { removed }
    }

    pub fn owners(&self, point: &DesignPoint) -> Option<&BTreeSet<SubjectId>> {
        self.entries.get(point)
    }

    pub fn contains(&self, point: &DesignPoint) -> bool {
        self.entries.contains_key(point)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DesignPoint, &BTreeSet<SubjectId>)> {
        self.entries.iter()
    }

    pub fn points(&self) -> impl Iterator<Item = &DesignPoint> {
        self.entries.keys()
    }

    /// Frontier points sorted by ascending performance (report order).
    pub fn sorted_points(&self) -> Vec<DesignPoint> {
        let mut points: Vec<DesignPoint> = self.entries.keys().copied().collect();
        points.sort_by(|a, b| {
            a.performance()
                .partial_cmp(&b.performance())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        points
    }

    /// Number of frontier points owned (at least in part) by `subject`.
    pub fn subject_point_count(&self, subject: &SubjectId) -> usize {
        self.entries
            .values()
            .filter(|owners| owners.contains(subject))
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One full pass over an attributed collection.
pub fn pareto_front(
    points: &PointSet,
    window: &ParetoWindow,
    policy: DuplicatePolicy,
) -> ParetoFront {
    let mut front = ParetoFront::new();
    for (point, owners) in points.iter() {
        front.offer(*point, owners, window, policy);
    }
    front
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(p: f64, f: f64) -> DesignPoint {
        DesignPoint::new(p, f).unwrap()
    }

    fn owners(ids: &[&str]) -> BTreeSet<SubjectId> {
        ids.iter().map(|s| SubjectId::new(*s)).collect()
    }

    fn window() -> ParetoWindow {
        ParetoWindow::default()
    }

    #[test]
    fn window_excludes_candidate() {
        let mut front = ParetoFront::new();
        let result = front.offer(pt(2100.0, 5.0), &owners(&["C"]), &window(), DuplicatePolicy::MergeOwners);
        assert_eq!(result, Offer::OutsideWindow);
        assert!(front.is_empty());
    }

    #[test]
    fn trade_off_points_coexist() {
        let mut front = ParetoFront::new();
        front.offer(pt(1000.0, 20.0), &owners(&["A"]), &window(), DuplicatePolicy::MergeOwners);
        let result = front.offer(pt(1300.0, 10.0), &owners(&["B"]), &window(), DuplicatePolicy::MergeOwners);
        assert!(matches!(result, Offer::Admitted { removed: 0 }));
        assert_eq!(front.len(), 2);
    }

    #[test]
    fn equal_performance_lower_failure_replaces() {
        let mut front = ParetoFront::new();
        front.offer(pt(1000.0, 20.0), &owners(&["A"]), &window(), DuplicatePolicy::MergeOwners);
        let result = front.offer(pt(1000.0, 10.0), &owners(&["B"]), &window(), DuplicatePolicy::MergeOwners);

        assert_eq!(result, Offer::Admitted { removed: 1 });
        assert_eq!(front.len(), 1);
        assert!(front.contains(&pt(1000.0, 10.0)));
        assert!(!front.contains(&pt(1000.0, 20.0)));
    }

    #[test]
    fn dominated_candidate_rejected() {
        let mut front = ParetoFront::new();
        front.offer(pt(1000.0, 10.0), &owners(&["A"]), &window(), DuplicatePolicy::MergeOwners);
        let result = front.offer(pt(1100.0, 15.0), &owners(&["B"]), &window(), DuplicatePolicy::MergeOwners);
        assert_eq!(result, Offer::Dominated);
        assert_eq!(front.len(), 1);
    }

    #[test]
    fn duplicate_merges_owners_by_default() {
        let mut front = ParetoFront::new();
        front.offer(pt(1000.0, 10.0), &owners(&["A"]), &window(), DuplicatePolicy::MergeOwners);
        let result = front.offer(pt(1000.0, 10.0), &owners(&["B"]), &window(), DuplicatePolicy::MergeOwners);

        assert_eq!(result, Offer::Duplicate);
        assert_eq!(front.len(), 1);
        let merged = front.owners(&pt(1000.0, 10.0)).unwrap();
        assert_eq!(merged, &owners(&["A", "B"]));
    }

    #[test]
    fn duplicate_first_seen_wins_drops_late_owners() {
        let mut front = ParetoFront::new();
        front.offer(pt(1000.0, 10.0), &owners(&["A"]), &window(), DuplicatePolicy::FirstSeenWins);
        front.offer(pt(1000.0, 10.0), &owners(&["B"]), &window(), DuplicatePolicy::FirstSeenWins);

        assert_eq!(front.owners(&pt(1000.0, 10.0)).unwrap(), &owners(&["A"]));
    }

    #[test]
    fn admission_removes_all_dominated_members() {
        let mut front = ParetoFront::new();
        front.offer(pt(1500.0, 50.0), &owners(&["A"]), &window(), DuplicatePolicy::MergeOwners);
        front.offer(pt(1400.0, 60.0), &owners(&["B"]), &window(), DuplicatePolicy::MergeOwners);
        front.offer(pt(1000.0, 5.0), &owners(&["C"]), &window(), DuplicatePolicy::MergeOwners);

        assert_eq!(front.len(), 1);
        assert!(front.contains(&pt(1000.0, 5.0)));
    }

    #[test]
    fn full_pass_window_scenario() {
        let points: PointSet = [
            (pt(1000.0, 20.0), SubjectId::new("A")),
            (pt(1300.0, 10.0), SubjectId::new("B")),
            (pt(2100.0, 5.0), SubjectId::new("C")),
        ]
        .into_iter()
        .collect();

        let front = pareto_front(&points, &window(), DuplicatePolicy::MergeOwners);

        assert_eq!(front.len(), 2);
        assert!(front.contains(&pt(1000.0, 20.0)));
        assert!(front.contains(&pt(1300.0, 10.0)));
        assert!(!front.contains(&pt(2100.0, 5.0)));
    }

    #[test]
    fn subject_point_count_counts_shared_ownership() {
        let mut front = ParetoFront::new();
        front.offer(pt(1000.0, 20.0), &owners(&["A", "B"]), &window(), DuplicatePolicy::MergeOwners);
        front.offer(pt(1300.0, 10.0), &owners(&["A"]), &window(), DuplicatePolicy::MergeOwners);

        assert_eq!(front.subject_point_count(&SubjectId::new("A")), 2);
        assert_eq!(front.subject_point_count(&SubjectId::new("B")), 1);
        assert_eq!(front.subject_point_count(&SubjectId::new("C")), 0);
    }

    #[test]
    fn sorted_points_ascending_performance() {
        let mut front = ParetoFront::new();
        front.offer(pt(1300.0, 10.0), &owners(&["B"]), &window(), DuplicatePolicy::MergeOwners);
        front.offer(pt(1000.0, 20.0), &owners(&["A"]), &window(), DuplicatePolicy::MergeOwners);

        let sorted = front.sorted_points();
        assert_eq!(sorted[0], pt(1000.0, 20.0));
        assert_eq!(sorted[1], pt(1300.0, 10.0));
    }
}
