//! Cross-condition Pareto comparison.
//!
//! All conditions' point collections are offered to a single shared frontier,
//! in the fixed declared condition order, under the same dominance rule as
//! the per-condition maintainer. Attribution is condition-tagged: each
//! frontier location records which condition(s) contributed owners there.
//!
//! When a later condition lands on coordinates already on the frontier, its
//! attribution merges (under the default policy) rather than overwriting the
//! earlier condition — the overwrite in the source implementation left its
//! own append branch unreachable, and merging is the behavior the comparison
//! question ("which conditions reached this frontier location?") needs.

use std::collections::{BTreeSet, HashMap};

use designlab_core::domain::{Condition, DesignPoint, PointSet, SubjectId};

use crate::pareto::{DuplicatePolicy, ParetoWindow};

/// One condition's contribution at a frontier location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub owners: BTreeSet<SubjectId>,
    pub condition: Condition,
}

/// Shared frontier over all conditions, with condition-tagged attribution.
#[derive(Debug, Clone, Default)]
pub struct CrossConditionFront {
    entries: HashMap<DesignPoint, Vec<Contribution>>,
}

impl CrossConditionFront {
    pub fn contributions(&self, point: &DesignPoint) -> Option<&[Contribution]> {
        self.entries.get(point).map(Vec::as_slice)
    }

    /// Conditions that contributed at least one owner at `point`.
    pub fn conditions_at(&self, point: &DesignPoint) -> Vec<Condition> {
        self.entries
            .get(point)
            .map(|contribs| contribs.iter().map(|c| c.condition).collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, point: &DesignPoint) -> bool {
        self.entries.contains_key(point)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DesignPoint, &[Contribution])> {
        self.entries.iter().map(|(p, c)| (p, c.as_slice()))
    }

    pub fn points(&self) -> impl Iterator<Item = &DesignPoint> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Frontier points a condition contributed to.
    pub fn points_for(&self, condition: Condition) -> Vec<DesignPoint> {
        self.entries
            .iter()
            .filter(|(_, contribs)| contribs.iter().any(|c| c.condition == condition))
            .map(|(point, _)| *point)
            .collect()
    }

    /// Per-condition, per-subject count of shared-frontier points. Subjects
    /// never on the frontier are absent; callers seed zeros from their own
    /// subject rosters.
    pub fn subject_counts(&self) -> HashMap<Condition, HashMap<SubjectId, usize>> {
        let mut counts: HashMap<Condition, HashMap<SubjectId, usize>> = HashMap::new();
        for contribs in self.entries.values() {
            for contrib in contribs {
                let per_subject = counts.entry(contrib.condition).or_default();
                for owner in &contrib.owners {
                    *per_subject.entry(owner.clone()).or_insert(0) += 1;
                }
            }
        }
        counts
    }
}

/// Run the shared-frontier comparison. `per_condition` must list conditions
/// in the declared processing order.
pub fn compare_conditions(
    per_condition: &[(Condition, &PointSet)],
    window: &ParetoWindow,
    policy: DuplicatePolicy,
) -> CrossConditionFront {
    let mut front = CrossConditionFront::default();

    for &(condition, points) in per_condition {
        for (point, owners) in points.iter() {
            if !window.contains(point) {
                continue;
            }

            if let Some(existing) = front.entries.get_mut(point) {
                if policy == DuplicatePolicy::MergeOwners {
                    existing.push(Contribution {
                        owners: owners.clone(),
                        condition,
                    });
                }
                continue;
            }

            if front.entries.keys().any(|member| member.weakly_dominates(point)) {
                continue;
            }

            let dominated: Vec<DesignPoint> = front
                .entries
                .keys()
                .filter(|member| point.weakly_dominates(member))
                .copied()
                .collect();
            for member in dominated {
                front.entries.remove(&member);
            }

            front.entries.insert(
                *point,
                vec![Contribution {
                    owners: owners.clone(),
                    condition,
                }],
            );
        }
    }

    front
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(p: f64, f: f64) -> DesignPoint {
        DesignPoint::new(p, f).unwrap()
    }

    fn set(entries: &[(f64, f64, &str)]) -> PointSet {
        entries
            .iter()
            .map(|&(p, f, id)| (pt(p, f), SubjectId::new(id)))
            .collect()
    }

    fn window() -> ParetoWindow {
        ParetoWindow::default()
    }

    #[test]
    fn frontier_spans_conditions() {
        let control = set(&[(1000.0, 20.0, "A")]);
        let margin = set(&[(1300.0, 10.0, "B")]);

        let front = compare_conditions(
            &[
                (Condition::Control, &control),
                (Condition::Margin, &margin),
            ],
            &window(),
            DuplicatePolicy::MergeOwners,
        );

        assert_eq!(front.len(), 2);
        assert_eq!(front.conditions_at(&pt(1000.0, 20.0)), vec![Condition::Control]);
        assert_eq!(front.conditions_at(&pt(1300.0, 10.0)), vec![Condition::Margin]);
    }

    #[test]
    fn later_condition_displaces_dominated_point() {
        let control = set(&[(1200.0, 30.0, "A")]);
        let margin = set(&[(1100.0, 20.0, "B")]);

        let front = compare_conditions(
            &[
                (Condition::Control, &control),
                (Condition::Margin, &margin),
            ],
            &window(),
            DuplicatePolicy::MergeOwners,
        );

        assert_eq!(front.len(), 1);
        assert!(front.contains(&pt(1100.0, 20.0)));
        assert_eq!(front.conditions_at(&pt(1100.0, 20.0)), vec![Condition::Margin]);
    }

    #[test]
    fn identical_coordinates_merge_attribution() {
        let control = set(&[(1000.0, 10.0, "A")]);
        let gamma = set(&[(1000.0, 10.0, "G")]);

        let front = compare_conditions(
            &[
                (Condition::Control, &control),
                (Condition::GammaSlider, &gamma),
            ],
            &window(),
            DuplicatePolicy::MergeOwners,
        );

        assert_eq!(front.len(), 1);
        let conditions = front.conditions_at(&pt(1000.0, 10.0));
        assert_eq!(conditions, vec![Condition::Control, Condition::GammaSlider]);
    }

    #[test]
    fn first_seen_wins_keeps_earliest_condition_only() {
        let control = set(&[(1000.0, 10.0, "A")]);
        let gamma = set(&[(1000.0, 10.0, "G")]);

        let front = compare_conditions(
            &[
                (Condition::Control, &control),
                (Condition::GammaSlider, &gamma),
            ],
            &window(),
            DuplicatePolicy::FirstSeenWins,
        );

        assert_eq!(front.conditions_at(&pt(1000.0, 10.0)), vec![Condition::Control]);
    }

    #[test]
    fn window_applies_across_conditions() {
        let control = set(&[(2100.0, 5.0, "A")]);
        let margin = set(&[(1500.0, 50.0, "B")]);

        let front = compare_conditions(
            &[
                (Condition::Control, &control),
                (Condition::Margin, &margin),
            ],
            &window(),
            DuplicatePolicy::MergeOwners,
        );

        assert_eq!(front.len(), 1);
        assert!(front.contains(&pt(1500.0, 50.0)));
    }

    #[test]
    fn subject_counts_tally_shared_frontier() {
        let control = set(&[(1000.0, 20.0, "A"), (1300.0, 10.0, "A"), (1000.0, 20.0, "B")]);
        let margin = set(&[(900.0, 90.0, "C")]);

        let front = compare_conditions(
            &[
                (Condition::Control, &control),
                (Condition::Margin, &margin),
            ],
            &window(),
            DuplicatePolicy::MergeOwners,
        );

        let counts = front.subject_counts();
        let control_counts = &counts[&Condition::Control];
        assert_eq!(control_counts[&SubjectId::new("A")], 2);
        assert_eq!(control_counts[&SubjectId::new("B")], 1);
        assert_eq!(counts[&Condition::Margin][&SubjectId::new("C")], 1);
    }
}
