//! Per-condition summary statistics.
//!
//! One `ConditionSummary` collects, per subject, the descriptive quantities
//! compared across conditions: point counts, region tallies and rates,
//! sequence spans and inter-point deltas, time-to-first-region, Pareto
//! participation, and occupancy-grid coverage. Subjects with zero analysis
//! points contribute zero counts but are excluded from the normalized and
//! sequence-derived vectors rather than polluting them with divisions by
//! zero.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use designlab_core::domain::{Condition, DesignPoint, SubjectId};

use crate::compare::CrossConditionFront;
use crate::pareto::{pareto_front, DuplicatePolicy, ParetoFront, ParetoWindow};
use crate::regions::{Region, RegionCounts, RegionThresholds};
use crate::store::ConditionData;

/// Occupancy grid geometry: 11 failure-rate rows × 23 performance columns,
/// 10-percent × 50-unit cells over the window, with one underflow and one
/// overflow column. Coverage counts distinct occupied interior cells.
const GRID_ROWS: usize = 11;
const GRID_COLS: usize = 23;

/// Summary vectors for one condition. Entries are index-aligned with
/// `subjects` except where noted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionSummary {
    pub condition: Condition,
    pub subjects: Vec<SubjectId>,

    /// Analysis points per subject (skipped points excluded).
    pub num_points: Vec<f64>,
    pub num_green: Vec<f64>,
    pub num_yellow: Vec<f64>,
    pub num_blue: Vec<f64>,
    pub num_outside: Vec<f64>,
    /// Region coverage score per subject (0–3).
    pub coverage: Vec<f64>,

    // Normalized rates; subjects with zero points excluded.
    pub norm_green: Vec<f64>,
    pub norm_yellow: Vec<f64>,
    pub norm_blue: Vec<f64>,
    pub norm_outside: Vec<f64>,

    /// Sequence span (last − first recording index); zero-point subjects excluded.
    pub span: Vec<f64>,
    /// Pooled inter-point recording deltas across subjects.
    pub delta_t: Vec<f64>,
    /// Recording offset of the first point in each region; only subjects
    /// that hit the region appear.
    pub time_to_green: Vec<f64>,
    pub time_to_yellow: Vec<f64>,
    pub time_to_blue: Vec<f64>,

    /// Per-subject count of points on this condition's own frontier.
    pub num_pareto: Vec<f64>,
    /// Share of the condition's frontier ownership per subject.
    pub norm_pareto: Vec<f64>,

    /// Occupied interior grid cells per subject; zero-point subjects excluded.
    pub grid_coverage: Vec<f64>,
}

impl ConditionSummary {
    /// Named stat vectors, for report printing and pairwise testing.
    pub fn named_stats(&self) -> Vec<(&'static str, &[f64])> {
        vec![
            ("Number of Points", &self.num_points),
            ("Number of Points in Green", &self.num_green),
            ("Number of Points in Yellow", &self.num_yellow),
            ("Number of Points in Blue", &self.num_blue),
            ("Number of Points Outside", &self.num_outside),
            ("Region Coverage", &self.coverage),
            ("Normalized Points in Green", &self.norm_green),
            ("Normalized Points in Yellow", &self.norm_yellow),
            ("Normalized Points in Blue", &self.norm_blue),
            ("Normalized Points Outside", &self.norm_outside),
            ("Sequence Span", &self.span),
            ("Delta T", &self.delta_t),
            ("Time to First Green", &self.time_to_green),
            ("Time to First Yellow", &self.time_to_yellow),
            ("Time to First Blue", &self.time_to_blue),
            ("Points on Pareto", &self.num_pareto),
            ("Share of Pareto", &self.norm_pareto),
            ("Grid Cells Covered", &self.grid_coverage),
        ]
    }
}

/// Plain mean.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    (values.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

/// Count of distinct occupied interior grid cells for one subject's points.
pub fn grid_coverage(points: &[DesignPoint], window: &ParetoWindow) -> usize {
    let col_width = (window.max_performance - window.min_performance) / 22.0;
    let mut grid = [[false; GRID_COLS]; GRID_ROWS];
    for point in points {
        let col = (((point.performance() - window.min_performance) / col_width).floor() as i64
            + 1)
        .clamp(0, GRID_COLS as i64 - 1) as usize;
        let row = ((point.failure_rate() / 10.0).floor() as i64).clamp(0, GRID_ROWS as i64 - 1)
            as usize;
        grid[row][col] = true;
    }
    grid.iter()
        .map(|row| row[1..GRID_COLS - 1].iter().filter(|&&c| c).count())
        .sum()
}

/// Build the summary for one condition's collection.
pub fn summarize_condition(
    condition: Condition,
    data: &ConditionData,
    thresholds: &RegionThresholds,
    window: &ParetoWindow,
    policy: DuplicatePolicy,
) -> ConditionSummary {
    let front: ParetoFront = pareto_front(&data.point_owners, window, policy);

    let subjects: Vec<SubjectId> = data.subjects().cloned().collect();
    let mut summary = ConditionSummary {
        condition,
        subjects: subjects.clone(),
        num_points: Vec::new(),
        num_green: Vec::new(),
        num_yellow: Vec::new(),
        num_blue: Vec::new(),
        num_outside: Vec::new(),
        coverage: Vec::new(),
        norm_green: Vec::new(),
        norm_yellow: Vec::new(),
        norm_blue: Vec::new(),
        norm_outside: Vec::new(),
        span: Vec::new(),
        delta_t: Vec::new(),
        time_to_green: Vec::new(),
        time_to_yellow: Vec::new(),
        time_to_blue: Vec::new(),
        num_pareto: Vec::new(),
        norm_pareto: Vec::new(),
        grid_coverage: Vec::new(),
    };

    for subject in &subjects {
        let points = &data.subject_points[subject];
        let sequence = &data.subject_sequence[subject];
        let n = points.len();

        let counts: RegionCounts =
            crate::regions::count_regions(points.iter(), thresholds);

        summary.num_points.push(n as f64);
        summary.num_green.push(counts.green as f64);
        summary.num_yellow.push(counts.yellow as f64);
        summary.num_blue.push(counts.blue as f64);
        summary.num_outside.push(counts.outside as f64);
        summary.coverage.push(counts.coverage() as f64);
        summary
            .num_pareto
            .push(front.subject_point_count(subject) as f64);

        if n == 0 {
            continue;
        }

        let n_f = n as f64;
        summary.norm_green.push(counts.green as f64 / n_f);
        summary.norm_yellow.push(counts.yellow as f64 / n_f);
        summary.norm_blue.push(counts.blue as f64 / n_f);
        summary.norm_outside.push(counts.outside as f64 / n_f);

        let first = sequence[0];
        let last = sequence[n - 1];
        summary.span.push((last - first) as f64);
        summary
            .delta_t
            .extend(sequence.windows(2).map(|w| (w[1] - w[0]) as f64));

        for (region, bucket) in [
            (Region::Green, &mut summary.time_to_green),
            (Region::Yellow, &mut summary.time_to_yellow),
            (Region::Blue, &mut summary.time_to_blue),
        ] {
            if let Some(pos) = points
                .iter()
                .position(|p| thresholds.classify(p) == region)
            {
                bucket.push((sequence[pos] - first) as f64);
            }
        }

        summary.grid_coverage.push(grid_coverage(points, window) as f64);
    }

    let pareto_total: f64 = summary.num_pareto.iter().sum();
    summary.norm_pareto = summary
        .num_pareto
        .iter()
        .map(|&count| if pareto_total > 0.0 { count / pareto_total } else { 0.0 })
        .collect();

    summary
}

/// Per-subject counts on the shared cross-condition frontier, zero-seeded
/// from the condition's subject roster.
pub fn combined_pareto_counts(
    front: &CrossConditionFront,
    condition: Condition,
    subjects: &[SubjectId],
) -> Vec<f64> {
    let counts: HashMap<Condition, HashMap<SubjectId, usize>> = front.subject_counts();
    let per_subject = counts.get(&condition);
    subjects
        .iter()
        .map(|subject| {
            per_subject
                .and_then(|m| m.get(subject))
                .copied()
                .unwrap_or(0) as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use designlab_core::domain::PointSet;

    fn pt(p: f64, f: f64) -> DesignPoint {
        DesignPoint::new(p, f).unwrap()
    }

    fn data_for(entries: &[(&str, &[(f64, f64, u32)])]) -> ConditionData {
        let mut data = ConditionData::default();
        for &(subject, points) in entries {
            let id = SubjectId::new(subject);
            let mut seq = Vec::new();
            let mut pts = Vec::new();
            for &(p, f, index) in points {
                let point = pt(p, f);
                data.point_owners.add(point, id.clone());
                pts.push(point);
                seq.push(index);
            }
            data.subject_points.insert(id.clone(), pts);
            data.subject_sequence.insert(id.clone(), seq);
            data.skipped.insert(id, Vec::new());
        }
        data
    }

    fn summarize(data: &ConditionData) -> ConditionSummary {
        summarize_condition(
            Condition::Control,
            data,
            &RegionThresholds::default(),
            &ParetoWindow::default(),
            DuplicatePolicy::MergeOwners,
        )
    }

    #[test]
    fn counts_and_rates() {
        let data = data_for(&[(
            "A",
            &[
                (1000.0, 10.0, 3), // green
                (1500.0, 5.0, 7),  // yellow
                (1900.0, 80.0, 9), // outside
                (1050.0, 90.0, 12), // blue
            ],
        )]);
        let s = summarize(&data);

        assert_eq!(s.num_points, vec![4.0]);
        assert_eq!(s.num_green, vec![1.0]);
        assert_eq!(s.num_yellow, vec![1.0]);
        assert_eq!(s.num_blue, vec![1.0]);
        assert_eq!(s.num_outside, vec![1.0]);
        assert_eq!(s.coverage, vec![3.0]);
        assert_eq!(s.norm_green, vec![0.25]);
        assert_eq!(s.span, vec![9.0]);
        assert_eq!(s.delta_t, vec![4.0, 2.0, 3.0]);
    }

    #[test]
    fn time_to_first_region_uses_offsets() {
        let data = data_for(&[(
            "A",
            &[
                (1900.0, 80.0, 5),  // outside
                (1000.0, 10.0, 8),  // first green at offset 3
                (1000.0, 12.0, 11), // green again, ignored
                (1500.0, 5.0, 13),  // first yellow at offset 8
            ],
        )]);
        let s = summarize(&data);

        assert_eq!(s.time_to_green, vec![3.0]);
        assert_eq!(s.time_to_yellow, vec![8.0]);
        assert!(s.time_to_blue.is_empty());
    }

    #[test]
    fn pareto_participation_shares() {
        let data = data_for(&[
            ("A", &[(1000.0, 20.0, 0), (1300.0, 10.0, 1)]),
            ("B", &[(1100.0, 50.0, 0)]), // dominated by A's (1000, 20)
        ]);
        let s = summarize(&data);

        assert_eq!(s.num_pareto, vec![2.0, 0.0]);
        assert_eq!(s.norm_pareto, vec![1.0, 0.0]);
    }

    #[test]
    fn zero_point_subject_counts_but_no_rates() {
        let data = data_for(&[("A", &[(1000.0, 10.0, 0)]), ("B", &[])]);
        let s = summarize(&data);

        assert_eq!(s.num_points, vec![1.0, 0.0]);
        assert_eq!(s.norm_green.len(), 1);
        assert_eq!(s.span.len(), 1);
        assert_eq!(s.grid_coverage.len(), 1);
    }

    #[test]
    fn grid_coverage_counts_distinct_interior_cells() {
        let window = ParetoWindow::default();
        // two points in the same cell, one in another, one in overflow
        let points = [
            pt(910.0, 5.0),
            pt(940.0, 8.0),
            pt(1500.0, 55.0),
            pt(2600.0, 5.0),
        ];
        assert_eq!(grid_coverage(&points, &window), 2);
    }

    #[test]
    fn grid_coverage_underflow_column_not_counted() {
        let window = ParetoWindow::default();
        let points = [pt(600.0, 5.0)];
        assert_eq!(grid_coverage(&points, &window), 0);
    }

    #[test]
    fn combined_counts_zero_seeded() {
        let control: PointSet = [
            (pt(1000.0, 20.0), SubjectId::new("A")),
        ]
        .into_iter()
        .collect();
        let margin: PointSet = [(pt(1300.0, 10.0), SubjectId::new("C"))].into_iter().collect();

        let front = crate::compare::compare_conditions(
            &[
                (Condition::Control, &control),
                (Condition::Margin, &margin),
            ],
            &ParetoWindow::default(),
            DuplicatePolicy::MergeOwners,
        );

        let subjects = [SubjectId::new("A"), SubjectId::new("B")];
        assert_eq!(
            combined_pareto_counts(&front, Condition::Control, &subjects),
            vec![1.0, 0.0]
        );
    }

    #[test]
    fn mean_and_std_dev() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert!((std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-12);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn stat_vector_table_is_complete() {
        let data = data_for(&[("A", &[(1000.0, 10.0, 0)])]);
        let s = summarize(&data);
        assert_eq!(s.named_stats().len(), 18);
    }
}
