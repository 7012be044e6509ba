//! Region classification of (performance, failure_rate) points.
//!
//! Three named regions, checked in fixed order green → yellow → blue; a point
//! matching none is `Outside`. The blue branch does not bound failure rate,
//! so its performance range overlaps green's — the fixed check order is what
//! makes classification total and deterministic.

use serde::{Deserialize, Serialize};

use designlab_core::domain::DesignPoint;

/// Region membership under the fixed-order rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Green,
    Yellow,
    Blue,
    Outside,
}

/// Threshold geometry of the three regions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionThresholds {
    pub green_max_performance: f64,
    pub green_max_failure_rate: f64,
    pub yellow_max_performance: f64,
    pub yellow_max_failure_rate: f64,
    pub blue_max_performance: f64,
}

impl Default for RegionThresholds {
    fn default() -> Self {
        Self {
            green_max_performance: 1200.0,
            green_max_failure_rate: 30.0,
            yellow_max_performance: 2000.0,
            yellow_max_failure_rate: 10.0,
            blue_max_performance: 1100.0,
        }
    }
}

impl RegionThresholds {
    /// Classify one point. Total: every point maps to exactly one region.
    pub fn classify(&self, point: &DesignPoint) -> Region {
        let perf = point.performance();
        let fail = point.failure_rate();

        if perf <= self.green_max_performance && fail <= self.green_max_failure_rate {
            Region::Green
        } else if perf <= self.yellow_max_performance && fail <= self.yellow_max_failure_rate {
            Region::Yellow
        } else if perf <= self.blue_max_performance {
            Region::Blue
        } else {
            Region::Outside
        }
    }
}

/// Per-subject region tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionCounts {
    pub green: usize,
    pub yellow: usize,
    pub blue: usize,
    pub outside: usize,
}

impl RegionCounts {
    pub fn add(&mut self, region: Region) {
        match region {
            Region::Green => self.green += 1,
            Region::Yellow => self.yellow += 1,
            Region::Blue => self.blue += 1,
            Region::Outside => self.outside += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.green + self.yellow + self.blue + self.outside
    }

    /// Coverage score: number of distinct named regions hit at least once (0–3).
    pub fn coverage(&self) -> u8 {
        [self.green, self.yellow, self.blue]
            .iter()
            .filter(|&&n| n > 0)
            .count() as u8
    }
}

/// Tally a subject's point sequence.
pub fn count_regions<'a>(
    points: impl IntoIterator<Item = &'a DesignPoint>,
    thresholds: &RegionThresholds,
) -> RegionCounts {
    let mut counts = RegionCounts::default();
    for point in points {
        counts.add(thresholds.classify(point));
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(p: f64, f: f64) -> DesignPoint {
        DesignPoint::new(p, f).unwrap()
    }

    fn thresholds() -> RegionThresholds {
        RegionThresholds::default()
    }

    #[test]
    fn green_wins_over_blue_overlap() {
        // performance ≤ 1100 would also satisfy blue, but green checks first
        assert_eq!(thresholds().classify(&pt(1050.0, 20.0)), Region::Green);
    }

    #[test]
    fn yellow_requires_low_failure_rate() {
        assert_eq!(thresholds().classify(&pt(1500.0, 5.0)), Region::Yellow);
        assert_eq!(thresholds().classify(&pt(1500.0, 15.0)), Region::Outside);
    }

    #[test]
    fn blue_is_unbounded_in_failure_rate() {
        assert_eq!(thresholds().classify(&pt(1050.0, 50.0)), Region::Blue);
        assert_eq!(thresholds().classify(&pt(1050.0, 100.0)), Region::Blue);
    }

    #[test]
    fn outside_otherwise() {
        assert_eq!(thresholds().classify(&pt(1150.0, 35.0)), Region::Outside);
        assert_eq!(thresholds().classify(&pt(2500.0, 1.0)), Region::Outside);
    }

    #[test]
    fn classification_is_total() {
        // grid sweep: every point lands in exactly one region
        let t = thresholds();
        for perf in (800..2400).step_by(100) {
            for fail in (0..=100).step_by(10) {
                let _ = t.classify(&pt(perf as f64, fail as f64));
            }
        }
    }

    #[test]
    fn boundary_points_inclusive() {
        assert_eq!(thresholds().classify(&pt(1200.0, 30.0)), Region::Green);
        assert_eq!(thresholds().classify(&pt(2000.0, 10.0)), Region::Yellow);
        assert_eq!(thresholds().classify(&pt(1100.0, 31.0)), Region::Blue);
    }

    #[test]
    fn counts_and_coverage() {
        let points = [
            pt(1000.0, 10.0),  // green
            pt(1100.0, 25.0),  // green
            pt(1500.0, 5.0),   // yellow
            pt(1050.0, 90.0),  // blue
            pt(1900.0, 80.0),  // outside
        ];
        let counts = count_regions(points.iter(), &thresholds());

        assert_eq!(counts.green, 2);
        assert_eq!(counts.yellow, 1);
        assert_eq!(counts.blue, 1);
        assert_eq!(counts.outside, 1);
        assert_eq!(counts.total(), 5);
        assert_eq!(counts.coverage(), 3);
    }

    #[test]
    fn coverage_partial() {
        let counts = count_regions([pt(1000.0, 10.0)].iter(), &thresholds());
        assert_eq!(counts.coverage(), 1);
        assert_eq!(RegionCounts::default().coverage(), 0);
    }
}
