//! Textual point records.
//!
//! One record per evaluated design point:
//!
//! ```text
//! unknown                     # or: [14.2, 8.5, 0.27, 0.5]  (condition settings)
//! 1040.52, 23.0               # performance, failure_rate
//! 1051.88                     # optional: corrected performance, or SKIP
//! ```
//!
//! Parsing fails fast with a descriptive error on any malformed line —
//! a silently miscounted record is worse than a loud one.

use std::fmt::Write as _;
use thiserror::Error;

use designlab_core::domain::{DesignPoint, PointError};

use crate::corrector::Correction;

/// First line of a record: the interface settings that produced the point,
/// or `unknown` when they were never backfilled.
#[derive(Debug, Clone, PartialEq)]
pub enum Settings {
    Unknown,
    Values(Vec<f64>),
}

/// A persisted record violating the expected format.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("record is missing its {0} line")]
    MissingLine(&'static str),
    #[error("malformed settings line {line:?}: {reason}")]
    MalformedSettings { line: String, reason: String },
    #[error("malformed performance line {line:?}: expected \"<performance>, <failure_rate>\"")]
    MalformedPerformanceLine { line: String },
    #[error("malformed correction line {line:?}: expected a number or SKIP")]
    MalformedCorrection { line: String },
    #[error("invalid point values: {0}")]
    InvalidPoint(#[from] PointError),
    #[error("unexpected extra line {line:?}")]
    ExtraLine { line: String },
}

/// One parsed point record.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    pub settings: Settings,
    pub point: DesignPoint,
    pub correction: Option<Correction>,
}

impl PointRecord {
    pub fn new(settings: Settings, point: DesignPoint) -> Self {
        Self {
            settings,
            point,
            correction: None,
        }
    }

    /// The analysis point under corrected performance: `None` when the
    /// record has no correction yet or was marked `SKIP`.
    pub fn corrected_point(&self) -> Option<DesignPoint> {
        let value = self.correction.as_ref()?.value()?;
        DesignPoint::new(value, self.point.failure_rate()).ok()
    }

    /// Parse the textual form. Trailing newline is accepted.
    pub fn parse(text: &str) -> Result<Self, RecordError> {
        let mut lines = text.lines();

        let settings_line = lines.next().ok_or(RecordError::MissingLine("settings"))?;
        let settings = parse_settings(settings_line)?;

        let perf_line = lines.next().ok_or(RecordError::MissingLine("performance"))?;
        let (performance, failure_rate) = parse_performance_line(perf_line)?;
        let point = DesignPoint::new(performance, failure_rate)?;

        let correction = match lines.next() {
            None => None,
            Some(line) => Some(parse_correction(line)?),
        };

        if let Some(line) = lines.next() {
            return Err(RecordError::ExtraLine {
                line: line.to_string(),
            });
        }

        Ok(Self {
            settings,
            point,
            correction,
        })
    }

    /// The exact inverse of `parse`.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        match &self.settings {
            Settings::Unknown => out.push_str("unknown"),
            Settings::Values(values) => {
                out.push('[');
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{v:?}");
                }
                out.push(']');
            }
        }
        let _ = write!(
            out,
            "\n{:?}, {:?}",
            self.point.performance(),
            self.point.failure_rate()
        );
        match &self.correction {
            None => {}
            Some(Correction::Skip) => out.push_str("\nSKIP"),
            Some(Correction::Value(v)) => {
                let _ = write!(out, "\n{v:?}");
            }
        }
        out
    }
}

fn parse_settings(line: &str) -> Result<Settings, RecordError> {
    let line = line.trim_end();
    if line == "unknown" {
        return Ok(Settings::Unknown);
    }
    let inner = line
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| RecordError::MalformedSettings {
            line: line.to_string(),
            reason: "expected `unknown` or a bracketed list".to_string(),
        })?;
    if inner.trim().is_empty() {
        return Ok(Settings::Values(Vec::new()));
    }
    inner
        .split(',')
        .map(|item| {
            item.trim()
                .parse::<f64>()
                .map_err(|e| RecordError::MalformedSettings {
                    line: line.to_string(),
                    reason: format!("bad number {:?}: {e}", item.trim()),
                })
        })
        .collect::<Result<Vec<f64>, _>>()
        .map(Settings::Values)
}

fn parse_performance_line(line: &str) -> Result<(f64, f64), RecordError> {
    let malformed = || RecordError::MalformedPerformanceLine {
        line: line.to_string(),
    };
    let (perf, fail) = line.trim_end().split_once(',').ok_or_else(malformed)?;
    let performance = perf.trim().parse::<f64>().map_err(|_| malformed())?;
    let failure_rate = fail.trim().parse::<f64>().map_err(|_| malformed())?;
    Ok((performance, failure_rate))
}

fn parse_correction(line: &str) -> Result<Correction, RecordError> {
    let line = line.trim_end();
    if line == "SKIP" {
        return Ok(Correction::Skip);
    }
    line.parse::<f64>()
        .map(Correction::Value)
        .map_err(|_| RecordError::MalformedCorrection {
            line: line.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(p: f64, f: f64) -> DesignPoint {
        DesignPoint::new(p, f).unwrap()
    }

    #[test]
    fn parses_unknown_settings_two_lines() {
        let record = PointRecord::parse("unknown\n1040.52, 23.0\n").unwrap();
        assert_eq!(record.settings, Settings::Unknown);
        assert_eq!(record.point, pt(1040.52, 23.0));
        assert_eq!(record.correction, None);
    }

    #[test]
    fn parses_settings_values_and_correction() {
        let text = "[14.2, 8.5, 0.27, 0.5]\n1040.52, 23.0\n1051.88";
        let record = PointRecord::parse(text).unwrap();

        assert_eq!(
            record.settings,
            Settings::Values(vec![14.2, 8.5, 0.27, 0.5])
        );
        assert_eq!(record.correction, Some(Correction::Value(1051.88)));
        assert_eq!(record.corrected_point(), Some(pt(1051.88, 23.0)));
    }

    #[test]
    fn parses_skip_correction() {
        let record = PointRecord::parse("unknown\n1040.52, 23.0\nSKIP").unwrap();
        assert_eq!(record.correction, Some(Correction::Skip));
        assert_eq!(record.corrected_point(), None);
    }

    #[test]
    fn write_then_parse_is_identity() {
        let mut record = PointRecord::new(
            Settings::Values(vec![14.2, 0.5]),
            pt(1040.0, 23.0),
        );
        record.correction = Some(Correction::Value(1051.0));

        let text = record.to_text();
        assert_eq!(text, "[14.2, 0.5]\n1040.0, 23.0\n1051.0");
        assert_eq!(PointRecord::parse(&text).unwrap(), record);
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(
            PointRecord::parse(""),
            Err(RecordError::MissingLine("settings"))
        );
    }

    #[test]
    fn rejects_missing_performance_line() {
        assert_eq!(
            PointRecord::parse("unknown"),
            Err(RecordError::MissingLine("performance"))
        );
    }

    #[test]
    fn rejects_malformed_performance_line() {
        assert!(matches!(
            PointRecord::parse("unknown\n1040.52 23.0"),
            Err(RecordError::MalformedPerformanceLine { .. })
        ));
        assert!(matches!(
            PointRecord::parse("unknown\nabc, 23.0"),
            Err(RecordError::MalformedPerformanceLine { .. })
        ));
    }

    #[test]
    fn rejects_malformed_settings() {
        assert!(matches!(
            PointRecord::parse("14.2, 8.5\n1040.0, 23.0"),
            Err(RecordError::MalformedSettings { .. })
        ));
        assert!(matches!(
            PointRecord::parse("[14.2, oops]\n1040.0, 23.0"),
            Err(RecordError::MalformedSettings { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_failure_rate() {
        assert!(matches!(
            PointRecord::parse("unknown\n1040.0, 250.0"),
            Err(RecordError::InvalidPoint(_))
        ));
    }

    #[test]
    fn rejects_malformed_correction_and_extra_lines() {
        assert!(matches!(
            PointRecord::parse("unknown\n1040.0, 23.0\nmaybe"),
            Err(RecordError::MalformedCorrection { .. })
        ));
        assert!(matches!(
            PointRecord::parse("unknown\n1040.0, 23.0\nSKIP\nextra"),
            Err(RecordError::ExtraLine { .. })
        ));
    }
}
