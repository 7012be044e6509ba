//! Experimental conditions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The interface condition a subject was assigned to. Each subject belongs to
/// exactly one condition; each condition owns its own point collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Control,
    Margin,
    GammaSlider,
    PerformanceSlider,
}

impl Condition {
    /// Fixed processing order. Cross-condition comparison offers points to
    /// the shared frontier in this order.
    pub const ALL: [Condition; 4] = [
        Condition::Control,
        Condition::Margin,
        Condition::GammaSlider,
        Condition::PerformanceSlider,
    ];

    /// Human-readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Condition::Control => "Control",
            Condition::Margin => "Margin",
            Condition::GammaSlider => "Gamma Slider",
            Condition::PerformanceSlider => "Performance Slider",
        }
    }

    /// Default data-directory name for this condition.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Condition::Control => "control",
            Condition::Margin => "margin",
            Condition::GammaSlider => "gamma_slider",
            Condition::PerformanceSlider => "performance_slider",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
