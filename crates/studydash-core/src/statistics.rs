//! Degree progress and display helpers for credit figures.

use serde::{Deserialize, Serialize};

/// Credits required for degree completion unless configured otherwise.
pub const DEFAULT_REQUIRED_ECTS: f64 = 210.0;

/// How far the earned credits go toward the degree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegreeProgress {
    /// Credits earned so far.
    pub earned: f64,
    /// Credits required for completion.
    pub required: f64,
    /// Exact percentage, not capped at 100.
    pub percent: f64,
    /// Percentage truncated toward zero, as shown in the progress line.
    pub whole_percent: u32,
}

impl DegreeProgress {
    /// Fraction of the bar to fill, clamped to `0.0..=1.0`.
    pub fn fill_ratio(&self) -> f64 {
        (self.percent / 100.0).clamp(0.0, 1.0)
    }
}

/// Compute degree progress. A non-positive `required` yields 0%.
pub fn degree_progress(earned: f64, required: f64) -> DegreeProgress {
    let percent = if required > 0.0 {
        earned / required * 100.0
    } else {
        0.0
    };

    DegreeProgress {
        earned,
        required,
        percent,
        whole_percent: percent.max(0.0).trunc() as u32,
    }
}

/// Format a credit figure, dropping the fraction for whole values (`5`, `7.5`).
pub fn format_ects(ects: f64) -> String {
    if ects.fract() == 0.0 {
        format!("{ects:.0}")
    } else {
        ects.to_string()
    }
}
