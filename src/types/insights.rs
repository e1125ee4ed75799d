//! Advisory verdicts derived from blast summaries

use serde::{Deserialize, Serialize};

/// Outcome of an advisory classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Value inside the recommended band
    Optimal,
    /// Value outside the band; pattern or loading should be revisited
    Adjust,
    /// Inputs missing, nothing to classify
    InsufficientData,
}

impl Verdict {
    pub const fn is_optimal(self) -> bool {
        matches!(self, Self::Optimal)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimal => write!(f, "OPTIMAL"),
            Self::Adjust => write!(f, "ADJUST"),
            Self::InsufficientData => write!(f, "INSUFFICIENT DATA"),
        }
    }
}

/// Burden to spacing ratio check (fragmentation control).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FragmentationInsight {
    pub verdict: Verdict,
    pub burden_spacing_ratio: Option<f64>,
}

/// Powder factor band check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowderFactorInsight {
    pub verdict: Verdict,
    pub powder_factor_kg_m3: Option<f64>,
}

/// Drilling accuracy check from burden spread.
///
/// Spacing variation is carried for display; only burden drives the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyInsight {
    pub verdict: Verdict,
    pub burden_variation_percent: Option<f64>,
    pub spacing_variation_percent: Option<f64>,
}

/// All advisory verdicts for one blast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub fragmentation: FragmentationInsight,
    pub powder_factor: PowderFactorInsight,
    pub consistency: ConsistencyInsight,
}
