//! Analysis outputs: field summaries, powder factor breakdown, blast report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FlaggedHole, Insights};

/// Descriptive statistics of one hole field over the holes that measured it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Number of holes that contributed
    pub count: usize,
}

impl FieldSummary {
    /// Spread relative to the mean, `(max - min) / avg`, as a percentage.
    ///
    /// `None` when the mean is zero.
    pub fn variation_percent(&self) -> Option<f64> {
        (self.avg > 0.0).then(|| (self.max - self.min) / self.avg * 100.0)
    }
}

/// Burden and spacing summaries for one blast.
///
/// `None` on a field means no hole measured it; it is never reported as zeros.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BlastSummary {
    pub burden: Option<FieldSummary>,
    pub spacing: Option<FieldSummary>,
    /// Total holes in the blast, measured or not
    pub holes: usize,
}

/// Rock and geometry parameters supplied at query time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowderFactorParams {
    /// In-situ rock density (t/m³)
    pub rock_density_t_m3: f64,
    /// Bench height shared by every hole (m)
    pub bench_height_m: f64,
}

/// Powder factor with the bookkeeping behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowderFactorBreakdown {
    /// Mean of per-hole powder factors (kg/m³); `None` if no hole qualified
    pub powder_factor_kg_m3: Option<f64>,
    /// Same figure per tonne of rock (kg/t)
    pub specific_charge_kg_t: Option<f64>,
    /// Holes with complete charge and pattern data
    pub holes_used: usize,
    /// Holes skipped for missing or non-positive data
    pub holes_excluded: usize,
    pub params: PowderFactorParams,
}

/// Full analysis of one blast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlastReport {
    pub blast_name: String,
    pub bench: Option<String>,
    pub summary: BlastSummary,
    pub powder_factor: PowderFactorBreakdown,
    pub insights: Insights,
    pub flagged_holes: Vec<FlaggedHole>,
    pub generated_at: DateTime<Utc>,
}
