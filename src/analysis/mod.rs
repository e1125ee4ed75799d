//! Blast Analysis Engine
//!
//! Deterministic calculations over a blast's hole records. Everything here
//! is pure: inputs are borrowed, nothing is cached, and identical inputs give
//! bit-identical outputs.
//!
//! ## Operations
//! - `compute_summary()` - min/max/avg of one hole field
//! - `compute_powder_factor()` - mean per-hole powder factor (kg/m³)
//! - `classify_insights()` - advisory verdicts from the two above
//! - `analyze_blast()` / `analyze_blasts()` - full report, one or many blasts
//!
//! Missing data is always `None`; only out-of-domain query parameters are
//! errors.

pub mod insights;
pub mod powder_factor;
pub mod recompute;
pub mod statistics;

pub use insights::{
    classify_consistency, classify_fragmentation, classify_insights, classify_insights_with,
    classify_powder_factor,
};
pub use powder_factor::{
    compute_powder_factor, cross_section_area_m2, explosive_mass_kg, hole_powder_factor,
    loading_density_kg_m, pooled_powder_factor, powder_factor_breakdown, rock_volume_m3,
};
pub use recompute::{AppliedPowderFactor, RecomputeCoordinator, RecomputeTicket, Resolution};
pub use statistics::{compute_summary, summarize_blast, summarize_values};

use chrono::Utc;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::InsightThresholds;
use crate::ingest::HoleSource;
use crate::types::{Blast, BlastReport, BlastSummary, PowderFactorParams};

/// Errors raised by the analysis engine.
///
/// Insufficient data is not an error; it is reported as `None`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid parameter {name}: {value} (must be a finite value > 0)")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Analyze one blast: summaries, powder factor, insights and quality flags.
pub fn analyze_blast(
    blast: &Blast,
    params: PowderFactorParams,
    thresholds: &InsightThresholds,
) -> Result<BlastReport, AnalysisError> {
    // Re-check in case the caller built params by hand
    let params = PowderFactorParams::new(params.rock_density_t_m3, params.bench_height_m)?;

    let summary = summarize_blast(&blast.holes);
    let powder_factor = powder_factor_breakdown(&blast.holes, params);
    let insights = classify_insights_with(&summary, powder_factor.powder_factor_kg_m3, thresholds);
    let flagged_holes = blast.quality_report();

    debug!(
        blast = %blast.name,
        holes = summary.holes,
        pf_holes = powder_factor.holes_used,
        flagged = flagged_holes.len(),
        "Blast analyzed"
    );

    Ok(BlastReport {
        blast_name: blast.name.clone(),
        bench: blast.bench.clone(),
        summary,
        powder_factor,
        insights,
        flagged_holes,
        generated_at: Utc::now(),
    })
}

/// Analyze many blasts in parallel.
///
/// Results are returned in the same order as `blasts`.
pub fn analyze_blasts(
    blasts: &[Blast],
    params: PowderFactorParams,
    thresholds: &InsightThresholds,
) -> Vec<Result<BlastReport, AnalysisError>> {
    let reports: Vec<_> = blasts
        .par_iter()
        .map(|blast| analyze_blast(blast, params, thresholds))
        .collect();
    info!(blasts = reports.len(), "Batch analysis complete");
    reports
}

/// Summarize a blast fetched from a hole source.
///
/// `None` if the source does not know the blast.
pub fn summarize_from_source<S: HoleSource + ?Sized>(
    source: &S,
    blast_id: &str,
) -> Option<BlastSummary> {
    source.hole_records(blast_id).map(|holes| summarize_blast(&holes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::BlastStore;
    use crate::types::{HoleRecord, Verdict};

    fn sample_blast() -> Blast {
        let holes = [(3.4, 3.9), (3.5, 4.0), (3.6, 4.1)]
            .iter()
            .enumerate()
            .map(|(i, &(b, s))| {
                HoleRecord::new(format!("A{}", i + 1))
                    .with_burden(b)
                    .with_spacing(s)
                    .with_diameter_mm(115.0)
                    .with_depth_m(11.0)
                    .with_stemming_m(3.0)
                    .with_charge(1200.0, 8.0)
            })
            .collect();
        Blast::new("B-101", holes).with_bench("RL 1240")
    }

    fn params() -> PowderFactorParams {
        PowderFactorParams::new(2.7, 10.0).unwrap()
    }

    #[test]
    fn test_analyze_blast_report() {
        let report = analyze_blast(&sample_blast(), params(), &InsightThresholds::default()).unwrap();
        assert_eq!(report.blast_name, "B-101");
        assert_eq!(report.bench.as_deref(), Some("RL 1240"));
        assert_eq!(report.summary.holes, 3);
        assert_eq!(report.powder_factor.holes_used, 3);
        assert_eq!(report.insights.fragmentation.verdict, Verdict::Optimal);
        assert_eq!(report.insights.powder_factor.verdict, Verdict::Optimal);
        assert_eq!(report.insights.consistency.verdict, Verdict::Optimal);
        assert!(report.flagged_holes.is_empty());
    }

    #[test]
    fn test_analyze_blast_rejects_hand_built_params() {
        let bad = PowderFactorParams { rock_density_t_m3: 2.7, bench_height_m: -1.0 };
        assert!(analyze_blast(&sample_blast(), bad, &InsightThresholds::default()).is_err());
    }

    #[test]
    fn test_analyze_blasts_preserves_order() {
        let blasts: Vec<Blast> = (0..16)
            .map(|i| {
                let mut b = sample_blast();
                b.name = format!("B-{i}");
                b
            })
            .collect();
        let reports = analyze_blasts(&blasts, params(), &InsightThresholds::default());
        let names: Vec<String> = reports
            .into_iter()
            .map(|r| r.unwrap().blast_name)
            .collect();
        let expected: Vec<String> = (0..16).map(|i| format!("B-{i}")).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_summarize_from_source() {
        let mut store = BlastStore::new();
        store.insert("b101", sample_blast());
        let summary = summarize_from_source(&store, "b101").unwrap();
        assert_eq!(summary.holes, 3);
        assert!(summarize_from_source(&store, "missing").is_none());
    }

    #[test]
    fn test_error_message() {
        let err = AnalysisError::InvalidParameter { name: "bench_height_m", value: -2.0 };
        assert_eq!(
            err.to_string(),
            "Invalid parameter bench_height_m: -2 (must be a finite value > 0)"
        );
    }
}
