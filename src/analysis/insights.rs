//! Advisory classification of blast summaries
//!
//! Each classifier maps a derived figure onto a [`Verdict`] and keeps the
//! figure alongside it, so presentation code can build its own wording.
//! Missing inputs always yield `Verdict::InsufficientData`.

use crate::config::InsightThresholds;
use crate::types::{
    BlastSummary, ConsistencyInsight, FieldSummary, FragmentationInsight, Insights,
    PowderFactorInsight, Verdict,
};

/// Burden/spacing ratio check. The optimal band is inclusive.
pub fn classify_fragmentation(
    burden: Option<&FieldSummary>,
    spacing: Option<&FieldSummary>,
    thresholds: &InsightThresholds,
) -> FragmentationInsight {
    let ratio = match (burden, spacing) {
        (Some(b), Some(s)) if b.avg > 0.0 && s.avg > 0.0 => Some(b.avg / s.avg),
        _ => None,
    };

    let verdict = match ratio {
        None => Verdict::InsufficientData,
        Some(r)
            if (thresholds.burden_spacing_ratio_min..=thresholds.burden_spacing_ratio_max)
                .contains(&r) =>
        {
            Verdict::Optimal
        }
        Some(_) => Verdict::Adjust,
    };

    FragmentationInsight {
        verdict,
        burden_spacing_ratio: ratio,
    }
}

/// Powder factor band check. The optimal band is exclusive at both ends.
pub fn classify_powder_factor(
    powder_factor_kg_m3: Option<f64>,
    thresholds: &InsightThresholds,
) -> PowderFactorInsight {
    let pf = powder_factor_kg_m3.filter(|v| v.is_finite());

    let verdict = match pf {
        None => Verdict::InsufficientData,
        Some(v)
            if v > thresholds.powder_factor_min_kg_m3
                && v < thresholds.powder_factor_max_kg_m3 =>
        {
            Verdict::Optimal
        }
        Some(_) => Verdict::Adjust,
    };

    PowderFactorInsight {
        verdict,
        powder_factor_kg_m3: pf,
    }
}

/// Drilling accuracy check from burden variation `(max - min) / avg`.
pub fn classify_consistency(
    burden: Option<&FieldSummary>,
    spacing: Option<&FieldSummary>,
    thresholds: &InsightThresholds,
) -> ConsistencyInsight {
    let burden_variation = burden.and_then(FieldSummary::variation_percent);

    let verdict = match burden_variation {
        None => Verdict::InsufficientData,
        Some(v) if v < thresholds.burden_variation_max_percent => Verdict::Optimal,
        Some(_) => Verdict::Adjust,
    };

    ConsistencyInsight {
        verdict,
        burden_variation_percent: burden_variation,
        spacing_variation_percent: spacing.and_then(FieldSummary::variation_percent),
    }
}

/// Classify a blast with the configured advisory bands.
pub fn classify_insights(summary: &BlastSummary, powder_factor_kg_m3: Option<f64>) -> Insights {
    classify_insights_with(summary, powder_factor_kg_m3, &crate::config::get().insights)
}

/// Classify a blast with explicit advisory bands.
pub fn classify_insights_with(
    summary: &BlastSummary,
    powder_factor_kg_m3: Option<f64>,
    thresholds: &InsightThresholds,
) -> Insights {
    let burden = summary.burden.as_ref();
    let spacing = summary.spacing.as_ref();
    Insights {
        fragmentation: classify_fragmentation(burden, spacing, thresholds),
        powder_factor: classify_powder_factor(powder_factor_kg_m3, thresholds),
        consistency: classify_consistency(burden, spacing, thresholds),
    }
}

// ============================================================================
// Presentation
// ============================================================================

impl FragmentationInsight {
    pub fn message(&self) -> String {
        match (self.verdict, self.burden_spacing_ratio) {
            (Verdict::Optimal, Some(r)) => {
                format!("Burden to spacing ratio: {r:.2}. Optimal ratio for good fragmentation.")
            }
            (Verdict::Adjust, Some(r)) => format!(
                "Burden to spacing ratio: {r:.2}. Consider adjusting burden or spacing for better fragmentation."
            ),
            _ => "Insufficient data for fragmentation analysis.".to_string(),
        }
    }
}

impl PowderFactorInsight {
    pub fn message(&self) -> String {
        match (self.verdict, self.powder_factor_kg_m3) {
            (Verdict::Optimal, Some(pf)) => format!(
                "Current powder factor: {pf:.3} kg/m³. Within optimal range for most rock types."
            ),
            (Verdict::Adjust, Some(pf)) => format!(
                "Current powder factor: {pf:.3} kg/m³. Consider optimizing explosive distribution."
            ),
            _ => "Insufficient data for powder factor analysis.".to_string(),
        }
    }
}

impl ConsistencyInsight {
    pub fn message(&self) -> String {
        let Some(burden) = self.burden_variation_percent else {
            return "Insufficient data for pattern analysis.".to_string();
        };
        let mut msg = format!("Burden variation: {burden:.1}%.");
        if let Some(spacing) = self.spacing_variation_percent {
            msg.push_str(&format!(" Spacing variation: {spacing:.1}%."));
        }
        msg.push_str(if self.verdict.is_optimal() {
            " Good pattern consistency."
        } else {
            " Consider improving drilling accuracy."
        });
        msg
    }
}

impl Insights {
    /// Messages in display order: fragmentation, powder factor, consistency.
    pub fn messages(&self) -> [String; 3] {
        [
            self.fragmentation.message(),
            self.powder_factor.message(),
            self.consistency.message(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(min: f64, max: f64, avg: f64) -> FieldSummary {
        FieldSummary { min, max, avg, count: 3 }
    }

    fn t() -> InsightThresholds {
        InsightThresholds::default()
    }

    #[test]
    fn test_fragmentation_band_is_inclusive() {
        let spacing = summary(4.0, 4.0, 4.0);
        for (burden_avg, expected) in [
            (3.2, Verdict::Optimal),  // 0.8
            (4.8, Verdict::Optimal),  // 1.2
            (4.0, Verdict::Optimal),
            (3.0, Verdict::Adjust),   // 0.75
            (5.0, Verdict::Adjust),   // 1.25
        ] {
            let b = summary(burden_avg, burden_avg, burden_avg);
            let insight = classify_fragmentation(Some(&b), Some(&spacing), &t());
            assert_eq!(insight.verdict, expected, "burden {burden_avg}");
        }
    }

    #[test]
    fn test_fragmentation_missing_or_zero_spacing() {
        let b = summary(3.0, 3.0, 3.0);
        let zero = summary(0.0, 0.0, 0.0);
        assert_eq!(
            classify_fragmentation(Some(&b), None, &t()).verdict,
            Verdict::InsufficientData
        );
        let insight = classify_fragmentation(Some(&b), Some(&zero), &t());
        assert_eq!(insight.verdict, Verdict::InsufficientData);
        assert_eq!(insight.burden_spacing_ratio, None);
    }

    #[test]
    fn test_powder_factor_band_is_exclusive() {
        for (pf, expected) in [
            (0.3, Verdict::Adjust),
            (0.31, Verdict::Optimal),
            (0.712, Verdict::Optimal),
            (0.8, Verdict::Adjust),
            (0.0, Verdict::Adjust),
        ] {
            assert_eq!(classify_powder_factor(Some(pf), &t()).verdict, expected, "pf {pf}");
        }
        assert_eq!(
            classify_powder_factor(None, &t()).verdict,
            Verdict::InsufficientData
        );
    }

    #[test]
    fn test_consistency_threshold() {
        // (3.8 - 3.2) / 3.5 = 17.1%
        let tight = summary(3.2, 3.8, 3.5);
        assert_eq!(classify_consistency(Some(&tight), None, &t()).verdict, Verdict::Optimal);

        // (4.0 - 3.0) / 3.5 = 28.6%
        let loose = summary(3.0, 4.0, 3.5);
        let insight = classify_consistency(Some(&loose), Some(&tight), &t());
        assert_eq!(insight.verdict, Verdict::Adjust);
        assert!(insight.spacing_variation_percent.is_some());
    }

    #[test]
    fn test_consistency_without_burden() {
        let spacing = summary(4.0, 4.2, 4.1);
        let insight = classify_consistency(None, Some(&spacing), &t());
        assert_eq!(insight.verdict, Verdict::InsufficientData);
        assert!(insight.spacing_variation_percent.is_some());
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = InsightThresholds {
            burden_variation_max_percent: 10.0,
            ..InsightThresholds::default()
        };
        let tight = summary(3.2, 3.8, 3.5);
        assert_eq!(classify_consistency(Some(&tight), None, &strict).verdict, Verdict::Adjust);
    }

    #[test]
    fn test_classify_empty_blast() {
        let insights = classify_insights_with(&BlastSummary::default(), None, &t());
        assert_eq!(insights.fragmentation.verdict, Verdict::InsufficientData);
        assert_eq!(insights.powder_factor.verdict, Verdict::InsufficientData);
        assert_eq!(insights.consistency.verdict, Verdict::InsufficientData);
        assert!(insights.messages().iter().all(|m| m.starts_with("Insufficient data")));
    }

    #[test]
    fn test_global_thresholds_match_defaults() {
        let s = BlastSummary {
            burden: Some(summary(3.4, 3.6, 3.5)),
            spacing: Some(summary(3.9, 4.1, 4.0)),
            holes: 3,
        };
        assert_eq!(
            classify_insights(&s, Some(0.5)),
            classify_insights_with(&s, Some(0.5), &crate::config::get().insights)
        );
    }

    #[test]
    fn test_messages_carry_figures() {
        let s = BlastSummary {
            burden: Some(summary(3.4, 3.6, 3.5)),
            spacing: Some(summary(3.9, 4.1, 4.0)),
            holes: 3,
        };
        let [frag, pf, cons] = classify_insights_with(&s, Some(0.712), &t()).messages();
        assert!(frag.contains("0.88"), "{frag}");
        assert!(pf.contains("0.712"), "{pf}");
        assert!(cons.contains("Good pattern consistency"), "{cons}");
    }
}
