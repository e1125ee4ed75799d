//! Drill-hole records and per-hole data-quality flags

use serde::{Deserialize, Serialize};

/// One drilled blast hole as handed over by the ingestion layer.
///
/// Every measurement is optional: a hole that was never surveyed for
/// spacing carries `None`, which is different from a spacing of zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoleRecord {
    /// Hole identifier, unique within a blast
    pub hole_id: String,
    /// Distance to the free face (m)
    #[serde(default)]
    pub burden: Option<f64>,
    /// Distance to the adjacent hole in the same row (m)
    #[serde(default)]
    pub spacing: Option<f64>,
    /// Hole diameter (mm)
    #[serde(default)]
    pub diameter_mm: Option<f64>,
    /// Total drilled depth (m)
    #[serde(default)]
    pub hole_depth_m: Option<f64>,
    /// Inert collar fill (m)
    #[serde(default)]
    pub stemming_m: Option<f64>,
    /// Explosive product density (kg/m³)
    #[serde(default)]
    pub explosive_density_kg_m3: Option<f64>,
    /// Charged length (m)
    #[serde(default)]
    pub explosive_column_m: Option<f64>,
}

impl HoleRecord {
    /// Create a record with only an identifier set.
    pub fn new(hole_id: impl Into<String>) -> Self {
        Self {
            hole_id: hole_id.into(),
            ..Self::default()
        }
    }

    pub fn with_burden(mut self, burden: f64) -> Self {
        self.burden = Some(burden);
        self
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn with_diameter_mm(mut self, diameter_mm: f64) -> Self {
        self.diameter_mm = Some(diameter_mm);
        self
    }

    pub fn with_depth_m(mut self, depth_m: f64) -> Self {
        self.hole_depth_m = Some(depth_m);
        self
    }

    pub fn with_stemming_m(mut self, stemming_m: f64) -> Self {
        self.stemming_m = Some(stemming_m);
        self
    }

    /// Set the charge: explosive density (kg/m³) and column length (m).
    pub fn with_charge(mut self, density_kg_m3: f64, column_m: f64) -> Self {
        self.explosive_density_kg_m3 = Some(density_kg_m3);
        self.explosive_column_m = Some(column_m);
        self
    }

    /// Raw value of a numeric field, present or not.
    pub fn field(&self, field: HoleField) -> Option<f64> {
        match field {
            HoleField::Burden => self.burden,
            HoleField::Spacing => self.spacing,
            HoleField::DiameterMm => self.diameter_mm,
            HoleField::HoleDepthM => self.hole_depth_m,
            HoleField::StemmingM => self.stemming_m,
            HoleField::ExplosiveDensityKgM3 => self.explosive_density_kg_m3,
            HoleField::ExplosiveColumnM => self.explosive_column_m,
        }
    }

    /// Field value usable for statistics.
    ///
    /// Negative and non-finite measurements are treated as not measured.
    pub fn measured(&self, field: HoleField) -> Option<f64> {
        self.field(field).filter(|v| v.is_finite() && *v >= 0.0)
    }

    /// Field value usable as a divisor or geometric factor (strictly positive).
    pub fn positive(&self, field: HoleField) -> Option<f64> {
        self.field(field).filter(|v| v.is_finite() && *v > 0.0)
    }

    /// Advisory data-quality flags for this hole. Never used to reject data.
    pub fn quality_flags(&self) -> Vec<HoleFlag> {
        let mut flags = Vec::new();

        for field in HoleField::ALL {
            if let Some(v) = self.field(field) {
                if !v.is_finite() || v < 0.0 {
                    flags.push(HoleFlag::InvalidValue { field, value: v });
                }
            }
        }

        let depth = self.measured(HoleField::HoleDepthM);
        let stemming = self.measured(HoleField::StemmingM);
        let column = self.measured(HoleField::ExplosiveColumnM);

        if let (Some(depth), Some(stemming)) = (depth, stemming) {
            if stemming > depth {
                flags.push(HoleFlag::StemmingExceedsDepth { stemming_m: stemming, depth_m: depth });
            }
            if let Some(column) = column {
                if column + stemming > depth {
                    flags.push(HoleFlag::ChargeExceedsDepth {
                        charged_m: column + stemming,
                        depth_m: depth,
                    });
                }
            }
        }

        flags
    }
}

/// Numeric hole fields that can be summarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoleField {
    Burden,
    Spacing,
    DiameterMm,
    HoleDepthM,
    StemmingM,
    ExplosiveDensityKgM3,
    ExplosiveColumnM,
}

impl HoleField {
    pub const ALL: [Self; 7] = [
        Self::Burden,
        Self::Spacing,
        Self::DiameterMm,
        Self::HoleDepthM,
        Self::StemmingM,
        Self::ExplosiveDensityKgM3,
        Self::ExplosiveColumnM,
    ];

    /// Column name used in CSV uploads and JSON documents.
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Burden => "burden",
            Self::Spacing => "spacing",
            Self::DiameterMm => "diameter_mm",
            Self::HoleDepthM => "hole_depth_m",
            Self::StemmingM => "stemming_m",
            Self::ExplosiveDensityKgM3 => "explosive_density_kg_m3",
            Self::ExplosiveColumnM => "explosive_column_m",
        }
    }

    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column_name() == name)
    }
}

impl std::fmt::Display for HoleField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Data-quality observation on a single hole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HoleFlag {
    /// Negative or non-finite measurement; excluded from statistics on that field
    InvalidValue { field: HoleField, value: f64 },
    /// Stemming longer than the hole
    StemmingExceedsDepth { stemming_m: f64, depth_m: f64 },
    /// Explosive column plus stemming longer than the hole
    ChargeExceedsDepth { charged_m: f64, depth_m: f64 },
    /// Hole id appears more than once in the blast
    DuplicateId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measured_excludes_negative_and_nan() {
        let mut hole = HoleRecord::new("H1").with_burden(-3.0);
        hole.spacing = Some(f64::NAN);
        assert_eq!(hole.measured(HoleField::Burden), None);
        assert_eq!(hole.measured(HoleField::Spacing), None);
        assert_eq!(hole.field(HoleField::Burden), Some(-3.0));
    }

    #[test]
    fn test_measured_keeps_zero_positive_does_not() {
        let hole = HoleRecord::new("H1").with_stemming_m(0.0);
        assert_eq!(hole.measured(HoleField::StemmingM), Some(0.0));
        assert_eq!(hole.positive(HoleField::StemmingM), None);
    }

    #[test]
    fn test_column_name_round_trip() {
        for field in HoleField::ALL {
            assert_eq!(HoleField::from_column_name(field.column_name()), Some(field));
        }
        assert_eq!(HoleField::from_column_name("Burden"), None);
    }

    #[test]
    fn test_clean_hole_has_no_flags() {
        let hole = HoleRecord::new("H1")
            .with_burden(3.5)
            .with_spacing(4.0)
            .with_depth_m(11.0)
            .with_stemming_m(3.0)
            .with_charge(1200.0, 8.0);
        assert!(hole.quality_flags().is_empty());
    }

    #[test]
    fn test_charge_overrun_is_flagged() {
        let hole = HoleRecord::new("H1")
            .with_depth_m(10.0)
            .with_stemming_m(3.0)
            .with_charge(1200.0, 8.0);
        let flags = hole.quality_flags();
        assert_eq!(flags.len(), 1);
        assert!(matches!(flags[0], HoleFlag::ChargeExceedsDepth { .. }));
    }

    #[test]
    fn test_stemming_longer_than_hole_is_flagged() {
        let hole = HoleRecord::new("H1").with_depth_m(2.0).with_stemming_m(3.0);
        assert!(hole
            .quality_flags()
            .iter()
            .any(|f| matches!(f, HoleFlag::StemmingExceedsDepth { .. })));
    }

    #[test]
    fn test_negative_burden_is_flagged() {
        let hole = HoleRecord::new("H1").with_burden(-1.0);
        assert_eq!(
            hole.quality_flags(),
            vec![HoleFlag::InvalidValue { field: HoleField::Burden, value: -1.0 }]
        );
    }
}
