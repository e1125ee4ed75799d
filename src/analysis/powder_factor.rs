//! Powder factor calculations
//!
//! Powder factor is the mass of explosive per unit volume of rock broken
//! (kg/m³). For a single hole:
//!
//! ```text
//! mass   = column × π × (d_mm / 1000 / 2)² × ρ_explosive
//! volume = burden × spacing × bench_height
//! PF     = mass / volume
//! ```
//!
//! The blast figure is the arithmetic mean of per-hole powder factors over
//! qualifying holes. This is a mean of ratios, not total mass over total
//! volume; the two differ whenever hole geometries vary.

use std::f64::consts::PI;

use tracing::warn;

use super::AnalysisError;
use crate::types::{HoleField, HoleRecord, PowderFactorBreakdown, PowderFactorParams};

impl PowderFactorParams {
    /// Validate query-time parameters.
    ///
    /// Both values must be finite and strictly positive.
    pub fn new(rock_density_t_m3: f64, bench_height_m: f64) -> Result<Self, AnalysisError> {
        check_positive("rock_density_t_m3", rock_density_t_m3)?;
        check_positive("bench_height_m", bench_height_m)?;
        Ok(Self {
            rock_density_t_m3,
            bench_height_m,
        })
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), AnalysisError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        warn!(parameter = name, value, "Rejected powder factor parameter");
        Err(AnalysisError::InvalidParameter { name, value })
    }
}

/// Cross-section area of a hole (m²) from its diameter in millimetres.
pub fn cross_section_area_m2(diameter_mm: f64) -> f64 {
    let radius_m = diameter_mm / 1000.0 / 2.0;
    PI * radius_m * radius_m
}

/// Linear charge concentration (kg per metre of column).
pub fn loading_density_kg_m(diameter_mm: f64, explosive_density_kg_m3: f64) -> f64 {
    cross_section_area_m2(diameter_mm) * explosive_density_kg_m3
}

/// Explosive mass in a hole (kg), if the hole has complete charge data.
pub fn explosive_mass_kg(hole: &HoleRecord) -> Option<f64> {
    let column = hole.positive(HoleField::ExplosiveColumnM)?;
    let diameter = hole.positive(HoleField::DiameterMm)?;
    let density = hole.positive(HoleField::ExplosiveDensityKgM3)?;
    Some(column * cross_section_area_m2(diameter) * density)
}

/// Rock volume attributed to a hole (m³).
///
/// Uses the shared bench height, not the hole's own drilled depth.
pub fn rock_volume_m3(hole: &HoleRecord, bench_height_m: f64) -> Option<f64> {
    let burden = hole.positive(HoleField::Burden)?;
    let spacing = hole.positive(HoleField::Spacing)?;
    Some(burden * spacing * bench_height_m)
}

/// Per-hole powder factor (kg/m³).
///
/// `None` when any of burden, spacing, diameter, explosive column or
/// explosive density is missing, zero, negative or non-finite, or when the
/// ratio itself overflows or underflows to a non-positive or infinite value.
pub fn hole_powder_factor(hole: &HoleRecord, bench_height_m: f64) -> Option<f64> {
    let mass = explosive_mass_kg(hole)?;
    let volume = rock_volume_m3(hole, bench_height_m)?;
    Some(mass / volume).filter(|pf| pf.is_finite() && *pf > 0.0)
}

/// Average powder factor of a blast (kg/m³).
///
/// - `Err(InvalidParameter)` if rock density or bench height is not a
///   finite positive number
/// - `Ok(None)` if no hole has complete data
/// - `Ok(Some(pf))` otherwise, the mean of per-hole powder factors summed in
///   input order
pub fn compute_powder_factor(
    holes: &[HoleRecord],
    rock_density_t_m3: f64,
    bench_height_m: f64,
) -> Result<Option<f64>, AnalysisError> {
    let params = PowderFactorParams::new(rock_density_t_m3, bench_height_m)?;
    Ok(powder_factor_breakdown(holes, params).powder_factor_kg_m3)
}

/// Powder factor with hole accounting and the per-tonne figure.
///
/// `params` is assumed validated through [`PowderFactorParams::new`].
pub fn powder_factor_breakdown(
    holes: &[HoleRecord],
    params: PowderFactorParams,
) -> PowderFactorBreakdown {
    let mut sum = 0.0;
    let mut holes_used = 0usize;
    for pf in holes
        .iter()
        .filter_map(|h| hole_powder_factor(h, params.bench_height_m))
    {
        sum += pf;
        holes_used += 1;
    }

    let powder_factor_kg_m3 = (holes_used > 0)
        .then(|| sum / holes_used as f64)
        .filter(|pf| pf.is_finite());

    PowderFactorBreakdown {
        powder_factor_kg_m3,
        specific_charge_kg_t: powder_factor_kg_m3.map(|pf| pf / params.rock_density_t_m3),
        holes_used,
        holes_excluded: holes.len() - holes_used,
        params,
    }
}

/// Total explosive mass over total rock volume of the qualifying holes.
///
/// A reconciliation figure only. The reported blast powder factor is
/// [`compute_powder_factor`]; this pooled value weights large holes more.
pub fn pooled_powder_factor(
    holes: &[HoleRecord],
    bench_height_m: f64,
) -> Result<Option<f64>, AnalysisError> {
    check_positive("bench_height_m", bench_height_m)?;

    let (mass, volume) = holes
        .iter()
        .filter_map(|h| Some((explosive_mass_kg(h)?, rock_volume_m3(h, bench_height_m)?)))
        .fold((0.0, 0.0), |(m, v), (hm, hv)| (m + hm, v + hv));

    Ok((volume > 0.0)
        .then(|| mass / volume)
        .filter(|pf| pf.is_finite() && *pf > 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_hole() -> HoleRecord {
        HoleRecord::new("R1")
            .with_burden(3.5)
            .with_spacing(4.0)
            .with_diameter_mm(115.0)
            .with_charge(1200.0, 8.0)
    }

    #[test]
    fn test_cross_section_area() {
        let area = cross_section_area_m2(115.0);
        assert!((area - 0.010_387).abs() < 1e-6, "got {area}");
    }

    #[test]
    fn test_reference_hole_powder_factor() {
        let hole = reference_hole();
        let mass = explosive_mass_kg(&hole).unwrap();
        assert!((mass - 99.71).abs() < 0.01, "mass {mass}");
        assert_eq!(rock_volume_m3(&hole, 10.0), Some(140.0));

        let pf = compute_powder_factor(&[hole], 2.7, 10.0).unwrap().unwrap();
        assert!((pf - 0.712).abs() < 0.001, "pf {pf}");
    }

    #[test]
    fn test_loading_density() {
        // 115 mm at 1200 kg/m³ carries ~12.46 kg per metre
        let q = loading_density_kg_m(115.0, 1200.0);
        assert!((q - 12.464).abs() < 0.01, "q {q}");
    }

    #[test]
    fn test_rock_density_rejected() {
        let holes = vec![reference_hole()];
        for bad in [0.0, -2.7, f64::NAN] {
            let err = compute_powder_factor(&holes, bad, 10.0).unwrap_err();
            assert!(matches!(
                err,
                AnalysisError::InvalidParameter { name: "rock_density_t_m3", .. }
            ));
        }
    }

    #[test]
    fn test_bench_height_rejected() {
        let err = compute_powder_factor(&[reference_hole()], 2.7, 0.0).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InvalidParameter { name: "bench_height_m", value: 0.0 }
        );
    }

    #[test]
    fn test_parameters_checked_even_without_holes() {
        assert!(compute_powder_factor(&[], -1.0, 10.0).is_err());
        assert_eq!(compute_powder_factor(&[], 2.7, 10.0), Ok(None));
    }

    #[test]
    fn test_incomplete_holes_excluded() {
        let mut no_diameter = reference_hole();
        no_diameter.diameter_mm = None;
        let mut zero_column = reference_hole();
        zero_column.explosive_column_m = Some(0.0);
        let mut negative_burden = reference_hole();
        negative_burden.burden = Some(-3.5);

        let holes = vec![no_diameter, zero_column, negative_burden, reference_hole()];
        let params = PowderFactorParams::new(2.7, 10.0).unwrap();
        let b = powder_factor_breakdown(&holes, params);
        assert_eq!(b.holes_used, 1);
        assert_eq!(b.holes_excluded, 3);
        let single = hole_powder_factor(&reference_hole(), 10.0);
        assert_eq!(b.powder_factor_kg_m3, single);
    }

    #[test]
    fn test_non_finite_hole_ratio_excluded() {
        // Subnormal bench height drives the ratio to infinity
        assert_eq!(compute_powder_factor(&[reference_hole()], 2.7, 1e-320), Ok(None));

        let huge = HoleRecord::new("X")
            .with_burden(1e200)
            .with_spacing(1e200)
            .with_diameter_mm(115.0)
            .with_charge(1200.0, 8.0);
        let params = PowderFactorParams::new(2.7, 10.0).unwrap();
        let b = powder_factor_breakdown(&[huge, reference_hole()], params);
        assert_eq!(b.holes_used, 1);
        assert_eq!(b.holes_excluded, 1);
        assert_eq!(b.powder_factor_kg_m3, hole_powder_factor(&reference_hole(), 10.0));
    }

    #[test]
    fn test_no_qualifying_holes_is_none() {
        let holes = vec![HoleRecord::new("A").with_burden(3.0).with_spacing(3.0)];
        assert_eq!(compute_powder_factor(&holes, 2.7, 10.0), Ok(None));
    }

    #[test]
    fn test_specific_charge_uses_rock_density() {
        let params = PowderFactorParams::new(2.5, 10.0).unwrap();
        let b = powder_factor_breakdown(&[reference_hole()], params);
        let pf = b.powder_factor_kg_m3.unwrap();
        assert!((b.specific_charge_kg_t.unwrap() - pf / 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_bench_height_scales_inversely() {
        let holes = vec![reference_hole()];
        let pf10 = compute_powder_factor(&holes, 2.7, 10.0).unwrap().unwrap();
        let pf5 = compute_powder_factor(&holes, 2.7, 5.0).unwrap().unwrap();
        assert!((pf5 - 2.0 * pf10).abs() < 1e-12);
    }

    #[test]
    fn test_mean_of_ratios_differs_from_pooled() {
        let small = HoleRecord::new("S")
            .with_burden(2.0)
            .with_spacing(2.0)
            .with_diameter_mm(89.0)
            .with_charge(1100.0, 8.0);
        let large = HoleRecord::new("L")
            .with_burden(5.0)
            .with_spacing(6.0)
            .with_diameter_mm(165.0)
            .with_charge(1250.0, 10.0);
        let holes = vec![small.clone(), large.clone()];

        let mean = compute_powder_factor(&holes, 2.7, 10.0).unwrap().unwrap();
        let pooled = pooled_powder_factor(&holes, 10.0).unwrap().unwrap();

        let pf_small = hole_powder_factor(&small, 10.0).unwrap();
        let pf_large = hole_powder_factor(&large, 10.0).unwrap();
        assert!((mean - (pf_small + pf_large) / 2.0).abs() < 1e-12);
        assert!((mean - pooled).abs() > 0.1, "mean {mean} pooled {pooled}");
    }

    #[test]
    fn test_repeated_calls_identical() {
        let holes: Vec<HoleRecord> = (0..50)
            .map(|i| {
                let mut h = reference_hole();
                h.burden = Some(3.0 + f64::from(i) * 0.013);
                h
            })
            .collect();
        let a = compute_powder_factor(&holes, 2.7, 10.0).unwrap();
        let b = compute_powder_factor(&holes, 2.7, 10.0).unwrap();
        assert_eq!(a.map(f64::to_bits), b.map(f64::to_bits));
    }
}
