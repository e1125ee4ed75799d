//! Drill plans
//!
//! A drill plan is a rectangular pattern: `rows` rows spaced one burden apart
//! and `cols` holes per row spaced one spacing apart, anchored at an origin.
//! Row 0 is the row nearest the free face.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::types::{Blast, HoleRecord};

/// Errors in a drill plan definition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("{name} must be a finite value > 0, got {value}")]
    InvalidDimension { name: &'static str, value: f64 },

    #[error("Plan must have at least one row and one column ({rows} x {cols})")]
    EmptyGrid { rows: u32, cols: u32 },

    #[error("Origin must be finite")]
    InvalidOrigin,
}

/// Rectangular drill pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillPlan {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub bench: Option<String>,
    /// Row-to-row distance (m)
    pub burden: f64,
    /// Hole-to-hole distance along a row (m)
    pub spacing: f64,
    pub rows: u32,
    pub cols: u32,
    #[serde(default)]
    pub origin_x: f64,
    #[serde(default)]
    pub origin_y: f64,
}

/// One hole position in a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedHole {
    /// `H{row+1}-{col+1}`
    pub name: String,
    pub row: u32,
    pub col: u32,
    pub x: f64,
    pub y: f64,
}

/// Design values applied to every hole when turning a plan into records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoleTemplate {
    pub diameter_mm: f64,
    pub hole_depth_m: f64,
    pub stemming_m: f64,
    pub explosive_density_kg_m3: f64,
    pub explosive_column_m: f64,
}

impl DrillPlan {
    pub fn new(name: impl Into<String>, burden: f64, spacing: f64, rows: u32, cols: u32) -> Self {
        Self {
            name: name.into(),
            description: None,
            bench: None,
            burden,
            spacing,
            rows,
            cols,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }

    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    pub fn with_bench(mut self, bench: impl Into<String>) -> Self {
        self.bench = Some(bench.into());
        self
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        for (name, value) in [("burden", self.burden), ("spacing", self.spacing)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PlanError::InvalidDimension { name, value });
            }
        }
        if self.rows == 0 || self.cols == 0 {
            return Err(PlanError::EmptyGrid { rows: self.rows, cols: self.cols });
        }
        if !(self.origin_x.is_finite() && self.origin_y.is_finite()) {
            return Err(PlanError::InvalidOrigin);
        }
        Ok(())
    }

    pub fn hole_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Hole positions in row-major order.
    pub fn planned_holes(&self) -> Result<Vec<PlannedHole>, PlanError> {
        self.validate()?;
        let mut holes = Vec::with_capacity(self.hole_count());
        for row in 0..self.rows {
            for col in 0..self.cols {
                holes.push(PlannedHole {
                    name: format!("H{}-{}", row + 1, col + 1),
                    row,
                    col,
                    x: self.origin_x + f64::from(col) * self.spacing,
                    y: self.origin_y + f64::from(row) * self.burden,
                });
            }
        }
        Ok(holes)
    }

    /// The plan as a GeoJSON `FeatureCollection` of `Point` features.
    pub fn grid_geojson(&self) -> Result<Value, PlanError> {
        let features: Vec<Value> = self
            .planned_holes()?
            .into_iter()
            .map(|h| {
                json!({
                    "type": "Feature",
                    "properties": { "row": h.row, "col": h.col, "name": h.name },
                    "geometry": { "type": "Point", "coordinates": [h.x, h.y] },
                })
            })
            .collect();

        Ok(json!({ "type": "FeatureCollection", "features": features }))
    }

    /// Design-stage hole records, ready for analysis before drilling.
    pub fn design_holes(&self, template: &HoleTemplate) -> Result<Vec<HoleRecord>, PlanError> {
        Ok(self
            .planned_holes()?
            .into_iter()
            .map(|h| {
                HoleRecord::new(h.name)
                    .with_burden(self.burden)
                    .with_spacing(self.spacing)
                    .with_diameter_mm(template.diameter_mm)
                    .with_depth_m(template.hole_depth_m)
                    .with_stemming_m(template.stemming_m)
                    .with_charge(template.explosive_density_kg_m3, template.explosive_column_m)
            })
            .collect())
    }

    /// Design-stage blast carrying the plan's name, description and bench.
    pub fn design_blast(&self, template: &HoleTemplate) -> Result<Blast, PlanError> {
        Ok(Blast {
            name: self.name.clone(),
            description: self.description.clone(),
            bench: self.bench.clone(),
            holes: self.design_holes(template)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::compute_powder_factor;

    fn template() -> HoleTemplate {
        HoleTemplate {
            diameter_mm: 115.0,
            hole_depth_m: 11.0,
            stemming_m: 3.0,
            explosive_density_kg_m3: 1200.0,
            explosive_column_m: 8.0,
        }
    }

    #[test]
    fn test_grid_positions() {
        let plan = DrillPlan::new("P1", 3.0, 4.0, 2, 3).with_origin(100.0, 200.0);
        let holes = plan.planned_holes().unwrap();
        assert_eq!(holes.len(), 6);
        assert_eq!(holes[0].name, "H1-1");
        assert_eq!((holes[0].x, holes[0].y), (100.0, 200.0));
        let last = &holes[5];
        assert_eq!(last.name, "H2-3");
        assert_eq!((last.x, last.y), (108.0, 203.0));
    }

    #[test]
    fn test_geojson_shape() {
        let plan = DrillPlan::new("P1", 3.0, 4.0, 1, 2);
        let gj = plan.grid_geojson().unwrap();
        assert_eq!(gj["type"], "FeatureCollection");
        let features = gj["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[1]["properties"]["name"], "H1-2");
        assert_eq!(features[1]["properties"]["col"], 1);
        assert_eq!(features[1]["geometry"]["type"], "Point");
        assert_eq!(features[1]["geometry"]["coordinates"][0], 4.0);
    }

    #[test]
    fn test_invalid_plans() {
        assert_eq!(
            DrillPlan::new("P", 0.0, 4.0, 1, 1).validate(),
            Err(PlanError::InvalidDimension { name: "burden", value: 0.0 })
        );
        assert!(matches!(
            DrillPlan::new("P", 3.0, f64::NAN, 1, 1).validate(),
            Err(PlanError::InvalidDimension { name: "spacing", .. })
        ));
        assert_eq!(
            DrillPlan::new("P", 3.0, 4.0, 0, 5).planned_holes(),
            Err(PlanError::EmptyGrid { rows: 0, cols: 5 })
        );
        assert_eq!(
            DrillPlan::new("P", 3.0, 4.0, 1, 1).with_origin(f64::INFINITY, 0.0).validate(),
            Err(PlanError::InvalidOrigin)
        );
    }

    #[test]
    fn test_design_holes_analyzable() {
        let plan = DrillPlan::new("P1", 3.5, 4.0, 3, 4);
        let holes = plan.design_holes(&template()).unwrap();
        assert_eq!(holes.len(), 12);
        let pf = compute_powder_factor(&holes, 2.7, 10.0).unwrap().unwrap();
        assert!((pf - 0.712).abs() < 0.001, "pf {pf}");
    }

    #[test]
    fn test_design_blast_carries_metadata() {
        let blast = DrillPlan::new("P1", 3.5, 4.0, 1, 1)
            .with_bench("RL 1240")
            .design_blast(&template())
            .unwrap();
        assert_eq!(blast.name, "P1");
        assert_eq!(blast.bench.as_deref(), Some("RL 1240"));
        assert!(blast.quality_report().is_empty());
    }

    #[test]
    fn test_plan_from_json_defaults_origin() {
        let plan: DrillPlan =
            serde_json::from_str(r#"{"name":"P","burden":3,"spacing":4,"rows":2,"cols":2}"#)
                .unwrap();
        assert_eq!((plan.origin_x, plan.origin_y), (0.0, 0.0));
        assert_eq!(plan.hole_count(), 4);
    }
}
