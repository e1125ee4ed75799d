//! Blast: a named, bench-labelled collection of hole records

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{HoleFlag, HoleRecord};

/// One blast as loaded for analysis.
///
/// The analysis engine only ever borrows a blast; holes are kept in the
/// order they were loaded so averages are summed in a reproducible order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blast {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub bench: Option<String>,
    #[serde(default)]
    pub holes: Vec<HoleRecord>,
}

impl Blast {
    pub fn new(name: impl Into<String>, holes: Vec<HoleRecord>) -> Self {
        Self {
            name: name.into(),
            description: None,
            bench: None,
            holes,
        }
    }

    pub fn with_bench(mut self, bench: impl Into<String>) -> Self {
        self.bench = Some(bench.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parse a blast document (`name`, `description`, `bench`, `holes`).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn hole_count(&self) -> usize {
        self.holes.len()
    }

    /// Collect per-hole data-quality flags, including duplicate hole ids.
    ///
    /// Only holes with at least one flag are returned, in load order.
    pub fn quality_report(&self) -> Vec<FlaggedHole> {
        let mut id_counts: HashMap<&str, usize> = HashMap::new();
        for hole in &self.holes {
            *id_counts.entry(hole.hole_id.as_str()).or_default() += 1;
        }

        self.holes
            .iter()
            .filter_map(|hole| {
                let mut flags = hole.quality_flags();
                if id_counts.get(hole.hole_id.as_str()).copied().unwrap_or(0) > 1 {
                    flags.push(HoleFlag::DuplicateId);
                }
                (!flags.is_empty()).then(|| FlaggedHole {
                    hole_id: hole.hole_id.clone(),
                    flags,
                })
            })
            .collect()
    }
}

/// A hole together with the quality flags raised against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedHole {
    pub hole_id: String,
    pub flags: Vec<HoleFlag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_with_partial_holes() {
        let json = r#"{
            "name": "Pit 3 / RL 1240",
            "bench": "Bench A",
            "holes": [
                {"hole_id": "A1", "burden": 3.5, "spacing": 4.0},
                {"hole_id": "A2", "spacing": 4.1, "diameter_mm": 115}
            ]
        }"#;
        let blast = Blast::from_json(json).unwrap();
        assert_eq!(blast.name, "Pit 3 / RL 1240");
        assert_eq!(blast.bench.as_deref(), Some("Bench A"));
        assert_eq!(blast.description, None);
        assert_eq!(blast.hole_count(), 2);
        assert_eq!(blast.holes[1].burden, None);
        assert_eq!(blast.holes[1].diameter_mm, Some(115.0));
    }

    #[test]
    fn test_quality_report_flags_duplicates() {
        let blast = Blast::new(
            "dup",
            vec![
                HoleRecord::new("A1").with_burden(3.0),
                HoleRecord::new("A2").with_burden(3.0),
                HoleRecord::new("A1").with_burden(3.1),
            ],
        );
        let report = blast.quality_report();
        assert_eq!(report.len(), 2);
        assert!(report.iter().all(|h| h.hole_id == "A1"));
        assert!(report.iter().all(|h| h.flags.contains(&HoleFlag::DuplicateId)));
    }

    #[test]
    fn test_quality_report_empty_for_clean_blast() {
        let blast = Blast::new("clean", vec![HoleRecord::new("A1").with_burden(3.0)]);
        assert!(blast.quality_report().is_empty());
    }
}
