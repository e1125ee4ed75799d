//! Hole CSV parser
//!
//! Drill-and-blast contractors export hole tables from several tools, so the
//! parser maps columns by header name and tolerates:
//! - a UTF-8 BOM on the header line
//! - quoted fields with embedded commas and `""` escapes
//! - columns in any order, plus extra columns (ignored)
//! - empty or unparseable numbers (stored as "not measured")
//!
//! A row is never rejected for bad numbers; quality flags are raised later
//! during analysis.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use super::IngestError;
use crate::config::defaults::HOLE_ID_COLUMNS;
use crate::types::{Blast, HoleField, HoleRecord};

/// Split a CSV line on commas, respecting double-quoted fields.
fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Column positions resolved from the header line.
#[derive(Debug, Default)]
struct HoleColumns {
    /// Candidate id columns in priority order
    id: Vec<usize>,
    fields: Vec<(HoleField, usize)>,
}

impl HoleColumns {
    fn from_header(header: &str) -> Self {
        let names: Vec<String> = csv_split(header.trim_start_matches('\u{feff}'))
            .into_iter()
            .map(|n| n.trim().to_string())
            .collect();
        let position = |wanted: &str| names.iter().position(|n| n == wanted);

        let id = HOLE_ID_COLUMNS.iter().filter_map(|&c| position(c)).collect();
        let fields = HoleField::ALL
            .into_iter()
            .filter_map(|f| position(f.column_name()).map(|i| (f, i)))
            .collect();

        Self { id, fields }
    }

    fn is_empty(&self) -> bool {
        self.id.is_empty() && self.fields.is_empty()
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        HoleField::ALL
            .into_iter()
            .filter(|f| !self.fields.iter().any(|(g, _)| g == f))
            .map(HoleField::column_name)
            .collect()
    }

    fn parse_row(&self, line: &str) -> HoleRecord {
        let cells = csv_split(line);
        let cell = |i: usize| cells.get(i).map(|s| s.trim()).filter(|s| !s.is_empty());

        // First non-empty id column wins
        let hole_id = self
            .id
            .iter()
            .find_map(|&i| cell(i))
            .unwrap_or_default()
            .to_string();

        let mut hole = HoleRecord::new(hole_id);
        for &(field, i) in &self.fields {
            let value = cell(i).and_then(|s| s.parse::<f64>().ok());
            set_field(&mut hole, field, value);
        }
        hole
    }
}

fn set_field(hole: &mut HoleRecord, field: HoleField, value: Option<f64>) {
    let slot = match field {
        HoleField::Burden => &mut hole.burden,
        HoleField::Spacing => &mut hole.spacing,
        HoleField::DiameterMm => &mut hole.diameter_mm,
        HoleField::HoleDepthM => &mut hole.hole_depth_m,
        HoleField::StemmingM => &mut hole.stemming_m,
        HoleField::ExplosiveDensityKgM3 => &mut hole.explosive_density_kg_m3,
        HoleField::ExplosiveColumnM => &mut hole.explosive_column_m,
    };
    *slot = value;
}

/// Parse hole records from CSV text with a header row.
///
/// Fails only when there is no header or the header names none of the known
/// columns.
pub fn parse_holes_csv(text: &str) -> Result<Vec<HoleRecord>, IngestError> {
    let mut lines = text.lines();
    let header = lines.next().ok_or(IngestError::EmptyInput)?;

    let columns = HoleColumns::from_header(header);
    if columns.is_empty() {
        return Err(IngestError::NoKnownColumns(header.trim().to_string()));
    }

    let missing = columns.missing_fields();
    if !missing.is_empty() {
        debug!(missing = ?missing, "Hole CSV lacks some columns");
    }

    let holes: Vec<HoleRecord> = lines
        .filter(|l| !l.trim().is_empty())
        .map(|l| columns.parse_row(l))
        .collect();

    let unnamed = holes.iter().filter(|h| h.hole_id.is_empty()).count();
    if unnamed > 0 {
        warn!(unnamed, "Holes without an id");
    }

    Ok(holes)
}

/// Load a blast from a CSV file.
///
/// `require_csv_extension` comes from `[ingest]` in the configuration.
pub fn load_blast_csv(
    path: impl AsRef<Path>,
    name: impl Into<String>,
    description: Option<String>,
    bench: Option<String>,
    require_csv_extension: bool,
) -> Result<Blast, IngestError> {
    let path = path.as_ref();

    if require_csv_extension && !has_csv_extension(path) {
        return Err(IngestError::NotCsv(path.to_path_buf()));
    }

    let text = fs::read_to_string(path).map_err(|e| IngestError::Io(path.to_path_buf(), e))?;
    let holes = parse_holes_csv(&text)?;

    let blast = Blast {
        name: name.into(),
        description,
        bench,
        holes,
    };

    info!(
        file = %path.display(),
        blast = %blast.name,
        holes = blast.hole_count(),
        "Blast CSV loaded"
    );

    Ok(blast)
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}
