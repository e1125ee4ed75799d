//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use super::defaults::{BENCH_HEIGHT_TYPICAL_RANGE_M, ROCK_DENSITY_RANGE_T_M3};

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for AnalysisConfig.
///
/// Any new field added to AnalysisConfig must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [site]
        "site",
        "site.name",
        "site.mine",
        // [parameters]
        "parameters",
        "parameters.rock_density_t_m3",
        "parameters.bench_height_m",
        // [insights]
        "insights",
        "insights.burden_spacing_ratio_min",
        "insights.burden_spacing_ratio_max",
        "insights.powder_factor_min_kg_m3",
        "insights.powder_factor_max_kg_m3",
        "insights.burden_variation_max_percent",
        // [ingest]
        "ingest",
        "ingest.require_csv_extension",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties resolve to the lexicographically smallest key so the suggestion is stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new(); // parse errors are reported by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Validate physical ranges on a parsed AnalysisConfig.
///
/// Returns (errors, warnings). Errors are impossible values that must
/// prevent startup; warnings are suspicious but not fatal.
pub fn validate_physical_ranges(
    config: &super::AnalysisConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let p = &config.parameters;

    if !p.rock_density_t_m3.is_finite() || p.rock_density_t_m3 <= 0.0 {
        errors.push(format!(
            "parameters.rock_density_t_m3 = {} must be a finite value > 0",
            p.rock_density_t_m3
        ));
    } else if p.rock_density_t_m3 < ROCK_DENSITY_RANGE_T_M3.0
        || p.rock_density_t_m3 > ROCK_DENSITY_RANGE_T_M3.1
    {
        warnings.push(ValidationWarning {
            field: "parameters.rock_density_t_m3".to_string(),
            message: format!(
                "rock_density_t_m3 = {:.2} is outside typical range ({}-{} t/m³)",
                p.rock_density_t_m3, ROCK_DENSITY_RANGE_T_M3.0, ROCK_DENSITY_RANGE_T_M3.1
            ),
            suggestion: None,
        });
    }

    if !p.bench_height_m.is_finite() || p.bench_height_m <= 0.0 {
        errors.push(format!(
            "parameters.bench_height_m = {} must be a finite value > 0",
            p.bench_height_m
        ));
    } else if p.bench_height_m < BENCH_HEIGHT_TYPICAL_RANGE_M.0
        || p.bench_height_m > BENCH_HEIGHT_TYPICAL_RANGE_M.1
    {
        warnings.push(ValidationWarning {
            field: "parameters.bench_height_m".to_string(),
            message: format!(
                "bench_height_m = {:.1} is outside typical range ({}-{} m)",
                p.bench_height_m, BENCH_HEIGHT_TYPICAL_RANGE_M.0, BENCH_HEIGHT_TYPICAL_RANGE_M.1
            ),
            suggestion: None,
        });
    }

    let i = &config.insights;
    if i.powder_factor_min_kg_m3 < 0.0 {
        errors.push(format!(
            "insights.powder_factor_min_kg_m3 = {:.3} cannot be negative",
            i.powder_factor_min_kg_m3
        ));
    }
    if i.burden_spacing_ratio_min <= 0.0 {
        errors.push(format!(
            "insights.burden_spacing_ratio_min = {:.3} must be > 0",
            i.burden_spacing_ratio_min
        ));
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
