//! Analysis Configuration - default rock parameters and advisory thresholds
//!
//! Every advisory band and query-time default is a field in this module.
//! Each struct implements `Default` with the standard values, so behaviour is
//! unchanged when no config file is present.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;

/// Environment variable pointing at a TOML config file.
pub const CONFIG_ENV_VAR: &str = "BLAST_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "blast_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a site deployment.
///
/// Load with `AnalysisConfig::load()` which searches:
/// 1. `$BLAST_CONFIG` env var
/// 2. `./blast_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Site identification
    #[serde(default)]
    pub site: SiteInfo,

    /// Query-time defaults for powder factor analysis
    #[serde(default)]
    pub parameters: ParameterConfig,

    /// Advisory classification bands
    #[serde(default)]
    pub insights: InsightThresholds,

    /// CSV ingestion behaviour
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl AnalysisConfig {
    /// Load configuration using the standard search order:
    /// 1. `$BLAST_CONFIG` environment variable
    /// 2. `./blast_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), site = %config.site.name, "Loaded analysis config from BLAST_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from BLAST_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "BLAST_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(site = %config.site.name, "Loaded analysis config from ./blast_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./blast_config.toml, using defaults");
                }
            }
        }

        info!("No blast_config.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings and never fail the load.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Dotted key paths explicitly present in a TOML document.
    pub fn explicit_keys(contents: &str) -> HashSet<String> {
        contents
            .parse::<toml::Value>()
            .map(|v| super::validation::walk_toml_keys(&v, "").into_iter().collect())
            .unwrap_or_default()
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Analysis config saved");
        Ok(())
    }

    /// Validate all bands for internal consistency and physical range.
    ///
    /// Rules:
    /// - Every numeric value must be finite
    /// - Band lower bounds must be below upper bounds
    /// - Default density and bench height must be positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        let i = &self.insights;
        let mut errors: Vec<String> = Vec::new();

        Self::check_band(
            i.burden_spacing_ratio_min,
            i.burden_spacing_ratio_max,
            "insights.burden_spacing_ratio",
            &mut errors,
        );
        Self::check_band(
            i.powder_factor_min_kg_m3,
            i.powder_factor_max_kg_m3,
            "insights.powder_factor",
            &mut errors,
        );
        if !i.burden_variation_max_percent.is_finite() || i.burden_variation_max_percent <= 0.0 {
            errors.push(format!(
                "insights.burden_variation_max_percent must be finite and > 0 (got {})",
                i.burden_variation_max_percent
            ));
        }

        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_band(min: f64, max: f64, name: &str, errors: &mut Vec<String>) {
        // NaN comparisons silently pass, so catch them first
        if !min.is_finite() || !max.is_finite() {
            errors.push(format!("{name}: values must be finite (got min={min}, max={max})"));
            return;
        }
        if min >= max {
            errors.push(format!("{name}: min ({min:.3}) must be < max ({max:.3})"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Site Info
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteInfo {
    /// Site or pit name, used in report headers
    #[serde(default = "default_site_name")]
    pub name: String,

    /// Owning mine / operation
    #[serde(default)]
    pub mine: String,
}

fn default_site_name() -> String { "Unnamed Site".to_string() }

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            mine: String::new(),
        }
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Defaults used when a caller does not supply rock parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterConfig {
    /// In-situ rock density (t/m³)
    #[serde(default = "default_rock_density")]
    pub rock_density_t_m3: f64,

    /// Bench height (m)
    #[serde(default = "default_bench_height")]
    pub bench_height_m: f64,
}

fn default_rock_density() -> f64 { defaults::ROCK_DENSITY_T_M3 }
fn default_bench_height() -> f64 { defaults::BENCH_HEIGHT_M }

impl Default for ParameterConfig {
    fn default() -> Self {
        Self {
            rock_density_t_m3: default_rock_density(),
            bench_height_m: default_bench_height(),
        }
    }
}

// ============================================================================
// Insight Thresholds
// ============================================================================

/// Advisory bands for the insight classifiers.
///
/// The burden/spacing band is inclusive, the powder factor band exclusive,
/// and burden variation must be strictly below its limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InsightThresholds {
    #[serde(default = "default_ratio_min")]
    pub burden_spacing_ratio_min: f64,

    #[serde(default = "default_ratio_max")]
    pub burden_spacing_ratio_max: f64,

    /// Powder factor lower bound (kg/m³)
    #[serde(default = "default_pf_min")]
    pub powder_factor_min_kg_m3: f64,

    /// Powder factor upper bound (kg/m³)
    #[serde(default = "default_pf_max")]
    pub powder_factor_max_kg_m3: f64,

    /// Burden `(max - min) / avg` limit (%)
    #[serde(default = "default_variation_max")]
    pub burden_variation_max_percent: f64,
}

fn default_ratio_min() -> f64 { 0.8 }
fn default_ratio_max() -> f64 { 1.2 }
fn default_pf_min() -> f64 { 0.3 }
fn default_pf_max() -> f64 { 0.8 }
fn default_variation_max() -> f64 { 20.0 }

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            burden_spacing_ratio_min: default_ratio_min(),
            burden_spacing_ratio_max: default_ratio_max(),
            powder_factor_min_kg_m3: default_pf_min(),
            powder_factor_max_kg_m3: default_pf_max(),
            burden_variation_max_percent: default_variation_max(),
        }
    }
}

// ============================================================================
// Ingest
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Reject files whose name does not end in `.csv`
    #[serde(default = "default_require_csv_extension")]
    pub require_csv_extension: bool,
}

fn default_require_csv_extension() -> bool { true }

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            require_csv_extension: default_require_csv_extension(),
        }
    }
}
