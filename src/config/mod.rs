//! Analysis Configuration Module
//!
//! Provides site configuration loaded from TOML files: query-time rock
//! parameter defaults and the advisory bands used by the insight classifiers.
//!
//! ## Loading Order
//!
//! 1. `BLAST_CONFIG` environment variable (path to TOML file)
//! 2. `blast_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! config::init(AnalysisConfig::load());
//! let bench = config::get().parameters.bench_height_m;
//! ```

mod analysis_config;
pub mod defaults;
pub mod validation;

pub use analysis_config::*;

use std::sync::OnceLock;

/// Global analysis configuration, initialized once at startup.
static ANALYSIS_CONFIG: OnceLock<AnalysisConfig> = OnceLock::new();

/// Initialize the global analysis configuration.
///
/// Later calls are ignored with a warning.
pub fn init(config: AnalysisConfig) {
    if ANALYSIS_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global analysis configuration.
///
/// Falls back to built-in defaults when `init()` has not been called, so
/// library users that never touch configuration still get the standard bands.
pub fn get() -> &'static AnalysisConfig {
    if !is_initialized() {
        tracing::debug!("config::get() before init(), using defaults");
    }
    ANALYSIS_CONFIG.get_or_init(AnalysisConfig::default)
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    ANALYSIS_CONFIG.get().is_some()
}
