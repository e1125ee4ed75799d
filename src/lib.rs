//! Blast Analysis: drill-and-blast summary statistics and powder factor
//!
//! Deterministic analysis of open-pit blast hole data.
//!
//! ## Architecture
//!
//! - **Ingest**: CSV hole tables and in-memory hole sources
//! - **Analysis**: field summaries, powder factor, advisory insights
//! - **Plan**: rectangular drill patterns and their GeoJSON grids
//! - **Config**: site defaults and insight thresholds from TOML

pub mod analysis;
pub mod config;
pub mod ingest;
pub mod plan;
pub mod types;

// Re-export configuration
pub use config::{AnalysisConfig, InsightThresholds};

// Re-export commonly used types
pub use types::{
    Blast, BlastReport, BlastSummary, FieldSummary, FlaggedHole, HoleField, HoleFlag,
    HoleRecord, Insights, PowderFactorBreakdown, PowderFactorParams, Verdict,
};

// Re-export analysis operations
pub use analysis::{
    analyze_blast, analyze_blasts, classify_insights, compute_powder_factor, compute_summary,
    AnalysisError, RecomputeCoordinator,
};

// Re-export ingestion
pub use ingest::{
    load_blast_csv, load_blast_json, parse_holes_csv, BlastStore, HoleSource, IngestError,
};

pub use plan::{DrillPlan, HoleTemplate, PlanError};
