//! Shared data structures for blast analysis
//!
//! - Hole records and data-quality flags (ingestion output)
//! - Blast snapshots
//! - Field summaries, powder factor breakdown and blast reports
//! - Advisory verdicts

mod hole;
mod blast;
mod analysis;
mod insights;

pub use hole::*;
pub use blast::*;
pub use analysis::*;
pub use insights::*;
