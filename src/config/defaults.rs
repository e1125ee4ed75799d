//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Rock & Geometry
// ============================================================================

/// In-situ rock density used when the caller supplies none (t/m³).
///
/// 2.7 t/m³ is typical of granite and competent hard rock.
pub const ROCK_DENSITY_T_M3: f64 = 2.7;

/// Bench height used when the caller supplies none (m).
pub const BENCH_HEIGHT_M: f64 = 10.0;

/// Physically plausible rock density range (t/m³), from coal to massive sulphide.
pub const ROCK_DENSITY_RANGE_T_M3: (f64, f64) = (1.2, 5.0);

/// Bench heights outside this range (m) are unusual for open-pit benches.
pub const BENCH_HEIGHT_TYPICAL_RANGE_M: (f64, f64) = (2.0, 30.0);

// ============================================================================
// Ingest
// ============================================================================

/// Header names accepted for the hole identifier, in priority order.
pub const HOLE_ID_COLUMNS: [&str; 3] = ["hole_id", "Hole", "id"];

// ============================================================================
// Simulation
// ============================================================================

/// Standard deviation of as-drilled collar position error (m).
pub const SIMULATION_COLLAR_SIGMA_M: f64 = 0.15;

/// Standard deviation of as-drilled depth error (m).
pub const SIMULATION_DEPTH_SIGMA_M: f64 = 0.2;
