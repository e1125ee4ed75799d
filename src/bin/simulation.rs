//! Blast Hole Simulation
//!
//! Generates a synthetic as-drilled hole table from a rectangular drill plan
//! for testing blast-analysis. Simulates the usual field deviations:
//! - Collar position error (burden and spacing scatter)
//! - Depth error from over/under drilling
//! - Occasional unsurveyed holes (empty cells)
//! - Occasional uncharged holes (wet or blocked)
//!
//! # Usage
//! ```bash
//! ./blast-simulation --rows 6 --cols 10 --seed 42 > holes.csv
//! blast-analysis report holes.csv --format text
//! ```

use std::io::{self, BufWriter, Write};

use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};

use blast_analysis::config::defaults::{SIMULATION_COLLAR_SIGMA_M, SIMULATION_DEPTH_SIGMA_M};
use blast_analysis::plan::{DrillPlan, HoleTemplate};
use blast_analysis::types::{HoleField, HoleRecord};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "blast-simulation")]
#[command(about = "Synthetic blast hole data for blast-analysis testing")]
#[command(version = "1.0")]
struct Args {
    /// Rows in the pattern
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..=500))]
    rows: u32,

    /// Holes per row
    #[arg(long, default_value = "8", value_parser = clap::value_parser!(u32).range(1..=500))]
    cols: u32,

    /// Design burden (m)
    #[arg(long, default_value = "3.5")]
    burden: f64,

    /// Design spacing (m)
    #[arg(long, default_value = "4.0")]
    spacing: f64,

    /// Hole diameter (mm)
    #[arg(long, default_value = "115")]
    diameter: f64,

    /// Design hole depth (m)
    #[arg(long, default_value = "11")]
    depth: f64,

    /// Stemming length (m)
    #[arg(long, default_value = "3")]
    stemming: f64,

    /// Explosive density (kg/m³)
    #[arg(long, default_value = "1200")]
    explosive_density: f64,

    /// Collar position standard deviation (m)
    #[arg(long, default_value_t = SIMULATION_COLLAR_SIGMA_M)]
    collar_sigma: f64,

    /// Depth standard deviation (m)
    #[arg(long, default_value_t = SIMULATION_DEPTH_SIGMA_M)]
    depth_sigma: f64,

    /// Fraction of holes with no survey (empty burden/spacing)
    #[arg(long, default_value = "0.02")]
    unsurveyed: f64,

    /// Fraction of holes left uncharged
    #[arg(long, default_value = "0.02")]
    uncharged: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,
}

// ============================================================================
// Simulation
// ============================================================================

struct Deviation {
    rng: StdRng,
    collar: Normal<f64>,
    depth: Normal<f64>,
    unsurveyed: f64,
    uncharged: f64,
}

impl Deviation {
    fn new(args: &Args) -> Result<Self, rand_distr::NormalError> {
        let rng = match args.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            rng,
            collar: Normal::new(0.0, args.collar_sigma)?,
            depth: Normal::new(0.0, args.depth_sigma)?,
            unsurveyed: args.unsurveyed.clamp(0.0, 1.0),
            uncharged: args.uncharged.clamp(0.0, 1.0),
        })
    }

    /// Perturb a design hole into an as-drilled one.
    fn drill(&mut self, mut hole: HoleRecord) -> HoleRecord {
        if self.rng.gen_bool(self.unsurveyed) {
            hole.burden = None;
            hole.spacing = None;
        } else {
            hole.burden = hole.burden.map(|b| (b + self.collar.sample(&mut self.rng)).max(0.1));
            hole.spacing = hole.spacing.map(|s| (s + self.collar.sample(&mut self.rng)).max(0.1));
        }

        let depth_error = self.depth.sample(&mut self.rng);
        hole.hole_depth_m = hole.hole_depth_m.map(|d| (d + depth_error).max(0.5));

        // Charge fills whatever stemming leaves
        match (hole.hole_depth_m, hole.stemming_m) {
            (Some(depth), Some(stemming)) if !self.rng.gen_bool(self.uncharged) => {
                hole.explosive_column_m = Some((depth - stemming).max(0.0));
            }
            _ => {
                hole.explosive_column_m = None;
                hole.explosive_density_kg_m3 = None;
            }
        }
        hole
    }
}

fn write_csv(out: &mut impl Write, holes: &[HoleRecord]) -> io::Result<()> {
    let header: Vec<&str> = std::iter::once("hole_id")
        .chain(HoleField::ALL.into_iter().map(HoleField::column_name))
        .collect();
    writeln!(out, "{}", header.join(","))?;

    for hole in holes {
        let cells: Vec<String> = std::iter::once(hole.hole_id.clone())
            .chain(
                HoleField::ALL
                    .into_iter()
                    .map(|f| hole.field(f).map(|v| format!("{v:.3}")).unwrap_or_default()),
            )
            .collect();
        writeln!(out, "{}", cells.join(","))?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let plan = DrillPlan::new("simulated", args.burden, args.spacing, args.rows, args.cols);
    let template = HoleTemplate {
        diameter_mm: args.diameter,
        hole_depth_m: args.depth,
        stemming_m: args.stemming,
        explosive_density_kg_m3: args.explosive_density,
        explosive_column_m: (args.depth - args.stemming).max(0.0),
    };

    let mut deviation = Deviation::new(&args)?;
    let holes: Vec<HoleRecord> = plan
        .design_holes(&template)?
        .into_iter()
        .map(|h| deviation.drill(h))
        .collect();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_csv(&mut out, &holes)?;
    out.flush()?;

    if let Some(seed) = args.seed {
        eprintln!("Generated {} holes (seed {seed})", holes.len());
    } else {
        eprintln!("Generated {} holes", holes.len());
    }
    Ok(())
}
