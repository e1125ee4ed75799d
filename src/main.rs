//! blast-analysis - drill-and-blast summary statistics and powder factor
//!
//! # Usage
//!
//! ```bash
//! # Burden/spacing summary of an uploaded hole table
//! blast-analysis summary holes.csv
//!
//! # Powder factor with site-specific rock parameters
//! blast-analysis powder-factor holes.csv --rock-density 2.6 --bench-height 12
//!
//! # Full report, human readable
//! blast-analysis report holes.csv --name "Pit 3 B-101" --format text
//!
//! # Plan a 5 x 8 pattern and print its GeoJSON grid
//! blast-analysis plan --name P1 --rows 5 --cols 8 --burden 3.5 --spacing 4.0
//! ```
//!
//! # Environment Variables
//!
//! - `BLAST_CONFIG`: Path to a TOML config file
//! - `RUST_LOG`: Logging level (default: info)
//!
//! Pass `--log-json` for JSON log lines.
//!
//! Results go to stdout; logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::warn;

use blast_analysis::analysis::{analyze_blast, analyze_blasts, summarize_from_source};
use blast_analysis::analysis::powder_factor::{loading_density_kg_m, powder_factor_breakdown};
use blast_analysis::config::{self, validation, AnalysisConfig};
use blast_analysis::ingest::{load_blast_csv, load_blast_json};
use blast_analysis::plan::{DrillPlan, HoleTemplate};
use blast_analysis::types::{Blast, BlastReport, PowderFactorParams};

#[derive(Parser, Debug)]
#[command(name = "blast-analysis")]
#[command(about = "Blast hole summary statistics and powder factor analysis")]
#[command(version)]
struct CliArgs {
    /// Config file (overrides BLAST_CONFIG and ./blast_config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

/// Rock parameters; unset values come from `[parameters]` in the config.
#[derive(clap::Args, Debug)]
struct RockArgs {
    /// Rock density (t/m³)
    #[arg(long)]
    rock_density: Option<f64>,

    /// Bench height (m)
    #[arg(long)]
    bench_height: Option<f64>,
}

/// Blast identification for a hole table.
#[derive(clap::Args, Debug)]
struct BlastArgs {
    /// Hole table (.csv) or blast document (.json)
    input: PathBuf,

    /// Blast name (default: file stem)
    #[arg(long)]
    name: Option<String>,

    /// Bench label
    #[arg(long)]
    bench: Option<String>,

    /// Free-text description
    #[arg(long)]
    description: Option<String>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default)]
enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Burden and spacing min/max/avg
    Summary {
        #[command(flatten)]
        blast: BlastArgs,
    },

    /// Mean per-hole powder factor (kg/m³)
    PowderFactor {
        #[command(flatten)]
        blast: BlastArgs,
        #[command(flatten)]
        rock: RockArgs,
    },

    /// Summary, powder factor, insights and data-quality flags
    Report {
        #[command(flatten)]
        blast: BlastArgs,
        #[command(flatten)]
        rock: RockArgs,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Reports for several blasts, analyzed in parallel
    Batch {
        /// Hole tables or blast documents
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[command(flatten)]
        rock: RockArgs,
    },

    /// Rectangular drill pattern as GeoJSON
    Plan {
        #[arg(long, default_value = "plan")]
        name: String,
        #[arg(long)]
        bench: Option<String>,
        #[arg(long)]
        rows: u32,
        #[arg(long)]
        cols: u32,
        /// Row-to-row distance (m)
        #[arg(long)]
        burden: f64,
        /// Hole-to-hole distance (m)
        #[arg(long)]
        spacing: f64,
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        origin_x: f64,
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        origin_y: f64,
        /// Also report the design powder factor for this charge:
        /// diameter_mm,depth_m,stemming_m,density_kg_m3,column_m
        #[arg(long, value_name = "D,DEPTH,STEM,RHO,COL", value_parser = parse_template)]
        template: Option<HoleTemplate>,
        #[command(flatten)]
        rock: RockArgs,
    },

    /// Validate a TOML config file and list unknown keys
    CheckConfig {
        path: PathBuf,
    },
}

fn parse_template(s: &str) -> Result<HoleTemplate, String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("{v:?}: {e}")))
        .collect::<Result<_, _>>()?;
    match values[..] {
        [diameter_mm, hole_depth_m, stemming_m, explosive_density_kg_m3, explosive_column_m] => {
            Ok(HoleTemplate {
                diameter_mm,
                hole_depth_m,
                stemming_m,
                explosive_density_kg_m3,
                explosive_column_m,
            })
        }
        _ => Err(format!("expected 5 comma-separated values, got {}", values.len())),
    }
}

impl RockArgs {
    fn resolve(&self) -> Result<PowderFactorParams> {
        let defaults = &config::get().parameters;
        let params = PowderFactorParams::new(
            self.rock_density.unwrap_or(defaults.rock_density_t_m3),
            self.bench_height.unwrap_or(defaults.bench_height_m),
        )?;
        Ok(params)
    }
}

impl BlastArgs {
    fn load(&self) -> Result<Blast> {
        let mut blast = load_blast(&self.input)?;
        if let Some(name) = &self.name {
            blast.name.clone_from(name);
        }
        if self.bench.is_some() {
            blast.bench.clone_from(&self.bench);
        }
        if self.description.is_some() {
            blast.description.clone_from(&self.description);
        }
        Ok(blast)
    }
}

/// Load a blast from a `.json` document or a hole table.
fn load_blast(path: &Path) -> Result<Blast> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        return Ok(load_blast_json(path)?);
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("blast")
        .to_string();
    let blast = load_blast_csv(
        path,
        name,
        None,
        None,
        config::get().ingest.require_csv_extension,
    )?;
    Ok(blast)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn fmt_opt(v: Option<f64>, precision: usize) -> String {
    v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.precision$}"))
}

fn print_report_text(report: &BlastReport) {
    let site = &config::get().site;
    println!("Blast:  {}", report.blast_name);
    if let Some(bench) = &report.bench {
        println!("Bench:  {bench}");
    }
    println!("Site:   {}", site.name);
    println!("Holes:  {}", report.summary.holes);
    println!();

    for (label, summary) in [("Burden", &report.summary.burden), ("Spacing", &report.summary.spacing)] {
        match summary {
            Some(s) => println!(
                "{label:<8} min {:.2} m  max {:.2} m  avg {:.2} m  ({} holes)",
                s.min, s.max, s.avg, s.count
            ),
            None => println!("{label:<8} no data"),
        }
    }

    let pf = &report.powder_factor;
    println!(
        "Powder factor: {} kg/m³ ({} kg/t) from {} holes, {} excluded",
        fmt_opt(pf.powder_factor_kg_m3, 3),
        fmt_opt(pf.specific_charge_kg_t, 3),
        pf.holes_used,
        pf.holes_excluded
    );
    println!(
        "  rock density {} t/m³, bench height {} m",
        pf.params.rock_density_t_m3, pf.params.bench_height_m
    );
    println!();

    println!("Insights:");
    for msg in report.insights.messages() {
        println!("  - {msg}");
    }

    if !report.flagged_holes.is_empty() {
        println!();
        println!("Data quality ({} holes flagged):", report.flagged_holes.len());
        for hole in &report.flagged_holes {
            println!("  {}: {:?}", hole.hole_id, hole.flags);
        }
    }
}

fn check_config(path: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let unknown = validation::validate_unknown_keys(&contents);
    for w in &unknown {
        println!("warning: {w}");
    }

    match AnalysisConfig::load_from_file(path) {
        Ok(cfg) => {
            let known = validation::known_config_keys();
            let overridden = AnalysisConfig::explicit_keys(&contents)
                .iter()
                .filter(|k| k.contains('.') && known.contains(k.as_str()))
                .count();
            println!(
                "{}: OK (site {}, {} settings overridden, {} unknown keys)",
                path.display(),
                cfg.site.name,
                overridden,
                unknown.len()
            );
            Ok(())
        }
        Err(e) => bail!("{e}"),
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs on stderr so stdout stays machine-readable
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let cfg = match &args.config {
        Some(path) => AnalysisConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::load(),
    };
    config::init(cfg);
    let thresholds = config::get().insights;

    match &args.command {
        SubCommand::Summary { blast } => {
            let blast = blast.load()?;
            let summary = summarize_from_source(&blast, &blast.name)
                .with_context(|| format!("No holes for blast {}", blast.name))?;
            print_json(&summary)?;
        }

        SubCommand::PowderFactor { blast, rock } => {
            let params = rock.resolve()?;
            let blast = blast.load()?;
            print_json(&powder_factor_breakdown(&blast.holes, params))?;
        }

        SubCommand::Report { blast, rock, format } => {
            let params = rock.resolve()?;
            let blast = blast.load()?;
            let report = analyze_blast(&blast, params, &thresholds)?;
            match format {
                OutputFormat::Json => print_json(&report)?,
                OutputFormat::Text => print_report_text(&report),
            }
        }

        SubCommand::Batch { inputs, rock } => {
            let params = rock.resolve()?;
            let mut blasts = Vec::with_capacity(inputs.len());
            for path in inputs {
                match load_blast(path) {
                    Ok(b) => blasts.push(b),
                    Err(e) => warn!(file = %path.display(), error = %e, "Skipping input"),
                }
            }
            if blasts.is_empty() {
                bail!("No input could be loaded");
            }
            let reports = analyze_blasts(&blasts, params, &thresholds)
                .into_iter()
                .collect::<Result<Vec<_>, _>>()?;
            print_json(&reports)?;
        }

        SubCommand::Plan {
            name,
            bench,
            rows,
            cols,
            burden,
            spacing,
            origin_x,
            origin_y,
            template,
            rock,
        } => {
            let mut plan = DrillPlan::new(name.clone(), *burden, *spacing, *rows, *cols)
                .with_origin(*origin_x, *origin_y);
            plan.bench.clone_from(bench);

            match template {
                None => print_json(&plan.grid_geojson()?)?,
                Some(template) => {
                    let params = rock.resolve()?;
                    let design = plan.design_blast(template)?;
                    let report = analyze_blast(&design, params, &thresholds)?;
                    print_json(&serde_json::json!({
                        "grid": plan.grid_geojson()?,
                        "loading_density_kg_m": loading_density_kg_m(
                            template.diameter_mm,
                            template.explosive_density_kg_m3,
                        ),
                        "design": report,
                    }))?;
                }
            }
        }

        SubCommand::CheckConfig { path } => check_config(path)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_template() {
        let t = parse_template("115, 11, 3, 1200, 8").unwrap();
        assert_eq!(t.diameter_mm, 115.0);
        assert_eq!(t.explosive_column_m, 8.0);
        assert!(parse_template("115,11").is_err());
        assert!(parse_template("115,11,x,1200,8").is_err());
    }

    #[test]
    fn test_cli_parses_report() {
        let args = CliArgs::try_parse_from([
            "blast-analysis",
            "report",
            "holes.csv",
            "--bench-height",
            "12",
            "--format",
            "text",
        ])
        .unwrap();
        match args.command {
            SubCommand::Report { blast, rock, format } => {
                assert_eq!(blast.input, PathBuf::from("holes.csv"));
                assert_eq!(rock.bench_height, Some(12.0));
                assert!(matches!(format, OutputFormat::Text));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_cli_verifies() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }
}
