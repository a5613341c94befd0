//! Command-line parsing for the compensation engine driver.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the calculation code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{MetricKind, PolicyConfig};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "compdash", version, about = "Provider compensation & productivity engine")]
pub struct Cli {
    /// Increase log verbosity (-v = info, -vv = debug). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate a scenario: incentives, percentiles, alignment; optionally export.
    Run(RunArgs),
    /// Write a synthetic scenario JSON.
    Sample(SampleArgs),
    /// Rank a single value against a benchmark curve.
    Percentile(PercentileArgs),
    /// Value at a percentile on a benchmark curve (extrapolates past the anchors).
    Value(ValueArgs),
    /// Export a benchmark curve grid for charting.
    Curve(CurveArgs),
}

/// Policy values; each can also come from the environment or `.env`.
#[derive(Debug, Clone, Args)]
pub struct PolicyArgs {
    /// Fraction of earned incentive withheld.
    #[arg(long, env = "COMPDASH_HOLDBACK", default_value_t = PolicyConfig::default().holdback_fraction)]
    pub holdback: f64,

    /// Percentile-point gap still classified as aligned.
    #[arg(long, env = "COMPDASH_ALIGNMENT_THRESHOLD", default_value_t = PolicyConfig::default().alignment_threshold)]
    pub alignment_threshold: f64,

    /// Tighter band flagged as perfect alignment in reports.
    #[arg(long, env = "COMPDASH_PERFECT_BAND", default_value_t = PolicyConfig::default().perfect_alignment_band)]
    pub perfect_band: f64,
}

impl PolicyArgs {
    pub fn to_policy(&self) -> PolicyConfig {
        PolicyConfig {
            holdback_fraction: self.holdback,
            alignment_threshold: self.alignment_threshold,
            perfect_alignment_band: self.perfect_band,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Scenario JSON file.
    #[arg(short, long, value_name = "JSON")]
    pub scenario: PathBuf,

    /// Print month-by-month detail for this provider id.
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Show top-N over/under-compensated providers.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Export monthly line items to CSV.
    #[arg(long = "export-csv")]
    pub export_csv: Option<PathBuf>,

    /// Export the per-provider summary to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

#[derive(Debug, Clone, Args)]
pub struct SampleArgs {
    /// Number of synthetic providers.
    #[arg(short = 'n', long, default_value_t = 25)]
    pub providers: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Month-to-month relative productivity noise.
    #[arg(long, default_value_t = 0.08)]
    pub noise: f64,

    /// Output file (stdout when omitted).
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Which curve to use.
#[derive(Debug, Clone, Args)]
pub struct CurveSelector {
    /// Scenario JSON file holding the benchmarks.
    #[arg(short, long, value_name = "JSON")]
    pub scenario: PathBuf,

    #[arg(long)]
    pub specialty: String,

    #[arg(long, value_enum)]
    pub metric: MetricKind,
}

#[derive(Debug, Clone, Args)]
pub struct PercentileArgs {
    #[command(flatten)]
    pub curve: CurveSelector,

    #[arg(long, allow_hyphen_values = true)]
    pub value: f64,
}

#[derive(Debug, Clone, Args)]
pub struct ValueArgs {
    #[command(flatten)]
    pub curve: CurveSelector,

    #[arg(long)]
    pub percentile: f64,
}

#[derive(Debug, Clone, Args)]
pub struct CurveArgs {
    #[command(flatten)]
    pub curve: CurveSelector,

    /// Number of grid points over 0..=100.
    #[arg(long, default_value_t = 101)]
    pub steps: usize,

    /// Output JSON file.
    #[arg(short, long)]
    pub out: PathBuf,
}
