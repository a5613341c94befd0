//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - initializes logging
//! - runs the calculation pipeline
//! - prints reports
//! - writes optional exports

use std::io::Write;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, CurveArgs, CurveSelector, PercentileArgs, RunArgs, SampleArgs, ValueArgs};
use crate::data::{BenchmarkSet, SampleConfig, generate_sample};
use crate::domain::{BenchmarkCurve, RunConfig};
use crate::error::AppError;
use crate::math::{percentile_of, value_at_percentile};

pub mod pipeline;

/// Entry point for the `compdash` binary.
pub fn run() -> Result<(), AppError> {
    // Policy defaults may live in `.env`; clap reads them through `env = ...`.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Sample(args) => handle_sample(args),
        Command::Percentile(args) => handle_percentile(args),
        Command::Value(args) => handle_value(args),
        Command::Curve(args) => handle_curve(args),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let outcome = pipeline::run_scenario(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&outcome, &config.scenario_path.display().to_string())
    );
    println!("{}", crate::report::format_provider_table(&outcome));

    let rankings = crate::report::rank_by_gap(&outcome, args.top);
    println!("{}", crate::report::format_rankings(&rankings));

    if let Some(id) = &config.provider {
        let p = outcome
            .find(id)
            .ok_or_else(|| AppError::new(2, format!("Provider '{id}' not found in scenario.")))?;
        println!("{}", crate::report::format_provider_detail(p));
    }

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::export::write_line_items_csv(path, &outcome)?;
        info!(path = %path.display(), "wrote line items CSV");
    }
    if let Some(path) = &config.export_json {
        crate::io::export::write_summary_json(path, &outcome)?;
        info!(path = %path.display(), "wrote summary JSON");
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        providers: args.providers,
        seed: args.seed,
        monthly_noise: args.noise,
    };
    let scenario = generate_sample(&config)?;
    let json = serde_json::to_string_pretty(&scenario)
        .map_err(|e| AppError::new(4, format!("Failed to serialize scenario: {e}")))?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, json)
                .map_err(|e| AppError::new(2, format!("Failed to write scenario '{}': {e}", path.display())))?;
            info!(path = %path.display(), providers = config.providers, "wrote sample scenario");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").map_err(|e| AppError::new(2, format!("Failed to write scenario: {e}")))?;
        }
    }
    Ok(())
}

fn handle_percentile(args: PercentileArgs) -> Result<(), AppError> {
    let benchmarks = load_benchmarks(&args.curve)?;
    let curve = select_curve(&benchmarks, &args.curve)?;
    let p = percentile_of(args.value, curve)?;
    println!("{:.2}", p);
    Ok(())
}

fn handle_value(args: ValueArgs) -> Result<(), AppError> {
    let benchmarks = load_benchmarks(&args.curve)?;
    let curve = select_curve(&benchmarks, &args.curve)?;
    let v = value_at_percentile(args.percentile, curve)?;
    println!("{:.2}", v);
    Ok(())
}

fn handle_curve(args: CurveArgs) -> Result<(), AppError> {
    let benchmarks = load_benchmarks(&args.curve)?;
    let curve = select_curve(&benchmarks, &args.curve)?;
    crate::io::curve::write_curve_json(&args.out, curve, args.steps)?;
    info!(path = %args.out.display(), "wrote curve grid");
    Ok(())
}

fn load_benchmarks(selector: &CurveSelector) -> Result<BenchmarkSet, AppError> {
    let scenario = crate::io::ingest::load_scenario(&selector.scenario)?;
    debug!(curves = scenario.benchmarks.len(), "benchmarks loaded");
    Ok(scenario.benchmarks)
}

fn select_curve<'a>(benchmarks: &'a BenchmarkSet, selector: &CurveSelector) -> Result<&'a BenchmarkCurve, AppError> {
    Ok(benchmarks.lookup(&selector.specialty, selector.metric)?)
}

pub fn run_config_from_args(args: &RunArgs) -> RunConfig {
    RunConfig {
        scenario_path: args.scenario.clone(),
        provider: args.provider.clone(),
        policy: args.policy.to_policy(),
        export_csv: args.export_csv.clone(),
        export_json: args.export_json.clone(),
    }
}
