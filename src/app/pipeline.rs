//! Shared calculation pipeline used by every `compdash` front-end.
//!
//! The pipeline is a pure function of a full input snapshot:
//! scenario -> per-provider ledger -> incentives -> compensation -> percentiles
//! -> alignment. It never patches a previous result; re-running it with edited
//! inputs is how "state" changes.
//!
//! Failures are local. A provider whose record failed ingest still produces an
//! outcome (carrying the error), and a missing benchmark only blanks the rank
//! that needed it.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::calc::{CompensationSummary, ProductivityLedger, aggregate_provider, classify, compensate};
use crate::data::BenchmarkSet;
use crate::domain::{AlignmentResult, MetricKind, PolicyConfig, ProviderRecord, RunConfig};
use crate::error::{AppError, CalcError};
use crate::io::ingest::{ProviderEntry, Scenario, load_scenario};

/// All computed values for one provider.
#[derive(Debug, Clone)]
pub struct ProviderOutcome {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub fte: Option<f64>,
    pub ledger: Result<ProductivityLedger, CalcError>,
    pub compensation: Result<CompensationSummary, CalcError>,
    /// Rank of FTE-normalized YTD productivity.
    pub productivity_percentile: Result<f64, CalcError>,
    /// Rank of FTE-normalized annual total compensation.
    pub compensation_percentile: Result<f64, CalcError>,
    /// Annual total / YTD productivity.
    pub effective_rate: Result<f64, CalcError>,
    pub rate_percentile: Result<f64, CalcError>,
    /// Present only when both percentiles are available.
    pub alignment: Option<AlignmentResult>,
}

impl ProviderOutcome {
    fn failed(entry: &ProviderEntry, err: CalcError) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            specialty: entry.specialty.clone(),
            fte: None,
            ledger: Err(err.clone()),
            compensation: Err(err.clone()),
            productivity_percentile: Err(err.clone()),
            compensation_percentile: Err(err.clone()),
            effective_rate: Err(err.clone()),
            rate_percentile: Err(err),
            alignment: None,
        }
    }

    /// True when the ledger and compensation were computed.
    pub fn is_computed(&self) -> bool {
        self.ledger.is_ok() && self.compensation.is_ok()
    }
}

/// Outcomes for every provider, in scenario order.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub policy: PolicyConfig,
    pub providers: Vec<ProviderOutcome>,
}

impl ScenarioOutcome {
    pub fn computed_count(&self) -> usize {
        self.providers.iter().filter(|p| p.is_computed()).count()
    }

    pub fn find(&self, id: &str) -> Option<&ProviderOutcome> {
        self.providers.iter().find(|p| p.id == id)
    }
}

/// Run the full pipeline for one validated provider record.
pub fn evaluate_record(record: &ProviderRecord, benchmarks: &BenchmarkSet, policy: &PolicyConfig) -> ProviderOutcome {
    let ledger = aggregate_provider(record);
    let compensation = ledger
        .as_ref()
        .map_err(Clone::clone)
        .and_then(|l| compensate(record, l, policy.holdback_fraction));

    let productivity_percentile = ledger.as_ref().map_err(Clone::clone).and_then(|l| {
        benchmarks.percentile(
            &record.specialty,
            MetricKind::Productivity,
            l.productivity.ytd / record.fte,
        )
    });

    let compensation_percentile = compensation.as_ref().map_err(Clone::clone).and_then(|c| {
        benchmarks.percentile(
            &record.specialty,
            MetricKind::Compensation,
            c.annual_total / record.fte,
        )
    });

    let effective_rate = match (&ledger, &compensation) {
        (Ok(l), Ok(c)) if l.productivity.ytd > 0.0 => Ok(c.annual_total / l.productivity.ytd),
        (Ok(l), Ok(_)) => Err(CalcError::invalid("ytd_productivity", l.productivity.ytd)),
        (Err(e), _) | (_, Err(e)) => Err(e.clone()),
    };
    let rate_percentile = effective_rate
        .clone()
        .and_then(|rate| benchmarks.percentile(&record.specialty, MetricKind::Rate, rate));

    let alignment = match (&productivity_percentile, &compensation_percentile) {
        (Ok(prod), Ok(comp)) => classify(*prod, *comp, policy.alignment_threshold).ok(),
        _ => None,
    };

    debug!(
        provider = %record.id,
        computed = compensation.is_ok(),
        aligned = ?alignment.map(|a| a.category),
        "evaluated provider"
    );

    ProviderOutcome {
        id: record.id.clone(),
        name: record.name.clone(),
        specialty: record.specialty.clone(),
        fte: Some(record.fte),
        ledger,
        compensation,
        productivity_percentile,
        compensation_percentile,
        effective_rate,
        rate_percentile,
        alignment,
    }
}

/// Run the pipeline for one loaded provider, carrying ingest failures through.
pub fn evaluate_provider(entry: &ProviderEntry, benchmarks: &BenchmarkSet, policy: &PolicyConfig) -> ProviderOutcome {
    match &entry.record {
        Ok(record) => evaluate_record(record, benchmarks, policy),
        Err(err) => ProviderOutcome::failed(entry, err.clone()),
    }
}

/// Evaluate every provider in parallel; output order matches input order.
pub fn evaluate_scenario(scenario: &Scenario, policy: &PolicyConfig) -> Result<ScenarioOutcome, CalcError> {
    policy.validate()?;

    let providers: Vec<ProviderOutcome> = scenario
        .providers
        .par_iter()
        .map(|entry| evaluate_provider(entry, &scenario.benchmarks, policy))
        .collect();

    Ok(ScenarioOutcome {
        policy: *policy,
        providers,
    })
}

/// Load the configured scenario and evaluate it.
pub fn run_scenario(config: &RunConfig) -> Result<ScenarioOutcome, AppError> {
    let scenario = load_scenario(&config.scenario_path)?;
    let outcome = evaluate_scenario(&scenario, &config.policy)?;

    info!(
        providers = outcome.providers.len(),
        computed = outcome.computed_count(),
        "scenario evaluated"
    );
    if outcome.computed_count() == 0 {
        return Err(AppError::new(
            3,
            "No provider could be computed; check the scenario for record errors.",
        ));
    }
    Ok(outcome)
}
