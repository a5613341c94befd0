//! Export computed outcomes.
//!
//! - monthly line items as CSV (one row per provider-month), for tabular display
//!   and spreadsheet consumers
//! - a per-provider summary as JSON, for collaborators that render badges/filters
//!
//! Failed values are written as empty CSV cells / JSON `null` plus an error
//! message; formatting them as "—" or "N/A" is the consumer's job.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Local;
use serde::Serialize;

use crate::app::pipeline::{ProviderOutcome, ScenarioOutcome};
use crate::domain::{MONTHS, PolicyConfig, month_label};
use crate::error::AppError;

const CSV_HEADER: &str = "provider_id,provider_name,specialty,month,productivity,target,variance,rate,incentive,holdback,net,net_ytd,supplemental,total_comp";

/// Write monthly line items for every computed provider.
pub fn write_line_items_csv(path: &Path, outcome: &ScenarioOutcome) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_line_items(&mut file, outcome)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV '{}': {e}", path.display())))
}

fn write_line_items(out: &mut impl Write, outcome: &ScenarioOutcome) -> std::io::Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for p in &outcome.providers {
        let (Ok(ledger), Ok(comp)) = (&p.ledger, &p.compensation) else {
            continue;
        };
        let inc = &comp.incentives;
        for m in 0..MONTHS {
            writeln!(
                out,
                "{},{},{},{},{:.2},{:.2},{:.2},{:.4},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
                csv_field(&p.id),
                csv_field(&p.name),
                csv_field(&p.specialty),
                month_label(m),
                ledger.productivity.total.get(m),
                ledger.target.total.get(m),
                ledger.variance.get(m),
                inc.rates.get(m),
                inc.incentive.get(m),
                inc.holdback.get(m),
                inc.net.get(m),
                inc.ytd_running.get(m),
                comp.supplemental.get(m),
                comp.monthly_total.get(m),
            )?;
        }
    }
    Ok(())
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Serializable per-provider summary.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSummary {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub fte: Option<f64>,
    pub ytd_productivity: Option<f64>,
    pub ytd_target: Option<f64>,
    pub ytd_variance: Option<f64>,
    pub ytd_incentive: Option<f64>,
    pub ytd_holdback: Option<f64>,
    pub ytd_net: Option<f64>,
    pub annual_total: Option<f64>,
    pub productivity_percentile: Option<f64>,
    pub compensation_percentile: Option<f64>,
    pub effective_rate: Option<f64>,
    pub rate_percentile: Option<f64>,
    pub alignment_gap: Option<f64>,
    pub alignment: Option<&'static str>,
    pub perfect_alignment: Option<bool>,
    /// Messages for every value that could not be computed.
    pub errors: Vec<String>,
}

impl ProviderSummary {
    pub fn from_outcome(p: &ProviderOutcome, policy: &PolicyConfig) -> Self {
        let mut errors = Vec::new();
        let mut keep = |r: Result<f64, String>| match r {
            Ok(v) => Some(v),
            Err(e) => {
                if !errors.contains(&e) {
                    errors.push(e);
                }
                None
            }
        };

        let ledger = p.ledger.as_ref().map_err(|e| e.to_string());
        let comp = p.compensation.as_ref().map_err(|e| e.to_string());

        let ytd_productivity = keep(ledger.clone().map(|l| l.productivity.ytd));
        let ytd_target = keep(ledger.clone().map(|l| l.target.ytd));
        let ytd_variance = keep(ledger.clone().map(|l| l.variance_ytd()));
        let ytd_incentive = keep(comp.clone().map(|c| c.incentives.incentive.ytd()));
        let ytd_holdback = keep(comp.clone().map(|c| c.incentives.holdback.ytd()));
        let ytd_net = keep(comp.clone().map(|c| c.incentives.total_ytd));
        let annual_total = keep(comp.map(|c| c.annual_total));
        let productivity_percentile = keep(p.productivity_percentile.clone().map_err(|e| e.to_string()));
        let compensation_percentile = keep(p.compensation_percentile.clone().map_err(|e| e.to_string()));
        let effective_rate = keep(p.effective_rate.clone().map_err(|e| e.to_string()));
        let rate_percentile = keep(p.rate_percentile.clone().map_err(|e| e.to_string()));

        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            specialty: p.specialty.clone(),
            fte: p.fte,
            ytd_productivity,
            ytd_target,
            ytd_variance,
            ytd_incentive,
            ytd_holdback,
            ytd_net,
            annual_total,
            productivity_percentile,
            compensation_percentile,
            effective_rate,
            rate_percentile,
            alignment_gap: p.alignment.map(|a| a.gap),
            alignment: p.alignment.map(|a| a.category.label()),
            perfect_alignment: p.alignment.map(|a| a.is_within(policy.perfect_alignment_band)),
            errors,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct SummaryFile<'a> {
    tool: &'static str,
    generated_at: String,
    policy: &'a PolicyConfig,
    providers: Vec<ProviderSummary>,
}

/// Write the per-provider summary JSON.
pub fn write_summary_json(path: &Path, outcome: &ScenarioOutcome) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create summary JSON '{}': {e}", path.display())))?;

    let summary = SummaryFile {
        tool: "compdash",
        generated_at: Local::now().to_rfc3339(),
        policy: &outcome.policy,
        providers: outcome
            .providers
            .iter()
            .map(|p| ProviderSummary::from_outcome(p, &outcome.policy))
            .collect(),
    };

    serde_json::to_writer_pretty(file, &summary)
        .map_err(|e| AppError::new(2, format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}
