//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the calculation code stays clean and testable
//! - output changes are localized
//!
//! Placeholders: a value whose calculation failed prints as `—`; a rank with no
//! benchmark curve prints as `N/A`.

use crate::app::pipeline::{ProviderOutcome, ScenarioOutcome};
use crate::domain::{MONTHS, month_label};
use crate::error::CalcError;
use crate::report::Rankings;

const FAILED: &str = "—";
const NO_RANK: &str = "N/A";

/// Header block: policy and provider counts.
pub fn format_run_summary(outcome: &ScenarioOutcome, scenario_label: &str) -> String {
    let mut out = String::new();
    let policy = &outcome.policy;

    out.push_str("=== compdash - Provider Compensation ===\n");
    out.push_str(&format!("Scenario: {scenario_label}\n"));
    out.push_str(&format!(
        "Policy: holdback={:.0}% | alignment=±{:.1} pts | perfect=±{:.1} pts\n",
        policy.holdback_fraction * 100.0,
        policy.alignment_threshold,
        policy.perfect_alignment_band,
    ));
    out.push_str(&format!(
        "Providers: n={} | computed={} | failed={}\n",
        outcome.providers.len(),
        outcome.computed_count(),
        outcome.providers.len() - outcome.computed_count(),
    ));

    let failures: Vec<&ProviderOutcome> = outcome.providers.iter().filter(|p| !p.is_computed()).collect();
    for p in failures {
        if let Err(e) = &p.compensation {
            out.push_str(&format!("  ({}) {e}\n", p.id));
        }
    }
    out.push('\n');
    out
}

/// One row per provider.
pub fn format_provider_table(outcome: &ScenarioOutcome) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<8} {:<20} {:<18} {:>9} {:>6} {:>12} {:>6} {:>7} {:<18}\n",
            "id", "name", "specialty", "ytd_units", "prod%", "annual_comp", "comp%", "gap", "alignment"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<8} {:-<20} {:-<18} {:-<9} {:-<6} {:-<12} {:-<6} {:-<7} {:-<18}\n",
            "", "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for p in &outcome.providers {
        let ytd_units = p
            .ledger
            .as_ref()
            .map(|l| format!("{:.1}", l.productivity.ytd))
            .unwrap_or_else(|_| FAILED.to_string());
        let annual = p
            .compensation
            .as_ref()
            .map(|c| format!("{:.2}", c.annual_total))
            .unwrap_or_else(|_| FAILED.to_string());
        let (gap, label) = match &p.alignment {
            Some(a) => {
                let star = if a.is_within(outcome.policy.perfect_alignment_band) { " *" } else { "" };
                (format!("{:+.1}", a.gap), format!("{}{star}", a.category.label()))
            }
            None => (FAILED.to_string(), FAILED.to_string()),
        };

        out.push_str(
            format!(
                "{:<8} {:<20} {:<18} {:>9} {:>6} {:>12} {:>6} {:>7} {:<18}\n",
                truncate(&p.id, 8),
                truncate(&p.name, 20),
                truncate(&p.specialty, 18),
                ytd_units,
                fmt_rank(&p.productivity_percentile),
                annual,
                fmt_rank(&p.compensation_percentile),
                gap,
                label,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Month-by-month detail for a single provider.
pub fn format_provider_detail(p: &ProviderOutcome) -> String {
    let mut out = String::new();
    out.push_str(&format!("Provider {} - {} ({})\n", p.id, p.name, p.specialty));

    let (ledger, comp) = match (&p.ledger, &p.compensation) {
        (Ok(l), Ok(c)) => (l, c),
        (Err(e), _) | (_, Err(e)) => {
            out.push_str(&format!("  {FAILED} not computed: {e}\n"));
            return out;
        }
    };

    out.push_str(&format!(
        "{:<5} {:>9} {:>9} {:>9} {:>8} {:>11} {:>10} {:>11} {:>12} {:>12}\n",
        "month", "units", "target", "variance", "rate", "incentive", "holdback", "net", "net_ytd", "total_comp"
    ));
    let inc = &comp.incentives;
    for m in 0..MONTHS {
        out.push_str(&format!(
            "{:<5} {:>9.1} {:>9.1} {:>9.1} {:>8.2} {:>11.2} {:>10.2} {:>11.2} {:>12.2} {:>12.2}\n",
            month_label(m),
            ledger.productivity.total.get(m),
            ledger.target.total.get(m),
            ledger.variance.get(m),
            inc.rates.get(m),
            inc.incentive.get(m),
            inc.holdback.get(m),
            inc.net.get(m),
            inc.ytd_running.get(m),
            comp.monthly_total.get(m),
        ));
    }
    out.push_str(&format!(
        "{:<5} {:>9.1} {:>9.1} {:>9.1} {:>8} {:>11.2} {:>10.2} {:>11.2} {:>12} {:>12.2}\n",
        "YTD",
        ledger.productivity.ytd,
        ledger.target.ytd,
        ledger.variance_ytd(),
        "",
        inc.incentive.ytd(),
        inc.holdback.ytd(),
        inc.total_ytd,
        "",
        comp.annual_total,
    ));

    out.push_str(&format!(
        "\nBase salary/month: {:.2} | supplemental YTD: {:.2}\n",
        comp.base_monthly,
        comp.supplemental.ytd()
    ));
    out.push_str(&format!(
        "Percentiles: productivity={} compensation={} rate={}\n",
        fmt_rank(&p.productivity_percentile),
        fmt_rank(&p.compensation_percentile),
        fmt_rank(&p.rate_percentile),
    ));
    if let Some(a) = &p.alignment {
        out.push_str(&format!("Alignment: {} (gap {:+.1})\n", a.category.label(), a.gap));
    }
    out
}

/// Over/under-compensated tables.
pub fn format_rankings(rankings: &Rankings<'_>) -> String {
    let mut out = String::new();
    out.push_str("Largest positive gaps (comp rank above productivity rank):\n");
    out.push_str(&format_gap_list(&rankings.over));
    out.push('\n');
    out.push_str("Largest negative gaps (comp rank below productivity rank):\n");
    out.push_str(&format_gap_list(&rankings.under));
    out
}

fn format_gap_list(rows: &[&ProviderOutcome]) -> String {
    if rows.is_empty() {
        return "  (none)\n".to_string();
    }
    let mut out = String::new();
    for p in rows {
        if let Some(a) = &p.alignment {
            out.push_str(&format!(
                "  {:<8} {:<20} prod={:>5.1} comp={:>5.1} gap={:+.1}\n",
                truncate(&p.id, 8),
                truncate(&p.name, 20),
                a.productivity_percentile,
                a.compensation_percentile,
                a.gap
            ));
        }
    }
    out
}

/// Render a rank, or its placeholder.
pub fn fmt_rank(value: &Result<f64, CalcError>) -> String {
    match value {
        Ok(v) => format!("{v:.1}"),
        Err(CalcError::MissingBenchmark { .. }) => NO_RANK.to_string(),
        Err(_) => FAILED.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
