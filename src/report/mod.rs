//! Reporting utilities: alignment rankings and formatted terminal output.

pub mod format;

pub use format::*;

use crate::app::pipeline::{ProviderOutcome, ScenarioOutcome};

/// Largest alignment gaps on each side (top-N each).
#[derive(Debug, Clone)]
pub struct Rankings<'a> {
    /// Most positive gap first (paid above their productivity rank).
    pub over: Vec<&'a ProviderOutcome>,
    /// Most negative gap first (paid below their productivity rank).
    pub under: Vec<&'a ProviderOutcome>,
}

/// Rank providers by alignment gap. Providers without an alignment are skipped.
pub fn rank_by_gap(outcome: &ScenarioOutcome, top_n: usize) -> Rankings<'_> {
    let mut aligned: Vec<(&ProviderOutcome, f64)> = outcome
        .providers
        .iter()
        .filter_map(|p| p.alignment.map(|a| (p, a.gap)))
        .collect();

    aligned.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let over = aligned
        .iter()
        .filter(|(_, gap)| *gap > 0.0)
        .take(top_n)
        .map(|(p, _)| *p)
        .collect();

    aligned.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    let under = aligned
        .iter()
        .filter(|(_, gap)| *gap < 0.0)
        .take(top_n)
        .map(|(p, _)| *p)
        .collect();

    Rankings { over, under }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::evaluate_scenario;
    use crate::domain::PolicyConfig;
    use crate::io::ingest::parse_scenario;

    #[test]
    fn rank_by_gap_basic() {
        // Same productivity (50th); salaries at the 25th, 50th and 90th.
        let json = r#"{
            "benchmarks": [
                {"specialty": "S", "metric": "productivity", "p25": 3600, "p50": 4800, "p75": 6000, "p90": 7200},
                {"specialty": "S", "metric": "compensation", "p25": 200000, "p50": 250000, "p75": 300000, "p90": 350000}
            ],
            "providers": [
                {"id": "LOW", "specialty": "S", "base_salary": 200000,
                 "productivity": [400,400,400,400,400,400,400,400,400,400,400,400], "model": {"kind": "flat", "rate": 0}},
                {"id": "MID", "specialty": "S", "base_salary": 250000,
                 "productivity": [400,400,400,400,400,400,400,400,400,400,400,400], "model": {"kind": "flat", "rate": 0}},
                {"id": "HIGH", "specialty": "S", "base_salary": 350000,
                 "productivity": [400,400,400,400,400,400,400,400,400,400,400,400], "model": {"kind": "flat", "rate": 0}},
                {"id": "NONE", "specialty": "Other", "model": {"kind": "flat", "rate": 0}}
            ]
        }"#;
        let scenario = parse_scenario(json).unwrap();
        let outcome = evaluate_scenario(&scenario, &PolicyConfig::default()).unwrap();

        let rankings = rank_by_gap(&outcome, 5);
        let over: Vec<&str> = rankings.over.iter().map(|p| p.id.as_str()).collect();
        let under: Vec<&str> = rankings.under.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(over, vec!["HIGH"]);
        assert_eq!(under, vec!["LOW"]);

        let one = rank_by_gap(&outcome, 0);
        assert!(one.over.is_empty() && one.under.is_empty());
    }
}
