//! Scenario ingest and normalization.
//!
//! A scenario is a full JSON snapshot of engine inputs: benchmark curves, named
//! tier lists, and provider records with their adjustments. This module turns it
//! into validated domain types.
//!
//! Design goals:
//! - **Single default policy**: a `null` or missing month is `0.0`, a missing FTE
//!   is `1.0`, a missing base salary is `0.0`. Nothing downstream defaults again.
//! - **Record-level validation**: a bad provider, curve, or tier list is reported
//!   and isolated; its siblings still load.
//! - **No calculation here**

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::data::BenchmarkSet;
use crate::domain::{
    Adjustment, AdjustmentKind, BenchmarkCurve, CompensationModel, MetricKind, MonthlySeries, ProviderRecord,
    Tier, TierBasis, TierList,
};
use crate::error::{AppError, CalcError};

/// Default FTE when a record omits it.
pub const DEFAULT_FTE: f64 = 1.0;

/// On-disk scenario layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub benchmarks: Vec<BenchmarkRow>,
    #[serde(default)]
    pub tier_lists: BTreeMap<String, Vec<Tier>>,
    #[serde(default)]
    pub providers: Vec<ProviderRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRow {
    pub specialty: String,
    pub metric: MetricKind,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRow {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub specialty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fte: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_salary: Option<f64>,
    #[serde(default)]
    pub productivity: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub target: Option<Vec<Option<f64>>>,
    pub model: ModelRow,
    #[serde(default)]
    pub adjustments: Vec<AdjustmentRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelRow {
    Flat {
        rate: f64,
    },
    Tiered {
        tier_list: String,
        #[serde(default)]
        basis: TierBasis,
    },
    Custom {
        rates: Vec<Option<f64>>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentRow {
    pub name: String,
    pub kind: AdjustmentKind,
    pub values: Vec<Option<f64>>,
}

/// A provider as loaded: identity is always known, the record may have failed.
#[derive(Debug, Clone)]
pub struct ProviderEntry {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub record: Result<ProviderRecord, CalcError>,
}

/// Ingest output: benchmark registry + providers in file order.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub benchmarks: BenchmarkSet,
    pub providers: Vec<ProviderEntry>,
}

impl Scenario {
    pub fn valid_count(&self) -> usize {
        self.providers.iter().filter(|p| p.record.is_ok()).count()
    }
}

/// Read and normalize a scenario JSON file.
pub fn load_scenario(path: &Path) -> Result<Scenario, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open scenario '{}': {e}", path.display())))?;
    let raw: ScenarioFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid scenario JSON '{}': {e}", path.display())))?;
    let scenario = build_scenario(raw);
    info!(
        path = %path.display(),
        curves = scenario.benchmarks.len(),
        providers = scenario.providers.len(),
        valid = scenario.valid_count(),
        "loaded scenario"
    );
    Ok(scenario)
}

/// Parse a scenario from a JSON string.
pub fn parse_scenario(json: &str) -> Result<Scenario, AppError> {
    let raw: ScenarioFile =
        serde_json::from_str(json).map_err(|e| AppError::new(2, format!("Invalid scenario JSON: {e}")))?;
    Ok(build_scenario(raw))
}

/// Validate every part of a raw scenario, isolating failures per record.
pub fn build_scenario(raw: ScenarioFile) -> Scenario {
    let mut benchmarks = BenchmarkSet::new();
    for row in raw.benchmarks {
        match BenchmarkCurve::new(row.specialty.clone(), row.metric, [row.p25, row.p50, row.p75, row.p90]) {
            Ok(curve) => benchmarks.insert(curve),
            Err(err) => {
                warn!(specialty = %row.specialty, metric = %row.metric, error = %err, "rejected benchmark curve");
                benchmarks.reject(&row.specialty, row.metric, err);
            }
        }
    }

    let tier_lists: HashMap<String, Result<TierList, CalcError>> = raw
        .tier_lists
        .into_iter()
        .map(|(name, tiers)| {
            let list = TierList::new(tiers);
            if let Err(err) = &list {
                warn!(tier_list = %name, error = %err, "rejected tier list");
            }
            (name, list)
        })
        .collect();

    let providers = raw
        .providers
        .into_iter()
        .map(|row| {
            let record = normalize_provider(&row, &tier_lists);
            if let Err(err) = &record {
                warn!(provider = %row.id, error = %err, "rejected provider record");
            }
            ProviderEntry {
                name: row.name.clone().unwrap_or_else(|| row.id.clone()),
                id: row.id,
                specialty: row.specialty,
                record,
            }
        })
        .collect();

    Scenario { benchmarks, providers }
}

fn normalize_provider(
    row: &ProviderRow,
    tier_lists: &HashMap<String, Result<TierList, CalcError>>,
) -> Result<ProviderRecord, CalcError> {
    let model = match &row.model {
        ModelRow::Flat { rate } => CompensationModel::Flat { rate: *rate },
        ModelRow::Tiered { tier_list, basis } => {
            let tiers = tier_lists
                .get(tier_list)
                .ok_or_else(|| CalcError::UnknownTierList(tier_list.clone()))?
                .clone()?;
            CompensationModel::Tiered { tiers, basis: *basis }
        }
        ModelRow::Custom { rates } => CompensationModel::Custom {
            rates: MonthlySeries::from_optional("rates", rates)?,
        },
    };

    let adjustments = row
        .adjustments
        .iter()
        .map(|a| {
            let values = MonthlySeries::from_optional(&a.name, &a.values)?;
            Ok(Adjustment::new(a.kind, a.name.clone(), values))
        })
        .collect::<Result<Vec<_>, CalcError>>()?;

    let record = ProviderRecord {
        id: row.id.clone(),
        name: row.name.clone().unwrap_or_else(|| row.id.clone()),
        specialty: row.specialty.clone(),
        fte: row.fte.unwrap_or(DEFAULT_FTE),
        base_salary: row.base_salary.unwrap_or(0.0),
        productivity: series_or_zeros("productivity", row.productivity.as_deref())?,
        target: series_or_zeros("target", row.target.as_deref())?,
        model,
        adjustments,
    };
    record.validate()?;
    Ok(record)
}

fn series_or_zeros(field: &str, values: Option<&[Option<f64>]>) -> Result<MonthlySeries, CalcError> {
    match values {
        Some(values) => MonthlySeries::from_optional(field, values),
        None => Ok(MonthlySeries::zeros()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"{
        "benchmarks": [
            {"specialty": "Family Medicine", "metric": "compensation", "p25": 220000, "p50": 250000, "p75": 280000, "p90": 310000},
            {"specialty": "Family Medicine", "metric": "productivity", "p25": 4000, "p50": 4800, "p75": 5600, "p90": 6500},
            {"specialty": "Family Medicine", "metric": "rate", "p25": 0, "p50": 45, "p75": 50, "p90": 55}
        ],
        "tier_lists": {
            "standard": [{"threshold": 0, "rate": 45}, {"threshold": 5000, "rate": 50}],
            "broken": [{"threshold": 10, "rate": 45}]
        },
        "providers": [
            {
                "id": "P001", "name": "Dr. A", "specialty": "Family Medicine", "base_salary": 240000,
                "productivity": [400,400,400,400,400,400,400,400,400,400,400,null],
                "target": [417,417,417,417,417,417,417,417,417,417,417,417],
                "model": {"kind": "flat", "rate": 45},
                "adjustments": [{"name": "credit", "kind": "productivity", "values": [50,0,0,0,0,0,0,0,0,0,0,0]}]
            },
            {
                "id": "P002", "specialty": "Family Medicine",
                "model": {"kind": "tiered", "tier_list": "broken"}
            },
            {
                "id": "P003", "specialty": "Family Medicine",
                "model": {"kind": "tiered", "tier_list": "standard", "basis": "monthly"}
            },
            {
                "id": "P004", "specialty": "Family Medicine",
                "model": {"kind": "tiered", "tier_list": "nope"}
            },
            {
                "id": "P005", "specialty": "Family Medicine", "fte": 0,
                "model": {"kind": "flat", "rate": 45}
            }
        ]
    }"#;

    #[test]
    fn defaults_are_applied_once_at_the_boundary() {
        let s = parse_scenario(SCENARIO).unwrap();
        let p1 = s.providers[0].record.as_ref().unwrap();
        assert_eq!(p1.fte, 1.0);
        assert_eq!(p1.productivity.get(11), 0.0);
        assert_eq!(p1.productivity.ytd(), 4400.0);
        assert_eq!(p1.adjustments.len(), 1);
        assert_eq!(p1.adjustments[0].kind(), AdjustmentKind::Productivity);

        let p3 = s.providers[2].record.as_ref().unwrap();
        assert_eq!(p3.name, "P003");
        assert_eq!(p3.base_salary, 0.0);
        assert_eq!(p3.productivity, MonthlySeries::zeros());
        assert!(matches!(
            p3.model,
            CompensationModel::Tiered {
                basis: TierBasis::Monthly,
                ..
            }
        ));
    }

    #[test]
    fn bad_records_are_isolated() {
        let s = parse_scenario(SCENARIO).unwrap();
        assert_eq!(s.providers.len(), 5);
        assert_eq!(s.valid_count(), 2);
        assert!(matches!(s.providers[1].record, Err(CalcError::MalformedTierList(_))));
        assert!(matches!(s.providers[3].record, Err(CalcError::UnknownTierList(_))));
        assert!(matches!(s.providers[4].record, Err(CalcError::InvalidNumericInput { .. })));
    }

    #[test]
    fn malformed_curve_is_remembered() {
        let s = parse_scenario(SCENARIO).unwrap();
        assert_eq!(s.benchmarks.len(), 2);
        assert!(matches!(
            s.benchmarks.lookup("Family Medicine", MetricKind::Rate),
            Err(CalcError::MalformedBenchmark { .. })
        ));
    }

    #[test]
    fn wrong_month_count_is_a_record_error() {
        let json = r#"{"providers": [{"id": "X", "specialty": "S", "productivity": [1, 2, 3],
            "model": {"kind": "flat", "rate": 1}}]}"#;
        let s = parse_scenario(json).unwrap();
        assert!(matches!(s.providers[0].record, Err(CalcError::SeriesLength { len: 3, .. })));
    }

    #[test]
    fn invalid_json_is_a_usage_error() {
        let err = parse_scenario("{not json").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.json");
        std::fs::write(&path, SCENARIO).unwrap();
        let s = load_scenario(&path).unwrap();
        assert_eq!(s.providers[0].id, "P001");
        assert!(load_scenario(&dir.path().join("missing.json")).is_err());
    }
}
