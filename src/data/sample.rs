//! Synthetic scenario generation.
//!
//! Produces a complete, deterministic scenario (benchmarks, tier lists, providers)
//! from a seed. Used by `compdash sample` and for demos; the reference anchors
//! below are illustrative market shapes, not published survey data.

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{AdjustmentKind, MONTHS, MetricKind, Tier, TierBasis};
use crate::error::AppError;
use crate::io::ingest::{AdjustmentRow, BenchmarkRow, ModelRow, ProviderRow, ScenarioFile};

/// Cross-provider spread of productivity levels (log scale).
const LEVEL_SIGMA: f64 = 0.18;

struct SpecialtyRef {
    name: &'static str,
    compensation: [f64; 4],
    productivity: [f64; 4],
    rate: [f64; 4],
}

const SPECIALTIES: [SpecialtyRef; 5] = [
    SpecialtyRef {
        name: "Family Medicine",
        compensation: [230_000.0, 270_000.0, 315_000.0, 370_000.0],
        productivity: [3_900.0, 4_800.0, 5_800.0, 7_000.0],
        rate: [46.0, 52.0, 58.0, 66.0],
    },
    SpecialtyRef {
        name: "Cardiology",
        compensation: [480_000.0, 580_000.0, 700_000.0, 830_000.0],
        productivity: [7_000.0, 8_600.0, 10_400.0, 12_500.0],
        rate: [58.0, 66.0, 74.0, 84.0],
    },
    SpecialtyRef {
        name: "Orthopedic Surgery",
        compensation: [520_000.0, 640_000.0, 790_000.0, 960_000.0],
        productivity: [7_500.0, 9_400.0, 11_600.0, 14_000.0],
        rate: [62.0, 70.0, 80.0, 90.0],
    },
    SpecialtyRef {
        name: "Pediatrics",
        compensation: [220_000.0, 250_000.0, 290_000.0, 335_000.0],
        productivity: [3_700.0, 4_500.0, 5_400.0, 6_500.0],
        rate: [48.0, 54.0, 60.0, 68.0],
    },
    SpecialtyRef {
        name: "Dermatology",
        compensation: [400_000.0, 490_000.0, 600_000.0, 730_000.0],
        productivity: [6_500.0, 8_000.0, 9_800.0, 11_800.0],
        rate: [52.0, 60.0, 68.0, 78.0],
    },
];

const FTE_CHOICES: [f64; 5] = [1.0, 1.0, 1.0, 0.8, 0.5];

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub providers: usize,
    pub seed: u64,
    /// Month-to-month relative noise on productivity.
    pub monthly_noise: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            providers: 25,
            seed: 42,
            monthly_noise: 0.08,
        }
    }
}

pub fn generate_sample(config: &SampleConfig) -> Result<ScenarioFile, AppError> {
    if config.providers == 0 {
        return Err(AppError::new(2, "Provider count must be > 0."));
    }
    if !(config.monthly_noise.is_finite() && config.monthly_noise >= 0.0 && config.monthly_noise < 1.0) {
        return Err(AppError::new(2, "Monthly noise must be in [0, 1)."));
    }

    let mut rng = StdRng::seed_from_u64(sample_seed(config));
    let level = Normal::new(0.0, LEVEL_SIGMA)
        .map_err(|e| AppError::new(4, format!("Level distribution error: {e}")))?;
    let noise = Normal::new(0.0, config.monthly_noise)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut benchmarks = Vec::with_capacity(SPECIALTIES.len() * MetricKind::ALL.len());
    let mut tier_lists = BTreeMap::new();
    for spec in &SPECIALTIES {
        for metric in MetricKind::ALL {
            let a = match metric {
                MetricKind::Compensation => spec.compensation,
                MetricKind::Productivity => spec.productivity,
                MetricKind::Rate => spec.rate,
            };
            benchmarks.push(BenchmarkRow {
                specialty: spec.name.to_string(),
                metric,
                p25: a[0],
                p50: a[1],
                p75: a[2],
                p90: a[3],
            });
        }
        // Rate steps up as cumulative productivity crosses the median and 75th.
        tier_lists.insert(
            tier_list_name(spec),
            vec![
                Tier { threshold: 0.0, rate: spec.rate[0] },
                Tier { threshold: spec.productivity[1], rate: spec.rate[1] },
                Tier { threshold: spec.productivity[2], rate: spec.rate[2] },
            ],
        );
    }

    let mut providers = Vec::with_capacity(config.providers);
    for i in 0..config.providers {
        let spec = &SPECIALTIES[rng.gen_range(0..SPECIALTIES.len())];
        let fte = FTE_CHOICES[rng.gen_range(0..FTE_CHOICES.len())];
        let factor = level.sample(&mut rng).exp();

        let monthly_median = spec.productivity[1] / MONTHS as f64;
        let productivity: Vec<Option<f64>> = (0..MONTHS)
            .map(|_| {
                let v = monthly_median * fte * factor * (1.0 + noise.sample(&mut rng));
                Some(round_to(v.max(0.0), 1))
            })
            .collect();
        let target = vec![Some(monthly_median.round()); MONTHS];

        let base_salary = (spec.compensation[0] * fte * rng.gen_range(0.85..1.0) / 1_000.0).round() * 1_000.0;

        let roll: f64 = rng.r#gen();
        let model = if roll < 0.6 {
            ModelRow::Flat { rate: spec.rate[1] }
        } else if roll < 0.85 {
            ModelRow::Tiered {
                tier_list: tier_list_name(spec),
                basis: TierBasis::Cumulative,
            }
        } else {
            // Mid-year contract renegotiation: 5% higher rate from July.
            let rates = (0..MONTHS)
                .map(|m| Some(if m < 6 { spec.rate[1] } else { round_to(spec.rate[1] * 1.05, 2) }))
                .collect();
            ModelRow::Custom { rates }
        };

        let mut adjustments = Vec::new();
        if rng.r#gen::<f64>() < 0.3 {
            let mut values = vec![Some(0.0); MONTHS];
            values[rng.gen_range(0..MONTHS)] = Some(round_to(rng.gen_range(20.0..60.0), 1));
            adjustments.push(AdjustmentRow {
                name: "admin credit".to_string(),
                kind: AdjustmentKind::Productivity,
                values,
            });
        }
        if rng.r#gen::<f64>() < 0.4 {
            adjustments.push(AdjustmentRow {
                name: "call coverage".to_string(),
                kind: AdjustmentKind::SupplementalPay,
                values: vec![Some(1_500.0); MONTHS],
            });
        }

        providers.push(ProviderRow {
            id: format!("P{:03}", i + 1),
            name: Some(format!("Provider {:03}", i + 1)),
            specialty: spec.name.to_string(),
            fte: Some(fte),
            base_salary: Some(base_salary),
            productivity: Some(productivity),
            target: Some(target),
            model,
            adjustments,
        });
    }

    Ok(ScenarioFile {
        benchmarks,
        tier_lists,
        providers,
    })
}

fn tier_list_name(spec: &SpecialtyRef) -> String {
    format!("{}-tiers", spec.name.to_lowercase().replace(' ', "-"))
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}

fn sample_seed(config: &SampleConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.seed.hash(&mut hasher);
    config.providers.hash(&mut hasher);
    config.monthly_noise.to_bits().hash(&mut hasher);
    hasher.finish()
}
