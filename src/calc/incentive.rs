//! Incentive and total-compensation calculation.
//!
//! Per month:
//!
//! ```text
//! incentive = max(variance, 0) * rate(m)
//! holdback  = incentive * holdback_fraction
//! net       = incentive * (1 - holdback_fraction)
//! ```
//!
//! Negative variance floors at zero incentive; it is never a penalty.
//!
//! `rate(m)` depends on the compensation model:
//! - flat: the single rate
//! - tiered: `math::tiers::resolve` on the month's or the cumulative productivity
//! - custom: the scheduled rate for month `m`

use serde::Serialize;

use crate::calc::aggregate::ProductivityLedger;
use crate::domain::{CompensationModel, MONTHS, MonthlySeries, ProviderRecord, TierBasis};
use crate::error::{CalcError, ensure_finite};
use crate::math::resolve;

/// One month's incentive split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyIncentive {
    pub incentive: f64,
    pub holdback: f64,
    pub net: f64,
}

/// Incentive for a single month.
pub fn monthly_incentive(
    variance: f64,
    rate: f64,
    holdback_fraction: f64,
) -> Result<MonthlyIncentive, CalcError> {
    let variance = ensure_finite("variance", variance)?;
    let rate = ensure_finite("rate", rate)?;
    let fraction = checked_fraction(holdback_fraction)?;

    let incentive = if variance > 0.0 { variance * rate } else { 0.0 };
    Ok(MonthlyIncentive {
        incentive,
        holdback: incentive * fraction,
        net: incentive * (1.0 - fraction),
    })
}

/// Full-year incentive schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncentiveSchedule {
    /// Effective conversion rate used each month.
    pub rates: MonthlySeries,
    pub incentive: MonthlySeries,
    pub holdback: MonthlySeries,
    pub net: MonthlySeries,
    /// Cumulative `net` through each month.
    pub ytd_running: MonthlySeries,
    pub total_ytd: f64,
}

/// Effective per-month conversion rate for `model`.
///
/// `productivity` is only consulted by tiered models.
pub fn effective_rates(
    model: &CompensationModel,
    productivity: &MonthlySeries,
) -> Result<MonthlySeries, CalcError> {
    match model {
        CompensationModel::Flat { rate } => {
            let rate = ensure_finite("rate", *rate)?;
            if rate < 0.0 {
                return Err(CalcError::invalid("rate", rate));
            }
            MonthlySeries::constant(rate)
        }
        CompensationModel::Tiered { tiers, basis } => {
            let basis_values = match basis {
                TierBasis::Cumulative => productivity.running("cumulative_productivity")?,
                TierBasis::Monthly => *productivity,
            };
            let mut rates = [0.0; MONTHS];
            for (m, slot) in rates.iter_mut().enumerate() {
                *slot = resolve(basis_values.get(m), tiers)?;
            }
            MonthlySeries::named("rates", rates)
        }
        CompensationModel::Custom { rates } => {
            if let Some(bad) = rates.iter().find(|r| *r < 0.0) {
                return Err(CalcError::invalid("rates", bad));
            }
            Ok(*rates)
        }
    }
}

/// Convert variance into incentive, holdback, net and running YTD.
///
/// Inputs are finite by construction, so the only month-level failure left is
/// overflow; it fails the provider's whole schedule, naming the month.
pub fn compute_incentives(
    variance: &MonthlySeries,
    model: &CompensationModel,
    holdback_fraction: f64,
    productivity: &MonthlySeries,
) -> Result<IncentiveSchedule, CalcError> {
    let rates = effective_rates(model, productivity)?;

    let mut incentive = [0.0; MONTHS];
    let mut holdback = [0.0; MONTHS];
    let mut net = [0.0; MONTHS];
    for m in 0..MONTHS {
        let month = monthly_incentive(variance.get(m), rates.get(m), holdback_fraction)?;
        incentive[m] = month.incentive;
        holdback[m] = month.holdback;
        net[m] = month.net;
    }

    let incentive = MonthlySeries::named("incentive", incentive)?;
    let holdback = MonthlySeries::named("holdback", holdback)?;
    let net = MonthlySeries::named("net", net)?;
    Ok(IncentiveSchedule {
        rates,
        incentive,
        holdback,
        ytd_running: net.running("net_ytd")?,
        total_ytd: ensure_finite("net_ytd", net.ytd())?,
        net,
    })
}

/// Monthly and annual pay for one provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompensationSummary {
    pub base_monthly: f64,
    pub incentives: IncentiveSchedule,
    /// Supplemental pay per month (sum of all supplemental adjustments).
    pub supplemental: MonthlySeries,
    /// `base_salary / 12 + net[m] + supplemental[m]`.
    pub monthly_total: MonthlySeries,
    /// `base_salary + total_ytd + supplemental ytd`.
    pub annual_total: f64,
}

/// Assemble compensation for `record` from its already-built ledger.
pub fn compensate(
    record: &ProviderRecord,
    ledger: &ProductivityLedger,
    holdback_fraction: f64,
) -> Result<CompensationSummary, CalcError> {
    let base_salary = ensure_finite("base_salary", record.base_salary)?;
    let incentives = compute_incentives(
        &ledger.variance,
        &record.model,
        holdback_fraction,
        &ledger.productivity.total,
    )?;

    let base_monthly = base_salary / MONTHS as f64;
    let supplemental = ledger.supplemental.total;
    let monthly_total = incentives
        .net
        .zip_with("total_comp", &supplemental, |net, supp| base_monthly + net + supp)?;
    let annual_total = ensure_finite(
        "annual_total",
        base_salary + incentives.total_ytd + supplemental.ytd(),
    )?;

    Ok(CompensationSummary {
        base_monthly,
        incentives,
        supplemental,
        monthly_total,
        annual_total,
    })
}

fn checked_fraction(fraction: f64) -> Result<f64, CalcError> {
    let fraction = ensure_finite("holdback_fraction", fraction)?;
    if (0.0..=1.0).contains(&fraction) {
        Ok(fraction)
    } else {
        Err(CalcError::invalid("holdback_fraction", fraction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::aggregate::aggregate_provider;
    use crate::domain::{Adjustment, Tier, TierList};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn thirty_three_units_at_forty_five() {
        let m = monthly_incentive(33.0, 45.0, 0.20).unwrap();
        assert!(close(m.incentive, 1485.0));
        assert!(close(m.holdback, 297.0));
        assert!(close(m.net, 1188.0));
        assert_eq!(m.net, m.incentive * 0.80);
    }

    #[test]
    fn net_is_exactly_eighty_percent_at_default_holdback() {
        for rate in [45.0, 52.37, 61.1, 0.01] {
            for k in 1..2000 {
                let m = monthly_incentive(0.37 * k as f64, rate, 0.20).unwrap();
                assert_eq!(m.net, m.incentive * 0.80, "variance {} rate {rate}", 0.37 * k as f64);
                assert_eq!(m.holdback, m.incentive * 0.20);
            }
        }
    }

    #[test]
    fn overflowing_month_is_reported_by_name() {
        let mut values = [1.0; MONTHS];
        values[2] = f64::MAX;
        let variance = MonthlySeries::new(values).unwrap();
        let model = CompensationModel::Flat { rate: 45.0 };
        let err = compute_incentives(&variance, &model, 0.20, &MonthlySeries::zeros()).unwrap_err();
        assert!(matches!(
            err,
            CalcError::InvalidNumericInput { ref field, .. } if field == "incentive[Mar]"
        ));
    }

    #[test]
    fn negative_variance_floors_at_zero() {
        for v in [0.0, -0.01, -154.0] {
            let m = monthly_incentive(v, 45.0, 0.20).unwrap();
            assert_eq!(m.incentive, 0.0);
            assert_eq!(m.holdback, 0.0);
            assert_eq!(m.net, 0.0);
        }
    }

    #[test]
    fn holdback_fraction_is_a_parameter() {
        let none = monthly_incentive(10.0, 50.0, 0.0).unwrap();
        assert_eq!(none.net, 500.0);
        let all = monthly_incentive(10.0, 50.0, 1.0).unwrap();
        assert_eq!(all.net, 0.0);
        assert!(monthly_incentive(10.0, 50.0, 1.2).is_err());
        assert!(monthly_incentive(10.0, 50.0, f64::NAN).is_err());
    }

    #[test]
    fn running_ytd_accumulates_net() {
        let variance = MonthlySeries::new([
            33.0, -17.0, 10.0, 0.0, 20.0, -5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0,
        ])
        .unwrap();
        let model = CompensationModel::Flat { rate: 45.0 };
        let sched = compute_incentives(&variance, &model, 0.20, &MonthlySeries::zeros()).unwrap();

        assert!(close(sched.net.get(0), 1188.0));
        assert_eq!(sched.incentive.get(1), 0.0);
        assert!(close(sched.ytd_running.get(1), 1188.0));
        assert!(close(sched.ytd_running.get(2), 1188.0 + 360.0));
        assert!(close(sched.ytd_running.get(11), sched.total_ytd));
        assert!(close(sched.total_ytd, (33.0 + 10.0 + 20.0 + 1.0) * 45.0 * 0.8));
        for m in 0..MONTHS {
            assert!(sched.incentive.get(m) >= 0.0);
        }
    }

    #[test]
    fn tiered_cumulative_rate_steps_up_mid_year() {
        let tiers = TierList::new(vec![
            Tier { threshold: 0.0, rate: 40.0 },
            Tier { threshold: 2_000.0, rate: 50.0 },
        ])
        .unwrap();
        let model = CompensationModel::Tiered {
            tiers,
            basis: TierBasis::Cumulative,
        };
        let productivity = MonthlySeries::constant(500.0).unwrap();
        let rates = effective_rates(&model, &productivity).unwrap();
        // Running totals: 500, 1000, 1500, 2000 (boundary), ...
        assert_eq!(rates.get(0), 40.0);
        assert_eq!(rates.get(2), 40.0);
        assert_eq!(rates.get(3), 50.0);
        assert_eq!(rates.get(11), 50.0);
    }

    #[test]
    fn tiered_monthly_rate_uses_each_month() {
        let tiers = TierList::new(vec![
            Tier { threshold: 0.0, rate: 40.0 },
            Tier { threshold: 450.0, rate: 50.0 },
        ])
        .unwrap();
        let model = CompensationModel::Tiered {
            tiers,
            basis: TierBasis::Monthly,
        };
        let mut values = [400.0; MONTHS];
        values[5] = 450.0;
        let productivity = MonthlySeries::new(values).unwrap();
        let rates = effective_rates(&model, &productivity).unwrap();
        assert_eq!(rates.get(0), 40.0);
        assert_eq!(rates.get(5), 50.0);
    }

    #[test]
    fn custom_schedule_is_used_as_is() {
        let mut values = [45.0; MONTHS];
        values[6] = 55.0;
        let rates = MonthlySeries::new(values).unwrap();
        let model = CompensationModel::Custom { rates };
        let variance = MonthlySeries::constant(10.0).unwrap();
        let sched = compute_incentives(&variance, &model, 0.0, &MonthlySeries::zeros()).unwrap();
        assert_eq!(sched.incentive.get(0), 450.0);
        assert_eq!(sched.incentive.get(6), 550.0);
    }

    #[test]
    fn total_compensation_includes_base_and_supplemental() {
        let mut months = [400.0; MONTHS];
        months[0] = 450.0;
        let record = ProviderRecord {
            id: "P001".to_string(),
            name: "Dr. Example".to_string(),
            specialty: "Family Medicine".to_string(),
            fte: 1.0,
            base_salary: 240_000.0,
            productivity: MonthlySeries::new(months).unwrap(),
            target: MonthlySeries::constant(417.0).unwrap(),
            model: CompensationModel::Flat { rate: 45.0 },
            adjustments: vec![Adjustment::SupplementalPay {
                name: "call".to_string(),
                values: MonthlySeries::constant(500.0).unwrap(),
            }],
        };
        let ledger = aggregate_provider(&record).unwrap();
        let comp = compensate(&record, &ledger, 0.20).unwrap();

        assert_eq!(comp.base_monthly, 20_000.0);
        assert!(close(comp.monthly_total.get(0), 20_000.0 + 1188.0 + 500.0));
        assert!(close(comp.monthly_total.get(1), 20_500.0));
        assert!(close(comp.annual_total, 240_000.0 + 1188.0 + 6_000.0));
        assert!(close(comp.monthly_total.ytd(), comp.annual_total));
    }

    #[test]
    fn overflowing_total_comp_is_an_error() {
        let record = ProviderRecord {
            id: "P009".to_string(),
            name: "Dr. Overflow".to_string(),
            specialty: "Family Medicine".to_string(),
            fte: 1.0,
            base_salary: f64::MAX,
            productivity: MonthlySeries::zeros(),
            target: MonthlySeries::zeros(),
            model: CompensationModel::Flat { rate: 45.0 },
            adjustments: vec![Adjustment::SupplementalPay {
                name: "call".to_string(),
                values: MonthlySeries::constant(f64::MAX).unwrap(),
            }],
        };
        // Supplemental YTD already overflows while building the ledger.
        assert!(aggregate_provider(&record).is_err());

        let ledger = ProductivityLedger {
            supplemental: crate::calc::aggregate::Aggregate {
                total: MonthlySeries::constant(f64::MAX).unwrap(),
                ytd: 0.0,
            },
            ..aggregate_provider(&ProviderRecord {
                adjustments: Vec::new(),
                ..record.clone()
            })
            .unwrap()
        };
        let err = compensate(&record, &ledger, 0.20).unwrap_err();
        assert!(matches!(
            err,
            CalcError::InvalidNumericInput { ref field, .. } if field.starts_with("total_comp[")
        ));
    }
}
