//! Productivity aggregation.
//!
//! Totals are always rebuilt from the base series and the full adjustment list.
//! There is no incremental add/remove path, so a displayed total can never drift
//! from the inputs it was derived from.

use serde::Serialize;

use crate::domain::{AdjustmentKind, MonthlySeries, ProviderRecord};
use crate::error::{CalcError, ensure_finite};

/// A combined series and its year-to-date sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aggregate {
    pub total: MonthlySeries,
    pub ytd: f64,
}

/// `total[m] = base[m] + Σ adjustments[i][m]`; `ytd = Σ total[m]`.
pub fn aggregate<'a, I>(base: &MonthlySeries, adjustments: I) -> Result<Aggregate, CalcError>
where
    I: IntoIterator<Item = &'a MonthlySeries>,
{
    let mut total = *base.values();
    for adj in adjustments {
        for (m, slot) in total.iter_mut().enumerate() {
            *slot += adj.get(m);
        }
    }
    let total = MonthlySeries::named("total", total)?;
    Ok(Aggregate {
        ytd: ensure_finite("ytd", total.ytd())?,
        total,
    })
}

/// Per-month `total - target_total`. The YTD of the result is its own sum.
pub fn variance(total: &MonthlySeries, target_total: &MonthlySeries) -> Result<MonthlySeries, CalcError> {
    total.zip_with("variance", target_total, |a, b| a - b)
}

/// Everything derived from one provider's series and adjustments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductivityLedger {
    /// Base productivity plus productivity adjustments.
    pub productivity: Aggregate,
    /// FTE-scaled base target plus target adjustments.
    pub target: Aggregate,
    /// Sum of supplemental-pay adjustments (currency).
    pub supplemental: Aggregate,
    /// `productivity.total - target.total`.
    pub variance: MonthlySeries,
}

impl ProductivityLedger {
    pub fn variance_ytd(&self) -> f64 {
        self.variance.ytd()
    }
}

/// Build the ledger for one provider from a full snapshot of its inputs.
pub fn aggregate_provider(record: &ProviderRecord) -> Result<ProductivityLedger, CalcError> {
    record.validate()?;

    let of_kind = |kind: AdjustmentKind| {
        record
            .adjustments
            .iter()
            .filter(move |a| a.kind() == kind)
            .map(|a| a.values())
    };

    let productivity = aggregate(&record.productivity, of_kind(AdjustmentKind::Productivity))?;
    let target = aggregate(
        &record.target.scale("target", record.fte)?,
        of_kind(AdjustmentKind::Target),
    )?;
    let supplemental = aggregate(
        &MonthlySeries::zeros(),
        of_kind(AdjustmentKind::SupplementalPay),
    )?;
    let variance = variance(&productivity.total, &target.total)?;

    Ok(ProductivityLedger {
        productivity,
        target,
        supplemental,
        variance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Adjustment, CompensationModel, MONTHS};

    fn record_with(adjustments: Vec<Adjustment>) -> ProviderRecord {
        ProviderRecord {
            id: "P001".to_string(),
            name: "Dr. Example".to_string(),
            specialty: "Family Medicine".to_string(),
            fte: 1.0,
            base_salary: 240_000.0,
            productivity: MonthlySeries::constant(400.0).unwrap(),
            target: MonthlySeries::constant(417.0).unwrap(),
            model: CompensationModel::Flat { rate: 45.0 },
            adjustments,
        }
    }

    fn january_only(v: f64) -> MonthlySeries {
        let mut values = [0.0; MONTHS];
        values[0] = v;
        MonthlySeries::new(values).unwrap()
    }

    #[test]
    fn credit_in_january() {
        let base = MonthlySeries::constant(400.0).unwrap();
        assert_eq!(base.ytd(), 4800.0);

        let credit = january_only(50.0);
        assert_eq!(credit.ytd(), 50.0);

        let agg = aggregate(&base, [&credit]).unwrap();
        assert_eq!(agg.total.get(0), 450.0);
        assert_eq!(agg.total.get(1), 400.0);
        assert_eq!(agg.ytd, 4850.0);

        let target = MonthlySeries::constant(417.0).unwrap();
        assert_eq!(target.ytd(), 5004.0);

        let var = variance(&agg.total, &target).unwrap();
        assert_eq!(var.get(0), 33.0);
        assert_eq!(var.get(1), -17.0);
        assert_eq!(var.ytd(), -154.0);
    }

    #[test]
    fn total_is_exact_sum_of_inputs() {
        let base = MonthlySeries::new([
            310.0, 295.5, 402.0, 388.25, 360.0, 341.0, 299.0, 410.0, 377.0, 365.5, 350.0, 402.75,
        ])
        .unwrap();
        let a = MonthlySeries::constant(12.5).unwrap();
        let b = january_only(-40.0);
        let agg = aggregate(&base, [&a, &b]).unwrap();
        for m in 0..MONTHS {
            assert_eq!(agg.total.get(m), base.get(m) + a.get(m) + b.get(m));
        }
        assert_eq!(agg.ytd, agg.total.iter().sum::<f64>());
    }

    #[test]
    fn no_adjustments_returns_base() {
        let base = MonthlySeries::constant(3.0).unwrap();
        let agg = aggregate(&base, std::iter::empty()).unwrap();
        assert_eq!(agg.total, base);
        assert_eq!(agg.ytd, 36.0);
    }

    #[test]
    fn provider_ledger_routes_adjustments_by_kind() {
        let record = record_with(vec![
            Adjustment::Productivity {
                name: "credit".to_string(),
                values: january_only(50.0),
            },
            Adjustment::Target {
                name: "leave".to_string(),
                values: january_only(-17.0),
            },
            Adjustment::SupplementalPay {
                name: "call coverage".to_string(),
                values: MonthlySeries::constant(1_000.0).unwrap(),
            },
        ]);

        let ledger = aggregate_provider(&record).unwrap();
        assert_eq!(ledger.productivity.total.get(0), 450.0);
        assert_eq!(ledger.target.total.get(0), 400.0);
        assert_eq!(ledger.variance.get(0), 50.0);
        assert_eq!(ledger.supplemental.ytd, 12_000.0);
    }

    #[test]
    fn target_scales_with_fte() {
        let mut record = record_with(Vec::new());
        record.fte = 0.5;
        let ledger = aggregate_provider(&record).unwrap();
        assert_eq!(ledger.target.total.get(0), 208.5);
        assert_eq!(ledger.variance.get(0), 191.5);
    }

    #[test]
    fn removing_an_adjustment_recomputes_from_scratch() {
        let with = aggregate_provider(&record_with(vec![Adjustment::Productivity {
            name: "credit".to_string(),
            values: january_only(50.0),
        }]))
        .unwrap();
        let without = aggregate_provider(&record_with(Vec::new())).unwrap();
        assert_eq!(with.productivity.ytd - 50.0, without.productivity.ytd);
        assert_eq!(without.productivity.total, MonthlySeries::constant(400.0).unwrap());
    }

    #[test]
    fn invalid_fte_fails_the_provider() {
        let mut record = record_with(Vec::new());
        record.fte = 0.0;
        assert!(matches!(
            aggregate_provider(&record),
            Err(CalcError::InvalidNumericInput { .. })
        ));
    }
}
