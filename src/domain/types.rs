//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built once at the ingest boundary (where the default-value policy lives)
//! - passed by reference through the pure calculation pipeline
//! - exported to JSON/CSV for display collaborators

use std::fmt;
use std::path::PathBuf;

use chrono::Month;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, ensure_finite};

/// Number of months in a compensation year.
pub const MONTHS: usize = 12;

/// Three-letter label for a zero-based month index (`0 => "Jan"`).
pub fn month_label(index: usize) -> &'static str {
    u8::try_from(index + 1)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| &m.name()[..3])
        .unwrap_or("???")
}

/// Which market benchmark a curve describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Annual total compensation (currency).
    Compensation,
    /// Annual productivity units (wRVUs).
    Productivity,
    /// Compensation per productivity unit (currency / wRVU).
    Rate,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] = [
        MetricKind::Compensation,
        MetricKind::Productivity,
        MetricKind::Rate,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            MetricKind::Compensation => "compensation",
            MetricKind::Productivity => "productivity",
            MetricKind::Rate => "rate",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Twelve ordered monthly values. YTD is always derived, never stored.
///
/// Every value is finite. Constructors and the arithmetic helpers below all
/// check, so an overflow surfaces as `InvalidNumericInput` naming the month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct MonthlySeries {
    values: [f64; MONTHS],
}

impl MonthlySeries {
    pub fn new(values: [f64; MONTHS]) -> Result<Self, CalcError> {
        Self::named("series", values)
    }

    /// Like `new`, but reports `field` in the error for a non-finite month.
    pub fn named(field: &str, values: [f64; MONTHS]) -> Result<Self, CalcError> {
        for (idx, v) in values.iter().enumerate() {
            if !v.is_finite() {
                return Err(CalcError::invalid(
                    format!("{field}[{}]", month_label(idx)),
                    *v,
                ));
            }
        }
        Ok(Self { values })
    }

    pub fn from_slice(field: &str, values: &[f64]) -> Result<Self, CalcError> {
        let arr: [f64; MONTHS] = values.try_into().map_err(|_| CalcError::SeriesLength {
            field: field.to_string(),
            len: values.len(),
        })?;
        Self::named(field, arr)
    }

    /// Apply the boundary default policy: a missing month is `0.0`.
    pub fn from_optional(field: &str, values: &[Option<f64>]) -> Result<Self, CalcError> {
        let filled: Vec<f64> = values.iter().map(|v| v.unwrap_or(0.0)).collect();
        Self::from_slice(field, &filled)
    }

    pub fn constant(value: f64) -> Result<Self, CalcError> {
        Self::new([value; MONTHS])
    }

    pub fn zeros() -> Self {
        Self {
            values: [0.0; MONTHS],
        }
    }

    pub fn values(&self) -> &[f64; MONTHS] {
        &self.values
    }

    pub fn get(&self, month: usize) -> f64 {
        self.values[month]
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn ytd(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Cumulative sum: element `m` is the sum of months `0..=m`.
    pub fn running(&self, field: &str) -> Result<MonthlySeries, CalcError> {
        let mut out = [0.0; MONTHS];
        let mut acc = 0.0;
        for (m, v) in self.values.iter().enumerate() {
            acc += v;
            out[m] = acc;
        }
        Self::named(field, out)
    }

    pub fn scale(&self, field: &str, factor: f64) -> Result<MonthlySeries, CalcError> {
        Self::named(field, self.values.map(|v| v * factor))
    }

    pub fn zip_with(
        &self,
        field: &str,
        other: &MonthlySeries,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<MonthlySeries, CalcError> {
        let mut out = [0.0; MONTHS];
        for (m, slot) in out.iter_mut().enumerate() {
            *slot = f(self.values[m], other.values[m]);
        }
        Self::named(field, out)
    }
}

impl TryFrom<Vec<f64>> for MonthlySeries {
    type Error = CalcError;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_slice("series", &value)
    }
}

impl From<MonthlySeries> for Vec<f64> {
    fn from(value: MonthlySeries) -> Self {
        value.values.to_vec()
    }
}

/// A four-anchor market curve (25th/50th/75th/90th percentiles).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkCurve {
    pub specialty: String,
    pub metric: MetricKind,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

impl BenchmarkCurve {
    /// Build a validated curve.
    ///
    /// Anchors must be finite, non-decreasing, and `p25 > 0` (it is the divisor of
    /// the lowest interpolation segment).
    pub fn new(
        specialty: impl Into<String>,
        metric: MetricKind,
        anchors: [f64; 4],
    ) -> Result<Self, CalcError> {
        let specialty = specialty.into();
        let malformed = |reason: String| CalcError::MalformedBenchmark {
            specialty: specialty.clone(),
            metric,
            reason,
        };

        if anchors.iter().any(|a| !a.is_finite()) {
            return Err(malformed(format!("non-finite anchor in {anchors:?}")));
        }
        if anchors[0] <= 0.0 {
            return Err(malformed(format!("p25 must be > 0, got {}", anchors[0])));
        }
        for w in anchors.windows(2) {
            if w[1] < w[0] {
                return Err(malformed(format!("anchors must be non-decreasing: {anchors:?}")));
            }
        }

        let [p25, p50, p75, p90] = anchors;
        Ok(Self {
            specialty,
            metric,
            p25,
            p50,
            p75,
            p90,
        })
    }

    pub fn anchors(&self) -> [f64; 4] {
        [self.p25, self.p50, self.p75, self.p90]
    }

    pub(crate) fn malformed(&self, reason: impl Into<String>) -> CalcError {
        CalcError::MalformedBenchmark {
            specialty: self.specialty.clone(),
            metric: self.metric,
            reason: reason.into(),
        }
    }
}

/// One `{threshold, rate}` step of a tiered model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Cumulative productivity at which this tier starts (inclusive).
    pub threshold: f64,
    /// Conversion rate (currency per unit) inside this tier.
    pub rate: f64,
}

/// Ordered tiers: first threshold is 0, thresholds strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierList {
    tiers: Vec<Tier>,
}

impl TierList {
    pub fn new(tiers: Vec<Tier>) -> Result<Self, CalcError> {
        let Some(first) = tiers.first() else {
            return Err(CalcError::MalformedTierList("tier list is empty".to_string()));
        };
        if first.threshold != 0.0 {
            return Err(CalcError::MalformedTierList(format!(
                "first threshold must be 0, got {}",
                first.threshold
            )));
        }
        for tier in &tiers {
            if !(tier.threshold.is_finite() && tier.rate.is_finite() && tier.rate >= 0.0) {
                return Err(CalcError::MalformedTierList(format!(
                    "invalid tier {{threshold={}, rate={}}}",
                    tier.threshold, tier.rate
                )));
            }
        }
        for w in tiers.windows(2) {
            if w[1].threshold <= w[0].threshold {
                return Err(CalcError::MalformedTierList(format!(
                    "thresholds must be strictly increasing ({} then {})",
                    w[0].threshold, w[1].threshold
                )));
            }
        }
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }
}

/// Which productivity value selects the tier for a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierBasis {
    /// Running YTD productivity through the month.
    #[default]
    Cumulative,
    /// That month's productivity alone.
    Monthly,
}

/// How positive variance converts to incentive dollars.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CompensationModel {
    Flat { rate: f64 },
    Tiered { tiers: TierList, basis: TierBasis },
    /// Negotiated per-month rate schedule.
    Custom { rates: MonthlySeries },
}

impl CompensationModel {
    pub fn label(&self) -> &'static str {
        match self {
            CompensationModel::Flat { .. } => "flat",
            CompensationModel::Tiered { .. } => "tiered",
            CompensationModel::Custom { .. } => "custom",
        }
    }
}

/// Discriminant of `Adjustment`, used by ingest and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    Productivity,
    Target,
    SupplementalPay,
}

/// A named monthly contribution attached to a provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Adjustment {
    /// Added to the productivity series (e.g. credit for teaching time).
    Productivity { name: String, values: MonthlySeries },
    /// Added to the target series.
    Target { name: String, values: MonthlySeries },
    /// Extra pay (call coverage, stipends) added to total compensation.
    SupplementalPay { name: String, values: MonthlySeries },
}

impl Adjustment {
    pub fn new(kind: AdjustmentKind, name: impl Into<String>, values: MonthlySeries) -> Self {
        let name = name.into();
        match kind {
            AdjustmentKind::Productivity => Adjustment::Productivity { name, values },
            AdjustmentKind::Target => Adjustment::Target { name, values },
            AdjustmentKind::SupplementalPay => Adjustment::SupplementalPay { name, values },
        }
    }

    pub fn kind(&self) -> AdjustmentKind {
        match self {
            Adjustment::Productivity { .. } => AdjustmentKind::Productivity,
            Adjustment::Target { .. } => AdjustmentKind::Target,
            Adjustment::SupplementalPay { .. } => AdjustmentKind::SupplementalPay,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Adjustment::Productivity { name, .. }
            | Adjustment::Target { name, .. }
            | Adjustment::SupplementalPay { name, .. } => name,
        }
    }

    pub fn values(&self) -> &MonthlySeries {
        match self {
            Adjustment::Productivity { values, .. }
            | Adjustment::Target { values, .. }
            | Adjustment::SupplementalPay { values, .. } => values,
        }
    }
}

/// Everything the engine needs about one provider, already normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderRecord {
    pub id: String,
    pub name: String,
    pub specialty: String,
    /// Clinical full-time equivalent (1.0 = full time).
    pub fte: f64,
    /// Annual guaranteed base salary.
    pub base_salary: f64,
    pub productivity: MonthlySeries,
    /// Full-time target; scaled by `fte` during aggregation.
    pub target: MonthlySeries,
    pub model: CompensationModel,
    pub adjustments: Vec<Adjustment>,
}

impl ProviderRecord {
    pub fn validate(&self) -> Result<(), CalcError> {
        let fte = ensure_finite("fte", self.fte)?;
        if !(fte > 0.0 && fte <= 2.0) {
            return Err(CalcError::invalid("fte", fte));
        }
        let salary = ensure_finite("base_salary", self.base_salary)?;
        if salary < 0.0 {
            return Err(CalcError::invalid("base_salary", salary));
        }
        if let CompensationModel::Flat { rate } = self.model {
            let rate = ensure_finite("rate", rate)?;
            if rate < 0.0 {
                return Err(CalcError::invalid("rate", rate));
            }
        }
        Ok(())
    }
}

/// Relationship between compensation rank and productivity rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentCategory {
    Aligned,
    OverCompensated,
    UnderCompensated,
}

impl AlignmentCategory {
    pub fn label(self) -> &'static str {
        match self {
            AlignmentCategory::Aligned => "Aligned",
            AlignmentCategory::OverCompensated => "Over-compensated",
            AlignmentCategory::UnderCompensated => "Under-compensated",
        }
    }
}

/// Derived classification; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignmentResult {
    pub productivity_percentile: f64,
    pub compensation_percentile: f64,
    /// `compensation_percentile - productivity_percentile`.
    pub gap: f64,
    pub category: AlignmentCategory,
}

impl AlignmentResult {
    /// True when `|gap| <= band` (e.g. the ±5 "perfect alignment" band).
    pub fn is_within(&self, band: f64) -> bool {
        self.gap.abs() <= band
    }
}

/// Policy values that would otherwise be global constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Fraction of earned incentive withheld (0.0..=1.0).
    pub holdback_fraction: f64,
    /// Percentile-point gap still considered aligned.
    pub alignment_threshold: f64,
    /// Tighter band flagged as "perfect" alignment in reports.
    pub perfect_alignment_band: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            holdback_fraction: 0.20,
            alignment_threshold: 15.0,
            perfect_alignment_band: 5.0,
        }
    }
}

impl PolicyConfig {
    pub fn validate(&self) -> Result<(), CalcError> {
        let h = ensure_finite("holdback_fraction", self.holdback_fraction)?;
        if !(0.0..=1.0).contains(&h) {
            return Err(CalcError::invalid("holdback_fraction", h));
        }
        let t = ensure_finite("alignment_threshold", self.alignment_threshold)?;
        if t < 0.0 {
            return Err(CalcError::invalid("alignment_threshold", t));
        }
        let b = ensure_finite("perfect_alignment_band", self.perfect_alignment_band)?;
        if b < 0.0 {
            return Err(CalcError::invalid("perfect_alignment_band", b));
        }
        Ok(())
    }
}

/// A full `compdash run` configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus `.env` / environment defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub scenario_path: PathBuf,
    /// Only show month-by-month detail for this provider id.
    pub provider: Option<String>,
    pub policy: PolicyConfig,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}
