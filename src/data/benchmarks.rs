//! Benchmark registry: specialty × metric → curve.
//!
//! Specialty names are matched case-insensitively after trimming, so
//! `"Cardiology"` and `" cardiology "` find the same curve.
//!
//! A curve that failed validation at ingest is remembered, so a lookup reports
//! `MalformedBenchmark` rather than `MissingBenchmark` for it.

use std::collections::HashMap;

use crate::domain::{BenchmarkCurve, MetricKind};
use crate::error::CalcError;
use crate::math::percentile_of;

type Key = (String, MetricKind);

fn key(specialty: &str, metric: MetricKind) -> Key {
    (specialty.trim().to_lowercase(), metric)
}

#[derive(Debug, Clone, Default)]
pub struct BenchmarkSet {
    curves: HashMap<Key, BenchmarkCurve>,
    rejected: HashMap<Key, CalcError>,
}

impl BenchmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_curves(curves: impl IntoIterator<Item = BenchmarkCurve>) -> Self {
        let mut set = Self::new();
        for curve in curves {
            set.insert(curve);
        }
        set
    }

    /// Add or replace a validated curve.
    pub fn insert(&mut self, curve: BenchmarkCurve) {
        let k = key(&curve.specialty, curve.metric);
        self.rejected.remove(&k);
        self.curves.insert(k, curve);
    }

    /// Remember that the curve for `specialty`/`metric` was malformed.
    pub fn reject(&mut self, specialty: &str, metric: MetricKind, err: CalcError) {
        let k = key(specialty, metric);
        self.curves.remove(&k);
        self.rejected.insert(k, err);
    }

    pub fn lookup(&self, specialty: &str, metric: MetricKind) -> Result<&BenchmarkCurve, CalcError> {
        let k = key(specialty, metric);
        if let Some(curve) = self.curves.get(&k) {
            return Ok(curve);
        }
        if let Some(err) = self.rejected.get(&k) {
            return Err(err.clone());
        }
        Err(CalcError::MissingBenchmark {
            specialty: specialty.to_string(),
            metric,
        })
    }

    /// Rank `value` against the `specialty`/`metric` curve.
    pub fn percentile(&self, specialty: &str, metric: MetricKind, value: f64) -> Result<f64, CalcError> {
        percentile_of(value, self.lookup(specialty, metric)?)
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    /// Curves sorted by specialty then metric (stable output for reports).
    pub fn curves(&self) -> Vec<&BenchmarkCurve> {
        let mut out: Vec<&BenchmarkCurve> = self.curves.values().collect();
        out.sort_by(|a, b| {
            a.specialty
                .cmp(&b.specialty)
                .then_with(|| a.metric.display_name().cmp(b.metric.display_name()))
        });
        out
    }
}
