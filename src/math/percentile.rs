//! Piecewise-linear percentile interpolation against a four-anchor benchmark.
//!
//! The curve is split into five segments:
//!
//! ```text
//! [0, p25]     ->  0..25   (ratio to p25)
//! (p25, p50]   -> 25..50
//! (p50, p75]   -> 50..75
//! (p75, p90]   -> 75..90
//! (p90, ...)   -> 90..     (10 points per p90 of excess)
//! ```
//!
//! The p50 anchor always ranks exactly 50, even when a neighbouring anchor
//! shares its value and the segment before it has zero width.
//!
//! `percentile_of` clamps to `[0, 100]` because it reports a rank.
//! `value_at_percentile` does not clamp: it is used to draw the extrapolated curve
//! beyond the anchors, so values near 0 or 100 intentionally leave the anchor range.

use crate::domain::BenchmarkCurve;
use crate::error::{CalcError, ensure_finite};

/// Rank `value` on `curve`, in `[0, 100]`.
pub fn percentile_of(value: f64, curve: &BenchmarkCurve) -> Result<f64, CalcError> {
    let value = ensure_finite("value", value)?;
    let [p25, p50, p75, p90] = curve.anchors();
    if value == p50 {
        return Ok(50.0);
    }

    let raw = if value <= p25 {
        value / nonzero(curve, p25, "p25")? * 25.0
    } else if value <= p50 {
        25.0 + (value - p25) / nonzero(curve, p50 - p25, "p50 - p25")? * 25.0
    } else if value <= p75 {
        50.0 + (value - p50) / nonzero(curve, p75 - p50, "p75 - p50")? * 25.0
    } else if value <= p90 {
        75.0 + (value - p75) / nonzero(curve, p90 - p75, "p90 - p75")? * 15.0
    } else {
        90.0 + (value - p90) / nonzero(curve, p90, "p90")? * 10.0
    };

    Ok(raw.clamp(0.0, 100.0))
}

/// Inverse of `percentile_of` (unclamped).
pub fn value_at_percentile(percentile: f64, curve: &BenchmarkCurve) -> Result<f64, CalcError> {
    let p = ensure_finite("percentile", percentile)?;
    let [p25, p50, p75, p90] = curve.anchors();
    if p25 <= 0.0 {
        return Err(curve.malformed("p25 must be > 0"));
    }

    let value = if p <= 25.0 {
        p / 25.0 * p25
    } else if p <= 50.0 {
        p25 + (p - 25.0) / 25.0 * (p50 - p25)
    } else if p <= 75.0 {
        p50 + (p - 50.0) / 25.0 * (p75 - p50)
    } else if p <= 90.0 {
        p75 + (p - 75.0) / 15.0 * (p90 - p75)
    } else {
        p90 + (p - 90.0) / 10.0 * p90
    };

    Ok(value)
}

/// Sample the inverse on `steps` evenly spaced percentiles over `0..=100`.
///
/// Returns `(percentiles, values)` for chart collaborators.
pub fn curve_grid(curve: &BenchmarkCurve, steps: usize) -> Result<(Vec<f64>, Vec<f64>), CalcError> {
    let n = steps.max(2);
    let mut percentiles = Vec::with_capacity(n);
    let mut values = Vec::with_capacity(n);
    for i in 0..n {
        let p = 100.0 * i as f64 / (n as f64 - 1.0);
        percentiles.push(p);
        values.push(value_at_percentile(p, curve)?);
    }
    Ok((percentiles, values))
}

fn nonzero(curve: &BenchmarkCurve, denom: f64, what: &str) -> Result<f64, CalcError> {
    if denom > 0.0 {
        Ok(denom)
    } else {
        Err(curve.malformed(format!("zero-width segment ({what} = {denom})")))
    }
}
