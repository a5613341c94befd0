//! Tiered conversion-factor resolution.
//!
//! A tier applies from its threshold (inclusive) up to the next tier's threshold
//! (exclusive). A value landing exactly on a threshold therefore pays that tier's
//! rate, not the one below. Values below zero fall into the base tier.
//!
//! The list is already validated and sorted by `TierList::new`; this module never
//! sorts.

use crate::domain::TierList;
use crate::error::{CalcError, ensure_finite};

/// Rate of the tier with the greatest threshold `<= cumulative_value`.
pub fn resolve(cumulative_value: f64, tiers: &TierList) -> Result<f64, CalcError> {
    let value = ensure_finite("cumulative_value", cumulative_value)?;
    let tiers = tiers.tiers();
    let Some(base) = tiers.first() else {
        return Err(CalcError::MalformedTierList("tier list is empty".to_string()));
    };

    // Number of tiers whose threshold is <= value; thresholds are sorted.
    let idx = tiers.partition_point(|t| t.threshold <= value);
    Ok(match idx {
        0 => base.rate,
        n => tiers[n - 1].rate,
    })
}
