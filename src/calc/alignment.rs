//! Pay-for-performance alignment.
//!
//! `gap = compensation_percentile - productivity_percentile`. A provider paid at a
//! higher rank than they produce has a positive gap.

use crate::domain::{AlignmentCategory, AlignmentResult};
use crate::error::{CalcError, ensure_finite};

/// Classify the gap between two percentiles.
///
/// `threshold` is the half-width of the aligned band: `|gap| <= threshold` is
/// `Aligned`. The usual policy value is 15; a report may pass 5 for a "perfect
/// alignment" band without changing anything here.
pub fn classify(
    productivity_percentile: f64,
    compensation_percentile: f64,
    threshold: f64,
) -> Result<AlignmentResult, CalcError> {
    let prod = ensure_finite("productivity_percentile", productivity_percentile)?;
    let comp = ensure_finite("compensation_percentile", compensation_percentile)?;
    let threshold = ensure_finite("alignment_threshold", threshold)?;
    if threshold < 0.0 {
        return Err(CalcError::invalid("alignment_threshold", threshold));
    }

    let gap = comp - prod;
    let category = if gap > threshold {
        AlignmentCategory::OverCompensated
    } else if gap < -threshold {
        AlignmentCategory::UnderCompensated
    } else {
        AlignmentCategory::Aligned
    };

    Ok(AlignmentResult {
        productivity_percentile: prod,
        compensation_percentile: comp,
        gap,
        category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_at_fifteen() {
        assert_eq!(classify(50.0, 65.0, 15.0).unwrap().category, AlignmentCategory::Aligned);
        assert_eq!(classify(50.0, 35.0, 15.0).unwrap().category, AlignmentCategory::Aligned);
        assert_eq!(
            classify(50.0, 65.01, 15.0).unwrap().category,
            AlignmentCategory::OverCompensated
        );
        assert_eq!(
            classify(50.0, 34.99, 15.0).unwrap().category,
            AlignmentCategory::UnderCompensated
        );
    }

    #[test]
    fn gap_is_comp_minus_productivity() {
        let r = classify(70.0, 40.0, 15.0).unwrap();
        assert_eq!(r.gap, -30.0);
        assert_eq!(r.productivity_percentile, 70.0);
        assert_eq!(r.compensation_percentile, 40.0);
        assert_eq!(r.category.label(), "Under-compensated");
    }

    #[test]
    fn tighter_threshold_changes_only_the_band() {
        let wide = classify(50.0, 58.0, 15.0).unwrap();
        let tight = classify(50.0, 58.0, 5.0).unwrap();
        assert_eq!(wide.category, AlignmentCategory::Aligned);
        assert_eq!(tight.category, AlignmentCategory::OverCompensated);
        assert_eq!(wide.gap, tight.gap);
        assert!(!wide.is_within(5.0));
        assert!(classify(50.0, 54.0, 15.0).unwrap().is_within(5.0));
    }

    #[test]
    fn rejects_nan_and_negative_threshold() {
        assert!(classify(f64::NAN, 50.0, 15.0).is_err());
        assert!(classify(50.0, 50.0, -1.0).is_err());
    }
}
