//! Benchmark curve grid export.
//!
//! The grid is the "portable" representation of a benchmark curve for chart
//! collaborators:
//! - the four anchors as given
//! - `value_at_percentile` sampled on an even 0..=100 percentile grid, including the
//!   extrapolated tails below p25 and above p90

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{BenchmarkCurve, MetricKind};
use crate::error::AppError;
use crate::math::curve_grid;

#[derive(Debug, Clone, Serialize)]
pub struct CurveFile {
    pub tool: String,
    pub specialty: String,
    pub metric: MetricKind,
    pub anchors: CurveAnchors,
    pub grid: CurveGrid,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurveAnchors {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurveGrid {
    pub percentile: Vec<f64>,
    pub value: Vec<f64>,
}

pub fn build_curve_file(curve: &BenchmarkCurve, steps: usize) -> Result<CurveFile, AppError> {
    let (percentile, value) = curve_grid(curve, steps)?;
    Ok(CurveFile {
        tool: "compdash".to_string(),
        specialty: curve.specialty.clone(),
        metric: curve.metric,
        anchors: CurveAnchors {
            p25: curve.p25,
            p50: curve.p50,
            p75: curve.p75,
            p90: curve.p90,
        },
        grid: CurveGrid { percentile, value },
    })
}

/// Write a curve grid JSON file.
pub fn write_curve_json(path: &Path, curve: &BenchmarkCurve, steps: usize) -> Result<(), AppError> {
    let data = build_curve_file(curve, steps)?;
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &data)
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;
    Ok(())
}
