//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - benchmark curves and metric kinds (`BenchmarkCurve`, `MetricKind`)
//! - monthly series and the adjustment union (`MonthlySeries`, `Adjustment`)
//! - compensation models (`CompensationModel`, `TierList`)
//! - provider records, policy and run configuration

pub mod types;

pub use types::*;
