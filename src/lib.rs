//! `provider-comp` library crate.
//!
//! The binary (`compdash`) is a thin wrapper around this library so that:
//!
//! - the calculation engine is testable without spawning processes
//! - request handlers and UI callbacks can call the same pure functions
//! - code stays easy to navigate as the project grows
//!
//! Engine entry points live in `math` (percentiles, tiers) and `calc`
//! (aggregation, incentives, alignment); `app::pipeline` composes them.

pub mod app;
pub mod calc;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod report;
