//! Input/output helpers.
//!
//! - scenario JSON ingest + validation (`ingest`)
//! - outcome exports (CSV/JSON) (`export`)
//! - benchmark curve grid JSON (`curve`)

pub mod curve;
pub mod export;
pub mod ingest;

pub use curve::*;
pub use export::*;
pub use ingest::*;
