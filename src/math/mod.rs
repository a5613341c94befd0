//! Numeric primitives: percentile interpolation and tier resolution.

pub mod percentile;
pub mod tiers;

pub use percentile::*;
pub use tiers::*;
