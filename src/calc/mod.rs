//! Compensation calculations built on the numeric primitives in `math`.
//!
//! - `aggregate`: base series + adjustments -> totals, YTD, variance
//! - `incentive`: variance -> incentive, holdback, net, running YTD, total pay
//! - `alignment`: productivity rank vs compensation rank

pub mod aggregate;
pub mod alignment;
pub mod incentive;

pub use aggregate::*;
pub use alignment::*;
pub use incentive::*;
