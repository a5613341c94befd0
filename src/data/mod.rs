//! Input data sources: the benchmark registry and the synthetic scenario generator.

pub mod benchmarks;
pub mod sample;

pub use benchmarks::*;
pub use sample::*;
