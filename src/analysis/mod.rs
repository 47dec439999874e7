//! Analysis modules.
//!
//! Aggregation over the loaded title table.

pub mod aggregator;

pub use aggregator::*;
