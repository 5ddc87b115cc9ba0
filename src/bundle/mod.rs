//! Document bundling.
//!
//! The aggregator reads manifest entries in order and writes their
//! concatenation to a single output document.

pub mod aggregator;
pub mod error;

pub use aggregator::{AggregateOptions, Aggregator};
