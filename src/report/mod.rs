//! Run reporting.

pub mod summary;

pub use summary::*;
