//! ClaimLens analysis runtime
//!
//! Orchestrates the independent checks over one announcement and reduces
//! their signals into an immutable evidence case.

pub mod pipeline;

pub use pipeline::*;
