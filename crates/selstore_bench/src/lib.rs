//! Shared helpers for the selstore benchmarks.

pub mod utils;
