//! CLI command implementations.

pub mod browse;
pub mod facets;
pub mod migrate;
