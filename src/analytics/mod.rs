/// Analytics module for result aggregation and data export
///
/// This module provides:
/// - Per-lineup aggregation of trial results (moments, quantiles,
///   finish buckets, win/cash probability, ROI)
/// - Export utilities (CSV, JSON)

pub mod export;
pub mod metrics;

pub use export::*;
pub use metrics::*;
