//! ROI Estimator Core: budget allocation and ROI projection for marketing spend.
//!
//! This crate provides:
//! - Channel efficiency scoring over a static market catalog
//! - Greedy, efficiency-ordered budget allocation with per-channel caps
//! - Diminishing-returns (hyperbolic saturation) conversion model
//! - ROI projection, response curves and revenue timelines
//!
//! The dashboard calls it from Python via PyO3 bindings (`python` feature);
//! the `roi-estimate` binary renders the same report on the command line.

use ndarray::Array1;
use serde::Serializer;

pub mod catalog;
pub mod config;
pub mod curve;
pub mod efficiency;
pub mod engine;
pub mod error;
pub mod optimization;
pub mod projection;
pub mod report;
pub mod saturation;
pub mod timeline;

#[cfg(feature = "python")]
mod python;

pub use catalog::{Channel, MarketCatalog, Segment};
pub use config::{CurveParams, EstimatorConfig, ModelParams};
pub use curve::ResponseCurve;
pub use efficiency::{channel_efficiency, RankedChannel};
pub use engine::RoiEngine;
pub use error::{EstimatorError, Result};
pub use optimization::{pair_key, Allocation, AllocationEntry};
pub use projection::{ChannelPerformance, RoiMetrics};
pub use report::{CampaignConfig, Report};
pub use saturation::diminishing_returns;
pub use timeline::RevenueTimeline;

/// Serialize an ndarray vector as a plain JSON list.
pub(crate) fn serialize_array<S: Serializer>(
    values: &Array1<f64>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(values.iter())
}
