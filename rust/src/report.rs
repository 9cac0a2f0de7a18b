//! Exportable snapshot of one estimate: inputs, metrics and allocation.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::optimization::Allocation;
use crate::projection::RoiMetrics;

/// Inputs the estimate was produced from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignConfig {
    pub total_budget: f64,
    pub selected_segments: Vec<String>,
    pub timeline_months: u32,
}

/// Full estimate, rendered to JSON on demand. Never read back.
///
/// `budget_allocation` renders as a "segment - channel" keyed map; the
/// allocated and leftover totals sit next to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub campaign_config: CampaignConfig,
    pub roi_metrics: RoiMetrics,
    pub budget_allocation: Allocation,
    pub allocated_budget: f64,
    pub unallocated_budget: f64,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    pub fn new(campaign_config: CampaignConfig, roi_metrics: RoiMetrics, budget_allocation: Allocation) -> Self {
        Self {
            allocated_budget: budget_allocation.allocated(),
            unallocated_budget: budget_allocation.unallocated(),
            campaign_config,
            roi_metrics,
            budget_allocation,
            generated_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// `marketing_roi_report_YYYYMMDD_HHMMSS.json`
    pub fn file_name(&self) -> String {
        format!(
            "marketing_roi_report_{}.json",
            self.generated_at.format("%Y%m%d_%H%M%S")
        )
    }

    /// Write the report to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        tracing::info!(target: "roi.report", path = %path.display(), "Wrote report");
        Ok(())
    }

    /// Write the report into `dir` under its timestamped file name.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(self.file_name());
        self.write(&path)?;
        Ok(path)
    }
}
