//! Estimator facade: owns the catalog and model parameters, validates
//! boundary input, and runs allocate -> project.

use crate::catalog::{MarketCatalog, Segment};
use crate::config::{CurveParams, EstimatorConfig, ModelParams};
use crate::curve::{response_curve, ResponseCurve};
use crate::efficiency::{self, RankedChannel};
use crate::error::{EstimatorError, Result};
use crate::optimization::{allocate_budget, Allocation};
use crate::projection::{project_roi, RoiMetrics};
use crate::report::{CampaignConfig, Report};
use crate::timeline::{revenue_timeline, RevenueTimeline};

/// Allocation and ROI projection engine over an immutable catalog.
#[derive(Debug, Clone)]
pub struct RoiEngine {
    catalog: MarketCatalog,
    model: ModelParams,
    curve: CurveParams,
}

impl RoiEngine {
    /// Engine with default model parameters.
    pub fn new(catalog: MarketCatalog) -> Self {
        Self {
            catalog,
            model: ModelParams::default(),
            curve: CurveParams::default(),
        }
    }

    pub fn with_params(catalog: MarketCatalog, model: ModelParams, curve: CurveParams) -> Result<Self> {
        model.validate()?;
        curve.validate()?;
        Ok(Self {
            catalog,
            model,
            curve,
        })
    }

    pub fn from_config(config: &EstimatorConfig) -> Result<Self> {
        Self::with_params(config.catalog()?, config.model.clone(), config.curve.clone())
    }

    pub fn catalog(&self) -> &MarketCatalog {
        &self.catalog
    }

    pub fn model(&self) -> &ModelParams {
        &self.model
    }

    pub fn curve_params(&self) -> &CurveParams {
        &self.curve
    }

    /// Efficiency score of a catalog pair.
    pub fn efficiency(&self, segment: &str, channel: &str) -> Result<f64> {
        efficiency::efficiency(&self.catalog, segment, channel)
    }

    /// Every pair of the selected segments, best efficiency first.
    pub fn rank_channels<S: AsRef<str>>(&self, segments: &[S]) -> Result<Vec<RankedChannel<'_>>> {
        let selected = self.resolve_segments(segments)?;
        Ok(efficiency::rank_channels(&selected))
    }

    /// Split `total_budget` across the channels of the selected segments.
    pub fn allocate<S: AsRef<str>>(&self, total_budget: f64, segments: &[S]) -> Result<Allocation> {
        if !(total_budget.is_finite() && total_budget >= 0.0) {
            return Err(EstimatorError::InvalidBudget(total_budget));
        }
        let selected = self.resolve_segments(segments)?;
        Ok(allocate_budget(&selected, total_budget, &self.model))
    }

    /// Project leads, conversions, revenue and ROI for an allocation.
    pub fn project(&self, allocation: &Allocation, timeline_months: u32) -> Result<RoiMetrics> {
        project_roi(&self.catalog, allocation, timeline_months, &self.model)
    }

    /// Budget sweep for one pair around its allocated budget.
    pub fn response_curve(
        &self,
        allocation: &Allocation,
        segment: &str,
        channel: &str,
        timeline_months: u32,
    ) -> Result<ResponseCurve> {
        response_curve(
            &self.catalog,
            allocation,
            segment,
            channel,
            timeline_months,
            &self.model,
            &self.curve,
        )
    }

    /// Cumulative revenue ramp for projected metrics, measured against the
    /// campaign's total budget (not just the allocated part).
    pub fn revenue_timeline(
        &self,
        metrics: &RoiMetrics,
        timeline_months: u32,
        total_budget: f64,
    ) -> Result<RevenueTimeline> {
        revenue_timeline(
            metrics.total_revenue,
            total_budget,
            timeline_months,
            self.model.revenue_ramp,
        )
    }

    /// Allocate, project and package the result as a report.
    pub fn estimate<S: AsRef<str>>(
        &self,
        total_budget: f64,
        segments: &[S],
        timeline_months: u32,
    ) -> Result<Report> {
        let allocation = self.allocate(total_budget, segments)?;
        let metrics = self.project(&allocation, timeline_months)?;

        tracing::info!(
            target: "roi.engine",
            total_budget,
            timeline_months,
            overall_roi = metrics.overall_roi,
            conversions = metrics.total_conversions,
            "Estimate complete"
        );

        let selected_segments = self
            .resolve_segments(segments)?
            .into_iter()
            .map(|s| s.name.clone())
            .collect();
        Ok(Report::new(
            CampaignConfig {
                total_budget,
                selected_segments,
                timeline_months,
            },
            metrics,
            allocation,
        ))
    }

    /// Map names to catalog segments, dropping repeats.
    fn resolve_segments<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&Segment>> {
        if names.is_empty() {
            return Err(EstimatorError::EmptySelection);
        }
        let mut selected: Vec<&Segment> = Vec::with_capacity(names.len());
        for name in names {
            let segment = self.catalog.segment(name.as_ref())?;
            if !selected.iter().any(|s| s.name == segment.name) {
                selected.push(segment);
            }
        }
        Ok(selected)
    }
}

impl Default for RoiEngine {
    fn default() -> Self {
        Self::new(MarketCatalog::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_boundary_validation() {
        let engine = RoiEngine::default();
        let none: [&str; 0] = [];

        assert!(matches!(engine.allocate(1_000.0, &none), Err(EstimatorError::EmptySelection)));
        assert!(matches!(
            engine.allocate(-1.0, &["Coffee Shops"]),
            Err(EstimatorError::InvalidBudget(_))
        ));
        assert!(matches!(
            engine.allocate(f64::NAN, &["Coffee Shops"]),
            Err(EstimatorError::InvalidBudget(_))
        ));
        assert!(matches!(
            engine.allocate(1_000.0, &["Bakeries"]),
            Err(EstimatorError::UnknownSegment(_))
        ));
        assert!(matches!(
            engine.estimate(1_000.0, &["Coffee Shops"], 0),
            Err(EstimatorError::InvalidTimeline(0))
        ));
    }

    #[test]
    fn test_duplicate_segments_count_once() {
        let engine = RoiEngine::default();
        let once = engine.allocate(2_000_000.0, &["Cloud Kitchen"]).unwrap();
        let twice = engine.allocate(2_000_000.0, &["Cloud Kitchen", "Cloud Kitchen"]).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_zero_budget_estimate() {
        let engine = RoiEngine::default();
        let report = engine.estimate(0.0, &["Coffee Shops", "Food Courts"], 12).unwrap();

        assert!(report.budget_allocation.is_empty());
        assert_eq!(report.roi_metrics.total_cost, 0.0);
        assert_eq!(report.roi_metrics.overall_roi, 0.0);
        assert!(report.roi_metrics.overall_roi.is_finite());
    }

    #[test]
    fn test_estimate_matches_parts() {
        let engine = RoiEngine::default();
        let segments = ["Warung/Street Food", "Casual Dining"];
        let report = engine.estimate(10_000_000.0, &segments, 6).unwrap();

        let allocation = engine.allocate(10_000_000.0, &segments).unwrap();
        let metrics = engine.project(&allocation, 6).unwrap();
        assert_eq!(report.budget_allocation, allocation);
        assert_eq!(report.roi_metrics, metrics);
        assert_eq!(report.campaign_config.selected_segments, vec!["Warung/Street Food", "Casual Dining"]);

        let timeline = engine.revenue_timeline(&metrics, 6, 10_000_000.0).unwrap();
        assert_eq!(timeline.months.len(), 6);
    }

    #[test]
    fn test_break_even_uses_total_budget() {
        let engine = RoiEngine::default();
        let report = engine.estimate(1_000_000.0, &["Coffee Shops"], 12).unwrap();

        // Caps leave 460_000 unallocated
        assert_relative_eq!(report.roi_metrics.total_cost, 540_000.0, epsilon = 1e-6);

        let timeline = engine
            .revenue_timeline(&report.roi_metrics, 12, report.campaign_config.total_budget)
            .unwrap();
        assert_eq!(timeline.break_even, 1_000_000.0);

        let first = timeline.break_even_month.unwrap();
        let idx = (first - 1) as usize;
        assert!(timeline.cumulative_revenue[idx] >= 1_000_000.0);
        if idx > 0 {
            assert!(timeline.cumulative_revenue[idx - 1] < 1_000_000.0);
        }
    }

    #[test]
    fn test_custom_params() {
        let model = ModelParams {
            market_weighted_share: 0.5,
            ..ModelParams::default()
        };
        let engine = RoiEngine::with_params(MarketCatalog::default(), model, CurveParams::default()).unwrap();
        let allocation = engine.allocate(1_000_000.0, &["Warung/Street Food"]).unwrap();

        // The 30% remaining-share cap binds before the raised market cap
        assert_relative_eq!(allocation.entries()[0].budget, 300_000.0, epsilon = 1e-6);

        let bad = ModelParams {
            capture_fraction: 0.0,
            ..ModelParams::default()
        };
        assert!(RoiEngine::with_params(MarketCatalog::default(), bad, CurveParams::default()).is_err());
    }

    #[test]
    fn test_rank_channels() {
        let engine = RoiEngine::default();
        let ranked = engine.rank_channels(&["Food Courts"]).unwrap();

        assert_eq!(ranked.len(), 4);
        assert_eq!(ranked[0].channel.name, "Partnership");
        assert_relative_eq!(ranked[0].efficiency, engine.efficiency("Food Courts", "Partnership").unwrap());
    }
}
