//! ROI projection - turns an allocation into leads, conversions and revenue.

use std::cmp::Ordering;

use serde::Serialize;

use crate::catalog::MarketCatalog;
use crate::config::ModelParams;
use crate::error::{EstimatorError, Result};
use crate::optimization::Allocation;
use crate::saturation::{diminishing_returns, optimal_budget};

/// Projected outcome of one funded (segment, channel) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelPerformance {
    pub segment: String,
    pub channel: String,
    pub budget: f64,
    pub leads: f64,
    pub conversions: f64,
    pub revenue: f64,
    /// Return on investment, in percent.
    pub roi: f64,
    pub efficiency: f64,
}

/// Aggregate projection over a whole allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiMetrics {
    pub total_leads: f64,
    pub total_conversions: f64,
    pub total_revenue: f64,
    pub total_cost: f64,
    /// Return on investment over the whole allocation, in percent.
    pub overall_roi: f64,
    /// Conversions as a percentage of the whole catalog's market.
    pub market_penetration: f64,
    pub channel_performance: Vec<ChannelPerformance>,
}

impl RoiMetrics {
    /// Highest-ROI channel.
    pub fn best_channel(&self) -> Option<&ChannelPerformance> {
        self.channel_performance
            .iter()
            .max_by(|a, b| a.roi.partial_cmp(&b.roi).unwrap_or(Ordering::Equal))
    }

    /// Lowest-ROI channel.
    pub fn worst_channel(&self) -> Option<&ChannelPerformance> {
        self.channel_performance
            .iter()
            .min_by(|a, b| a.roi.partial_cmp(&b.roi).unwrap_or(Ordering::Equal))
    }

    /// Channels sorted by efficiency, best first.
    pub fn by_efficiency(&self) -> Vec<&ChannelPerformance> {
        let mut ranked: Vec<&ChannelPerformance> = self.channel_performance.iter().collect();
        ranked.sort_by(|a, b| b.efficiency.partial_cmp(&a.efficiency).unwrap_or(Ordering::Equal));
        ranked
    }
}

/// (revenue - cost) / cost * 100, or 0 when nothing was spent.
pub fn roi_percent(revenue: f64, cost: f64) -> f64 {
    if cost > 0.0 {
        (revenue - cost) / cost * 100.0
    } else {
        0.0
    }
}

/// Project leads, conversions, revenue and ROI for every funded entry.
///
/// Per entry:
///   leads       = budget / cost_per_lead
///   rate        = diminishing_returns(conversion_rate, budget, optimal)
///   conversions = leads * rate
///   revenue     = conversions * avg_deal_value * timeline_months
///
/// where optimal = market_size * cost_per_lead * capture_fraction.
/// Entries with a non-positive budget are skipped.
pub fn project_roi(
    catalog: &MarketCatalog,
    allocation: &Allocation,
    timeline_months: u32,
    params: &ModelParams,
) -> Result<RoiMetrics> {
    if timeline_months == 0 {
        return Err(EstimatorError::InvalidTimeline(timeline_months));
    }

    let mut total_leads = 0.0;
    let mut total_conversions = 0.0;
    let mut total_revenue = 0.0;
    let total_cost = allocation.allocated();
    let mut channel_performance = Vec::with_capacity(allocation.len());

    for entry in allocation.entries() {
        if entry.budget <= 0.0 {
            continue;
        }

        let (segment, channel) = catalog.channel(&entry.segment, &entry.channel)?;
        let leads = entry.budget / channel.cost_per_lead;
        let optimal = optimal_budget(segment.market_size, channel.cost_per_lead, params.capture_fraction);
        let rate = diminishing_returns(
            channel.conversion_rate,
            entry.budget,
            optimal,
            params.damping_coefficient,
        );
        let conversions = leads * rate;
        let revenue = conversions * segment.avg_deal_value * f64::from(timeline_months);

        total_leads += leads;
        total_conversions += conversions;
        total_revenue += revenue;

        channel_performance.push(ChannelPerformance {
            segment: entry.segment.clone(),
            channel: entry.channel.clone(),
            budget: entry.budget,
            leads,
            conversions,
            revenue,
            roi: roi_percent(revenue, entry.budget),
            efficiency: entry.efficiency,
        });
    }

    let market_penetration = total_conversions / catalog.total_market_size() as f64 * 100.0;
    let overall_roi = roi_percent(total_revenue, total_cost);

    tracing::debug!(
        target: "roi.project",
        timeline_months,
        channels = channel_performance.len(),
        total_revenue,
        overall_roi,
        "Projected allocation"
    );

    Ok(RoiMetrics {
        total_leads,
        total_conversions,
        total_revenue,
        total_cost,
        overall_roi,
        market_penetration,
        channel_performance,
    })
}
