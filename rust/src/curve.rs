//! Diminishing-returns response curve for a single (segment, channel) pair.
//!
//! Sweeps the pair's budget around its current allocation and projects each
//! point on its own, so the caller can see where extra spend stops paying.

use ndarray::Array1;
use serde::Serialize;

use crate::catalog::MarketCatalog;
use crate::config::{CurveParams, ModelParams};
use crate::efficiency::channel_efficiency;
use crate::error::Result;
use crate::optimization::{Allocation, AllocationEntry};
use crate::projection::project_roi;
use crate::saturation::optimal_budget;
use crate::serialize_array;

/// Relative gap below which two ROI values count as equal.
const ROI_TIE_TOLERANCE: f64 = 1e-9;

/// ROI and conversions across a budget sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseCurve {
    pub segment: String,
    pub channel: String,
    #[serde(serialize_with = "serialize_array")]
    pub budgets: Array1<f64>,
    #[serde(serialize_with = "serialize_array")]
    pub roi: Array1<f64>,
    #[serde(serialize_with = "serialize_array")]
    pub conversions: Array1<f64>,
    /// Budget the allocation gives this pair (0 when unfunded).
    pub current_budget: f64,
    /// Spend past which the conversion rate is damped.
    pub saturation_budget: f64,
    /// Sweep point with the highest ROI.
    pub optimal_budget: f64,
    pub optimal_roi: f64,
    /// optimal_budget - current_budget; positive means spend more.
    pub recommended_change: f64,
}

impl ResponseCurve {
    /// Index of the sweep point closest to the current budget.
    pub fn current_index(&self) -> Option<usize> {
        if self.current_budget <= 0.0 {
            return None;
        }
        self.budgets
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (*a - self.current_budget)
                    .abs()
                    .total_cmp(&(*b - self.current_budget).abs())
            })
            .map(|(i, _)| i)
    }
}

/// Sweep `linspace(base * low, base * high, points)` for one pair, where
/// base is the pair's allocated budget or the configured fallback.
pub fn response_curve(
    catalog: &MarketCatalog,
    allocation: &Allocation,
    segment: &str,
    channel: &str,
    timeline_months: u32,
    model: &ModelParams,
    params: &CurveParams,
) -> Result<ResponseCurve> {
    let (seg, ch) = catalog.channel(segment, channel)?;
    let efficiency = channel_efficiency(ch);

    let current_budget = allocation
        .get(segment, channel)
        .map(|e| e.budget)
        .unwrap_or(0.0);
    let base = if current_budget > 0.0 {
        current_budget
    } else {
        params.fallback_budget
    };

    let budgets = Array1::linspace(
        base * params.low_multiplier,
        base * params.high_multiplier,
        params.points,
    );
    let mut roi = Array1::<f64>::zeros(params.points);
    let mut conversions = Array1::<f64>::zeros(params.points);

    for (i, &budget) in budgets.iter().enumerate() {
        let point = Allocation::single(AllocationEntry {
            segment: seg.name.clone(),
            channel: ch.name.clone(),
            budget,
            efficiency,
        });
        let metrics = project_roi(catalog, &point, timeline_months, model)?;
        roi[i] = metrics.overall_roi;
        conversions[i] = metrics.total_conversions;
    }

    // First maximum wins; the linear regime yields a flat ROI plateau
    let mut best = 0;
    for (i, &value) in roi.iter().enumerate().skip(1) {
        if value - roi[best] > ROI_TIE_TOLERANCE * roi[best].abs().max(1.0) {
            best = i;
        }
    }
    let optimal = budgets[best];

    tracing::debug!(
        target: "roi.curve",
        segment,
        channel,
        base,
        optimal_budget = optimal,
        optimal_roi = roi[best],
        "Swept response curve"
    );

    Ok(ResponseCurve {
        segment: seg.name.clone(),
        channel: ch.name.clone(),
        current_budget,
        saturation_budget: optimal_budget(seg.market_size, ch.cost_per_lead, model.capture_fraction),
        optimal_budget: optimal,
        optimal_roi: roi[best],
        recommended_change: optimal - current_budget,
        budgets,
        roi,
        conversions,
    })
}
