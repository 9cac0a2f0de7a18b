//! Saturation functions - diminishing returns in channel conversion.

use ndarray::{Array1, ArrayView1};

/// Damping slope used by the dashboard's default model.
pub const DEFAULT_DAMPING: f64 = 0.5;

/// Hyperbolic diminishing-returns adjustment of a conversion rate.
///
/// Formula (past the optimal budget):
///   excess  = (allocated - optimal) / optimal
///   damping = 1 / (1 + c * excess)
///   rate    = base_rate * damping
///
/// At or below `optimal_budget` the channel is in its linear regime and the
/// base rate is returned unchanged. The adjusted rate is never negative,
/// never exceeds `base_rate` and tends to zero as spend grows without bound.
/// A non-positive `optimal_budget` has no saturation point and also
/// returns `base_rate`.
pub fn diminishing_returns(
    base_rate: f64,
    allocated_budget: f64,
    optimal_budget: f64,
    damping_coefficient: f64,
) -> f64 {
    if optimal_budget <= 0.0 || allocated_budget <= optimal_budget {
        return base_rate;
    }
    let excess_factor = (allocated_budget - optimal_budget) / optimal_budget;
    let damping = 1.0 / (1.0 + damping_coefficient * excess_factor);
    base_rate * damping
}

/// Budget at which a channel saturates: the spend needed to reach
/// `capture_fraction` of the segment's market in one cycle.
pub fn optimal_budget(market_size: u64, cost_per_lead: f64, capture_fraction: f64) -> f64 {
    market_size as f64 * cost_per_lead * capture_fraction
}

/// Adjusted conversion rate for every budget level in `budgets`.
pub fn diminishing_returns_curve(
    budgets: &ArrayView1<f64>,
    base_rate: f64,
    optimal_budget: f64,
    damping_coefficient: f64,
) -> Array1<f64> {
    budgets.map(|&budget| {
        diminishing_returns(base_rate, budget, optimal_budget, damping_coefficient)
    })
}
