//! Revenue timeline - cumulative revenue ramp over the projection window.

use ndarray::Array1;
use serde::Serialize;

use crate::error::{EstimatorError, Result};
use crate::serialize_array;

/// Month-by-month cumulative revenue against the spend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueTimeline {
    /// 1-based month numbers.
    pub months: Vec<u32>,
    #[serde(serialize_with = "serialize_array")]
    pub cumulative_revenue: Array1<f64>,
    /// Flat break-even line (the total spend).
    pub break_even: f64,
    /// First month whose cumulative revenue covers the spend.
    pub break_even_month: Option<u32>,
}

/// Saturating ramp weight for a month.
///
/// Formula: 1 - exp(-month / (timeline * ramp))
pub fn growth_factor(month: u32, timeline_months: u32, ramp: f64) -> f64 {
    1.0 - (-f64::from(month) / (f64::from(timeline_months) * ramp)).exp()
}

/// Spread `total_revenue` over the timeline with a slow start.
///
/// cumulative[m] = (total_revenue / timeline) * m * growth_factor(m)
pub fn revenue_timeline(
    total_revenue: f64,
    total_budget: f64,
    timeline_months: u32,
    ramp: f64,
) -> Result<RevenueTimeline> {
    if timeline_months == 0 {
        return Err(EstimatorError::InvalidTimeline(timeline_months));
    }

    let monthly_revenue = total_revenue / f64::from(timeline_months);
    let months: Vec<u32> = (1..=timeline_months).collect();

    let mut cumulative_revenue = Array1::<f64>::zeros(months.len());
    for (i, &month) in months.iter().enumerate() {
        cumulative_revenue[i] =
            monthly_revenue * f64::from(month) * growth_factor(month, timeline_months, ramp);
    }

    let break_even_month = months
        .iter()
        .zip(cumulative_revenue.iter())
        .find(|&(_, &revenue)| revenue > 0.0 && revenue >= total_budget)
        .map(|(&month, _)| month);

    Ok(RevenueTimeline {
        months,
        cumulative_revenue,
        break_even: total_budget,
        break_even_month,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ramp_shape() {
        let timeline = revenue_timeline(1_200_000_000.0, 1_000_000.0, 12, 0.3).unwrap();

        assert_eq!(timeline.months, (1..=12).collect::<Vec<_>>());
        assert_relative_eq!(
            timeline.cumulative_revenue[11],
            1_200_000_000.0 * (1.0 - (-12.0f64 / 3.6).exp()),
            max_relative = 1e-12
        );
        for pair in timeline.cumulative_revenue.to_vec().windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert_eq!(timeline.break_even_month, Some(1));
    }

    #[test]
    fn test_break_even_month() {
        let timeline = revenue_timeline(1_200_000_000.0, 500_000_000.0, 12, 0.3).unwrap();
        assert_eq!(timeline.break_even_month, Some(7));
        assert_eq!(timeline.break_even, 500_000_000.0);
    }

    #[test]
    fn test_no_revenue_never_breaks_even() {
        let timeline = revenue_timeline(0.0, 0.0, 3, 0.3).unwrap();
        assert_eq!(timeline.break_even_month, None);
        assert!(revenue_timeline(1.0, 1.0, 0, 0.3).is_err());
    }
}
