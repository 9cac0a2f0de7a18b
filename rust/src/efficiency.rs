//! Channel efficiency scoring.

use std::cmp::Ordering;

use crate::catalog::{Channel, MarketCatalog, Segment};
use crate::error::Result;

/// Cost scale the efficiency score is expressed against.
const COST_SCALE: f64 = 1_000_000.0;

/// Conversions obtainable per 1,000,000 currency units of lead cost.
///
/// Formula: conversion_rate / (cost_per_lead / 1_000_000)
pub fn channel_efficiency(channel: &Channel) -> f64 {
    channel.conversion_rate / (channel.cost_per_lead / COST_SCALE)
}

/// Efficiency of a catalog pair, or a lookup error for unknown names.
pub fn efficiency(catalog: &MarketCatalog, segment: &str, channel: &str) -> Result<f64> {
    let (_, channel) = catalog.channel(segment, channel)?;
    Ok(channel_efficiency(channel))
}

/// A (segment, channel) pair with its efficiency score.
#[derive(Debug, Clone)]
pub struct RankedChannel<'a> {
    pub segment: &'a Segment,
    pub channel: &'a Channel,
    pub efficiency: f64,
}

/// Every pair of the given segments, best efficiency first.
///
/// Ties are broken by segment name, then channel name.
pub fn rank_channels<'a>(segments: &[&'a Segment]) -> Vec<RankedChannel<'a>> {
    let mut ranked: Vec<RankedChannel<'a>> = segments
        .iter()
        .flat_map(|&segment| {
            segment.channels.iter().map(move |channel| RankedChannel {
                segment,
                channel,
                efficiency: channel_efficiency(channel),
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.efficiency
            .partial_cmp(&a.efficiency)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.segment.name.cmp(&b.segment.name))
            .then_with(|| a.channel.name.cmp(&b.channel.name))
    });

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_efficiency_formula() {
        let catalog = MarketCatalog::default();

        // 0.25 / (50_000 / 1_000_000)
        let score = efficiency(&catalog, "Coffee Shops", "Word of Mouth").unwrap();
        assert_relative_eq!(score, 5.0);

        assert!(efficiency(&catalog, "Coffee Shops", "Radio").is_err());
        assert!(efficiency(&catalog, "Bakeries", "Word of Mouth").is_err());
    }

    #[test]
    fn test_efficiency_monotonic() {
        let base = Channel::new("x", 0.1, 100_000.0);
        let better_rate = Channel::new("x", 0.2, 100_000.0);
        let cheaper = Channel::new("x", 0.1, 50_000.0);

        assert!(channel_efficiency(&better_rate) > channel_efficiency(&base));
        assert!(channel_efficiency(&cheaper) > channel_efficiency(&base));
    }

    #[test]
    fn test_rank_order_and_ties() {
        let catalog = MarketCatalog::default();
        let segments: Vec<&Segment> = catalog.segments().iter().collect();
        let ranked = rank_channels(&segments);

        assert_eq!(ranked.len(), 20);
        // Warung word of mouth: 0.30 / 0.025 = 12
        assert_eq!(ranked[0].segment.name, "Warung/Street Food");
        assert_eq!(ranked[0].channel.name, "Word of Mouth");
        for pair in ranked.windows(2) {
            assert!(pair[0].efficiency >= pair[1].efficiency);
        }

        let tied = vec![
            Segment::new("B", 10, 1.0, vec![Channel::new("z", 0.1, 10.0)]),
            Segment::new("A", 10, 1.0, vec![Channel::new("y", 0.1, 10.0), Channel::new("x", 0.1, 10.0)]),
        ];
        let refs: Vec<&Segment> = tied.iter().collect();
        let names: Vec<(&str, &str)> = rank_channels(&refs)
            .iter()
            .map(|r| (r.segment.name.as_str(), r.channel.name.as_str()))
            .collect();
        assert_eq!(names, vec![("A", "x"), ("A", "y"), ("B", "z")]);
    }
}
