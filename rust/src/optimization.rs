//! Budget allocation using a greedy efficiency-ordered heuristic.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::catalog::Segment;
use crate::config::ModelParams;
use crate::efficiency::rank_channels;

/// Key a (segment, channel) pair is addressed by: "segment - channel".
pub fn pair_key(segment: &str, channel: &str) -> String {
    format!("{segment} - {channel}")
}

/// Budget assigned to one (segment, channel) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationEntry {
    pub segment: String,
    pub channel: String,
    pub budget: f64,
    pub efficiency: f64,
}

impl AllocationEntry {
    pub fn key(&self) -> String {
        pair_key(&self.segment, &self.channel)
    }
}

/// Budget assignment across (segment, channel) pairs.
///
/// Entries are kept in funding order (best efficiency first). Pairs the
/// allocator never reached are absent rather than present with zero budget.
///
/// Serializes as a map from "segment - channel" to the entry, in funding
/// order. The totals travel separately (see `Report`).
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub total_budget: f64,
    entries: Vec<AllocationEntry>,
}

impl Allocation {
    pub fn new(total_budget: f64, entries: Vec<AllocationEntry>) -> Self {
        Self {
            total_budget,
            entries,
        }
    }

    /// Allocation holding a single pair, used for what-if sweeps.
    pub fn single(entry: AllocationEntry) -> Self {
        Self {
            total_budget: entry.budget,
            entries: vec![entry],
        }
    }

    pub fn entries(&self) -> &[AllocationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, segment: &str, channel: &str) -> Option<&AllocationEntry> {
        self.entries
            .iter()
            .find(|e| e.segment == segment && e.channel == channel)
    }

    /// Look up an entry by its "segment - channel" key.
    pub fn get_key(&self, key: &str) -> Option<&AllocationEntry> {
        self.entries.iter().find(|e| e.key() == key)
    }

    /// Sum of all entry budgets.
    pub fn allocated(&self) -> f64 {
        self.entries.iter().map(|e| e.budget).sum()
    }

    /// Budget left over once every cap has bound.
    pub fn unallocated(&self) -> f64 {
        (self.total_budget - self.allocated()).max(0.0)
    }

    /// Entries keyed by "segment - channel".
    pub fn to_map(&self) -> BTreeMap<String, &AllocationEntry> {
        self.entries.iter().map(|e| (e.key(), e)).collect()
    }
}

impl Serialize for Allocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.key(), entry)?;
        }
        map.end()
    }
}

/// Allocate `total_budget` across every channel of `segments`.
///
/// Pairs are funded in descending efficiency order. Each pair receives
///   min(remaining * max_remaining_share,
///       total * min(market_size / reference_market_size, 1) * market_weighted_share)
/// so no single channel takes more than a fixed share of what is left, and
/// small markets are capped harder than large ones. The walk stops once the
/// remaining budget is exhausted; it can also finish with budget left over
/// when the caps bind on every pair.
pub fn allocate_budget(segments: &[&Segment], total_budget: f64, params: &ModelParams) -> Allocation {
    let ranked = rank_channels(segments);
    let mut entries = Vec::with_capacity(ranked.len());
    let mut remaining = total_budget;

    for item in ranked {
        if remaining <= 0.0 {
            break;
        }

        let market_weight =
            (item.segment.market_size as f64 / params.reference_market_size).min(1.0);
        let suggested = (remaining * params.max_remaining_share)
            .min(total_budget * market_weight * params.market_weighted_share);

        // Nothing left to hand out would stall the walk
        if suggested <= 0.0 {
            break;
        }

        tracing::debug!(
            target: "roi.alloc",
            segment = %item.segment.name,
            channel = %item.channel.name,
            budget = suggested,
            efficiency = item.efficiency,
            "Funded channel"
        );

        entries.push(AllocationEntry {
            segment: item.segment.name.clone(),
            channel: item.channel.name.clone(),
            budget: suggested,
            efficiency: item.efficiency,
        });
        remaining -= suggested;
    }

    let allocation = Allocation::new(total_budget, entries);
    tracing::info!(
        target: "roi.alloc",
        total_budget,
        funded = allocation.len(),
        allocated = allocation.allocated(),
        "Budget allocated"
    );
    allocation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MarketCatalog;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn select<'a>(catalog: &'a MarketCatalog, names: &[&str]) -> Vec<&'a Segment> {
        names.iter().map(|n| catalog.segment(n).unwrap()).collect()
    }

    #[test]
    fn test_single_segment_caps() {
        let catalog = MarketCatalog::default();
        let segments = select(&catalog, &["Coffee Shops"]);
        let allocation = allocate_budget(&segments, 1_000_000.0, &ModelParams::default());

        // Market weight 0.9 caps every channel at 135_000 before the 30% cap binds
        let channels: Vec<&str> = allocation.entries().iter().map(|e| e.channel.as_str()).collect();
        assert_eq!(channels, vec!["Word of Mouth", "Partnership", "Instagram Ads", "Google Ads"]);
        for entry in allocation.entries() {
            assert_relative_eq!(entry.budget, 135_000.0, epsilon = 1e-6);
        }
        assert_relative_eq!(allocation.allocated(), 540_000.0, epsilon = 1e-6);
        assert_relative_eq!(allocation.unallocated(), 460_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_remaining_share_cap() {
        let catalog = MarketCatalog::default();
        let segments = select(&catalog, &["Warung/Street Food", "Coffee Shops"]);
        let allocation = allocate_budget(&segments, 1_000_000.0, &ModelParams::default());

        let budgets: Vec<f64> = allocation.entries().iter().map(|e| e.budget).collect();
        assert_eq!(budgets.len(), 8);
        // Market-weighted caps bind first (150_000 for Warung, 135_000 for Coffee Shops)
        assert_relative_eq!(budgets[0], 150_000.0, epsilon = 1e-6);
        assert_relative_eq!(budgets[1], 135_000.0, epsilon = 1e-6);
        assert_relative_eq!(budgets[2], 150_000.0, epsilon = 1e-6);
        assert_relative_eq!(budgets[3], 135_000.0, epsilon = 1e-6);
        // then 30% of the remaining 430_000 and 301_000
        assert_relative_eq!(budgets[4], 129_000.0, epsilon = 1e-6);
        assert_relative_eq!(budgets[5], 90_300.0, epsilon = 1e-6);
        assert!(allocation.unallocated() > 0.0);
    }

    #[test]
    fn test_zero_budget_is_empty() {
        let catalog = MarketCatalog::default();
        let segments = select(&catalog, &["Coffee Shops", "Food Courts"]);
        let allocation = allocate_budget(&segments, 0.0, &ModelParams::default());

        assert!(allocation.is_empty());
        assert_eq!(allocation.allocated(), 0.0);
    }

    #[test]
    fn test_lookup_by_key() {
        let catalog = MarketCatalog::default();
        let segments = select(&catalog, &["Food Courts"]);
        let allocation = allocate_budget(&segments, 5_000_000.0, &ModelParams::default());

        let entry = allocation.get_key("Food Courts - Partnership").unwrap();
        assert_eq!(allocation.get("Food Courts", "Partnership"), Some(entry));
        assert!(allocation.get_key("Food Courts - Radio").is_none());
        assert_eq!(allocation.to_map().len(), allocation.len());
    }

    #[test]
    fn test_funding_follows_efficiency() {
        let catalog = MarketCatalog::default();
        let segments = select(&catalog, &["Casual Dining", "Cloud Kitchen", "Coffee Shops"]);
        let allocation = allocate_budget(&segments, 20_000_000.0, &ModelParams::default());

        let first = &allocation.entries()[0];
        assert!(allocation
            .entries()
            .iter()
            .filter(|e| e.budget > 0.0)
            .all(|e| e.efficiency <= first.efficiency));
        assert_eq!(first.key(), "Coffee Shops - Word of Mouth");
    }

    #[test]
    fn test_serializes_as_keyed_map() {
        let catalog = MarketCatalog::default();
        let segments = select(&catalog, &["Coffee Shops"]);
        let allocation = allocate_budget(&segments, 1_000_000.0, &ModelParams::default());

        let raw = serde_json::to_string(&allocation).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 4);

        let entry = &value["Coffee Shops - Word of Mouth"];
        assert!(entry.is_object());
        assert_eq!(entry["segment"], "Coffee Shops");
        assert_eq!(entry["channel"], "Word of Mouth");
        assert_relative_eq!(entry["budget"].as_f64().unwrap(), 135_000.0, epsilon = 1e-6);

        // Keys appear in funding order in the rendered text
        let positions: Vec<usize> = allocation
            .entries()
            .iter()
            .map(|e| raw.find(&format!("\"{}\":", e.key())).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    proptest! {
        #[test]
        fn prop_never_over_allocates(
            budget in 0.0f64..1e12,
            mask in 1u8..32,
        ) {
            let catalog = MarketCatalog::default();
            let segments: Vec<&Segment> = catalog
                .segments()
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, s)| s)
                .collect();

            let allocation = allocate_budget(&segments, budget, &ModelParams::default());
            prop_assert!(allocation.allocated() <= budget);
            prop_assert!(allocation.entries().iter().all(|e| e.budget > 0.0));
        }
    }
}
