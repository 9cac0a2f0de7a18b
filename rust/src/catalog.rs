//! Market catalog - immutable reference data for segments and channels.
//!
//! The catalog is built once (from the built-in table or a TOML file) and
//! handed to the engine; nothing mutates it afterwards.

use serde::{Deserialize, Serialize};

use crate::error::{EstimatorError, Result};

/// Acquisition channel within a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    /// Fraction of leads that convert, in [0, 1].
    pub conversion_rate: f64,
    /// Currency spent per lead, > 0.
    pub cost_per_lead: f64,
}

impl Channel {
    pub fn new(name: impl Into<String>, conversion_rate: f64, cost_per_lead: f64) -> Self {
        Self {
            name: name.into(),
            conversion_rate,
            cost_per_lead,
        }
    }
}

/// Market segment with its addressable size, deal value and channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    /// Addressable prospect count.
    pub market_size: u64,
    pub avg_deal_value: f64,
    pub channels: Vec<Channel>,
}

impl Segment {
    pub fn new(
        name: impl Into<String>,
        market_size: u64,
        avg_deal_value: f64,
        channels: Vec<Channel>,
    ) -> Self {
        Self {
            name: name.into(),
            market_size,
            avg_deal_value,
            channels,
        }
    }

    /// Look up a channel by name.
    pub fn channel(&self, name: &str) -> Result<&Channel> {
        self.channels
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| EstimatorError::unknown_channel(&self.name, name))
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(EstimatorError::invalid_catalog("segment name must not be empty"));
        }
        if self.market_size == 0 {
            return Err(EstimatorError::invalid_catalog(format!(
                "segment '{}': market_size must be > 0",
                self.name
            )));
        }
        if !(self.avg_deal_value.is_finite() && self.avg_deal_value > 0.0) {
            return Err(EstimatorError::invalid_catalog(format!(
                "segment '{}': avg_deal_value must be > 0 (got {})",
                self.name, self.avg_deal_value
            )));
        }
        if self.channels.is_empty() {
            return Err(EstimatorError::invalid_catalog(format!(
                "segment '{}' has no channels",
                self.name
            )));
        }

        for (i, channel) in self.channels.iter().enumerate() {
            if self.channels[..i].iter().any(|c| c.name == channel.name) {
                return Err(EstimatorError::invalid_catalog(format!(
                    "segment '{}': duplicate channel '{}'",
                    self.name, channel.name
                )));
            }
            if !(0.0..=1.0).contains(&channel.conversion_rate) {
                return Err(EstimatorError::invalid_catalog(format!(
                    "{} - {}: conversion_rate must be within [0, 1] (got {})",
                    self.name, channel.name, channel.conversion_rate
                )));
            }
            if !(channel.cost_per_lead.is_finite() && channel.cost_per_lead > 0.0) {
                return Err(EstimatorError::invalid_catalog(format!(
                    "{} - {}: cost_per_lead must be > 0 (got {})",
                    self.name, channel.name, channel.cost_per_lead
                )));
            }
        }

        Ok(())
    }
}

/// Immutable table of segments, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketCatalog {
    segments: Vec<Segment>,
}

impl MarketCatalog {
    /// Build a catalog, rejecting data that breaks the reference invariants.
    pub fn new(segments: Vec<Segment>) -> Result<Self> {
        if segments.is_empty() {
            return Err(EstimatorError::invalid_catalog("catalog has no segments"));
        }
        for (i, segment) in segments.iter().enumerate() {
            segment.validate()?;
            if segments[..i].iter().any(|s| s.name == segment.name) {
                return Err(EstimatorError::invalid_catalog(format!(
                    "duplicate segment '{}'",
                    segment.name
                )));
            }
        }
        Ok(Self { segments })
    }

    /// Indonesian F&B market for an ERP/POS product (deal values in Rupiah).
    pub fn indonesian_fnb() -> Self {
        let channels = |rows: [(f64, f64); 4]| {
            ["Word of Mouth", "Instagram Ads", "Google Ads", "Partnership"]
                .iter()
                .zip(rows)
                .map(|(name, (rate, cpl))| Channel::new(*name, rate, cpl))
                .collect::<Vec<_>>()
        };

        Self {
            segments: vec![
                Segment::new(
                    "Coffee Shops",
                    45_000,
                    15_000_000.0,
                    channels([(0.25, 50_000.0), (0.12, 75_000.0), (0.08, 125_000.0), (0.22, 85_000.0)]),
                ),
                Segment::new(
                    "Casual Dining",
                    25_000,
                    35_000_000.0,
                    channels([(0.20, 75_000.0), (0.10, 100_000.0), (0.15, 150_000.0), (0.25, 120_000.0)]),
                ),
                Segment::new(
                    "Warung/Street Food",
                    180_000,
                    8_000_000.0,
                    channels([(0.30, 25_000.0), (0.08, 40_000.0), (0.05, 60_000.0), (0.18, 45_000.0)]),
                ),
                Segment::new(
                    "Food Courts",
                    8_000,
                    75_000_000.0,
                    channels([(0.15, 150_000.0), (0.08, 200_000.0), (0.12, 250_000.0), (0.28, 180_000.0)]),
                ),
                Segment::new(
                    "Cloud Kitchen",
                    12_000,
                    25_000_000.0,
                    channels([(0.18, 80_000.0), (0.15, 90_000.0), (0.20, 110_000.0), (0.22, 100_000.0)]),
                ),
            ],
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| s.name.as_str())
    }

    /// Look up a segment by name.
    pub fn segment(&self, name: &str) -> Result<&Segment> {
        self.segments
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| EstimatorError::UnknownSegment(name.to_string()))
    }

    /// Look up a (segment, channel) pair.
    pub fn channel(&self, segment: &str, channel: &str) -> Result<(&Segment, &Channel)> {
        let seg = self.segment(segment)?;
        Ok((seg, seg.channel(channel)?))
    }

    /// Sum of market sizes over every segment in the catalog.
    pub fn total_market_size(&self) -> u64 {
        self.segments.iter().map(|s| s.market_size).sum()
    }
}

impl Default for MarketCatalog {
    fn default() -> Self {
        Self::indonesian_fnb()
    }
}
