//! Estimator configuration: heuristic parameters and the optional catalog table.
//!
//! Loaded from TOML; every section is optional and falls back to the
//! built-in defaults.
//!
//! ```toml
//! [model]
//! capture_fraction = 0.05
//!
//! [curve]
//! points = 50
//!
//! [[segments]]
//! name = "Coffee Shops"
//! market_size = 45000
//! avg_deal_value = 15000000
//! channels = [{ name = "Word of Mouth", conversion_rate = 0.25, cost_per_lead = 50000 }]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{MarketCatalog, Segment};
use crate::error::{EstimatorError, Result};

/// Parameters of the allocation heuristic and the saturation model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Market size at which a segment gets full market weight
    pub reference_market_size: f64,

    /// Max share of the remaining budget a single pair can take
    pub max_remaining_share: f64,

    /// Share of the total budget a fully weighted pair can take
    pub market_weighted_share: f64,

    /// Fraction of the market a channel can absorb per cycle before saturating
    pub capture_fraction: f64,

    /// Slope of the hyperbolic damping past the optimal budget
    pub damping_coefficient: f64,

    /// Revenue ramp time constant, as a fraction of the timeline
    pub revenue_ramp: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            reference_market_size: 50_000.0,
            max_remaining_share: 0.30,
            market_weighted_share: 0.15,
            capture_fraction: 0.05,
            damping_coefficient: 0.5,
            revenue_ramp: 0.3,
        }
    }
}

impl ModelParams {
    pub fn validate(&self) -> Result<()> {
        let share = |name: &str, v: f64| {
            if v > 0.0 && v <= 1.0 {
                Ok(())
            } else {
                Err(EstimatorError::invalid_config(format!(
                    "{name} must be within (0, 1] (got {v})"
                )))
            }
        };
        share("max_remaining_share", self.max_remaining_share)?;
        share("market_weighted_share", self.market_weighted_share)?;
        share("capture_fraction", self.capture_fraction)?;

        if !(self.reference_market_size.is_finite() && self.reference_market_size > 0.0) {
            return Err(EstimatorError::invalid_config(format!(
                "reference_market_size must be > 0 (got {})",
                self.reference_market_size
            )));
        }
        if !(self.damping_coefficient.is_finite() && self.damping_coefficient > 0.0) {
            return Err(EstimatorError::invalid_config(format!(
                "damping_coefficient must be > 0 (got {})",
                self.damping_coefficient
            )));
        }
        if !(self.revenue_ramp.is_finite() && self.revenue_ramp > 0.0) {
            return Err(EstimatorError::invalid_config(format!(
                "revenue_ramp must be > 0 (got {})",
                self.revenue_ramp
            )));
        }

        Ok(())
    }
}

/// Budget sweep used for the diminishing-returns curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveParams {
    /// Lowest sweep point, as a multiple of the base budget
    pub low_multiplier: f64,

    /// Highest sweep point, as a multiple of the base budget
    pub high_multiplier: f64,

    /// Number of sweep points (inclusive of both ends)
    pub points: usize,

    /// Base budget used when the pair has no allocation
    pub fallback_budget: f64,
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            low_multiplier: 0.1,
            high_multiplier: 3.0,
            points: 50,
            fallback_budget: 1_000_000.0,
        }
    }
}

impl CurveParams {
    pub fn validate(&self) -> Result<()> {
        if self.points < 2 {
            return Err(EstimatorError::invalid_config(format!(
                "curve points must be >= 2 (got {})",
                self.points
            )));
        }
        if !(self.low_multiplier > 0.0 && self.high_multiplier > self.low_multiplier) {
            return Err(EstimatorError::invalid_config(format!(
                "curve multipliers must satisfy 0 < low < high (got {} .. {})",
                self.low_multiplier, self.high_multiplier
            )));
        }
        if !(self.fallback_budget.is_finite() && self.fallback_budget > 0.0) {
            return Err(EstimatorError::invalid_config(format!(
                "fallback_budget must be > 0 (got {})",
                self.fallback_budget
            )));
        }
        Ok(())
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    #[serde(default)]
    pub model: ModelParams,

    #[serde(default)]
    pub curve: CurveParams,

    /// Catalog table; empty means the built-in Indonesian F&B catalog
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl EstimatorConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(
            target: "roi.config",
            path = %path.display(),
            segments = config.segments.len(),
            "Loaded estimator config"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;
        self.curve.validate()
    }

    /// Build the market catalog described by this config
    pub fn catalog(&self) -> Result<MarketCatalog> {
        if self.segments.is_empty() {
            Ok(MarketCatalog::indonesian_fnb())
        } else {
            MarketCatalog::new(self.segments.clone())
        }
    }
}
