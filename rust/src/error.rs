use thiserror::Error;

/// Result type for estimator operations
pub type Result<T> = std::result::Result<T, EstimatorError>;

/// Errors raised by the allocation and projection engine
#[derive(Error, Debug)]
pub enum EstimatorError {
    /// No segment was selected for the campaign
    #[error("At least one target segment must be selected")]
    EmptySelection,

    /// Budget is negative or not a finite number
    #[error("Invalid budget: {0}")]
    InvalidBudget(f64),

    /// Timeline must cover at least one month
    #[error("Invalid timeline: {0} months")]
    InvalidTimeline(u32),

    /// Segment name not present in the catalog
    #[error("Unknown segment: {0}")]
    UnknownSegment(String),

    /// Channel name not present in the segment
    #[error("Unknown channel '{channel}' in segment '{segment}'")]
    UnknownChannel { segment: String, channel: String },

    /// Catalog data violates a reference-data invariant
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Model parameters out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EstimatorError {
    /// Create an unknown channel error
    pub fn unknown_channel(segment: impl Into<String>, channel: impl Into<String>) -> Self {
        Self::UnknownChannel {
            segment: segment.into(),
            channel: channel.into(),
        }
    }

    /// Create an invalid catalog error
    pub fn invalid_catalog(msg: impl Into<String>) -> Self {
        Self::InvalidCatalog(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
