//! Error types for the aggregator

use thiserror::Error;

/// Errors raised by the route pipeline
///
/// Every variant bubbles to the immediate caller unchanged. Nothing in the
/// pipeline retries; a failed request restarts from price sampling.
#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("No liquidity for {src} -> {dest}: every venue declined to quote")]
    NoLiquidity { src: String, dest: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Preprocessing failed on {venue}: {source}")]
    Preprocessing {
        venue: String,
        #[source]
        source: VenueError,
    },

    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Invalid address: {address}")]
    InvalidAddress { address: String },

    #[error("Invalid route: {reason}")]
    InvalidRoute { reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors reported by venue collaborators (pricing, preprocessing, planning)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VenueError {
    #[error("Venue unavailable: {0}")]
    Unavailable(String),

    #[error("Unsupported pair {src} -> {dest}")]
    UnsupportedPair { src: String, dest: String },

    #[error("Request rejected: {0}")]
    Rejected(String),
}

/// Result type alias for aggregator operations
pub type Result<T> = std::result::Result<T, AggregatorError>;

impl AggregatorError {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoLiquidity { .. } => "no_liquidity",
            Self::Configuration(_) => "configuration_error",
            Self::Preprocessing { .. } => "preprocessing_failed",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::InvalidAddress { .. } => "invalid_address",
            Self::InvalidRoute { .. } => "invalid_route",
            Self::Serialization(_) => "serialization_error",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount { .. } | Self::InvalidAddress { .. } => 400,
            Self::NoLiquidity { .. } | Self::InvalidRoute { .. } => 422,
            Self::Preprocessing { .. } => 502,
            Self::Configuration(_) | Self::Serialization(_) => 500,
        }
    }
}

impl From<serde_json::Error> for AggregatorError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
