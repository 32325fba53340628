//! Venue capability detection
//!
//! Optional venue features are typed: a venue either hands out a handle for
//! a capability or reports it as not supported.

use serde::{Deserialize, Serialize};

/// Optional capability of a venue
#[derive(Debug)]
pub enum Capability<T> {
    Supported(T),
    NotSupported,
}

impl<T> Capability<T> {
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported(_))
    }

    pub fn supported(self) -> Option<T> {
        match self {
            Self::Supported(handle) => Some(handle),
            Self::NotSupported => None,
        }
    }
}

/// Capability summary for one registered venue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueCapabilities {
    pub name: String,
    pub preprocessing: bool,
}
