//! Configuration types for the route pipeline

use serde::{Deserialize, Serialize};

use crate::types::ProtocolVersion;

/// Price curve sampling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Number of intervals the trade amount is split into; the curve has
    /// `sample_count + 1` points including zero and the full amount
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
}

fn default_sample_count() -> usize {
    10
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_count: default_sample_count(),
        }
    }
}

/// Venues that share an on-chain pool design and accept concatenated paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeableFamily {
    pub name: String,
    /// Lowercase venue-name fragments, matched as substrings
    pub fragments: Vec<String>,
}

impl MergeableFamily {
    pub fn new(name: impl Into<String>, fragments: &[&str]) -> Self {
        Self {
            name: name.into(),
            fragments: fragments.iter().map(|f| f.to_ascii_lowercase()).collect(),
        }
    }

    /// Case-insensitive fragment match against a venue identifier
    pub fn contains(&self, venue: &str) -> bool {
        let venue = venue.to_ascii_lowercase();
        self.fragments
            .iter()
            .any(|f| venue.contains(&f.to_ascii_lowercase()))
    }

    /// Concentrated-liquidity forks sharing the Uniswap V3 path encoding
    pub fn uniswap_v3() -> Self {
        Self::new(
            "uniswap-v3",
            &[
                "uniswapv3",
                "sushiswapv3",
                "pancakeswapv3",
                "quickswapv3",
                "solidlyv3",
            ],
        )
    }
}

/// Route merging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Only rates built for this version are merged
    #[serde(default = "default_eligible_version")]
    pub eligible_version: ProtocolVersion,

    #[serde(default = "default_families")]
    pub families: Vec<MergeableFamily>,
}

fn default_eligible_version() -> ProtocolVersion {
    ProtocolVersion::V6
}

fn default_families() -> Vec<MergeableFamily> {
    vec![MergeableFamily::uniswap_v3()]
}

impl MergeConfig {
    /// Index of the first family claiming this venue
    pub fn family_of(&self, venue: &str) -> Option<usize> {
        self.families.iter().position(|f| f.contains(venue))
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            eligible_version: default_eligible_version(),
            families: default_families(),
        }
    }
}

/// Transaction assembly settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Seconds from now until the default transaction deadline
    #[serde(default = "default_deadline_window_secs")]
    pub deadline_window_secs: u64,
}

fn default_deadline_window_secs() -> u64 {
    600
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            deadline_window_secs: default_deadline_window_secs(),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub sampler: SamplerConfig,

    #[serde(default)]
    pub merge: MergeConfig,

    #[serde(default)]
    pub assembly: AssemblyConfig,
}

impl PipelineConfig {
    /// Parse from JSON, filling absent sections with defaults
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
