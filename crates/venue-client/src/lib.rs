//! venue-client: Interfaces to the venue collaborators with capability detection
//!
//! This crate defines what the route pipeline consumes from the outside:
//! price curves, per-venue transaction preprocessing, and dex-call planning.
//! Venue implementations live elsewhere and are looked up by name through
//! [`VenueRegistry`].

pub mod capabilities;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use aggregator_core::{
    Address, Amount, BlockNumber, ProtocolVersion, Quote, Rate, Swap, SwapExchange, Token,
    TradeSide, VenueError,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use capabilities::{Capability, VenueCapabilities};

/// Result type for venue collaborator calls
pub type Result<T> = std::result::Result<T, VenueError>;

/// Transfer-tax parameters for fee-on-transfer tokens, in basis points
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferFeeParams {
    pub src_fee: u32,
    pub dest_fee: u32,
    pub src_dex_fee: u32,
    pub dest_dex_fee: u32,
}

/// Pair, side, and chain state a price curve is requested for
#[derive(Debug, Clone)]
pub struct PricingQuery {
    pub src_token: Token,
    pub dest_token: Token,
    pub side: TradeSide,
    pub block_number: BlockNumber,
    pub transfer_fees: TransferFeeParams,
}

/// Pricing layer: pool discovery and per-venue price curves
#[async_trait]
pub trait PricingSource: Send + Sync {
    /// Pool identifiers eligible for the pair on one venue. Empty means the
    /// venue has nothing to offer.
    async fn pool_identifiers(&self, query: &PricingQuery, venue: &str) -> Result<Vec<String>>;

    /// Price curves over `amounts` for one venue. Empty means the venue
    /// declined to quote.
    async fn pool_prices(
        &self,
        query: &PricingQuery,
        venue: &str,
        amounts: &[Amount],
        pool_identifiers: &[String],
    ) -> Result<Vec<Quote>>;
}

/// Options handed to a venue's transaction preprocessing
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessOptions {
    /// Caller's worst acceptable amount over the quoted amount
    pub slippage_factor: f64,
    pub tx_origin: Address,
    pub execution_contract: Address,
    pub is_direct_method: bool,
    pub version: ProtocolVersion,
    pub recipient: Address,
}

/// Side information returned with a preprocessed exchange
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreprocessInfo {
    /// Latest unix timestamp (seconds) the venue accepts for this leg
    pub deadline: Option<u64>,
}

/// Venue-side preparation of an exchange leg before encoding
#[async_trait]
pub trait Preprocessor: Send + Sync {
    /// Reverse token lookup the preprocessing step depends on
    fn token_from_address(&self, address: &Address) -> Option<Token>;

    async fn pre_process_transaction(
        &self,
        exchange: SwapExchange,
        src_token: &Token,
        dest_token: &Token,
        side: TradeSide,
        options: &PreprocessOptions,
    ) -> Result<(SwapExchange, PreprocessInfo)>;
}

/// A liquidity venue known to the registry
pub trait Venue: Send + Sync {
    fn name(&self) -> &str;

    fn preprocessing(&self) -> Capability<&dyn Preprocessor> {
        Capability::NotSupported
    }

    fn capabilities(&self) -> VenueCapabilities {
        VenueCapabilities {
            name: self.name().to_string(),
            preprocessing: self.preprocessing().is_supported(),
        }
    }
}

/// Position of one exchange leg inside a rate
#[derive(Debug, Clone, Copy)]
pub struct DexCallContext<'a> {
    pub rate: &'a Rate,
    pub route_index: usize,
    pub swap: &'a Swap,
    pub swap_index: usize,
    pub exchange: &'a SwapExchange,
    pub min_max_amount: &'a Amount,
    pub execution_contract: &'a Address,
}

/// Call parameters computed for one exchange leg
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexCallsParams {
    /// Account that receives this leg's output
    pub recipient: Address,
}

/// Builds per-leg call parameters for the execution contract
pub trait DexCallsPlanner: Send + Sync {
    fn dex_calls_params(&self, ctx: &DexCallContext<'_>) -> Result<DexCallsParams>;
}

/// Routes every leg's output back to the execution contract
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutorRecipient;

impl DexCallsPlanner for ExecutorRecipient {
    fn dex_calls_params(&self, ctx: &DexCallContext<'_>) -> Result<DexCallsParams> {
        Ok(DexCallsParams {
            recipient: ctx.execution_contract.clone(),
        })
    }
}

/// Venue implementations by case-insensitive name
#[derive(Clone, Default)]
pub struct VenueRegistry {
    venues: HashMap<String, Arc<dyn Venue>>,
}

impl VenueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a venue, replacing any previous one with the same name
    pub fn register(&mut self, venue: Arc<dyn Venue>) {
        let key = venue.name().to_ascii_lowercase();
        if self.venues.insert(key, venue).is_some() {
            tracing::debug!("Replaced registered venue");
        }
    }

    pub fn with(mut self, venue: Arc<dyn Venue>) -> Self {
        self.register(venue);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Venue>> {
        self.venues.get(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    /// Capability summaries, sorted by venue name
    pub fn capabilities(&self) -> Vec<VenueCapabilities> {
        let mut caps: Vec<_> = self.venues.values().map(|v| v.capabilities()).collect();
        caps.sort_by(|a, b| a.name.cmp(&b.name));
        caps
    }
}

impl fmt::Debug for VenueRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.venues.keys().collect();
        names.sort();
        f.debug_struct("VenueRegistry").field("venues", &names).finish()
    }
}
