//! Route model: quotes, exchanges, hops, routes, and rates
//!
//! A [`Rate`] is the top-level priced route for one trade request. It splits
//! volume across parallel [`Route`]s; each route is a sequence of [`Swap`]
//! hops; each hop splits its volume across [`SwapExchange`] venues.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AggregatorError;
use crate::types::{Address, Amount, BlockNumber, ContractMethod, NetworkId, ProtocolVersion, TradeSide};

/// Percent total every split level must reach
pub const FULL_PERCENT: u32 = 100;

/// One leg of a path-based venue call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathLeg {
    pub token_in: Address,
    pub token_out: Address,
    /// Venue-specific leg fields (fee tier, pool, tick spacing, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PathLeg {
    pub fn new(token_in: Address, token_out: Address) -> Self {
        Self {
            token_in,
            token_out,
            extra: Map::new(),
        }
    }
}

/// Per-venue payload carried through the pipeline untouched, except for the
/// optional `path` that route merging reads and extends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathLeg>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExchangeData {
    pub fn with_path(path: Vec<PathLeg>) -> Self {
        Self {
            path: Some(path),
            extra: Map::new(),
        }
    }
}

/// Gas estimate reported by a venue, either flat or one entry per sample point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GasCost {
    Scalar(u64),
    Curve(Vec<u64>),
}

impl GasCost {
    /// Estimate at the terminal sample: the last curve entry, or the scalar
    pub fn terminal(&self) -> u64 {
        match self {
            Self::Scalar(gas) => *gas,
            Self::Curve(curve) => curve.last().copied().unwrap_or(0),
        }
    }
}

impl Default for GasCost {
    fn default() -> Self {
        Self::Scalar(0)
    }
}

/// Price curve returned by one venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub exchange: String,
    /// One counter-amount per sample point, monotonic in trade size
    pub prices: Vec<Amount>,
    #[serde(default)]
    pub data: ExchangeData,
    #[serde(default)]
    pub gas_cost: GasCost,
    #[serde(default)]
    pub pool_addresses: Vec<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_identifier: Option<String>,
}

impl Quote {
    /// Counter-amount at the full requested trade size
    pub fn terminal_amount(&self) -> Option<&Amount> {
        self.prices.last()
    }
}

/// One venue's share of a hop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapExchange {
    pub exchange: String,
    pub src_amount: Amount,
    pub dest_amount: Amount,
    pub percent: u32,
    #[serde(default)]
    pub data: ExchangeData,
    #[serde(default)]
    pub pool_addresses: Vec<Address>,
    #[serde(rename = "gasUSD", default = "zero_usd")]
    pub gas_usd: String,
}

impl SwapExchange {
    pub fn path(&self) -> Option<&[PathLeg]> {
        self.data.path.as_deref().filter(|p| !p.is_empty())
    }
}

fn zero_usd() -> String {
    "0".to_string()
}

/// One sequential hop, split across venues in parallel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swap {
    pub src_token: Address,
    pub src_decimals: u8,
    pub dest_token: Address,
    pub dest_decimals: u8,
    pub swap_exchanges: Vec<SwapExchange>,
}

impl Swap {
    /// The hop's exchange when it is not split
    pub fn single_exchange(&self) -> Option<&SwapExchange> {
        match self.swap_exchanges.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

/// One parallel share of the total volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub percent: u32,
    pub swaps: Vec<Swap>,
}

/// Priced route for one trade request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rate {
    pub block_number: BlockNumber,
    pub network: NetworkId,
    pub side: TradeSide,
    pub src_token: Address,
    pub src_decimals: u8,
    pub src_amount: Amount,
    pub dest_token: Address,
    pub dest_decimals: u8,
    pub dest_amount: Amount,
    pub best_route: Vec<Route>,
    pub version: ProtocolVersion,
    pub gas_cost: String,
    #[serde(rename = "gasCostUSD")]
    pub gas_cost_usd: String,
    #[serde(rename = "srcUSD")]
    pub src_usd: String,
    #[serde(rename = "destUSD")]
    pub dest_usd: String,
    pub contract_method: ContractMethod,
}

impl Rate {
    /// Total number of sequential hops across all routes
    pub fn hop_count(&self) -> usize {
        self.best_route.iter().map(|r| r.swaps.len()).sum()
    }

    /// Number of venue legs across all routes and hops
    pub fn exchange_count(&self) -> usize {
        self.best_route
            .iter()
            .flat_map(|r| r.swaps.iter())
            .map(|s| s.swap_exchanges.len())
            .sum()
    }

    /// Check split percentages and hop token continuity
    pub fn validate(&self) -> Result<(), AggregatorError> {
        let invalid = |reason: String| AggregatorError::InvalidRoute { reason };

        if self.best_route.is_empty() {
            return Err(invalid("rate has no routes".into()));
        }

        let route_total: u32 = self.best_route.iter().map(|r| r.percent).sum();
        if route_total != FULL_PERCENT {
            return Err(invalid(format!(
                "route percents sum to {route_total}, expected {FULL_PERCENT}"
            )));
        }

        for (ri, route) in self.best_route.iter().enumerate() {
            let (first, last) = match (route.swaps.first(), route.swaps.last()) {
                (Some(f), Some(l)) => (f, l),
                _ => return Err(invalid(format!("route {ri} has no swaps"))),
            };
            if first.src_token != self.src_token || last.dest_token != self.dest_token {
                return Err(invalid(format!(
                    "route {ri} does not connect {} to {}",
                    self.src_token, self.dest_token
                )));
            }

            for (si, swap) in route.swaps.iter().enumerate() {
                let swap_total: u32 = swap.swap_exchanges.iter().map(|e| e.percent).sum();
                if swap_total != FULL_PERCENT {
                    return Err(invalid(format!(
                        "route {ri} swap {si} exchange percents sum to {swap_total}"
                    )));
                }
            }

            for (si, pair) in route.swaps.windows(2).enumerate() {
                if pair[0].dest_token != pair[1].src_token {
                    return Err(invalid(format!(
                        "route {ri}: swap {si} ends in {} but swap {} starts with {}",
                        pair[0].dest_token,
                        si + 1,
                        pair[1].src_token
                    )));
                }
            }
        }

        Ok(())
    }
}
