//! Core type definitions for the aggregator

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::errors::AggregatorError;

/// EVM account or contract address (`0x` + 20 bytes hex)
///
/// Equality and hashing ignore case, so checksummed and lowercase forms of the
/// same address compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// Parse and validate a `0x`-prefixed 20-byte hex address
    pub fn parse(addr: &str) -> Result<Self, AggregatorError> {
        let invalid = || AggregatorError::InvalidAddress {
            address: addr.to_string(),
        };
        let body = addr
            .strip_prefix("0x")
            .or_else(|| addr.strip_prefix("0X"))
            .ok_or_else(invalid)?;
        let bytes = hex::decode(body).map_err(|_| invalid())?;
        if bytes.len() != 20 {
            return Err(invalid());
        }
        Ok(Self(addr.to_string()))
    }

    /// The all-zero address used for "no partner" and placeholder contracts
    pub fn null() -> Self {
        Self(constants::NULL_ADDRESS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_lowercase(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    pub fn is_null(&self) -> bool {
        self.0.eq_ignore_ascii_case(constants::NULL_ADDRESS)
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_ascii_lowercase().hash(state);
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token identity plus decimal precision
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub decimals: u8,
}

impl Token {
    pub fn new(address: Address, decimals: u8) -> Self {
        Self { address, decimals }
    }
}

/// Unsigned token amount in base units, serialized as a decimal string
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(pub BigUint);

impl Amount {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Lossy conversion for ratios; amounts beyond f64 range saturate to infinity
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::INFINITY)
    }
}

impl From<u64> for Amount {
    fn from(v: u64) -> Self {
        Self(BigUint::from(v))
    }
}

impl From<u128> for Amount {
    fn from(v: u128) -> Self {
        Self(BigUint::from(v))
    }
}

impl From<BigUint> for Amount {
    fn from(v: BigUint) -> Self {
        Self(v)
    }
}

impl FromStr for Amount {
    type Err = AggregatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigUint::from_str(s.trim())
            .map(Self)
            .map_err(|_| AggregatorError::InvalidAmount {
                message: format!("not an unsigned integer: {s:?}"),
            })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Which side of the trade is fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    /// Input amount fixed, output variable
    Sell,
    /// Output amount fixed, input variable
    Buy,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sell => "SELL",
            Self::Buy => "BUY",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregator contract generation a rate is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolVersion {
    #[serde(rename = "5")]
    V5,
    #[serde(rename = "6.2")]
    V6,
}

impl ProtocolVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V5 => "5",
            Self::V6 => "6.2",
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregator entrypoint a transaction is routed through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContractMethod {
    // v6 generic
    SwapExactAmountIn,
    SwapExactAmountOut,
    // v6 direct
    SwapExactAmountInOnUniswapV2,
    SwapExactAmountOutOnUniswapV2,
    SwapExactAmountInOnUniswapV3,
    SwapExactAmountOutOnUniswapV3,
    SwapExactAmountInOnBalancerV2,
    SwapExactAmountOutOnBalancerV2,
    SwapExactAmountInOnCurveV1,
    SwapExactAmountInOnCurveV2,
    // v5 generic
    SimpleSwap,
    MultiSwap,
    MegaSwap,
    SimpleBuy,
    Buy,
    // v5 direct
    DirectUniV3Swap,
    DirectUniV3Buy,
    DirectCurveV1Swap,
    DirectBalancerV2GivenInSwap,
    DirectBalancerV2GivenOutSwap,
}

impl ContractMethod {
    /// Direct methods call a single venue without the generic executor
    pub fn is_direct(&self) -> bool {
        matches!(
            self,
            Self::SwapExactAmountInOnUniswapV2
                | Self::SwapExactAmountOutOnUniswapV2
                | Self::SwapExactAmountInOnUniswapV3
                | Self::SwapExactAmountOutOnUniswapV3
                | Self::SwapExactAmountInOnBalancerV2
                | Self::SwapExactAmountOutOnBalancerV2
                | Self::SwapExactAmountInOnCurveV1
                | Self::SwapExactAmountInOnCurveV2
                | Self::DirectUniV3Swap
                | Self::DirectUniV3Buy
                | Self::DirectCurveV1Swap
                | Self::DirectBalancerV2GivenInSwap
                | Self::DirectBalancerV2GivenOutSwap
        )
    }

    /// Generic entrypoint for a side on a given contract version
    pub fn default_for(side: TradeSide, version: ProtocolVersion) -> Self {
        match (version, side) {
            (ProtocolVersion::V6, TradeSide::Sell) => Self::SwapExactAmountIn,
            (ProtocolVersion::V6, TradeSide::Buy) => Self::SwapExactAmountOut,
            (ProtocolVersion::V5, TradeSide::Sell) => Self::MultiSwap,
            (ProtocolVersion::V5, TradeSide::Buy) => Self::Buy,
        }
    }
}

/// EVM chain id
pub type NetworkId = u64;

/// Block number
pub type BlockNumber = u64;

/// Constants
pub mod constants {
    /// All-zero EVM address
    pub const NULL_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

    /// Partner fee applied when no partner is attached
    pub const NO_PARTNER_FEE_PERCENT: &str = "0";
}
