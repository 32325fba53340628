//! Routing constants

/// Fractional digits kept when summing per-leg gas costs in USD
pub const GAS_USD_DECIMALS: u32 = 6;

/// Execution contract passed to preprocessing before one is chosen
pub const PLACEHOLDER_EXECUTION_CONTRACT: &str = aggregator_core::constants::NULL_ADDRESS;
