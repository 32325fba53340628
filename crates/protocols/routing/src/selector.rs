//! Quote Selection
//!
//! Picks one venue's price curve and packages its terminal sample as a
//! single-venue rate.

use aggregator_core::{
    AggregatorError, Amount, Quote, Rate, Result, Route, Swap, SwapExchange, TradeSide,
    FULL_PERCENT,
};

use crate::state::PriceRequest;

/// Chooses which quote becomes the rate
pub trait SelectionPolicy: Send + Sync {
    fn select<'q>(&self, quotes: &'q [Quote], side: TradeSide) -> Option<&'q Quote>;
}

/// Takes the first quote; venues are ranked before they reach the selector
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstReturned;

impl SelectionPolicy for FirstReturned {
    fn select<'q>(&self, quotes: &'q [Quote], _side: TradeSide) -> Option<&'q Quote> {
        quotes.first()
    }
}

/// Highest output for SELL, lowest input for BUY; earlier quotes win ties
#[derive(Debug, Clone, Copy, Default)]
pub struct BestTerminalAmount;

impl SelectionPolicy for BestTerminalAmount {
    fn select<'q>(&self, quotes: &'q [Quote], side: TradeSide) -> Option<&'q Quote> {
        let mut best: Option<(&Quote, &Amount)> = None;
        for quote in quotes {
            let Some(amount) = quote.terminal_amount() else {
                continue;
            };
            let better = match best {
                None => true,
                Some((_, current)) => match side {
                    TradeSide::Sell => amount > current,
                    TradeSide::Buy => amount < current,
                },
            };
            if better {
                best = Some((quote, amount));
            }
        }
        best.map(|(quote, _)| quote)
    }
}

/// Build a single-route, single-hop, single-venue rate from the chosen quote
pub fn select_rate(
    request: &PriceRequest,
    quotes: &[Quote],
    policy: &dyn SelectionPolicy,
) -> Result<Rate> {
    let no_liquidity = || AggregatorError::NoLiquidity {
        src: request.src_token.address.to_string(),
        dest: request.dest_token.address.to_string(),
    };

    let quote = policy.select(quotes, request.side).ok_or_else(no_liquidity)?;
    let quoted = quote.terminal_amount().ok_or_else(no_liquidity)?.clone();

    let (src_amount, dest_amount) = match request.side {
        TradeSide::Sell => (request.amount.clone(), quoted),
        TradeSide::Buy => (quoted, request.amount.clone()),
    };

    let gas_cost = quote.gas_cost.terminal();
    tracing::debug!("Estimated gas cost for {}: {}", quote.exchange, gas_cost);

    let exchange = SwapExchange {
        exchange: quote.exchange.clone(),
        src_amount: src_amount.clone(),
        dest_amount: dest_amount.clone(),
        percent: FULL_PERCENT,
        data: quote.data.clone(),
        pool_addresses: quote.pool_addresses.clone(),
        gas_usd: "0".to_string(),
    };

    Ok(Rate {
        block_number: request.block_number,
        network: request.network,
        side: request.side,
        src_token: request.src_token.address.clone(),
        src_decimals: request.src_token.decimals,
        src_amount,
        dest_token: request.dest_token.address.clone(),
        dest_decimals: request.dest_token.decimals,
        dest_amount,
        best_route: vec![Route {
            percent: FULL_PERCENT,
            swaps: vec![Swap {
                src_token: request.src_token.address.clone(),
                src_decimals: request.src_token.decimals,
                dest_token: request.dest_token.address.clone(),
                dest_decimals: request.dest_token.decimals,
                swap_exchanges: vec![exchange],
            }],
        }],
        version: request.version,
        gas_cost: gas_cost.to_string(),
        gas_cost_usd: "0".to_string(),
        src_usd: "0".to_string(),
        dest_usd: "0".to_string(),
        contract_method: request.contract_method(),
    })
}
