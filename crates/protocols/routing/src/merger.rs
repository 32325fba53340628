//! Route Merging
//!
//! Fuses runs of consecutive single-venue hops whose venues share a pool
//! family into one multi-leg hop, so the executor makes one path call instead
//! of several.
//!
//! A hop can join a run when it has exactly one exchange, that exchange's
//! venue belongs to a mergeable family, and its data carries a path. It
//! extends the open run when the run belongs to the same family and the run's
//! last leg ends in the token this hop's first leg starts with.

use std::str::FromStr;

use aggregator_core::{MergeConfig, Rate, Swap};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::GAS_USD_DECIMALS;

/// Merge adjacent same-family hops in every route.
///
/// Rates built for any version other than `config.eligible_version` are
/// returned unchanged.
pub fn merge_routes(mut rate: Rate, config: &MergeConfig) -> Rate {
    if rate.version != config.eligible_version {
        return rate;
    }

    let hops_before = rate.hop_count();
    for route in &mut rate.best_route {
        let swaps = std::mem::take(&mut route.swaps);
        route.swaps = merge_swaps(swaps, config);
    }

    let hops_after = rate.hop_count();
    if hops_after < hops_before {
        tracing::info!("Merged route hops: {} -> {}", hops_before, hops_after);
    }
    rate
}

/// Family index of a hop that may join a run
fn mergeable_family(swap: &Swap, config: &MergeConfig) -> Option<usize> {
    let exchange = swap.single_exchange()?;
    exchange.path()?;
    config.family_of(&exchange.exchange)
}

/// Fold one route's hops, fusing into the last emitted hop by index
fn merge_swaps(swaps: Vec<Swap>, config: &MergeConfig) -> Vec<Swap> {
    let mut merged: Vec<Swap> = Vec::with_capacity(swaps.len());
    // (index into `merged`, family) of the run still open for extension
    let mut pending: Option<(usize, usize)> = None;

    for swap in swaps {
        let Some(family) = mergeable_family(&swap, config) else {
            merged.push(swap);
            pending = None;
            continue;
        };

        match pending {
            Some((idx, pending_family))
                if pending_family == family && continues_path(&merged[idx], &swap) =>
            {
                fuse(&mut merged[idx], swap);
            }
            _ => {
                merged.push(swap);
                pending = Some((merged.len() - 1, family));
            }
        }
    }

    merged
}

/// Whether `next` starts where the open run's path ends
fn continues_path(run: &Swap, next: &Swap) -> bool {
    let run_end = run
        .single_exchange()
        .and_then(|e| e.path())
        .and_then(|p| p.last());
    let next_start = next
        .single_exchange()
        .and_then(|e| e.path())
        .and_then(|p| p.first());

    match (run_end, next_start) {
        (Some(end), Some(start)) => end.token_out == start.token_in,
        _ => false,
    }
}

/// Extend the run with `next`: path legs, pools, gas, and the new endpoint
fn fuse(run: &mut Swap, next: Swap) {
    run.dest_token = next.dest_token;
    run.dest_decimals = next.dest_decimals;

    let Some(next_exchange) = next.swap_exchanges.into_iter().next() else {
        return;
    };
    let Some(run_exchange) = run.swap_exchanges.first_mut() else {
        return;
    };

    if let Some(legs) = next_exchange.data.path {
        run_exchange.data.path.get_or_insert_with(Vec::new).extend(legs);
    }
    run_exchange
        .pool_addresses
        .extend(next_exchange.pool_addresses);
    run_exchange.gas_usd = add_gas_usd(&run_exchange.gas_usd, &next_exchange.gas_usd);
    run_exchange.dest_amount = next_exchange.dest_amount;
}

/// Sum two USD decimal strings, rounded to six fractional digits.
///
/// Ties round away from zero, so `0.0000005` becomes `0.000001`.
pub fn add_gas_usd(a: &str, b: &str) -> String {
    let mut total = parse_usd(a) + parse_usd(b);
    total =
        total.round_dp_with_strategy(GAS_USD_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    total.rescale(GAS_USD_DECIMALS);
    total.to_string()
}

fn parse_usd(value: &str) -> Decimal {
    Decimal::from_str(value.trim())
        .or_else(|_| Decimal::from_scientific(value.trim()))
        .unwrap_or_else(|_| {
            tracing::warn!("Unparseable gas USD value {:?}, counting as zero", value);
            Decimal::ZERO
        })
}
