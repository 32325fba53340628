//! Transaction Assembly
//!
//! Turns a finalized rate into a transaction build request: checks the rate
//! and the caller's address, computes the slippage factor, runs every venue's
//! preprocessing step concurrently, reconciles the deadline, and stamps the
//! request with a fresh id.
//!
//! # Preprocessing
//!
//! Every exchange leg in the rate is dispatched at once. Results are written
//! back in route → swap → exchange order regardless of completion order. The
//! first failure fails the whole assembly; no partially preprocessed rate is
//! ever returned.

use std::time::{SystemTime, UNIX_EPOCH};

use aggregator_core::{
    constants::NO_PARTNER_FEE_PERCENT, Address, AggregatorError, Amount, AssemblyConfig, Rate,
    Result, Swap, SwapExchange, TradeSide, VenueError,
};
use futures::future::try_join_all;
use uuid::Uuid;
use venue_client::{DexCallContext, DexCallsPlanner, PreprocessOptions, VenueRegistry};

use crate::constants::PLACEHOLDER_EXECUTION_CONTRACT;
use crate::state::TransactionRequest;

/// Caller's worst acceptable amount relative to the quoted amount.
///
/// The reference is the quoted output for SELL and the quoted input for BUY.
pub fn slippage_factor(rate: &Rate, min_max_amount: &Amount) -> Result<f64> {
    let reference = match rate.side {
        TradeSide::Sell => &rate.dest_amount,
        TradeSide::Buy => &rate.src_amount,
    };
    if reference.is_zero() {
        return Err(AggregatorError::InvalidAmount {
            message: format!("quoted {} amount is zero", rate.side),
        });
    }
    Ok(min_max_amount.to_f64() / reference.to_f64())
}

/// Earliest of the default deadline and every venue-proposed deadline
pub fn reconcile_deadline(default: u64, proposals: impl IntoIterator<Item = Option<u64>>) -> u64 {
    proposals.into_iter().flatten().fold(default, u64::min)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Shared inputs for every leg of one assembly
struct LegPlan<'r> {
    rate: &'r Rate,
    min_max_amount: &'r Amount,
    tx_origin: &'r Address,
    execution_contract: Address,
    slippage_factor: f64,
    is_direct_method: bool,
}

/// Builds transaction requests from finalized rates
pub struct TransactionAssembler<'a> {
    registry: &'a VenueRegistry,
    planner: &'a dyn DexCallsPlanner,
    config: &'a AssemblyConfig,
}

impl<'a> TransactionAssembler<'a> {
    pub fn new(
        registry: &'a VenueRegistry,
        planner: &'a dyn DexCallsPlanner,
        config: &'a AssemblyConfig,
    ) -> Self {
        Self {
            registry,
            planner,
            config,
        }
    }

    /// Assemble with the deadline window starting now
    pub async fn build_transaction(
        &self,
        rate: Rate,
        min_max_amount: &Amount,
        user_address: &Address,
    ) -> Result<TransactionRequest> {
        self.build_transaction_at(rate, min_max_amount, user_address, unix_now())
            .await
    }

    /// Assemble with the deadline window starting at `now` (unix seconds)
    pub async fn build_transaction_at(
        &self,
        mut rate: Rate,
        min_max_amount: &Amount,
        user_address: &Address,
        now: u64,
    ) -> Result<TransactionRequest> {
        Address::parse(user_address.as_str())?;
        rate.validate()?;

        let default_deadline = now.saturating_add(self.config.deadline_window_secs);
        let plan = LegPlan {
            rate: &rate,
            min_max_amount,
            tx_origin: user_address,
            execution_contract: Address::new(PLACEHOLDER_EXECUTION_CONTRACT),
            slippage_factor: slippage_factor(&rate, min_max_amount)?,
            is_direct_method: rate.contract_method.is_direct(),
        };

        let mut legs = Vec::with_capacity(rate.exchange_count());
        for (route_index, route) in rate.best_route.iter().enumerate() {
            for (swap_index, swap) in route.swaps.iter().enumerate() {
                for exchange in &swap.swap_exchanges {
                    legs.push(self.preprocess_leg(&plan, route_index, swap, swap_index, exchange));
                }
            }
        }
        let processed = try_join_all(legs).await?;

        let deadline = reconcile_deadline(
            default_deadline,
            processed.iter().map(|(_, deadline)| *deadline),
        );

        let mut processed = processed.into_iter();
        for exchange in rate
            .best_route
            .iter_mut()
            .flat_map(|r| r.swaps.iter_mut())
            .flat_map(|s| s.swap_exchanges.iter_mut())
        {
            if let Some((rewritten, _)) = processed.next() {
                *exchange = rewritten;
            }
        }

        if deadline < default_deadline {
            tracing::debug!(
                "Deadline tightened by venues: {} -> {}",
                default_deadline,
                deadline
            );
        }
        tracing::info!(
            "Assembled {} transaction over {} legs, deadline {}",
            rate.side,
            rate.exchange_count(),
            deadline
        );

        Ok(TransactionRequest {
            price_route: rate,
            min_max_amount: min_max_amount.to_string(),
            user_address: user_address.clone(),
            partner_address: Address::null(),
            partner_fee_percent: NO_PARTNER_FEE_PERCENT.to_string(),
            deadline: deadline.to_string(),
            uuid: Uuid::new_v4().to_string(),
        })
    }

    /// Preprocess one leg; returns the (possibly rewritten) exchange and the
    /// venue's proposed deadline
    async fn preprocess_leg(
        &self,
        plan: &LegPlan<'_>,
        route_index: usize,
        swap: &Swap,
        swap_index: usize,
        exchange: &SwapExchange,
    ) -> Result<(SwapExchange, Option<u64>)> {
        let venue = self.registry.get(&exchange.exchange).ok_or_else(|| {
            AggregatorError::Configuration(format!(
                "venue {} is not registered",
                exchange.exchange
            ))
        })?;

        let Some(preprocessor) = venue.preprocessing().supported() else {
            return Ok((exchange.clone(), None));
        };

        let lookup = |address: &Address| {
            preprocessor.token_from_address(address).ok_or_else(|| {
                AggregatorError::Configuration(format!(
                    "{} preprocesses transactions but cannot resolve token {}",
                    exchange.exchange, address
                ))
            })
        };
        let src_token = lookup(&swap.src_token)?;
        let dest_token = lookup(&swap.dest_token)?;

        let preprocessing_error = |source: VenueError| AggregatorError::Preprocessing {
            venue: exchange.exchange.clone(),
            source,
        };

        let params = self
            .planner
            .dex_calls_params(&DexCallContext {
                rate: plan.rate,
                route_index,
                swap,
                swap_index,
                exchange,
                min_max_amount: plan.min_max_amount,
                execution_contract: &plan.execution_contract,
            })
            .map_err(preprocessing_error)?;

        let options = PreprocessOptions {
            slippage_factor: plan.slippage_factor,
            tx_origin: plan.tx_origin.clone(),
            execution_contract: plan.execution_contract.clone(),
            is_direct_method: plan.is_direct_method,
            version: plan.rate.version,
            recipient: params.recipient,
        };

        let (rewritten, info) = preprocessor
            .pre_process_transaction(
                exchange.clone(),
                &src_token,
                &dest_token,
                plan.rate.side,
                &options,
            )
            .await
            .map_err(preprocessing_error)?;

        Ok((rewritten, info.deadline))
    }
}
