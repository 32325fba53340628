//! Price Curve Sampling
//!
//! Splits the trade amount into evenly spaced sample sizes and asks every
//! candidate venue for a price curve over them.

use aggregator_core::{AggregatorError, Amount, Quote, Result, SamplerConfig};
use futures::future::join_all;
use num_bigint::BigUint;
use venue_client::{PricingQuery, PricingSource};

use crate::state::PriceRequest;

/// Evenly spaced sample amounts from zero to `amount` inclusive.
///
/// `sample[i] = floor(amount * i / sample_count)` in exact integer math, so the
/// first sample is zero and the last is exactly `amount`.
pub fn sample_amounts(amount: &Amount, sample_count: usize) -> Result<Vec<Amount>> {
    if sample_count == 0 {
        return Err(AggregatorError::InvalidAmount {
            message: "sample count must be positive".into(),
        });
    }

    let denom = BigUint::from(sample_count);
    Ok((0..=sample_count)
        .map(|i| Amount(amount.as_biguint() * BigUint::from(i) / &denom))
        .collect())
}

/// A quote is usable when it prices every sample and the full amount.
///
/// A zero terminal amount means the venue cannot fill the full size; keeping
/// it would let a BUY selection pick a free input.
fn is_usable(quote: &Quote, sample_len: usize) -> bool {
    quote.prices.len() == sample_len && quote.terminal_amount().is_some_and(|a| !a.is_zero())
}

/// Collects price curves from the pricing layer
pub struct PriceCurveSampler<'a, P: PricingSource + ?Sized> {
    pricing: &'a P,
    config: &'a SamplerConfig,
}

impl<'a, P: PricingSource + ?Sized> PriceCurveSampler<'a, P> {
    pub fn new(pricing: &'a P, config: &'a SamplerConfig) -> Self {
        Self { pricing, config }
    }

    /// Quote every candidate venue concurrently.
    ///
    /// Quotes come back in venue order, then in the order each venue returned
    /// them. Fails with `NoLiquidity` when no venue produced a usable quote.
    pub async fn sample(&self, request: &PriceRequest) -> Result<Vec<Quote>> {
        let amounts = sample_amounts(&request.amount, self.config.sample_count)?;
        let query = request.pricing_query();

        let per_venue = join_all(
            request
                .venues
                .iter()
                .map(|venue| self.quote_venue(&query, venue, &amounts)),
        )
        .await;

        let quotes: Vec<Quote> = per_venue.into_iter().flatten().collect();
        if quotes.is_empty() {
            return Err(AggregatorError::NoLiquidity {
                src: request.src_token.address.to_string(),
                dest: request.dest_token.address.to_string(),
            });
        }

        tracing::debug!(
            "Sampled {} quotes from {} venues at {} points",
            quotes.len(),
            request.venues.len(),
            amounts.len()
        );
        Ok(quotes)
    }

    /// Quotes from one venue; errors and empty answers count as a decline
    async fn quote_venue(
        &self,
        query: &PricingQuery,
        venue: &str,
        amounts: &[Amount],
    ) -> Vec<Quote> {
        let pools = match self.pricing.pool_identifiers(query, venue).await {
            Ok(pools) if pools.is_empty() => {
                tracing::debug!("{} has no pools for the pair", venue);
                return Vec::new();
            }
            Ok(pools) => pools,
            Err(e) => {
                tracing::warn!("Pool discovery failed on {}: {}", venue, e);
                return Vec::new();
            }
        };

        match self
            .pricing
            .pool_prices(query, venue, amounts, &pools)
            .await
        {
            Ok(quotes) => {
                let total = quotes.len();
                let usable: Vec<Quote> = quotes
                    .into_iter()
                    .filter(|q| is_usable(q, amounts.len()))
                    .collect();
                if usable.len() < total {
                    tracing::debug!(
                        "Dropped {} unusable quotes from {}",
                        total - usable.len(),
                        venue
                    );
                }
                usable
            }
            Err(e) => {
                tracing::warn!("Pricing failed on {}: {}", venue, e);
                Vec::new()
            }
        }
    }
}
