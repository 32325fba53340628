//! End-to-end route pipeline
//!
//! trade request → sampling → selection → merging → assembly

use aggregator_core::{Address, Amount, PipelineConfig, Rate, Result};
use venue_client::{DexCallsPlanner, PricingSource, VenueRegistry};

use crate::assembler::TransactionAssembler;
use crate::merger::merge_routes;
use crate::sampler::PriceCurveSampler;
use crate::selector::{select_rate, FirstReturned, SelectionPolicy};
use crate::state::{PriceRequest, TransactionRequest};

/// Wires the pipeline stages to their collaborators
pub struct RoutePipeline<'a> {
    config: &'a PipelineConfig,
    pricing: &'a dyn PricingSource,
    registry: &'a VenueRegistry,
    planner: &'a dyn DexCallsPlanner,
    policy: &'a dyn SelectionPolicy,
}

impl<'a> RoutePipeline<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        pricing: &'a dyn PricingSource,
        registry: &'a VenueRegistry,
        planner: &'a dyn DexCallsPlanner,
    ) -> Self {
        Self {
            config,
            pricing,
            registry,
            planner,
            policy: &FirstReturned,
        }
    }

    /// Replace the default first-returned selection policy
    pub fn with_policy(mut self, policy: &'a dyn SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sample, select, and merge: the optimized rate for a request
    pub async fn price(&self, request: &PriceRequest) -> Result<Rate> {
        let quotes = PriceCurveSampler::new(self.pricing, &self.config.sampler)
            .sample(request)
            .await?;
        let rate = select_rate(request, &quotes, self.policy)?;
        let rate = merge_routes(rate, &self.config.merge);
        rate.validate()?;
        Ok(rate)
    }

    /// Preprocess and package a rate for the transaction builder
    pub async fn build_transaction(
        &self,
        rate: Rate,
        min_max_amount: &Amount,
        user_address: &Address,
    ) -> Result<TransactionRequest> {
        self.assembler()
            .build_transaction(rate, min_max_amount, user_address)
            .await
    }

    pub fn assembler(&self) -> TransactionAssembler<'_> {
        TransactionAssembler::new(self.registry, self.planner, &self.config.assembly)
    }
}
