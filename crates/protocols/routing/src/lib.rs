//! Route Construction and Optimization
//!
//! This crate samples venue price curves, selects a quote, merges adjacent
//! same-family hops into multi-leg hops, and assembles the transaction build
//! request with reconciled deadline and slippage bounds.

pub mod assembler;
pub mod constants;
pub mod merger;
pub mod pipeline;
pub mod sampler;
pub mod selector;
pub mod state;

// Re-exports
pub use assembler::{reconcile_deadline, slippage_factor, TransactionAssembler};
pub use merger::{add_gas_usd, merge_routes};
pub use pipeline::RoutePipeline;
pub use sampler::{sample_amounts, PriceCurveSampler};
pub use selector::{select_rate, BestTerminalAmount, FirstReturned, SelectionPolicy};
pub use state::{PriceRequest, TransactionRequest};
