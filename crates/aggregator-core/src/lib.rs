//! aggregator-core: Shared types, route model, errors, and configuration
//!
//! This crate provides the foundational types used across the aggregator workspace.

pub mod config;
pub mod errors;
pub mod route;
pub mod types;

pub use config::*;
pub use errors::*;
pub use route::*;
pub use types::*;
