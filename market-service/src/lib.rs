//! Ticket Market Service
//!
//! Async facade over the marketplace ledger engine:
//!
//! - **Single writer**: every mutation travels through one actor task
//! - **Concurrent reads**: projections go straight to the engine's shared lock
//! - **Observability**: tracing at operation boundaries, Prometheus counters

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod actor;
pub mod config;
pub mod error;
pub mod metrics;
pub mod service;

// Re-exports
pub use actor::{spawn_market_actor, MarketHandle};
pub use config::Config;
pub use error::{Error, Result};
pub use metrics::Metrics;
pub use service::MarketService;
