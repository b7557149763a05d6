//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the playlist sync core:
//! - Logging and tracing infrastructure
//! - Run configuration
//!
//! ## Overview
//!
//! Every run of the reconciliation engine is driven by an explicit
//! [`ReconcileConfig`](config::ReconcileConfig) value. Nothing here holds
//! process-wide mutable state apart from the global tracing subscriber.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CachePolicy, ReconcileConfig, ReconcileConfigBuilder, SourceSelection};
pub use error::{Error, Result};
