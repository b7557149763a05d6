//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `FileSystemAccess` using `tokio::fs`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, TokioFileSystem};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let http_client = Arc::new(ReqwestHttpClient::new()?);
//!     let fs = Arc::new(TokioFileSystem::new());
//!
//!     // Hand both to the provider adapter and the reconciliation runner
//!     Ok(())
//! }
//! ```

mod filesystem;
mod http;

pub use filesystem::TokioFileSystem;
pub use http::ReqwestHttpClient;
