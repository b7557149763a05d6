//! # Host Bridge Traits
//!
//! Capability traits that separate the reconciliation core from the outside
//! world.
//!
//! ## Overview
//!
//! The core never talks to a network socket, a credential file, or the disk
//! directly. Each external concern is a trait here, implemented by an adapter
//! crate (`bridge-desktop`, `provider-youtube`) or by a test fake.
//!
//! ## Traits
//!
//! ### Remote service
//! - [`RemoteCollectionClient`](collection::RemoteCollectionClient) - List, insert into, and remove from a remote playlist
//! - [`HttpClient`](http::HttpClient) - Single-attempt async HTTP used by provider adapters
//!
//! ### Local state
//! - [`FileSystemAccess`](storage::FileSystemAccess) - File I/O backing the result cache
//!
//! ### Utilities
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Adapters must
//! report rejected credentials as `AuthenticationFailed` so the core can tell
//! a fatal session problem from a transient one.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single capability object can
//! be shared behind an `Arc`.

pub mod collection;
pub mod error;
pub mod http;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use collection::{CollectionEntry, MediaStatistics, RemoteCollectionClient};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use storage::FileSystemAccess;
pub use time::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
