//! Workspace facade crate.
//!
//! Re-exports the workspace crates so a host application can depend on
//! `playlist-sync-workspace` alone and pick adapters with feature flags:
//!
//! - `desktop-shims` (default): `bridge-desktop` implementations of the
//!   HTTP and file system capabilities, injected by `ReconcileConfig::builder`
//! - `youtube` (default): the YouTube Data API collection client

pub use bridge_traits;
pub use core_runtime;
pub use core_sync;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;

#[cfg(feature = "youtube")]
pub use provider_youtube;
