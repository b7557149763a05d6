//! # YouTube Provider
//!
//! Implements `RemoteCollectionClient` for the YouTube Data API v3.
//!
//! ## Overview
//!
//! This module provides:
//! - Paginated playlist listing (`playlistItems.list`)
//! - Membership insert and delete (`playlistItems.insert`, `playlistItems.delete`)
//! - Per-video view and like counters (`videos.list?part=statistics`)
//!
//! The access token is supplied by the caller. Obtaining and refreshing it
//! is outside this crate. Every request is a single attempt.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::YouTubeConnector;
pub use error::{Result, YouTubeError};
