//! # Playlist Reconciliation Engine
//!
//! Keeps a target collection in step with a source collection on a remote
//! media service.
//!
//! ## Overview
//!
//! A run fetches both collections, removes duplicate and placeholder
//! memberships from the target, and inserts a bounded number of source items
//! the target is missing. All remote access goes through one
//! [`RemoteCollectionClient`](bridge_traits::RemoteCollectionClient)
//! capability object, and all persisted state lives in the CSV result cache.
//!
//! ## Components
//!
//! - **Collection Fetcher** (`fetcher`): Follows pagination cursors, returns partial snapshots on transient failure
//! - **Result Cache** (`cache`): Atomic, file-presence CSV memo per collection and row kind
//! - **Deduplication Index** (`dedup`): First-seen-wins duplicate and invalid-title detection
//! - **Incremental Sync Planner** (`planner`): Pure, order-preserving, bounded set difference
//! - **Run State Machine** (`run`): Planning → Mutating → Done with per-mutation outcomes
//! - **Reconciliation Runner** (`runner`): Orchestrates fetch, dedup, plan and mutate
//! - **Exports** (`export`): Statistics and membership row sets through the cache
//! - **Reports** (`report`): Artist frequencies and statistics rankings

pub mod cache;
pub mod dedup;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod models;
pub mod planner;
pub mod report;
pub mod run;
pub mod runner;
pub mod title;

#[cfg(test)]
pub(crate) mod test_support;

pub use cache::{
    CacheKey, CacheKind, CacheRecord, MembershipRow, ResultCache, SnapshotRow, StatisticsRow,
};
pub use dedup::{find_duplicates, find_invalid, find_removals, FlaggedMembership, RemovalReason};
pub use error::{Result, SyncError};
pub use export::{membership_rows, MembershipExporter, StatisticsCollector};
pub use fetcher::CollectionFetcher;
pub use models::{CollectionSnapshot, Completeness, MediaItem};
pub use planner::{plan, plan_filtered, plan_with_selection, DiffPlan};
pub use report::{artist_report, ArtistCount, StatisticsSummary};
pub use run::{
    MutationKind, MutationOutcome, MutationResult, ReconciliationRun, RunId, RunPhase,
};
pub use runner::{ReconciliationRunner, RunReport};
pub use title::{parse_title, ParsedTitle, UNKNOWN_ARTIST};
