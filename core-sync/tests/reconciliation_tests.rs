//! Integration tests for the reconciliation workflow
//!
//! These tests drive the public API end to end against an in-memory remote
//! service and a temporary cache directory:
//! - Planning scenarios (set difference, limits, order)
//! - Duplicate and placeholder detection
//! - Cache round-trip and short-circuit
//! - Partial snapshots and failure isolation
//! - Header validation of cache records

use async_trait::async_trait;
use bridge_desktop::TokioFileSystem;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    CollectionEntry, MediaStatistics, RemoteCollectionClient,
};
use core_runtime::config::{CachePolicy, ReconcileConfig};
use core_sync::{
    artist_report, find_duplicates, find_invalid, plan, CollectionSnapshot, MediaItem,
    MembershipExporter, ReconciliationRunner, ResultCache, RunPhase, StatisticsCollector,
    StatisticsRow, SyncError,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex as AsyncMutex;

// ============================================================================
// Mock Implementations
// ============================================================================

/// Remote service that applies mutations to its own state, so a second run
/// observes the first run's insertions and removals.
struct InMemoryPlaylistService {
    playlists: AsyncMutex<HashMap<String, Vec<CollectionEntry>>>,
    page_size: usize,
    failing_pages: HashSet<(String, usize)>,
    failing_inserts: HashSet<String>,
    next_membership: AtomicUsize,
    list_calls: AtomicUsize,
}

impl InMemoryPlaylistService {
    fn new(page_size: usize) -> Self {
        Self {
            playlists: AsyncMutex::new(HashMap::new()),
            page_size,
            failing_pages: HashSet::new(),
            failing_inserts: HashSet::new(),
            next_membership: AtomicUsize::new(1000),
            list_calls: AtomicUsize::new(0),
        }
    }

    fn with_playlist(self, id: &str, media: &[(&str, &str)]) -> Self {
        let entries = media
            .iter()
            .enumerate()
            .map(|(i, (media_id, title))| {
                CollectionEntry::new(*media_id, *title, format!("{}-{}", id, i))
            })
            .collect();
        self.playlists
            .try_lock()
            .expect("uncontended during setup")
            .insert(id.to_string(), entries);
        self
    }

    fn failing_page(mut self, id: &str, page: usize) -> Self {
        self.failing_pages.insert((id.to_string(), page));
        self
    }

    fn failing_insert(mut self, media_id: &str) -> Self {
        self.failing_inserts.insert(media_id.to_string());
        self
    }

    async fn media_ids(&self, id: &str) -> Vec<String> {
        self.playlists
            .lock()
            .await
            .get(id)
            .map(|entries| entries.iter().map(|e| e.media_id.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RemoteCollectionClient for InMemoryPlaylistService {
    async fn list_items(
        &self,
        collection_id: &str,
        cursor: Option<String>,
    ) -> BridgeResult<(Vec<CollectionEntry>, Option<String>)> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let page: usize = cursor.as_deref().unwrap_or("0").parse().unwrap_or(0);

        if self.failing_pages.contains(&(collection_id.to_string(), page)) {
            return Err(BridgeError::OperationFailed("backend error".to_string()));
        }

        let playlists = self.playlists.lock().await;
        let entries = playlists.get(collection_id).cloned().unwrap_or_default();
        let start = page * self.page_size;
        let end = (start + self.page_size).min(entries.len());
        let items = entries.get(start..end).map(<[_]>::to_vec).unwrap_or_default();
        let next = (end < entries.len()).then(|| (page + 1).to_string());

        Ok((items, next))
    }

    async fn insert_item(&self, collection_id: &str, media_id: &str) -> BridgeResult<()> {
        if self.failing_inserts.contains(media_id) {
            return Err(BridgeError::OperationFailed("quota exceeded".to_string()));
        }
        let membership = self.next_membership.fetch_add(1, Ordering::SeqCst);
        self.playlists
            .lock()
            .await
            .entry(collection_id.to_string())
            .or_default()
            .push(CollectionEntry::new(
                media_id,
                format!("title {}", media_id),
                format!("new-{}", membership),
            ));
        Ok(())
    }

    async fn remove_membership(&self, membership_id: &str) -> BridgeResult<()> {
        let mut playlists = self.playlists.lock().await;
        for entries in playlists.values_mut() {
            entries.retain(|e| e.membership_id != membership_id);
        }
        Ok(())
    }

    async fn media_statistics(&self, media_id: &str) -> BridgeResult<MediaStatistics> {
        let views = media_id.bytes().map(u64::from).sum();
        Ok(MediaStatistics { views, likes: 1 })
    }
}

fn config(limit: usize) -> ReconcileConfig {
    ReconcileConfig::builder()
        .source_id("SRC")
        .target_id("DST")
        .insert_limit(limit)
        .cache_policy(CachePolicy::disabled())
        .build()
        .unwrap()
}

fn cached_config(dir: &TempDir, limit: usize) -> ReconcileConfig {
    ReconcileConfig::builder()
        .source_id("SRC")
        .target_id("DST")
        .insert_limit(limit)
        .cache_dir(dir.path())
        .file_system(Arc::new(TokioFileSystem::with_cache_directory(
            dir.path().to_path_buf(),
        )))
        .build()
        .unwrap()
}

fn cache_in(dir: &TempDir) -> Arc<ResultCache> {
    let fs = Arc::new(TokioFileSystem::with_cache_directory(dir.path().to_path_buf()));
    Arc::new(ResultCache::new(fs, dir.path()))
}

fn snapshot(ids: &[&str]) -> CollectionSnapshot {
    CollectionSnapshot::complete(
        "PL",
        ids.iter()
            .enumerate()
            .map(|(i, id)| MediaItem::new(*id, *id, format!("m{}", i), i))
            .collect(),
    )
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_scenario_set_difference_with_limit() {
    let service = Arc::new(
        InMemoryPlaylistService::new(2)
            .with_playlist("SRC", &[("A", "a"), ("B", "b"), ("C", "c"), ("D", "d")])
            .with_playlist("DST", &[("B", "b"), ("D", "d")]),
    );

    let runner = ReconciliationRunner::new(service.clone(), config(2)).unwrap();
    let report = runner.run().await.unwrap();

    assert_eq!(report.inserted_ids(), vec!["A", "C"]);
    assert_eq!(service.media_ids("DST").await, vec!["B", "D", "A", "C"]);
}

#[test]
fn test_scenario_second_occurrence_flagged() {
    let s = snapshot(&["A", "A", "B"]);
    assert_eq!(find_duplicates(&s), vec!["m1"]);
}

#[test]
fn test_scenario_placeholders_flagged() {
    let s = CollectionSnapshot::complete(
        "PL",
        vec![
            MediaItem::new("X", "Deleted video", "m0", 0),
            MediaItem::new("Y", "Private video", "m1", 1),
            MediaItem::new("X", "Deleted video", "m2", 2),
            MediaItem::new("Z", "Fine", "m3", 3),
        ],
    );
    let titles = ["Deleted video", "Private video"];
    assert_eq!(find_invalid(&s, &titles), vec!["m0", "m1", "m2"]);
}

#[test]
fn test_scenario_zero_limit() {
    let p = plan(&snapshot(&["A", "B"]), &snapshot(&[]), 0);
    assert!(p.selected.is_empty());
}

#[tokio::test]
async fn test_scenario_missing_artist_column() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("membership_SRC.csv"),
        "Title,Media ID,Song\nA - b,v1,b\n",
    )
    .unwrap();

    let result = artist_report(&cache_in(&dir), "SRC", "Artist", 20).await;

    match result {
        Err(SyncError::Validation { column, .. }) => assert_eq!(column, "Artist"),
        other => panic!("expected validation error, got {:?}", other),
    }
}

// ============================================================================
// Properties
// ============================================================================

#[tokio::test]
async fn test_runs_converge_and_dedup_is_complete() {
    let service = Arc::new(
        InMemoryPlaylistService::new(3)
            .with_playlist(
                "SRC",
                &[("A", "a"), ("B", "b"), ("C", "c"), ("D", "d"), ("E", "e")],
            )
            .with_playlist(
                "DST",
                &[("C", "c"), ("C", "c"), ("Q", "Deleted video"), ("A", "a"), ("C", "c")],
            ),
    );
    let runner = ReconciliationRunner::new(service.clone(), config(2)).unwrap();

    let first = runner.run().await.unwrap();
    assert_eq!(first.removed_ids().len(), 3);
    assert_eq!(first.inserted_ids(), vec!["B", "D"]);

    let second = runner.run().await.unwrap();
    assert!(second.removed_ids().is_empty());
    assert_eq!(second.inserted_ids(), vec!["E"]);

    let third = runner.run().await.unwrap();
    assert_eq!(third.attempted(), 0);
    assert_eq!(third.phase, RunPhase::Done);

    let ids = service.media_ids("DST").await;
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());
    assert_eq!(ids, vec!["C", "A", "B", "D", "E"]);
}

#[tokio::test]
async fn test_partial_target_blocks_mutations() {
    let service = Arc::new(
        InMemoryPlaylistService::new(1)
            .with_playlist("SRC", &[("A", "a")])
            .with_playlist("DST", &[("B", "b"), ("B", "b")])
            .failing_page("DST", 1),
    );
    let runner = ReconciliationRunner::new(service.clone(), config(5)).unwrap();

    let report = runner.run().await.unwrap();

    assert_eq!(report.attempted(), 0);
    assert_eq!(service.media_ids("DST").await, vec!["B", "B"]);
}

#[tokio::test]
async fn test_failed_insert_does_not_stop_run() {
    let service = Arc::new(
        InMemoryPlaylistService::new(10)
            .with_playlist("SRC", &[("A", "a"), ("B", "b"), ("C", "c")])
            .with_playlist("DST", &[])
            .failing_insert("B"),
    );
    let runner = ReconciliationRunner::new(service.clone(), config(5)).unwrap();

    let report = runner.run().await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.inserted_ids(), vec!["A", "C"]);
    assert_eq!(report.phase, RunPhase::Done);
}

#[tokio::test]
async fn test_source_cache_short_circuits_fetch() {
    let dir = TempDir::new().unwrap();
    let service = Arc::new(
        InMemoryPlaylistService::new(2)
            .with_playlist("SRC", &[("A", "a"), ("B", "b"), ("C", "c")])
            .with_playlist("DST", &[]),
    );
    let runner = ReconciliationRunner::new(service.clone(), cached_config(&dir, 1)).unwrap();

    runner.run().await.unwrap();
    let after_first = service.list_calls.load(Ordering::SeqCst);
    runner.run().await.unwrap();
    let after_second = service.list_calls.load(Ordering::SeqCst);

    // Source has two pages; only the one-page target is listed again.
    assert_eq!(after_first, 3);
    assert_eq!(after_second, 4);
    assert_eq!(service.media_ids("DST").await, vec!["A", "B"]);
}

#[tokio::test]
async fn test_statistics_cache_round_trip() {
    let dir = TempDir::new().unwrap();
    let service = Arc::new(
        InMemoryPlaylistService::new(2).with_playlist("SRC", &[("A", "Song, \"one\""), ("B", "b")]),
    );
    let collector = StatisticsCollector::new(service.clone(), Some(cache_in(&dir)));

    let computed = collector.collect("SRC").await.unwrap();
    let reloaded = cache_in(&dir).load::<StatisticsRow>("SRC").await.unwrap();

    assert_eq!(Some(computed.clone()), reloaded);
    assert_eq!(computed[0].title, "Song, \"one\"");
}

#[tokio::test]
async fn test_membership_export_feeds_artist_report() {
    let dir = TempDir::new().unwrap();
    let service = Arc::new(InMemoryPlaylistService::new(2).with_playlist(
        "SRC",
        &[
            ("A", "Band - One"),
            ("B", "Band - Two"),
            ("C", "Solo - Three"),
            ("D", "No separator"),
        ],
    ));
    let cache = cache_in(&dir);

    MembershipExporter::new(service, Some(cache.clone()))
        .export("SRC")
        .await
        .unwrap();
    let counts = artist_report(&cache, "SRC", "Artist", 2)
        .await
        .unwrap()
        .unwrap();

    let summary: Vec<_> = counts.iter().map(|c| (c.artist.as_str(), c.count)).collect();
    assert_eq!(summary, vec![("Band", 2), ("Solo", 1)]);
}
