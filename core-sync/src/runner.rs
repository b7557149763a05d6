//! # Reconciliation Runner
//!
//! Orchestrates one run against a source and a target collection:
//!
//! 1. Fetch the source and target snapshots, through the result cache where
//!    the cache policy allows it.
//! 2. Flag duplicate and invalid memberships in the target.
//! 3. Plan which source items to insert.
//! 4. Issue removals, then insertions, one at a time.
//!
//! Every mutation is attempted independently. A failed mutation is recorded
//! in the report and the run continues; rejected credentials abort the run
//! immediately. If the target snapshot is partial its id set cannot be
//! trusted, so the run issues no mutations at all.

use crate::cache::{ResultCache, SnapshotRow};
use crate::dedup::{find_removals, FlaggedMembership, RemovalReason};
use crate::error::{Result, SyncError};
use crate::fetcher::CollectionFetcher;
use crate::models::{CollectionSnapshot, Completeness, MediaItem};
use crate::planner::{plan_filtered, DiffPlan};
use crate::run::{MutationKind, MutationOutcome, ReconciliationRun, RunId, RunPhase};
use bridge_traits::RemoteCollectionClient;
use chrono::{DateTime, Utc};
use core_runtime::config::ReconcileConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    /// `Done`, or `Failed` when every attempted mutation failed
    pub phase: RunPhase,
    pub source_completeness: Completeness,
    pub target_completeness: Completeness,
    pub candidates: usize,
    pub selected: usize,
    pub removals: Vec<MutationOutcome>,
    pub insertions: Vec<MutationOutcome>,
    pub succeeded: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    fn new(
        run: &ReconciliationRun,
        source: &CollectionSnapshot,
        target: &CollectionSnapshot,
        plan: &DiffPlan,
    ) -> Self {
        Self {
            run_id: run.id,
            phase: run.phase,
            source_completeness: source.completeness.clone(),
            target_completeness: target.completeness.clone(),
            candidates: plan.candidates.len(),
            selected: plan.selected.len(),
            removals: run.outcomes_of(MutationKind::Remove).cloned().collect(),
            insertions: run.outcomes_of(MutationKind::Insert).cloned().collect(),
            succeeded: run.succeeded(),
            failed: run.failed(),
            started_at: run.created_at,
            finished_at: run.finished_at,
        }
    }

    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Media ids that were inserted, in insertion order.
    pub fn inserted_ids(&self) -> Vec<&str> {
        self.insertions
            .iter()
            .filter(|o| o.is_success())
            .map(|o| o.subject_id.as_str())
            .collect()
    }

    /// Membership ids that were removed, in removal order.
    pub fn removed_ids(&self) -> Vec<&str> {
        self.removals
            .iter()
            .filter(|o| o.is_success())
            .map(|o| o.subject_id.as_str())
            .collect()
    }
}

/// Runs reconciliation for one configured source/target pair.
pub struct ReconciliationRunner {
    client: Arc<dyn RemoteCollectionClient>,
    fetcher: CollectionFetcher,
    cache: Option<ResultCache>,
    config: ReconcileConfig,
}

impl ReconciliationRunner {
    /// Creates a runner.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] if the configuration does not validate.
    pub fn new(client: Arc<dyn RemoteCollectionClient>, config: ReconcileConfig) -> Result<Self> {
        config.validate()?;

        let cache = if config.cache_policy.any_enabled() {
            let fs = config.file_system.clone().ok_or_else(|| {
                SyncError::Config("Caching enabled without a file system".to_string())
            })?;
            let dir = config.cache_dir.clone().ok_or_else(|| {
                SyncError::Config("Caching enabled without a cache directory".to_string())
            })?;
            Some(ResultCache::new(fs, dir))
        } else {
            None
        };

        Ok(Self {
            fetcher: CollectionFetcher::new(Arc::clone(&client)).with_max_pages(config.max_pages),
            client,
            cache,
            config,
        })
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Executes one run.
    ///
    /// # Errors
    ///
    /// - [`SyncError::RemoteAuth`] if the remote rejects the credentials at any point
    /// - [`SyncError::LocalIo`] / [`SyncError::Validation`] from a corrupt cache record
    /// - [`SyncError::MutationsFailed`] when `strict_mutations` is set and any mutation failed
    #[instrument(skip(self), fields(source = %self.config.source_id, target = %self.config.target_id))]
    pub async fn run(&self) -> Result<RunReport> {
        let run = ReconciliationRun::new(&self.config.source_id, &self.config.target_id);
        info!("Starting reconciliation run {}", run.id);

        // Phase 1: Planning
        let planned = self.plan_run().await;
        let (source, target, removals, plan) = match planned {
            Ok(planned) => planned,
            Err(e) => return Err(self.abort(run, e)),
        };

        // Phase 2: Mutating
        let mut run = run.begin_mutations()?;

        for flagged in &removals {
            let outcome = match self.client.remove_membership(&flagged.membership_id).await {
                Ok(()) => {
                    debug!(
                        "Removed {:?} membership {} ({})",
                        flagged.reason, flagged.membership_id, flagged.title
                    );
                    MutationOutcome::removed(&flagged.membership_id, &flagged.title)
                }
                Err(e) => {
                    let err = SyncError::remote("remove_membership", &flagged.membership_id, e);
                    if err.is_auth() {
                        return Err(self.abort(run, err));
                    }
                    error!("Failed to remove {}: {}", flagged.membership_id, err);
                    MutationOutcome::failed(
                        MutationKind::Remove,
                        &flagged.membership_id,
                        &flagged.title,
                        err.to_string(),
                    )
                }
            };
            run.record(outcome)?;
        }

        for item in &plan.selected {
            let outcome = match self.client.insert_item(&self.config.target_id, &item.id).await {
                Ok(()) => {
                    debug!("Inserted {} ({})", item.id, item.title);
                    MutationOutcome::inserted(&item.id, &item.title)
                }
                Err(e) => {
                    let err = SyncError::remote("insert_item", &item.id, e);
                    if err.is_auth() {
                        return Err(self.abort(run, err));
                    }
                    error!("Failed to insert {}: {}", item.id, err);
                    MutationOutcome::failed(MutationKind::Insert, &item.id, &item.title, err.to_string())
                }
            };
            run.record(outcome)?;
        }

        // Phase 3: Done
        let run = run.finish()?;
        let report = RunReport::new(&run, &source, &target, &plan);

        info!(
            "Run {} {}: {} removed, {} inserted, {} failed ({} candidates, {} deferred)",
            run.id,
            run.phase,
            report.removed_ids().len(),
            report.inserted_ids().len(),
            report.failed,
            plan.candidates.len(),
            plan.deferred()
        );

        if self.config.strict_mutations && report.failed > 0 {
            return Err(SyncError::MutationsFailed {
                failed: report.failed,
                attempted: report.attempted(),
            });
        }

        Ok(report)
    }

    async fn plan_run(
        &self,
    ) -> Result<(CollectionSnapshot, CollectionSnapshot, Vec<FlaggedMembership>, DiffPlan)> {
        let source = self
            .snapshot(&self.config.source_id, self.config.cache_policy.source)
            .await?;
        let target = self
            .snapshot(&self.config.target_id, self.config.cache_policy.target)
            .await?;

        if !source.is_complete() {
            warn!(
                "Source snapshot is partial ({} items); planning from what was fetched",
                source.len()
            );
        }

        if !target.is_complete() {
            warn!("Target snapshot is partial; skipping all removals and insertions");
            let plan = DiffPlan {
                candidates: Vec::new(),
                limit: self.config.insert_limit,
                selected: Vec::new(),
            };
            return Ok((source, target, Vec::new(), plan));
        }

        let removals = self.removals(&target);
        let plan = plan_filtered(&source, &target, self.config.insert_limit, |item| {
            self.is_eligible(item)
        });

        info!(
            "Planned {} removals and {} of {} candidate insertions",
            removals.len(),
            plan.selected.len(),
            plan.candidates.len()
        );

        Ok((source, target, removals, plan))
    }

    fn removals(&self, target: &CollectionSnapshot) -> Vec<FlaggedMembership> {
        let no_titles: &[String] = &[];
        let titles = if self.config.remove_invalid {
            self.config.invalid_titles.as_slice()
        } else {
            no_titles
        };

        find_removals(target, titles)
            .into_iter()
            .filter(|f| match f.reason {
                RemovalReason::Duplicate => self.config.remove_duplicates,
                RemovalReason::Invalid => self.config.remove_invalid,
            })
            .collect()
    }

    fn is_eligible(&self, item: &MediaItem) -> bool {
        if !self.config.source_selection.includes(item.position) {
            return false;
        }
        !(self.config.skip_invalid_source && self.config.is_invalid_title(&item.title))
    }

    /// Snapshot of a collection, served from the cache when `use_cache` is set.
    ///
    /// Only complete snapshots are written back.
    async fn snapshot(&self, collection_id: &str, use_cache: bool) -> Result<CollectionSnapshot> {
        let cache = self.cache.as_ref().filter(|_| use_cache);

        if let Some(cache) = cache {
            if let Some(rows) = cache.load::<SnapshotRow>(collection_id).await? {
                let items = rows
                    .into_iter()
                    .map(|row| MediaItem::new(row.media_id, row.title, row.membership_id, row.position))
                    .collect();
                return Ok(CollectionSnapshot::complete(collection_id, items));
            }
        }

        let snapshot = self.fetcher.fetch(collection_id).await?;

        if let Some(cache) = cache {
            if snapshot.is_complete() {
                let rows: Vec<SnapshotRow> = snapshot
                    .items
                    .iter()
                    .map(|item| SnapshotRow {
                        position: item.position,
                        title: item.title.clone(),
                        media_id: item.id.clone(),
                        membership_id: item.membership_id.clone(),
                    })
                    .collect();
                cache.store(collection_id, &rows).await?;
            } else {
                warn!("Not caching partial snapshot of {}", collection_id);
            }
        }

        Ok(snapshot)
    }

    fn abort(&self, run: ReconciliationRun, err: SyncError) -> SyncError {
        error!("Run {} aborted: {}", run.id, err);
        if let Err(transition) = run.abort(err.to_string()) {
            warn!("Could not mark run aborted: {}", transition);
        }
        err
    }
}
