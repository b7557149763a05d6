//! # Incremental Sync Planner
//!
//! Computes which source items are missing from the target and picks a
//! bounded, order-preserving prefix of them to insert. Planning is pure: no
//! remote calls, no cache access, and the same inputs always give the same
//! plan.

use crate::models::{CollectionSnapshot, MediaItem};
use core_runtime::config::SourceSelection;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Result of diffing a source against a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffPlan {
    /// Eligible source items absent from the target, in source order, unique by id
    pub candidates: Vec<MediaItem>,
    pub limit: usize,
    /// The first `min(limit, candidates.len())` candidates
    pub selected: Vec<MediaItem>,
}

impl DiffPlan {
    /// True when nothing will be inserted. Not an error.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Candidates left for a later run.
    pub fn deferred(&self) -> usize {
        self.candidates.len() - self.selected.len()
    }
}

/// Plans with every source item eligible.
///
/// ```
/// use core_sync::models::{CollectionSnapshot, MediaItem};
/// use core_sync::planner::plan;
///
/// let item = |id: &str| MediaItem::new(id, id, format!("m-{}", id), 0);
/// let source = CollectionSnapshot::complete("src", vec![item("A"), item("B"), item("C"), item("D")]);
/// let target = CollectionSnapshot::complete("dst", vec![item("B"), item("D")]);
///
/// let plan = plan(&source, &target, 2);
/// let ids: Vec<_> = plan.selected.iter().map(|i| i.id.as_str()).collect();
/// assert_eq!(ids, ["A", "C"]);
/// ```
pub fn plan(source: &CollectionSnapshot, target: &CollectionSnapshot, limit: usize) -> DiffPlan {
    plan_filtered(source, target, limit, |_| true)
}

/// Plans over the source positions allowed by `selection`.
pub fn plan_with_selection(
    source: &CollectionSnapshot,
    target: &CollectionSnapshot,
    limit: usize,
    selection: &SourceSelection,
) -> DiffPlan {
    plan_filtered(source, target, limit, |item| selection.includes(item.position))
}

/// Plans over the source items for which `eligible` returns true.
pub fn plan_filtered<F>(
    source: &CollectionSnapshot,
    target: &CollectionSnapshot,
    limit: usize,
    eligible: F,
) -> DiffPlan
where
    F: Fn(&MediaItem) -> bool,
{
    let present = target.id_set();
    let mut seen: HashSet<&str> = HashSet::new();

    let candidates: Vec<MediaItem> = source
        .items
        .iter()
        .filter(|item| eligible(item))
        .filter(|item| !present.contains(item.id.as_str()))
        .filter(|&item| seen.insert(item.id.as_str()))
        .cloned()
        .collect();

    let selected = candidates.iter().take(limit).cloned().collect();

    DiffPlan {
        candidates,
        limit,
        selected,
    }
}
