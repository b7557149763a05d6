//! # Deduplication Index
//!
//! Finds collection memberships that should be removed: later repeats of a
//! media id already seen earlier in the snapshot, and items whose title is
//! one of the placeholder titles the remote service shows for media that is
//! gone.
//!
//! First-seen always wins. The snapshot is walked in order and never sorted,
//! so the membership at the lowest position survives.

use crate::models::{CollectionSnapshot, MediaItem};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Why a membership was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalReason {
    Duplicate,
    Invalid,
}

/// A membership selected for removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedMembership {
    pub membership_id: String,
    pub media_id: String,
    pub title: String,
    pub position: usize,
    pub reason: RemovalReason,
}

impl FlaggedMembership {
    fn new(item: &MediaItem, reason: RemovalReason) -> Self {
        Self {
            membership_id: item.membership_id.clone(),
            media_id: item.id.clone(),
            title: item.title.clone(),
            position: item.position,
            reason,
        }
    }
}

/// Membership ids of every repeat after the first occurrence of each id,
/// in snapshot order.
pub fn find_duplicates(snapshot: &CollectionSnapshot) -> Vec<String> {
    duplicate_items(snapshot)
        .map(|item| item.membership_id.clone())
        .collect()
}

/// Membership ids of items whose title exactly matches a sentinel, in
/// snapshot order. Independent of duplication.
pub fn find_invalid<S: AsRef<str>>(snapshot: &CollectionSnapshot, invalid_titles: &[S]) -> Vec<String> {
    invalid_items(snapshot, invalid_titles)
        .map(|item| item.membership_id.clone())
        .collect()
}

/// Both passes merged, each membership flagged once.
///
/// An item that is both a repeat and invalid is reported as
/// [`RemovalReason::Invalid`].
pub fn find_removals<S: AsRef<str>>(
    snapshot: &CollectionSnapshot,
    invalid_titles: &[S],
) -> Vec<FlaggedMembership> {
    let duplicates: HashSet<&str> = duplicate_items(snapshot)
        .map(|item| item.membership_id.as_str())
        .collect();
    let invalid: HashSet<&str> = invalid_items(snapshot, invalid_titles)
        .map(|item| item.membership_id.as_str())
        .collect();

    let mut seen = HashSet::new();
    snapshot
        .items
        .iter()
        .filter_map(|item| {
            let id = item.membership_id.as_str();
            let reason = if invalid.contains(id) {
                RemovalReason::Invalid
            } else if duplicates.contains(id) {
                RemovalReason::Duplicate
            } else {
                return None;
            };
            seen.insert(id)
                .then(|| FlaggedMembership::new(item, reason))
        })
        .collect()
}

fn duplicate_items<'a>(snapshot: &'a CollectionSnapshot) -> impl Iterator<Item = &'a MediaItem> + 'a {
    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut flagged: HashSet<&str> = HashSet::new();
    snapshot.items.iter().filter(move |&item| {
        !seen_ids.insert(item.id.as_str()) && flagged.insert(item.membership_id.as_str())
    })
}

fn invalid_items<'a, S: AsRef<str> + 'a>(
    snapshot: &'a CollectionSnapshot,
    invalid_titles: &'a [S],
) -> impl Iterator<Item = &'a MediaItem> + 'a {
    let mut flagged: HashSet<&str> = HashSet::new();
    snapshot.items.iter().filter(move |&item| {
        invalid_titles.iter().any(|t| t.as_ref() == item.title)
            && flagged.insert(item.membership_id.as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTINELS: &[&str] = &["Deleted video", "Private video"];

    fn snapshot(items: &[(&str, &str, &str)]) -> CollectionSnapshot {
        CollectionSnapshot::complete(
            "PL1",
            items
                .iter()
                .map(|(id, title, membership)| MediaItem::new(*id, *title, *membership, 0))
                .collect(),
        )
    }

    #[test]
    fn test_second_occurrence_flagged() {
        let s = snapshot(&[("A", "a", "m1"), ("A", "a", "m2"), ("B", "b", "m3")]);
        assert_eq!(find_duplicates(&s), vec!["m2".to_string()]);
    }

    #[test]
    fn test_every_later_repeat_flagged_in_order() {
        let s = snapshot(&[
            ("A", "a", "m1"),
            ("B", "b", "m2"),
            ("A", "a", "m3"),
            ("B", "b", "m4"),
            ("A", "a", "m5"),
        ]);
        assert_eq!(find_duplicates(&s), vec!["m3", "m4", "m5"]);
    }

    #[test]
    fn test_no_duplicates() {
        let s = snapshot(&[("A", "a", "m1"), ("B", "b", "m2")]);
        assert!(find_duplicates(&s).is_empty());
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let s = snapshot(&[("A", "a", "m1"), ("A", "a", "m2"), ("B", "b", "m3")]);
        let flagged: HashSet<String> = find_duplicates(&s).into_iter().collect();

        let remaining: Vec<MediaItem> = s
            .items
            .iter()
            .filter(|i| !flagged.contains(&i.membership_id))
            .cloned()
            .collect();
        let cleaned = CollectionSnapshot::complete("PL1", remaining);

        assert!(find_duplicates(&cleaned).is_empty());
        assert_eq!(cleaned.id_set(), s.id_set());
    }

    #[test]
    fn test_invalid_titles_flagged_regardless_of_duplication() {
        let s = snapshot(&[
            ("A", "Deleted video", "m1"),
            ("B", "b", "m2"),
            ("C", "Private video", "m3"),
            ("C", "Private video", "m4"),
        ]);
        assert_eq!(find_invalid(&s, SENTINELS), vec!["m1", "m3", "m4"]);
    }

    #[test]
    fn test_invalid_match_is_exact() {
        let s = snapshot(&[("A", "deleted video", "m1"), ("B", "Deleted video (1)", "m2")]);
        assert!(find_invalid(&s, SENTINELS).is_empty());
    }

    #[test]
    fn test_custom_sentinels() {
        let s = snapshot(&[("A", "Gone", "m1")]);
        let custom = vec!["Gone".to_string()];
        assert_eq!(find_invalid(&s, custom.as_slice()), vec!["m1"]);
    }

    #[test]
    fn test_find_removals_merges_with_invalid_precedence() {
        let s = snapshot(&[
            ("A", "a", "m1"),
            ("A", "a", "m2"),
            ("B", "Private video", "m3"),
            ("B", "Private video", "m4"),
            ("C", "c", "m5"),
        ]);

        let removals = find_removals(&s, SENTINELS);
        let summary: Vec<_> = removals
            .iter()
            .map(|f| (f.membership_id.as_str(), f.reason))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("m2", RemovalReason::Duplicate),
                ("m3", RemovalReason::Invalid),
                ("m4", RemovalReason::Invalid),
            ]
        );
        assert_eq!(removals[0].position, 1);
        assert_eq!(removals[0].media_id, "A");
    }
}
