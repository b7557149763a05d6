//! # Reports
//!
//! Aggregations over exported rows: artist frequencies from a membership
//! record and top/bottom rankings over statistics rows. Rendering is left to
//! the caller.

use crate::cache::{CacheKey, CacheKind, ResultCache, StatisticsRow};
use crate::error::{Result, SyncError};
use core_runtime::logging::strip_path;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Number of memberships credited to one artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistCount {
    pub artist: String,
    pub count: usize,
}

/// Top `top_n` artists of a cached membership record, most frequent first.
///
/// Ties keep the order in which artists first appear. Returns `None` when
/// the collection has no membership record yet.
///
/// # Errors
///
/// - [`SyncError::Validation`] when `artist_column` is missing from the header
/// - [`SyncError::LocalIo`] when the file cannot be read or parsed
#[instrument(skip(cache))]
pub async fn artist_report(
    cache: &ResultCache,
    collection_id: &str,
    artist_column: &str,
    top_n: usize,
) -> Result<Option<Vec<ArtistCount>>> {
    let key = CacheKey::new(collection_id, CacheKind::Membership);
    let Some((data, path)) = cache.read_raw(&key).await? else {
        return Ok(None);
    };

    count_artists(&data, &path, artist_column, top_n).map(Some)
}

fn count_artists(data: &[u8], path: &str, artist_column: &str, top_n: usize) -> Result<Vec<ArtistCount>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| SyncError::local_io(path, format!("Failed to read CSV headers: {}", e)))?
        .clone();
    let index = headers
        .iter()
        .position(|h| h == artist_column)
        .ok_or_else(|| SyncError::Validation {
            column: artist_column.to_string(),
            path: strip_path(path).to_string(),
        })?;

    let mut counts: Vec<ArtistCount> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            SyncError::local_io(path, format!("line {}: {}", idx + 2, e))
        })?;
        let artist = record.get(index).unwrap_or_default().to_string();

        match slots.get(&artist) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                slots.insert(artist.clone(), counts.len());
                counts.push(ArtistCount { artist, count: 1 });
            }
        }
    }

    // Stable sort keeps first-appearance order among equal counts.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(top_n);
    debug!("{} artists in {}", counts.len(), strip_path(path));
    Ok(counts)
}

/// Top and bottom rankings over statistics rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub most_viewed: Vec<StatisticsRow>,
    pub least_viewed: Vec<StatisticsRow>,
    pub most_liked: Vec<StatisticsRow>,
    pub least_liked: Vec<StatisticsRow>,
}

impl StatisticsSummary {
    /// Ranks `rows` keeping at most `top_n` entries per list. Ties keep row order.
    pub fn from_rows(rows: &[StatisticsRow], top_n: usize) -> Self {
        Self {
            most_viewed: ranked(rows, top_n, |r: &StatisticsRow| r.views, true),
            least_viewed: ranked(rows, top_n, |r: &StatisticsRow| r.views, false),
            most_liked: ranked(rows, top_n, |r: &StatisticsRow| r.likes, true),
            least_liked: ranked(rows, top_n, |r: &StatisticsRow| r.likes, false),
        }
    }
}

fn ranked<F>(rows: &[StatisticsRow], top_n: usize, key: F, descending: bool) -> Vec<StatisticsRow>
where
    F: Fn(&StatisticsRow) -> u64,
{
    let mut sorted = rows.to_vec();
    if descending {
        sorted.sort_by(|a, b| key(b).cmp(&key(a)));
    } else {
        sorted.sort_by(|a, b| key(a).cmp(&key(b)));
    }
    sorted.truncate(top_n);
    sorted
}
