//! Content index
//!
//! Listing views never need document bodies, only metadata. The index
//! enumerates a collection's directory, decodes each file's frontmatter,
//! and produces sorted entries. Files are fetched concurrently and a file
//! that fails to decode is skipped with a warning; one corrupt file must
//! not hide the rest of the collection.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::collection::Collection;
use crate::error::ContentResult;
use crate::frontmatter;
use crate::metadata::{self, Metadata};
use crate::traits::{FileEntry, StorageBackend};

/// How many file reads to keep in flight while building the index.
const FETCH_CONCURRENCY: usize = 8;

/// Listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Newest first by the `date` field, falling back to the backend's
    /// modification time when no date is present.
    DateDesc,
    /// Ascending numeric `order` field, unordered entries last, ties broken
    /// newest first.
    OrderThenDate,
}

/// One listed document, metadata only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub slug: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub draft: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    /// Full decoded metadata, for callers that need more than the summary
    pub metadata: Metadata,
}

impl IndexEntry {
    fn from_parts(entry: &FileEntry, metadata: Metadata) -> Self {
        let slug = entry
            .name
            .rsplit_once('.')
            .map(|(stem, _)| stem.to_string())
            .unwrap_or_else(|| entry.name.clone());
        Self {
            slug,
            path: entry.path.clone(),
            title: metadata::get_str(&metadata, "title").map(str::to_string),
            description: metadata::get_str(&metadata, "description").map(str::to_string),
            date: parse_date(&metadata),
            draft: metadata::get_bool(&metadata, "draft", false),
            order: metadata::get_path(&metadata, "order").and_then(|v| v.as_i64()),
            modified: entry.last_modified,
            metadata,
        }
    }

    /// The date used for ordering: explicit date, else modification time.
    fn sort_date(&self) -> Option<NaiveDate> {
        self.date.or_else(|| self.modified.map(|m| m.date_naive()))
    }
}

fn parse_date(metadata: &Metadata) -> Option<NaiveDate> {
    let raw = metadata::get_str(metadata, "date")?;
    // Accept bare dates and datetime strings with a date prefix
    raw.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

/// Collection listing over an injected storage backend.
pub struct ContentIndex {
    store: Arc<dyn StorageBackend>,
}

impl ContentIndex {
    pub fn new(store: Arc<dyn StorageBackend>) -> Self {
        Self { store }
    }

    /// List a collection with its default sort order.
    pub async fn list_default(&self, collection: Collection) -> ContentResult<Vec<IndexEntry>> {
        self.list(collection, collection.default_sort()).await
    }

    /// List a collection's documents, sorted. Per-file decode failures are
    /// skipped with a warning and do not fail the listing.
    pub async fn list(
        &self,
        collection: Collection,
        sort: SortKey,
    ) -> ContentResult<Vec<IndexEntry>> {
        let files = self.store.list_files(collection.directory()).await?;

        let mut entries: Vec<IndexEntry> = stream::iter(files)
            .map(|file| async move {
                match self.store.read(&file.path).await {
                    Ok(read) => {
                        let raw = read.content.unwrap_or_default();
                        match frontmatter::decode_metadata(&raw) {
                            Ok(metadata) => Some(IndexEntry::from_parts(&file, metadata)),
                            Err(err) => {
                                warn!(path = %file.path, error = %err, "skipping unparsable document in listing");
                                None
                            }
                        }
                    }
                    Err(err) => {
                        warn!(path = %file.path, error = %err, "skipping unreadable document in listing");
                        None
                    }
                }
            })
            .buffer_unordered(FETCH_CONCURRENCY)
            .filter_map(|entry| async move { entry })
            .collect()
            .await;

        entries.sort_by(|a, b| compare(sort, a, b));
        Ok(entries)
    }
}

fn compare(sort: SortKey, a: &IndexEntry, b: &IndexEntry) -> Ordering {
    match sort {
        SortKey::DateDesc => date_desc(a, b).then_with(|| a.slug.cmp(&b.slug)),
        SortKey::OrderThenDate => {
            let a_order = a.order.unwrap_or(i64::MAX);
            let b_order = b.order.unwrap_or(i64::MAX);
            a_order
                .cmp(&b_order)
                .then_with(|| date_desc(a, b))
                .then_with(|| a.slug.cmp(&b.slug))
        }
    }
}

fn date_desc(a: &IndexEntry, b: &IndexEntry) -> Ordering {
    // None sorts after any date
    match (a.sort_date(), b.sort_date()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
