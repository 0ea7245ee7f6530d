//! In-memory storage backend for tests
//!
//! Implements the full backend contract, including revision tokens, so
//! session and conformance tests can exercise conflict handling without a
//! network or a filesystem.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::collection::is_content_file;
use crate::error::{ContentError, ContentResult};
use crate::traits::{FileEntry, ReadState, StorageBackend, WriteReceipt};

#[derive(Debug, Clone)]
struct Stored {
    content: String,
    token: String,
}

/// A revision-tracking in-memory store. Tokens are monotonically increasing
/// counters, one per store, so any overwrite invalidates older tokens.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    files: HashMap<String, Stored>,
    next_token: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file outside the trait interface, as if written externally.
    pub fn seed(&self, path: &str, content: &str) {
        let mut inner = self.lock();
        let token = format!("rev-{}", inner.next_token);
        inner.next_token += 1;
        inner.files.insert(
            path.to_string(),
            Stored {
                content: content.to_string(),
                token,
            },
        );
    }

    /// Current content, bypassing the trait. Test assertions only.
    pub fn raw(&self, path: &str) -> Option<String> {
        self.lock().files.get(path).map(|s| s.content.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl StorageBackend for MemoryStore {
    async fn read(&self, path: &str) -> ContentResult<ReadState> {
        let inner = self.lock();
        Ok(match inner.files.get(path) {
            Some(stored) => ReadState {
                content: Some(stored.content.clone()),
                revision_token: Some(stored.token.clone()),
            },
            None => ReadState::absent(),
        })
    }

    async fn write(
        &self,
        path: &str,
        content: &str,
        expected: Option<&str>,
    ) -> ContentResult<WriteReceipt> {
        let mut inner = self.lock();
        let current = inner.files.get(path).map(|s| s.token.clone());
        match (expected, current.as_deref()) {
            (Some(exp), Some(cur)) if exp != cur => {
                return Err(ContentError::conflict(path));
            }
            (Some(_), None) => {
                // Token presented for a file that no longer exists
                return Err(ContentError::conflict(path));
            }
            _ => {}
        }
        let token = format!("rev-{}", inner.next_token);
        inner.next_token += 1;
        inner.files.insert(
            path.to_string(),
            Stored {
                content: content.to_string(),
                token: token.clone(),
            },
        );
        Ok(WriteReceipt {
            revision_token: Some(token),
        })
    }

    async fn remove(&self, path: &str) -> ContentResult<()> {
        let mut inner = self.lock();
        if inner.files.remove(path).is_none() {
            return Err(ContentError::not_found(path));
        }
        Ok(())
    }

    async fn list_files(&self, dir: &str) -> ContentResult<Vec<FileEntry>> {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        let inner = self.lock();
        let mut entries: Vec<FileEntry> = inner
            .files
            .keys()
            .filter_map(|path| {
                let rest = path.strip_prefix(&prefix)?;
                // Direct children only
                if rest.contains('/') || !is_content_file(rest) {
                    return None;
                }
                Some(FileEntry {
                    name: rest.to_string(),
                    path: path.clone(),
                    download_url: None,
                    last_modified: None,
                })
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stale_token_conflicts() {
        let store = MemoryStore::new();
        let first = store.write("a.md", "one", None).await.unwrap();
        store
            .write("a.md", "two", first.revision_token.as_deref())
            .await
            .unwrap();

        let err = store
            .write("a.md", "three", first.revision_token.as_deref())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.raw("a.md").as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn listing_is_direct_children_only() {
        let store = MemoryStore::new();
        store.seed("content/posts/a.md", "");
        store.seed("content/posts/sub/b.md", "");
        store.seed("content/posts/img.png", "");
        let entries = store.list_files("content/posts").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "a.md");
    }
}
