//! Storage backend abstraction
//!
//! Everything above this trait (sessions, the index, the CLI) talks to
//! content storage through [`StorageBackend`] and never knows whether the
//! bytes live on local disk or in a GitHub repository. Backend selection
//! happens once, at construction, by injecting an `Arc<dyn StorageBackend>`.
//!
//! Paths are always relative, forward-slash separated, and rooted at the
//! content root the backend was constructed with.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ContentResult;

/// The result of reading a path.
///
/// `content` is `None` when the file does not exist; callers treat that as
/// "new document", not as an error. The revision token accompanies the
/// content so a later write can assert it is not clobbering a newer
/// revision.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadState {
    pub content: Option<String>,
    pub revision_token: Option<String>,
}

impl ReadState {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn exists(&self) -> bool {
        self.content.is_some()
    }
}

/// What a successful write hands back: the token naming the revision just
/// written, for threading into the next write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub revision_token: Option<String>,
}

/// A directory listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// File name including extension
    pub name: String,

    /// Full path relative to the content root
    pub path: String,

    /// Direct URL to the raw content, when the backend has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,

    /// Last modification time, when the backend tracks one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// Unified content storage interface.
///
/// Both backends implement the same contract, so one conformance suite
/// covers them:
/// - `read` on a missing path is `Ok` with no content, never `NotFound`
/// - `write` creates or replaces, creating parent directories as needed
/// - `write` with a stale `expected` token fails with `Conflict`
/// - `remove` on a missing path is `NotFound`
/// - `list_files` on a missing directory is an empty list
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read a file's content and current revision token.
    async fn read(&self, path: &str) -> ContentResult<ReadState>;

    /// Create or replace a file.
    ///
    /// `expected` is the revision token from the read that produced the
    /// content being saved. Backends that track revisions reject the write
    /// with `Conflict` when the stored revision no longer matches; backends
    /// that do not track revisions ignore it.
    async fn write(
        &self,
        path: &str,
        content: &str,
        expected: Option<&str>,
    ) -> ContentResult<WriteReceipt>;

    /// Delete a file. Missing paths are an error, unlike reads.
    async fn remove(&self, path: &str) -> ContentResult<()>;

    /// List content files directly under a directory, filtered to the
    /// recognized content extensions. Subdirectories are not descended.
    async fn list_files(&self, dir: &str) -> ContentResult<Vec<FileEntry>>;
}

#[async_trait]
impl<T: StorageBackend + ?Sized> StorageBackend for Arc<T> {
    async fn read(&self, path: &str) -> ContentResult<ReadState> {
        (**self).read(path).await
    }

    async fn write(
        &self,
        path: &str,
        content: &str,
        expected: Option<&str>,
    ) -> ContentResult<WriteReceipt> {
        (**self).write(path, content, expected).await
    }

    async fn remove(&self, path: &str) -> ContentResult<()> {
        (**self).remove(path).await
    }

    async fn list_files(&self, dir: &str) -> ContentResult<Vec<FileEntry>> {
        (**self).list_files(dir).await
    }
}

/// An asset blob stored alongside content (images, attachments).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub size: u64,
}

/// Binary asset storage, separate from the text-oriented content interface.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn upload(&self, path: &str, bytes: &[u8]) -> ContentResult<AssetEntry>;

    async fn list(&self, dir: &str) -> ContentResult<Vec<AssetEntry>>;

    async fn delete(&self, path: &str) -> ContentResult<()>;
}

/// Who is editing, as reported by the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorIdentity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Gate on who may open editing sessions.
///
/// The reconciler checks this before loading; the surrounding application
/// decides what identity to present.
pub trait Authorizer: Send + Sync {
    fn is_allowed(&self, identity: &EditorIdentity) -> bool;
}

/// Permit everyone. The local development default.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn is_allowed(&self, _identity: &EditorIdentity) -> bool {
        true
    }
}

/// Permit only listed identities, matched by id or email.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    entries: Vec<String>,
}

impl AllowList {
    pub fn new(entries: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Authorizer for AllowList {
    fn is_allowed(&self, identity: &EditorIdentity) -> bool {
        self.entries.iter().any(|entry| {
            entry == &identity.id || identity.email.as_deref() == Some(entry.as_str())
        })
    }
}
