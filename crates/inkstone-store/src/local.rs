//! Local-disk storage backend
//!
//! Maps backend paths directly onto files under a content root. There is
//! no revision tracking: reads return no token and writes ignore the
//! expected token, which is why this backend is documented as
//! single-operator-only.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::debug;

use inkstone_core::collection::is_content_file;
use inkstone_core::error::{ContentError, ContentResult};
use inkstone_core::traits::{FileEntry, ReadState, StorageBackend, WriteReceipt};

/// Content storage rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a backend path under the root, rejecting anything that
    /// would escape it.
    fn resolve(&self, path: &str) -> ContentResult<PathBuf> {
        let relative = Path::new(path);
        for component in relative.components() {
            match component {
                Component::Normal(_) => {}
                _ => {
                    return Err(ContentError::validation(format!(
                        "path escapes the content root: {path}"
                    )))
                }
            }
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl StorageBackend for LocalStore {
    async fn read(&self, path: &str) -> ContentResult<ReadState> {
        let file = self.resolve(path)?;
        match fs::read_to_string(&file).await {
            Ok(content) => Ok(ReadState {
                content: Some(content),
                revision_token: None,
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(ReadState::absent()),
            Err(err) => Err(err.into()),
        }
    }

    async fn write(
        &self,
        path: &str,
        content: &str,
        _expected: Option<&str>,
    ) -> ContentResult<WriteReceipt> {
        let file = self.resolve(path)?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&file, content).await?;
        debug!(path, "wrote local file");
        Ok(WriteReceipt {
            revision_token: None,
        })
    }

    async fn remove(&self, path: &str) -> ContentResult<()> {
        let file = self.resolve(path)?;
        match fs::remove_file(&file).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(ContentError::not_found(path))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn list_files(&self, dir: &str) -> ContentResult<Vec<FileEntry>> {
        let directory = self.resolve(dir)?;
        let mut reader = match fs::read_dir(&directory).await {
            Ok(reader) => reader,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_content_file(&name) {
                continue;
            }
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let last_modified = meta
                .modified()
                .ok()
                .map(DateTime::<Utc>::from);
            entries.push(FileEntry {
                path: format!("{}/{name}", dir.trim_end_matches('/')),
                name,
                download_url: None,
                last_modified,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
