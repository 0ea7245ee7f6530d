//! Environment-driven CLI configuration
//!
//! The backend is chosen once here and injected everywhere else as an
//! `Arc<dyn StorageBackend>`; no command branches on the mode again.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use inkstone_core::traits::{AllowAll, AllowList, Authorizer, EditorIdentity, StorageBackend};
use inkstone_store::{GitHubConfig, GitHubStore, LocalStore};

/// Which backend the CLI talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    /// Files under a local content root; no revision tracking
    Local,
    /// GitHub repository via the Contents API
    GitHub,
}

impl ContentMode {
    fn from_env() -> Result<Self> {
        match std::env::var("INKSTONE_MODE").as_deref() {
            Err(_) | Ok("local") => Ok(Self::Local),
            Ok("github") => Ok(Self::GitHub),
            Ok(other) => bail!("INKSTONE_MODE must be `local` or `github`, got `{other}`"),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::GitHub => "github",
        }
    }
}

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub mode: ContentMode,
    /// Content root for the local backend
    pub root: PathBuf,
    /// Allowed editor ids/emails; empty means everyone
    pub editors: Vec<String>,
    /// Identity presented to the authorizer
    pub identity: EditorIdentity,
}

impl CliConfig {
    /// Read configuration from the environment.
    ///
    /// `INKSTONE_MODE` selects the backend (default `local`),
    /// `INKSTONE_ROOT` the local content root (default `.`),
    /// `INKSTONE_EDITORS` a comma-separated allowlist, and
    /// `INKSTONE_EDITOR` / `INKSTONE_EDITOR_EMAIL` the caller's identity.
    /// The GitHub backend additionally reads the `GITHUB_*` variables.
    pub fn load() -> Result<Self> {
        let mode = ContentMode::from_env()?;
        let root = std::env::var("INKSTONE_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let editors = std::env::var("INKSTONE_EDITORS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let identity = EditorIdentity {
            id: std::env::var("INKSTONE_EDITOR").unwrap_or_else(|_| "local-operator".into()),
            email: std::env::var("INKSTONE_EDITOR_EMAIL").ok(),
        };
        Ok(Self {
            mode,
            root,
            editors,
            identity,
        })
    }

    /// Construct the selected backend.
    pub fn build_store(&self) -> Result<Arc<dyn StorageBackend>> {
        match self.mode {
            ContentMode::Local => Ok(Arc::new(LocalStore::new(&self.root))),
            ContentMode::GitHub => {
                let config = GitHubConfig::from_env()
                    .context("GitHub mode needs GITHUB_PAT, GITHUB_REPO_OWNER, and GITHUB_REPO_NAME")?;
                Ok(Arc::new(GitHubStore::new(config)?))
            }
        }
    }

    fn authorizer(&self) -> Box<dyn Authorizer> {
        if self.editors.is_empty() {
            Box::new(AllowAll)
        } else {
            Box::new(AllowList::new(self.editors.iter().cloned()))
        }
    }

    /// Gate for write-class commands.
    pub fn require_editor(&self) -> Result<()> {
        if self.authorizer().is_allowed(&self.identity) {
            Ok(())
        } else {
            bail!(
                "{} is not in the editor allowlist; set INKSTONE_EDITOR or ask an admin",
                self.identity.id
            )
        }
    }
}
