//! GitHub storage backend
//!
//! Talks to the GitHub Contents API. Blob SHAs serve as revision tokens:
//! every read hands back the current SHA and every update or delete sends
//! one, so a stale session gets a conflict instead of silently overwriting
//! a concurrent edit.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use inkstone_core::collection::is_content_file;
use inkstone_core::error::{ContentError, ContentResult};
use inkstone_core::traits::{FileEntry, ReadState, StorageBackend, WriteReceipt};

const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Connection settings for a [`GitHubStore`].
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub owner: String,
    pub repo: String,
    /// Branch every read and write is pinned to
    pub branch: String,
    /// Personal access token with contents read/write scope
    pub token: String,
    /// Repository subdirectory the content root maps onto, e.g. `"site"`.
    /// Empty means the repository root.
    pub path_prefix: String,
    /// API origin override, for tests
    pub api_base: String,
}

impl GitHubConfig {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: "main".to_string(),
            token: token.into(),
            path_prefix: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    #[must_use]
    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Read connection settings from the environment.
    ///
    /// Requires `GITHUB_PAT`, `GITHUB_REPO_OWNER`, and `GITHUB_REPO_NAME`.
    /// `GITHUB_BRANCH` defaults to `main` and `GITHUB_PATH_PREFIX` to the
    /// repository root.
    pub fn from_env() -> ContentResult<Self> {
        let require = |key: &str| {
            std::env::var(key)
                .map_err(|_| ContentError::Config(format!("{key} is not set")))
        };
        let mut config = Self::new(
            require("GITHUB_REPO_OWNER")?,
            require("GITHUB_REPO_NAME")?,
            require("GITHUB_PAT")?,
        );
        if let Ok(branch) = std::env::var("GITHUB_BRANCH") {
            config.branch = branch;
        }
        if let Ok(prefix) = std::env::var("GITHUB_PATH_PREFIX") {
            config.path_prefix = prefix;
        }
        Ok(config)
    }
}

/// Contents-API shapes we consume.
#[derive(Debug, Deserialize)]
struct ContentsFile {
    #[serde(default)]
    content: Option<String>,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    content: Option<ShaOnly>,
}

#[derive(Debug, Deserialize)]
struct ShaOnly {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ListEntry {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    download_url: Option<String>,
}

/// Content storage in a GitHub repository.
pub struct GitHubStore {
    client: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubStore {
    pub fn new(config: GitHubConfig) -> ContentResult<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| ContentError::Config("access token contains invalid header characters".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("inkstone"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| ContentError::transport(err.to_string()))?;

        Ok(Self { client, config })
    }

    /// Repository path for a backend path, with the configured prefix.
    ///
    /// A path that already carries the prefix passes through unchanged, so
    /// repo-relative and workspace-relative spellings are interchangeable.
    fn repo_path(&self, path: &str) -> String {
        let prefix = self.config.path_prefix.trim_matches('/');
        let path = path.trim_start_matches('/');
        if prefix.is_empty()
            || path == prefix
            || path.starts_with(&format!("{prefix}/"))
        {
            path.to_string()
        } else {
            format!("{prefix}/{path}")
        }
    }

    /// Strip the prefix back off a repository path from an API response.
    fn backend_path(&self, repo_path: &str) -> String {
        let prefix = self.config.path_prefix.trim_matches('/');
        if prefix.is_empty() {
            return repo_path.to_string();
        }
        repo_path
            .strip_prefix(prefix)
            .map(|rest| rest.trim_start_matches('/').to_string())
            .unwrap_or_else(|| repo_path.to_string())
    }

    fn contents_url(&self, path: &str) -> String {
        let encoded = self
            .repo_path(path)
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/repos/{}/{}/contents/{encoded}",
            self.config.api_base, self.config.owner, self.config.repo
        )
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> ContentResult<reqwest::Response> {
        request
            .send()
            .await
            .map_err(|err| ContentError::transport(err.to_string()))
    }

    /// One PUT against the Contents API; sha mismatches map to `Conflict`.
    async fn put_contents(
        &self,
        path: &str,
        content: &str,
        sha: Option<&str>,
    ) -> ContentResult<WriteReceipt> {
        let mut body = json!({
            "message": format!("Update {}", self.repo_path(path)),
            "content": BASE64.encode(content),
            "branch": self.config.branch,
        });
        if let Some(sha) = sha {
            body["sha"] = json!(sha);
        }

        let response = self
            .send(self.client.put(self.contents_url(path)).json(&body))
            .await?;
        let status = response.status();
        if status.is_success() {
            let parsed: WriteResponse = response
                .json()
                .await
                .map_err(|err| ContentError::transport(err.to_string()))?;
            debug!(path, "wrote file to GitHub");
            return Ok(WriteReceipt {
                revision_token: parsed.content.map(|c| c.sha),
            });
        }

        let text = response.text().await.unwrap_or_default();
        if is_sha_conflict(status, &text) {
            warn!(path, "write rejected for stale revision");
            return Err(ContentError::conflict(path));
        }
        Err(ContentError::transport(format!(
            "GitHub API error ({status}): {text}"
        )))
    }

    /// Fetch a file's current SHA, for tokenless writes and deletes.
    async fn current_sha(&self, path: &str) -> ContentResult<Option<String>> {
        let response = self
            .send(
                self.client
                    .get(self.contents_url(path))
                    .query(&[("ref", self.config.branch.as_str())]),
            )
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let file: ContentsFile = response
                    .json()
                    .await
                    .map_err(|err| ContentError::transport(err.to_string()))?;
                Ok(Some(file.sha))
            }
            status => Err(api_error(status, response).await),
        }
    }
}

async fn api_error(status: StatusCode, response: reqwest::Response) -> ContentError {
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ContentError::transport(
            format!("GitHub rejected the credentials ({status}): {body}"),
        ),
        _ => ContentError::transport(format!("GitHub API error ({status}): {body}")),
    }
}

/// The Contents API reports a stale or missing SHA as 409, or as 422 with
/// a sha complaint in the message.
fn is_sha_conflict(status: StatusCode, body: &str) -> bool {
    status == StatusCode::CONFLICT
        || (status == StatusCode::UNPROCESSABLE_ENTITY && body.contains("sha"))
}

#[async_trait]
impl StorageBackend for GitHubStore {
    async fn read(&self, path: &str) -> ContentResult<ReadState> {
        let response = self
            .send(
                self.client
                    .get(self.contents_url(path))
                    .query(&[("ref", self.config.branch.as_str())]),
            )
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(ReadState::absent()),
            status if status.is_success() => {
                let file: ContentsFile = response
                    .json()
                    .await
                    .map_err(|err| ContentError::transport(err.to_string()))?;
                let encoded: String = file
                    .content
                    .unwrap_or_default()
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                let bytes = BASE64
                    .decode(encoded)
                    .map_err(|err| ContentError::transport(format!("invalid base64 in response: {err}")))?;
                let content = String::from_utf8(bytes)
                    .map_err(|err| ContentError::transport(format!("stored file is not UTF-8: {err}")))?;
                Ok(ReadState {
                    content: Some(content),
                    revision_token: Some(file.sha),
                })
            }
            status => Err(api_error(status, response).await),
        }
    }

    async fn write(
        &self,
        path: &str,
        content: &str,
        expected: Option<&str>,
    ) -> ContentResult<WriteReceipt> {
        match self.put_contents(path, content, expected).await {
            // A tokenless write is an unconditional create-or-replace. The
            // API still demands the current sha over an existing file, so
            // fetch it and retry once.
            Err(ContentError::Conflict { .. }) if expected.is_none() => {
                let sha = self.current_sha(path).await?;
                self.put_contents(path, content, sha.as_deref()).await
            }
            other => other,
        }
    }

    async fn remove(&self, path: &str) -> ContentResult<()> {
        let sha = self
            .current_sha(path)
            .await?
            .ok_or_else(|| ContentError::not_found(path))?;

        let body = json!({
            "message": format!("Delete {}", self.repo_path(path)),
            "sha": sha,
            "branch": self.config.branch,
        });
        let response = self
            .send(self.client.delete(self.contents_url(path)).json(&body))
            .await?;
        let status = response.status();
        if status.is_success() {
            debug!(path, "deleted file from GitHub");
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ContentError::not_found(path));
        }
        let text = response.text().await.unwrap_or_default();
        if is_sha_conflict(status, &text) {
            return Err(ContentError::conflict(path));
        }
        Err(ContentError::transport(format!(
            "GitHub API error ({status}): {text}"
        )))
    }

    async fn list_files(&self, dir: &str) -> ContentResult<Vec<FileEntry>> {
        let response = self
            .send(
                self.client
                    .get(self.contents_url(dir))
                    .query(&[("ref", self.config.branch.as_str())]),
            )
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            status if status.is_success() => {
                let listed: Vec<ListEntry> = response
                    .json()
                    .await
                    .map_err(|err| ContentError::transport(err.to_string()))?;
                let entries = listed
                    .into_iter()
                    .filter(|entry| entry.kind == "file" && is_content_file(&entry.name))
                    .map(|entry| FileEntry {
                        path: self.backend_path(&entry.path),
                        name: entry.name,
                        download_url: entry.download_url,
                        last_modified: None,
                    })
                    .collect();
                Ok(entries)
            }
            status => Err(api_error(status, response).await),
        }
    }
}
