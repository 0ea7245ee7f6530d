//! Editing-session state machine
//!
//! An [`EditorSession`] reconciles one in-memory [`Document`] against its
//! stored form. It owns the load/edit/save lifecycle, the structured/raw
//! mode toggle, and the revision-token threading that makes concurrent
//! sessions fail loudly instead of overwriting each other.
//!
//! Sessions are single-document and single-user; there is no in-process
//! locking. Cross-session safety comes entirely from the backend's write
//! precondition.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::collection::{Collection, Section};
use crate::document::Document;
use crate::error::{ContentError, ContentResult};
use crate::frontmatter;
use crate::metadata::{self, Metadata, Value};
use crate::richtext::{to_markdown, to_rich_text, RichTextTree};
use crate::traits::StorageBackend;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Loading,
    Loaded,
    LoadFailed,
    Editing,
    Saving,
    Saved,
    SaveFailed { retryable: bool },
}

/// One document's editing session against an injected storage backend.
pub struct EditorSession {
    store: Arc<dyn StorageBackend>,
    collection: Collection,
    path: String,
    document: Document,
    /// Raw-mode buffer; `Some` means raw mode is active
    raw: Option<String>,
    /// Undecodable stored text parked at load time, offered when entering
    /// raw mode so a corrupt file can be repaired by hand
    recovered: Option<String>,
    warning: Option<String>,
    exists: bool,
    state: SessionState,
}

impl EditorSession {
    /// Open a session for a slug in a collection. Nothing is read until
    /// [`load`](Self::load).
    pub fn new(
        store: Arc<dyn StorageBackend>,
        collection: Collection,
        slug: &str,
    ) -> Self {
        let path = collection.file_path(slug);
        Self::at_path(store, collection, path)
    }

    /// Open a session at an explicit path, for legacy `.mdx` files that do
    /// not follow the `{slug}.md` naming.
    pub fn at_path(
        store: Arc<dyn StorageBackend>,
        collection: Collection,
        path: impl Into<String>,
    ) -> Self {
        let path = path.into();
        Self {
            store,
            collection,
            document: Document::new(path.clone()),
            path,
            raw: None,
            recovered: None,
            warning: None,
            exists: false,
            state: SessionState::Empty,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Whether the stored file existed at load time or a save has landed.
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Non-fatal warning from the last load, if any.
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn in_raw_mode(&self) -> bool {
        self.raw.is_some()
    }

    // ------------------------------------------------------------------
    // Load
    // ------------------------------------------------------------------

    /// Read the stored file and reconcile it into the session.
    ///
    /// A missing file is the "create new" flow: the document is seeded from
    /// `defaults` and marked as not yet existing. A file whose metadata
    /// block fails to decode does not block editing; the session seeds from
    /// `defaults`, surfaces a warning, and parks the stored text for raw
    /// mode recovery. Transport failures are the only load errors.
    pub async fn load(&mut self, defaults: Metadata) -> ContentResult<()> {
        self.state = SessionState::Loading;
        self.raw = None;
        self.recovered = None;
        self.warning = None;

        let read = match self.store.read(&self.path).await {
            Ok(read) => read,
            Err(err) => {
                self.state = SessionState::LoadFailed;
                return Err(err);
            }
        };

        match read.content {
            None => {
                debug!(path = %self.path, "no stored file, seeding new document");
                self.document = Document::new(&self.path).with_metadata(defaults);
                self.exists = false;
            }
            Some(stored) => {
                self.exists = true;
                match Document::parse(&self.path, &stored, read.revision_token.clone()) {
                    Ok(document) => self.document = document,
                    Err(err) => {
                        warn!(path = %self.path, error = %err, "stored document failed to decode, falling back to defaults");
                        self.warning = Some(err.to_string());
                        self.recovered = Some(stored);
                        self.document = Document::new(&self.path).with_metadata(defaults);
                        self.document.revision_token = read.revision_token;
                    }
                }
            }
        }
        self.state = SessionState::Loaded;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Structured-mode edits
    // ------------------------------------------------------------------

    fn structured(&mut self) -> ContentResult<&mut Document> {
        if self.raw.is_some() {
            return Err(ContentError::validation(
                "structured edits are unavailable while raw mode is active",
            ));
        }
        self.state = SessionState::Editing;
        Ok(&mut self.document)
    }

    /// Set a metadata field by dot-separated key path, creating intermediate
    /// containers on demand.
    pub fn set_field(&mut self, key_path: &str, value: Value) -> ContentResult<()> {
        let document = self.structured()?;
        metadata::set_path(&mut document.metadata, key_path, value)
    }

    pub fn remove_field(&mut self, key_path: &str) -> ContentResult<Option<Value>> {
        let document = self.structured()?;
        Ok(metadata::remove_path(&mut document.metadata, key_path))
    }

    /// Append an item to an array field, creating the array if absent.
    pub fn append_item(&mut self, key_path: &str, item: Value) -> ContentResult<()> {
        let document = self.structured()?;
        metadata::append_item(&mut document.metadata, key_path, item)
    }

    pub fn remove_item(&mut self, key_path: &str, index: usize) -> ContentResult<Value> {
        let document = self.structured()?;
        metadata::remove_item(&mut document.metadata, key_path, index)
    }

    pub fn set_body(&mut self, body: impl Into<String>) -> ContentResult<()> {
        let document = self.structured()?;
        document.body = body.into();
        Ok(())
    }

    /// Seed a structured section's default payload into the metadata.
    pub fn add_section(&mut self, section: Section) -> ContentResult<()> {
        if !section.available_in(self.collection) {
            return Err(ContentError::validation(format!(
                "section {:?} is not available in the {} collection",
                section, self.collection
            )));
        }
        let document = self.structured()?;
        section.apply_default(&mut document.metadata);
        Ok(())
    }

    pub fn remove_section(&mut self, section: Section) -> ContentResult<()> {
        let document = self.structured()?;
        section.clear(&mut document.metadata);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rich-text commits
    // ------------------------------------------------------------------

    /// Current body as a rich-text tree, for handing to a visual editor.
    pub fn rich_text(&self) -> RichTextTree {
        to_rich_text(&self.document.body)
    }

    /// Replace the body with a committed rich-text tree. Called on explicit
    /// commit events from the editing surface, never per keystroke.
    pub fn commit_rich_text(&mut self, tree: &RichTextTree) -> ContentResult<()> {
        let body = to_markdown(tree);
        self.set_body(body)
    }

    // ------------------------------------------------------------------
    // Raw mode
    // ------------------------------------------------------------------

    /// Switch to raw mode. The buffer starts from the parked stored text
    /// when the load fell back, otherwise from serializing current state.
    pub fn enter_raw_mode(&mut self) -> ContentResult<&str> {
        if self.raw.is_none() {
            let text = match self.recovered.take() {
                Some(text) => text,
                None => self.document.serialize()?,
            };
            self.raw = Some(text);
        }
        Ok(self.raw.as_deref().unwrap_or_default())
    }

    pub fn raw_text(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn set_raw(&mut self, text: impl Into<String>) -> ContentResult<()> {
        match self.raw.as_mut() {
            Some(raw) => {
                *raw = text.into();
                self.state = SessionState::Editing;
                Ok(())
            }
            None => Err(ContentError::validation("raw mode is not active")),
        }
    }

    /// Switch back to structured mode by decoding the raw buffer.
    ///
    /// If the buffer does not decode, the switch is rejected and the buffer
    /// is left untouched; structured state is never silently reset.
    pub fn exit_raw_mode(&mut self) -> ContentResult<()> {
        let Some(raw) = self.raw.as_deref() else {
            return Ok(());
        };
        let parsed = frontmatter::decode(raw)?;
        self.document.metadata = parsed.metadata;
        self.document.body = parsed.body;
        self.raw = None;
        self.state = SessionState::Editing;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Save
    // ------------------------------------------------------------------

    /// Persist the session to storage.
    ///
    /// Raw mode writes the buffer verbatim; structured mode re-encodes
    /// metadata and body and requires a non-empty title. The last-seen
    /// revision token is always passed as the write precondition. On
    /// conflict the failure is retryable (reload and retry); on any failure
    /// the in-memory edits stay intact.
    pub async fn save(&mut self) -> ContentResult<()> {
        let payload = match &self.raw {
            Some(raw) => raw.clone(),
            None => {
                if self.document.title().map_or(true, |t| t.trim().is_empty()) {
                    return Err(ContentError::validation(
                        "a title is required before saving",
                    ));
                }
                self.document.serialize()?
            }
        };

        self.state = SessionState::Saving;
        match self
            .store
            .write(&self.path, &payload, self.document.revision_token.as_deref())
            .await
        {
            Ok(receipt) => {
                debug!(path = %self.path, "saved");
                self.document.revision_token = receipt.revision_token;
                self.exists = true;
                self.state = SessionState::Saved;
                Ok(())
            }
            Err(err) => {
                warn!(path = %self.path, error = %err, "save failed");
                self.state = SessionState::SaveFailed {
                    retryable: err.is_retryable(),
                };
                Err(err)
            }
        }
    }
}
