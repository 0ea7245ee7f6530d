//! Inkstone content core
//!
//! The content-synchronization layer of the inkstone CMS: an in-memory
//! editable document model reconciled against Markdown+YAML files stored
//! behind interchangeable backends (local disk for development, a GitHub
//! repository in production).
//!
//! This crate provides:
//! - Frontmatter codec (YAML metadata block + Markdown body, round-trip safe)
//! - Markdown ⇄ rich-text tree conversion for the visual editor
//! - The `StorageBackend` abstraction with optimistic-concurrency tokens
//! - The editing-session state machine (structured and raw editing modes)
//! - Collection indexing with pluggable sort policies

pub mod collection;
pub mod document;
pub mod error;
pub mod frontmatter;
pub mod index;
pub mod metadata;
pub mod richtext;
pub mod session;
pub mod test_support;
pub mod traits;

// Re-export main types for convenience
pub use collection::{slugify, Collection, Section};
pub use document::Document;
pub use error::{ContentError, ContentResult};
pub use frontmatter::ParsedDocument;
pub use index::{ContentIndex, IndexEntry, SortKey};
pub use metadata::{Metadata, Value};
pub use richtext::{to_markdown, to_rich_text, Block, Inline, RichTextTree};
pub use session::{EditorSession, SessionState};
pub use traits::{
    AllowAll, AllowList, AssetEntry, AssetStore, Authorizer, EditorIdentity, FileEntry, ReadState,
    StorageBackend, WriteReceipt,
};
