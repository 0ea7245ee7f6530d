//! Document model
//!
//! A [`Document`] is the unit of content: a storage path, an ordered
//! metadata map, a Markdown body, and the optional revision token that backs
//! optimistic concurrency on save. The token is absent for new documents
//! and for the local-disk backend.

use serde::{Deserialize, Serialize};

use crate::error::ContentResult;
use crate::frontmatter;
use crate::metadata::{self, Metadata, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Logical storage location: collection directory + slug + extension
    pub path: String,

    /// Ordered metadata map; unknown keys are carried verbatim
    pub metadata: Metadata,

    /// Markdown body text
    pub body: String,

    /// Last-seen revision token, passed back as the write precondition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_token: Option<String>,
}

impl Document {
    /// Create an empty in-memory document (the "new document" flow).
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            metadata: Metadata::new(),
            body: String::new(),
            revision_token: None,
        }
    }

    /// Builder-style: seed metadata
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Builder-style: seed body text
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Parse a stored blob into a document.
    pub fn parse(
        path: impl Into<String>,
        raw: &str,
        revision_token: Option<String>,
    ) -> ContentResult<Self> {
        let parsed = frontmatter::decode(raw)?;
        Ok(Self {
            path: path.into(),
            metadata: parsed.metadata,
            body: parsed.body,
            revision_token,
        })
    }

    /// Serialize metadata and body into a single storable blob.
    pub fn serialize(&self) -> ContentResult<String> {
        frontmatter::encode(&self.body, &self.metadata)
    }

    /// The title field, when present and a string.
    pub fn title(&self) -> Option<&str> {
        metadata::get_str(&self.metadata, "title")
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.metadata
            .insert(Value::String("title".to_string()), Value::String(title.into()));
    }

    /// The draft flag; absent means published.
    pub fn is_draft(&self) -> bool {
        metadata::get_bool(&self.metadata, "draft", false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_serialize_are_inverse() {
        let raw = "---\ntitle: Hi\ndraft: false\n---\nbody text\n";
        let doc = Document::parse("content/posts/hi.md", raw, Some("abc".into())).unwrap();
        assert_eq!(doc.title(), Some("Hi"));
        assert!(!doc.is_draft());
        assert_eq!(doc.revision_token.as_deref(), Some("abc"));
        assert_eq!(doc.serialize().unwrap(), raw);
    }

    #[test]
    fn new_document_has_no_token() {
        let doc = Document::new("content/posts/x.md");
        assert!(doc.revision_token.is_none());
        assert!(doc.title().is_none());
        assert!(!doc.is_draft());
    }

    #[test]
    fn set_title_overwrites() {
        let mut doc = Document::new("content/posts/x.md");
        doc.set_title("First");
        doc.set_title("Second");
        assert_eq!(doc.title(), Some("Second"));
    }
}
