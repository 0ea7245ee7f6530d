//! Markdown ⇄ rich-text conversion
//!
//! The visual editor works on a tree of blocks and inline spans; storage
//! works on Markdown text. Conversion is one-directional per call and only
//! runs on explicit commit events from the editing surface, never as a
//! change-tracking feedback loop.
//!
//! [`to_rich_text`] is total: any input yields a tree, with constructs the
//! tree does not model (raw HTML, extensions) passing through as opaque
//! nodes. [`to_markdown`] emits normalized Markdown (ATX headings, fenced
//! code, `-` bullets), so converting already-normalized text is a fixed
//! point: one round trip may reformat, the second never does.

mod reader;
mod writer;

use serde::{Deserialize, Serialize};

pub use reader::to_rich_text;
pub use writer::to_markdown;

/// A parsed rich-text document: a sequence of blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RichTextTree {
    pub blocks: Vec<Block>,
}

impl RichTextTree {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Block-level node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph { content: Vec<Inline> },
    CodeBlock { language: Option<String>, code: String },
    List { ordered: bool, start: u64, items: Vec<Vec<Block>> },
    BlockQuote { content: Vec<Block> },
    Rule,
    /// Raw HTML (or any construct we treat as opaque), passed through verbatim.
    Html { html: String },
}

/// Inline span node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    Text { text: String },
    Code { code: String },
    Strong { content: Vec<Inline> },
    Emphasis { content: Vec<Inline> },
    Strikethrough { content: Vec<Inline> },
    Link { url: String, title: String, content: Vec<Inline> },
    Image { url: String, alt: String },
    SoftBreak,
    HardBreak,
    Html { html: String },
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}
