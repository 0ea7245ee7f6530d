//! Content collections and schema profiles
//!
//! A collection is a flat directory of documents sharing a schema profile.
//! The profile controls which structured metadata sections the editor
//! offers and how listings are sorted; it never restricts which keys a
//! stored document may carry.

use serde::{Deserialize, Serialize};

use crate::index::SortKey;
use crate::metadata::{Metadata, Value};

/// Extensions recognized as content files. New files are always written as
/// `.md`; `.mdx` survives from the legacy tooling and is honored on read
/// and delete.
pub const CONTENT_EXTENSIONS: [&str; 2] = ["md", "mdx"];

/// Check a file name against the recognized content extensions.
pub fn is_content_file(name: &str) -> bool {
    CONTENT_EXTENSIONS
        .iter()
        .any(|ext| name.rsplit_once('.').map(|(_, e)| e) == Some(ext))
}

/// A named collection of documents sharing a schema profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Posts,
    Portfolio,
    Services,
}

impl Collection {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "posts" => Some(Self::Posts),
            "portfolio" => Some(Self::Portfolio),
            "services" => Some(Self::Services),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Portfolio => "portfolio",
            Self::Services => "services",
        }
    }

    /// Directory holding this collection's files, relative to the content
    /// root the storage backend is anchored to.
    pub fn directory(&self) -> &'static str {
        match self {
            Self::Posts => "content/posts",
            Self::Portfolio => "content/portfolio",
            Self::Services => "content/services",
        }
    }

    /// Storage path for a slug within this collection.
    pub fn file_path(&self, slug: &str) -> String {
        format!("{}/{slug}.md", self.directory())
    }

    /// How list views order this collection by default. Services carry an
    /// explicit numeric order field; the rest sort newest first.
    pub fn default_sort(&self) -> SortKey {
        match self {
            Self::Services => SortKey::OrderThenDate,
            _ => SortKey::DateDesc,
        }
    }

    /// Whether documents in this collection carry the draft flag.
    pub fn has_draft_flag(&self) -> bool {
        !matches!(self, Self::Services)
    }

    /// Whether documents in this collection carry author fields.
    pub fn has_author(&self) -> bool {
        !matches!(self, Self::Services)
    }

    /// The optional structured sections this profile offers.
    pub fn sections(&self) -> Vec<Section> {
        Section::ALL
            .iter()
            .copied()
            .filter(|s| s.available_in(*self))
            .collect()
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An optional structured metadata section with a dedicated editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    Client,
    Results,
    AboutClient,
    Challenge,
    Solution,
    Testimonial,
    Pricing,
    Features,
    Process,
    Faq,
    Cta,
}

impl Section {
    pub const ALL: [Section; 11] = [
        Section::Client,
        Section::Results,
        Section::AboutClient,
        Section::Challenge,
        Section::Solution,
        Section::Testimonial,
        Section::Pricing,
        Section::Features,
        Section::Process,
        Section::Faq,
        Section::Cta,
    ];

    /// Look a section up by its metadata key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.key() == key)
    }

    /// The metadata key (or key prefix) this section owns.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Results => "results",
            Self::AboutClient => "aboutClient",
            Self::Challenge => "challenge",
            Self::Solution => "solution",
            Self::Testimonial => "testimonial",
            Self::Pricing => "pricing",
            Self::Features => "features",
            Self::Process => "process",
            Self::Faq => "faq",
            Self::Cta => "cta",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Client => "Client Info",
            Self::Results => "Results",
            Self::AboutClient => "About Client",
            Self::Challenge => "Challenge",
            Self::Solution => "Solution",
            Self::Testimonial => "Testimonial",
            Self::Pricing => "Pricing",
            Self::Features => "Features",
            Self::Process => "Process",
            Self::Faq => "FAQ",
            Self::Cta => "CTA",
        }
    }

    /// Which collections offer this section.
    pub fn available_in(&self, collection: Collection) -> bool {
        match self {
            Self::Client
            | Self::Results
            | Self::AboutClient
            | Self::Challenge
            | Self::Solution
            | Self::Testimonial => collection == Collection::Portfolio,
            Self::Pricing | Self::Features | Self::Process => {
                collection == Collection::Services
            }
            Self::Faq | Self::Cta => true,
        }
    }

    /// Seed this section's keys with their default payload.
    pub fn apply_default(&self, metadata: &mut Metadata) {
        match self {
            Self::Client => {
                insert(metadata, "client", Value::String(String::new()));
                insert(metadata, "clientLogo", Value::String(String::new()));
            }
            Self::Results => {
                let item = map(&[("metric", ""), ("value", ""), ("description", "")]);
                insert(metadata, "results", Value::Sequence(vec![item]));
            }
            Self::AboutClient | Self::Challenge => {
                insert(metadata, self.key(), map(&[("title", ""), ("description", "")]));
            }
            Self::Solution => {
                let mut section = titled();
                section_insert(&mut section, "features", Value::Sequence(Vec::new()));
                insert(metadata, self.key(), Value::Mapping(section));
            }
            Self::Testimonial => {
                insert(
                    metadata,
                    self.key(),
                    map(&[
                        ("quote", ""),
                        ("author", ""),
                        ("role", ""),
                        ("company", ""),
                        ("image", ""),
                    ]),
                );
            }
            Self::Pricing => {
                let mut section = Metadata::new();
                section_insert(&mut section, "label", Value::String("Starting at".into()));
                section_insert(&mut section, "price", Value::String(String::new()));
                section_insert(&mut section, "description", Value::String(String::new()));
                section_insert(
                    &mut section,
                    "primaryButton",
                    map(&[("text", "Get Started"), ("link", "/contact")]),
                );
                section_insert(
                    &mut section,
                    "secondaryButton",
                    map(&[("text", "Learn More"), ("link", "#features")]),
                );
                insert(metadata, self.key(), Value::Mapping(section));
            }
            Self::Features | Self::Faq => {
                let mut section = titled();
                section_insert(&mut section, "items", Value::Sequence(Vec::new()));
                insert(metadata, self.key(), Value::Mapping(section));
            }
            Self::Process => {
                let mut section = titled();
                section_insert(&mut section, "steps", Value::Sequence(Vec::new()));
                insert(metadata, self.key(), Value::Mapping(section));
            }
            Self::Cta => {
                let mut section = titled();
                section_insert(&mut section, "primaryButton", map(&[("text", ""), ("link", "")]));
                section_insert(
                    &mut section,
                    "secondaryButton",
                    map(&[("text", ""), ("link", "")]),
                );
                insert(metadata, self.key(), Value::Mapping(section));
            }
        }
    }

    /// Remove this section's keys.
    pub fn clear(&self, metadata: &mut Metadata) {
        match self {
            Self::Client => {
                metadata.remove("client");
                metadata.remove("clientLogo");
            }
            _ => {
                metadata.remove(self.key());
            }
        }
    }
}

fn insert(metadata: &mut Metadata, key: &str, value: Value) {
    metadata.insert(Value::String(key.to_string()), value);
}

fn section_insert(section: &mut Metadata, key: &str, value: Value) {
    section.insert(Value::String(key.to_string()), value);
}

fn titled() -> Metadata {
    let mut section = Metadata::new();
    section_insert(&mut section, "title", Value::String(String::new()));
    section_insert(&mut section, "description", Value::String(String::new()));
    section
}

fn map(pairs: &[(&str, &str)]) -> Value {
    let mut section = Metadata::new();
    for (key, value) in pairs {
        section_insert(&mut section, key, Value::String((*value).to_string()));
    }
    Value::Mapping(section)
}

/// Derive a URL slug from a title: lowercase, hyphen-separated word
/// characters, no leading or trailing hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.trim().chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_hyphen = true;
        }
        // Other punctuation is dropped entirely
    }
    slug
}
