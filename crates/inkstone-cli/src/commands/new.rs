//! `inkstone new`

use anyhow::{bail, Result};
use chrono::Utc;

use inkstone_core::{slugify, Collection, EditorSession, Metadata, Value};

use crate::config::CliConfig;

/// Default metadata for a freshly created document.
pub fn default_metadata(collection: Collection, title: &str, published: bool) -> Metadata {
    let mut defaults = Metadata::new();
    defaults.insert(Value::from("title"), Value::from(title));
    defaults.insert(Value::from("description"), Value::from(""));
    defaults.insert(
        Value::from("date"),
        Value::from(Utc::now().date_naive().format("%Y-%m-%d").to_string()),
    );
    if collection.has_draft_flag() {
        defaults.insert(Value::from("draft"), Value::from(!published));
    }
    defaults
}

pub async fn run(
    config: &CliConfig,
    collection: Collection,
    title: &str,
    slug: Option<String>,
    published: bool,
) -> Result<()> {
    config.require_editor()?;
    let slug = match slug {
        Some(slug) => slug,
        None => slugify(title),
    };
    if slug.is_empty() {
        bail!("cannot derive a slug from `{title}`; pass --slug");
    }

    let store = config.build_store()?;
    let mut session = EditorSession::new(store, collection, &slug);
    session.load(default_metadata(collection, title, published)).await?;
    if session.exists() {
        bail!("{} already exists", session.path());
    }
    session.save().await?;
    println!("created {}", session.path());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkstone_core::metadata::get_bool;

    #[test]
    fn posts_default_to_draft() {
        let meta = default_metadata(Collection::Posts, "Hello", false);
        assert!(get_bool(&meta, "draft", false));
    }

    #[test]
    fn services_carry_no_draft_flag() {
        let meta = default_metadata(Collection::Services, "Audit", false);
        assert!(!meta.contains_key("draft"));
    }
}
