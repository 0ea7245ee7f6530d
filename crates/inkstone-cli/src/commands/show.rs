//! `inkstone show`

use anyhow::{bail, Result};

use inkstone_core::traits::StorageBackend;
use inkstone_core::{Collection, Document};

use crate::config::CliConfig;

pub async fn run(
    config: &CliConfig,
    collection: Collection,
    slug: &str,
    raw: bool,
    json: bool,
) -> Result<()> {
    let store = config.build_store()?;
    let path = collection.file_path(slug);
    let read = store.read(&path).await?;
    let Some(content) = read.content else {
        bail!("{path} does not exist");
    };

    if raw {
        print!("{content}");
        return Ok(());
    }

    let document = Document::parse(&path, &content, read.revision_token)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    println!("path:  {}", document.path);
    if let Some(title) = document.title() {
        println!("title: {title}");
    }
    if document.is_draft() {
        println!("draft: true");
    }
    if !document.metadata.is_empty() {
        println!("---");
        print!("{}", serde_yaml::to_string(&document.metadata)?);
    }
    println!("---");
    print!("{}", document.body);
    Ok(())
}
