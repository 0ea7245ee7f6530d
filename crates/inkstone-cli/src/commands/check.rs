//! `inkstone check`
//!
//! Walks every content file and reports the ones whose frontmatter does
//! not decode. Exits nonzero when problems are found so it can run in CI.

use anyhow::{bail, Result};
use tracing::debug;

use inkstone_core::traits::StorageBackend;
use inkstone_core::{frontmatter, Collection};

use crate::config::CliConfig;

const ALL_COLLECTIONS: [Collection; 3] = [
    Collection::Posts,
    Collection::Portfolio,
    Collection::Services,
];

pub async fn run(config: &CliConfig, collection: Option<Collection>) -> Result<()> {
    let store = config.build_store()?;
    let collections: Vec<Collection> = match collection {
        Some(one) => vec![one],
        None => ALL_COLLECTIONS.to_vec(),
    };

    let mut checked = 0usize;
    let mut problems = Vec::new();
    for collection in collections {
        for entry in store.list_files(collection.directory()).await? {
            checked += 1;
            let read = store.read(&entry.path).await?;
            let raw = read.content.unwrap_or_default();
            match frontmatter::decode_metadata(&raw) {
                Ok(metadata) => {
                    debug!(path = %entry.path, "decoded cleanly");
                    if metadata.get("title").is_none() {
                        problems.push(format!("{}: missing title", entry.path));
                    }
                }
                Err(err) => problems.push(format!("{}: {err}", entry.path)),
            }
        }
    }

    if problems.is_empty() {
        println!("checked {checked} files, all clean");
        Ok(())
    } else {
        for problem in &problems {
            eprintln!("{problem}");
        }
        bail!("{} of {checked} files have problems", problems.len());
    }
}
