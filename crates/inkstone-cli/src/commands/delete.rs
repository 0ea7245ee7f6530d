//! `inkstone delete`

use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};

use inkstone_core::traits::StorageBackend;
use inkstone_core::Collection;

use crate::config::CliConfig;

pub async fn run(
    config: &CliConfig,
    collection: Collection,
    slug: &str,
    yes: bool,
) -> Result<()> {
    config.require_editor()?;
    let store = config.build_store()?;

    // Prefer the canonical .md path, fall back to a legacy .mdx file
    let md_path = collection.file_path(slug);
    let mdx_path = format!("{}/{slug}.mdx", collection.directory());
    let path = if store.read(&md_path).await?.exists() {
        md_path
    } else if store.read(&mdx_path).await?.exists() {
        mdx_path
    } else {
        bail!("{md_path} does not exist");
    };

    if !yes && !confirm(&path)? {
        println!("aborted");
        return Ok(());
    }

    store.remove(&path).await?;
    println!("deleted {path}");
    Ok(())
}

fn confirm(path: &str) -> Result<bool> {
    print!("delete {path}? [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}
