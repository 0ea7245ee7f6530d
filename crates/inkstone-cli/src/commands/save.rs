//! `inkstone save`
//!
//! Commit a raw document blob (frontmatter + body) from a file or stdin,
//! bypassing the typed model. The current revision is read first so the
//! write still carries the token.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use inkstone_core::{Collection, EditorSession, Metadata};

use crate::config::CliConfig;

pub async fn run(
    config: &CliConfig,
    collection: Collection,
    slug: &str,
    file: &Path,
) -> Result<()> {
    config.require_editor()?;
    let blob = if file == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        buffer
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?
    };

    let store = config.build_store()?;
    let mut session = EditorSession::new(store, collection, slug);
    session.load(Metadata::new()).await?;
    session.enter_raw_mode()?;
    session.set_raw(blob)?;
    session.save().await?;
    println!("saved {}", session.path());
    Ok(())
}
