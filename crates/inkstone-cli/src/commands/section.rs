//! `inkstone section`

use anyhow::{bail, Result};

use inkstone_core::{Collection, EditorSession, Metadata, Section};

use crate::cli::SectionAction;
use crate::config::CliConfig;

pub async fn run(
    config: &CliConfig,
    collection: Collection,
    slug: &str,
    action: SectionAction,
    name: &str,
) -> Result<()> {
    config.require_editor()?;
    let Some(section) = Section::from_key(name) else {
        let known = Section::ALL
            .iter()
            .map(|s| s.key())
            .collect::<Vec<_>>()
            .join(", ");
        bail!("unknown section `{name}`; expected one of: {known}");
    };

    let store = config.build_store()?;
    let mut session = EditorSession::new(store, collection, slug);
    session.load(Metadata::new()).await?;
    if !session.exists() {
        bail!("{} does not exist", session.path());
    }

    match action {
        SectionAction::Add => {
            session.add_section(section)?;
            session.save().await?;
            println!("added {} section to {}", section.key(), session.path());
        }
        SectionAction::Remove => {
            session.remove_section(section)?;
            session.save().await?;
            println!("removed {} section from {}", section.key(), session.path());
        }
    }
    Ok(())
}
