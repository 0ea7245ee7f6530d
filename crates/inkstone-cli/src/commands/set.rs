//! `inkstone set`

use anyhow::{bail, Context, Result};

use inkstone_core::{Collection, EditorSession, Metadata, Value};

use crate::config::CliConfig;

pub async fn run(
    config: &CliConfig,
    collection: Collection,
    slug: &str,
    field: &str,
    value: &str,
) -> Result<()> {
    config.require_editor()?;
    let store = config.build_store()?;

    let mut session = EditorSession::new(store, collection, slug);
    session.load(Metadata::new()).await?;
    if !session.exists() {
        bail!("{} does not exist; use `inkstone new` first", session.path());
    }
    if let Some(warning) = session.warning() {
        bail!(
            "{} did not decode cleanly ({warning}); repair it before structured edits",
            session.path()
        );
    }

    let value: Value = serde_yaml::from_str(value)
        .with_context(|| format!("`{value}` is not valid YAML"))?;
    session.set_field(field, value)?;
    session.save().await?;
    println!("updated {field} in {}", session.path());
    Ok(())
}
