//! `inkstone list`

use anyhow::Result;

use inkstone_core::{Collection, ContentIndex, SortKey};

use crate::cli::SortArg;
use crate::config::CliConfig;

pub async fn run(
    config: &CliConfig,
    collection: Collection,
    sort: Option<SortArg>,
    json: bool,
) -> Result<()> {
    let store = config.build_store()?;
    let sort = match sort {
        Some(SortArg::Date) => SortKey::DateDesc,
        Some(SortArg::Order) => SortKey::OrderThenDate,
        None => collection.default_sort(),
    };

    let index = ContentIndex::new(store);
    let entries = index.list(collection, sort).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("no documents in {collection}");
        return Ok(());
    }
    for entry in &entries {
        let date = entry
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "          ".to_string());
        let marker = if entry.draft { " [draft]" } else { "" };
        println!(
            "{date}  {:<28}  {}{marker}",
            entry.slug,
            entry.title.as_deref().unwrap_or("(untitled)")
        );
    }
    Ok(())
}
