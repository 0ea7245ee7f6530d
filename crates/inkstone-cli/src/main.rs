use anyhow::Result;
use clap::Parser;

use inkstone_cli::{
    cli::{Cli, Commands},
    commands,
    config::CliConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = CliConfig::load()?;

    match cli.command {
        Commands::List {
            collection,
            sort,
            json,
        } => {
            let collection = commands::collection_arg(&collection)?;
            commands::list::run(&config, collection, sort, json).await
        }
        Commands::Show {
            collection,
            slug,
            raw,
            json,
        } => {
            let collection = commands::collection_arg(&collection)?;
            commands::show::run(&config, collection, &slug, raw, json).await
        }
        Commands::New {
            collection,
            title,
            slug,
            published,
        } => {
            let collection = commands::collection_arg(&collection)?;
            commands::new::run(&config, collection, &title, slug, published).await
        }
        Commands::Save {
            collection,
            slug,
            file,
        } => {
            let collection = commands::collection_arg(&collection)?;
            commands::save::run(&config, collection, &slug, &file).await
        }
        Commands::Set {
            collection,
            slug,
            field,
            value,
        } => {
            let collection = commands::collection_arg(&collection)?;
            commands::set::run(&config, collection, &slug, &field, &value).await
        }
        Commands::Section {
            collection,
            slug,
            action,
            name,
        } => {
            let collection = commands::collection_arg(&collection)?;
            commands::section::run(&config, collection, &slug, action, &name).await
        }
        Commands::Delete {
            collection,
            slug,
            yes,
        } => {
            let collection = commands::collection_arg(&collection)?;
            commands::delete::run(&config, collection, &slug, yes).await
        }
        Commands::Check { collection } => {
            let collection = collection
                .as_deref()
                .map(commands::collection_arg)
                .transpose()?;
            commands::check::run(&config, collection).await
        }
        Commands::Mode => {
            println!("mode: {}", config.mode.name());
            println!("root: {}", config.root.display());
            if config.editors.is_empty() {
                println!("editors: (everyone)");
            } else {
                println!("editors: {}", config.editors.join(", "));
            }
            Ok(())
        }
    }
}
