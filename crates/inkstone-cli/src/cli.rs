//! Command-line argument definitions

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "inkstone", version, about = "Manage markdown content collections")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List a collection's documents
    List {
        /// Collection name: posts, portfolio, or services
        collection: String,

        /// Override the collection's default sort order
        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print one document
    Show {
        collection: String,
        slug: String,

        /// Print the stored file verbatim instead of the parsed form
        #[arg(long)]
        raw: bool,

        /// Emit the parsed document as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new document
    New {
        collection: String,

        /// Document title; the slug is derived from it unless --slug is given
        title: String,

        /// Explicit slug override
        #[arg(long)]
        slug: Option<String>,

        /// Create as published instead of draft
        #[arg(long)]
        published: bool,
    },

    /// Commit a raw document blob, bypassing the typed model
    Save {
        collection: String,
        slug: String,

        /// File holding the full blob (frontmatter + body); `-` reads stdin
        #[arg(long)]
        file: std::path::PathBuf,
    },

    /// Set a metadata field on a document and save
    Set {
        collection: String,
        slug: String,

        /// Dot-separated key path, e.g. `pricing.price` or `tags.0`
        field: String,

        /// New value, parsed as YAML (so `true`, `3`, and `[a, b]` are typed)
        value: String,
    },

    /// Add or remove a structured section's default fields
    Section {
        collection: String,
        slug: String,

        #[arg(value_enum)]
        action: SectionAction,

        /// Section key, e.g. `pricing`, `faq`, `testimonial`
        name: String,
    },

    /// Delete a document
    Delete {
        collection: String,
        slug: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Verify that every stored document decodes cleanly
    Check {
        /// Restrict to one collection
        collection: Option<String>,
    },

    /// Show the active backend configuration
    Mode,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    /// Newest first by date
    Date,
    /// Ascending numeric order field, then date
    Order,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SectionAction {
    Add,
    Remove,
}
