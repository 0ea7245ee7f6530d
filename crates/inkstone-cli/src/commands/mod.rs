//! Command implementations

pub mod check;
pub mod delete;
pub mod list;
pub mod new;
pub mod save;
pub mod section;
pub mod set;
pub mod show;

use anyhow::{bail, Result};
use inkstone_core::Collection;

/// Resolve a collection argument or fail with the valid names.
pub fn collection_arg(name: &str) -> Result<Collection> {
    match Collection::from_name(name) {
        Some(collection) => Ok(collection),
        None => bail!("unknown collection `{name}`; expected posts, portfolio, or services"),
    }
}
