//! Storage backends for inkstone content
//!
//! Two implementations of the [`StorageBackend`] contract from
//! `inkstone-core`:
//!
//! - [`LocalStore`]: files under a content root on local disk. No revision
//!   tracking; intended for single-operator development.
//! - [`GitHubStore`]: files in a GitHub repository via the Contents API,
//!   with blob SHAs as revision tokens so concurrent editors conflict
//!   instead of overwriting each other.
//!
//! Which backend a deployment uses is decided once at construction and
//! injected as an `Arc<dyn StorageBackend>`.

pub mod github;
pub mod local;

pub use github::{GitHubConfig, GitHubStore};
pub use local::LocalStore;

#[doc(inline)]
pub use inkstone_core::traits::StorageBackend;
