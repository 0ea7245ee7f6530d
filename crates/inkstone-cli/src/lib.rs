//! Operator CLI for inkstone content collections
//!
//! Thin command layer over `inkstone-core` sessions and the storage
//! backends in `inkstone-store`. Backend selection is environment-driven
//! and resolved once in [`config::CliConfig`].

pub mod cli;
pub mod commands;
pub mod config;
