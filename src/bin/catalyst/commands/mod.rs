//! Command implementations

pub mod analyze;
pub mod completions;
pub mod doctor;
pub mod install;
pub mod picker;
pub mod resolve;
pub mod scan;
pub mod symbols;
pub mod translate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

/// The given directory, or the current one.
pub fn project_dir(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

/// Project root for a document path given on the command line.
pub fn document_root(document: &Path) -> PathBuf {
    catalyst::ops::project_config::project_root(document)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
