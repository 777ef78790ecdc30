//! Dependency signal extraction.
//!
//! Two signals feed the resolver:
//!
//! - the static `#include` scan in [`includes`], which yields abstract
//!   dependency identifiers
//! - the trial-link scan in [`symbols`], which groups undefined symbols into
//!   categories with advisory suggestions

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

pub mod includes;
pub mod symbols;

pub use includes::{extract_dependencies, scan_dependencies, scan_files};
pub use symbols::{
    categorize_symbol, parse_link_errors, scan_missing_symbols, suggested_dependencies,
    MissingDependencyGroup, SymbolInfo,
};

/// Error that stops a scan before it produces anything.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ScanError {
    #[error("project root not found: {}", path.display())]
    #[diagnostic(
        code(catalyst::scan::root_not_found),
        help("Pass an existing directory to scan")
    )]
    RootNotFound { path: PathBuf },

    #[error("failed to walk {}", path.display())]
    #[diagnostic(code(catalyst::scan::walk))]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to prepare trial link: {message}")]
    #[diagnostic(code(catalyst::scan::trial_link))]
    TrialLink { message: String },
}

impl ScanError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ScanError::RootNotFound { path } => {
                Diagnostic::error(format!("cannot scan `{}`", path.display()))
                    .with_context("the directory does not exist or is not a directory")
                    .with_suggestion("Check the path passed to `catalyst scan`")
            }
            ScanError::Walk { path, source } => {
                Diagnostic::error(format!("cannot read `{}`", path.display()))
                    .with_context(source.to_string())
                    .with_suggestion("Check the directory permissions")
            }
            ScanError::TrialLink { message } => Diagnostic::error("trial link could not run")
                .with_context(message.clone())
                .with_suggestion("Check that the temporary directory is writable"),
        }
    }
}
