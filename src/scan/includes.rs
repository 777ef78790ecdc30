//! `#include` scanning.
//!
//! Every C-family file under the root is read line by line. A line counts
//! only when, after trimming leading whitespace, it starts with `#include`:
//!
//! - `#include <curl/curl.h>` yields `curl` (first segment before `.`, `/`
//!   or `>`)
//! - `#include "myutils.h"` yields `myutils` (file name without extension)

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::core::AbstractDependency;
use crate::scan::ScanError;
use crate::util::fs::{is_c_family_file, read_to_string_lossy, walk_source_tree};

static SYSTEM_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#include\s*<([^/.>]+)[./>]").unwrap());

static LOCAL_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^#include\s*"([^"]+)""#).unwrap());

/// Parse one source line into a dependency identifier.
fn parse_include_line(line: &str) -> Option<AbstractDependency> {
    let line = line.trim();
    if !line.starts_with("#include") {
        return None;
    }

    if let Some(caps) = SYSTEM_INCLUDE.captures(line) {
        return Some(AbstractDependency::new(&caps[1]));
    }

    let caps = LOCAL_INCLUDE.captures(line)?;
    let stem = Path::new(&caps[1]).file_stem()?.to_string_lossy().into_owned();
    (!stem.is_empty()).then(|| AbstractDependency::new(stem))
}

/// Extract every include-derived dependency from file contents, in order of
/// appearance (duplicates kept).
pub fn extract_dependencies(content: &str) -> Vec<AbstractDependency> {
    content.lines().filter_map(parse_include_line).collect()
}

/// Recursively scan `root` and return its unique dependency identifiers,
/// sorted.
///
/// Only a root that cannot be walked is an error; unreadable files and
/// unreadable subdirectories are logged and skipped.
pub fn scan_dependencies(root: &Path) -> Result<Vec<AbstractDependency>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut deps = BTreeSet::new();
    for entry in walk_source_tree(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ScanError::Walk {
                    path: root.to_path_buf(),
                    source: e,
                })
            }
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.file_type().is_file() && is_c_family_file(entry.path()) {
            deps.extend(scan_file(entry.path()));
        }
    }

    tracing::debug!("found {} unique dependencies under {}", deps.len(), root.display());
    Ok(deps.into_iter().collect())
}

/// Scan an explicit list of files (relative to `root`), e.g. the sources of
/// one build target.
pub fn scan_files(root: &Path, files: &[PathBuf]) -> Vec<AbstractDependency> {
    let deps: BTreeSet<_> = files
        .iter()
        .filter(|f| is_c_family_file(f))
        .flat_map(|f| scan_file(&root.join(f)))
        .collect();
    deps.into_iter().collect()
}

fn scan_file(path: &Path) -> Vec<AbstractDependency> {
    match read_to_string_lossy(path) {
        Ok(content) => extract_dependencies(&content),
        Err(e) => {
            tracing::warn!("failed to process {}: {:#}", path.display(), e);
            Vec::new()
        }
    }
}
