//! Build-target detection.
//!
//! Every source defining `main` is an entry point. A target owns the sources
//! of its directory subtree, minus anything claimed by a deeper target
//! directory, so the source sets of all targets are disjoint apart from
//! targets sharing one directory, which split nothing but their entry
//! points. A target at the project root owns the root and `src/` sources.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::core::{BuildTarget, TargetKind};
use crate::util::fs::{parent_dir, read_to_string_lossy};

static MAIN_SIGNATURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:int|void)\s+main\s*\(").unwrap());

/// Whether file contents define a `main` function.
pub fn defines_main(content: &str) -> bool {
    MAIN_SIGNATURE.is_match(content)
}

/// Target name for an entry point: the base name of its directory, or the
/// file stem at the project root.
pub fn target_name(entry_point: &Path) -> String {
    let dir = parent_dir(entry_point);
    match dir.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => entry_point
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

/// Find entry points among `sources` (relative to `root`) and build one
/// target per entry point.
pub fn detect_targets(root: &Path, sources: &[PathBuf]) -> Vec<BuildTarget> {
    let entry_points: Vec<&PathBuf> = sources
        .iter()
        .filter(|src| match read_to_string_lossy(&root.join(src)) {
            Ok(content) => defines_main(&content),
            Err(e) => {
                tracing::warn!("{:#}", e);
                false
            }
        })
        .collect();

    let target_dirs: BTreeSet<PathBuf> = entry_points
        .iter()
        .map(|e| parent_dir(e))
        .filter(|d| !d.as_os_str().is_empty())
        .collect();

    entry_points
        .iter()
        .map(|entry| {
            let directory = parent_dir(entry);
            let mut source_files = vec![(*entry).clone()];
            source_files.extend(
                sources
                    .iter()
                    .filter(|src| !entry_points.contains(src))
                    .filter(|src| belongs_to(src, &directory, &target_dirs))
                    .cloned(),
            );

            tracing::debug!(
                "target {} from {} ({} sources)",
                target_name(entry),
                entry.display(),
                source_files.len()
            );

            BuildTarget {
                name: target_name(entry),
                entry_point: (*entry).clone(),
                source_files,
                directory,
                kind: TargetKind::Executable,
            }
        })
        .collect()
}

/// Deepest target directory containing `file`, if any.
fn nearest_target_dir<'a>(file: &Path, target_dirs: &'a BTreeSet<PathBuf>) -> Option<&'a Path> {
    let dir = parent_dir(file);
    target_dirs
        .iter()
        .filter(|t| dir.starts_with(t))
        .max_by_key(|t| t.components().count())
        .map(PathBuf::as_path)
}

fn belongs_to(file: &Path, directory: &Path, target_dirs: &BTreeSet<PathBuf>) -> bool {
    let nearest = nearest_target_dir(file, target_dirs);

    if directory.as_os_str().is_empty() {
        let dir = parent_dir(file);
        let in_root_or_src = dir.as_os_str().is_empty() || dir.starts_with("src");
        in_root_or_src && nearest.is_none()
    } else {
        nearest == Some(directory)
    }
}
