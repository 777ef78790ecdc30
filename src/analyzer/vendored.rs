//! Vendored-library detection.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyzer::catalog::{LIBRARY_DIR_PATTERNS, VENDOR_DIRS};
use crate::core::VendoredLibrary;
use crate::util::fs::{is_header_file, is_ignored_dir, is_source_file, parent_dir};

/// Find libraries bundled into the project.
///
/// Directories under a conventional vendor root are libraries when they hold
/// sources and headers directly. Outside those roots, a directory whose name
/// looks like a well-known library counts when its whole subtree's sources sit
/// directly in it. `target_dirs` are never treated as libraries.
pub fn detect_vendored(
    root: &Path,
    sources: &[PathBuf],
    headers: &[PathBuf],
    target_dirs: &BTreeSet<PathBuf>,
) -> Vec<VendoredLibrary> {
    let mut libs = Vec::new();

    for vendor in VENDOR_DIRS {
        let rel = PathBuf::from(vendor);
        if root.join(&rel).is_dir() {
            scan_vendor_dir(root, &rel, &mut libs);
        }
    }

    for lib in detect_self_contained(sources, headers, target_dirs) {
        if !libs.iter().any(|l: &VendoredLibrary| l.path == lib.path) {
            libs.push(lib);
        }
    }

    libs.retain(|lib| !target_dirs.contains(&lib.path));
    libs
}

/// Direct children of `rel`, split into subdirectories and C-family files.
fn list_dir(root: &Path, rel: &Path) -> (Vec<PathBuf>, Vec<PathBuf>, Vec<PathBuf>) {
    let mut dirs = Vec::new();
    let mut sources = Vec::new();
    let mut headers = Vec::new();

    let entries = match fs::read_dir(root.join(rel)) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("cannot read {}: {}", rel.display(), e);
            return (dirs, sources, headers);
        }
    };

    let mut entries: Vec<_> = entries.filter_map(Result::ok).collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name();
        let child = rel.join(&name);
        match entry.file_type() {
            Ok(ft) if ft.is_dir() => {
                if !is_ignored_dir(&name.to_string_lossy()) {
                    dirs.push(child);
                }
            }
            Ok(_) if is_source_file(&child) => sources.push(child),
            Ok(_) if is_header_file(&child) => headers.push(child),
            _ => {}
        }
    }

    (dirs, sources, headers)
}

fn scan_vendor_dir(root: &Path, rel: &Path, libs: &mut Vec<VendoredLibrary>) {
    let (children, _, _) = list_dir(root, rel);

    for child in children {
        let (_, sources, headers) = list_dir(root, &child);
        if !sources.is_empty() && !headers.is_empty() {
            tracing::debug!("vendored library at {}", child.display());
            libs.push(VendoredLibrary {
                name: dir_name(&child),
                path: child,
                source_files: sources,
                header_files: headers,
            });
        } else {
            scan_vendor_dir(root, &child, libs);
        }
    }
}

fn detect_self_contained(
    sources: &[PathBuf],
    headers: &[PathBuf],
    target_dirs: &BTreeSet<PathBuf>,
) -> Vec<VendoredLibrary> {
    let source_dirs: BTreeSet<PathBuf> = sources.iter().map(|s| parent_dir(s)).collect();

    source_dirs
        .into_iter()
        .filter(|dir| !dir.as_os_str().is_empty() && !dir.starts_with("src"))
        .filter(|dir| !target_dirs.contains(dir))
        .filter(|dir| looks_like_library(&dir_name(dir)))
        .filter_map(|dir| {
            let subtree: Vec<&PathBuf> = sources.iter().filter(|s| s.starts_with(&dir)).collect();
            if subtree.iter().any(|s| parent_dir(s) != dir) {
                return None;
            }

            let header_files: Vec<PathBuf> = headers
                .iter()
                .filter(|h| parent_dir(h) == dir)
                .cloned()
                .collect();
            if header_files.is_empty() {
                return None;
            }

            Some(VendoredLibrary {
                name: dir_name(&dir),
                source_files: subtree.into_iter().cloned().collect(),
                header_files,
                path: dir,
            })
        })
        .collect()
}

/// Whether a directory name suggests a bundled copy of a known library.
pub fn looks_like_library(dir_name: &str) -> bool {
    let lower = dir_name.to_lowercase();
    LIBRARY_DIR_PATTERNS.iter().any(|p| lower.contains(p))
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
