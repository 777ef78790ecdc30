//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::{DirEntry, WalkDir};

/// C and C++ translation-unit extensions.
pub const SOURCE_EXTENSIONS: &[&str] = &["c", "cpp", "cc", "cxx"];

/// C and C++ header extensions.
pub const HEADER_EXTENSIONS: &[&str] = &["h", "hpp", "hh", "hxx"];

/// Directories never worth descending into.
const IGNORED_DIRS: &[&str] = &["build", "dist", "node_modules", "__pycache__"];

fn has_extension(path: &Path, exts: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| exts.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Whether `path` is a C/C++ source file.
pub fn is_source_file(path: &Path) -> bool {
    has_extension(path, SOURCE_EXTENSIONS)
}

/// Whether `path` is a C/C++ header.
pub fn is_header_file(path: &Path) -> bool {
    has_extension(path, HEADER_EXTENSIONS)
}

/// Whether `path` is any C-family file the include scanner reads.
pub fn is_c_family_file(path: &Path) -> bool {
    is_source_file(path) || is_header_file(path)
}

/// Whether a directory name is hidden or a build output directory.
pub fn is_ignored_dir(name: &str) -> bool {
    (name.starts_with('.') && name != "." && name != "..") || IGNORED_DIRS.contains(&name)
}

/// Walk a source tree in a stable order, pruning ignored directories.
///
/// The root itself is never pruned, even when its name looks hidden.
pub fn walk_source_tree(root: &Path) -> impl Iterator<Item = walkdir::Result<DirEntry>> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !is_ignored_dir(&entry.file_name().to_string_lossy())
        })
}

/// Read a file to string, replacing invalid UTF-8.
pub fn read_to_string_lossy(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .ok()
        .or_else(|| pathdiff::diff_paths(path, base))
        .unwrap_or_else(|| path.to_path_buf())
}

/// Parent directory of a relative path, empty for files at the root.
pub fn parent_dir(rel: &Path) -> PathBuf {
    rel.parent().map(Path::to_path_buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extension_classification() {
        assert!(is_source_file(Path::new("src/main.c")));
        assert!(is_source_file(Path::new("engine.CPP")));
        assert!(is_header_file(Path::new("include/api.hpp")));
        assert!(!is_c_family_file(Path::new("README.md")));
        assert!(!is_c_family_file(Path::new("Makefile")));
    }

    #[test]
    fn test_ignored_dirs() {
        assert!(is_ignored_dir(".git"));
        assert!(is_ignored_dir("build"));
        assert!(!is_ignored_dir("src"));
        assert!(!is_ignored_dir("."));
    }

    #[test]
    fn test_walk_prunes_hidden_and_build() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        fs::create_dir_all(tmp.path().join(".git")).unwrap();
        fs::create_dir_all(tmp.path().join("build")).unwrap();
        fs::write(tmp.path().join("src/main.c"), "int main(){}").unwrap();
        fs::write(tmp.path().join(".git/x.c"), "").unwrap();
        fs::write(tmp.path().join("build/gen.c"), "").unwrap();

        let files: Vec<PathBuf> = walk_source_tree(tmp.path())
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| relative_path(tmp.path(), e.path()))
            .collect();

        assert_eq!(files, vec![PathBuf::from("src/main.c")]);
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("main.c")), PathBuf::new());
        assert_eq!(parent_dir(Path::new("tools/b/main.c")), PathBuf::from("tools/b"));
    }
}
