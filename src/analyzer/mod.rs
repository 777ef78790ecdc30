//! Build-target and vendored-library analysis of a C/C++ source tree.
//!
//! [`scan`] collects source and header files, parses every `#include`,
//! finds entry points and groups sources into [`BuildTarget`]s, then splits
//! the non-standard includes into libraries vendored in the tree and
//! libraries a package manager has to provide.

pub mod catalog;
pub mod targets;
pub mod vendored;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use miette::Diagnostic as MietteDiagnostic;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::core::{BuildTarget, ExternalLibrary, VendoredLibrary};
use crate::util::diagnostic::Diagnostic;
use crate::util::fs::{
    is_header_file, is_source_file, read_to_string_lossy, relative_path, walk_source_tree,
};

static INCLUDE_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*#include\s*["<]([^">]+)[">]"#).unwrap());

/// Error that prevents analysis.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum AnalyzeError {
    #[error("project root not found: {}", path.display())]
    #[diagnostic(
        code(catalyst::analyze::root_not_found),
        help("Pass an existing directory to analyze")
    )]
    RootNotFound { path: PathBuf },

    #[error("failed to walk {}", path.display())]
    #[diagnostic(code(catalyst::analyze::walk))]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl AnalyzeError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            AnalyzeError::RootNotFound { path } => {
                Diagnostic::error(format!("cannot analyze `{}`", path.display()))
                    .with_context("the directory does not exist or is not a directory")
            }
            AnalyzeError::Walk { path, source } => {
                Diagnostic::error(format!("cannot read `{}`", path.display()))
                    .with_context(source.to_string())
                    .with_suggestion("Check the directory permissions")
            }
        }
    }
}

/// How an include directive is satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "library", rename_all = "lowercase")]
pub enum IncludeKind {
    /// Shipped with the toolchain.
    Standard,
    /// Provided by a library bundled in the tree.
    Vendored(String),
    /// One of the project's own headers.
    Project,
    /// A catalog library installed through a package manager.
    External(String),
    /// Nothing recognizes it.
    Unknown,
}

/// Everything the analyzer learned about a project.
///
/// Paths are relative to `root`.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectScanResult {
    pub root: PathBuf,
    pub source_files: Vec<PathBuf>,
    pub header_files: Vec<PathBuf>,
    pub build_targets: Vec<BuildTarget>,
    pub external_libs: Vec<ExternalLibrary>,
    pub vendored_libs: Vec<VendoredLibrary>,
    /// Includes per file, as written between the brackets or quotes.
    pub includes: BTreeMap<PathBuf, Vec<String>>,
}

/// Analyze the project at `root`.
pub fn scan(root: &Path) -> Result<ProjectScanResult, AnalyzeError> {
    if !root.is_dir() {
        return Err(AnalyzeError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut source_files = Vec::new();
    let mut header_files = Vec::new();

    for entry in walk_source_tree(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(AnalyzeError::Walk {
                    path: root.to_path_buf(),
                    source: e,
                })
            }
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = relative_path(root, entry.path());
        if is_source_file(&rel) {
            source_files.push(rel);
        } else if is_header_file(&rel) {
            header_files.push(rel);
        }
    }

    tracing::debug!(
        "found {} sources and {} headers under {}",
        source_files.len(),
        header_files.len(),
        root.display()
    );

    let includes = parse_includes(root, source_files.iter().chain(&header_files));
    let build_targets = targets::detect_targets(root, &source_files);
    let target_dirs: BTreeSet<PathBuf> = build_targets
        .iter()
        .filter(|t| !t.is_rooted_at_project())
        .map(|t| t.directory.clone())
        .collect();
    let vendored_libs =
        vendored::detect_vendored(root, &source_files, &header_files, &target_dirs);

    let mut result = ProjectScanResult {
        root: root.to_path_buf(),
        source_files,
        header_files,
        build_targets,
        external_libs: Vec::new(),
        vendored_libs,
        includes,
    };
    result.external_libs = result.external_libraries_for(result.includes.keys());

    Ok(result)
}

fn parse_includes<'a>(
    root: &Path,
    files: impl Iterator<Item = &'a PathBuf>,
) -> BTreeMap<PathBuf, Vec<String>> {
    let mut map = BTreeMap::new();

    for file in files {
        let content = match read_to_string_lossy(&root.join(file)) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("{:#}", e);
                continue;
            }
        };

        let includes: Vec<String> = content
            .lines()
            .filter_map(|line| INCLUDE_DIRECTIVE.captures(line))
            .map(|caps| caps[1].to_string())
            .collect();
        if !includes.is_empty() {
            map.insert(file.clone(), includes);
        }
    }

    map
}

impl ProjectScanResult {
    /// Whether `include` names one of the project's own headers.
    pub fn is_project_header(&self, include: &str) -> bool {
        self.header_files.iter().any(|h| {
            h == Path::new(include)
                || h.file_name().is_some_and(|n| n.to_string_lossy() == include)
                || h.to_string_lossy().ends_with(&format!("/{}", include))
        })
    }

    /// Classify an include directive. The outcomes are mutually exclusive and
    /// checked in order: standard, vendored, project, external.
    pub fn classify_include(&self, include: &str) -> IncludeKind {
        if catalog::is_standard_header(include) {
            return IncludeKind::Standard;
        }
        if let Some(lib) = self.vendored_libs.iter().find(|l| l.provides(include)) {
            return IncludeKind::Vendored(lib.name.clone());
        }
        if self.is_project_header(include) {
            return IncludeKind::Project;
        }
        match catalog::find_library(include) {
            Some(lib) => IncludeKind::External(lib.name.to_string()),
            None => IncludeKind::Unknown,
        }
    }

    /// Every distinct include written in `files`, sorted.
    pub fn includes_of<'a>(&self, files: impl IntoIterator<Item = &'a PathBuf>) -> BTreeSet<&str> {
        files
            .into_iter()
            .filter_map(|f| self.includes.get(f))
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Catalog libraries included by `files`, in catalog order.
    pub fn external_libraries_for<'a>(
        &self,
        files: impl IntoIterator<Item = &'a PathBuf>,
    ) -> Vec<ExternalLibrary> {
        let externals: Vec<String> = self
            .includes_of(files)
            .into_iter()
            .filter_map(|inc| match self.classify_include(inc) {
                IncludeKind::External(name) => Some(name),
                _ => None,
            })
            .collect();

        catalog::KNOWN_LIBRARIES
            .iter()
            .filter(|lib| externals.iter().any(|n| n == lib.name))
            .copied()
            .collect()
    }

    /// Vendored libraries whose headers `files` include.
    pub fn vendored_libraries_for<'a>(
        &self,
        files: impl IntoIterator<Item = &'a PathBuf>,
    ) -> Vec<&VendoredLibrary> {
        let includes = self.includes_of(files);
        self.vendored_libs
            .iter()
            .filter(|lib| includes.iter().any(|inc| lib.provides(inc)))
            .collect()
    }

    /// Human-readable report.
    pub fn summary(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Project analysis: {}", self.root.display());
        let _ = writeln!(out, "  Source files:  {}", self.source_files.len());
        let _ = writeln!(out, "  Header files:  {}", self.header_files.len());
        let _ = writeln!(out, "  Build targets: {}", self.build_targets.len());

        if !self.build_targets.is_empty() {
            let _ = writeln!(out, "\nBuild targets:");
            for (i, target) in self.build_targets.iter().enumerate() {
                let _ = writeln!(out, "  {}. {} ({})", i + 1, target.name, target.kind);
                let _ = writeln!(out, "     entry:   {}", target.entry_point.display());
                let _ = writeln!(out, "     sources: {} files", target.source_files.len());
                if !target.is_rooted_at_project() {
                    let _ = writeln!(out, "     dir:     {}/", target.directory.display());
                }
            }
        }

        if !self.vendored_libs.is_empty() {
            let _ = writeln!(out, "\nVendored libraries: {}", self.vendored_libs.len());
            for lib in &self.vendored_libs {
                let _ = writeln!(out, "  - {} ({}/)", lib.name, lib.path.display());
            }
        }

        if !self.external_libs.is_empty() {
            let _ = writeln!(out, "\nExternal dependencies: {}", self.external_libs.len());
            for lib in &self.external_libs {
                let _ = writeln!(out, "  - {} ({})", lib.name, lib.linker_flag);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures::{header, lib_c, main_c, ProjectFixture};

    fn sample() -> ProjectFixture {
        ProjectFixture::new()
            .file(
                "main.c",
                &main_c(&[
                    "<stdio.h>",
                    "<curl/curl.h>",
                    "\"myutils.h\"",
                    "\"cJSON.h\"",
                    "<jansson.h>",
                ]),
            )
            .file("myutils.c", &lib_c("myutils", &["\"myutils.h\""]))
            .file("myutils.h", &header("myutils"))
            .file("vendor/cjson/cJSON.c", &lib_c("cjson", &["\"cJSON.h\""]))
            .file("vendor/cjson/cJSON.h", &header("cjson"))
            .file("tools/dump/main.c", &main_c(&["<sqlite3.h>"]))
            .file("build/generated.c", &main_c(&[]))
    }

    #[test]
    fn test_scan_collects_files() {
        let project = sample();
        let result = scan(project.root()).unwrap();

        assert_eq!(result.source_files.len(), 4);
        assert_eq!(result.header_files.len(), 2);
        assert!(!result
            .source_files
            .iter()
            .any(|f| f.starts_with("build")));

        let names: Vec<&str> = result.build_targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["main", "dump"]);
    }

    #[test]
    fn test_classify_include() {
        let project = sample();
        let result = scan(project.root()).unwrap();

        assert_eq!(result.classify_include("stdio.h"), IncludeKind::Standard);
        assert_eq!(result.classify_include("myutils.h"), IncludeKind::Project);
        assert_eq!(
            result.classify_include("cJSON.h"),
            IncludeKind::Vendored("cjson".to_string())
        );
        assert_eq!(
            result.classify_include("curl/curl.h"),
            IncludeKind::External("libcurl".to_string())
        );
        assert_eq!(result.classify_include("jansson.h"), IncludeKind::Unknown);
    }

    #[test]
    fn test_external_libraries_in_catalog_order() {
        let project = sample();
        let result = scan(project.root()).unwrap();

        let names: Vec<&str> = result.external_libs.iter().map(|l| l.name).collect();
        assert_eq!(names, ["libcurl", "sqlite3"]);
    }

    #[test]
    fn test_per_target_libraries() {
        let project = sample();
        let result = scan(project.root()).unwrap();
        let main = &result.build_targets[0];

        let external: Vec<&str> = result
            .external_libraries_for(&main.source_files)
            .iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(external, ["libcurl"]);

        let vendored: Vec<&str> = result
            .vendored_libraries_for(&main.source_files)
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(vendored, ["cjson"]);
    }

    #[test]
    fn test_project_header_from_quoted_include() {
        let project = ProjectFixture::new()
            .file("main.c", &main_c(&["\"myutils.h\""]))
            .file("include/app/myutils.h", &header("myutils"));
        let result = scan(project.root()).unwrap();

        assert!(result.is_project_header("myutils.h"));
        assert!(result.is_project_header("app/myutils.h"));
        assert!(!result.is_project_header("other.h"));
        assert!(result.external_libs.is_empty());
    }

    #[test]
    fn test_summary() {
        let project = sample();
        let summary = scan(project.root()).unwrap().summary();

        assert!(summary.contains("Source files:  4"));
        assert!(summary.contains("1. main (executable)"));
        assert!(summary.contains("dir:     tools/dump/"));
        assert!(summary.contains("- cjson (vendor/cjson/)"));
        assert!(summary.contains("- libcurl (-lcurl)"));
    }

    #[test]
    fn test_missing_root() {
        let err = scan(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, AnalyzeError::RootNotFound { .. }));
        assert!(err.to_diagnostic().format(false).contains("cannot analyze"));
    }
}
