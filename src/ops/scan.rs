//! Dependency discovery for a project tree.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::core::AbstractDependency;
use crate::scan::{
    scan_dependencies, scan_missing_symbols, suggested_dependencies, MissingDependencyGroup,
};
use crate::util::process::CommandRunner;

/// Options for [`scan_project`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Also trial-link the sources and group undefined symbols.
    pub missing_symbols: bool,
}

/// What a scan found.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub root: PathBuf,
    /// Include-derived identifiers, sorted and unique.
    pub dependencies: Vec<AbstractDependency>,
    /// Undefined-symbol groups from the trial link (empty when not run).
    pub missing_symbols: Vec<MissingDependencyGroup>,
}

impl ScanReport {
    /// Include-derived identifiers, plus the symbol scan's suggestions when
    /// `with_suggestions` is set. Sorted and unique.
    pub fn all_dependencies(&self, with_suggestions: bool) -> Vec<AbstractDependency> {
        let mut deps: BTreeSet<AbstractDependency> = self.dependencies.iter().cloned().collect();
        if with_suggestions {
            deps.extend(suggested_dependencies(&self.missing_symbols));
        }
        deps.into_iter().collect()
    }

    /// Human-readable report.
    pub fn format(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "Found {} dependencies in {}",
            self.dependencies.len(),
            self.root.display()
        );
        for dep in &self.dependencies {
            let _ = writeln!(out, "  - {}", dep);
        }

        if !self.missing_symbols.is_empty() {
            let _ = writeln!(out, "\nUndefined symbols:");
            for group in &self.missing_symbols {
                let _ = writeln!(out, "  [{}] {}", group.category, group.symbol_names().join(", "));
                if !group.suggested_libs.is_empty() {
                    let _ = writeln!(out, "    libraries: {}", group.suggested_libs.join(", "));
                }
                if !group.suggested_files.is_empty() {
                    let _ = writeln!(out, "    headers:   {}", group.suggested_files.join(", "));
                }
                for cause in &group.possible_causes {
                    let _ = writeln!(out, "    - {}", cause);
                }
            }
        }

        out
    }
}

/// Scan `root` for dependencies.
pub fn scan_project(
    root: &Path,
    runner: &dyn CommandRunner,
    options: ScanOptions,
) -> Result<ScanReport> {
    let dependencies = scan_dependencies(root)?;

    let missing_symbols = if options.missing_symbols {
        scan_missing_symbols(root, runner)?
    } else {
        Vec::new()
    };

    Ok(ScanReport {
        root: root.to_path_buf(),
        dependencies,
        missing_symbols,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{main_c, MockExecutor, MockProcessOutput, ProjectFixture};

    #[test]
    fn test_scan_without_symbols_runs_nothing() {
        let project = ProjectFixture::new().file("main.c", &main_c(&["<curl/curl.h>", "<stdio.h>"]));
        let exec = MockExecutor::new();

        let report = scan_project(project.root(), &exec, ScanOptions::default()).unwrap();
        let expected: Vec<AbstractDependency> = vec!["curl".into(), "stdio".into()];
        assert_eq!(report.dependencies, expected);
        assert!(report.missing_symbols.is_empty());
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn test_scan_with_symbol_suggestions() {
        let project = ProjectFixture::new().file("main.c", &main_c(&["<stdio.h>"]));
        let exec = MockExecutor::new();
        exec.add_tool("cc").add_tool("gcc").add_tool("clang");
        exec.expect_contains(
            " -o ",
            MockProcessOutput::failure(
                1,
                "/usr/bin/ld: main.o: in function `main':\n\
                 main.c:(.text+0x1a): undefined reference to `pthread_create'\n\
                 collect2: error: ld returned 1 exit status",
            ),
        );

        let report = scan_project(project.root(), &exec, ScanOptions { missing_symbols: true })
            .unwrap();
        assert_eq!(report.missing_symbols.len(), 1);
        assert_eq!(report.missing_symbols[0].category, "threading");

        let has_pthread = |deps: Vec<AbstractDependency>| deps.iter().any(|d| d.as_str() == "pthread");
        assert!(!has_pthread(report.all_dependencies(false)));
        assert!(has_pthread(report.all_dependencies(true)));

        let text = report.format();
        assert!(text.contains("[threading] pthread_create"));
        assert!(text.contains("libraries: pthread"));
    }

    #[test]
    fn test_missing_root_is_error() {
        let exec = MockExecutor::new();
        let err = scan_project(Path::new("/no/such/dir"), &exec, ScanOptions::default())
            .unwrap_err();
        assert!(format!("{:#}", err).contains("project root not found"));
    }
}
