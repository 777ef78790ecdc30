//! Resolve a project's dependencies into concrete packages.
//!
//! The flow is scan → translate/search → (optionally) write the package list
//! for the host OS back into `catalyst.yml`.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::{detect_package_manager, AbstractDependency, Os, PackageManagerId, Resolution};
use crate::install::InstallError;
use crate::ops::project_config::{default_project_name, project_root, ProjectConfig};
use crate::ops::scan::{scan_project, ScanOptions};
use crate::resolver::{CandidatePicker, ResolutionSource, ResolvedDependency, Resolver};
use crate::scan::scan_files;
use crate::util::config::Config;
use crate::util::process::CommandRunner;

/// Options for resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Package manager to resolve for; detected when unset.
    pub package_manager: Option<PackageManagerId>,
    /// Offer the picker a choice when no candidate is clear-cut.
    pub interactive: bool,
    /// Add libraries suggested by the missing-symbol scan.
    pub include_symbol_suggestions: bool,
    /// Write the resolved list back into the project document.
    pub write: bool,
}

impl ResolveOptions {
    /// Options with the configured defaults filled in.
    pub fn from_config(config: &Config) -> Self {
        ResolveOptions {
            interactive: config.resolve.interactive,
            include_symbol_suggestions: config.resolve.include_symbol_suggestions,
            ..Default::default()
        }
    }
}

/// Result of resolving a project.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveReport {
    pub os: Os,
    pub package_manager: PackageManagerId,
    pub resolved: Vec<ResolvedDependency>,
    /// Where the package list was written, if it was.
    pub written_to: Option<PathBuf>,
}

impl ResolveReport {
    /// Concrete packages in dependency order, without duplicates.
    pub fn packages(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.resolved
            .iter()
            .filter_map(ResolvedDependency::package)
            .filter(|pkg| seen.insert(*pkg))
            .map(String::from)
            .collect()
    }

    /// Dependencies that found no package.
    pub fn unresolved(&self) -> Vec<&AbstractDependency> {
        self.resolved
            .iter()
            .filter(|r| r.resolution == Resolution::NotFound)
            .map(|r| &r.dependency)
            .collect()
    }

    /// Human-readable report.
    pub fn format(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Resolved {} dependencies for {} ({})",
            self.resolved.len(),
            self.package_manager,
            self.os
        );

        for r in &self.resolved {
            let line = match (&r.resolution, r.source) {
                (Resolution::StandardLibrary, _) => "(standard library)".to_string(),
                (Resolution::Package(pkg), ResolutionSource::Table) => pkg.clone(),
                (Resolution::Package(pkg), ResolutionSource::Search) => format!("{} (search)", pkg),
                (Resolution::Package(pkg), _) => format!("{} (picked)", pkg),
                (Resolution::NotFound, _) => "not found".to_string(),
            };
            let _ = writeln!(out, "  {:<20} {}", r.dependency.as_str(), line);
        }

        if let Some(path) = &self.written_to {
            let _ = writeln!(out, "\nWrote {} packages to {}", self.packages().len(), path.display());
        }
        out
    }
}

/// Pick the package manager: explicit choice, then configuration, then
/// detection on `os`.
pub fn select_package_manager(
    runner: &dyn CommandRunner,
    os: &Os,
    config: &Config,
    explicit: Option<PackageManagerId>,
) -> Result<PackageManagerId> {
    if let Some(pm) = explicit {
        return Ok(pm);
    }
    if let Some(pm) = config.package_manager()? {
        return Ok(pm);
    }
    detect_package_manager(os, runner)
        .ok_or_else(|| InstallError::NoPackageManager { os: os.to_string() }.into())
}

/// Resolve the project described by `document` for the host OS.
///
/// A missing document is not an error: the whole tree next to it is
/// scanned, and `write` creates it.
pub fn resolve_project(
    document: &Path,
    runner: &dyn CommandRunner,
    config: &Config,
    options: &ResolveOptions,
    picker: Option<&dyn CandidatePicker>,
) -> Result<ResolveReport> {
    resolve_project_for(document, &Os::host(), runner, config, options, picker)
}

/// [`resolve_project`] for an explicit OS.
pub fn resolve_project_for(
    document: &Path,
    os: &Os,
    runner: &dyn CommandRunner,
    config: &Config,
    options: &ResolveOptions,
    picker: Option<&dyn CandidatePicker>,
) -> Result<ResolveReport> {
    let root = project_root(document);
    let mut project = if document.is_file() {
        ProjectConfig::load(document)?
    } else {
        tracing::debug!("{} not found, scanning the whole tree", document.display());
        ProjectConfig::new(default_project_name(&root))
    };

    let deps = collect_dependencies(&root, &project, runner, options)?;
    let pm = select_package_manager(runner, os, config, options.package_manager)?;

    let mut report = resolve_dependencies(&deps, pm, runner, config, options.interactive, picker)?;
    report.os = os.clone();

    if options.write {
        project.set_dependencies(os, report.packages());
        project
            .save(document)
            .with_context(|| format!("failed to update {}", document.display()))?;
        tracing::info!("updated {} for {}", document.display(), os);
        report.written_to = Some(document.to_path_buf());
    }

    Ok(report)
}

/// Resolve an explicit list of dependencies for `pm`.
pub fn resolve_dependencies(
    deps: &[AbstractDependency],
    pm: PackageManagerId,
    runner: &dyn CommandRunner,
    config: &Config,
    interactive: bool,
    picker: Option<&dyn CandidatePicker>,
) -> Result<ResolveReport> {
    let mut resolver = Resolver::new(runner).with_table(config.package_table()?);
    if let Some(picker) = picker {
        resolver = resolver.with_picker(picker);
    }

    let resolved = resolver.resolve_packages(deps, pm, interactive)?;

    Ok(ResolveReport {
        os: Os::host(),
        package_manager: pm,
        resolved,
        written_to: None,
    })
}

/// Dependencies of the listed sources, or of the whole tree when the
/// document lists none.
fn collect_dependencies(
    root: &Path,
    project: &ProjectConfig,
    runner: &dyn CommandRunner,
    options: &ResolveOptions,
) -> Result<Vec<AbstractDependency>> {
    let scan_options = ScanOptions {
        missing_symbols: options.include_symbol_suggestions,
    };
    let report = scan_project(root, runner, scan_options)?;

    if project.sources.is_empty() {
        return Ok(report.all_dependencies(options.include_symbol_suggestions));
    }

    let files: Vec<PathBuf> = project.sources.iter().map(PathBuf::from).collect();
    let mut deps = scan_files(root, &files);
    if options.include_symbol_suggestions {
        deps.extend(crate::scan::suggested_dependencies(&report.missing_symbols));
        deps.sort();
        deps.dedup();
    }
    Ok(deps)
}
