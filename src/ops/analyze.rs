//! Per-target build and dependency planning.
//!
//! Turns a [`ProjectScanResult`] into one [`TargetPlan`] per build target:
//! which sources to compile (vendored library sources included), which
//! linker flags to pass, and which package each OS needs. The plan can be
//! written into `catalyst.yml` for `resolve` and `install` to pick up.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::Serialize;

use crate::analyzer::{self, ProjectScanResult};
use crate::core::{ExternalLibrary, Os, TargetKind};
use crate::ops::project_config::{default_project_name, ProjectConfig, PROJECT_FILE};

/// OS families a plan lists packages for.
pub const PLAN_OSES: [Os; 3] = [Os::Linux, Os::Darwin, Os::Windows];

/// Everything needed to build one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetPlan {
    pub name: String,
    pub kind: TargetKind,
    pub entry_point: PathBuf,
    /// Target sources followed by the sources of the vendored libraries it
    /// uses.
    pub sources: Vec<PathBuf>,
    /// Include directories of the vendored libraries.
    pub include_dirs: Vec<PathBuf>,
    pub external_libs: Vec<String>,
    pub vendored_libs: Vec<String>,
    pub linker_flags: Vec<String>,
    /// OS key to packages; OSes that ship every library get an empty list.
    pub dependencies: BTreeMap<String, Vec<String>>,
}

/// Packages per OS for `libs`. Libraries the OS already provides are left
/// out.
pub fn dependencies_by_os(libs: &[ExternalLibrary]) -> BTreeMap<String, Vec<String>> {
    PLAN_OSES
        .iter()
        .map(|os| {
            let mut seen = BTreeSet::new();
            let packages = libs
                .iter()
                .filter_map(|lib| lib.package_for(os))
                .filter(|pkg| !pkg.is_empty() && seen.insert(*pkg))
                .map(String::from)
                .collect();
            (os.key().to_string(), packages)
        })
        .collect()
}

/// One plan per build target, in target order.
pub fn plan_targets(result: &ProjectScanResult) -> Vec<TargetPlan> {
    result
        .build_targets
        .iter()
        .map(|target| {
            let external = result.external_libraries_for(&target.source_files);
            let vendored = result.vendored_libraries_for(&target.source_files);

            let mut sources = target.source_files.clone();
            for lib in &vendored {
                for src in &lib.source_files {
                    if !sources.contains(src) {
                        sources.push(src.clone());
                    }
                }
            }

            let linker_flags = external
                .iter()
                .flat_map(ExternalLibrary::linker_args)
                .fold(Vec::new(), |mut flags, flag| {
                    if !flags.contains(&flag) {
                        flags.push(flag);
                    }
                    flags
                });

            TargetPlan {
                name: target.name.clone(),
                kind: target.kind,
                entry_point: target.entry_point.clone(),
                sources,
                include_dirs: vendored.iter().map(|lib| lib.path.clone()).collect(),
                external_libs: external.iter().map(|lib| lib.name.to_string()).collect(),
                vendored_libs: vendored.iter().map(|lib| lib.name.clone()).collect(),
                linker_flags,
                dependencies: dependencies_by_os(&external),
            }
        })
        .collect()
}

/// Options for [`analyze_project`].
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Write the plan into `catalyst.yml`.
    pub write: bool,
    /// Write only this target's sources and packages.
    pub target: Option<String>,
}

/// Analysis of a project plus its per-target plans.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeReport {
    pub project: ProjectScanResult,
    pub plans: Vec<TargetPlan>,
    pub written_to: Option<PathBuf>,
}

impl AnalyzeReport {
    /// Project summary followed by the plans.
    pub fn format(&self) -> String {
        let mut out = self.project.summary();

        for plan in &self.plans {
            let _ = writeln!(out, "\nTarget {}:", plan.name);
            let _ = writeln!(out, "  sources:  {}", plan.sources.len());
            if !plan.vendored_libs.is_empty() {
                let _ = writeln!(out, "  vendored: {}", plan.vendored_libs.join(", "));
            }
            if !plan.linker_flags.is_empty() {
                let _ = writeln!(out, "  link:     {}", plan.linker_flags.join(" "));
            }
            for (os, packages) in &plan.dependencies {
                if !packages.is_empty() {
                    let _ = writeln!(out, "  {:<8}  {}", format!("{}:", os), packages.join(" "));
                }
            }
        }

        if let Some(path) = &self.written_to {
            let _ = writeln!(out, "\nWrote {}", path.display());
        }
        out
    }
}

/// Analyze `root`, optionally writing `catalyst.yml` next to it.
///
/// An existing document keeps its name and resources; its sources and
/// dependency lists are replaced.
pub fn analyze_project(root: &Path, options: &AnalyzeOptions) -> Result<AnalyzeReport> {
    let project = analyzer::scan(root)?;
    let plans = plan_targets(&project);

    let mut report = AnalyzeReport {
        project,
        plans,
        written_to: None,
    };

    if options.write {
        let path = root.join(PROJECT_FILE);
        let mut document = if path.is_file() {
            ProjectConfig::load(&path)?
        } else {
            ProjectConfig::new(default_project_name(root))
        };

        update_document(&mut document, &report, options.target.as_deref())?;
        document.save(&path)?;
        tracing::info!("wrote {}", path.display());
        report.written_to = Some(path);
    }

    Ok(report)
}

/// Fill `document` from the analysis, for one target or for all of them.
pub fn update_document(
    document: &mut ProjectConfig,
    report: &AnalyzeReport,
    target: Option<&str>,
) -> Result<()> {
    let plans: Vec<&TargetPlan> = match target {
        Some(name) => match report.plans.iter().find(|p| p.name == name) {
            Some(plan) => vec![plan],
            None => {
                let known: Vec<&str> = report.plans.iter().map(|p| p.name.as_str()).collect();
                bail!("no build target named `{}` (found: {})", name, known.join(", "));
            }
        },
        None => report.plans.iter().collect(),
    };

    let mut sources: Vec<String> = Vec::new();
    for src in plans.iter().flat_map(|p| &p.sources) {
        let src = src.to_string_lossy().replace('\\', "/");
        if !sources.contains(&src) {
            sources.push(src);
        }
    }
    document.sources = sources;

    let libs: Vec<ExternalLibrary> = match target {
        Some(_) => plans
            .iter()
            .flat_map(|p| &p.external_libs)
            .filter_map(|name| report.project.external_libs.iter().find(|l| l.name == name))
            .copied()
            .collect(),
        None => report.project.external_libs.clone(),
    };
    document.dependencies = dependencies_by_os(&libs);

    Ok(())
}
