//! Installation orchestration.
//!
//! Every package goes through the same small state machine:
//!
//! ```text
//! Pending ──┬── empty name ────────────── Skipped("standard library")
//!           ├── installed query says yes ─ Skipped("already installed")
//!           └── install attempted ──────── Success | Skipped(code) | Failed
//! ```
//!
//! Installed state is re-queried after every install, so a batch command's
//! outcome is attributed to each of its members individually.

pub mod backend;
pub mod compat;
pub mod exit_code;
pub mod msys2;

pub use compat::compatibility_warning;
pub use exit_code::{classifier_for, ExitCodeClassifier, ExitDisposition};
pub use msys2::{partition_windows_packages, Msys2};

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt::Write as _;

use miette::Diagnostic as MietteDiagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::core::{detect_package_manager, Os, PackageManagerId};
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::process::{CommandRunner, ProcessBuilder};

/// Default number of packages per batch install command.
pub const DEFAULT_BATCH_SIZE: usize = 5;

const REASON_STANDARD: &str = "standard library";
const REASON_INSTALLED: &str = "already installed";
const REASON_DRY_RUN: &str = "dry run - would install";

/// Installation error.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum InstallError {
    #[error("no supported package manager found on {os}")]
    #[diagnostic(
        code(catalyst::install::no_package_manager),
        help("Set install.package_manager in .catalyst/config.toml")
    )]
    NoPackageManager { os: String },

    #[error("failed to install `{package}`: {message}")]
    #[diagnostic(code(catalyst::install::package_failed))]
    PackageFailed { package: String, message: String },
}

impl InstallError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            InstallError::NoPackageManager { os } => {
                Diagnostic::error(format!("no supported package manager found on {}", os))
                    .with_context("looked for: apt, dnf, yum, pacman, zypper, brew, winget, choco, scoop, vcpkg")
                    .with_suggestion(suggestions::NO_PACKAGE_MANAGER)
            }
            InstallError::PackageFailed { package, message } => {
                Diagnostic::error(format!("failed to install `{}`", package))
                    .with_context(message.clone())
                    .with_suggestion(suggestions::INSTALL_FAILED)
            }
        }
    }
}

/// Outcome for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallationResult {
    pub package: String,
    pub success: bool,
    pub skipped: bool,
    pub reason: String,
    pub error: Option<String>,
    /// Command lines run (or, in a dry run, that would run).
    pub commands: Vec<String>,
}

impl InstallationResult {
    fn skipped(package: &str, reason: impl Into<String>) -> Self {
        InstallationResult {
            package: package.to_string(),
            success: false,
            skipped: true,
            reason: reason.into(),
            error: None,
            commands: Vec::new(),
        }
    }

    fn succeeded(package: &str, reason: impl Into<String>, commands: Vec<String>) -> Self {
        InstallationResult {
            package: package.to_string(),
            success: true,
            skipped: false,
            reason: reason.into(),
            error: None,
            commands,
        }
    }

    fn failed(package: &str, error: impl Into<String>, commands: Vec<String>) -> Self {
        InstallationResult {
            package: package.to_string(),
            success: false,
            skipped: false,
            reason: String::new(),
            error: Some(error.into()),
            commands,
        }
    }

    pub fn is_failure(&self) -> bool {
        !self.success && !self.skipped
    }
}

/// Results for a whole run, in input order, plus advisory warnings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstallReport {
    pub results: Vec<InstallationResult>,
    pub warnings: Vec<String>,
}

impl InstallReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn skipped(&self) -> usize {
        self.results.iter().filter(|r| r.skipped).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_failure()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Per-package lines and a one-line summary. Skips are listed only when
    /// `verbose`.
    pub fn format_summary(&self, verbose: bool) -> String {
        let mut out = String::new();

        if self.results.is_empty() {
            out.push_str("No packages to install.\n");
        }

        for warning in &self.warnings {
            let _ = writeln!(out, "warning: {}", warning);
        }

        for r in &self.results {
            let name = if r.package.is_empty() { "(none)" } else { &r.package };
            if r.success {
                let _ = writeln!(out, "SUCCESS: {} - {}", name, r.reason);
            } else if r.skipped {
                if verbose {
                    let _ = writeln!(out, "SKIPPED: {} - {}", name, r.reason);
                }
            } else {
                let _ = writeln!(
                    out,
                    "FAILED:  {} - {}",
                    name,
                    r.error.as_deref().unwrap_or("unknown error")
                );
                if verbose && !r.commands.is_empty() {
                    let _ = writeln!(out, "         command: {}", r.commands.join(" "));
                }
            }
        }

        let _ = writeln!(
            out,
            "\nSummary: {} succeeded, {} skipped, {} failed",
            self.succeeded(),
            self.skipped(),
            self.failed()
        );
        out
    }
}

/// Installer behavior switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    /// Prefix root-only backends with `sudo`.
    pub use_sudo: bool,
    /// Refresh the package index before the first install.
    pub update_index: bool,
    /// Record commands without running them.
    pub dry_run: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        InstallOptions {
            use_sudo: cfg!(unix),
            update_index: true,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Direct,
    Msys2,
}

/// Installs packages with one backend.
pub struct Installer<'a> {
    runner: &'a dyn CommandRunner,
    pm: PackageManagerId,
    options: InstallOptions,
    msys2: Option<Msys2>,
    index_refreshed: Cell<bool>,
}

impl<'a> Installer<'a> {
    /// Installer for `pm`. winget gets MSYS2 routing at the default root.
    pub fn new(runner: &'a dyn CommandRunner, pm: PackageManagerId, options: InstallOptions) -> Self {
        Installer {
            runner,
            pm,
            options,
            msys2: (pm == PackageManagerId::Winget).then(Msys2::default),
            index_refreshed: Cell::new(false),
        }
    }

    /// Installer for the first package manager available on `os`.
    pub fn detect(
        runner: &'a dyn CommandRunner,
        os: &Os,
        options: InstallOptions,
    ) -> Result<Self, InstallError> {
        let pm = detect_package_manager(os, runner).ok_or_else(|| InstallError::NoPackageManager {
            os: os.to_string(),
        })?;
        Ok(Installer::new(runner, pm, options))
    }

    /// Route MSYS2 libraries through an installation at `msys2`.
    pub fn with_msys2(mut self, msys2: Msys2) -> Self {
        if self.pm == PackageManagerId::Winget {
            self.msys2 = Some(msys2);
        }
        self
    }

    pub fn package_manager(&self) -> PackageManagerId {
        self.pm
    }

    /// Install packages one at a time, stopping at the first failure.
    pub fn install(&self, packages: &[String]) -> Result<InstallReport, InstallError> {
        let mut report = InstallReport {
            results: Vec::with_capacity(packages.len()),
            warnings: self.warnings(packages),
        };

        for pkg in packages {
            let result = self
                .install_set(std::slice::from_ref(pkg), 1)
                .pop()
                .unwrap_or_else(|| InstallationResult::failed(pkg, "no result", Vec::new()));

            if result.is_failure() {
                return Err(InstallError::PackageFailed {
                    package: pkg.clone(),
                    message: result.error.unwrap_or_default(),
                });
            }
            report.results.push(result);
        }

        Ok(report)
    }

    /// Install packages in batches of `batch_size` where the backend
    /// allows it. Failures are recorded per package and never stop the run.
    ///
    /// Results come back in input order, one per package.
    pub fn install_batch(&self, packages: &[String], batch_size: usize) -> InstallReport {
        let batch_size = if batch_size == 0 {
            DEFAULT_BATCH_SIZE
        } else {
            batch_size
        };

        InstallReport {
            results: self.install_set(packages, batch_size),
            warnings: self.warnings(packages),
        }
    }

    /// Precheck, route and install `packages`, one result per input entry.
    ///
    /// MSYS2 libraries go first so the base system is in place before
    /// anything else runs.
    fn install_set(&self, packages: &[String], batch_size: usize) -> Vec<InstallationResult> {
        let (direct, via_msys2) = match self.msys2 {
            Some(_) => partition_windows_packages(packages),
            None => (packages.to_vec(), Vec::new()),
        };

        let mut outcomes: HashMap<String, InstallationResult> = HashMap::new();
        let via_msys2 = self.pending(Route::Msys2, via_msys2, &mut outcomes);
        let direct = self.pending(Route::Direct, direct, &mut outcomes);

        if !via_msys2.is_empty() {
            self.record(Route::Msys2, &via_msys2, &mut outcomes);
        }

        let chunk = if self.pm.supports_batch_install() {
            batch_size
        } else {
            1
        };
        for group in direct.chunks(chunk) {
            self.record(Route::Direct, group, &mut outcomes);
        }

        packages
            .iter()
            .map(|pkg| {
                outcomes
                    .get(pkg)
                    .cloned()
                    .unwrap_or_else(|| InstallationResult::failed(pkg, "no result", Vec::new()))
            })
            .collect()
    }

    /// Record skips for `packages` and return the ones left to install,
    /// without duplicates.
    fn pending(
        &self,
        route: Route,
        packages: Vec<String>,
        outcomes: &mut HashMap<String, InstallationResult>,
    ) -> Vec<String> {
        let mut pending = Vec::new();
        for pkg in packages {
            if outcomes.contains_key(&pkg) || pending.contains(&pkg) {
                continue;
            }
            match self.precheck(route, &pkg) {
                Some(skipped) => {
                    outcomes.insert(pkg, skipped);
                }
                None => pending.push(pkg),
            }
        }
        pending
    }

    fn record(
        &self,
        route: Route,
        group: &[String],
        outcomes: &mut HashMap<String, InstallationResult>,
    ) {
        for (pkg, result) in group.iter().zip(self.install_group(route, group)) {
            outcomes.insert(pkg.clone(), result);
        }
    }

    fn warnings(&self, packages: &[String]) -> Vec<String> {
        if !self.pm.is_windows() {
            return Vec::new();
        }
        packages
            .iter()
            .filter(|p| !p.is_empty())
            .filter_map(|p| compatibility_warning(p))
            .collect()
    }

    /// Skip result for packages that need no tool invocation, or an
    /// installed query.
    fn precheck(&self, route: Route, pkg: &str) -> Option<InstallationResult> {
        if pkg.is_empty() {
            return Some(InstallationResult::skipped(pkg, REASON_STANDARD));
        }
        if self.is_installed(route, pkg) {
            tracing::debug!("{} is already installed", pkg);
            return Some(InstallationResult::skipped(pkg, REASON_INSTALLED));
        }
        None
    }

    fn is_installed(&self, route: Route, pkg: &str) -> bool {
        match (route, &self.msys2) {
            (Route::Msys2, Some(msys2)) => msys2.is_package_installed(self.runner, pkg),
            _ => backend::is_installed(self.runner, self.pm, pkg),
        }
    }

    fn refresh_index(&self) {
        if self.index_refreshed.replace(true) || !self.options.update_index || self.options.dry_run
        {
            return;
        }
        let Some(cmd) = backend::update_command(self.pm, self.options.use_sudo) else {
            return;
        };

        tracing::info!("refreshing package index: {}", cmd.display_command());
        match self.runner.run(&cmd) {
            Ok(out) if out.success() => {}
            Ok(out) => tracing::warn!(
                "package index refresh failed (exit code {:?}): {}",
                out.code,
                out.combined().trim()
            ),
            Err(e) => tracing::warn!("package index refresh failed: {:#}", e),
        }
    }

    fn install_group(&self, route: Route, group: &[String]) -> Vec<InstallationResult> {
        match (route, &self.msys2) {
            (Route::Msys2, Some(msys2)) => {
                let mut commands = Vec::new();
                if let Err(message) = self.ensure_msys2(msys2, &mut commands) {
                    return group
                        .iter()
                        .map(|pkg| InstallationResult::failed(pkg, message.clone(), commands.clone()))
                        .collect();
                }
                self.run_install(
                    msys2.install_command(group),
                    commands,
                    group,
                    &exit_code::DefaultClassifier,
                    route,
                )
            }
            _ => {
                self.refresh_index();
                self.run_install(
                    backend::install_command(self.pm, group, self.options.use_sudo),
                    Vec::new(),
                    group,
                    classifier_for(self.pm),
                    route,
                )
            }
        }
    }

    /// Install the MSYS2 base system when it is missing.
    fn ensure_msys2(&self, msys2: &Msys2, commands: &mut Vec<String>) -> Result<(), String> {
        if msys2.is_installed(self.runner) {
            return Ok(());
        }

        let cmd = msys2.base_install_command();
        commands.push(cmd.display_command());
        if self.options.dry_run {
            return Ok(());
        }

        tracing::info!("installing MSYS2 into {}", msys2.root().display());
        let output = self
            .runner
            .run(&cmd)
            .map_err(|e| format!("MSYS2 installation failed: {:#}", e))?;
        match exit_code::WingetClassifier.classify(output.code) {
            ExitDisposition::Fail => Err(format!(
                "MSYS2 installation failed (exit code {:?}): {}",
                output.code,
                output.combined().trim()
            )),
            _ => Ok(()),
        }
    }

    fn run_install(
        &self,
        cmd: ProcessBuilder,
        mut commands: Vec<String>,
        group: &[String],
        classifier: &dyn ExitCodeClassifier,
        route: Route,
    ) -> Vec<InstallationResult> {
        commands.push(cmd.display_command());

        if self.options.dry_run {
            tracing::info!("would run: {}", cmd.display_command());
            return group
                .iter()
                .map(|pkg| InstallationResult::succeeded(pkg, REASON_DRY_RUN, commands.clone()))
                .collect();
        }

        tracing::info!("installing: {}", cmd.display_command());
        let output = match self.runner.run(&cmd) {
            Ok(output) => output,
            Err(e) => {
                let message = format!("{:#}", e);
                return group
                    .iter()
                    .map(|pkg| InstallationResult::failed(pkg, message.clone(), commands.clone()))
                    .collect();
            }
        };

        match classifier.classify(output.code) {
            ExitDisposition::Success => group
                .iter()
                .map(|pkg| {
                    if self.is_installed(route, pkg) {
                        InstallationResult::succeeded(pkg, "installed", commands.clone())
                    } else {
                        InstallationResult::failed(
                            pkg,
                            "install reported success but the package is not installed",
                            commands.clone(),
                        )
                    }
                })
                .collect(),
            ExitDisposition::Skip(reason) => group
                .iter()
                .map(|pkg| {
                    let mut r = InstallationResult::skipped(pkg, reason);
                    r.commands = commands.clone();
                    r
                })
                .collect(),
            ExitDisposition::Fail => {
                let message = format!(
                    "install failed (exit code {}): {}",
                    output.code.map_or_else(|| "none".to_string(), |c| c.to_string()),
                    output.combined().trim()
                );
                // The backend may have installed some members before failing
                group
                    .iter()
                    .map(|pkg| {
                        if self.is_installed(route, pkg) {
                            InstallationResult::succeeded(pkg, "installed", commands.clone())
                        } else {
                            InstallationResult::failed(pkg, message.clone(), commands.clone())
                        }
                    })
                    .collect()
            }
        }
    }
}
