//! Install the packages a project document lists for the host OS.

use std::path::Path;

use anyhow::{bail, Result};

use crate::core::Os;
use crate::install::{InstallReport, Installer};
use crate::ops::project_config::ProjectConfig;
use crate::ops::resolve::select_package_manager;
use crate::util::config::Config;
use crate::util::diagnostic::suggestions;
use crate::util::process::CommandRunner;

/// Command-line overrides for an install run.
#[derive(Debug, Clone, Default)]
pub struct InstallRequest {
    pub package_manager: Option<crate::core::PackageManagerId>,
    pub batch_size: Option<usize>,
    pub dry_run: bool,
    /// Install one at a time and stop at the first failure.
    pub fail_fast: bool,
}

/// Install `packages` with the selected backend.
pub fn install_packages(
    packages: &[String],
    os: &Os,
    runner: &dyn CommandRunner,
    config: &Config,
    request: &InstallRequest,
) -> Result<InstallReport> {
    let pm = select_package_manager(runner, os, config, request.package_manager)?;

    let mut options = config.install_options();
    options.dry_run |= request.dry_run;

    let installer = Installer::new(runner, pm, options).with_msys2(config.msys2());
    tracing::info!("installing {} packages with {}", packages.len(), pm);

    if request.fail_fast {
        return Ok(installer.install(packages)?);
    }

    let batch_size = request
        .batch_size
        .filter(|n| *n > 0)
        .unwrap_or_else(|| config.batch_size());
    Ok(installer.install_batch(packages, batch_size))
}

/// Install what `document` lists for the host OS.
pub fn install_project(
    document: &Path,
    runner: &dyn CommandRunner,
    config: &Config,
    request: &InstallRequest,
) -> Result<InstallReport> {
    install_project_for(document, &Os::host(), runner, config, request)
}

/// [`install_project`] for an explicit OS.
pub fn install_project_for(
    document: &Path,
    os: &Os,
    runner: &dyn CommandRunner,
    config: &Config,
    request: &InstallRequest,
) -> Result<InstallReport> {
    if !document.is_file() {
        bail!("{} not found\n{}", document.display(), suggestions::NO_PROJECT);
    }

    let project = ProjectConfig::load(document)?;
    let packages = project.dependencies_for(os);
    if packages.is_empty() {
        tracing::info!("no dependencies listed for {}", os);
    }

    install_packages(packages, os, runner, config, request)
}
