//! `catalyst install` command

use anyhow::Result;

use catalyst::core::PackageManagerId;
use catalyst::ops::{install_project, InstallRequest};
use catalyst::resolver::ResolveError;
use catalyst::util::config::load_project_config;
use catalyst::util::diagnostic::suggestions;
use catalyst::util::SystemRunner;

use super::document_root;
use crate::cli::InstallArgs;

pub fn execute(args: InstallArgs, verbose: bool) -> Result<()> {
    let config = load_project_config(&document_root(&args.config));

    let request = InstallRequest {
        package_manager: args
            .pm
            .as_deref()
            .map(|pm| pm.parse::<PackageManagerId>().map_err(ResolveError::from))
            .transpose()?,
        batch_size: args.batch_size,
        dry_run: args.dry_run,
        fail_fast: args.fail_fast,
    };

    let report = install_project(&args.config, &SystemRunner, &config, &request)?;
    print!("{}", report.format_summary(verbose));

    if report.has_failures() {
        eprintln!("{}", suggestions::INSTALL_FAILED);
        std::process::exit(1);
    }

    Ok(())
}
