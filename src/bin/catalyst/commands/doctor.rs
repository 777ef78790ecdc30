//! `catalyst doctor` command

use anyhow::Result;

use catalyst::core::Os;
use catalyst::ops::{doctor, format_report};
use catalyst::util::config::load_project_config;
use catalyst::util::SystemRunner;

use super::project_dir;

pub fn execute(verbose: bool) -> Result<()> {
    let root = project_dir(None)?;
    let config = load_project_config(&root);

    let report = doctor(&SystemRunner, &Os::host(), &config);
    print!("{}", format_report(&report, verbose));

    // Exit with error code if required checks failed
    if !report.all_required_passed() {
        std::process::exit(1);
    }

    Ok(())
}
