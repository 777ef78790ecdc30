//! `catalyst resolve` command

use anyhow::Result;

use catalyst::core::PackageManagerId;
use catalyst::ops::{resolve_project, ResolveOptions};
use catalyst::resolver::{CandidatePicker, ResolveError};
use catalyst::util::config::load_project_config;
use catalyst::util::diagnostic::suggestions;
use catalyst::util::SystemRunner;

use super::{document_root, print_json};
use crate::cli::ResolveArgs;
use crate::commands::picker::PromptPicker;
use crate::progress::Spinner;

pub fn execute(args: ResolveArgs, verbose: bool) -> Result<()> {
    let config = load_project_config(&document_root(&args.config));

    let mut options = ResolveOptions::from_config(&config);
    options.package_manager = args
        .pm
        .as_deref()
        .map(|pm| pm.parse::<PackageManagerId>().map_err(ResolveError::from))
        .transpose()?;
    options.interactive |= args.interactive;
    options.include_symbol_suggestions |= args.symbols;
    options.write = !args.no_write;

    let picker = PromptPicker;
    let picker = options
        .interactive
        .then_some(&picker as &dyn CandidatePicker);

    // The prompt needs the terminal to itself
    let spinner = Spinner::start(
        "Resolving dependencies",
        verbose || args.json || options.interactive,
    );
    let report = resolve_project(&args.config, &SystemRunner, &config, &options, picker);
    spinner.finish();
    let report = report?;

    if args.json {
        return print_json(&report);
    }

    print!("{}", report.format());

    let unresolved = report.unresolved();
    if !unresolved.is_empty() {
        let names: Vec<&str> = unresolved.iter().map(|d| d.as_str()).collect();
        tracing::warn!("no package found for: {}", names.join(", "));
        eprintln!("{}", suggestions::UNRESOLVED);
    }

    Ok(())
}
