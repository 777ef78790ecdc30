//! `catalyst scan` command

use anyhow::Result;

use catalyst::ops::{scan_project, ScanOptions};
use catalyst::util::SystemRunner;

use super::{print_json, project_dir};
use crate::cli::ScanArgs;

pub fn execute(args: ScanArgs) -> Result<()> {
    let root = project_dir(args.path)?;
    let options = ScanOptions {
        missing_symbols: args.symbols,
    };

    let report = scan_project(&root, &SystemRunner, options)?;

    if args.json {
        return print_json(&report);
    }

    print!("{}", report.format());
    Ok(())
}
