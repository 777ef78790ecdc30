//! `catalyst analyze` command

use anyhow::Result;

use catalyst::ops::{analyze_project, AnalyzeOptions};

use super::{print_json, project_dir};
use crate::cli::AnalyzeArgs;

pub fn execute(args: AnalyzeArgs) -> Result<()> {
    let root = project_dir(args.path)?;
    let options = AnalyzeOptions {
        write: args.write,
        target: args.target,
    };

    let report = analyze_project(&root, &options)?;

    if args.json {
        return print_json(&report);
    }

    print!("{}", report.format());
    Ok(())
}
