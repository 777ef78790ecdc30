//! `catalyst symbols` command

use anyhow::Result;

use catalyst::scan::scan_missing_symbols;
use catalyst::util::SystemRunner;

use super::{print_json, project_dir};
use crate::cli::SymbolsArgs;

pub fn execute(args: SymbolsArgs) -> Result<()> {
    let root = project_dir(args.path)?;
    let groups = scan_missing_symbols(&root, &SystemRunner)?;

    if args.json {
        return print_json(&groups);
    }

    if groups.is_empty() {
        println!("No undefined symbols found");
        return Ok(());
    }

    for group in &groups {
        println!("[{}]", group.category);
        for symbol in &group.symbols {
            println!("  {}", symbol.symbol);
        }
        if !group.suggested_libs.is_empty() {
            println!("  try linking: {}", group.suggested_libs.join(", "));
        }
        if !group.suggested_files.is_empty() {
            println!("  headers:     {}", group.suggested_files.join(", "));
        }
        for cause in &group.possible_causes {
            println!("  - {}", cause);
        }
    }

    Ok(())
}
