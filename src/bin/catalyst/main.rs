//! Catalyst CLI - dependency discovery and installation for C/C++ projects

use std::io::IsTerminal;

use anyhow::Result;
use catalyst::ops::diagnose;
use catalyst::util::diagnostic::emit;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod progress;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        emit(&diagnose(&e), std::io::stderr().is_terminal());
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("catalyst=debug")
    } else {
        EnvFilter::new("catalyst=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Scan(args) => commands::scan::execute(args),
        Commands::Symbols(args) => commands::symbols::execute(args),
        Commands::Translate(args) => commands::translate::execute(args),
        Commands::Resolve(args) => commands::resolve::execute(args, cli.verbose),
        Commands::Install(args) => commands::install::execute(args, cli.verbose),
        Commands::Analyze(args) => commands::analyze::execute(args),
        Commands::Doctor => commands::doctor::execute(cli.verbose),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
