//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Catalyst - find, resolve and install the system packages a C/C++ project needs
#[derive(Parser)]
#[command(name = "catalyst")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the dependencies a source tree includes
    Scan(ScanArgs),

    /// Trial-link the sources and group undefined symbols
    Symbols(SymbolsArgs),

    /// Translate one dependency into a package name
    Translate(TranslateArgs),

    /// Resolve the project's dependencies for this machine
    Resolve(ResolveArgs),

    /// Install the packages catalyst.yml lists for this OS
    Install(InstallArgs),

    /// Find build targets and vendored libraries
    Analyze(AnalyzeArgs),

    /// Check package manager and compiler setup
    Doctor,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ScanArgs {
    /// Directory to scan (defaults to current directory)
    pub path: Option<PathBuf>,

    /// Also trial-link the sources to find undefined symbols
    #[arg(long)]
    pub symbols: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct SymbolsArgs {
    /// Directory to link (defaults to current directory)
    pub path: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct TranslateArgs {
    /// Abstract dependency name (e.g. curl, sqlite3)
    pub dependency: String,

    /// Package manager to translate for
    #[arg(long)]
    pub pm: String,

    /// Fall back to the package manager's live search
    #[arg(long)]
    pub search: bool,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Project document
    #[arg(long, default_value = "catalyst.yml")]
    pub config: PathBuf,

    /// Package manager (defaults to configuration, then detection)
    #[arg(long)]
    pub pm: Option<String>,

    /// Choose among search candidates interactively
    #[arg(short, long)]
    pub interactive: bool,

    /// Include libraries suggested by the missing-symbol scan
    #[arg(long)]
    pub symbols: bool,

    /// Print the result without updating the project document
    #[arg(long)]
    pub no_write: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct InstallArgs {
    /// Project document
    #[arg(long, default_value = "catalyst.yml")]
    pub config: PathBuf,

    /// Package manager (defaults to configuration, then detection)
    #[arg(long)]
    pub pm: Option<String>,

    /// Packages per install command
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Show what would be installed without installing
    #[arg(long)]
    pub dry_run: bool,

    /// Install one package at a time and stop at the first failure
    #[arg(long)]
    pub fail_fast: bool,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Project directory (defaults to current directory)
    pub path: Option<PathBuf>,

    /// Write sources and dependencies into catalyst.yml
    #[arg(long)]
    pub write: bool,

    /// Write only this build target
    #[arg(long, requires = "write")]
    pub target: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
