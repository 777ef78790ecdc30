//! `catalyst translate` command

use anyhow::{bail, Result};

use catalyst::core::{AbstractDependency, PackageManagerId, Resolution};
use catalyst::resolver::{ResolveError, Resolver};
use catalyst::util::config::load_project_config;
use catalyst::util::diagnostic::suggestions;
use catalyst::util::SystemRunner;

use super::project_dir;
use crate::cli::TranslateArgs;
use crate::progress::Spinner;

pub fn execute(args: TranslateArgs) -> Result<()> {
    let pm: PackageManagerId = args.pm.parse().map_err(ResolveError::from)?;
    let dep = AbstractDependency::new(args.dependency.trim());

    let config = load_project_config(&project_dir(None)?);
    let runner = SystemRunner;
    let resolver = Resolver::new(&runner).with_table(config.package_table()?);

    let resolution = if args.search {
        let spinner = Spinner::start(format!("Searching {} for {}", pm, dep), false);
        let resolution = resolver.translate_with_search(&dep, pm);
        spinner.finish();
        resolution
    } else {
        resolver.translate(&dep, pm)
    };

    match resolution {
        Resolution::Package(name) => println!("{}", name),
        Resolution::StandardLibrary => println!("{}: provided by the standard library", dep),
        Resolution::NotFound => bail!(
            "no {} package known for `{}`\n{}",
            pm,
            dep,
            suggestions::UNRESOLVED
        ),
    }

    Ok(())
}
