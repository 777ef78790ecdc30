//! Install, refresh and installed-query commands for each backend.

use crate::core::PackageManagerId as Pm;
use crate::util::process::{CommandRunner, ProcessBuilder, ProcessOutput};

fn base(pm: Pm, use_sudo: bool) -> ProcessBuilder {
    ProcessBuilder::elevated(pm.executable(), use_sudo && pm.needs_root())
}

/// Command installing `packages` in one invocation.
///
/// Callers pass a single package for backends without batch support.
pub fn install_command(pm: Pm, packages: &[String], use_sudo: bool) -> ProcessBuilder {
    let cmd = base(pm, use_sudo);
    match pm {
        Pm::Apt | Pm::Dnf | Pm::Yum => cmd.args(["install", "-y"]).args(packages),
        Pm::Pacman => cmd.args(["-S", "--needed", "--noconfirm"]).args(packages),
        Pm::Zypper => cmd.args(["--non-interactive", "install"]).args(packages),
        Pm::Brew | Pm::Vcpkg | Pm::Scoop => cmd.arg("install").args(packages),
        Pm::Choco => cmd.arg("install").args(packages).arg("-y"),
        Pm::Winget => cmd
            .args(["install", "--id"])
            .args(packages)
            .args(["-e", "--accept-package-agreements", "--accept-source-agreements"]),
    }
}

/// Command refreshing the package index, for backends that keep one.
pub fn update_command(pm: Pm, use_sudo: bool) -> Option<ProcessBuilder> {
    let cmd = base(pm, use_sudo);
    match pm {
        Pm::Apt => Some(cmd.arg("update")),
        Pm::Dnf | Pm::Yum => Some(cmd.arg("makecache")),
        Pm::Pacman => Some(cmd.arg("-Sy")),
        Pm::Zypper => Some(cmd.arg("refresh")),
        Pm::Brew => Some(cmd.arg("update")),
        Pm::Vcpkg | Pm::Choco | Pm::Winget | Pm::Scoop => None,
    }
}

/// Command asking whether `package` is installed.
pub fn query_command(pm: Pm, package: &str) -> ProcessBuilder {
    match pm {
        Pm::Apt => ProcessBuilder::new("dpkg").args(["-s", package]),
        Pm::Dnf | Pm::Yum => ProcessBuilder::new(pm.executable()).args(["list", "installed", package]),
        Pm::Pacman => ProcessBuilder::new("pacman").args(["-Q", package]),
        Pm::Zypper => ProcessBuilder::new("rpm").args(["-q", package]),
        Pm::Brew => ProcessBuilder::new("brew").args(["list", "--formula"]),
        Pm::Vcpkg => ProcessBuilder::new("vcpkg").args(["list", package]),
        Pm::Choco => ProcessBuilder::new("choco").args(["list", "--local-only", package]),
        Pm::Winget => ProcessBuilder::new("winget").args(["list", "--id", package]),
        Pm::Scoop => ProcessBuilder::new("scoop").args(["list", package]),
    }
}

/// Interpret the output of [`query_command`].
///
/// A failed query always means "not installed". Backends whose list commands
/// succeed regardless of the answer are checked against their output.
pub fn interpret_query(pm: Pm, package: &str, output: &ProcessOutput) -> bool {
    if !output.success() {
        return false;
    }

    match pm {
        Pm::Brew => output.stdout.lines().any(|line| line.trim() == package),
        Pm::Vcpkg | Pm::Winget => output.stdout.contains(package),
        Pm::Choco | Pm::Scoop => {
            let wanted = package.to_lowercase();
            output.stdout.lines().any(|line| {
                line.split_whitespace()
                    .next()
                    .is_some_and(|first| first.to_lowercase() == wanted)
            })
        }
        Pm::Apt | Pm::Dnf | Pm::Yum | Pm::Pacman | Pm::Zypper => true,
    }
}

/// Whether `package` is installed. Query failures count as "no".
pub fn is_installed(runner: &dyn CommandRunner, pm: Pm, package: &str) -> bool {
    let cmd = query_command(pm, package);
    match runner.run(&cmd) {
        Ok(output) => interpret_query(pm, package, &output),
        Err(e) => {
            tracing::debug!("installed query `{}` failed: {:#}", cmd.display_command(), e);
            false
        }
    }
}
