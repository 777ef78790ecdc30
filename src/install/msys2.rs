//! MSYS2 routing for development libraries on Windows.
//!
//! winget has no C development packages worth linking against. Libraries in
//! [`DEV_LIBRARIES`] are installed into the MSYS2 MinGW-w64 environment
//! instead, through MSYS2's own pacman.

use std::path::{Path, PathBuf};

use crate::util::process::{CommandRunner, ProcessBuilder};

/// Default MSYS2 installation directory.
pub const DEFAULT_ROOT: &str = r"C:\msys64";

/// winget id of the MSYS2 base system.
pub const MSYS2_WINGET_ID: &str = "MSYS2.MSYS2";

/// Libraries that go through MSYS2 rather than winget, by base name.
pub const DEV_LIBRARIES: &[&str] = &[
    "curl",
    "jansson",
    "sqlite3",
    "ncurses",
    "openssl",
    "zlib",
    "libpng",
    "libuv",
    "sdl2",
    "libxml2",
    "libmicrohttpd",
    "pcre",
];

/// Whether `package` is installed through MSYS2.
pub fn is_dev_library(package: &str) -> bool {
    let lower = package.to_lowercase();
    DEV_LIBRARIES.contains(&lower.as_str())
}

/// Split a Windows package list into `(direct, msys2)` subsets, preserving
/// order within each. Empty names stay direct; they never reach a tool.
pub fn partition_windows_packages(packages: &[String]) -> (Vec<String>, Vec<String>) {
    packages
        .iter()
        .cloned()
        .partition(|pkg| pkg.is_empty() || !is_dev_library(pkg))
}

/// An MSYS2 installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Msys2 {
    root: PathBuf,
    arch: &'static str,
}

impl Default for Msys2 {
    fn default() -> Self {
        Msys2::new(DEFAULT_ROOT)
    }
}

impl Msys2 {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Msys2 {
            root: root.as_ref().to_path_buf(),
            arch: "x86_64",
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// MinGW-w64 package name for a base library name.
    pub fn package_name(&self, base: &str) -> String {
        let base = if base.eq_ignore_ascii_case("sdl2") {
            "SDL2"
        } else {
            base
        };
        format!("mingw-w64-{}-{}", self.arch, base)
    }

    /// MSYS2's pacman.
    pub fn pacman(&self) -> PathBuf {
        self.root.join("usr").join("bin").join("pacman.exe")
    }

    /// Whether the base system answers.
    pub fn is_installed(&self, runner: &dyn CommandRunner) -> bool {
        runner
            .run(&ProcessBuilder::new(self.pacman()).arg("--version"))
            .map(|out| out.success())
            .unwrap_or(false)
    }

    /// Command installing the MSYS2 base system.
    pub fn base_install_command(&self) -> ProcessBuilder {
        ProcessBuilder::new("winget").args([
            "install",
            "--id",
            MSYS2_WINGET_ID,
            "-e",
            "--accept-package-agreements",
            "--accept-source-agreements",
        ])
    }

    /// One pacman call installing every library in `packages`.
    pub fn install_command(&self, packages: &[String]) -> ProcessBuilder {
        ProcessBuilder::new(self.pacman())
            .args(["-S", "--needed", "--noconfirm"])
            .args(packages.iter().map(|p| self.package_name(p)))
    }

    /// Query for one library.
    pub fn query_command(&self, package: &str) -> ProcessBuilder {
        ProcessBuilder::new(self.pacman()).args(["-Q".to_string(), self.package_name(package)])
    }

    /// Whether a library is installed. Failures count as "no".
    pub fn is_package_installed(&self, runner: &dyn CommandRunner, package: &str) -> bool {
        runner
            .run(&self.query_command(package))
            .map(|out| out.success())
            .unwrap_or(false)
    }
}
