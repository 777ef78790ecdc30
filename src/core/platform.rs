//! Host platform and package-manager detection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::package_manager::PackageManagerId;
use crate::util::process::CommandRunner;

/// Operating system family, as used for per-OS dependency lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Darwin,
    Windows,
    #[serde(untagged)]
    Other(String),
}

impl Os {
    /// The OS catalyst is running on.
    pub fn host() -> Self {
        Os::from_name(std::env::consts::OS)
    }

    /// Parse an OS name (`linux`, `macos`/`darwin`, `windows`).
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "linux" => Os::Linux,
            "macos" | "darwin" => Os::Darwin,
            "windows" => Os::Windows,
            other => Os::Other(other.to_string()),
        }
    }

    /// Key used in the project document's `dependencies` map.
    pub fn key(&self) -> &str {
        match self {
            Os::Linux => "linux",
            Os::Darwin => "darwin",
            Os::Windows => "windows",
            Os::Other(name) => name,
        }
    }

    /// Package managers checked on this OS, in order of preference.
    pub fn package_manager_candidates(&self) -> &'static [PackageManagerId] {
        match self {
            Os::Linux => &[
                PackageManagerId::Apt,
                PackageManagerId::Dnf,
                PackageManagerId::Yum,
                PackageManagerId::Pacman,
                PackageManagerId::Zypper,
            ],
            Os::Darwin => &[PackageManagerId::Brew],
            Os::Windows => &[
                PackageManagerId::Winget,
                PackageManagerId::Choco,
                PackageManagerId::Scoop,
                PackageManagerId::Vcpkg,
            ],
            Os::Other(_) => &[],
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Pick the first available package manager for `os`.
///
/// Returns `None` when nothing usable is on PATH, which callers treat as a
/// precondition failure for installing.
pub fn detect_package_manager(os: &Os, runner: &dyn CommandRunner) -> Option<PackageManagerId> {
    let found = os
        .package_manager_candidates()
        .iter()
        .copied()
        .find(|pm| runner.find(pm.executable()).is_some());

    match found {
        Some(pm) => tracing::debug!("detected package manager `{}` on {}", pm, os),
        None => tracing::debug!("no supported package manager found on {}", os),
    }

    found
}
