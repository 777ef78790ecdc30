//! Package-manager backend identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A native package manager catalyst can resolve against and install with.
///
/// One id is chosen per run by platform detection (or configuration); every
/// translation, search and install call is scoped to exactly that id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManagerId {
    Apt,
    Dnf,
    Yum,
    Pacman,
    Zypper,
    Brew,
    Vcpkg,
    Choco,
    Winget,
    Scoop,
}

/// Error for package-manager names catalyst does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported package manager: `{0}`")]
pub struct UnsupportedPackageManager(pub String);

impl PackageManagerId {
    /// Every supported backend.
    pub const ALL: [PackageManagerId; 10] = [
        PackageManagerId::Apt,
        PackageManagerId::Dnf,
        PackageManagerId::Yum,
        PackageManagerId::Pacman,
        PackageManagerId::Zypper,
        PackageManagerId::Brew,
        PackageManagerId::Vcpkg,
        PackageManagerId::Choco,
        PackageManagerId::Winget,
        PackageManagerId::Scoop,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageManagerId::Apt => "apt",
            PackageManagerId::Dnf => "dnf",
            PackageManagerId::Yum => "yum",
            PackageManagerId::Pacman => "pacman",
            PackageManagerId::Zypper => "zypper",
            PackageManagerId::Brew => "brew",
            PackageManagerId::Vcpkg => "vcpkg",
            PackageManagerId::Choco => "choco",
            PackageManagerId::Winget => "winget",
            PackageManagerId::Scoop => "scoop",
        }
    }

    /// Executable looked up on PATH to detect this backend.
    pub fn executable(&self) -> &'static str {
        self.as_str()
    }

    /// Whether a single invocation can install several packages.
    ///
    /// The Windows managers install one package per call so failures can be
    /// attributed to a single package.
    pub fn supports_batch_install(&self) -> bool {
        matches!(
            self,
            PackageManagerId::Apt
                | PackageManagerId::Dnf
                | PackageManagerId::Yum
                | PackageManagerId::Pacman
                | PackageManagerId::Zypper
                | PackageManagerId::Brew
        )
    }

    /// Whether this backend only exists on Windows hosts.
    pub fn is_windows(&self) -> bool {
        matches!(
            self,
            PackageManagerId::Choco | PackageManagerId::Winget | PackageManagerId::Scoop
        )
    }

    /// Whether installs need root on a Unix host.
    pub fn needs_root(&self) -> bool {
        matches!(
            self,
            PackageManagerId::Apt
                | PackageManagerId::Dnf
                | PackageManagerId::Yum
                | PackageManagerId::Pacman
                | PackageManagerId::Zypper
        )
    }
}

impl fmt::Display for PackageManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageManagerId {
    type Err = UnsupportedPackageManager;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "apt" | "apt-get" => Ok(PackageManagerId::Apt),
            "dnf" => Ok(PackageManagerId::Dnf),
            "yum" => Ok(PackageManagerId::Yum),
            "pacman" => Ok(PackageManagerId::Pacman),
            "zypper" => Ok(PackageManagerId::Zypper),
            "brew" | "homebrew" => Ok(PackageManagerId::Brew),
            "vcpkg" => Ok(PackageManagerId::Vcpkg),
            "choco" | "chocolatey" => Ok(PackageManagerId::Choco),
            "winget" => Ok(PackageManagerId::Winget),
            "scoop" => Ok(PackageManagerId::Scoop),
            _ => Err(UnsupportedPackageManager(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_canonical_names() {
        for pm in PackageManagerId::ALL {
            assert_eq!(pm.as_str().parse::<PackageManagerId>().unwrap(), pm);
        }
    }

    #[test]
    fn test_parse_aliases_and_rejects_unknown() {
        assert_eq!("apt-get".parse::<PackageManagerId>().unwrap(), PackageManagerId::Apt);
        assert_eq!("Chocolatey".parse::<PackageManagerId>().unwrap(), PackageManagerId::Choco);

        let err = "emerge".parse::<PackageManagerId>().unwrap_err();
        assert_eq!(err.to_string(), "unsupported package manager: `emerge`");
    }

    #[test]
    fn test_batch_support() {
        assert!(PackageManagerId::Apt.supports_batch_install());
        assert!(PackageManagerId::Brew.supports_batch_install());
        assert!(!PackageManagerId::Vcpkg.supports_batch_install());
        assert!(!PackageManagerId::Winget.supports_batch_install());
        assert!(!PackageManagerId::Choco.supports_batch_install());
    }
}
