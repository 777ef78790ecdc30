//! Configuration file support for catalyst.
//!
//! Two locations are read:
//! - Global: `~/.catalyst/config.toml` - user-wide defaults
//! - Project: `.catalyst/config.toml` - project-specific overrides
//!
//! Project config takes precedence over global config. Package overrides
//! are merged per dependency and per package manager.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::PackageManagerId;
use crate::install::{InstallOptions, Msys2, DEFAULT_BATCH_SIZE};
use crate::resolver::{PackageTable, ResolveError};

/// catalyst configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Install settings
    pub install: InstallConfig,

    /// Resolution settings
    pub resolve: ResolveConfig,

    /// Translation overrides: dependency -> package manager -> package.
    pub packages: BTreeMap<String, BTreeMap<String, String>>,
}

/// Install-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Packages per batch install command
    pub batch_size: Option<usize>,

    /// Use sudo for root-only package managers (default: true on Unix)
    pub use_sudo: Option<bool>,

    /// Refresh the package index before installing (default: true)
    pub update_index: Option<bool>,

    /// Only print what would be installed
    #[serde(default)]
    pub dry_run: bool,

    /// Package manager to use instead of detection
    pub package_manager: Option<String>,

    /// MSYS2 installation root on Windows
    pub msys2_root: Option<PathBuf>,
}

/// Resolution-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Ask before picking among search candidates
    #[serde(default)]
    pub interactive: bool,

    /// Also resolve libraries suggested by the missing-symbol scan
    #[serde(default)]
    pub include_symbol_suggestions: bool,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Install settings
        if other.install.batch_size.is_some() {
            self.install.batch_size = other.install.batch_size;
        }
        if other.install.use_sudo.is_some() {
            self.install.use_sudo = other.install.use_sudo;
        }
        if other.install.update_index.is_some() {
            self.install.update_index = other.install.update_index;
        }
        if other.install.dry_run {
            self.install.dry_run = true;
        }
        if other.install.package_manager.is_some() {
            self.install.package_manager = other.install.package_manager;
        }
        if other.install.msys2_root.is_some() {
            self.install.msys2_root = other.install.msys2_root;
        }

        // Resolve settings
        if other.resolve.interactive {
            self.resolve.interactive = true;
        }
        if other.resolve.include_symbol_suggestions {
            self.resolve.include_symbol_suggestions = true;
        }

        // Package overrides
        for (dep, row) in other.packages {
            self.packages.entry(dep).or_default().extend(row);
        }
    }

    /// Batch size, falling back to the installer default.
    pub fn batch_size(&self) -> usize {
        self.install
            .batch_size
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_BATCH_SIZE)
    }

    /// Installer switches.
    pub fn install_options(&self) -> InstallOptions {
        let defaults = InstallOptions::default();
        InstallOptions {
            use_sudo: self.install.use_sudo.unwrap_or(defaults.use_sudo),
            update_index: self.install.update_index.unwrap_or(defaults.update_index),
            dry_run: self.install.dry_run,
        }
    }

    /// Configured package manager, if any.
    pub fn package_manager(&self) -> Result<Option<PackageManagerId>, ResolveError> {
        self.install
            .package_manager
            .as_deref()
            .map(|s| s.parse::<PackageManagerId>().map_err(ResolveError::from))
            .transpose()
    }

    /// Built-in translation table layered under the configured overrides.
    pub fn package_table(&self) -> Result<PackageTable, ResolveError> {
        PackageTable::from_config(&self.packages)
    }

    /// MSYS2 installation to route Windows development libraries through.
    pub fn msys2(&self) -> Msys2 {
        self.install
            .msys2_root
            .as_deref()
            .map(Msys2::new)
            .unwrap_or_default()
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.catalyst/config.toml)
/// 2. Global config (~/.catalyst/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path.filter(|p| p.exists()) {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Load the merged configuration for a project rooted at `project_root`.
pub fn load_project_config(project_root: &Path) -> Config {
    load_config(
        global_config_path().as_deref(),
        &project_config_path(project_root),
    )
}

/// Get the global catalyst config directory (~/.catalyst).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".catalyst"))
}

/// Get the global config path (~/.catalyst/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.catalyst/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".catalyst").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Resolution;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.batch_size(), 5);
        assert!(!config.install_options().dry_run);
        assert!(config.install_options().update_index);
        assert!(config.package_manager().unwrap().is_none());
        assert!(!config.resolve.interactive);
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[install]
batch_size = 10
use_sudo = false
package_manager = "pacman"

[resolve]
interactive = true

[packages.jansson]
apt = "libjansson-dev"
dnf = "jansson-devel"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.batch_size(), 10);
        assert!(!config.install_options().use_sudo);
        assert_eq!(
            config.package_manager().unwrap(),
            Some(PackageManagerId::Pacman)
        );
        assert!(config.resolve.interactive);

        let table = config.package_table().unwrap();
        assert_eq!(
            table.translate("jansson", PackageManagerId::Apt),
            Resolution::Package("libjansson-dev".to_string())
        );
    }

    #[test]
    fn test_unknown_package_manager() {
        let mut config = Config::default();
        config.install.package_manager = Some("portage".to_string());
        assert!(matches!(
            config.package_manager(),
            Err(ResolveError::UnsupportedPackageManager { .. })
        ));
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.install.batch_size = Some(3);
        base.install.package_manager = Some("apt".to_string());
        base.packages.insert(
            "jansson".to_string(),
            BTreeMap::from([
                ("apt".to_string(), "libjansson-dev".to_string()),
                ("brew".to_string(), "jansson".to_string()),
            ]),
        );

        let mut project = Config::default();
        project.install.package_manager = Some("dnf".to_string());
        project.packages.insert(
            "jansson".to_string(),
            BTreeMap::from([("apt".to_string(), "libjansson4".to_string())]),
        );

        base.merge(project);

        assert_eq!(base.install.batch_size, Some(3)); // Not overridden
        assert_eq!(base.install.package_manager.as_deref(), Some("dnf"));
        assert_eq!(base.packages["jansson"]["apt"], "libjansson4");
        assert_eq!(base.packages["jansson"]["brew"], "jansson");
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            r#"
[install]
batch_size = 8
msys2_root = "D:/msys64"
"#,
        )
        .unwrap();
        std::fs::write(
            &project_path,
            r#"
[install]
batch_size = 2
dry_run = true
"#,
        )
        .unwrap();

        let config = load_config(Some(&global_path), &project_path);
        assert_eq!(config.batch_size(), 2);
        assert!(config.install_options().dry_run);
        assert_eq!(config.msys2().root(), Path::new("D:/msys64"));
    }

    #[test]
    fn test_broken_file_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[install\nbatch_size = ").unwrap();

        assert_eq!(Config::load_or_default(&path), Config::default());
        assert_eq!(load_config(None, &tmp.path().join("missing.toml")), Config::default());
    }
}
