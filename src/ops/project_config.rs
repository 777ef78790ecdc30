//! The `catalyst.yml` project document.
//!
//! The document lists the project's sources, a per-OS list of concrete
//! packages and auxiliary resources. `resolve` writes the package lists;
//! `install` reads the list for the host OS.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::Os;
use crate::util::fs::write_string;

/// File name of the project document.
pub const PROJECT_FILE: &str = "catalyst.yml";

/// An auxiliary file fetched into the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub url: String,
    pub path: String,
}

/// Contents of `catalyst.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project_name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,

    /// OS key (`linux`, `darwin`, `windows`) to concrete package names.
    #[serde(default)]
    pub dependencies: BTreeMap<String, Vec<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
}

impl ProjectConfig {
    pub fn new(project_name: impl Into<String>) -> Self {
        ProjectConfig {
            project_name: project_name.into(),
            ..Default::default()
        }
    }

    /// Parse a project document.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Write the document back out.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("failed to serialize project document")?;
        write_string(path, &content)
    }

    /// Packages listed for `os`; empty when the OS has no entry.
    pub fn dependencies_for(&self, os: &Os) -> &[String] {
        self.dependencies
            .get(os.key())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Replace the package list for `os`.
    pub fn set_dependencies(&mut self, os: &Os, packages: Vec<String>) {
        self.dependencies.insert(os.key().to_string(), packages);
    }
}

/// Look for `catalyst.yml` in `start` and its ancestors.
pub fn find_project_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_FILE))
        .find(|candidate| candidate.is_file())
}

/// Name for a new document: the base name of the project directory.
pub fn default_project_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "project".to_string())
}

/// Project root for a document path (its parent directory).
pub fn project_root(document: &Path) -> PathBuf {
    match document.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_document() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(PROJECT_FILE);
        std::fs::write(
            &path,
            r#"
project_name: weather
sources:
  - main.c
  - net.c
dependencies:
  linux:
    - libcurl4-openssl-dev
  darwin:
    - curl
resources:
  - url: https://example.com/cities.json
    path: data/cities.json
"#,
        )
        .unwrap();

        let doc = ProjectConfig::load(&path).unwrap();
        assert_eq!(doc.project_name, "weather");
        assert_eq!(doc.sources, vec!["main.c", "net.c"]);
        assert_eq!(doc.dependencies_for(&Os::Linux), ["libcurl4-openssl-dev"]);
        assert_eq!(doc.dependencies_for(&Os::Darwin), ["curl"]);
        assert!(doc.dependencies_for(&Os::Windows).is_empty());
        assert_eq!(doc.resources[0].path, "data/cities.json");
    }

    #[test]
    fn test_save_replaces_one_os() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join(PROJECT_FILE);

        let mut doc = ProjectConfig::new("demo");
        doc.set_dependencies(&Os::Linux, vec!["zlib1g-dev".to_string()]);
        doc.set_dependencies(&Os::Darwin, vec!["zlib".to_string()]);
        doc.set_dependencies(&Os::Linux, vec!["libssl-dev".to_string()]);
        doc.save(&path).unwrap();

        let reloaded = ProjectConfig::load(&path).unwrap();
        assert_eq!(reloaded, doc);
        assert_eq!(reloaded.dependencies_for(&Os::Linux), ["libssl-dev"]);

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("resources"));
    }

    #[test]
    fn test_missing_sections_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(PROJECT_FILE);
        std::fs::write(&path, "project_name: bare\n").unwrap();

        let doc = ProjectConfig::load(&path).unwrap();
        assert!(doc.sources.is_empty());
        assert!(doc.dependencies.is_empty());
    }

    #[test]
    fn test_find_project_file() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("src").join("net");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(tmp.path().join(PROJECT_FILE), "project_name: x\n").unwrap();

        let found = find_project_file(&nested).unwrap();
        assert_eq!(found, tmp.path().join(PROJECT_FILE));
        assert_eq!(project_root(&found), tmp.path());
        assert_eq!(project_root(Path::new(PROJECT_FILE)), PathBuf::from("."));
    }
}
