//! Build targets discovered in a source tree.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Kind of artifact a target produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// Executable with a `main` entry point.
    Executable,
    /// Library without an entry point.
    Library,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Executable => write!(f, "executable"),
            TargetKind::Library => write!(f, "library"),
        }
    }
}

/// One independently compilable artifact.
///
/// All paths are relative to the analyzed project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTarget {
    /// Target name (directory base name, or file stem at the root).
    pub name: String,

    /// Source file containing `main`.
    pub entry_point: PathBuf,

    /// Sources compiled into this target, entry point first.
    pub source_files: Vec<PathBuf>,

    /// Directory holding the entry point (empty for the project root).
    pub directory: PathBuf,

    /// Artifact kind.
    pub kind: TargetKind,
}

impl BuildTarget {
    /// Whether the entry point sits at the project root.
    pub fn is_rooted_at_project(&self) -> bool {
        self.directory.as_os_str().is_empty()
    }

    /// Whether `file` is one of this target's sources.
    pub fn contains(&self, file: &Path) -> bool {
        self.source_files.iter().any(|f| f == file)
    }
}
