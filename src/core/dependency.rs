//! Abstract dependencies and their resolution outcome.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A platform-independent dependency name inferred from source code.
///
/// Derived from a header (`<curl/curl.h>` gives `curl`) or from a linker
/// symbol category. It carries no knowledge of any package manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbstractDependency(String);

impl AbstractDependency {
    /// Create a dependency identifier.
    pub fn new(name: impl Into<String>) -> Self {
        AbstractDependency(name.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AbstractDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AbstractDependency {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AbstractDependency {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AbstractDependency {
    fn from(s: &str) -> Self {
        AbstractDependency(s.to_string())
    }
}

impl From<String> for AbstractDependency {
    fn from(s: String) -> Self {
        AbstractDependency(s)
    }
}

/// Outcome of translating one dependency for one package manager.
///
/// Exactly one of three things is true: the dependency is unknown, it is
/// provided by the standard library, or it maps to a real package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "package", rename_all = "snake_case")]
pub enum Resolution {
    /// No translation exists; callers may fall back to a live search.
    NotFound,
    /// Part of the C/C++ standard library or the OS; nothing to install.
    StandardLibrary,
    /// A concrete, installable package name.
    Package(String),
}

impl Resolution {
    /// Build a resolution from a raw table value, where `""` means
    /// "standard library".
    pub fn from_table_value(value: Option<&str>) -> Self {
        match value {
            None => Resolution::NotFound,
            Some("") => Resolution::StandardLibrary,
            Some(name) => Resolution::Package(name.to_string()),
        }
    }

    /// Whether a translation was found (package or standard library).
    pub fn is_found(&self) -> bool {
        !matches!(self, Resolution::NotFound)
    }

    /// The concrete package name, if any.
    pub fn package(&self) -> Option<&str> {
        match self {
            Resolution::Package(name) => Some(name),
            _ => None,
        }
    }

    /// The `(name, found)` pair used by the project document, with `""`
    /// standing for "no package needed".
    pub fn as_pair(&self) -> (&str, bool) {
        match self {
            Resolution::NotFound => ("", false),
            Resolution::StandardLibrary => ("", true),
            Resolution::Package(name) => (name, true),
        }
    }
}
