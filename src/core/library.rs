//! External versus vendored library classification.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::platform::Os;

/// Package that provides an external library on one OS family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformPackage {
    /// OS key (`linux`, `darwin`, `windows`).
    pub os: &'static str,
    /// Package name; empty when the OS ships the library itself.
    pub package: &'static str,
    /// Extra include directory, if the package lives off the default path.
    pub include_path: Option<&'static str>,
    /// Extra library directory for the linker.
    pub lib_path: Option<&'static str>,
}

/// A well-known library resolved through a system package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExternalLibrary {
    /// Library name (`libcurl`).
    pub name: &'static str,
    /// Header that identifies it (`curl/curl.h`).
    pub header: &'static str,
    /// Linker flags (`-lcurl`).
    pub linker_flag: &'static str,
    /// pkg-config module, when there is one.
    pub pkg_config: Option<&'static str>,
    /// Per-OS package names.
    pub platforms: &'static [PlatformPackage],
}

impl ExternalLibrary {
    /// Package providing this library on `os`.
    ///
    /// `Some("")` means the OS already provides it.
    pub fn package_for(&self, os: &Os) -> Option<&'static str> {
        self.platforms
            .iter()
            .find(|p| p.os == os.key())
            .map(|p| p.package)
    }

    /// Whether an include directive refers to this library.
    pub fn matches_include(&self, include: &str) -> bool {
        include == self.header || include.contains(self.header)
    }

    /// Linker flags split into arguments.
    pub fn linker_args(&self) -> Vec<String> {
        self.linker_flag
            .split_whitespace()
            .map(String::from)
            .collect()
    }
}

/// Third-party source bundled inside the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendoredLibrary {
    /// Library name (the directory's base name).
    pub name: String,
    /// Directory relative to the project root.
    pub path: PathBuf,
    /// Sources to compile directly into dependent targets.
    pub source_files: Vec<PathBuf>,
    /// Headers exposed by the library.
    pub header_files: Vec<PathBuf>,
}

impl VendoredLibrary {
    /// Whether `include` names one of this library's headers.
    pub fn provides(&self, include: &str) -> bool {
        self.header_files.iter().any(|h| {
            h.file_name().is_some_and(|name| {
                let name = name.to_string_lossy();
                include == name || include.ends_with(&format!("/{}", name))
            })
        })
    }
}
