//! Static translation from abstract dependencies to concrete packages.
//!
//! The built-in table is immutable and built once. User overrides live in a
//! separate layer that is consulted first, so the built-in data never
//! changes at runtime.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use crate::analyzer::catalog::STANDARD_HEADERS;
use crate::core::{PackageManagerId as Pm, Resolution};
use crate::resolver::errors::ResolveError;

type Row = &'static [(Pm, &'static str)];

/// Libraries with known package names. Windows `winget` names are the
/// MSYS2 base names; the installer routes them through MSYS2.
const LIBRARIES: &[(&str, Row)] = &[
    (
        "curl",
        &[
            (Pm::Apt, "libcurl4-openssl-dev"),
            (Pm::Dnf, "libcurl-devel"),
            (Pm::Yum, "libcurl-devel"),
            (Pm::Pacman, "curl"),
            (Pm::Zypper, "libcurl-devel"),
            (Pm::Brew, "curl"),
            (Pm::Vcpkg, "curl"),
            (Pm::Choco, "curl"),
            (Pm::Winget, "curl"),
            (Pm::Scoop, "curl"),
        ],
    ),
    (
        "openssl",
        &[
            (Pm::Apt, "libssl-dev"),
            (Pm::Dnf, "openssl-devel"),
            (Pm::Yum, "openssl-devel"),
            (Pm::Pacman, "openssl"),
            (Pm::Zypper, "libopenssl-devel"),
            (Pm::Brew, "openssl@3"),
            (Pm::Vcpkg, "openssl"),
            (Pm::Choco, "openssl"),
            (Pm::Winget, "openssl"),
            (Pm::Scoop, "openssl"),
        ],
    ),
    (
        "png",
        &[
            (Pm::Apt, "libpng-dev"),
            (Pm::Dnf, "libpng-devel"),
            (Pm::Yum, "libpng-devel"),
            (Pm::Pacman, "libpng"),
            (Pm::Zypper, "libpng16-devel"),
            (Pm::Brew, "libpng"),
            (Pm::Vcpkg, "libpng"),
            (Pm::Choco, "libpng"),
            (Pm::Winget, "libpng"),
        ],
    ),
    (
        "zlib",
        &[
            (Pm::Apt, "zlib1g-dev"),
            (Pm::Dnf, "zlib-devel"),
            (Pm::Yum, "zlib-devel"),
            (Pm::Pacman, "zlib"),
            (Pm::Zypper, "zlib-devel"),
            (Pm::Brew, "zlib"),
            (Pm::Vcpkg, "zlib"),
            (Pm::Choco, "zlib"),
            (Pm::Winget, "zlib"),
        ],
    ),
    (
        "sqlite3",
        &[
            (Pm::Apt, "libsqlite3-dev"),
            (Pm::Dnf, "sqlite-devel"),
            (Pm::Yum, "sqlite-devel"),
            (Pm::Pacman, "sqlite"),
            (Pm::Zypper, "sqlite3-devel"),
            (Pm::Brew, "sqlite"),
            (Pm::Vcpkg, "sqlite3"),
            (Pm::Choco, "sqlite"),
            (Pm::Winget, "sqlite3"),
            (Pm::Scoop, "sqlite"),
        ],
    ),
    (
        "ncurses",
        &[
            (Pm::Apt, "libncurses-dev"),
            (Pm::Dnf, "ncurses-devel"),
            (Pm::Yum, "ncurses-devel"),
            (Pm::Pacman, "ncurses"),
            (Pm::Zypper, "ncurses-devel"),
            (Pm::Brew, "ncurses"),
            (Pm::Vcpkg, "pdcurses"),
            (Pm::Winget, "ncurses"),
        ],
    ),
    (
        "uv",
        &[
            (Pm::Apt, "libuv1-dev"),
            (Pm::Dnf, "libuv-devel"),
            (Pm::Yum, "libuv-devel"),
            (Pm::Pacman, "libuv"),
            (Pm::Zypper, "libuv-devel"),
            (Pm::Brew, "libuv"),
            (Pm::Vcpkg, "libuv"),
            (Pm::Winget, "libuv"),
        ],
    ),
    (
        "SDL2",
        &[
            (Pm::Apt, "libsdl2-dev"),
            (Pm::Dnf, "SDL2-devel"),
            (Pm::Yum, "SDL2-devel"),
            (Pm::Pacman, "sdl2"),
            (Pm::Zypper, "libSDL2-devel"),
            (Pm::Brew, "sdl2"),
            (Pm::Vcpkg, "sdl2"),
            (Pm::Choco, "sdl2"),
            (Pm::Winget, "SDL2"),
        ],
    ),
    (
        "libxml",
        &[
            (Pm::Apt, "libxml2-dev"),
            (Pm::Dnf, "libxml2-devel"),
            (Pm::Yum, "libxml2-devel"),
            (Pm::Pacman, "libxml2"),
            (Pm::Zypper, "libxml2-devel"),
            (Pm::Brew, "libxml2"),
            (Pm::Vcpkg, "libxml2"),
            (Pm::Winget, "libxml2"),
        ],
    ),
    (
        "microhttpd",
        &[
            (Pm::Apt, "libmicrohttpd-dev"),
            (Pm::Dnf, "libmicrohttpd-devel"),
            (Pm::Yum, "libmicrohttpd-devel"),
            (Pm::Pacman, "libmicrohttpd"),
            (Pm::Zypper, "libmicrohttpd-devel"),
            (Pm::Brew, "libmicrohttpd"),
            (Pm::Vcpkg, "libmicrohttpd"),
            (Pm::Winget, "libmicrohttpd"),
        ],
    ),
    (
        "pcre",
        &[
            (Pm::Apt, "libpcre3-dev"),
            (Pm::Dnf, "pcre-devel"),
            (Pm::Yum, "pcre-devel"),
            (Pm::Pacman, "pcre"),
            (Pm::Zypper, "pcre-devel"),
            (Pm::Brew, "pcre"),
            (Pm::Vcpkg, "pcre"),
            (Pm::Winget, "pcre"),
        ],
    ),
];

/// Identifiers the include scanner derives from standard headers
/// (`<sys/types.h>` gives `sys`), plus `pthread`, which every supported
/// toolchain ships.
static STANDARD_IDENTIFIERS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut ids: Vec<&'static str> = STANDARD_HEADERS
        .iter()
        .copied()
        .map(|h| h.split(['.', '/']).next().unwrap_or(h))
        .chain(["pthread"])
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
});

static BUILTIN: LazyLock<HashMap<&'static str, HashMap<Pm, &'static str>>> = LazyLock::new(|| {
    let mut table: HashMap<&'static str, HashMap<Pm, &'static str>> = HashMap::new();

    for id in STANDARD_IDENTIFIERS.iter().copied() {
        table.insert(id, Pm::ALL.iter().map(|pm| (*pm, "")).collect());
    }
    for (name, row) in LIBRARIES.iter().copied() {
        table.insert(name, row.iter().copied().collect());
    }

    table
});

/// Translate using only the built-in table.
pub fn translate(dep: &str, pm: Pm) -> Resolution {
    Resolution::from_table_value(BUILTIN.get(dep).and_then(|row| row.get(&pm)).copied())
}

/// Whether `dep` names something every toolchain already provides.
pub fn is_standard_identifier(dep: &str) -> bool {
    STANDARD_IDENTIFIERS
        .binary_search_by(|entry| (*entry).cmp(dep))
        .is_ok()
}

/// Layered translation table: user overrides first, then the built-in data.
#[derive(Debug, Clone, Default)]
pub struct PackageTable {
    overrides: HashMap<String, HashMap<Pm, String>>,
}

impl PackageTable {
    /// Table with no overrides.
    pub fn builtin() -> Self {
        PackageTable::default()
    }

    /// Table with an override layer.
    pub fn with_overrides(overrides: HashMap<String, HashMap<Pm, String>>) -> Self {
        PackageTable { overrides }
    }

    /// Build the override layer from configuration, where keys are
    /// package-manager names.
    pub fn from_config(
        packages: &BTreeMap<String, BTreeMap<String, String>>,
    ) -> Result<Self, ResolveError> {
        let mut overrides: HashMap<String, HashMap<Pm, String>> = HashMap::new();
        for (dep, row) in packages {
            for (manager, package) in row {
                let pm = manager
                    .parse::<Pm>()
                    .map_err(|_| ResolveError::InvalidOverride {
                        dependency: dep.clone(),
                        manager: manager.clone(),
                    })?;
                overrides
                    .entry(dep.clone())
                    .or_default()
                    .insert(pm, package.clone());
            }
        }
        Ok(PackageTable { overrides })
    }

    /// Number of overridden dependencies.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// Translate `dep` for `pm`. An override of `""` marks the dependency
    /// as needing no package.
    pub fn translate(&self, dep: &str, pm: Pm) -> Resolution {
        match self.overrides.get(dep).and_then(|row| row.get(&pm)) {
            Some(name) => Resolution::from_table_value(Some(name)),
            None => translate(dep, pm),
        }
    }
}
