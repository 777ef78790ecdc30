//! Catalyst - dependency discovery and installation for C/C++ projects
//!
//! This crate turns a C/C++ source tree into per-platform package lists and
//! installs them: include and linker-symbol scanning, translation to
//! package-manager names with live search as a fallback, batched
//! installation, and build-target analysis.

pub mod analyzer;
pub mod core;
pub mod install;
pub mod ops;
pub mod resolver;
pub mod scan;
pub mod util;

/// Test utilities and mocks for catalyst unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a mock command runner and C project
/// fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{AbstractDependency, Os, PackageManagerId, Resolution};
pub use install::{InstallReport, Installer};
pub use resolver::{PackageTable, Resolver};
