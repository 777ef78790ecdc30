//! Core data structures for catalyst.
//!
//! - Abstract dependencies and the three-way resolution outcome
//! - Package-manager identifiers and host platform detection
//! - Build targets and library classification produced by the analyzer

pub mod dependency;
pub mod library;
pub mod package_manager;
pub mod platform;
pub mod target;

pub use dependency::{AbstractDependency, Resolution};
pub use library::{ExternalLibrary, PlatformPackage, VendoredLibrary};
pub use package_manager::{PackageManagerId, UnsupportedPackageManager};
pub use platform::{detect_package_manager, Os};
pub use target::{BuildTarget, TargetKind};
