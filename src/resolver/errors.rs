//! Resolution error types and diagnostics.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::UnsupportedPackageManager;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error during dependency resolution.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ResolveError {
    #[error("unsupported package manager: `{name}`")]
    #[diagnostic(
        code(catalyst::resolve::unsupported_package_manager),
        help("Supported: apt, dnf, yum, pacman, zypper, brew, vcpkg, choco, winget, scoop")
    )]
    UnsupportedPackageManager { name: String },

    #[error("invalid override for `{dependency}`: unknown package manager `{manager}`")]
    #[diagnostic(code(catalyst::resolve::invalid_override))]
    InvalidOverride { dependency: String, manager: String },

    #[error("package selection for `{dependency}` failed: {message}")]
    #[diagnostic(code(catalyst::resolve::prompt))]
    Prompt { dependency: String, message: String },
}

impl From<UnsupportedPackageManager> for ResolveError {
    fn from(err: UnsupportedPackageManager) -> Self {
        ResolveError::UnsupportedPackageManager { name: err.0 }
    }
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::UnsupportedPackageManager { name } => {
                Diagnostic::error(format!("`{}` is not a supported package manager", name))
                    .with_context(
                        "supported: apt, dnf, yum, pacman, zypper, brew, vcpkg, choco, winget, scoop",
                    )
                    .with_suggestion(suggestions::NO_PACKAGE_MANAGER)
            }

            ResolveError::InvalidOverride {
                dependency,
                manager,
            } => Diagnostic::error(format!(
                "override for `{}` names unknown package manager `{}`",
                dependency, manager
            ))
            .with_context(format!("in [packages.{}]", dependency))
            .with_suggestion("Use one of: apt, dnf, yum, pacman, zypper, brew, vcpkg, choco, winget, scoop"),

            ResolveError::Prompt {
                dependency,
                message,
            } => Diagnostic::error(format!("could not choose a package for `{}`", dependency))
                .with_context(message.clone())
                .with_suggestion("Run without --interactive to pick the best match automatically")
                .with_suggestion(suggestions::UNRESOLVED),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_unsupported() {
        let err: ResolveError = "portage"
            .parse::<crate::core::PackageManagerId>()
            .unwrap_err()
            .into();
        assert_eq!(err.to_string(), "unsupported package manager: `portage`");

        let diag = err.to_diagnostic().format(false);
        assert!(diag.contains("`portage` is not a supported package manager"));
        assert!(diag.contains("install.package_manager"));
    }
}
