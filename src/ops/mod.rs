//! High-level operations.
//!
//! This module contains the implementation of catalyst commands. Each
//! operation takes a [`CommandRunner`](crate::util::process::CommandRunner)
//! so it can run against a mock in tests.

pub mod analyze;
pub mod doctor;
pub mod install;
pub mod project_config;
pub mod resolve;
pub mod scan;

use crate::analyzer::AnalyzeError;
use crate::install::InstallError;
use crate::resolver::ResolveError;
use crate::scan::ScanError;
use crate::util::diagnostic::Diagnostic;

pub use analyze::{analyze_project, plan_targets, AnalyzeOptions, AnalyzeReport, TargetPlan};
pub use doctor::{doctor, format_report, CheckResult, DoctorReport};
pub use install::{install_packages, install_project, InstallRequest};
pub use project_config::{find_project_file, ProjectConfig, PROJECT_FILE};
pub use resolve::{
    resolve_dependencies, resolve_project, select_package_manager, ResolveOptions, ResolveReport,
};
pub use scan::{scan_project, ScanOptions, ScanReport};

/// Render a command failure as a diagnostic.
///
/// The first typed error in the chain supplies the message and suggestions;
/// any context wrapped around it becomes a context line.
pub fn diagnose(err: &anyhow::Error) -> Diagnostic {
    let mut outer = Vec::new();

    for cause in err.chain() {
        let typed = if let Some(e) = cause.downcast_ref::<ScanError>() {
            Some(e.to_diagnostic())
        } else if let Some(e) = cause.downcast_ref::<AnalyzeError>() {
            Some(e.to_diagnostic())
        } else if let Some(e) = cause.downcast_ref::<ResolveError>() {
            Some(e.to_diagnostic())
        } else {
            cause.downcast_ref::<InstallError>().map(InstallError::to_diagnostic)
        };

        match typed {
            Some(diag) => {
                return outer
                    .into_iter()
                    .fold(diag, |diag, ctx: String| diag.with_context(ctx));
            }
            None => outer.push(cause.to_string()),
        }
    }

    Diagnostic::error(format!("{:#}", err))
}
