//! Package-manager and toolchain health checks.
//!
//! The `doctor` command verifies that catalyst can resolve and install on
//! this machine.
//!
//! ## Usage
//!
//! ```bash
//! catalyst doctor           # Quick check
//! catalyst doctor --verbose # Detailed output
//! ```
//!
//! ## Checks Performed
//!
//! - Package manager detection (or the configured override)
//! - apt-file, for header-based search on apt systems
//! - Other package managers present on this OS, including vcpkg
//! - sudo, when the backend installs as root
//! - MSYS2, when installing through winget
//! - C compiler for trial links

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::core::{detect_package_manager, Os, PackageManagerId};
use crate::util::config::Config;
use crate::util::process::{find_c_compiler, CommandRunner, ProcessBuilder};

/// Result of a single health check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,

    /// Whether the check passed
    pub passed: bool,

    /// Human-readable status message
    pub message: String,

    /// Path to the tool (if applicable)
    pub path: Option<PathBuf>,

    /// Version string (if applicable)
    pub version: Option<String>,

    /// How long the check took
    pub duration: Duration,

    /// Whether this check is required or optional
    pub required: bool,
}

impl CheckResult {
    /// Create a passing check result.
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: true,
            message: message.into(),
            path: None,
            version: None,
            duration: Duration::ZERO,
            required: true,
        }
    }

    /// Create a failing check result.
    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            passed: false,
            ..CheckResult::pass(name, message)
        }
    }

    /// Mark this check as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Summary of all health checks.
#[derive(Debug, Clone, Default)]
pub struct DoctorReport {
    /// Individual check results
    pub checks: Vec<CheckResult>,

    /// Total time taken
    pub total_duration: Duration,

    /// Environment information
    pub environment: HashMap<String, String>,
}

impl DoctorReport {
    pub fn new() -> Self {
        DoctorReport::default()
    }

    pub fn add(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    /// Check if all required checks passed.
    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().filter(|c| c.required).all(|c| c.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    pub fn required_failed_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.required && !c.passed)
            .count()
    }

    /// Find a check by name.
    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Run every check for `os`.
pub fn doctor(runner: &dyn CommandRunner, os: &Os, config: &Config) -> DoctorReport {
    let start = Instant::now();
    let mut report = DoctorReport::new();

    report.environment.insert("os".to_string(), os.to_string());
    report
        .environment
        .insert("arch".to_string(), std::env::consts::ARCH.to_string());

    let (check, pm) = check_package_manager(runner, os, config);
    report.add(check);

    if let Some(pm) = pm {
        report
            .environment
            .insert("package_manager".to_string(), pm.to_string());

        if pm == PackageManagerId::Apt {
            report.add(check_apt_file(runner));
        }
        if pm.needs_root() && config.install_options().use_sudo {
            report.add(check_tool(runner, "sudo", "sudo", "needed to install as root"));
        }
        if pm == PackageManagerId::Winget {
            report.add(check_msys2(runner, config));
        }
    }

    for other in other_backends(os, pm) {
        report.add(check_tool(
            runner,
            other.as_str(),
            other.executable(),
            "alternative package manager",
        ));
    }

    report.add(check_c_compiler(runner));

    report.total_duration = start.elapsed();
    report
}

/// Backends worth reporting besides the one in use. Linux hosts get none.
fn other_backends(os: &Os, active: Option<PackageManagerId>) -> Vec<PackageManagerId> {
    if matches!(os, Os::Linux | Os::Other(_)) {
        return Vec::new();
    }

    let mut out: Vec<PackageManagerId> = Vec::new();
    for pm in os
        .package_manager_candidates()
        .iter()
        .chain([PackageManagerId::Vcpkg].iter())
    {
        if Some(*pm) != active && !out.contains(pm) {
            out.push(*pm);
        }
    }
    out
}

fn check_package_manager(
    runner: &dyn CommandRunner,
    os: &Os,
    config: &Config,
) -> (CheckResult, Option<PackageManagerId>) {
    let start = Instant::now();

    let configured = match config.package_manager() {
        Ok(pm) => pm,
        Err(e) => {
            return (
                CheckResult::fail("Package manager", e.to_string()).with_duration(start.elapsed()),
                None,
            )
        }
    };

    let (pm, how) = match configured {
        Some(pm) => (Some(pm), "configured"),
        None => (detect_package_manager(os, runner), "detected"),
    };

    let check = match pm {
        Some(pm) => match runner.find(pm.executable()) {
            Some(path) => CheckResult::pass("Package manager", format!("Using {} ({})", pm, how))
                .with_path(path),
            None => CheckResult::fail(
                "Package manager",
                format!("{} is configured but `{}` is not on PATH", pm, pm.executable()),
            ),
        },
        None => CheckResult::fail(
            "Package manager",
            format!("No supported package manager found on {}", os),
        ),
    };

    (check.with_duration(start.elapsed()), pm)
}

fn check_apt_file(runner: &dyn CommandRunner) -> CheckResult {
    let start = Instant::now();
    match runner.find("apt-file") {
        Some(path) => CheckResult::pass("apt-file", "Header search available").with_path(path),
        None => CheckResult::fail(
            "apt-file",
            "apt-file not found (optional, enables header search: sudo apt install apt-file && sudo apt-file update)",
        ),
    }
    .with_duration(start.elapsed())
    .optional()
}

fn check_tool(runner: &dyn CommandRunner, name: &str, program: &str, purpose: &str) -> CheckResult {
    let start = Instant::now();
    match runner.find(program) {
        Some(path) => CheckResult::pass(name, format!("{} is available", program)).with_path(path),
        None => CheckResult::fail(name, format!("{} not found ({})", program, purpose)),
    }
    .with_duration(start.elapsed())
    .optional()
}

fn check_msys2(runner: &dyn CommandRunner, config: &Config) -> CheckResult {
    let start = Instant::now();
    let msys2 = config.msys2();

    if msys2.is_installed(runner) {
        CheckResult::pass("MSYS2", "Development libraries install through MSYS2")
            .with_path(msys2.root().to_path_buf())
    } else {
        CheckResult::fail(
            "MSYS2",
            format!(
                "MSYS2 not found at {} (installed automatically on first library install)",
                msys2.root().display()
            ),
        )
    }
    .with_duration(start.elapsed())
    .optional()
}

fn check_c_compiler(runner: &dyn CommandRunner) -> CheckResult {
    let start = Instant::now();

    let Some(path) = find_c_compiler(runner) else {
        return CheckResult::fail(
            "C compiler",
            "No C compiler found (tried $CC, cc, gcc, clang; needed for missing-symbol scans)",
        )
        .with_duration(start.elapsed())
        .optional();
    };

    let version = runner
        .run(&ProcessBuilder::new(&path).arg("--version"))
        .ok()
        .and_then(|out| {
            out.combined()
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(String::from)
        })
        .unwrap_or_else(|| "unknown version".to_string());

    CheckResult::pass("C compiler", format!("Found {}", path.display()))
        .with_path(path)
        .with_version(version)
        .with_duration(start.elapsed())
        .optional()
}

/// Format the doctor report for display.
pub fn format_report(report: &DoctorReport, verbose: bool) -> String {
    use std::fmt::Write;

    let mut output = String::new();

    let _ = writeln!(output, "Catalyst Doctor");
    let _ = writeln!(output, "===============\n");

    if verbose {
        let unknown = "unknown".to_string();
        let _ = writeln!(output, "Environment:");
        let _ = writeln!(
            output,
            "  OS: {} ({})",
            report.environment.get("os").unwrap_or(&unknown),
            report.environment.get("arch").unwrap_or(&unknown)
        );
        if let Some(pm) = report.environment.get("package_manager") {
            let _ = writeln!(output, "  Package manager: {}", pm);
        }
        let _ = writeln!(output);
    }

    let _ = writeln!(output, "Checks:");
    for check in &report.checks {
        let status = if check.passed { "[OK]" } else { "[!!]" };
        let required = if check.required { "" } else { " (optional)" };

        let _ = writeln!(output, "  {} {}{}", status, check.name, required);

        if verbose || (!check.passed && check.required) {
            let _ = writeln!(output, "      {}", check.message);
        }
        if verbose {
            if let Some(path) = &check.path {
                let _ = writeln!(output, "      Path: {}", path.display());
            }
            if let Some(version) = &check.version {
                let _ = writeln!(output, "      Version: {}", version);
            }
        }
    }

    let _ = writeln!(output);

    let passed = report.passed_count();
    let failed = report.failed_count();
    let required_failed = report.required_failed_count();

    let _ = writeln!(output, "Summary: {} passed, {} failed", passed, failed);

    if required_failed > 0 {
        let _ = writeln!(
            output,
            "\nWarning: {} required check(s) failed. Installing will not work.",
            required_failed
        );
    } else if failed > 0 {
        let _ = writeln!(
            output,
            "\nAll required checks passed. {} optional check(s) failed.",
            failed
        );
    } else {
        let _ = writeln!(output, "\nAll checks passed. Catalyst is ready to use.");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockExecutor, MockProcessOutput};

    #[test]
    fn test_check_result_optional() {
        let result = CheckResult::pass("test", "passed").optional();
        assert!(result.passed);
        assert!(!result.required);
        assert!(!CheckResult::fail("test", "missing").passed);
    }

    #[test]
    fn test_doctor_report_counts() {
        let mut report = DoctorReport::new();
        report.add(CheckResult::pass("required", "ok"));
        report.add(CheckResult::fail("optional", "missing").optional());

        assert!(report.all_required_passed());
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.required_failed_count(), 0);

        report.add(CheckResult::fail("check2", "missing"));
        assert!(!report.all_required_passed());
        assert_eq!(report.required_failed_count(), 1);
    }

    #[test]
    fn test_apt_host() {
        let exec = MockExecutor::new();
        exec.add_tool("apt").add_tool("sudo").add_tool("cc");
        exec.expect(
            "/usr/bin/cc --version",
            MockProcessOutput::success("cc (Debian 12.2.0-14) 12.2.0\n"),
        );

        let report = doctor(&exec, &Os::Linux, &Config::default());

        let pm = report.check("Package manager").unwrap();
        assert!(pm.passed);
        assert_eq!(pm.message, "Using apt (detected)");
        assert!(!report.check("apt-file").unwrap().passed);
        if cfg!(unix) {
            assert!(report.check("sudo").unwrap().passed);
        }
        assert_eq!(
            report.check("C compiler").unwrap().version.as_deref(),
            Some("cc (Debian 12.2.0-14) 12.2.0")
        );
        assert!(report.all_required_passed());
        assert_eq!(report.environment["package_manager"], "apt");
    }

    #[test]
    fn test_no_package_manager_fails_required_check() {
        let exec = MockExecutor::new();
        let report = doctor(&exec, &Os::Darwin, &Config::default());

        assert!(!report.all_required_passed());
        assert!(!report.check("C compiler").unwrap().passed);
        assert!(report.check("vcpkg").is_some());

        let text = format_report(&report, false);
        assert!(text.contains("[!!] Package manager"));
        assert!(text.contains("No supported package manager found on darwin"));
        assert!(text.contains("1 required check(s) failed"));
    }

    #[test]
    fn test_configured_manager_missing_from_path() {
        let exec = MockExecutor::new();
        let mut config = Config::default();
        config.install.package_manager = Some("dnf".to_string());

        let report = doctor(&exec, &Os::Linux, &config);
        let pm = report.check("Package manager").unwrap();
        assert!(!pm.passed);
        assert!(pm.message.contains("`dnf` is not on PATH"));
    }

    #[test]
    fn test_winget_checks_msys2_and_alternatives() {
        let exec = MockExecutor::new();
        exec.add_tool("winget").add_tool("choco");
        exec.set_default(MockProcessOutput::spawn_error());

        let report = doctor(&exec, &Os::Windows, &Config::default());

        assert!(report.check("Package manager").unwrap().passed);
        assert!(!report.check("MSYS2").unwrap().passed);
        assert!(report.check("choco").unwrap().passed);
        assert!(!report.check("scoop").unwrap().passed);
        assert!(report.check("winget").is_none());
        assert!(report.check("sudo").is_none());
    }

    #[test]
    fn test_format_verbose() {
        let mut report = DoctorReport::new();
        report.environment.insert("os".to_string(), "linux".to_string());
        report.add(
            CheckResult::pass("C compiler", "Found /usr/bin/cc")
                .with_path(PathBuf::from("/usr/bin/cc"))
                .with_version("cc 12.2.0")
                .optional(),
        );

        let text = format_report(&report, true);
        assert!(text.contains("OS: linux (unknown)"));
        assert!(text.contains("[OK] C compiler (optional)"));
        assert!(text.contains("Version: cc 12.2.0"));
        assert!(text.contains("All checks passed."));
    }
}
