//! Test utilities and mocks for catalyst unit tests.
//!
//! The resolver, installer and trial-link scanner all run external tools
//! through [`CommandRunner`]. [`MockExecutor`] stands in for the host so
//! tests can script package-manager output and then assert on exactly which
//! commands were issued.
//!
//! # Example
//!
//! ```rust,ignore
//! use catalyst::test_support::{MockExecutor, MockProcessOutput};
//!
//! let exec = MockExecutor::new();
//! exec.expect("dpkg -s libssl-dev", MockProcessOutput::success("Status: install ok installed"));
//! exec.add_tool("apt");
//! ```

pub mod fixtures;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::util::process::{CommandRunner, ProcessBuilder, ProcessOutput};

pub use fixtures::*;

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Simulate a program that cannot be spawned.
    pub spawn_error: bool,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
            spawn_error: false,
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
            spawn_error: false,
        }
    }

    /// Simulate `ENOENT` when spawning.
    pub fn spawn_error() -> Self {
        MockProcessOutput {
            spawn_error: true,
            ..MockProcessOutput::failure(127, "")
        }
    }

    fn to_output(&self) -> ProcessOutput {
        ProcessOutput {
            code: Some(self.status),
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
        }
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
    /// Match any command.
    Any,
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
            CommandPattern::Any => true,
        }
    }
}

/// Expectation for a command execution.
#[derive(Debug, Clone)]
pub struct CommandExpectation {
    /// Pattern to match against commands.
    pub pattern: CommandPattern,
    /// Output to return when matched.
    pub output: MockProcessOutput,
    /// Number of times this expectation can be used (None = unlimited).
    pub times: Option<usize>,
    /// Number of times this expectation has been used.
    pub used: usize,
}

impl CommandExpectation {
    /// Create a new expectation.
    pub fn new(pattern: CommandPattern, output: MockProcessOutput) -> Self {
        CommandExpectation {
            pattern,
            output,
            times: None,
            used: 0,
        }
    }

    /// Set the number of times this expectation can be used.
    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    fn available(&self) -> bool {
        match self.times {
            Some(n) => self.used < n,
            None => true,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    expectations: Vec<CommandExpectation>,
    calls: Vec<String>,
    default_output: Option<MockProcessOutput>,
    tools: HashSet<String>,
}

/// Mock process executor for testing command execution.
///
/// Expectations are matched in the order they were added; the first
/// available match wins. Unmatched commands fall back to the default output
/// or fail with "unexpected command".
#[derive(Debug, Default)]
pub struct MockExecutor {
    state: Mutex<MockState>,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        MockExecutor::default()
    }

    fn push(&self, expectation: CommandExpectation) -> &Self {
        self.state.lock().unwrap().expectations.push(expectation);
        self
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&self, cmd: &str, output: MockProcessOutput) -> &Self {
        self.push(CommandExpectation::new(
            CommandPattern::Exact(cmd.to_string()),
            output,
        ))
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&self, prefix: &str, output: MockProcessOutput) -> &Self {
        self.push(CommandExpectation::new(
            CommandPattern::StartsWith(prefix.to_string()),
            output,
        ))
    }

    /// Add an expectation for a command containing a substring.
    pub fn expect_contains(&self, substring: &str, output: MockProcessOutput) -> &Self {
        self.push(CommandExpectation::new(
            CommandPattern::Contains(substring.to_string()),
            output,
        ))
    }

    /// Add a custom expectation.
    pub fn expect_pattern(&self, expectation: CommandExpectation) -> &Self {
        self.push(expectation)
    }

    /// Set a default output for commands that don't match any expectation.
    pub fn set_default(&self, output: MockProcessOutput) -> &Self {
        self.state.lock().unwrap().default_output = Some(output);
        self
    }

    /// Make `program` discoverable through [`CommandRunner::find`].
    pub fn add_tool(&self, program: &str) -> &Self {
        self.state.lock().unwrap().tools.insert(program.to_string());
        self
    }

    /// Get all commands that were called.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Count recorded calls starting with `prefix`.
    pub fn calls_starting_with(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Verify that all expectations with a specific count were satisfied.
    pub fn verify(&self) -> Result<()> {
        let state = self.state.lock().unwrap();
        for (i, exp) in state.expectations.iter().enumerate() {
            if let Some(expected) = exp.times {
                if exp.used != expected {
                    bail!(
                        "expectation {} was used {} times, expected {}",
                        i,
                        exp.used,
                        expected
                    );
                }
            }
        }
        Ok(())
    }
}

impl CommandRunner for MockExecutor {
    fn run(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        let full_cmd = cmd.display_command();
        let mut state = self.state.lock().unwrap();
        state.calls.push(full_cmd.clone());

        let matched = state
            .expectations
            .iter_mut()
            .find(|exp| exp.pattern.matches(&full_cmd) && exp.available())
            .map(|exp| {
                exp.used += 1;
                exp.output.clone()
            });

        let output = match matched.or_else(|| state.default_output.clone()) {
            Some(output) => output,
            None => bail!("unexpected command: {}", full_cmd),
        };

        if output.spawn_error {
            bail!("failed to spawn `{}`", cmd.get_program().display());
        }
        Ok(output.to_output())
    }

    fn find(&self, program: &str) -> Option<PathBuf> {
        let state = self.state.lock().unwrap();
        state
            .tools
            .contains(program)
            .then(|| PathBuf::from("/usr/bin").join(program))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_executor_basic() {
        let exec = MockExecutor::new();

        exec.expect("gcc --version", MockProcessOutput::success("gcc 12.0.0"));
        exec.expect_prefix("apt search", MockProcessOutput::success("curl/jammy"));

        let result = exec.run(&ProcessBuilder::new("gcc").arg("--version")).unwrap();
        assert!(result.success());
        assert_eq!(result.stdout, "gcc 12.0.0");

        let result = exec
            .run(&ProcessBuilder::new("apt").args(["search", "curl"]))
            .unwrap();
        assert!(result.success());
        assert_eq!(exec.calls(), vec!["gcc --version", "apt search curl"]);
    }

    #[test]
    fn test_mock_executor_unexpected_and_spawn_error() {
        let exec = MockExecutor::new();
        assert!(exec.run(&ProcessBuilder::new("unknown")).is_err());

        exec.expect("vcpkg list", MockProcessOutput::spawn_error());
        assert!(exec.run(&ProcessBuilder::new("vcpkg").arg("list")).is_err());
    }

    #[test]
    fn test_mock_executor_times_and_verify() {
        let exec = MockExecutor::new();
        exec.expect_pattern(
            CommandExpectation::new(
                CommandPattern::Contains("pacman -Q".into()),
                MockProcessOutput::failure(1, "error: package 'x' was not found"),
            )
            .times(1),
        );
        exec.set_default(MockProcessOutput::success(""));

        let first = exec.run(&ProcessBuilder::new("pacman").args(["-Q", "x"])).unwrap();
        let second = exec.run(&ProcessBuilder::new("pacman").args(["-Q", "x"])).unwrap();
        assert!(!first.success());
        assert!(second.success());
        exec.verify().unwrap();
    }

    #[test]
    fn test_find_tools() {
        let exec = MockExecutor::new();
        exec.add_tool("brew");
        assert!(exec.find("brew").is_some());
        assert!(exec.find("apt").is_none());
    }
}
