//! Live package-manager search.
//!
//! Each backend prints search results in its own format. The parsers here
//! turn that text into scored [`SearchResult`]s; [`DynamicSearch`] runs the
//! searches for every name variant worth trying and merges the results.

use std::collections::HashMap;

use serde::Serialize;

use crate::core::{AbstractDependency, PackageManagerId as Pm};
use crate::resolver::confidence::{
    path_confidence, ConfidenceScorer, PositionalScorer, BEST_MATCH_FLOOR, LIST_FLOOR,
};
use crate::util::process::{CommandRunner, ProcessBuilder};

/// One candidate package found by a live search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub package_name: String,
    pub description: String,
    /// 0 to 100.
    pub confidence: u8,
}

impl SearchResult {
    fn new(name: impl Into<String>, description: impl Into<String>, confidence: u8) -> Self {
        SearchResult {
            package_name: name.into(),
            description: description.into(),
            confidence,
        }
    }
}

/// Name variants searched for a dependency on each backend.
pub fn search_terms(dep: &str, pm: Pm) -> Vec<String> {
    match pm {
        Pm::Apt => vec![
            dep.to_string(),
            format!("lib{}", dep),
            format!("{}-dev", dep),
            format!("lib{}-dev", dep),
        ],
        Pm::Dnf | Pm::Yum | Pm::Zypper => vec![
            dep.to_string(),
            format!("{}-devel", dep),
            format!("lib{}-devel", dep),
        ],
        Pm::Pacman | Pm::Brew | Pm::Scoop => vec![dep.to_string(), format!("lib{}", dep)],
        Pm::Vcpkg | Pm::Choco | Pm::Winget => vec![dep.to_string()],
    }
}

/// The backend's native search command for one term.
pub fn search_command(pm: Pm, term: &str) -> ProcessBuilder {
    match pm {
        Pm::Apt => ProcessBuilder::new("apt").args(["search", term]),
        Pm::Dnf => ProcessBuilder::new("dnf").args(["search", term]),
        Pm::Yum => ProcessBuilder::new("yum").args(["search", term]),
        Pm::Pacman => ProcessBuilder::new("pacman").args(["-Ss", term]),
        Pm::Zypper => ProcessBuilder::new("zypper").args(["--non-interactive", "search", term]),
        Pm::Brew => ProcessBuilder::new("brew").args(["search", term]),
        Pm::Vcpkg => ProcessBuilder::new("vcpkg").args(["search", term]),
        Pm::Choco => ProcessBuilder::new("choco").args(["search", term]),
        Pm::Winget => {
            ProcessBuilder::new("winget").args(["search", term, "--accept-source-agreements"])
        }
        Pm::Scoop => ProcessBuilder::new("scoop").args(["search", term]),
    }
}

/// `apt-file search <dep>.h`, which finds packages by the headers they ship.
pub fn header_search_command(dep: &str) -> ProcessBuilder {
    ProcessBuilder::new("apt-file").args(["search", &format!("{}.h", dep)])
}

/// Parse a backend's search output, scoring names against `dep`.
///
/// Results under [`LIST_FLOOR`] are dropped.
pub fn parse_search_output(
    pm: Pm,
    output: &str,
    dep: &str,
    scorer: &dyn ConfidenceScorer,
) -> Vec<SearchResult> {
    let raw = match pm {
        Pm::Apt => parse_apt(output),
        Pm::Dnf | Pm::Yum => parse_dnf(output),
        Pm::Pacman => parse_pacman(output),
        Pm::Zypper => parse_zypper(output),
        Pm::Brew => parse_brew(output),
        Pm::Vcpkg => parse_vcpkg(output),
        Pm::Choco => parse_choco(output),
        Pm::Winget => parse_winget(output),
        Pm::Scoop => parse_scoop(output),
    };

    raw.into_iter()
        .filter_map(|(name, description)| {
            let confidence = scorer.score(&name, dep);
            (confidence >= LIST_FLOOR).then(|| SearchResult::new(name, description, confidence))
        })
        .collect()
}

/// Parse `apt-file search` output (`package: /path/to/file`).
pub fn parse_apt_file_output(output: &str, dep: &str) -> Vec<SearchResult> {
    output
        .lines()
        .filter_map(|line| line.trim().split_once(':'))
        .filter_map(|(pkg, path)| {
            let (pkg, path) = (pkg.trim(), path.trim());
            let confidence = path_confidence(path, dep);
            (confidence > 0 && !pkg.is_empty())
                .then(|| SearchResult::new(pkg, format!("Provides {}", path), confidence))
        })
        .collect()
}

type Candidate = (String, String);

/// `name/suite version arch` header lines, description on the next
/// indented line.
fn parse_apt(output: &str) -> Vec<Candidate> {
    parse_header_then_description(output, |first| {
        first.split_once('/').map(|(name, _)| name.to_string())
    })
}

/// `repo/name version` header lines, description on the next indented line.
fn parse_pacman(output: &str) -> Vec<Candidate> {
    parse_header_then_description(output, |first| {
        first.split_once('/').map(|(_, name)| name.to_string())
    })
}

fn parse_header_then_description(
    output: &str,
    name_of: impl Fn(&str) -> Option<String>,
) -> Vec<Candidate> {
    let mut results: Vec<Candidate> = Vec::new();

    for line in output.lines() {
        if line.trim().is_empty() || line.starts_with("WARNING") {
            continue;
        }

        if line.starts_with(char::is_whitespace) {
            if let Some(last) = results.last_mut() {
                if last.1.is_empty() {
                    last.1 = line.trim().to_string();
                }
            }
            continue;
        }

        let mut fields = line.split_whitespace();
        if let Some(name) = fields.next().and_then(&name_of) {
            if !name.is_empty() {
                results.push((name, String::new()));
            }
        }
    }

    results
}

/// `name.arch : summary`, with `===` section banners.
fn parse_dnf(output: &str) -> Vec<Candidate> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.contains("==="))
        .filter_map(|line| line.split_once(" : "))
        .map(|(name_arch, summary)| {
            let name_arch = name_arch.trim();
            let name = name_arch
                .rsplit_once('.')
                .map_or(name_arch, |(name, _arch)| name);
            (name.to_string(), summary.trim().to_string())
        })
        .collect()
}

/// `S | Name | Summary | Type` table.
fn parse_zypper(output: &str) -> Vec<Candidate> {
    output
        .lines()
        .filter(|line| line.contains('|'))
        .filter_map(|line| {
            let cols: Vec<&str> = line.split('|').map(str::trim).collect();
            let name = *cols.get(1)?;
            let summary = cols.get(2).copied().unwrap_or_default();
            (!name.is_empty() && name != "Name" && !name.starts_with('-'))
                .then(|| (name.to_string(), summary.to_string()))
        })
        .collect()
}

/// One formula or cask per token, with `==>` section headers.
fn parse_brew(output: &str) -> Vec<Candidate> {
    output
        .lines()
        .filter(|line| !line.trim_start().starts_with("==>"))
        .flat_map(str::split_whitespace)
        .map(|name| (name.to_string(), "Homebrew formula".to_string()))
        .collect()
}

/// `name  version  description`; feature rows (`name[feature]`) are skipped.
fn parse_vcpkg(output: &str) -> Vec<Candidate> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let name = fields.next()?;
            if name.contains('[') {
                return None;
            }
            let rest: Vec<&str> = fields.collect();
            (!rest.is_empty()).then(|| (name.to_string(), rest.join(" ")))
        })
        .collect()
}

/// `name version [Approved]`, with a version banner and a count footer.
fn parse_choco(output: &str) -> Vec<Candidate> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("Chocolatey v") && !line.ends_with("packages found."))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let name = fields.next()?;
            Some((name.to_string(), fields.collect::<Vec<_>>().join(" ")))
        })
        .collect()
}

/// Column table headed by `Name  Id  Version ...`; the `Id` column is what
/// `winget install --id` takes.
fn parse_winget(output: &str) -> Vec<Candidate> {
    let mut lines = output
        .lines()
        // progress spinners are redrawn with carriage returns
        .map(|line| line.rsplit('\r').next().unwrap_or(line));

    let id_col = loop {
        let Some(line) = lines.next() else {
            return Vec::new();
        };
        if line.contains(" Id ") && line.contains("Version") {
            match line.find(" Id ") {
                Some(pos) => break line[..pos + 1].chars().count(),
                None => return Vec::new(),
            }
        }
    };

    lines
        .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('-'))
        .filter_map(|line| {
            let name: String = line.chars().take(id_col).collect();
            let rest: String = line.chars().skip(id_col).collect();
            let id = rest.split_whitespace().next()?;
            Some((id.to_string(), name.trim().to_string()))
        })
        .collect()
}

/// `Name Version Source Binaries` table, or the older `'bucket' bucket:`
/// listing with `    name (version)` rows.
fn parse_scoop(output: &str) -> Vec<Candidate> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty()
                && !line.starts_with("Results from")
                && !line.ends_with("bucket:")
                && !line.starts_with('-')
                && !line.starts_with("Name ")
        })
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let name = fields.next()?;
            let version = fields.next().unwrap_or_default().trim_matches(['(', ')']);
            Some((name.to_string(), version.to_string()))
        })
        .collect()
}

/// Keep the highest-confidence result per package name, ordered by
/// descending confidence (ties by name).
pub fn dedup_results(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut best: HashMap<String, SearchResult> = HashMap::new();

    for result in results {
        match best.get(&result.package_name) {
            Some(existing) if existing.confidence >= result.confidence => {}
            _ => {
                best.insert(result.package_name.clone(), result);
            }
        }
    }

    let mut deduped: Vec<SearchResult> = best.into_values().collect();
    deduped.sort_by(|a, b| {
        b.confidence
            .cmp(&a.confidence)
            .then_with(|| a.package_name.cmp(&b.package_name))
    });
    deduped
}

/// The top result, if it clears [`BEST_MATCH_FLOOR`].
///
/// Expects results ordered as [`dedup_results`] returns them.
pub fn best_match(results: &[SearchResult]) -> Option<&SearchResult> {
    results
        .first()
        .filter(|best| best.confidence >= BEST_MATCH_FLOOR)
}

/// Runs live searches through a [`CommandRunner`].
pub struct DynamicSearch<'a> {
    runner: &'a dyn CommandRunner,
    scorer: Box<dyn ConfidenceScorer + 'a>,
}

impl<'a> DynamicSearch<'a> {
    /// Search with the default [`PositionalScorer`].
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        DynamicSearch {
            runner,
            scorer: Box::new(PositionalScorer),
        }
    }

    /// Replace the name scorer.
    pub fn with_scorer(mut self, scorer: impl ConfidenceScorer + 'a) -> Self {
        self.scorer = Box::new(scorer);
        self
    }

    /// Search `pm` for packages providing `dep`.
    ///
    /// A term whose search command cannot run, or exits non-zero,
    /// contributes nothing; the remaining terms are still tried.
    pub fn search(&self, dep: &AbstractDependency, pm: Pm) -> Vec<SearchResult> {
        let dep = dep.as_str();
        let mut results = Vec::new();

        if pm == Pm::Apt && self.runner.find("apt-file").is_some() {
            if let Some(stdout) = self.run_quietly(&header_search_command(dep)) {
                results.extend(parse_apt_file_output(&stdout, dep));
            }
        }

        for term in search_terms(dep, pm) {
            if let Some(stdout) = self.run_quietly(&search_command(pm, &term)) {
                results.extend(parse_search_output(pm, &stdout, dep, self.scorer.as_ref()));
            }
        }

        let results = dedup_results(results);
        tracing::debug!("{} candidates for `{}` on {}", results.len(), dep, pm);
        results
    }

    fn run_quietly(&self, cmd: &ProcessBuilder) -> Option<String> {
        match self.runner.run(cmd) {
            Ok(output) if output.success() => Some(output.stdout),
            Ok(output) => {
                tracing::debug!(
                    "`{}` exited with {:?}",
                    cmd.display_command(),
                    output.code
                );
                None
            }
            Err(e) => {
                tracing::debug!("`{}` failed: {:#}", cmd.display_command(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockExecutor, MockProcessOutput};

    fn names(results: &[SearchResult]) -> Vec<(&str, u8)> {
        results
            .iter()
            .map(|r| (r.package_name.as_str(), r.confidence))
            .collect()
    }

    #[test]
    fn test_parse_apt_search() {
        let output = "Sorting...\nFull Text Search...\n\
            jansson/jammy 2.13.1-1 amd64\n  C library for JSON\n\n\
            libjansson-dev/jammy 2.13.1-1 amd64\n  C library for JSON (dev)\n\n\
            libjansson4/jammy,now 2.13.1-1 amd64 [installed]\n  C library for JSON (shared)\n";

        let results = parse_search_output(Pm::Apt, output, "jansson", &PositionalScorer);
        assert_eq!(
            names(&results),
            vec![("jansson", 100), ("libjansson-dev", 90), ("libjansson4", 60)]
        );
        assert_eq!(results[2].description, "C library for JSON (shared)");
    }

    #[test]
    fn test_parse_apt_file() {
        let output = "libjansson-dev: /usr/include/jansson.h\n\
                      libjansson-dev: /usr/include/jansson_config.h\n\
                      libjansson-doc: /usr/share/doc/jansson/index.html\n";
        let results = parse_apt_file_output(output, "jansson");
        assert_eq!(
            names(&results),
            vec![("libjansson-dev", 95), ("libjansson-dev", 80)]
        );
        assert_eq!(results[0].description, "Provides /usr/include/jansson.h");
    }

    #[test]
    fn test_parse_dnf() {
        let output = "Last metadata expiration check: 0:01:02 ago.\n\
            ======== Name Exactly Matched: jansson ========\n\
            jansson.x86_64 : C library for encoding JSON\n\
            ======== Name & Summary Matched: jansson ========\n\
            jansson-devel.x86_64 : Development files for jansson\n\
            compat-openssl1.1.x86_64 : Compatibility version of OpenSSL\n";

        let results = parse_search_output(Pm::Dnf, output, "jansson", &PositionalScorer);
        assert_eq!(names(&results), vec![("jansson", 100), ("jansson-devel", 90)]);
        assert_eq!(results[1].description, "Development files for jansson");
    }

    #[test]
    fn test_parse_pacman() {
        let output = "extra/jansson 2.14-4\n    C library for JSON\n\
                      community/python-jansson 1.0-1\n    Bindings\n";
        let results = parse_search_output(Pm::Pacman, output, "jansson", &PositionalScorer);
        assert_eq!(names(&results), vec![("jansson", 100), ("python-jansson", 80)]);
        assert_eq!(results[0].description, "C library for JSON");
    }

    #[test]
    fn test_parse_zypper() {
        let output = "Loading repository data...\n\n\
            S | Name             | Summary                 | Type\n\
            --+------------------+-------------------------+--------\n\
              | libjansson-devel | Development files       | package\n\
            i | libjansson4      | C library for JSON      | package\n";
        let results = parse_search_output(Pm::Zypper, output, "jansson", &PositionalScorer);
        assert_eq!(
            names(&results),
            vec![("libjansson-devel", 90), ("libjansson4", 60)]
        );
    }

    #[test]
    fn test_parse_brew() {
        let output = "==> Formulae\njansson\njanet\n\n==> Casks\njansson-gui\n";
        let results = parse_search_output(Pm::Brew, output, "jansson", &PositionalScorer);
        assert_eq!(names(&results), vec![("jansson", 100), ("jansson-gui", 80)]);
    }

    #[test]
    fn test_parse_vcpkg() {
        let output = "jansson            2.14#1    C library for JSON\n\
                      jansson[dev]                 Development feature\n\
                      The result may be outdated. Run `git pull` to get the latest results.\n";
        let results = parse_search_output(Pm::Vcpkg, output, "jansson", &PositionalScorer);
        assert_eq!(names(&results), vec![("jansson", 100)]);
        assert_eq!(results[0].description, "2.14#1 C library for JSON");
    }

    #[test]
    fn test_parse_choco() {
        let output = "Chocolatey v2.2.2\nsqlite 3.45.1 [Approved]\nsqlite.shell 3.45.1 [Approved]\n2 packages found.\n";
        let results = parse_search_output(Pm::Choco, output, "sqlite", &PositionalScorer);
        assert_eq!(names(&results), vec![("sqlite", 100), ("sqlite.shell", 80)]);
    }

    #[test]
    fn test_parse_winget() {
        let output = "\r-\r\\\rName            Id                   Version Source\n\
                      -----------------------------------------------------\n\
                      SQLite          SQLite.SQLite        3.45.1  winget\n\
                      DB Browser      DBBrowser.DB         3.12.2  winget\n";
        let results = parse_search_output(Pm::Winget, output, "sqlite", &PositionalScorer);
        assert_eq!(names(&results), vec![("SQLite.SQLite", 80)]);
        assert_eq!(results[0].description, "SQLite");
    }

    #[test]
    fn test_parse_scoop() {
        let output = "Results from local buckets...\n\n\
                      Name    Version Source Binaries\n\
                      ----    ------- ------ --------\n\
                      sqlite  3.45.1  main\n";
        let results = parse_search_output(Pm::Scoop, output, "sqlite", &PositionalScorer);
        assert_eq!(names(&results), vec![("sqlite", 100)]);

        let legacy = "'main' bucket:\n    sqlite (3.45.1)\n";
        let results = parse_search_output(Pm::Scoop, legacy, "sqlite", &PositionalScorer);
        assert_eq!(results[0].description, "3.45.1");
    }

    #[test]
    fn test_dedup_keeps_max_confidence() {
        let results = vec![
            SearchResult::new("libjansson-dev", "a", 60),
            SearchResult::new("jansson", "b", 100),
            SearchResult::new("libjansson-dev", "c", 95),
            SearchResult::new("libjansson4", "d", 60),
            SearchResult::new("jansson", "e", 80),
        ];
        let deduped = dedup_results(results);
        assert_eq!(
            names(&deduped),
            vec![("jansson", 100), ("libjansson-dev", 95), ("libjansson4", 60)]
        );
        assert_eq!(deduped[1].description, "c");
    }

    #[test]
    fn test_best_match_floor() {
        let low = vec![SearchResult::new("janssox", "", 42)];
        assert!(best_match(&low).is_none());
        assert!(best_match(&[]).is_none());

        let ok = vec![SearchResult::new("jansson", "", 100)];
        assert_eq!(best_match(&ok).map(|r| r.package_name.as_str()), Some("jansson"));
    }

    #[test]
    fn test_dynamic_search_jansson_on_apt() {
        let exec = MockExecutor::new();
        exec.expect(
            "apt search jansson",
            MockProcessOutput::success(
                "jansson/jammy 2.13 amd64\n  JSON\nlibjansson4/jammy 2.13 amd64\n  JSON\n",
            ),
        );
        exec.set_default(MockProcessOutput::success(""));

        let search = DynamicSearch::new(&exec);
        let results = search.search(&AbstractDependency::new("jansson"), Pm::Apt);

        assert_eq!(names(&results), vec![("jansson", 100), ("libjansson4", 60)]);
        assert_eq!(best_match(&results).map(|r| r.package_name.as_str()), Some("jansson"));
        // apt-file is not installed, so only the four apt terms ran
        assert_eq!(exec.calls_starting_with("apt search"), 4);
        assert_eq!(exec.calls_starting_with("apt-file"), 0);
    }

    #[test]
    fn test_failed_terms_are_swallowed() {
        let exec = MockExecutor::new();
        exec.add_tool("apt-file");
        exec.expect("apt-file search jansson.h", MockProcessOutput::spawn_error());
        exec.expect("apt search jansson", MockProcessOutput::failure(100, "E: lock"));
        exec.expect(
            "apt search libjansson",
            MockProcessOutput::success("libjansson-dev/jammy 2.13 amd64\n"),
        );

        let results = DynamicSearch::new(&exec).search(&AbstractDependency::new("jansson"), Pm::Apt);
        assert_eq!(names(&results), vec![("libjansson-dev", 90)]);
        assert_eq!(exec.calls().len(), 5);
    }

    #[test]
    fn test_custom_scorer() {
        let exec = MockExecutor::new();
        exec.set_default(MockProcessOutput::success("jansson\n"));

        let search = DynamicSearch::new(&exec).with_scorer(|_: &str, _: &str| 33u8);
        let results = search.search(&AbstractDependency::new("jansson"), Pm::Vcpkg);
        // vcpkg rows need a description column
        assert!(results.is_empty());

        let results = search.search(&AbstractDependency::new("jansson"), Pm::Brew);
        assert_eq!(names(&results), vec![("jansson", 33)]);
    }
}
