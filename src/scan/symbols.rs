//! Missing-symbol detection through a trial link.
//!
//! All source files are linked into a throwaway binary. When the link fails,
//! undefined symbols are pulled out of the linker diagnostics and grouped by
//! category. Each category carries advisory suggestions; only the suggested
//! libraries ever flow back into resolution, and only on request.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::core::AbstractDependency;
use crate::scan::ScanError;
use crate::util::fs::{is_source_file, relative_path, walk_source_tree};
use crate::util::process::{find_c_compiler, CommandRunner, ProcessBuilder};

/// GNU ld / gold: ``undefined reference to `sym'`` (also with plain or
/// typographic quotes).
static GNU_UNDEFINED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"undefined reference to [`'\x{2018}]([^'`\x{2019}]+)['\x{2019}]").unwrap()
});

/// Apple ld64: `  "_sym", referenced from:`.
static LD64_UNDEFINED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\s*"([^"]+)", referenced from:"#).unwrap());

/// Ordered categorization rules; the first rule with a matching substring wins.
const CATEGORY_RULES: &[(&[&str], &str)] = &[
    (&["print", "color", "terminal"], "print"),
    (&["hash", "map"], "hashmap"),
    (&["embedding", "vector", "ml"], "embedding"),
    (&["activity", "recommend"], "activity"),
    (&["json", "parse"], "json"),
    (&["math", "sqrt", "pow"], "math"),
    (&["thread", "pthread", "mutex"], "threading"),
    (&["curl", "http", "net"], "network"),
    (&["file", "read", "write"], "fileio"),
];

struct CategoryAdvice {
    category: &'static str,
    files: &'static [&'static str],
    libs: &'static [&'static str],
    causes: &'static [&'static str],
}

const CATEGORY_ADVICE: &[CategoryAdvice] = &[
    CategoryAdvice {
        category: "print",
        files: &["utils.c", "print.c", "terminal.c", "colors.c"],
        libs: &["ncurses", "termcap"],
        causes: &[
            "Missing implementation file for printing functions",
            "Need to link terminal/color libraries",
            "Missing utility functions implementation",
        ],
    },
    CategoryAdvice {
        category: "hashmap",
        files: &["hashmap.c", "data_structures.c", "hash.c"],
        libs: &["glib-2.0"],
        causes: &[
            "Missing hashmap implementation file",
            "Need custom data structure library",
            "Consider using GLib hash tables",
        ],
    },
    CategoryAdvice {
        category: "embedding",
        files: &["embeddings.c", "ml.c", "vectors.c", "neural.c"],
        libs: &["blas", "lapack", "openblas", "cblas"],
        causes: &[
            "Missing machine learning implementation",
            "Need linear algebra library",
            "Missing vector computation functions",
        ],
    },
    CategoryAdvice {
        category: "json",
        files: &["json.c", "parser.c"],
        libs: &["jansson", "json-c", "cjson"],
        causes: &[
            "Missing JSON parsing library",
            "Need to install JSON library",
            "Missing custom JSON implementation",
        ],
    },
    CategoryAdvice {
        category: "math",
        files: &[],
        libs: &["m", "gsl", "fftw3"],
        causes: &[
            "Need to link math library (-lm)",
            "Missing advanced math library",
        ],
    },
    CategoryAdvice {
        category: "threading",
        files: &[],
        libs: &["pthread"],
        causes: &[
            "Need to link pthread library (-lpthread)",
            "Missing threading implementation",
        ],
    },
    CategoryAdvice {
        category: "network",
        files: &["network.c", "http.c", "client.c"],
        libs: &["curl", "libcurl"],
        causes: &["Missing network implementation", "Need HTTP client library"],
    },
    CategoryAdvice {
        category: "activity",
        files: &["activities.c", "recommender.c", "engine.c"],
        libs: &[],
        causes: &[
            "Missing core application logic implementation",
            "Need to implement recommendation engine",
        ],
    },
];

/// One undefined symbol reported by the linker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolInfo {
    pub symbol: String,
    /// Always `function`; linkers do not say.
    pub kind: String,
}

/// Undefined symbols sharing a category, with advisory suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDependencyGroup {
    pub category: String,
    pub symbols: Vec<SymbolInfo>,
    pub suggested_files: Vec<String>,
    pub suggested_libs: Vec<String>,
    pub possible_causes: Vec<String>,
}

impl MissingDependencyGroup {
    fn new(category: String) -> Self {
        let (files, libs, causes) = match CATEGORY_ADVICE.iter().find(|a| a.category == category) {
            Some(advice) => (
                to_strings(advice.files),
                to_strings(advice.libs),
                to_strings(advice.causes),
            ),
            None => (
                vec![format!("{}.c", category)],
                Vec::new(),
                vec![format!("Missing implementation file for {} functions", category)],
            ),
        };

        MissingDependencyGroup {
            category,
            symbols: Vec::new(),
            suggested_files: files,
            suggested_libs: libs,
            possible_causes: causes,
        }
    }

    /// Symbol names in this group.
    pub fn symbol_names(&self) -> Vec<&str> {
        self.symbols.iter().map(|s| s.symbol.as_str()).collect()
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Assign a symbol to a category.
///
/// Falls back to the first `_`-delimited token of the lower-cased symbol, or
/// `misc` when that token is empty.
pub fn categorize_symbol(symbol: &str) -> String {
    let lower = symbol.to_lowercase();

    for (needles, category) in CATEGORY_RULES {
        if needles.iter().any(|n| lower.contains(n)) {
            return category.to_string();
        }
    }

    match lower.split('_').next() {
        Some(token) if !token.is_empty() => token.to_string(),
        _ => "misc".to_string(),
    }
}

/// Parse linker output into category groups.
///
/// Groups appear in the order their first symbol was reported; symbols are
/// deduplicated within a group.
pub fn parse_link_errors(output: &str) -> Vec<MissingDependencyGroup> {
    let gnu = GNU_UNDEFINED
        .captures_iter(output)
        .map(|c| (c.get(0).map_or(0, |m| m.start()), c[1].to_string()));
    let ld64 = LD64_UNDEFINED.captures_iter(output).map(|c| {
        let raw = &c[1];
        // ld64 reports C symbols with their leading underscore.
        let symbol = raw.strip_prefix('_').unwrap_or(raw).to_string();
        (c.get(0).map_or(0, |m| m.start()), symbol)
    });

    let mut found: Vec<(usize, String)> = gnu.chain(ld64).collect();
    found.sort_by_key(|(pos, _)| *pos);

    let mut groups: Vec<MissingDependencyGroup> = Vec::new();
    let mut seen = HashSet::new();

    for (_, symbol) in found {
        let category = categorize_symbol(&symbol);
        if !seen.insert((category.clone(), symbol.clone())) {
            continue;
        }

        let idx = match groups.iter().position(|g| g.category == category) {
            Some(idx) => idx,
            None => {
                groups.push(MissingDependencyGroup::new(category));
                groups.len() - 1
            }
        };
        groups[idx].symbols.push(SymbolInfo {
            symbol,
            kind: "function".to_string(),
        });
    }

    groups
}

/// Trial-link every source file under `root` and report undefined symbols.
///
/// Returns an empty list when there are no sources, when no C compiler is
/// available, or when the link succeeds.
pub fn scan_missing_symbols(
    root: &Path,
    runner: &dyn CommandRunner,
) -> Result<Vec<MissingDependencyGroup>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let sources = find_source_files(root)?;
    if sources.is_empty() {
        return Ok(Vec::new());
    }

    let Some(compiler) = find_c_compiler(runner) else {
        tracing::debug!("no C compiler found, skipping missing-symbol scan");
        return Ok(Vec::new());
    };

    let scratch = tempfile::Builder::new()
        .prefix("catalyst-link")
        .tempdir()
        .map_err(|e| ScanError::TrialLink {
            message: e.to_string(),
        })?;
    let output_path = scratch.path().join("catalyst_test_link");

    let cmd = ProcessBuilder::new(&compiler)
        .args(&sources)
        .arg("-o")
        .arg(&output_path)
        .cwd(root);

    let output = match runner.run(&cmd) {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!("trial link could not run: {:#}", e);
            return Ok(Vec::new());
        }
    };

    if output.success() {
        return Ok(Vec::new());
    }

    Ok(parse_link_errors(&output.combined()))
}

/// Suggested libraries across all groups, in first-seen order, as abstract
/// dependencies.
pub fn suggested_dependencies(groups: &[MissingDependencyGroup]) -> Vec<AbstractDependency> {
    let mut seen = HashSet::new();
    groups
        .iter()
        .flat_map(|g| g.suggested_libs.iter())
        .filter(|lib| seen.insert(lib.as_str()))
        .map(|lib| AbstractDependency::new(lib.as_str()))
        .collect()
}

fn find_source_files(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut sources = Vec::new();
    for entry in walk_source_tree(root) {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_source_file(entry.path()) => {
                sources.push(relative_path(root, entry.path()));
            }
            Ok(_) => {}
            Err(e) if e.depth() == 0 => {
                return Err(ScanError::Walk {
                    path: root.to_path_buf(),
                    source: e,
                })
            }
            Err(e) => tracing::warn!("skipping unreadable entry: {}", e),
        }
    }
    Ok(sources)
}
