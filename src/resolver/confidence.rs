//! Candidate scoring.
//!
//! Scores are heuristics in `0..=100`. The name scorer is pluggable through
//! [`ConfidenceScorer`] so a different similarity metric can replace the
//! positional one without touching the search parsers.

use std::path::Path;

/// Results below this are dropped while parsing list-style search output.
pub const LIST_FLOOR: u8 = 20;

/// Minimum confidence for [`best_match`](super::search::best_match).
pub const BEST_MATCH_FLOOR: u8 = 50;

/// A lone interactive candidate at or above this is selected without asking.
pub const AUTO_SELECT: u8 = 80;

/// Include directories that make a header path more believable.
const INCLUDE_DIRS: &[&str] = &["/usr/include/", "/usr/local/include/", "/opt/include/"];

/// Scores a package-name candidate against the dependency being searched.
pub trait ConfidenceScorer {
    fn score(&self, candidate: &str, target: &str) -> u8;
}

/// The default scorer: exact match, library naming conventions, substring
/// containment, then a positional character match as a last resort.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalScorer;

impl ConfidenceScorer for PositionalScorer {
    fn score(&self, candidate: &str, target: &str) -> u8 {
        name_confidence(candidate, target)
    }
}

impl<F> ConfidenceScorer for F
where
    F: Fn(&str, &str) -> u8,
{
    fn score(&self, candidate: &str, target: &str) -> u8 {
        self(candidate, target)
    }
}

/// How well a package name matches a dependency name.
///
/// | rule                                              | score |
/// |---------------------------------------------------|-------|
/// | case-insensitive equality                         | 100   |
/// | equals `lib<t>`, `<t>-dev`, `<t>-devel`, ...      | 90    |
/// | contains one of those naming patterns             | 60    |
/// | contains the target                               | 80    |
/// | is contained in the target                        | 70    |
/// | positional similarity over 60%, halved            | <= 50 |
///
/// Naming patterns are checked before plain containment, so `libjansson4`
/// scores 60 against `jansson` while `jansson-utils` scores 80.
pub fn name_confidence(candidate: &str, target: &str) -> u8 {
    let cand = candidate.to_lowercase();
    let target = target.to_lowercase();

    if cand == target {
        return 100;
    }

    // Naming patterns must stay ahead of containment: `libjansson4` has to
    // score 60, not 80, against `jansson`.
    let patterns = [
        format!("lib{}", target),
        format!("{}-dev", target),
        format!("{}-devel", target),
        format!("lib{}-dev", target),
        format!("lib{}-devel", target),
    ];
    if patterns.iter().any(|p| cand == *p) {
        return 90;
    }
    if patterns.iter().any(|p| cand.contains(p.as_str())) {
        return 60;
    }

    if cand.contains(&target) {
        return 80;
    }
    if target.contains(&cand) {
        return 70;
    }

    positional_similarity(&cand, &target)
        .filter(|similarity| *similarity > 60)
        .map_or(0, |similarity| similarity / 2)
}

/// Percentage of equal characters at equal positions over the shorter
/// string. No alignment is attempted, so a `lib` prefix shifts every
/// position and scores poorly.
fn positional_similarity(a: &str, b: &str) -> Option<u8> {
    let min_len = a.chars().count().min(b.chars().count());
    if min_len == 0 {
        return None;
    }

    let matches = a.chars().zip(b.chars()).filter(|(x, y)| x == y).count();
    u8::try_from(matches * 100 / min_len).ok()
}

/// How well a file path reported by a file-search tool matches a
/// dependency's header.
///
/// Non-headers score 0; `<dep>.h` scores 95; a header under a standard
/// include directory whose name contains the dependency scores 80; any other
/// header whose name contains it scores 60.
pub fn path_confidence(file_path: &str, target: &str) -> u8 {
    let path = file_path.to_lowercase();
    let target = target.to_lowercase();

    if !path.ends_with(".h") && !path.ends_with(".hpp") {
        return 0;
    }

    let file_name = Path::new(&path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if file_name == format!("{}.h", target) || file_name == format!("{}.hpp", target) {
        return 95;
    }

    if !file_name.contains(&target) {
        return 0;
    }

    if INCLUDE_DIRS.iter().any(|dir| path.contains(dir)) {
        80
    } else {
        60
    }
}
