//! Abstract-to-concrete package resolution.
//!
//! The static [`PackageTable`] is authoritative when it has an answer. On a
//! miss, [`DynamicSearch`] queries the package manager itself and the
//! candidates are ranked by confidence. In batch mode the best match above
//! the floor wins; in interactive mode a [`CandidatePicker`] asks the user
//! unless a single candidate is clearly right.

pub mod confidence;
pub mod errors;
pub mod search;
pub mod table;

pub use confidence::{
    name_confidence, path_confidence, ConfidenceScorer, PositionalScorer, AUTO_SELECT,
    BEST_MATCH_FLOOR, LIST_FLOOR,
};
pub use errors::ResolveError;
pub use search::{best_match, dedup_results, DynamicSearch, SearchResult};
pub use table::{translate, PackageTable};

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::{AbstractDependency, PackageManagerId, Resolution};
use crate::util::process::CommandRunner;

/// Candidates offered to a picker at most.
pub const MAX_CHOICES: usize = 10;

/// Where a resolution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionSource {
    /// Static table or user override.
    Table,
    /// Best live-search match.
    Search,
    /// Chosen by the user.
    Picked,
    /// Nothing usable was found, or the user skipped it.
    Unresolved,
}

/// One dependency together with how it resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDependency {
    pub dependency: AbstractDependency,
    pub resolution: Resolution,
    pub source: ResolutionSource,
}

impl ResolvedDependency {
    /// The concrete package, if one is needed.
    pub fn package(&self) -> Option<&str> {
        self.resolution.package()
    }
}

/// Lets a user choose among search candidates.
pub trait CandidatePicker {
    /// Return the index of the chosen candidate, or `None` to skip the
    /// dependency.
    fn pick(
        &self,
        dep: &AbstractDependency,
        candidates: &[SearchResult],
    ) -> Result<Option<usize>, ResolveError>;
}

/// Resolves abstract dependencies for one package manager at a time.
pub struct Resolver<'a> {
    table: PackageTable,
    search: DynamicSearch<'a>,
    picker: Option<&'a dyn CandidatePicker>,
}

impl<'a> Resolver<'a> {
    /// Resolver over the built-in table, searching through `runner`.
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Resolver {
            table: PackageTable::builtin(),
            search: DynamicSearch::new(runner),
            picker: None,
        }
    }

    /// Use a table with user overrides.
    pub fn with_table(mut self, table: PackageTable) -> Self {
        self.table = table;
        self
    }

    /// Use a custom search (e.g. a different scorer).
    pub fn with_search(mut self, search: DynamicSearch<'a>) -> Self {
        self.search = search;
        self
    }

    /// Ask `picker` in interactive mode.
    pub fn with_picker(mut self, picker: &'a dyn CandidatePicker) -> Self {
        self.picker = Some(picker);
        self
    }

    /// Table lookup only.
    pub fn translate(&self, dep: &AbstractDependency, pm: PackageManagerId) -> Resolution {
        self.table.translate(dep.as_str(), pm)
    }

    /// Table lookup, then the best live-search match above the floor.
    pub fn translate_with_search(
        &self,
        dep: &AbstractDependency,
        pm: PackageManagerId,
    ) -> Resolution {
        match self.translate(dep, pm) {
            Resolution::NotFound => {
                let results = self.search.search(dep, pm);
                match best_match(&results) {
                    Some(best) => Resolution::Package(best.package_name.clone()),
                    None => Resolution::NotFound,
                }
            }
            found => found,
        }
    }

    /// Resolve one dependency.
    pub fn resolve(
        &self,
        dep: &AbstractDependency,
        pm: PackageManagerId,
        interactive: bool,
    ) -> Result<ResolvedDependency, ResolveError> {
        let resolved = |resolution, source| ResolvedDependency {
            dependency: dep.clone(),
            resolution,
            source,
        };

        let from_table = self.translate(dep, pm);
        if from_table.is_found() {
            return Ok(resolved(from_table, ResolutionSource::Table));
        }

        let results = self.search.search(dep, pm);

        let picker = match self.picker {
            Some(picker) if interactive => picker,
            _ => {
                if interactive {
                    tracing::warn!("no prompt available, choosing `{}` automatically", dep);
                }
                return Ok(match best_match(&results) {
                    Some(best) => resolved(
                        Resolution::Package(best.package_name.clone()),
                        ResolutionSource::Search,
                    ),
                    None => resolved(Resolution::NotFound, ResolutionSource::Unresolved),
                });
            }
        };

        if results.is_empty() {
            return Ok(resolved(Resolution::NotFound, ResolutionSource::Unresolved));
        }

        if let [only] = results.as_slice() {
            if only.confidence >= AUTO_SELECT {
                return Ok(resolved(
                    Resolution::Package(only.package_name.clone()),
                    ResolutionSource::Search,
                ));
            }
        }

        let choices = &results[..results.len().min(MAX_CHOICES)];
        Ok(match picker.pick(dep, choices)?.and_then(|i| choices.get(i)) {
            Some(chosen) => resolved(
                Resolution::Package(chosen.package_name.clone()),
                ResolutionSource::Picked,
            ),
            None => resolved(Resolution::NotFound, ResolutionSource::Unresolved),
        })
    }

    /// Resolve every dependency, in input order.
    pub fn resolve_packages(
        &self,
        deps: &[AbstractDependency],
        pm: PackageManagerId,
        interactive: bool,
    ) -> Result<Vec<ResolvedDependency>, ResolveError> {
        tracing::info!("resolving {} dependencies for {}", deps.len(), pm);

        deps.iter()
            .enumerate()
            .map(|(i, dep)| {
                let resolved = self.resolve(dep, pm, interactive)?;
                match (&resolved.resolution, resolved.source) {
                    (Resolution::StandardLibrary, _) => {
                        tracing::debug!("[{}/{}] {}: standard library", i + 1, deps.len(), dep)
                    }
                    (Resolution::Package(pkg), source) => tracing::debug!(
                        "[{}/{}] {}: {} ({:?})",
                        i + 1,
                        deps.len(),
                        dep,
                        pkg,
                        source
                    ),
                    (Resolution::NotFound, _) => tracing::debug!(
                        "[{}/{}] {}: not found, likely a local header",
                        i + 1,
                        deps.len(),
                        dep
                    ),
                }
                Ok(resolved)
            })
            .collect()
    }

    /// Map each dependency that needs a package to that package.
    ///
    /// Standard-library and unresolved dependencies are left out.
    pub fn batch_search(
        &self,
        deps: &[AbstractDependency],
        pm: PackageManagerId,
        interactive: bool,
    ) -> Result<BTreeMap<AbstractDependency, String>, ResolveError> {
        Ok(self
            .resolve_packages(deps, pm, interactive)?
            .into_iter()
            .filter_map(|r| match r.resolution {
                Resolution::Package(pkg) => Some((r.dependency, pkg)),
                _ => None,
            })
            .collect())
    }
}
