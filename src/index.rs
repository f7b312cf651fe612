//! Module `index` implements the [Index] facade: the single entry point
//! that holds the two generation maps, the target interner, the
//! generation counter and the commit table, and exposes every query
//! plus the single [Index::add_commit] mutator.
//!
//! Concurrency discipline: one `parking_lot::RwLock` guards both
//! generation maps as a unit. The interner has its own internal locking
//! and sits outside that lock. `commit_to_generation` is a
//! `dashmap::DashMap`, a finely-locked concurrent map satisfying the
//! `get`/insert-if-absent requirement without a single coarse lock.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::mapref::entry::Entry as DashEntry;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::core::{
    render_target, BuildPackage, Changes, ExternalTarget, Generation, InternalRawBuildRule,
    PackagePath, RuleName, TargetHandle,
};
use crate::delta::{compute_deltas, InternalChanges, InternalPackage, InternalRule, PackageDelta, RuleDelta};
use crate::error::{DisplayCommit, Error, Result};
use crate::gen_map::GenerationMap;
use crate::interner::Interner;

/// A build rule as handed back to the caller: the host's opaque node
/// payload plus the targets it depends on, with handles translated back
/// to external targets.
#[derive(Debug, Clone)]
pub struct ExternalRule<T, N> {
    pub target_node: N,
    pub deps: Vec<T>,
}

struct Maps<N> {
    package_map: GenerationMap<PackagePath, Vec<RuleName>>,
    rule_map: GenerationMap<TargetHandle, InternalRawBuildRule<N>>,
}

impl<N> Maps<N> {
    fn new() -> Self {
        Maps {
            package_map: GenerationMap::new(),
            rule_map: GenerationMap::new(),
        }
    }
}

/// The versioned, concurrently-queried index of a build graph.
///
/// `T` is the host's external target type, `N` is the host's opaque
/// rule-node payload type, `C` is the host's opaque commit identifier
/// type, and `F` is the injected target-string parser
/// (`//<dir>:<name> -> T`).
pub struct Index<T, N, C, F>
where
    T: ExternalTarget,
    F: Fn(&str) -> T,
{
    name: String,
    parser: F,
    interner: Interner<T>,
    generation: AtomicU32,
    commit_to_generation: DashMap<C, Generation>,
    maps: RwLock<Maps<N>>,
}

impl<T, N, C, F> Index<T, N, C, F>
where
    T: ExternalTarget,
    N: Clone + PartialEq,
    C: Clone + Eq + std::hash::Hash + std::fmt::Debug,
    F: Fn(&str) -> T,
{
    /// Create an empty index, identified by `name` for diagnostics, that
    /// uses `parser` to turn `//<dir>:<name>` strings back into the
    /// host's external target type.
    pub fn new(name: impl Into<String>, parser: F) -> Self {
        Index {
            name: name.into(),
            parser,
            interner: Interner::new(),
            generation: AtomicU32::new(0),
            commit_to_generation: DashMap::new(),
            maps: RwLock::new(Maps::new()),
        }
    }

    /// The diagnostic name this index was constructed with.
    pub fn to_name(&self) -> &str {
        &self.name
    }

    /// The generation a given commit was recorded at, or `None` if
    /// `commit` was never applied.
    pub fn get_generation(&self, commit: &C) -> Option<Generation> {
        self.commit_to_generation.get(commit).map(|e| *e)
    }

    /// The current generation: the generation the most recent non-empty
    /// commit advanced to, or `0` if no non-empty commit has ever been
    /// applied.
    pub fn current_generation(&self) -> Generation {
        self.generation.load(Ordering::Acquire)
    }

    /// Look up one target's rule at generation `g`.
    pub fn get_target_node(&self, g: Generation, target: &T) -> Option<ExternalRule<T, N>> {
        let handle = self.interner.get(target)?;
        let (node, deps) = {
            let maps = self.maps.read();
            let rule = maps.rule_map.get_version(&handle, g)?;
            (rule.target_node.clone(), rule.deps.clone())
        };
        Some(ExternalRule {
            target_node: node,
            deps: deps.iter().filter_map(|h| self.interner.lookup(*h)).collect(),
        })
    }

    /// Look up several targets' rules at generation `g` in one lock
    /// acquisition. The result preserves input order; an absent target
    /// or rule is `None` at that position.
    pub fn get_target_nodes(&self, g: Generation, targets: &[T]) -> Vec<Option<ExternalRule<T, N>>> {
        let handles: Vec<Option<TargetHandle>> =
            targets.iter().map(|t| self.interner.get(t)).collect();

        let raw: Vec<Option<(N, Vec<TargetHandle>)>> = {
            let maps = self.maps.read();
            handles
                .iter()
                .map(|h| {
                    h.and_then(|h| maps.rule_map.get_version(&h, g))
                        .map(|r| (r.target_node.clone(), r.deps.clone()))
                })
                .collect()
        };

        raw.into_iter()
            .map(|opt| {
                opt.map(|(target_node, deps)| ExternalRule {
                    target_node,
                    deps: deps.iter().filter_map(|h| self.interner.lookup(*h)).collect(),
                })
            })
            .collect()
    }

    /// BFS closure of `target`'s outgoing edges at generation `g`,
    /// excluding `target` itself. The entire walk runs under a single
    /// read-lock acquisition.
    pub fn get_transitive_deps(&self, g: Generation, target: &T) -> Vec<T> {
        let root = match self.interner.get(target) {
            Some(h) => h,
            None => return Vec::new(),
        };

        let mut visited: HashSet<TargetHandle> = HashSet::new();
        let mut frontier: VecDeque<TargetHandle> = VecDeque::new();
        visited.insert(root);
        frontier.push_back(root);

        let mut ordered = Vec::new();
        {
            let maps = self.maps.read();
            while let Some(h) = frontier.pop_front() {
                if let Some(rule) = maps.rule_map.get_version(&h, g) {
                    for &dep in &rule.deps {
                        if visited.insert(dep) {
                            frontier.push_back(dep);
                            ordered.push(dep);
                        }
                    }
                }
            }
        }

        ordered.iter().filter_map(|h| self.interner.lookup(*h)).collect()
    }

    /// Direct dependencies of every target in `targets`, at generation
    /// `g`, appended to `out`. Targets with no recorded rule at `g` are
    /// skipped silently.
    pub fn get_fwd_deps(&self, g: Generation, targets: &[T], out: &mut Vec<T>) {
        let handles: Vec<Option<TargetHandle>> =
            targets.iter().map(|t| self.interner.get(t)).collect();

        let dep_handles: Vec<TargetHandle> = {
            let maps = self.maps.read();
            handles
                .iter()
                .filter_map(|h| h.and_then(|h| maps.rule_map.get_version(&h, g)))
                .flat_map(|rule| rule.deps.clone())
                .collect()
        };

        out.extend(dep_handles.iter().filter_map(|h| self.interner.lookup(*h)));
    }

    /// Every target that exists at generation `g`.
    pub fn get_targets(&self, g: Generation) -> Vec<T> {
        let handles: Vec<TargetHandle> = {
            let maps = self.maps.read();
            maps.rule_map.get_all_entries(g).map(|(h, _)| *h).collect()
        };
        handles.iter().filter_map(|h| self.interner.lookup(*h)).collect()
    }

    /// Every target declared directly in `base` at generation `g` (not
    /// descendants); empty if `base` has no value at `g`.
    pub fn get_targets_in_base_path(&self, g: Generation, base: &PackagePath) -> Vec<T> {
        let names = {
            let maps = self.maps.read();
            maps.package_map.get_version(base, g).cloned()
        };
        match names {
            None => Vec::new(),
            Some(names) => names
                .iter()
                .map(|name| (self.parser)(&render_target(base, name)))
                .collect(),
        }
    }

    /// Every target declared in `base` or any package nested under it,
    /// at generation `g`. Equivalent to [Index::get_targets] when `base`
    /// is the repository root.
    pub fn get_targets_under_base_path(&self, g: Generation, base: &PackagePath) -> Vec<T> {
        if base.is_root() {
            return self.get_targets(g);
        }
        let rendered: Vec<String> = {
            let maps = self.maps.read();
            maps.package_map
                .get_entries(g, |dir| dir.is_under(base))
                .flat_map(|(dir, names)| names.iter().map(move |name| render_target(dir, name)))
                .collect()
        };
        rendered.iter().map(|s| (self.parser)(s)).collect()
    }

    /// Translate the host's [Changes] into the interned [InternalChanges]
    /// representation: intern every touched target, sort every rule's
    /// deps. Runs outside both locks.
    fn translate_changes(&self, changes: &Changes<T, N>) -> InternalChanges<N> {
        let convert = |pkg: &BuildPackage<T, N>| -> InternalPackage<N> {
            let rules = pkg
                .rules
                .iter()
                .map(|r| {
                    let handle = self.interner.intern(&r.target);
                    let dep_handles: Vec<TargetHandle> =
                        r.deps.iter().map(|d| self.interner.intern(d)).collect();
                    InternalRule {
                        name: r.target.name().to_string(),
                        handle,
                        rule: InternalRawBuildRule::new(r.target_node.clone(), dep_handles),
                    }
                })
                .collect();
            InternalPackage {
                dir: pkg.build_file_directory.clone(),
                rules,
            }
        };

        InternalChanges {
            added: changes.added.iter().map(convert).collect(),
            modified: changes.modified.iter().map(convert).collect(),
            removed: changes.removed.clone(),
        }
    }

    fn record_commit(&self, commit: &C, g: Generation) -> Result<()> {
        match self.commit_to_generation.entry(commit.clone()) {
            DashEntry::Occupied(_) => Err(Error::DuplicateCommit(DisplayCommit(format!("{:?}", commit)))),
            DashEntry::Vacant(v) => {
                v.insert(g);
                Ok(())
            }
        }
    }

    /// Apply one commit's changes. The caller MUST NOT invoke this
    /// method concurrently from multiple threads: `add_commit` is
    /// documented, not enforced, as single-writer. Concurrent readers
    /// are always safe.
    ///
    /// Returns the generation the commit was recorded at: unchanged from
    /// [Index::current_generation] if the commit was a no-op, or exactly
    /// one greater otherwise.
    pub fn add_commit(&self, commit: C, changes: Changes<T, N>) -> Result<Generation> {
        let g = self.generation.load(Ordering::Acquire);
        let internal_changes = self.translate_changes(&changes);

        let deltas = {
            let maps = self.maps.read();
            compute_deltas(
                &internal_changes,
                g,
                &maps.package_map,
                &maps.rule_map,
                |dir, name| {
                    let target = (self.parser)(&render_target(dir, name));
                    self.interner.intern(&target)
                },
            )?
        };

        if deltas.is_empty() {
            self.record_commit(&commit, g)?;
            log::debug!("{}: commit {:?} is a no-op at generation {}", self.name, commit, g);
            return Ok(g);
        }

        let next_g = g + 1;
        {
            let mut maps = self.maps.write();
            for pd in &deltas.package_deltas {
                match pd {
                    PackageDelta::Updated(dir, names) => {
                        maps.package_map.add_version(dir.clone(), Some(names.clone()), next_g)
                    }
                    PackageDelta::Removed(dir) => maps.package_map.add_version(dir.clone(), None, next_g),
                }
            }
            for rd in &deltas.rule_deltas {
                match rd {
                    RuleDelta::Updated(handle, rule) => {
                        maps.rule_map.add_version(*handle, Some(rule.clone()), next_g)
                    }
                    RuleDelta::Removed(handle) => maps.rule_map.add_version(*handle, None, next_g),
                }
            }
        }

        self.record_commit(&commit, next_g)?;
        self.generation.store(next_g, Ordering::Release);
        log::info!(
            "{}: commit {:?} applied at generation {} ({} package deltas, {} rule deltas)",
            self.name,
            commit,
            next_g,
            deltas.package_deltas.len(),
            deltas.rule_deltas.len(),
        );
        Ok(next_g)
    }
}

#[cfg(test)]
#[path = "index_test.rs"]
mod index_test;
