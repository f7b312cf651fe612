//! Module `delta` computes, given a commit's added/modified/removed
//! packages and the current generation, the minimal set of updates to
//! the two generation maps, or proves the commit is a no-op.
//!
//! This module only reads the generation maps (via
//! `GenerationMap::get_version`); applying the resulting [Deltas] is
//! the facade's job, under the write lock.

use crate::core::{Generation, InternalRawBuildRule, PackagePath, RuleName, TargetHandle};
use crate::error::{DisplayPath, Error};
use crate::gen_map::GenerationMap;

/// One already-interned rule, ready to be folded into `ruleMap`.
#[derive(Debug, Clone)]
pub struct InternalRule<N> {
    pub name: RuleName,
    pub handle: TargetHandle,
    pub rule: InternalRawBuildRule<N>,
}

/// One already-interned package, ready to be diffed against or folded
/// into `buildPackageMap`.
#[derive(Debug, Clone)]
pub struct InternalPackage<N> {
    pub dir: PackagePath,
    pub rules: Vec<InternalRule<N>>,
}

/// The host's [Changes][crate::core::Changes], translated to the
/// interned representation: every target touched has been assigned a
/// handle, and every rule's deps are sorted handle arrays. Building this
/// value (interning targets, sorting deps) happens outside both locks.
#[derive(Debug, Clone, Default)]
pub struct InternalChanges<N> {
    pub added: Vec<InternalPackage<N>>,
    pub modified: Vec<InternalPackage<N>>,
    pub removed: Vec<PackagePath>,
}

/// An update to `buildPackageMap`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageDelta {
    Updated(PackagePath, Vec<RuleName>),
    Removed(PackagePath),
}

/// An update to `ruleMap`.
#[derive(Debug, Clone)]
pub enum RuleDelta<N> {
    Updated(TargetHandle, InternalRawBuildRule<N>),
    Removed(TargetHandle),
}

/// The minimal set of updates needed to move the generation maps from
/// state-at-`g` to state-at-`g+1`.
#[derive(Debug, Clone)]
pub struct Deltas<N> {
    pub package_deltas: Vec<PackageDelta>,
    pub rule_deltas: Vec<RuleDelta<N>>,
}

impl<N> Deltas<N> {
    fn empty() -> Self {
        Deltas {
            package_deltas: Vec::new(),
            rule_deltas: Vec::new(),
        }
    }

    /// `true` iff applying this delta would change nothing: the commit
    /// it was computed for is semantically a no-op and must not
    /// allocate a new generation.
    pub fn is_empty(&self) -> bool {
        self.package_deltas.is_empty() && self.rule_deltas.is_empty()
    }
}

fn sorted_names(rules: &[InternalRule<impl Clone>]) -> Vec<RuleName> {
    let mut names: Vec<RuleName> = rules.iter().map(|r| r.name.clone()).collect();
    names.sort_unstable();
    names
}

/// Compute the deltas for one commit's changes against the generation
/// maps as they stand at `g`.
///
/// `resolve_handle` resolves `(package, rule name)` to the
/// [TargetHandle] the interner already assigned it, used to look up
/// rules named only by string in `removed`/`modified` packages' old
/// state. It must never mint a *new* handle for a name that
/// `buildPackageMap` claims already exists; if it does, that is exactly
/// the corruption `InternalInconsistency` exists to catch.
pub fn compute_deltas<N>(
    changes: &InternalChanges<N>,
    g: Generation,
    package_map: &GenerationMap<PackagePath, Vec<RuleName>>,
    rule_map: &GenerationMap<TargetHandle, InternalRawBuildRule<N>>,
    resolve_handle: impl Fn(&PackagePath, &str) -> TargetHandle,
) -> Result<Deltas<N>, Error>
where
    N: Clone + PartialEq,
{
    let mut deltas = Deltas::empty();

    for pkg in &changes.added {
        if package_map.get_version(&pkg.dir, g).is_some() {
            return Err(Error::PackageAlreadyPresent(DisplayPath(pkg.dir.clone()), g));
        }
        deltas
            .package_deltas
            .push(PackageDelta::Updated(pkg.dir.clone(), sorted_names(&pkg.rules)));
        for rule in &pkg.rules {
            deltas
                .rule_deltas
                .push(RuleDelta::Updated(rule.handle, rule.rule.clone()));
        }
    }

    for dir in &changes.removed {
        let old_names = package_map
            .get_version(dir, g)
            .ok_or_else(|| Error::PackageAbsent(DisplayPath(dir.clone()), g))?;
        deltas.package_deltas.push(PackageDelta::Removed(dir.clone()));
        for name in old_names {
            let handle = resolve_handle(dir, name);
            deltas.rule_deltas.push(RuleDelta::Removed(handle));
        }
    }

    for pkg in &changes.modified {
        let old_names = package_map
            .get_version(&pkg.dir, g)
            .ok_or_else(|| Error::PackageAbsent(DisplayPath(pkg.dir.clone()), g))?;

        let mut old_rules = Vec::with_capacity(old_names.len());
        for name in old_names {
            let handle = resolve_handle(&pkg.dir, name);
            let rule = rule_map.get_version(&handle, g).ok_or_else(|| {
                Error::InternalInconsistency(format!(
                    "rule {} in package {} has no entry in ruleMap at generation {}",
                    name, pkg.dir, g
                ))
            })?;
            old_rules.push((handle, rule.clone()));
        }

        let new_rules: Vec<(TargetHandle, InternalRawBuildRule<N>)> = pkg
            .rules
            .iter()
            .map(|r| (r.handle, r.rule.clone()))
            .collect();

        let rule_changes = diff_rules(&old_rules, &new_rules);
        if rule_changes.is_empty() {
            continue;
        }

        deltas
            .package_deltas
            .push(PackageDelta::Updated(pkg.dir.clone(), sorted_names(&pkg.rules)));
        deltas.rule_deltas.extend(rule_changes);
    }

    Ok(deltas)
}

/// Diff two (handle, rule) sets keyed by build-target handle: emit
/// `Updated` for every target in `new` that is absent from `old` or has
/// a different payload there, and `Removed` for every target in `old`
/// absent from `new`. Targets whose `new` rule equals the `old` rule
/// (node payload and sorted deps) emit nothing.
pub fn diff_rules<N: Clone + PartialEq>(
    old: &[(TargetHandle, InternalRawBuildRule<N>)],
    new: &[(TargetHandle, InternalRawBuildRule<N>)],
) -> Vec<RuleDelta<N>> {
    let mut changes = Vec::new();

    for (handle, new_rule) in new {
        match old.iter().find(|(h, _)| h == handle) {
            Some((_, old_rule)) if old_rule == new_rule => {}
            _ => changes.push(RuleDelta::Updated(*handle, new_rule.clone())),
        }
    }

    for (handle, _) in old {
        if !new.iter().any(|(h, _)| h == handle) {
            changes.push(RuleDelta::Removed(*handle));
        }
    }

    changes
}

#[cfg(test)]
#[path = "delta_test.rs"]
mod delta_test;
