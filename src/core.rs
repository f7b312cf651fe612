//! Module `core` defines and implements the core types and traits shared
//! by every other module: the target handle, the generation counter,
//! the package path, and the host-supplied types ([ExternalTarget],
//! [RawBuildRule], [BuildPackage], [Changes]) that the
//! [Index][crate::index::Index] facade is generic over.
//!
//! None of these types carry any synchronization themselves; locking is
//! entirely the concern of [interner][crate::interner],
//! [gen_map][crate::gen_map] and [index][crate::index].

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// Dense, non-negative, append-only handle assigned by the
/// [interner][crate::interner::Interner] in insertion order. Stable for
/// the lifetime of the process; never reused.
pub type TargetHandle = u32;

/// Monotonically increasing label on the linear commit history.
/// Generation `0` is the empty state.
pub type Generation = u32;

/// A rule name, unique within its build package.
pub type RuleName = String;

/// A filesystem-agnostic, normalized, canonical directory path: the
/// directory containing a build file. The empty path denotes the
/// repository root.
///
/// Normalization strips a leading `//` (the conventional build-target
/// root marker) and any leading/trailing `/`, so `"//foo/bar/"`,
/// `"foo/bar"` and `"/foo/bar"` all normalize to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackagePath(String);

impl PackagePath {
    /// Build a normalized package path from any path-like string.
    pub fn new(path: impl AsRef<str>) -> PackagePath {
        let trimmed = path.as_ref().trim_start_matches("//").trim_matches('/');
        PackagePath(trimmed.to_string())
    }

    /// The repository root package.
    pub fn root() -> PackagePath {
        PackagePath(String::new())
    }

    /// Borrow the normalized path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` iff this package is the repository root (the empty path).
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// `true` iff `self` is `other` or a descendant of `other`, on path
    /// component boundaries (`"foo/barbaz"` is not under `"foo/bar"`).
    pub fn is_under(&self, base: &PackagePath) -> bool {
        if base.is_root() {
            return true;
        }
        if !self.0.starts_with(base.0.as_str()) {
            return false;
        }
        self.0.len() == base.0.len() || self.0.as_bytes()[base.0.len()] == b'/'
    }
}

impl fmt::Display for PackagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "//{}", self.0)
    }
}

/// Render `//<package>:<name>` for a package path and rule name, the
/// external string form of a build target.
pub fn render_target(package: &PackagePath, name: &str) -> String {
    format!("//{}:{}", package.as_str(), name)
}

/// A value-equal, hashable external build target, supplied by the host.
///
/// Implementations are expected to be cheap to clone (e.g. an `Arc`- or
/// `Rc`-backed interned string pair), since the index clones targets
/// whenever it hands them back to the caller.
pub trait ExternalTarget: Clone + Eq + Hash + fmt::Debug {
    /// The build package this target's rule is declared in.
    fn package_path(&self) -> &PackagePath;

    /// The rule name, unique within `package_path()`.
    fn name(&self) -> &str;
}

/// Marker trait for the opaque, host-supplied commit identifier.
/// Blanket-implemented for any type satisfying the bounds, since the
/// index places no constraints on commit identifiers beyond value
/// equality, hashing, and being safely shareable across threads.
pub trait Commit: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> Commit for T where T: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

/// A build rule as supplied by the host: an opaque payload (the
/// `target_node`) plus the set of targets it depends on.
///
/// `target_node`'s `PartialEq` impl determines what "semantically
/// identical rule" means during modified-package diffing: if two node
/// payloads compare equal but the host considers them different rules,
/// the index will wrongly treat a package update as a no-op for that
/// rule.
#[derive(Debug, Clone)]
pub struct RawBuildRule<T, N> {
    pub target: T,
    pub target_node: N,
    pub deps: HashSet<T>,
}

impl<T, N> RawBuildRule<T, N> {
    pub fn new(target: T, target_node: N, deps: HashSet<T>) -> RawBuildRule<T, N> {
        RawBuildRule {
            target,
            target_node,
            deps,
        }
    }
}

/// A build package: a directory plus the rules declared in its build
/// file.
#[derive(Debug, Clone)]
pub struct BuildPackage<T, N> {
    pub build_file_directory: PackagePath,
    pub rules: Vec<RawBuildRule<T, N>>,
}

impl<T, N> BuildPackage<T, N> {
    pub fn new(build_file_directory: PackagePath, rules: Vec<RawBuildRule<T, N>>) -> Self {
        BuildPackage {
            build_file_directory,
            rules,
        }
    }
}

/// The change-set a single commit applies: packages added wholesale,
/// packages whose rule set was modified, and packages removed
/// wholesale.
#[derive(Debug, Clone, Default)]
pub struct Changes<T, N> {
    pub added: Vec<BuildPackage<T, N>>,
    pub modified: Vec<BuildPackage<T, N>>,
    pub removed: Vec<PackagePath>,
}

impl<T, N> Changes<T, N> {
    pub fn new() -> Self {
        Changes {
            added: Vec::new(),
            modified: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// `true` iff this change-set touches nothing at all. Note this is
    /// distinct from [Deltas::is_empty][crate::delta::Deltas::is_empty]:
    /// an empty `Changes` is trivially a no-op commit, but a non-empty
    /// `Changes` whose `modified` packages equal the current state is
    /// also a no-op (see `diff_rules`).
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }
}

/// The internal, handle-based representation of a build rule: an opaque
/// node payload plus a sorted, deduplicated array of dependency
/// handles. Dep arrays are kept sorted so equality comparison (used by
/// [diff_rules][crate::delta::diff_rules]) is a dense array compare
/// rather than a set comparison.
#[derive(Debug, Clone)]
pub struct InternalRawBuildRule<N> {
    pub target_node: N,
    pub deps: Vec<TargetHandle>,
}

impl<N: PartialEq> PartialEq for InternalRawBuildRule<N> {
    fn eq(&self, other: &Self) -> bool {
        self.target_node == other.target_node && self.deps == other.deps
    }
}

impl<N: PartialEq> InternalRawBuildRule<N> {
    pub fn new(target_node: N, mut deps: Vec<TargetHandle>) -> Self {
        deps.sort_unstable();
        deps.dedup();
        InternalRawBuildRule { target_node, deps }
    }
}

#[cfg(test)]
#[path = "core_test.rs"]
mod core_test;
