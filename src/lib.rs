//! `vgraph` is a versioned, concurrently-queried index of a build-rule
//! graph. It is meant to sit inside a build tool's server process and
//! hold, in memory, the parsed build-rule graph for many revisions of a
//! source tree at once, so that queries like "list every target under
//! directory X at revision R" or "compute the transitive closure of
//! target T at revision R" are answered without re-parsing build files
//! per request.
//!
//! Each revision applied to the index is called a **commit**; commits
//! are assigned **generations**, a linearly increasing integer sequence
//! (generation `0` is the empty index). History is never branched and
//! never pruned: every generation that was ever allocated remains
//! queryable for the lifetime of the [Index].
//!
//! The crate has no opinion on how build files are parsed, how
//! source-control history is walked, or how target strings are
//! serialized (those are the embedding host's concerns). What it owns
//! is the hard concurrency problem: many threads issuing queries against
//! arbitrary past generations while, at most, one thread is applying a
//! new commit.
//!
//! ```
//! use std::collections::HashSet;
//! use vgraph::core::{ExternalTarget, PackagePath, RawBuildRule, BuildPackage, Changes};
//! use vgraph::index::Index;
//!
//! #[derive(Debug, Clone, PartialEq, Eq, Hash)]
//! struct Target { package: PackagePath, name: String }
//!
//! impl ExternalTarget for Target {
//!     fn package_path(&self) -> &PackagePath { &self.package }
//!     fn name(&self) -> &str { &self.name }
//! }
//!
//! fn parse(s: &str) -> Target {
//!     let rest = s.trim_start_matches("//");
//!     let (pkg, name) = rest.split_once(':').unwrap();
//!     Target { package: PackagePath::new(pkg), name: name.to_string() }
//! }
//!
//! let index: Index<Target, (), &'static str, _> = Index::new("example", parse);
//!
//! let a = Target { package: PackagePath::new("foo/bar"), name: "a".into() };
//! let rule = RawBuildRule::new(a.clone(), (), HashSet::new());
//! let pkg = BuildPackage::new(PackagePath::new("foo/bar"), vec![rule]);
//! let mut changes = Changes::new();
//! changes.added.push(pkg);
//!
//! let g = index.add_commit("c1", changes).unwrap();
//! assert_eq!(g, 1);
//! assert_eq!(index.get_targets(1), vec![a]);
//! ```

pub mod core;
pub mod delta;
pub mod error;
pub mod gen_map;
pub mod index;
pub mod interner;

pub use crate::core::{
    BuildPackage, Changes, Commit, ExternalTarget, Generation, PackagePath, RawBuildRule,
    TargetHandle,
};
pub use crate::error::Error;
pub use crate::index::{ExternalRule, Index};
