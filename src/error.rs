//! Module `error` defines the single error type returned by fallible
//! operations on [Index][crate::index::Index].
//!
//! Query methods never fail: absent data is represented as `None` or an
//! empty collection, per the index's contract. Only [add_commit]
//! [crate::index::Index::add_commit] returns a `Result`.

use std::fmt;

use thiserror::Error;

use crate::core::{Generation, PackagePath};

/// Type alias for all results returned by `vgraph` methods.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure modes of [Index::add_commit][crate::index::Index::add_commit].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An `added` package named a directory that already has a value at
    /// the generation the commit was computed against.
    #[error("package {0} already present at generation {1}")]
    PackageAlreadyPresent(DisplayPath, Generation),

    /// A `modified` or `removed` package named a directory with no value
    /// at the generation the commit was computed against.
    #[error("package {0} absent at generation {1}")]
    PackageAbsent(DisplayPath, Generation),

    /// A rule name present in `buildPackageMap` had no corresponding
    /// entry in `ruleMap`. Indicates the two generation maps have
    /// drifted out of the invariant relationship described in the data
    /// model; not recoverable by retrying.
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),

    /// `add_commit` was called twice with the same commit identifier.
    #[error("duplicate commit {0}")]
    DuplicateCommit(DisplayCommit),
}

/// Wrapper so `PackagePath` (a host-agnostic path newtype) has a stable,
/// allocation-light `Display`/`Debug` rendering inside error messages
/// without requiring `PackagePath` itself to implement `Display`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPath(pub PackagePath);

impl fmt::Display for DisplayPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.as_str().is_empty() {
            write!(f, "//")
        } else {
            write!(f, "//{}", self.0.as_str())
        }
    }
}

/// Wrapper so an opaque, host-supplied [Commit][crate::core::Commit] can
/// be formatted in an error message regardless of whether the host's
/// `Commit` type implements `Display`. Holds the commit's `Debug`
/// rendering, already computed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCommit(pub String);

impl fmt::Display for DisplayCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
