//! Error taxonomy for dependency parsing.

use thiserror::Error;

/// Errors produced while building or querying an import graph.
///
/// Construction is all-or-nothing: any error aborts the whole query with no
/// partial result. Every failure mode is deterministic for a given tree, so
/// nothing here is retryable.
#[derive(Debug, Error)]
pub enum DepError {
    /// A seed path named by the caller does not exist. Rejected before any
    /// graph work is done.
    #[error("invalid file path: {0}")]
    InvalidFilePath(String),

    /// A reachable package matched zero eligible source files under strict
    /// mode.
    #[error("package {0}: no kcl file")]
    EmptyPackage(String),

    /// An include-manifest failed to load or named a missing member file.
    /// Fatal for the package.
    #[error("{path}: {reason}")]
    Manifest { path: String, reason: String },

    /// A reachable source file could not be read.
    #[error("{path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// No `kcl.mod` was found walking up from the work directory.
    #[error("pkgroot: not found")]
    PkgRootNotFound,
}
