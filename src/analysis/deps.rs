//! Seed-scoped upstream/downstream queries.

use std::collections::BTreeSet;
use std::path::Path;

use crate::config::{DepOptions, KCL_SUFFIX, TEST_SUFFIX};
use crate::error::DepError;
use crate::graph::{ImportGraph, InspectOptions};
use crate::vfs::{DiskFs, Vfs};

/// Parses import statements reachable from a set of seed files and answers
/// transitive dependency queries in both directions.
///
/// Each instance owns a private graph scoped to one seed set; independent
/// queries build independent parsers. Construction is lenient about
/// packages that match zero files, which is what lets downstream queries
/// reason about deleted files.
pub struct ImportDepParser {
    fs: Box<dyn Vfs>,
    opts: DepOptions,
    graph: ImportGraph,
}

impl ImportDepParser {
    /// Builds the graph for the seed files under `root`. Seed paths that do
    /// not exist are rejected before any graph work.
    pub fn new(root: &Path, opts: DepOptions) -> Result<Self, DepError> {
        let fs = DiskFs::new(root);
        for file in &opts.files {
            if !fs.exists(file) {
                return Err(DepError::InvalidFilePath(file.clone()));
            }
        }
        Self::with_vfs(Box::new(fs), opts)
    }

    /// Same as [`Self::new`] over an arbitrary filesystem. Seed existence
    /// has already been established by the caller.
    pub fn with_vfs(fs: Box<dyn Vfs>, opts: DepOptions) -> Result<Self, DepError> {
        let mut graph = ImportGraph::new();
        let inspect_opts = InspectOptions::default();
        for file in &opts.files {
            graph.inspect(fs.as_ref(), file, &inspect_opts)?;
        }
        Ok(Self { fs, opts, graph })
    }

    /// The transitive set of files and packages the seed files import,
    /// sorted. The seeds themselves are excluded unless a cycle re-reaches
    /// them.
    pub fn upstream_files(&self) -> Vec<String> {
        let mut visited = BTreeSet::new();
        for file in &self.opts.files {
            self.graph.walk_upstream(file, &mut visited);
        }
        visited.remove(".");
        visited.into_iter().collect()
    }

    /// The transitive set of files and packages affected by the changed
    /// paths, sorted.
    ///
    /// A changed source file that no longer exists on disk is synthesized
    /// into the graph first: its directory becomes its owning package and
    /// its module-form path joins the seed set, since live importers may
    /// reference either spelling. Changed test files are ignored.
    pub fn downstream_files(&mut self) -> Vec<String> {
        let mut seeds = self.opts.changed_paths.clone();
        for path in &self.opts.changed_paths {
            if path.ends_with(KCL_SUFFIX)
                && !path.ends_with(TEST_SUFFIX)
                && !self.fs.is_file(path)
            {
                seeds.push(self.graph.register_deleted_file(path));
            }
        }
        let mut visited = BTreeSet::new();
        for seed in &seeds {
            self.graph.walk_downstream(seed, &mut visited);
        }
        visited.remove(".");
        visited.into_iter().collect()
    }

    /// The underlying graph, for callers composing their own walks.
    pub fn graph(&self) -> &ImportGraph {
        &self.graph
    }
}
