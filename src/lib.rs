//! Import-dependency analysis for KCL configuration trees.
//!
//! The library scans `import` statements without a full parser, builds a
//! package/file import graph, and answers dependency queries in both
//! directions: what an application depends on, and which applications a
//! change touches.

pub mod analysis;
pub mod builtins;
pub mod config;
pub mod error;
pub mod graph;
pub mod modfile;
pub mod pkgroot;
pub mod scan;
pub mod vfs;

use std::path::{Path, PathBuf};

pub use analysis::{DepParser, ImportDepParser, SingleAppDepParser};
pub use config::{DepOptions, Options};
pub use error::DepError;
pub use graph::ImportGraph;
pub use pkgroot::find_pkg_root;

/// Source files of the application at `work_dir`, root-relative and sorted.
///
/// The package root is the nearest ancestor carrying a `kcl.mod` marker.
/// With `opts.all` the listing includes every transitive dependency file;
/// with `opts.use_abs_path` paths are joined back onto the root.
pub fn list_dep_files(work_dir: &str, opts: Option<&Options>) -> Result<Vec<String>, DepError> {
    let opts = opts.cloned().unwrap_or_default();
    let (root, pkgpath) = find_pkg_root(work_dir)?;
    let mut parser = SingleAppDepParser::new(&root, opts.clone());
    let files = parser.app_files(&pkgpath, opts.all)?;
    if opts.use_abs_path {
        return Ok(files
            .into_iter()
            .map(|f| root.join(f).to_string_lossy().into_owned())
            .collect());
    }
    Ok(files)
}

/// Packages the application at `work_dir` imports, sorted. With `opts.all`
/// the listing is the transitive closure.
pub fn list_dep_packages(work_dir: &str, opts: Option<&Options>) -> Result<Vec<String>, DepError> {
    let opts = opts.cloned().unwrap_or_default();
    let (root, pkgpath) = find_pkg_root(work_dir)?;
    let mut parser = SingleAppDepParser::new(&root, opts.clone());
    parser.app_pkgs(&pkgpath, opts.all)
}

/// Transitive imports of the seed files in `opts.files`, sorted. Seeds are
/// relative to the package root discovered from `work_dir`; a tree without
/// a `kcl.mod` marker is rooted at `work_dir` itself. An empty seed set
/// yields an empty result.
pub fn list_upstream_files(work_dir: &str, opts: &DepOptions) -> Result<Vec<String>, DepError> {
    if opts.files.is_empty() {
        return Ok(Vec::new());
    }
    let parser = ImportDepParser::new(&query_root(work_dir), opts.clone())?;
    Ok(parser.upstream_files())
}

/// Files and packages affected by `opts.changed_paths` within the graph
/// reachable from `opts.files`, sorted. Rooted like
/// [`list_upstream_files`]; changed paths may name files that no longer
/// exist.
pub fn list_downstream_files(work_dir: &str, opts: &DepOptions) -> Result<Vec<String>, DepError> {
    if opts.files.is_empty() {
        return Ok(Vec::new());
    }
    let mut parser = ImportDepParser::new(&query_root(work_dir), opts.clone())?;
    Ok(parser.downstream_files())
}

/// The package root owning `work_dir`, or `work_dir` itself when no marker
/// is found upward.
fn query_root(work_dir: &str) -> PathBuf {
    match find_pkg_root(work_dir) {
        Ok((root, _)) => root,
        Err(_) => PathBuf::from(work_dir),
    }
}

/// Classifies every application under `work_dir` against the changed files:
/// `(touched, untouched)`, both sorted by application path.
pub fn list_touched_apps(
    work_dir: &str,
    changed_files: &[String],
    opts: Option<&Options>,
) -> Result<(Vec<String>, Vec<String>), DepError> {
    let opts = opts.cloned().unwrap_or_default();
    let parser = DepParser::new(Path::new(work_dir), opts)?;
    Ok(parser.touched_apps(changed_files))
}
