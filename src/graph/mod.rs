//! Import graph: a lazily, recursively built structure with four indices
//! and a processed-set guard.
//!
//! `imports`/`imported_by` are exact inverses; every file appearing in any
//! index has an owning package in `file_pkg`; a package is inspected at most
//! once per graph instance, which is also the sole termination mechanism and
//! makes arbitrary import cycles safe. The graph only grows during a
//! construction pass.

pub mod walk;

use std::collections::{BTreeMap, BTreeSet};

use crate::builtins::{is_builtin_pkg, is_plugin_pkg};
use crate::config::{Options, KCL_SUFFIX};
use crate::error::DepError;
use crate::scan::{fix_path, package_files, resolve_import, scan_imports};
use crate::vfs::{self, Vfs};

#[derive(Debug, Clone, Default)]
pub struct ImportGraph {
    /// Source path -> set of target paths it imports.
    imports: BTreeMap<String, BTreeSet<String>>,
    /// Target path -> set of source paths importing it.
    imported_by: BTreeMap<String, BTreeSet<String>>,
    /// Package path -> member file paths.
    pkg_files: BTreeMap<String, BTreeSet<String>>,
    /// File path -> owning package path.
    file_pkg: BTreeMap<String, String>,
    /// Packages already fully inspected.
    processed: BTreeSet<String>,
}

/// Settings for one construction pass.
#[derive(Debug, Clone, Default)]
pub struct InspectOptions {
    /// Discovery options (include-manifest name).
    pub opts: Options,
    /// Declared-external package names treated as boundary sinks.
    pub externals: BTreeSet<String>,
    /// Abort on a reachable package matching zero files.
    pub strict: bool,
}

impl ImportGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent recursive builder step: inspect the package owning `path`,
    /// record its member files and their import edges, and recurse into
    /// every non-sink target.
    pub fn inspect(
        &mut self,
        fs: &dyn Vfs,
        path: &str,
        inspect_opts: &InspectOptions,
    ) -> Result<(), DepError> {
        let pkgpath = owning_pkg(path);
        if self.processed.contains(&pkgpath) {
            return Ok(());
        }
        self.processed.insert(pkgpath.clone());

        let files = package_files(fs, &pkgpath, &inspect_opts.opts)?;
        if files.is_empty() {
            if inspect_opts.strict {
                return Err(DepError::EmptyPackage(pkgpath));
            }
            return Ok(());
        }

        for file in &files {
            self.file_pkg.insert(file.clone(), pkgpath.clone());
            self.pkg_files
                .entry(pkgpath.clone())
                .or_default()
                .insert(file.clone());
        }

        for file in files {
            let src = fs.read_to_string(&file).map_err(|e| DepError::Read {
                path: file.clone(),
                source: e,
            })?;
            for raw in scan_imports(&src) {
                let target = fix_path(fs, &resolve_import(&file, &raw));
                self.imports
                    .entry(file.clone())
                    .or_default()
                    .insert(target.clone());
                self.imported_by
                    .entry(target.clone())
                    .or_default()
                    .insert(file.clone());
                if is_boundary_sink(&target, &inspect_opts.externals) {
                    continue;
                }
                self.inspect(fs, &target, inspect_opts)?;
            }
        }
        Ok(())
    }

    /// Outbound edges of one node.
    pub fn imports_of(&self, path: &str) -> Option<&BTreeSet<String>> {
        self.imports.get(path)
    }

    /// Inbound edges of one node.
    pub fn imported_by_of(&self, path: &str) -> Option<&BTreeSet<String>> {
        self.imported_by.get(path)
    }

    /// Member files of a package, if the path is a known package.
    pub fn files_of(&self, pkgpath: &str) -> Option<&BTreeSet<String>> {
        self.pkg_files.get(pkgpath)
    }

    /// Owning package of a file.
    pub fn pkg_of(&self, file: &str) -> Option<&str> {
        self.file_pkg.get(file).map(String::as_str)
    }

    /// All known packages, sorted.
    pub fn pkg_list(&self) -> Vec<String> {
        self.pkg_files.keys().cloned().collect()
    }

    /// All known files, sorted.
    pub fn file_list(&self) -> Vec<String> {
        self.file_pkg.keys().cloned().collect()
    }

    /// Import targets of a node: a package's are the union of its member
    /// files' targets, a file's are its own edges.
    pub fn node_imports(&self, path: &str) -> BTreeSet<String> {
        match self.pkg_files.get(path) {
            Some(files) => files
                .iter()
                .flat_map(|f| self.imports.get(f).into_iter().flatten())
                .cloned()
                .collect(),
            None => self.imports.get(path).cloned().unwrap_or_default(),
        }
    }

    /// Package-granularity imports of `pkgpath`: file targets are mapped to
    /// their owning package; the package itself and the root are dropped.
    pub fn package_import_pkgs(&self, pkgpath: &str) -> BTreeSet<String> {
        self.node_imports(pkgpath)
            .iter()
            .map(|target| match self.file_pkg.get(target) {
                Some(pkg) => pkg.clone(),
                None => target.clone(),
            })
            .filter(|pkg| pkg != pkgpath && pkg != ".")
            .collect()
    }

    /// Transitive closure of [`Self::package_import_pkgs`], excluding the
    /// start package.
    pub fn transitive_import_pkgs(&self, pkgpath: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        let mut seen = BTreeSet::from([pkgpath.to_string()]);
        let mut stack = vec![pkgpath.to_string()];
        while let Some(pkg) = stack.pop() {
            for next in self.package_import_pkgs(&pkg) {
                if seen.insert(next.clone()) {
                    out.insert(next.clone());
                    stack.push(next);
                }
            }
        }
        out
    }
}

/// The package owning `path`: the path itself unless it carries the source
/// suffix, in which case its directory.
pub fn owning_pkg(path: &str) -> String {
    if path.ends_with(KCL_SUFFIX) {
        vfs::parent(path)
    } else {
        path.to_string()
    }
}

/// Boundary sinks terminate traversal: standard-library modules, the plugin
/// namespace, and (when enabled) declared-external packages.
pub fn is_boundary_sink(target: &str, externals: &BTreeSet<String>) -> bool {
    if is_builtin_pkg(target) || is_plugin_pkg(target) {
        return true;
    }
    let root = target.split('/').next().unwrap_or(target);
    externals.contains(root)
}
