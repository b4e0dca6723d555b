//! On-demand parsing of a single application.

use std::collections::BTreeSet;
use std::path::Path;

use crate::config::Options;
use crate::error::DepError;
use crate::graph::{ImportGraph, InspectOptions};
use crate::modfile;
use crate::vfs::{DiskFs, Vfs};

/// Parses one application package at a time, lazily, without indexing the
/// rest of the tree. Repeated queries for the same package reuse the cached
/// graph; a different package triggers a fresh parse.
pub struct SingleAppDepParser {
    fs: Box<dyn Vfs>,
    opts: Options,
    parsed: Option<String>,
    graph: ImportGraph,
}

impl SingleAppDepParser {
    pub fn new(root: &Path, opts: Options) -> Self {
        Self::with_vfs(Box::new(DiskFs::new(root)), opts)
    }

    pub fn with_vfs(fs: Box<dyn Vfs>, opts: Options) -> Self {
        Self {
            fs,
            opts,
            parsed: None,
            graph: ImportGraph::new(),
        }
    }

    fn parse_once(&mut self, pkgpath: &str) -> Result<&ImportGraph, DepError> {
        if self.parsed.as_deref() != Some(pkgpath) {
            let externals = if self.opts.exclude_external {
                modfile::external_packages(self.fs.as_ref())
            } else {
                BTreeSet::new()
            };
            let inspect_opts = InspectOptions {
                opts: self.opts.clone(),
                externals,
                strict: !self.opts.ignore_errors,
            };
            let mut graph = ImportGraph::new();
            graph.inspect(self.fs.as_ref(), pkgpath, &inspect_opts)?;
            self.graph = graph;
            self.parsed = Some(pkgpath.to_string());
        }
        Ok(&self.graph)
    }

    /// Member files of the application, optionally with every transitive
    /// dependency file, sorted.
    pub fn app_files(&mut self, pkgpath: &str, include_deps: bool) -> Result<Vec<String>, DepError> {
        let graph = self.parse_once(pkgpath)?;
        let direct: BTreeSet<String> = graph.files_of(pkgpath).cloned().unwrap_or_default();
        if !include_deps {
            return Ok(direct.into_iter().collect());
        }

        let mut visited = BTreeSet::new();
        for file in &direct {
            graph.walk_upstream(file, &mut visited);
        }
        let mut files = direct;
        for node in visited {
            if graph.pkg_of(&node).is_some() {
                files.insert(node);
            }
        }
        Ok(files.into_iter().collect())
    }

    /// Packages the application imports, directly or transitively, sorted.
    pub fn app_pkgs(&mut self, pkgpath: &str, include_deps: bool) -> Result<Vec<String>, DepError> {
        let graph = self.parse_once(pkgpath)?;
        let pkgs = if include_deps {
            graph.transitive_import_pkgs(pkgpath)
        } else {
            graph.package_import_pkgs(pkgpath)
        };
        Ok(pkgs.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::MemFs;

    fn fixture() -> MemFs {
        MemFs::from([
            ("appops/dev/main.k", "import base.server"),
            ("base/server/server.k", "import base.container"),
            ("base/container/container.k", ""),
            ("other/other.k", "import base.container"),
        ])
    }

    #[test]
    fn parses_only_the_requested_app() {
        let mut p = SingleAppDepParser::with_vfs(Box::new(fixture()), Options::default());
        assert_eq!(
            p.app_files("appops/dev", false).unwrap(),
            vec!["appops/dev/main.k"]
        );
        assert_eq!(
            p.app_files("appops/dev", true).unwrap(),
            vec![
                "appops/dev/main.k",
                "base/container/container.k",
                "base/server/server.k",
            ]
        );
        // The unrelated package was never pulled in.
        assert!(p.app_files("appops/dev", true).unwrap().iter().all(|f| f != "other/other.k"));
    }

    #[test]
    fn app_pkgs_direct_and_transitive() {
        let mut p = SingleAppDepParser::with_vfs(Box::new(fixture()), Options::default());
        assert_eq!(p.app_pkgs("appops/dev", false).unwrap(), vec!["base/server"]);
        assert_eq!(
            p.app_pkgs("appops/dev", true).unwrap(),
            vec!["base/container", "base/server"]
        );
    }

    #[test]
    fn switching_apps_reparses() {
        let mut p = SingleAppDepParser::with_vfs(Box::new(fixture()), Options::default());
        assert_eq!(
            p.app_files("appops/dev", false).unwrap(),
            vec!["appops/dev/main.k"]
        );
        assert_eq!(p.app_files("other", false).unwrap(), vec!["other/other.k"]);
        assert_eq!(p.app_pkgs("other", false).unwrap(), vec!["base/container"]);
    }

    #[test]
    fn strict_by_default_lenient_on_request() {
        let fs = MemFs::from([("app/main.k", "import gone.pkg")]);
        let mut strict = SingleAppDepParser::with_vfs(Box::new(fs.clone()), Options::default());
        let err = strict.app_files("app", false).unwrap_err();
        assert_eq!(err.to_string(), "package gone/pkg: no kcl file");

        let opts = Options {
            ignore_errors: true,
            ..Default::default()
        };
        let mut lenient = SingleAppDepParser::with_vfs(Box::new(fs), opts);
        assert_eq!(lenient.app_files("app", false).unwrap(), vec!["app/main.k"]);
    }
}
