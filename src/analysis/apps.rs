//! Whole-tree parsing and touched-application classification.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::builtins::is_plugin_pkg;
use crate::config::{Options, ENTRY_FILE, KCL_SUFFIX, PRIVATE_PREFIX, TEST_SUFFIX};
use crate::error::DepError;
use crate::graph::{ImportGraph, InspectOptions};
use crate::modfile;
use crate::scan::package_files;
use crate::vfs::{self, DiskFs, Vfs};

/// Three-color state used by the touched-application walk: white is
/// unknown, grey possibly affected, black provably unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Grey,
    Black,
}

/// Parses every application under a tree root and answers enumeration and
/// change-impact queries against a single, eagerly built import graph.
pub struct DepParser {
    fs: Box<dyn Vfs>,
    opts: Options,
    graph: ImportGraph,

    k_list: Vec<String>,
    main_k_list: Vec<String>,
    project_yaml_dirs: Vec<String>,
}

impl DepParser {
    pub fn new(root: &Path, opts: Options) -> Result<Self, DepError> {
        Self::with_vfs(Box::new(DiskFs::new(root)), opts)
    }

    /// Discovers every entry file and include-manifest under the root and
    /// builds import indices for all of them. Any package-scan or manifest
    /// error aborts construction unless `ignore_errors` is set.
    pub fn with_vfs(fs: Box<dyn Vfs>, opts: Options) -> Result<Self, DepError> {
        let all_files = fs.walk_files();

        let mut k_list = Vec::new();
        let mut main_k_list = Vec::new();
        let mut kcl_yaml_list = Vec::new();
        let mut project_yaml_dirs = Vec::new();
        for path in &all_files {
            let name = vfs::file_name(path);
            if name == opts.kcl_yaml {
                kcl_yaml_list.push(path.clone());
            } else if name == opts.project_yaml {
                project_yaml_dirs.push(vfs::parent(path));
            }
            if name.ends_with(KCL_SUFFIX)
                && !name.starts_with(PRIVATE_PREFIX)
                && !name.ends_with(TEST_SUFFIX)
            {
                k_list.push(path.clone());
                if name == ENTRY_FILE {
                    main_k_list.push(path.clone());
                }
            }
        }

        let externals = if opts.exclude_external {
            modfile::external_packages(fs.as_ref())
        } else {
            BTreeSet::new()
        };
        let inspect_opts = InspectOptions {
            opts: opts.clone(),
            externals,
            strict: !opts.ignore_errors,
        };

        let mut graph = ImportGraph::new();
        for entry in main_k_list.iter().chain(kcl_yaml_list.iter()) {
            graph.inspect(fs.as_ref(), &vfs::parent(entry), &inspect_opts)?;
        }

        Ok(Self {
            fs,
            opts,
            graph,
            k_list,
            main_k_list,
            project_yaml_dirs,
        })
    }

    /// Member files of one application, optionally with every transitive
    /// dependency file, sorted.
    pub fn app_files(&self, pkgpath: &str, include_deps: bool) -> Vec<String> {
        let direct: BTreeSet<String> = self
            .graph
            .files_of(pkgpath)
            .cloned()
            .unwrap_or_default();
        if !include_deps {
            return direct.into_iter().collect();
        }

        let mut visited = BTreeSet::new();
        for file in &direct {
            self.graph.walk_upstream(file, &mut visited);
        }
        let mut files = direct;
        for node in visited {
            // Closure nodes are files, packages and unresolved module
            // paths; only files belong in the listing.
            if self.graph.pkg_of(&node).is_some() {
                files.insert(node);
            }
        }
        files.into_iter().collect()
    }

    /// Packages one application imports, directly or transitively, sorted.
    pub fn app_pkgs(&self, pkgpath: &str, include_deps: bool) -> Vec<String> {
        let pkgs = if include_deps {
            self.graph.transitive_import_pkgs(pkgpath)
        } else {
            self.graph.package_import_pkgs(pkgpath)
        };
        pkgs.into_iter().collect()
    }

    /// Classifies every discovered application as touched or untouched by
    /// the changed files, via a three-color reachability walk: an
    /// application is untouched only if its root package and all of its
    /// non-boundary imports recursively prove black.
    pub fn touched_apps(&self, changed_files: &[String]) -> (Vec<String>, Vec<String>) {
        let mut colors: BTreeMap<String, Color> = BTreeMap::new();
        let grey = |colors: &mut BTreeMap<String, Color>, path: &str| {
            colors.insert(vfs::parent(path), Color::Grey);
            colors.insert(
                path.strip_suffix(KCL_SUFFIX).unwrap_or(path).to_string(),
                Color::Grey,
            );
            colors.insert(path.to_string(), Color::Grey);
        };

        for changed in changed_files {
            grey(&mut colors, changed);
        }
        // A change under a project directory dirties every source file of
        // that project.
        for changed in changed_files {
            if let Some(project_dir) = self.project_dir_of(changed) {
                let prefix = format!("{project_dir}/");
                for path in &self.k_list {
                    if path == &project_dir || path.starts_with(&prefix) {
                        grey(&mut colors, path);
                    }
                }
            }
        }

        let mut touched = Vec::new();
        let mut untouched = Vec::new();
        let mut in_progress = BTreeSet::new();
        for main_k in &self.main_k_list {
            let app = vfs::parent(main_k);
            if self.check_color(&app, &mut colors, &mut in_progress) != Color::Black {
                touched.push(app);
            } else {
                untouched.push(app);
            }
        }
        (touched, untouched)
    }

    fn check_color(
        &self,
        path: &str,
        colors: &mut BTreeMap<String, Color>,
        in_progress: &mut BTreeSet<String>,
    ) -> Color {
        // Root-level names (builtins included) and plugin packages are
        // graph boundaries: provably unaffected.
        if !path.contains('/') {
            return Color::Black;
        }
        if is_plugin_pkg(path) {
            return Color::Black;
        }
        if let Some(&color) = colors.get(path) {
            if color != Color::White {
                return color;
            }
        }
        // A back edge into a package still being proven cannot grey it.
        if !in_progress.insert(path.to_string()) {
            return Color::Black;
        }

        let mut result = Color::Black;
        for target in self.graph.node_imports(path) {
            if self.check_color(&target, colors, in_progress) != Color::Black {
                result = Color::Grey;
                break;
            }
        }

        in_progress.remove(path);
        colors.insert(path.to_string(), result);
        result
    }

    fn project_dir_of(&self, path: &str) -> Option<String> {
        self.project_yaml_dirs
            .iter()
            .find(|dir| path == *dir || path.starts_with(&format!("{dir}/")))
            .cloned()
    }

    /// True if the package directory is an application: it carries an entry
    /// file or an include-manifest.
    pub fn is_app(&self, pkgpath: &str) -> bool {
        self.fs.is_file(&vfs::join(pkgpath, ENTRY_FILE))
            || self.fs.is_file(&vfs::join(pkgpath, &self.opts.kcl_yaml))
    }

    /// Member files of one package, re-read from the filesystem.
    pub fn pkg_file_list(&self, pkgpath: &str) -> Result<Vec<String>, DepError> {
        package_files(self.fs.as_ref(), pkgpath, &self.opts)
    }

    /// All discovered application entry files.
    pub fn main_k_list(&self) -> &[String] {
        &self.main_k_list
    }

    /// All eligible source files under the root.
    pub fn k_file_list(&self) -> &[String] {
        &self.k_list
    }

    /// All packages the graph knows about, sorted.
    pub fn pkg_list(&self) -> Vec<String> {
        self.graph.pkg_list()
    }

    /// The package-level import map as pretty JSON, keyed by package path.
    pub fn import_map_json(&self) -> String {
        let map: BTreeMap<String, Vec<String>> = self
            .graph
            .pkg_list()
            .into_iter()
            .map(|pkg| {
                let imports = self.graph.package_import_pkgs(&pkg);
                (pkg, imports.into_iter().collect())
            })
            .collect();
        serde_json::to_string_pretty(&map).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn graph(&self) -> &ImportGraph {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::MemFs;

    fn tree() -> MemFs {
        MemFs::from([
            ("kcl.mod", ""),
            ("appops/projectA/dev/main.k", "import base.frontend.server"),
            ("appops/projectB/dev/main.k", "import base.frontend.job"),
            ("base/frontend/server/server.k", "import base.frontend.container"),
            ("base/frontend/job/job.k", "import base.frontend.container"),
            ("base/frontend/container/container.k", "import .container_port"),
            ("base/frontend/container/container_port.k", ""),
        ])
    }

    fn parse(fs: MemFs) -> DepParser {
        DepParser::with_vfs(Box::new(fs), Options::default()).unwrap()
    }

    #[test]
    fn discovers_apps_and_files() {
        let p = parse(tree());
        assert_eq!(
            p.main_k_list(),
            &["appops/projectA/dev/main.k", "appops/projectB/dev/main.k"]
        );
        assert!(p.is_app("appops/projectA/dev"));
        assert!(!p.is_app("base/frontend/server"));
    }

    #[test]
    fn app_files_direct_and_transitive() {
        let p = parse(tree());
        assert_eq!(
            p.app_files("appops/projectA/dev", false),
            vec!["appops/projectA/dev/main.k"]
        );
        assert_eq!(
            p.app_files("appops/projectA/dev", true),
            vec![
                "appops/projectA/dev/main.k",
                "base/frontend/container/container.k",
                "base/frontend/container/container_port.k",
                "base/frontend/server/server.k",
            ]
        );
    }

    #[test]
    fn app_pkgs_direct_and_transitive() {
        let p = parse(tree());
        assert_eq!(
            p.app_pkgs("appops/projectA/dev", false),
            vec!["base/frontend/server"]
        );
        assert_eq!(
            p.app_pkgs("appops/projectA/dev", true),
            vec!["base/frontend/container", "base/frontend/server"]
        );
    }

    #[test]
    fn shared_dependency_touches_both_apps() {
        let p = parse(tree());
        let (touched, untouched) =
            p.touched_apps(&["base/frontend/container/container_port.k".to_string()]);
        assert_eq!(
            touched,
            vec!["appops/projectA/dev", "appops/projectB/dev"]
        );
        assert!(untouched.is_empty());
    }

    #[test]
    fn unrelated_change_touches_nothing() {
        let p = parse(tree());
        let (touched, untouched) = p.touched_apps(&["docs/readme.md".to_string()]);
        assert!(touched.is_empty());
        assert_eq!(
            untouched,
            vec!["appops/projectA/dev", "appops/projectB/dev"]
        );
    }

    #[test]
    fn change_in_one_branch_leaves_the_other_black() {
        let p = parse(tree());
        let (touched, untouched) =
            p.touched_apps(&["base/frontend/server/server.k".to_string()]);
        assert_eq!(touched, vec!["appops/projectA/dev"]);
        assert_eq!(untouched, vec!["appops/projectB/dev"]);
    }

    #[test]
    fn changed_app_file_touches_its_app() {
        let p = parse(tree());
        let (touched, _) = p.touched_apps(&["appops/projectB/dev/main.k".to_string()]);
        assert_eq!(touched, vec!["appops/projectB/dev"]);
    }

    #[test]
    fn project_manifest_widens_the_grey_seed() {
        let mut fs = tree();
        fs.insert("appops/projectA/project.yaml", "name: projectA");
        fs.insert("appops/projectA/base/base.k", "");
        let p = parse(fs);
        // A non-source change inside the project greys every file of it.
        let (touched, _) = p.touched_apps(&["appops/projectA/notes.txt".to_string()]);
        assert_eq!(touched, vec!["appops/projectA/dev"]);
    }

    #[test]
    fn import_cycle_does_not_grey_itself() {
        let fs = MemFs::from([
            ("apps/demo/main.k", "import lib.pkga"),
            ("lib/pkga/a.k", "import lib.pkgb"),
            ("lib/pkgb/b.k", "import lib.pkga"),
        ]);
        let p = parse(fs);
        let (touched, untouched) = p.touched_apps(&["elsewhere/x.k".to_string()]);
        assert!(touched.is_empty());
        assert_eq!(untouched, vec!["apps/demo"]);

        let (touched, _) = p.touched_apps(&["lib/pkgb/b.k".to_string()]);
        assert_eq!(touched, vec!["apps/demo"]);
    }

    #[test]
    fn import_map_json_is_deterministic() {
        let p = parse(tree());
        let a = p.import_map_json();
        let b = p.import_map_json();
        assert_eq!(a, b);
        assert!(a.contains("base/frontend/container"));
    }

    #[test]
    fn strict_mode_surfaces_missing_import() {
        let fs = MemFs::from([("app/main.k", "import not.there")]);
        let err = DepParser::with_vfs(Box::new(fs), Options::default()).err().unwrap();
        assert_eq!(err.to_string(), "package not/there: no kcl file");
    }

    #[test]
    fn lenient_mode_tolerates_missing_import() {
        let fs = MemFs::from([("app/main.k", "import not.there")]);
        let opts = Options {
            ignore_errors: true,
            ..Default::default()
        };
        let p = DepParser::with_vfs(Box::new(fs), opts).unwrap();
        assert_eq!(p.main_k_list(), &["app/main.k"]);
    }
}
