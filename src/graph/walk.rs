//! Transitive-closure walkers over the import graph.
//!
//! Both directions carry an explicit visited set, so cyclic graphs
//! terminate and diamonds are visited once. Package-granularity and
//! file-granularity nodes interleave: a package target fans out into its
//! member files, and every visited file drags its owning package into the
//! closure. The root package `"."` never enters a closure.

use std::collections::BTreeSet;

use crate::config::KCL_SUFFIX;
use crate::vfs;

use super::ImportGraph;

impl ImportGraph {
    /// Walks the targets `from` imports, transitively, collecting every
    /// newly seen node into `visited`. `from` itself is not collected
    /// unless a cycle leads back to it.
    pub fn walk_upstream(&self, from: &str, visited: &mut BTreeSet<String>) {
        let Some(nexts) = self.imports_of(from) else {
            return;
        };
        for next in nexts {
            if !visited.insert(next.clone()) {
                continue;
            }
            if let Some(files) = self.files_of(next) {
                // A package target fans out to the package node and every
                // member file.
                for file in files {
                    if visited.insert(file.clone()) {
                        self.walk_upstream(file, visited);
                    }
                }
            } else {
                if let Some(pkg) = self.pkg_of(next) {
                    if pkg != "." {
                        visited.insert(pkg.to_string());
                    }
                }
                self.walk_upstream(next, visited);
            }
        }
    }

    /// Walks the sources importing `from`, transitively. A file's owning
    /// package is always part of its downstream closure.
    pub fn walk_downstream(&self, from: &str, visited: &mut BTreeSet<String>) {
        let mut nexts: Vec<String> = self
            .imported_by_of(from)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default();
        if let Some(pkg) = self.pkg_of(from) {
            nexts.push(pkg.to_string());
        }
        for next in nexts {
            if next == "." {
                continue;
            }
            if !visited.insert(next.clone()) {
                continue;
            }
            self.walk_downstream(&next, visited);
        }
    }

    /// Registers a file that no longer exists on disk so downstream queries
    /// can still reach its live importers: the file's directory becomes its
    /// owning package, and the returned module-form path (suffix stripped)
    /// must join the active seed set, because importers may reference either
    /// spelling.
    pub fn register_deleted_file(&mut self, path: &str) -> String {
        let pkgpath = vfs::parent(path);
        self.file_pkg.insert(path.to_string(), pkgpath.clone());
        self.pkg_files
            .entry(pkgpath)
            .or_default()
            .insert(path.to_string());
        path.strip_suffix(KCL_SUFFIX).unwrap_or(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::super::{ImportGraph, InspectOptions};
    use crate::vfs::MemFs;
    use std::collections::BTreeSet;

    fn build(fs: &MemFs, seeds: &[&str]) -> ImportGraph {
        let mut graph = ImportGraph::new();
        let inspect_opts = InspectOptions::default();
        for seed in seeds {
            graph.inspect(fs, seed, &inspect_opts).unwrap();
        }
        graph
    }

    fn upstream(graph: &ImportGraph, from: &str) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();
        graph.walk_upstream(from, &mut visited);
        visited
    }

    fn downstream(graph: &ImportGraph, from: &str) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();
        graph.walk_downstream(from, &mut visited);
        visited
    }

    fn demo_tree() -> MemFs {
        MemFs::from([
            ("main.k", "import base.b"),
            ("base/a.k", ""),
            ("base/b.k", "import .a"),
        ])
    }

    #[test]
    fn upstream_through_file_import() {
        let fs = demo_tree();
        let graph = build(&fs, &["main.k"]);
        let expect: BTreeSet<String> = ["base", "base/a.k", "base/b.k"]
            .map(String::from)
            .into();
        assert_eq!(upstream(&graph, "main.k"), expect);
    }

    #[test]
    fn upstream_through_package_import_matches_file_import() {
        let fs = MemFs::from([
            ("main.k", "import base"),
            ("base/a.k", ""),
            ("base/b.k", "import .a"),
        ]);
        let graph = build(&fs, &["main.k"]);
        let expect: BTreeSet<String> = ["base", "base/a.k", "base/b.k"]
            .map(String::from)
            .into();
        assert_eq!(upstream(&graph, "main.k"), expect);
    }

    #[test]
    fn upstream_and_downstream_are_inverse() {
        let fs = demo_tree();
        let graph = build(&fs, &["main.k"]);
        // B in upstream(A) iff A in downstream(B), over the file nodes.
        for a in graph.file_list() {
            for b in graph.file_list() {
                let up = upstream(&graph, &a).contains(&b);
                let down = downstream(&graph, &b).contains(&a);
                assert_eq!(up, down, "inverse relation violated for {a} / {b}");
            }
        }
    }

    #[test]
    fn cycle_closure_contains_start_once() {
        let fs = MemFs::from([("a/a.k", "import b"), ("b/b.k", "import a")]);
        let graph = build(&fs, &["a/a.k"]);
        let down = downstream(&graph, "a/a.k");
        // a/a.k re-enters its own closure via b, exactly once.
        assert!(down.contains("a/a.k"));
        assert!(down.contains("b/b.k"));
        let up = upstream(&graph, "a/a.k");
        assert!(up.contains("a/a.k"));
    }

    #[test]
    fn downstream_includes_owning_package() {
        let fs = demo_tree();
        let graph = build(&fs, &["main.k"]);
        let down = downstream(&graph, "base/b.k");
        assert!(down.contains("base"));
        assert!(down.contains("main.k"));
        // Root package never appears.
        assert!(!down.contains("."));
    }

    #[test]
    fn register_deleted_file_synthesizes_package_and_module_form() {
        let fs = MemFs::from([("main.k", "import base.b"), ("base/b.k", "import .a")]);
        let mut graph = ImportGraph::new();
        graph
            .inspect(&fs, "main.k", &InspectOptions::default())
            .unwrap();
        let module = graph.register_deleted_file("base/a.k");
        assert_eq!(module, "base/a");
        assert_eq!(graph.pkg_of("base/a.k"), Some("base"));
        assert!(graph.files_of("base").unwrap().contains("base/a.k"));
    }
}
