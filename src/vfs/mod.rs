//! Read-only filesystem abstraction.
//!
//! All engine paths are normalized, forward-slash, root-relative strings;
//! `"."` names the root package. [`DiskFs`] serves a real directory tree,
//! [`MemFs`] serves an in-memory map and is what tests build fixtures with.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

/// A directory entry as seen through a [`Vfs`].
#[derive(Debug, Clone)]
pub struct FsEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Read-only hierarchical store. The engine only lists, stats and reads.
pub trait Vfs {
    fn read_to_string(&self, path: &str) -> io::Result<String>;
    fn is_file(&self, path: &str) -> bool;
    fn is_dir(&self, path: &str) -> bool;

    /// Entries of a directory. A missing or unreadable directory yields an
    /// empty list; discovery treats that the same as an empty package.
    fn read_dir(&self, path: &str) -> Vec<FsEntry>;

    /// Every file under the root, sorted, `.git` excluded.
    fn walk_files(&self) -> Vec<String>;

    fn exists(&self, path: &str) -> bool {
        self.is_file(path) || self.is_dir(path)
    }
}

/// Lexically cleans a slash path: drops empty and `.` segments and resolves
/// `..` where possible. Returns `"."` for an empty result.
pub fn clean(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if matches!(out.last(), Some(&"..")) || out.is_empty() {
                    out.push("..");
                } else {
                    out.pop();
                }
            }
            s => out.push(s),
        }
    }
    if out.is_empty() {
        ".".to_string()
    } else {
        out.join("/")
    }
}

/// Joins and cleans two slash paths.
pub fn join(base: &str, rel: &str) -> String {
    if base == "." || base.is_empty() {
        clean(rel)
    } else {
        clean(&format!("{base}/{rel}"))
    }
}

/// Parent directory of a slash path; `"."` for root-level names.
pub fn parent(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, _)) => dir.to_string(),
        None => ".".to_string(),
    }
}

/// Last component of a slash path.
pub fn file_name(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((_, name)) => name,
        None => path,
    }
}

/// A [`Vfs`] rooted at a directory on disk.
pub struct DiskFs {
    root: PathBuf,
}

impl DiskFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        if path == "." {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }
}

impl Vfs for DiskFs {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(self.resolve(path))
    }

    fn is_file(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn is_dir(&self, path: &str) -> bool {
        self.resolve(path).is_dir()
    }

    fn read_dir(&self, path: &str) -> Vec<FsEntry> {
        let mut entries = Vec::new();
        if let Ok(iter) = std::fs::read_dir(self.resolve(path)) {
            for entry in iter.flatten() {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                entries.push(FsEntry {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    is_dir,
                });
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    fn walk_files(&self) -> Vec<String> {
        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();

        let mut files = Vec::new();
        for entry in walker.flatten() {
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(&self.root) {
                files.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
        files.sort();
        files
    }
}

/// An in-memory [`Vfs`] keyed by root-relative path.
#[derive(Debug, Clone, Default)]
pub struct MemFs {
    files: BTreeMap<String, String>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, content: &str) -> &mut Self {
        self.files.insert(path.to_string(), content.to_string());
        self
    }
}

impl<const N: usize> From<[(&str, &str); N]> for MemFs {
    fn from(entries: [(&str, &str); N]) -> Self {
        let mut fs = MemFs::new();
        for (path, content) in entries {
            fs.insert(path, content);
        }
        fs
    }
}

impl Vfs for MemFs {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{path}: not found")))
    }

    fn is_file(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn is_dir(&self, path: &str) -> bool {
        if path == "." {
            return true;
        }
        let prefix = format!("{path}/");
        self.files.keys().any(|k| k.starts_with(&prefix))
    }

    fn read_dir(&self, path: &str) -> Vec<FsEntry> {
        let prefix = if path == "." {
            String::new()
        } else {
            format!("{path}/")
        };
        let mut entries: BTreeMap<String, bool> = BTreeMap::new();
        for key in self.files.keys() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    entries.insert(dir.to_string(), true);
                }
                None => {
                    entries.insert(rest.to_string(), false);
                }
            }
        }
        entries
            .into_iter()
            .map(|(name, is_dir)| FsEntry { name, is_dir })
            .collect()
    }

    fn walk_files(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }
}
