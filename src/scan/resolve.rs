//! Import path resolution.
//!
//! Turns a raw dotted import target plus the importing file's location into
//! a canonical, root-relative slash path, and optionally pins a resolved
//! path to an on-disk file.

use crate::config::KCL_SUFFIX;
use crate::vfs::{self, Vfs};

/// Resolves a raw import target against the file that declares it.
///
/// A target with no leading dot is an absolute dotted package path. A
/// leading-dot run of length D selects the importing package itself (D = 1)
/// or an ancestor D-1 levels up; a run deeper than the package path escapes
/// the root and is kept as a literal `..` chain.
pub fn resolve_import(source_file: &str, import_path: &str) -> String {
    if !import_path.starts_with('.') {
        return import_path.replace('.', "/");
    }

    let pkgpath = if source_file.ends_with(KCL_SUFFIX) {
        vfs::parent(source_file)
    } else {
        source_file.to_string()
    };

    let trimmed = import_path.trim_start_matches('.');
    let dots = import_path.len() - trimmed.len();
    let suffix = trimmed.replace('.', "/");

    if dots == 1 {
        if pkgpath == "." {
            return suffix;
        }
        return format!("{pkgpath}/{suffix}");
    }

    let up = dots - 1;
    let segments: Vec<&str> = pkgpath.split('/').collect();
    if up <= segments.len() {
        let mut parts: Vec<&str> = segments[..segments.len() - up].to_vec();
        parts.push(&suffix);
        parts.join("/")
    } else {
        // Would escape the root; keep the climb explicit.
        let mut out = pkgpath;
        for _ in 0..up {
            out.push_str("/..");
        }
        format!("{out}/{suffix}")
    }
}

/// Pins a resolved path to what is actually on disk: a path already carrying
/// the source suffix is kept; an existing directory is kept as a package
/// path; otherwise, if a same-named source file exists, the suffix is
/// appended. Anything else is returned unchanged, unresolved, which is what
/// deleted-file analysis relies on.
pub fn fix_path(fs: &dyn Vfs, path: &str) -> String {
    if path.ends_with(KCL_SUFFIX) {
        return path.to_string();
    }
    if fs.is_dir(path) {
        return path.to_string();
    }
    let with_suffix = format!("{path}{KCL_SUFFIX}");
    if fs.is_file(&with_suffix) {
        return with_suffix;
    }
    path.to_string()
}
