//! Package root discovery.

use std::path::{Path, PathBuf};

use crate::config::MOD_FILE;
use crate::error::DepError;

/// Finds the package root for `work_dir`: the nearest ancestor directory
/// (including `work_dir` itself) containing a `kcl.mod` marker.
///
/// Returns the absolute root plus the root-relative package path of
/// `work_dir` (`"."` when the work directory is the root). A single
/// `${ENV}` token in `work_dir` is expanded from the environment first.
pub fn find_pkg_root(work_dir: &str) -> Result<(PathBuf, String), DepError> {
    let expanded = expand_env(work_dir);
    let wd = if expanded.is_empty() {
        std::env::current_dir().map_err(|_| DepError::PkgRootNotFound)?
    } else {
        PathBuf::from(expanded)
    };
    let wd = absolutize(&wd);

    let mut root = wd.clone();
    loop {
        if root.join(MOD_FILE).is_file() {
            let pkgpath = match wd.strip_prefix(&root) {
                Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
                Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
                Err(_) => ".".to_string(),
            };
            return Ok((root, pkgpath));
        }
        if !root.pop() {
            return Err(DepError::PkgRootNotFound);
        }
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

fn expand_env(work_dir: &str) -> String {
    let Some(start) = work_dir.find("${") else {
        return work_dir.to_string();
    };
    let Some(end) = work_dir[start..].find('}').map(|i| start + i) else {
        return work_dir.to_string();
    };
    let key = &work_dir[start + 2..end];
    let value = std::env::var(key).unwrap_or_default();
    format!("{}{}{}", &work_dir[..start], value, &work_dir[end + 1..])
}
