//! Package member-file discovery.
//!
//! A package's files come from the first source that applies: the path
//! itself when it names a file, an include-manifest when the package carries
//! one, and otherwise a directory scan that drops private (`_`-prefixed) and
//! test (`_test.k`) files.

use serde::Deserialize;

use crate::config::{Options, KCL_SUFFIX, MOD_PATH_TOKEN, PRIVATE_PREFIX, TEST_SUFFIX};
use crate::error::DepError;
use crate::vfs::{self, Vfs};

/// Include-manifest layout:
///
/// ```yaml
/// kcl_cli_configs:
///   file:
///     - ${KCL_MOD}/base/pkg/metadata.k
///     - ../base/base.k
///     - main.k
/// ```
#[derive(Debug, Deserialize)]
struct IncludeManifest {
    #[serde(default)]
    kcl_cli_configs: CliConfigs,
}

#[derive(Debug, Default, Deserialize)]
struct CliConfigs {
    #[serde(default, rename = "file")]
    files: Vec<String>,
}

/// Enumerates the member files of `path`.
///
/// A non-empty include-manifest replaces directory scanning entirely; a
/// manifest that fails to load or names a missing path is fatal for the
/// package. A package with no manifest and no matching files yields an empty
/// list; strictness about that is the caller's concern.
pub fn package_files(fs: &dyn Vfs, path: &str, opts: &Options) -> Result<Vec<String>, DepError> {
    if path.ends_with(KCL_SUFFIX) {
        return Ok(vec![path.to_string()]);
    }

    // A file sharing the package's name takes the package's place.
    let as_file = format!("{path}{KCL_SUFFIX}");
    if path != "." && fs.is_file(&as_file) {
        return Ok(vec![as_file]);
    }

    let manifest_path = vfs::join(path, &opts.kcl_yaml);
    if fs.is_file(&manifest_path) {
        let files = manifest_files(fs, path, &manifest_path)?;
        if !files.is_empty() {
            return Ok(files);
        }
    }

    Ok(dir_files(fs, path))
}

fn manifest_files(
    fs: &dyn Vfs,
    pkgpath: &str,
    manifest_path: &str,
) -> Result<Vec<String>, DepError> {
    let src = fs
        .read_to_string(manifest_path)
        .map_err(|e| DepError::Manifest {
            path: manifest_path.to_string(),
            reason: e.to_string(),
        })?;
    let manifest: IncludeManifest =
        serde_yaml::from_str(&src).map_err(|e| DepError::Manifest {
            path: manifest_path.to_string(),
            reason: e.to_string(),
        })?;

    let mut files = Vec::new();
    for entry in manifest.kcl_cli_configs.files {
        let resolved = if let Some(rest) = entry.strip_prefix(MOD_PATH_TOKEN) {
            // Root-token entries resolve against the package root.
            vfs::clean(rest.trim_start_matches('/'))
        } else {
            vfs::join(pkgpath, &entry)
        };
        if !fs.exists(&resolved) {
            return Err(DepError::Manifest {
                path: manifest_path.to_string(),
                reason: format!("{resolved}: no such file or directory"),
            });
        }
        files.push(resolved);
    }
    Ok(files)
}

fn dir_files(fs: &dyn Vfs, path: &str) -> Vec<String> {
    let mut files = Vec::new();
    for entry in fs.read_dir(path) {
        if entry.is_dir
            || !entry.name.ends_with(KCL_SUFFIX)
            || entry.name.starts_with(PRIVATE_PREFIX)
            || entry.name.ends_with(TEST_SUFFIX)
        {
            continue;
        }
        files.push(vfs::join(path, &entry.name));
    }
    files.sort();
    files
}
