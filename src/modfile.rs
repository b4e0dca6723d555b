//! Dependency-manifest reading.
//!
//! Only the `[dependencies]` key names are consulted, to decide which
//! import roots are declared-external. A missing or malformed manifest
//! degrades to "no external dependencies".

use std::collections::BTreeSet;

use crate::config::MOD_FILE;
use crate::vfs::Vfs;

/// External package names declared in the root `kcl.mod`.
pub fn external_packages(fs: &dyn Vfs) -> BTreeSet<String> {
    let Ok(src) = fs.read_to_string(MOD_FILE) else {
        return BTreeSet::new();
    };
    let Ok(doc) = src.parse::<toml::Table>() else {
        return BTreeSet::new();
    };
    doc.get("dependencies")
        .and_then(|v| v.as_table())
        .map(|deps| deps.keys().cloned().collect())
        .unwrap_or_default()
}
