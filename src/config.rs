//! Options and file-name conventions for dependency parsing.

use serde::{Deserialize, Serialize};

/// Source file suffix.
pub const KCL_SUFFIX: &str = ".k";
/// Test files are excluded from package discovery.
pub const TEST_SUFFIX: &str = "_test.k";
/// Files with this prefix are private and excluded from package discovery.
pub const PRIVATE_PREFIX: &str = "_";
/// Conventional application entry file.
pub const ENTRY_FILE: &str = "main.k";
/// Package root marker file.
pub const MOD_FILE: &str = "kcl.mod";
/// Root-token placeholder usable in include-manifest entries.
pub const MOD_PATH_TOKEN: &str = "${KCL_MOD}";

pub const DEFAULT_KCL_YAML: &str = "kcl.yaml";
pub const DEFAULT_PROJECT_YAML: &str = "project.yaml";

/// Options for the whole-tree and single-application parsers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Options {
    /// Per-package include-manifest file name.
    pub kcl_yaml: String,
    /// Per-directory project grouping manifest file name.
    pub project_yaml: String,
    /// Include transitive dependency files in `dep_files` listings.
    pub all: bool,
    /// Return absolute paths (joined to the package root) instead of
    /// root-relative ones.
    pub use_abs_path: bool,
    /// Treat package names declared in the `kcl.mod` dependencies table as
    /// graph-boundary sinks.
    pub exclude_external: bool,
    /// Lenient mode: a reachable package matching zero source files degrades
    /// to an empty file list instead of aborting construction.
    pub ignore_errors: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            kcl_yaml: DEFAULT_KCL_YAML.to_string(),
            project_yaml: DEFAULT_PROJECT_YAML.to_string(),
            all: false,
            use_abs_path: false,
            exclude_external: false,
            ignore_errors: false,
        }
    }
}

/// Options for upstream/downstream queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepOptions {
    /// Root-relative seed paths; graph construction starts here.
    pub files: Vec<String>,
    /// Root-relative paths whose content changed. Downstream queries walk
    /// from these. Entries may name files that no longer exist on disk.
    pub changed_paths: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_manifest_names() {
        let opts = Options::default();
        assert_eq!(opts.kcl_yaml, "kcl.yaml");
        assert_eq!(opts.project_yaml, "project.yaml");
        assert!(!opts.ignore_errors);
    }
}
