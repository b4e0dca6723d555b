//! Boundary name tables: standard-library modules and the plugin namespace.
//!
//! Both are graph-boundary sinks: edges may point at them, but they are
//! never expanded or recursed into.

/// Standard-library module names.
pub const STANDARD_SYSTEM_MODULES: &[&str] = &[
    "collection",
    "net",
    "manifests",
    "math",
    "datetime",
    "regex",
    "yaml",
    "json",
    "crypto",
    "base64",
    "units",
    "file",
    "template",
    "runtime",
];

/// Reserved plugin namespace prefix.
pub const PLUGIN_PREFIX: &str = "kcl_plugin";

pub fn is_builtin_pkg(pkgpath: &str) -> bool {
    STANDARD_SYSTEM_MODULES.contains(&pkgpath)
}

pub fn is_plugin_pkg(pkgpath: &str) -> bool {
    pkgpath == PLUGIN_PREFIX
        || pkgpath.starts_with("kcl_plugin/")
        || pkgpath.starts_with("kcl_plugin.")
}
