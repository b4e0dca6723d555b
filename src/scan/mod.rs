//! Lightweight textual scanning: import extraction, path resolution and
//! package member-file discovery. No real parser is involved.

pub mod discover;
pub mod imports;
pub mod resolve;

pub use discover::package_files;
pub use imports::scan_imports;
pub use resolve::{fix_path, resolve_import};
