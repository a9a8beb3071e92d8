//! Testplane CI Common Library
//!
//! CI platform primitives used by the Testplane CI step: package-manager
//! execution, browser cache transfer, workflow outputs, job summaries and
//! workflow-command logging.

pub mod cache;
pub mod error;
pub mod exec;
pub mod hash;
pub mod html;
pub mod workflow;

// Re-export commonly used types
pub use cache::{CacheBackend, DirectoryCache, DisabledCache};
pub use error::{Error, Result};
pub use exec::{ExecOptions, PackageManager, PackageManagerExec, PackageManagerRunner};
pub use hash::calc_sha256;

/// Expand a leading `~` against the home directory
pub fn expand_home(path: &str) -> std::path::PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => rest,
        _ => return std::path::PathBuf::from(path),
    };

    match dirs::home_dir() {
        Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
        None => std::path::PathBuf::from(path),
    }
}
