//! Error types for Testplane CI primitives

use thiserror::Error;

use crate::exec::PackageManager;

/// Result type alias using the common Error
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "Package manager \"{0}\" is not supported.\nSupported values: {supported}",
        supported = PackageManager::supported_values()
    )]
    UnsupportedPackageManager(String),

    #[error("Command \"{command}\" failed with exit code {code}")]
    CommandFailed { command: String, code: i32 },

    #[error("Command \"{command}\" failed with exit code {code}. Stderr:\n{stderr}")]
    CommandOutputFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Invalid cache key \"{key}\": {reason}")]
    InvalidCacheKey { key: String, reason: String },

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Path traversal detected: {0}")]
    PathTraversal(String),

    #[error("Workflow command error: {0}")]
    Workflow(String),
}
