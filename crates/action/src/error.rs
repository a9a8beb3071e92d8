//! Error types for the Testplane CI step

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error(transparent)]
    Common(#[from] testplane_ci_common::Error),

    #[error("Couldn't parse Testplane config: \"testplane config\" returned invalid json:\n{output}")]
    InvalidConfig {
        output: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Couldn't parse Testplane version: \"{0}\"")]
    InvalidVersion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ActionResult<T> = Result<T, ActionError>;
