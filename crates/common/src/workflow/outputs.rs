//! Step output binding

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::workflow::command::{escape_data, escape_property};

/// Destination for named step outputs
pub trait OutputSink: Send + Sync {
    fn set_output(&self, name: &str, value: &str) -> Result<()>;
}

/// Outputs written to the `$GITHUB_OUTPUT` file
#[derive(Debug, Clone, Default)]
pub struct GithubOutputs {
    file: Option<PathBuf>,
}

impl GithubOutputs {
    pub fn from_env() -> Self {
        Self {
            file: std::env::var_os("GITHUB_OUTPUT")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn with_file(path: impl AsRef<Path>) -> Self {
        Self {
            file: Some(path.as_ref().to_path_buf()),
        }
    }
}

impl OutputSink for GithubOutputs {
    fn set_output(&self, name: &str, value: &str) -> Result<()> {
        debug!("Setting output {}={}", name, value);

        let Some(file) = &self.file else {
            // Runners without file commands still understand the legacy form
            println!("::set-output name={}::{}", escape_property(name), escape_data(value));
            return Ok(());
        };

        let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
        if name.contains(&delimiter) || value.contains(&delimiter) {
            return Err(Error::Workflow(format!(
                "Unexpected input: name or value contains the delimiter {}",
                delimiter
            )));
        }

        let mut output = OpenOptions::new().create(true).append(true).open(file)?;
        write!(output, "{name}<<{delimiter}\n{value}\n{delimiter}\n")?;

        Ok(())
    }
}
