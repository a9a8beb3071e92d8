//! Job summary rendering

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::html;

/// Destination for rendered job summary markup
pub trait SummarySink: Send + Sync {
    fn write(&self, content: &str, overwrite: bool) -> Result<()>;
}

/// The `$GITHUB_STEP_SUMMARY` file
#[derive(Debug, Clone, Default)]
pub struct GithubStepSummary {
    file: Option<PathBuf>,
}

impl GithubStepSummary {
    pub fn from_env() -> Self {
        Self {
            file: std::env::var_os("GITHUB_STEP_SUMMARY")
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

impl SummarySink for GithubStepSummary {
    fn write(&self, content: &str, overwrite: bool) -> Result<()> {
        let Some(file) = &self.file else {
            debug!("GITHUB_STEP_SUMMARY is not set, dropping job summary");
            return Ok(());
        };

        let mut options = OpenOptions::new();
        if overwrite {
            options.write(true).create(true).truncate(true);
        } else {
            options.append(true).create(true);
        }

        let mut summary = options.open(file)?;
        summary.write_all(content.as_bytes())?;

        Ok(())
    }
}

/// Accumulates summary markup until it is flushed to a sink
#[derive(Debug, Clone, Default)]
pub struct SummaryBuffer {
    buffer: String,
}

impl SummaryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn empty_buffer(&mut self) -> &mut Self {
        self.buffer.clear();
        self
    }

    /// Heading level is clamped to 1..=6
    pub fn add_heading(&mut self, text: &str, level: u8) -> &mut Self {
        let level = level.clamp(1, 6);
        self.add_raw(&format!("<h{level}>{text}</h{level}>"), true)
    }

    pub fn add_eol(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    pub fn add_raw(&mut self, text: &str, add_eol: bool) -> &mut Self {
        self.buffer.push_str(text);
        if add_eol {
            self.add_eol();
        }
        self
    }

    pub fn add_details(&mut self, label: &str, content: &str) -> &mut Self {
        self.add_raw(&html::details(label, content), true)
    }

    /// Flush to the sink and clear the buffer
    pub fn write(&mut self, sink: &dyn SummarySink, overwrite: bool) -> Result<&mut Self> {
        sink.write(&self.buffer, overwrite)?;
        Ok(self.empty_buffer())
    }
}
