//! GitHub Actions workflow primitives
//!
//! Output binding, job summaries, log groups, platform naming and a
//! `tracing` formatter that speaks workflow commands.

pub mod command;
pub mod logging;
pub mod outputs;
pub mod platform;
pub mod summary;

// Re-export commonly used items
pub use command::{escape_data, escape_property, group, is_debug, set_failed};
pub use outputs::{GithubOutputs, OutputSink};
pub use platform::Platform;
pub use summary::{GithubStepSummary, SummaryBuffer, SummarySink};
