//! `tracing` output rendered as workflow commands

use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

use crate::workflow::command::{escape_data, is_debug};

/// Event formatter that maps levels to runner annotations.
///
/// ERROR and WARN become `::error::` / `::warning::`, DEBUG and TRACE become
/// `::debug::` (hidden unless step debugging is on), INFO is printed as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowCommandFormat;

impl<S, N> FormatEvent<S, N> for WorkflowCommandFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut message = String::new();
        ctx.format_fields(Writer::new(&mut message), event)?;

        match *event.metadata().level() {
            Level::ERROR => writeln!(writer, "::error::{}", escape_data(&message)),
            Level::WARN => writeln!(writer, "::warning::{}", escape_data(&message)),
            Level::INFO => writeln!(writer, "{}", message),
            _ => writeln!(writer, "::debug::{}", escape_data(&message)),
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the defaults.
pub fn init(verbose: bool) {
    let log_level = if verbose || is_debug() { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .event_format(WorkflowCommandFormat)
        .with_writer(std::io::stdout)
        .init();
}
