//! Workflow commands understood by the GitHub Actions runner

use std::future::Future;

/// Escape a workflow command message
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a workflow command property value
pub fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// Whether the runner has step debug logging enabled
pub fn is_debug() -> bool {
    std::env::var("RUNNER_DEBUG").as_deref() == Ok("1")
}

/// Mark the step as failed; the caller is responsible for the exit status
pub fn set_failed(message: &str) {
    println!("::error::{}", escape_data(message));
}

pub fn start_group(name: &str) {
    println!("::group::{}", escape_data(name));
}

pub fn end_group() {
    println!("::endgroup::");
}

/// Run a future inside a collapsible log group
pub async fn group<F, T>(name: &str, fut: F) -> T
where
    F: Future<Output = T>,
{
    start_group(name);
    let result = fut.await;
    end_group();
    result
}
