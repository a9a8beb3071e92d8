//! Job summary for the Testplane run

use testplane_ci_common::html;
use testplane_ci_common::workflow::{SummaryBuffer, SummarySink};

use crate::error::ActionResult;
use crate::testplane::{FailedTests, PostMortemData};

pub fn write_success_summary(sink: &dyn SummarySink) -> ActionResult<()> {
    SummaryBuffer::new()
        .add_heading(":white_check_mark: Testplane status", 1)
        .add_eol()
        .add_raw("Testplane tests completed successfully", true)
        .write(sink, true)?;

    Ok(())
}

pub fn write_failure_summary(sink: &dyn SummarySink, post_mortem: &PostMortemData) -> ActionResult<()> {
    let mut summary = SummaryBuffer::new();
    summary
        .add_heading(":x: Testplane status", 1)
        .add_eol()
        .add_raw("Testplane tests are failed", true);

    if let Some(report) = post_mortem.failed.as_ref().filter(|report| report.count > 0) {
        summary.add_details(
            &format!("{} failed tests", report.count),
            &failed_tests_html(&report.tests),
        );
    }

    summary.write(sink, true)?;

    Ok(())
}

/// `<ul>` with one item per test title and the browsers it failed in
pub fn failed_tests_html(tests: &FailedTests) -> String {
    let items: String = tests
        .iter()
        .map(|(full_title, browser_ids)| {
            let browsers = browser_ids
                .iter()
                .map(|browser_id| format!("\"{}\"", html::code(browser_id)))
                .collect::<Vec<_>>()
                .join(", ");

            html::list_element(&format!(
                "\"{}\" failed in browsers: {}",
                html::code(full_title),
                browsers
            ))
        })
        .collect();

    html::unordered_list(&items)
}
