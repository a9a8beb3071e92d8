//! html-reporter report location

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::inputs::RunContext;

/// `YYYY-MM-DD` in UTC
pub fn utc_date_string(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// Root-relative report directory: `<prefix>/<date>/<run id>/<run number>`
pub fn html_reporter_report_path(prefix: &str, date: &str, run: &RunContext) -> PathBuf {
    [prefix, date, run.run_id.as_str(), run.run_number.as_str()]
        .iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_utc_date_string_pads() {
        let date = Utc.with_ymd_and_hms(2025, 1, 5, 23, 59, 0).unwrap();
        assert_eq!(utc_date_string(date), "2025-01-05");
    }

    #[test]
    fn test_report_path() {
        let run = RunContext::new("12819471512", "1");
        assert_eq!(
            html_reporter_report_path("testplane-reports", "2025-01-01", &run),
            PathBuf::from("testplane-reports")
                .join("2025-01-01")
                .join("12819471512")
                .join("1")
        );
    }
}
