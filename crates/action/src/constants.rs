//! Names shared with the Testplane CLI and the workflow definition

/// `gridUrl` value that makes Testplane launch locally installed browsers
pub const LOCAL_GRID_URL: &str = "local";

/// Where Testplane keeps downloaded browsers unless told otherwise
pub const TESTPLANE_BROWSERS_DEFAULT_PATH: &str = "~/.testplane";

/// Override for the browsers directory
pub const TESTPLANE_BROWSERS_PATH_ENV: &str = "TESTPLANE_BROWSERS_PATH";

/// Environment variable html-reporter reads its report path from
pub const HTML_REPORTER_PATH_ENV: &str = "html_reporter_path";

pub const CACHE_KEY_INFIX: &str = "testplane_browsers";

/// Step outputs
pub mod output {
    pub const HTML_REPORT_PATH: &str = "html-report-path";
    pub const FAILED_TESTS_PATH: &str = "failed-tests-path";
    pub const EXIT_CODE: &str = "exit-code";
}

pub mod plugin {
    pub const HTML_REPORTER: &str = "html-reporter/testplane";
}
