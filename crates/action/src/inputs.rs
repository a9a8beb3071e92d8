//! Step inputs and run context
//!
//! The runner passes `with:` inputs as `INPUT_<NAME>` environment variables
//! (name upper-cased, dashes kept). Each input is also a CLI flag so the
//! binary can be driven by hand.

use clap::Args;

/// Inputs declared by the workflow step
#[derive(Debug, Clone, Args)]
pub struct ActionInputs {
    /// Testplane project directory, relative to the checkout root
    #[arg(long, env = "INPUT_CWD", default_value = ".")]
    pub cwd: String,

    /// Package manager used to run Testplane (npm, pnpm or yarn)
    #[arg(long = "package-manager", env = "INPUT_PACKAGE-MANAGER", default_value = "npm")]
    pub package_manager: String,

    /// Prefix of the html-reporter report directory
    #[arg(
        long = "html-report-prefix",
        env = "INPUT_HTML-REPORT-PREFIX",
        default_value = "testplane-reports"
    )]
    pub html_report_prefix: String,

    /// Testplane config path
    #[arg(long = "config-path", env = "INPUT_CONFIG-PATH", default_value = "")]
    pub config_path: String,

    /// Run storybook tests ("true" to enable)
    #[arg(long, env = "INPUT_STORYBOOK", default_value = "")]
    pub storybook: String,

    /// Comma-separated list of test sets
    #[arg(long, env = "INPUT_SET", default_value = "")]
    pub set: String,

    /// Comma-separated list of browser ids
    #[arg(long, env = "INPUT_BROWSER", default_value = "")]
    pub browser: String,

    /// Run only tests matching this pattern
    #[arg(long, env = "INPUT_GREP", default_value = "")]
    pub grep: String,
}

impl Default for ActionInputs {
    fn default() -> Self {
        Self {
            cwd: ".".to_string(),
            package_manager: "npm".to_string(),
            html_report_prefix: "testplane-reports".to_string(),
            config_path: String::new(),
            storybook: String::new(),
            set: String::new(),
            browser: String::new(),
            grep: String::new(),
        }
    }
}

impl ActionInputs {
    pub fn cwd(&self) -> &str {
        non_empty(&self.cwd).unwrap_or(".")
    }

    pub fn package_manager(&self) -> &str {
        non_empty(&self.package_manager).unwrap_or("npm")
    }

    pub fn html_report_prefix(&self) -> &str {
        non_empty(&self.html_report_prefix).unwrap_or("testplane-reports")
    }

    pub fn config_path(&self) -> Option<&str> {
        non_empty(&self.config_path)
    }

    pub fn storybook_enabled(&self) -> bool {
        self.storybook.trim() == "true"
    }

    pub fn sets(&self) -> Vec<&str> {
        split_list(&self.set)
    }

    pub fn browsers(&self) -> Vec<&str> {
        split_list(&self.browser)
    }

    pub fn grep(&self) -> Option<&str> {
        non_empty(&self.grep)
    }
}

/// Workflow run identifiers used in the report path
#[derive(Debug, Clone, Args)]
pub struct RunContext {
    #[arg(long = "run-id", env = "GITHUB_RUN_ID", default_value = "0", hide = true)]
    pub run_id: String,

    #[arg(long = "run-number", env = "GITHUB_RUN_NUMBER", default_value = "0", hide = true)]
    pub run_number: String,
}

impl RunContext {
    pub fn new(run_id: impl Into<String>, run_number: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            run_number: run_number.into(),
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new("0", "0")
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn split_list(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}
