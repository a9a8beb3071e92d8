//! Testplane CLI facade

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use testplane_ci_common::workflow::OutputSink;
use testplane_ci_common::{ExecOptions, PackageManagerExec};

use crate::constants::{output, HTML_REPORTER_PATH_ENV};
use crate::error::{ActionError, ActionResult};
use crate::inputs::{ActionInputs, RunContext};
use crate::paths::WorkingDir;
use crate::report::{html_reporter_report_path, utc_date_string};
use crate::testplane::config::ResolvedConfig;
use crate::testplane::postmortem::{FailedTest, FailedTestsReport, PostMortemData};

/// `testplane --version`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl FromStr for Version {
    type Err = ActionError;

    /// Missing components read as 0, extra ones are ignored
    fn from_str(output: &str) -> ActionResult<Self> {
        let mut numbers = [0u64; 3];

        for (slot, component) in numbers.iter_mut().zip(output.trim().split('.')) {
            *slot = component
                .trim()
                .parse()
                .map_err(|_| ActionError::InvalidVersion(output.to_string()))?;
        }

        let [major, minor, patch] = numbers;
        Ok(Self { major, minor, patch })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Source of the config snapshot and browser list used for cache keys
#[async_trait]
pub trait BrowserInventory: Send + Sync {
    async fn config(&self) -> ActionResult<&ResolvedConfig>;

    async fn list_browsers(&self) -> ActionResult<&str>;
}

/// Testplane driven through a package manager.
///
/// `version`, `list_browsers` and `config` spawn a process on first use only.
pub struct Testplane<E: PackageManagerExec> {
    pm: E,
    inputs: ActionInputs,
    run: RunContext,
    workdir: WorkingDir,
    outputs: Arc<dyn OutputSink>,
    report_date: Option<String>,
    version: OnceCell<Version>,
    browsers: OnceCell<String>,
    config: OnceCell<ResolvedConfig>,
}

impl<E: PackageManagerExec> Testplane<E> {
    pub fn new(pm: E, inputs: ActionInputs, run: RunContext, outputs: Arc<dyn OutputSink>) -> Self {
        let workdir = WorkingDir::new(inputs.cwd());

        Self {
            pm,
            inputs,
            run,
            workdir,
            outputs,
            report_date: None,
            version: OnceCell::new(),
            browsers: OnceCell::new(),
            config: OnceCell::new(),
        }
    }

    /// Resolve root-relative paths against `root` instead of the process directory
    pub fn with_checkout_root(mut self, root: impl AsRef<Path>) -> Self {
        self.workdir = WorkingDir::with_root(root, self.inputs.cwd());
        self
    }

    /// Pin the report date instead of using today's UTC date
    pub fn with_report_date(mut self, date: impl Into<String>) -> Self {
        self.report_date = Some(date.into());
        self
    }

    pub fn executor(&self) -> &E {
        &self.pm
    }

    pub fn workdir(&self) -> &WorkingDir {
        &self.workdir
    }

    pub async fn version(&self) -> ActionResult<Version> {
        let version = self
            .version
            .get_or_try_init(|| async {
                let output = self
                    .pm
                    .exec_output(&self.with_config(&["--version"]), ExecOptions::default())
                    .await?;
                output.parse::<Version>()
            })
            .await?;

        Ok(*version)
    }

    pub async fn list_browsers(&self) -> ActionResult<&str> {
        let browsers = self
            .browsers
            .get_or_try_init(|| async {
                let output = self
                    .pm
                    .exec_output(&self.with_config(&["list-browsers"]), ExecOptions::default())
                    .await?;
                Ok::<_, ActionError>(output)
            })
            .await?;

        Ok(browsers.as_str())
    }

    pub async fn config(&self) -> ActionResult<&ResolvedConfig> {
        self.config
            .get_or_try_init(|| async {
                let output = self
                    .pm
                    .exec_output(&self.with_config(&["config"]), ExecOptions::default())
                    .await?;
                ResolvedConfig::from_json(&output)
            })
            .await
    }

    pub async fn install_dependencies(&self) -> ActionResult<()> {
        let config = self.config().await?;

        if !config.is_using_local_browsers() {
            debug!("Skip installing dependencies as gridUrl is not matching");
            return Ok(());
        }

        debug!("Running Testplane install-deps");

        self.pm
            .exec(&self.with_config(&["install-deps"]), ExecOptions::default().loud())
            .await?;

        Ok(())
    }

    /// Run the tests. A failing run is reported through the exit code.
    pub async fn run(&self) -> ActionResult<i32> {
        let config = self.config().await?;
        let has_html_reporter = config.has_html_reporter_plugin();

        let report_path = self.html_report_path();
        let report_env_path = self.workdir.invocation_relative(&report_path);

        let overrides = BTreeMap::from([(
            HTML_REPORTER_PATH_ENV.to_string(),
            report_env_path.display().to_string(),
        )]);
        let env = compose_env(overrides, ambient_env());

        debug!(
            "Running Testplane with {} config",
            self.inputs.config_path().unwrap_or("default")
        );

        let exit_code = self
            .pm
            .exec(&self.cli_command(), ExecOptions::default().loud().no_throw().with_env(env))
            .await?;

        debug!("Testplane finished with exit code {}", exit_code);

        self.outputs.set_output(output::EXIT_CODE, &exit_code.to_string())?;

        if !has_html_reporter {
            debug!(
                "Skip setting output {} as there is not enabled html-reporter",
                output::HTML_REPORT_PATH
            );
            return Ok(exit_code);
        }

        if self.workdir.resolve(&report_path).exists() {
            self.outputs
                .set_output(output::HTML_REPORT_PATH, &report_path.display().to_string())?;
        } else {
            debug!(
                "Not setting {} because \"{}\" is absent.\nProbably Testplane run crashed.",
                output::HTML_REPORT_PATH,
                report_env_path.display()
            );
        }

        Ok(exit_code)
    }

    /// Failed tests of the last run. Read problems degrade to unavailable data.
    pub async fn get_post_mortem_data(&self) -> ActionResult<PostMortemData> {
        let config = self.config().await?;
        let failed_tests_path = self
            .workdir
            .root_relative(config.last_failed_tests_json_path());

        match self.read_failed_tests(&failed_tests_path).await {
            Ok(report) => Ok(PostMortemData {
                failed: Some(report),
            }),
            Err(e) => {
                warn!("Unable to parse Testplane failed tests: {}", e);
                Ok(PostMortemData::unavailable())
            }
        }
    }

    async fn read_failed_tests(&self, root_relative: &Path) -> ActionResult<FailedTestsReport> {
        let content = tokio::fs::read_to_string(self.workdir.resolve(root_relative)).await?;
        let records: Vec<FailedTest> = serde_json::from_str(&content)?;
        let report = FailedTestsReport::from_records(&records);

        self.outputs
            .set_output(output::FAILED_TESTS_PATH, &root_relative.display().to_string())?;

        Ok(report)
    }

    /// Root-relative html-reporter directory for this run
    pub fn html_report_path(&self) -> PathBuf {
        let date = self
            .report_date
            .clone()
            .unwrap_or_else(|| utc_date_string(Utc::now()));

        html_reporter_report_path(self.inputs.html_report_prefix(), &date, &self.run)
    }

    /// `testplane` invocation for the test run
    pub fn cli_command(&self) -> Vec<String> {
        let mut command = self.with_config(&[]);

        if self.inputs.storybook_enabled() {
            command.push("--storybook".to_string());
        }

        for set in self.inputs.sets() {
            command.push("--set".to_string());
            command.push(set.to_string());
        }

        for browser in self.inputs.browsers() {
            command.push("--browser".to_string());
            command.push(browser.to_string());
        }

        if let Some(grep) = self.inputs.grep() {
            command.push("--grep".to_string());
            command.push(grep.to_string());
        }

        command
    }

    /// `testplane <args> [--config <path>]`
    pub fn with_config(&self, args: &[&str]) -> Vec<String> {
        let mut command = vec!["testplane".to_string()];
        command.extend(args.iter().map(|arg| arg.to_string()));

        if let Some(config_path) = self.inputs.config_path() {
            command.push("--config".to_string());
            command.push(config_path.to_string());
        }

        command
    }
}

#[async_trait]
impl<E: PackageManagerExec> BrowserInventory for Testplane<E> {
    async fn config(&self) -> ActionResult<&ResolvedConfig> {
        Testplane::config(self).await
    }

    async fn list_browsers(&self) -> ActionResult<&str> {
        Testplane::list_browsers(self).await
    }
}

/// Subprocess environment: `overrides` first, then `ambient` on top
pub fn compose_env(
    overrides: BTreeMap<String, String>,
    ambient: impl IntoIterator<Item = (String, String)>,
) -> BTreeMap<String, String> {
    let mut env = overrides;
    env.extend(ambient);
    env
}

/// Process environment; non-UTF-8 variables are still inherited by children
fn ambient_env() -> impl Iterator<Item = (String, String)> {
    std::env::vars_os().filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
}
