//! Shared fakes for the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use testplane_ci::testplane::{BrowserInventory, ResolvedConfig};
use testplane_ci::ActionResult;
use testplane_ci_common::workflow::{OutputSink, SummarySink};
use testplane_ci_common::{CacheBackend, Error, ExecOptions, PackageManagerExec, Result};

pub const LOCAL_CONFIG: &str = r#"{"gridUrl":"local","lastFailed":{"output":".testplane/failed.json"},"plugins":{"html-reporter/testplane":{"enabled":true}}}"#;
pub const REMOTE_CONFIG: &str = r#"{"gridUrl":"http://grid.example:4444/wd/hub","lastFailed":{"output":".testplane/failed.json"},"plugins":{}}"#;

/// One recorded package-manager call
#[derive(Debug, Clone)]
pub struct Call {
    pub args: Vec<String>,
    pub opts: ExecOptions,
}

/// Answers `testplane <subcommand>` calls from canned output
#[derive(Default)]
pub struct FakeExecutor {
    outputs: HashMap<String, String>,
    run_exit_code: i32,
    calls: Mutex<Vec<Call>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, subcommand: &str, output: &str) -> Self {
        self.outputs.insert(subcommand.to_string(), output.to_string());
        self
    }

    pub fn with_config(self, json: &str) -> Self {
        self.with_output("config", json)
    }

    pub fn with_run_exit_code(mut self, code: i32) -> Self {
        self.run_exit_code = code;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, subcommand: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.args.get(1).map(String::as_str) == Some(subcommand))
            .count()
    }

    fn record(&self, args: &[String], opts: ExecOptions) {
        self.calls.lock().unwrap().push(Call {
            args: args.to_vec(),
            opts,
        });
    }
}

#[async_trait]
impl PackageManagerExec for FakeExecutor {
    async fn exec(&self, command_with_args: &[String], opts: ExecOptions) -> Result<i32> {
        self.record(command_with_args, opts);

        match command_with_args.get(1).map(String::as_str) {
            Some("install-deps") => Ok(0),
            _ => Ok(self.run_exit_code),
        }
    }

    async fn exec_output(&self, command_with_args: &[String], opts: ExecOptions) -> Result<String> {
        self.record(command_with_args, opts);

        let subcommand = command_with_args.get(1).cloned().unwrap_or_default();
        self.outputs
            .get(&subcommand)
            .cloned()
            .ok_or_else(|| Error::CommandOutputFailed {
                command: command_with_args.join(" "),
                code: 1,
                stderr: format!("unknown command: {subcommand}"),
            })
    }
}

#[derive(Default)]
pub struct MemoryOutputs {
    values: Mutex<Vec<(String, String)>>,
}

impl MemoryOutputs {
    pub fn get(&self, name: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    pub fn names(&self) -> Vec<String> {
        self.values.lock().unwrap().iter().map(|(key, _)| key.clone()).collect()
    }
}

impl OutputSink for MemoryOutputs {
    fn set_output(&self, name: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap()
            .push((name.to_string(), value.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySummary {
    writes: Mutex<Vec<(String, bool)>>,
}

impl MemorySummary {
    pub fn content(&self) -> String {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .map(|(content, _)| content.as_str())
            .collect()
    }

    pub fn writes(&self) -> Vec<(String, bool)> {
        self.writes.lock().unwrap().clone()
    }
}

impl SummarySink for MemorySummary {
    fn write(&self, content: &str, overwrite: bool) -> Result<()> {
        self.writes
            .lock()
            .unwrap()
            .push((content.to_string(), overwrite));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct BackendState {
    pub restore_calls: Vec<(Vec<PathBuf>, String, Vec<String>)>,
    pub save_calls: Vec<(Vec<PathBuf>, String)>,
}

/// Cache backend with a scripted restore result; clones share state
#[derive(Clone, Default)]
pub struct FakeBackend {
    available: bool,
    restored_key: Option<String>,
    fail: bool,
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub fn available() -> Self {
        Self {
            available: true,
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn restoring(mut self, key: &str) -> Self {
        self.restored_key = Some(key.to_string());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn restore_calls(&self) -> usize {
        self.state.lock().unwrap().restore_calls.len()
    }

    pub fn save_calls(&self) -> Vec<(Vec<PathBuf>, String)> {
        self.state.lock().unwrap().save_calls.clone()
    }

    pub fn last_restore(&self) -> Option<(Vec<PathBuf>, String, Vec<String>)> {
        self.state.lock().unwrap().restore_calls.last().cloned()
    }
}

#[async_trait]
impl CacheBackend for FakeBackend {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn restore(
        &self,
        paths: &[PathBuf],
        primary_key: &str,
        restore_keys: &[String],
    ) -> Result<Option<String>> {
        self.state.lock().unwrap().restore_calls.push((
            paths.to_vec(),
            primary_key.to_string(),
            restore_keys.to_vec(),
        ));

        if self.fail {
            return Err(Error::Cache("service unavailable".to_string()));
        }

        Ok(self.restored_key.clone())
    }

    async fn save(&self, paths: &[PathBuf], key: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .save_calls
            .push((paths.to_vec(), key.to_string()));

        if self.fail {
            return Err(Error::Cache("service unavailable".to_string()));
        }

        Ok(())
    }
}

/// Inventory that counts how often the expensive calls reach it
pub struct CountingInventory {
    config: ResolvedConfig,
    browsers: String,
    pub config_calls: Mutex<usize>,
    pub list_calls: Mutex<usize>,
}

impl CountingInventory {
    pub fn new(config_json: &str, browsers: &str) -> Self {
        Self {
            config: ResolvedConfig::from_json(config_json).unwrap(),
            browsers: browsers.to_string(),
            config_calls: Mutex::new(0),
            list_calls: Mutex::new(0),
        }
    }

    pub fn config_calls(&self) -> usize {
        *self.config_calls.lock().unwrap()
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }
}

#[async_trait]
impl BrowserInventory for CountingInventory {
    async fn config(&self) -> ActionResult<&ResolvedConfig> {
        *self.config_calls.lock().unwrap() += 1;
        Ok(&self.config)
    }

    async fn list_browsers(&self) -> ActionResult<&str> {
        *self.list_calls.lock().unwrap() += 1;
        Ok(self.browsers.as_str())
    }
}

/// Collects messages of one level, WARN unless built with `at_level`
#[derive(Clone)]
pub struct WarningCollector {
    level: Level,
    messages: Arc<Mutex<Vec<String>>>,
}

impl Default for WarningCollector {
    fn default() -> Self {
        Self::at_level(Level::WARN)
    }
}

impl WarningCollector {
    pub fn at_level(level: Level) -> Self {
        Self {
            level,
            messages: Arc::default(),
        }
    }

    /// Install as the default subscriber for the current thread
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for WarningCollector {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == self.level {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.messages.lock().unwrap().push(visitor.0);
        }
    }
}
