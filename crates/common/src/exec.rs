//! Package-manager command execution
//!
//! Runs binaries installed in the project through `<package manager> exec`,
//! so the locally pinned Testplane version is used rather than a global one.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::str::FromStr;

use async_trait::async_trait;
use tokio::process::Command as TokioCommand;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Supported package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    Npm,
    Pnpm,
    Yarn,
}

impl PackageManager {
    pub const ALL: [PackageManager; 3] = [PackageManager::Npm, PackageManager::Pnpm, PackageManager::Yarn];

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
        }
    }

    /// Supported values formatted for error messages: `"npm" "pnpm" "yarn"`
    pub fn supported_values() -> String {
        Self::ALL
            .iter()
            .map(|pm| format!("\"{}\"", pm.as_str()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Arguments passed to the package manager binary for `exec`
    pub fn exec_args(&self, command_with_args: &[String]) -> Vec<String> {
        let mut args = vec!["exec".to_string()];

        if let PackageManager::Npm = self {
            // Never let npm download a missing binary on the fly
            args.push("--no-install".to_string());
            args.push("--".to_string());
        }

        args.extend(command_with_args.iter().cloned());
        args
    }

    fn program(&self) -> String {
        if cfg!(windows) {
            format!("{}.cmd", self.as_str())
        } else {
            self.as_str().to_string()
        }
    }
}

impl FromStr for PackageManager {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|pm| pm.as_str() == value)
            .ok_or_else(|| Error::UnsupportedPackageManager(value.to_string()))
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for a single command execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOptions {
    /// Suppress the command output (defaults to true)
    pub silent: bool,

    /// Turn a nonzero exit code into an error (defaults to true)
    pub can_throw: bool,

    /// Extra environment for the subprocess, applied over the inherited one
    pub env: BTreeMap<String, String>,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            silent: true,
            can_throw: true,
            env: BTreeMap::new(),
        }
    }
}

impl ExecOptions {
    /// Stream the command output to the job log
    pub fn loud(mut self) -> Self {
        self.silent = false;
        self
    }

    /// Report a nonzero exit code as a value instead of an error
    pub fn no_throw(mut self) -> Self {
        self.can_throw = false;
        self
    }

    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }
}

/// Abstraction over package-manager execution to enable testing without real commands
#[async_trait]
pub trait PackageManagerExec: Send + Sync {
    /// Run a command and return its exit code
    async fn exec(&self, command_with_args: &[String], opts: ExecOptions) -> Result<i32>;

    /// Run a command and return its trimmed stdout
    async fn exec_output(&self, command_with_args: &[String], opts: ExecOptions) -> Result<String>;
}

/// Runs commands through a real package manager binary
#[derive(Debug, Clone)]
pub struct PackageManagerRunner {
    package_manager: PackageManager,
    cwd: PathBuf,
}

impl PackageManagerRunner {
    /// Create a runner from a package manager name.
    ///
    /// Fails before touching the system when the name is not supported.
    pub fn new(package_manager: &str, cwd: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_package_manager(package_manager.parse()?, cwd))
    }

    pub fn with_package_manager(package_manager: PackageManager, cwd: impl AsRef<Path>) -> Self {
        Self {
            package_manager,
            cwd: cwd.as_ref().to_path_buf(),
        }
    }

    pub fn package_manager(&self) -> PackageManager {
        self.package_manager
    }

    fn command(&self, command_with_args: &[String], opts: &ExecOptions) -> TokioCommand {
        let args = self.package_manager.exec_args(command_with_args);

        debug!("Running \"{} {}\"", self.package_manager, args.join(" "));

        let mut cmd = TokioCommand::new(self.package_manager.program());
        cmd.args(&args).current_dir(&self.cwd).stdin(Stdio::null());

        if std::env::var_os("CI").is_none() {
            cmd.env("CI", "true");
        }

        cmd.envs(&opts.env);
        cmd
    }
}

#[async_trait]
impl PackageManagerExec for PackageManagerRunner {
    async fn exec(&self, command_with_args: &[String], opts: ExecOptions) -> Result<i32> {
        let mut cmd = self.command(command_with_args, &opts);

        if opts.silent {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        } else {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }

        let status = cmd.status().await?;
        let code = exit_code(status);

        if code != 0 && opts.can_throw {
            return Err(Error::CommandFailed {
                command: command_with_args.join(" "),
                code,
            });
        }

        Ok(code)
    }

    async fn exec_output(&self, command_with_args: &[String], opts: ExecOptions) -> Result<String> {
        let mut cmd = self.command(command_with_args, &opts);
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let output = cmd.output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !opts.silent {
            print!("{stdout}");
            eprint!("{stderr}");
        }

        let code = exit_code(output.status);

        if code != 0 && opts.can_throw {
            return Err(Error::CommandOutputFailed {
                command: command_with_args.join(" "),
                code,
                stderr: stderr.into_owned(),
            });
        }

        Ok(stdout.trim().to_string())
    }
}

/// Exit code of a finished process; signals map to `128 + signal` like a shell
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;

        if let Some(signal) = status.signal() {
            warn!("Process was terminated by signal {}", signal);
            return 128 + signal;
        }
    }

    1
}
