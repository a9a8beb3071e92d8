use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::debug;

use testplane_ci::testplane::cache::cache_backend;
use testplane_ci::{run_action, ActionInputs, RunContext, RunOutcome, Testplane, TestplaneCache};
use testplane_ci_common::workflow::{logging, set_failed, GithubOutputs, GithubStepSummary};
use testplane_ci_common::{DirectoryCache, PackageManagerRunner};

#[derive(Parser)]
#[command(name = "testplane-ci")]
#[command(author, version, about = "Run Testplane in CI with browser caching and job summaries")]
struct Cli {
    #[command(flatten)]
    inputs: ActionInputs,

    #[command(flatten)]
    run: RunContext,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init(cli.verbose);

    match run(cli).await {
        Ok(outcome) => match outcome.failure_message() {
            Some(message) => {
                set_failed(&message);
                ExitCode::FAILURE
            }
            None => ExitCode::SUCCESS,
        },
        Err(e) => {
            set_failed(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<RunOutcome> {
    let pm = PackageManagerRunner::new(cli.inputs.package_manager(), cli.inputs.cwd())?;

    debug!("Using {} in {}", pm.package_manager(), cli.inputs.cwd());

    let testplane = Testplane::new(pm, cli.inputs, cli.run, Arc::new(GithubOutputs::from_env()));

    let mut cache = TestplaneCache::new(&testplane, cache_backend(DirectoryCache::from_env()));

    let outcome = run_action(&testplane, &mut cache, &GithubStepSummary::from_env()).await?;

    Ok(outcome)
}
