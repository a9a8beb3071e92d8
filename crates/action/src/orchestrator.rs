//! Step sequence: restore cache, install, run, then summarize

use tracing::debug;

use testplane_ci_common::workflow::{group, SummarySink};
use testplane_ci_common::{CacheBackend, PackageManagerExec};

use crate::error::ActionResult;
use crate::summary::{write_failure_summary, write_success_summary};
use crate::testplane::{Testplane, TestplaneCache};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Passed,
    Failed { exit_code: i32 },
}

impl RunOutcome {
    pub fn failure_message(&self) -> Option<String> {
        match self {
            RunOutcome::Passed => None,
            RunOutcome::Failed { exit_code } => {
                Some(format!("Testplane run failed with exit code {}", exit_code))
            }
        }
    }
}

/// Run the whole step. Errors here fail the job; a failing test run does not
/// error but comes back as [`RunOutcome::Failed`].
pub async fn run_action<E, C>(
    testplane: &Testplane<E>,
    cache: &mut TestplaneCache<'_, Testplane<E>, C>,
    summary: &dyn SummarySink,
) -> ActionResult<RunOutcome>
where
    E: PackageManagerExec,
    C: CacheBackend,
{
    let primary_cache_hit = group("restore cache", cache.restore_cache()).await?;

    debug!("Testplane browsers primary cache hit: {}", primary_cache_hit);

    group("install dependencies", testplane.install_dependencies()).await?;

    let exit_code = group("run testplane", testplane.run()).await?;

    if exit_code != 0 {
        let post_mortem = group("gather summary", testplane.get_post_mortem_data()).await?;

        group("write summary", async { write_failure_summary(summary, &post_mortem) }).await?;

        return Ok(RunOutcome::Failed { exit_code });
    }

    group("save cache", cache.save_cache()).await?;

    group("write summary", async { write_success_summary(summary) }).await?;

    Ok(RunOutcome::Passed)
}
