//! nflverse bronze job

use tracing::{error, info};

use crate::{
    sources::nflverse::{NflverseClient, Outcome, Summary, DATASETS},
    Result,
};

use super::common::JobContext;

/// Load the datasets due today, or every season of every dataset with `full`.
///
/// Fails when any dataset failed, after the whole catalog has been tried.
pub async fn handle_nflverse(
    ctx: &JobContext,
    nflverse: &NflverseClient,
    force: bool,
    full: bool,
) -> Result<()> {
    let force = force || ctx.config.force_run;
    let results = if full {
        nflverse.run_full(&ctx.lake, DATASETS, ctx.today()).await
    } else {
        nflverse
            .run_daily(&ctx.lake, DATASETS, ctx.today(), force)
            .await
    };

    let summary = Summary::of(&results);
    info!(%summary, "nflverse load finished");
    for result in &results {
        if let Outcome::Failed(reason) = &result.outcome {
            error!(dataset = %result.name, season = ?result.season, %reason, "failed");
        }
    }
    summary.into_result("nflverse")?;
    Ok(())
}
