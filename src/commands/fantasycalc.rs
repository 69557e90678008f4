//! FantasyCalc bronze job

use polars::prelude::*;
use tracing::{info, warn};

use crate::{
    sources::fantasycalc::{flatten_values, league_shapes, FantasyCalcClient, SOURCE, VALUES_ENTITY},
    storage::paths::DATA_FILE,
    table::frame::{date_lit, timestamp_lit},
    Result,
};

use super::common::JobContext;

/// Values for every league shape, stamped with the load date.
pub async fn handle_fantasycalc(ctx: &JobContext, fantasycalc: &FantasyCalcClient) -> Result<()> {
    let outcome = fantasycalc.fetch_all(&league_shapes()).await;
    for (shape, err) in &outcome.failures {
        warn!(%shape, error = %err, "shape skipped");
    }

    let mut table = flatten_values(&outcome.records).to_frame()?;
    if table.height() > 0 {
        table = table
            .lazy()
            .with_columns([
                date_lit(ctx.today()).alias("load_date"),
                timestamp_lit(ctx.now).alias("loaded_at"),
            ])
            .collect()?;
    }
    info!(records = table.height(), "flattened values");
    ctx.write_bronze(
        SOURCE,
        [(VALUES_ENTITY.to_string(), &table)],
        ctx.load_date(),
        DATA_FILE,
    )
    .await?;
    Ok(())
}
