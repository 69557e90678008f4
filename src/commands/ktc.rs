//! KeepTradeCut bronze jobs

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{
    sources::ktc::{
        history_entity, history_rows, player_one_qb, player_superflex, rankings_entity,
        rankings_table, Board, HistoryPlayer, KtcClient, SOURCE,
    },
    storage::{paths::BRONZE_ROOT, Partition},
    table::Table,
    Result,
};

use super::common::JobContext;

pub const RANKINGS_FILE: &str = "player_data.parquet";

/// One player page that could not be scraped.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlayerError {
    pub slug: String,
    pub player_name: Option<String>,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

/// Error log written next to a history load.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorReport {
    pub load_date: String,
    pub error_count: usize,
    pub errors: Vec<PlayerError>,
}

/// `bronze/ktc/{board}/full_load/errors/load_date=D/errors.json`
pub fn errors_path(board: Board, partition: Partition) -> String {
    format!(
        "{BRONZE_ROOT}/{SOURCE}/{}/errors/{partition}/errors.json",
        history_entity(board)
    )
}

/// Today's rankings board as one table.
pub async fn handle_ktc_rankings(ctx: &JobContext, ktc: &KtcClient, board: Board) -> Result<()> {
    let players = ktc.rankings(board).await?;
    let table = rankings_table(&players);
    info!(%board, players = table.height(), "scraped rankings");
    ctx.write_bronze(
        SOURCE,
        [(rankings_entity(board), &table)],
        ctx.load_date(),
        RANKINGS_FILE,
    )
    .await?;
    Ok(())
}

async fn player_history(
    ktc: &KtcClient,
    board: Board,
    player: &HistoryPlayer,
    ctx: &JobContext,
) -> Result<Table> {
    let page = ktc.player_page(board, &player.slug).await?;
    let one_qb = player_one_qb(&page)?;
    let superflex = player_superflex(&page)?;
    history_rows(player, &one_qb, &superflex, ctx.today(), ctx.now)
}

/// Full value history of every player on the board, one file per player.
///
/// Players that fail are collected into an error report rather than
/// stopping the run.
pub async fn handle_ktc_history(ctx: &JobContext, ktc: &KtcClient, board: Board) -> Result<()> {
    let players: Vec<HistoryPlayer> = ktc
        .rankings(board)
        .await?
        .iter()
        .filter_map(HistoryPlayer::from_ranking)
        .collect();
    info!(%board, players = players.len(), "scraping player histories");

    let mut errors = Vec::new();
    let mut loaded = 0usize;
    for (i, player) in players.iter().enumerate() {
        match player_history(ktc, board, player, ctx).await {
            Ok(table) => {
                let file = format!("{}.parquet", player.slug);
                loaded += ctx
                    .write_bronze(SOURCE, [(history_entity(board), &table)], ctx.load_date(), &file)
                    .await?;
            }
            Err(err) => {
                error!(slug = %player.slug, error = %err, "player history failed");
                errors.push(PlayerError {
                    slug: player.slug.clone(),
                    player_name: player.player_name.as_str().map(str::to_string),
                    error: err.to_string(),
                    timestamp: Utc::now(),
                });
            }
        }
        if (i + 1) % 50 == 0 {
            info!(done = i + 1, total = players.len(), "history progress");
        }
    }

    info!(%board, loaded, failed = errors.len(), "history load complete");
    if !errors.is_empty() {
        let report = ErrorReport {
            load_date: ctx.today().format("%Y-%m-%d").to_string(),
            error_count: errors.len(),
            errors,
        };
        let path = errors_path(board, ctx.load_date());
        let uri = ctx.lake.write_json(&path, &report).await?;
        warn!(path = %uri, errors = report.error_count, "wrote error report");
    }
    Ok(())
}
