//! Silver dimension jobs
//!
//! Each job reads its bronze inputs (and, for SCD2 tables, the current
//! silver table), builds the dimension and overwrites
//! `silver/fantasy/{dim}/data.parquet`.

use clap::ValueEnum;
use polars::prelude::DataFrame;
use std::fmt;
use tracing::{info, warn};

use crate::{
    core::http::get_text,
    silver::{
        apply_scd2,
        dims::{
            franchises::build_dim_franchises,
            leagues::{build_dim_leagues, build_dim_leagues_meta, league_rules_batch, league_scoring_batch},
            players::build_dim_players,
            users::{build_dim_users, empty_name_map, parse_name_map},
        },
        Scd2Options, DIM_FRANCHISES_META, DIM_LEAGUES, DIM_LEAGUES_META, DIM_LEAGUE_SCORING,
        DIM_LEAGUE_SETTINGS, DIM_PLAYERS_MASTER, DIM_USERS, SLEEPER_SOURCE,
    },
    sources::{
        nflverse::{self, FANTASY_PLAYER_IDS_FOLDER, NFL_PLAYERS_FOLDER},
        sleeper::{rosters_entity, PLAYERS_ENTITY, SOURCE as SLEEPER, USERS_ENTITY},
    },
    storage::paths::{silver_path, WEEK_START_KEY},
    Result,
};

use super::common::{bronze_pair, JobContext};

/// Silver dimensions, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SilverDim {
    Leagues,
    LeaguesMeta,
    LeagueScoring,
    LeagueSettings,
    Users,
    Franchises,
    Players,
    /// Every dimension above, in order.
    All,
}

impl SilverDim {
    const ORDER: [SilverDim; 7] = [
        SilverDim::Leagues,
        SilverDim::LeaguesMeta,
        SilverDim::LeagueScoring,
        SilverDim::LeagueSettings,
        SilverDim::Users,
        SilverDim::Franchises,
        SilverDim::Players,
    ];

    /// The dimensions this selection builds.
    pub fn expand(self) -> Vec<SilverDim> {
        match self {
            SilverDim::All => Self::ORDER.to_vec(),
            dim => vec![dim],
        }
    }
}

impl fmt::Display for SilverDim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SilverDim::Leagues => DIM_LEAGUES,
            SilverDim::LeaguesMeta => DIM_LEAGUES_META,
            SilverDim::LeagueScoring => DIM_LEAGUE_SCORING,
            SilverDim::LeagueSettings => DIM_LEAGUE_SETTINGS,
            SilverDim::Users => DIM_USERS,
            SilverDim::Franchises => DIM_FRANCHISES_META,
            SilverDim::Players => DIM_PLAYERS_MASTER,
            SilverDim::All => "all",
        };
        write!(f, "{name}")
    }
}

async fn write_dim(ctx: &JobContext, dim: &str, table: &DataFrame) -> Result<()> {
    ctx.lake.write_table(&silver_path(dim), table).await?;
    Ok(())
}

pub async fn build_leagues(ctx: &JobContext) -> Result<()> {
    let leagues = bronze_pair(&ctx.lake, "leagues").await?;
    let rosters = bronze_pair(&ctx.lake, "roster_slots").await?;
    let settings = bronze_pair(&ctx.lake, "settings").await?;
    let table = build_dim_leagues(&leagues, &rosters, &settings, ctx.now)?;
    info!(rows = table.height(), "built {DIM_LEAGUES}");
    write_dim(ctx, DIM_LEAGUES, &table).await
}

pub async fn build_leagues_meta(ctx: &JobContext) -> Result<()> {
    let leagues = bronze_pair(&ctx.lake, "leagues").await?;
    let settings = bronze_pair(&ctx.lake, "settings").await?;
    let table = build_dim_leagues_meta(&leagues, &settings, ctx.now)?;
    info!(rows = table.height(), "built {DIM_LEAGUES_META}");
    write_dim(ctx, DIM_LEAGUES_META, &table).await
}

/// Version `incoming` against the stored dimension and write the result.
async fn write_scd2(ctx: &JobContext, dim: &str, incoming: &DataFrame) -> Result<()> {
    let existing = ctx.lake.read_table_opt(&silver_path(dim)).await?;
    if existing.is_none() {
        info!(dim, "no existing table, initial load");
    }
    let (table, stats) = apply_scd2(
        existing.as_ref(),
        incoming,
        ctx.now,
        &Scd2Options::league(SLEEPER_SOURCE),
    )?;
    info!(
        dim,
        new = stats.new,
        changed = stats.changed,
        unchanged = stats.unchanged,
        untouched = stats.untouched,
        historical = stats.historical,
        "applied SCD2"
    );
    write_dim(ctx, dim, &table).await
}

pub async fn build_league_scoring(ctx: &JobContext) -> Result<()> {
    let scoring = bronze_pair(&ctx.lake, "scoring").await?;
    write_scd2(ctx, DIM_LEAGUE_SCORING, &league_scoring_batch(&scoring)?).await
}

pub async fn build_league_settings(ctx: &JobContext) -> Result<()> {
    let scoring = bronze_pair(&ctx.lake, "scoring").await?;
    let rosters = bronze_pair(&ctx.lake, "roster_slots").await?;
    let settings = bronze_pair(&ctx.lake, "settings").await?;
    let batch = league_rules_batch(&scoring, &rosters, &settings)?;
    write_scd2(ctx, DIM_LEAGUE_SETTINGS, &batch).await
}

/// The manual name map, or an empty one when unset or unreachable.
async fn name_map(ctx: &JobContext) -> Result<DataFrame> {
    let Some(url) = ctx.config.user_name_sheet_url.as_deref() else {
        info!("no name sheet configured");
        return empty_name_map();
    };
    match get_text(&ctx.client, url, None).await.and_then(|csv| parse_name_map(&csv)) {
        Ok(map) => {
            info!(names = map.height(), "loaded name map");
            Ok(map)
        }
        Err(err) => {
            warn!(error = %err, "name sheet unavailable, continuing without real names");
            empty_name_map()
        }
    }
}

pub async fn build_users(ctx: &JobContext) -> Result<()> {
    let users = ctx
        .lake
        .read_latest_partition(USERS_ENTITY, SLEEPER, WEEK_START_KEY)
        .await?;
    let names = name_map(ctx).await?;
    let table = build_dim_users(&users, &names, ctx.now)?;
    info!(rows = table.height(), "built {DIM_USERS}");
    write_dim(ctx, DIM_USERS, &table).await
}

pub async fn build_franchises(ctx: &JobContext) -> Result<()> {
    let team_state = ctx
        .lake
        .read_latest_bronze(&rosters_entity("team_state"), SLEEPER)
        .await?;
    let leagues_meta = ctx.lake.read_table(&silver_path(DIM_LEAGUES_META)).await?;
    let users = ctx.lake.read_table(&silver_path(DIM_USERS)).await?;
    let table = build_dim_franchises(&team_state, &leagues_meta, &users, ctx.now)?;
    info!(rows = table.height(), "built {DIM_FRANCHISES_META}");
    write_dim(ctx, DIM_FRANCHISES_META, &table).await
}

pub async fn build_players(ctx: &JobContext) -> Result<()> {
    let sleeper_players = ctx.lake.read_latest_bronze(PLAYERS_ENTITY, SLEEPER).await?;
    let ff_ids = ctx
        .lake
        .read_latest_bronze(FANTASY_PLAYER_IDS_FOLDER, nflverse::SOURCE)
        .await?;
    let nfl_players = ctx
        .lake
        .read_latest_bronze(NFL_PLAYERS_FOLDER, nflverse::SOURCE)
        .await?;
    let table = build_dim_players(&sleeper_players, &ff_ids, &nfl_players, ctx.now)?;
    info!(rows = table.height(), "built {DIM_PLAYERS_MASTER}");
    write_dim(ctx, DIM_PLAYERS_MASTER, &table).await
}

/// Build the selected dimensions in dependency order.
pub async fn handle_silver(ctx: &JobContext, dim: SilverDim) -> Result<()> {
    for dim in dim.expand() {
        info!(%dim, "building dimension");
        match dim {
            SilverDim::Leagues => build_leagues(ctx).await?,
            SilverDim::LeaguesMeta => build_leagues_meta(ctx).await?,
            SilverDim::LeagueScoring => build_league_scoring(ctx).await?,
            SilverDim::LeagueSettings => build_league_settings(ctx).await?,
            SilverDim::Users => build_users(ctx).await?,
            SilverDim::Franchises => build_franchises(ctx).await?,
            SilverDim::Players => build_players(ctx).await?,
            SilverDim::All => {}
        }
    }
    Ok(())
}
