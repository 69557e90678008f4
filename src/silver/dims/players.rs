//! `dim_players_master`: Sleeper players with cross-platform ids and NFL metadata.

use chrono::{DateTime, Utc};
use polars::prelude::*;

use crate::error::Result;
use crate::table::frame::{
    left_join, rename_existing, select_existing, select_or_null, text_expr, timestamp_lit,
    unique_by, with_null_columns,
};

pub const PLAYERS_SOURCE: &str = "sleeper+nflverse";

pub const PLAYERS_COLUMNS: &[&str] = &[
    "player_key",
    "gsis_id",
    "ktc_id",
    "espn_id",
    "yahoo_id",
    "fantasydata_id",
    "display_name",
    "first_name",
    "last_name",
    "position",
    "team",
    "age",
    "height",
    "weight",
    "college_name",
    "avatar_url",
    "draft_year",
    "nfl_draft_round",
    "nfl_draft_pick",
    "years_exp",
    "status",
    "injury_status",
    "source_system",
    "loaded_at",
];

/// Id bridge keyed by Sleeper id, numeric ids as integers, first row per id.
pub fn clean_id_map(ff_ids: &DataFrame) -> Result<DataFrame> {
    let ids = select_or_null(
        ff_ids,
        &[
            "sleeper_id",
            "gsis_id",
            "ktc_id",
            "fantasy_data_id",
            "rotoworld_id",
            "espn_id",
            "yahoo_id",
            "pff_id",
        ],
    )?;
    let ids = rename_existing(&ids, &[("fantasy_data_id", "fantasydata_id")])?;
    let numeric = ["ktc_id", "fantasydata_id", "rotoworld_id", "espn_id", "yahoo_id"]
        .map(|c| col(c).cast(DataType::Int64));
    let ids = ids
        .clone()
        .lazy()
        .with_column(text_expr(&ids, "sleeper_id")?)
        .with_columns(numeric)
        .collect()?;
    unique_by(&ids, &["sleeper_id"], UniqueKeepStrategy::First)
}

/// NFL player metadata keyed by GSIS id, first row per id.
pub fn clean_nfl_players(nfl_players: &DataFrame) -> Result<DataFrame> {
    let players = select_or_null(
        nfl_players,
        &[
            "gsis_id",
            "headshot",
            "college_name",
            "draft_year",
            "draft_round",
            "draft_pick",
        ],
    )?;
    let players = rename_existing(
        &players,
        &[
            ("headshot", "nflverse_headshot"),
            ("draft_year", "nfl_draft_year"),
            ("draft_round", "nfl_draft_round"),
            ("draft_pick", "nfl_draft_pick"),
        ],
    )?;
    unique_by(&players, &["gsis_id"], UniqueKeepStrategy::First)
}

fn display_name() -> Expr {
    col("full_name")
        .fill_null(concat_str([col("first_name"), col("last_name")], " ", false))
        .alias("display_name")
}

/// `nfl_draft_year`, else birth year + 22.
fn draft_year() -> Expr {
    let birth_year = col("birth_date")
        .cast(DataType::String)
        .str()
        .slice(lit(0i64), lit(4u64))
        .cast(DataType::Int64);
    col("nfl_draft_year")
        .cast(DataType::Int64)
        .fill_null(birth_year + lit(22i64))
        .alias("draft_year")
}

pub fn build_dim_players(
    sleeper_players: &DataFrame,
    ff_ids: &DataFrame,
    nfl_players: &DataFrame,
    now: DateTime<Utc>,
) -> Result<DataFrame> {
    // Sleeper payloads carry their own gsis_id for some players; the bridge wins.
    let players = with_null_columns(
        &sleeper_players.drop_many(["gsis_id", "espn_id", "yahoo_id", "ktc_id", "rotoworld_id"]),
        &["player_id", "full_name", "first_name", "last_name", "birth_date", "swish_id"],
    )?;
    let players = players
        .clone()
        .lazy()
        .with_column(text_expr(&players, "player_id")?)
        .collect()?;

    let joined = left_join(&players, &clean_id_map(ff_ids)?, "player_id", "sleeper_id")?;
    let joined = left_join(&joined, &clean_nfl_players(nfl_players)?, "gsis_id", "gsis_id")?;

    let table = joined
        .lazy()
        .with_columns([
            col("player_id").alias("player_key"),
            display_name(),
            col("nflverse_headshot")
                .fill_null(col("swish_id").cast(DataType::String))
                .alias("avatar_url"),
            draft_year(),
            lit(PLAYERS_SOURCE).alias("source_system"),
            timestamp_lit(now).alias("loaded_at"),
        ])
        .collect()?;

    select_existing(&table, PLAYERS_COLUMNS)
}
