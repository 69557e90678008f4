//! League dimensions: `dim_leagues`, `dim_leagues_meta` and the inputs of
//! the two league SCD2 tables.

use chrono::{DateTime, Utc};
use polars::prelude::*;

use super::BronzePair;
use crate::error::Result;
use crate::silver::SLEEPER_SOURCE;
use crate::table::frame::{left_join, rename_existing, select_or_null, timestamp_lit, with_null_columns};

/// Sleeper roster position codes and their dimension column names.
pub const ROSTER_SLOT_RENAMES: &[(&str, &str)] = &[
    ("QB", "qb_slots"),
    ("RB", "rb_slots"),
    ("WR", "wr_slots"),
    ("TE", "te_slots"),
    ("FLEX", "flex_slots"),
    ("SUPER_FLEX", "superflex_slots"),
    ("BN", "bench_slots"),
    ("TAXI", "taxi_slots"),
    ("IR", "ir_slots"),
    ("K", "k_slots"),
    ("DEF", "def_slots"),
];

/// League settings carried into `dim_leagues`.
pub const SETTINGS_KEY_COLUMNS: &[&str] = &[
    "league_id",
    "league_lineage_id",
    "leg",
    "last_scored_leg",
    "best_ball",
    "type",
    "num_teams",
    "playoff_teams",
    "playoff_type",
    "playoff_week_start",
    "draft_rounds",
    "waiver_type",
    "waiver_budget",
    "trade_deadline",
    "league_average_match",
    "taxi_years",
];

/// Settings versioned by `dim_league_settings`; `leg` and `last_scored_leg`
/// move every week and are left out.
pub const SETTINGS_RULE_COLUMNS: &[&str] = &[
    "league_id",
    "league_lineage_id",
    "best_ball",
    "type",
    "num_teams",
    "playoff_teams",
    "playoff_type",
    "playoff_week_start",
    "draft_rounds",
    "waiver_type",
    "waiver_budget",
    "trade_deadline",
    "league_average_match",
    "taxi_years",
];

pub const LEAGUES_META_COLUMNS: &[&str] = &[
    "league_id",
    "league_name",
    "season",
    "status",
    "season_type",
    "total_rosters",
    "draft_id",
    "bracket_id",
    "leg",
    "last_scored_leg",
    "previous_league_id",
    "league_lineage_id",
    "is_original",
    "is_active",
    "source_system",
    "loaded_at",
];

fn slot_columns() -> Vec<&'static str> {
    ROSTER_SLOT_RENAMES.iter().map(|(_, to)| *to).collect()
}

/// Merged roster slots with descriptive names, every slot column present as an integer.
pub fn roster_slots(rosters: &BronzePair) -> Result<DataFrame> {
    let renamed = rename_existing(&rosters.merged()?, ROSTER_SLOT_RENAMES)?;
    let slots = slot_columns();
    let filled: Vec<Expr> = slots
        .iter()
        .map(|c| col(*c).cast(DataType::Int64).fill_null(lit(0i64)))
        .collect();
    Ok(with_null_columns(&renamed, &slots)?
        .lazy()
        .with_columns(filled)
        .collect()?)
}

fn is_original() -> Expr {
    col("league_id")
        .cast(DataType::String)
        .eq_missing(col("league_lineage_id").cast(DataType::String))
        .alias("is_original")
}

fn is_active() -> Expr {
    col("status").neq_missing(lit("complete")).alias("is_active")
}

fn total_roster_spots() -> Expr {
    slot_columns()
        .into_iter()
        .map(col)
        .reduce(|a, b| a + b)
        .unwrap_or(lit(NULL))
        .alias("total_roster_spots")
}

/// Roster slots and a settings subset with the lineage id dropped, ready to
/// join onto a league-keyed frame.
fn league_extras(
    rosters: &BronzePair,
    settings: &BronzePair,
    settings_columns: &[&str],
) -> Result<(DataFrame, DataFrame)> {
    let rosters = roster_slots(rosters)?.drop_many(["league_lineage_id"]);
    let settings = settings
        .merged_subset(settings_columns, &["league_lineage_id"])?
        .drop_many(["league_lineage_id"]);
    Ok((rosters, settings))
}

/// One row per league: identity, roster slot counts and headline settings.
pub fn build_dim_leagues(
    leagues: &BronzePair,
    rosters: &BronzePair,
    settings: &BronzePair,
    now: DateTime<Utc>,
) -> Result<DataFrame> {
    let (rosters, settings) = league_extras(rosters, settings, SETTINGS_KEY_COLUMNS)?;
    let leagues = with_null_columns(&leagues.merged()?, &["league_lineage_id", "status"])?;
    let joined = left_join(&leagues, &rosters, "league_id", "league_id")?;
    let joined = left_join(&joined, &settings, "league_id", "league_id")?;

    Ok(joined
        .lazy()
        .with_columns([
            is_original(),
            total_roster_spots(),
            is_active(),
            col("superflex_slots")
                .fill_null(lit(0i64))
                .gt(lit(0i64))
                .alias("is_superflex"),
            lit(SLEEPER_SOURCE).alias("source_system"),
            timestamp_lit(now).alias("loaded_at"),
        ])
        .collect()?)
}

/// Slim league identity table with the weekly status columns.
pub fn build_dim_leagues_meta(
    leagues: &BronzePair,
    settings: &BronzePair,
    now: DateTime<Utc>,
) -> Result<DataFrame> {
    let status = settings.merged_subset(&["league_id", "leg", "last_scored_leg"], &[])?;
    let leagues = with_null_columns(&leagues.merged()?, &["league_lineage_id", "status"])?;
    let joined = left_join(&leagues, &status, "league_id", "league_id")?
        .lazy()
        .with_columns([
            is_original(),
            is_active(),
            lit(SLEEPER_SOURCE).alias("source_system"),
            timestamp_lit(now).alias("loaded_at"),
        ])
        .collect()?;
    select_or_null(&joined, LEAGUES_META_COLUMNS)
}

/// Incoming batch for `dim_league_scoring`.
pub fn league_scoring_batch(scoring: &BronzePair) -> Result<DataFrame> {
    scoring.merged()
}

/// Incoming batch for `dim_league_settings`: scoring, roster slots and rules side by side.
pub fn league_rules_batch(
    scoring: &BronzePair,
    rosters: &BronzePair,
    settings: &BronzePair,
) -> Result<DataFrame> {
    let (rosters, settings) = league_extras(rosters, settings, SETTINGS_RULE_COLUMNS)?;
    let joined = left_join(&scoring.merged()?, &rosters, "league_id", "league_id")?;
    left_join(&joined, &settings, "league_id", "league_id")
}
