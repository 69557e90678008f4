//! `dim_franchises_meta`: a roster slot followed across seasons of a league lineage.

use chrono::{DateTime, Utc};
use polars::prelude::*;

use crate::error::Result;
use crate::silver::SLEEPER_SOURCE;
use crate::table::frame::{left_join, select_existing, select_or_null, timestamp_lit, unique_by};

pub const FRANCHISES_COLUMNS: &[&str] = &[
    "franchise_id",
    "league_id",
    "league_lineage_id",
    "roster_id",
    "owner_id",
    "current_team_name",
    "avatar",
    "is_orphan",
    "source_system",
    "loaded_at",
];

/// Join roster team state to league lineage and owners.
///
/// `franchise_id` is `{league_lineage_id}_{roster_id}` (null when the league
/// has no known lineage); rosters without an owner are orphans.
pub fn build_dim_franchises(
    team_state: &DataFrame,
    leagues_meta: &DataFrame,
    users: &DataFrame,
    now: DateTime<Utc>,
) -> Result<DataFrame> {
    let lineage = unique_by(
        &select_or_null(leagues_meta, &["league_id", "league_lineage_id"])?,
        &["league_id"],
        UniqueKeepStrategy::First,
    )?;
    let owners = unique_by(
        &select_or_null(users, &["user_id", "primary_name", "avatar"])?,
        &["user_id"],
        UniqueKeepStrategy::Last,
    )?;

    let base = left_join(
        &team_state.drop_many(["league_lineage_id", "avatar", "primary_name"]),
        &lineage,
        "league_id",
        "league_id",
    )?;
    let joined = left_join(&base, &owners, "owner_id", "user_id")?;

    let roster = col("roster_id").cast(DataType::String);
    let table = joined
        .lazy()
        .with_columns([
            concat_str([col("league_lineage_id"), roster.clone()], "_", false).alias("franchise_id"),
            col("primary_name")
                .fill_null(concat_str([lit("Orphan Roster "), roster], "", false))
                .alias("current_team_name"),
            col("owner_id").is_null().alias("is_orphan"),
            lit(SLEEPER_SOURCE).alias("source_system"),
            timestamp_lit(now).alias("loaded_at"),
        ])
        .collect()?;

    select_existing(&table, FRANCHISES_COLUMNS)
}
