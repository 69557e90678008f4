//! `dim_users`: one row per Sleeper user, enriched with a manual name map.

use chrono::{DateTime, Utc};
use polars::prelude::*;
use tracing::{info, warn};

use crate::error::Result;
use crate::silver::SLEEPER_SOURCE;
use crate::table::frame::{
    has_column, left_join, select_existing, text_expr, timestamp_lit, unique_by, with_null_columns,
};
use crate::table::{Record, Table};

pub const USERS_COLUMNS: &[&str] = &[
    "user_id",
    "display_name",
    "real_name",
    "primary_name",
    "avatar",
    "source_system",
    "loaded_at",
];

/// Parse the CSV export of the name-map sheet.
///
/// Every column is read as text so `user_id` keeps its full width. Blank
/// cells are null.
pub fn parse_name_map(csv_text: &str) -> Result<DataFrame> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_text.as_bytes());
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let mut record = Record::new();
        for (i, name) in headers.iter().enumerate() {
            let cell = row.get(i).map(str::trim).filter(|s| !s.is_empty());
            record.set(name, cell.map(str::to_string));
        }
        records.push(record);
    }

    let mut table = Table::from_records(records);
    if table.is_empty() {
        table = Table::with_columns(&headers.iter().map(String::as_str).collect::<Vec<_>>());
    }
    info!(rows = table.height(), "loaded user name map");
    table.to_frame()
}

/// Empty name map with the expected schema.
pub fn empty_name_map() -> Result<DataFrame> {
    Table::with_columns(&["user_id", "real_name"]).to_frame()
}

/// Latest weekly users, unique per user, joined to the name map.
pub fn build_dim_users(users: &DataFrame, name_map: &DataFrame, now: DateTime<Utc>) -> Result<DataFrame> {
    let users = unique_by(users, &["user_id"], UniqueKeepStrategy::Last)?;

    let joined = if has_column(name_map, "user_id") {
        let map = name_map
            .clone()
            .lazy()
            .with_column(text_expr(name_map, "user_id")?)
            .collect()?;
        let map = unique_by(&map, &["user_id"], UniqueKeepStrategy::First)?;
        left_join(&users, &map, "user_id", "user_id")?
    } else {
        warn!("name map has no user_id column, skipping enrichment");
        users
    };

    let table = with_null_columns(&joined, &["real_name", "display_name"])?
        .lazy()
        .with_columns([
            col("real_name")
                .fill_null(col("display_name"))
                .fill_null(lit("Unknown"))
                .alias("primary_name"),
            lit(SLEEPER_SOURCE).alias("source_system"),
            timestamp_lit(now).alias("loaded_at"),
        ])
        .collect()?;

    select_existing(&table, USERS_COLUMNS)
}
