//! Slowly changing dimension (type 2) versioning.
//!
//! An SCD2 table keeps every version of a row. Each version carries
//! `valid_from`/`valid_to` and an `is_current` flag; at most one version per
//! natural key is current and versions with `valid_to` set are never
//! rewritten.

use chrono::{DateTime, Utc};
use polars::prelude::*;
use tracing::info;

use crate::error::{LakeError, Result};
use crate::table::frame::{
    column_names, concat_diagonal, duplicate_key, has_column, null_timestamp, require_column,
    text_expr, timestamp_lit,
};

pub const VALID_FROM: &str = "valid_from";
pub const VALID_TO: &str = "valid_to";
pub const IS_CURRENT: &str = "is_current";
pub const SOURCE_SYSTEM: &str = "source_system";
pub const LOADED_AT: &str = "loaded_at";

/// Columns of a league-keyed SCD2 dimension that never count as a change.
pub const LEAGUE_METADATA_COLUMNS: &[&str] = &[
    "league_id",
    "league_lineage_id",
    VALID_FROM,
    VALID_TO,
    IS_CURRENT,
    SOURCE_SYSTEM,
    LOADED_AT,
];

// Working columns, dropped before anything is returned.
const ROW_KEY: &str = "__scd2_key";
const MATCHED: &str = "__scd2_matched";
const CHANGED: &str = "__scd2_changed";

fn prior(column: &str) -> String {
    format!("__scd2_prior_{column}")
}

#[derive(Debug, Clone)]
pub struct Scd2Options<'a> {
    pub key: &'a str,
    /// Excluded from change detection; must include the key.
    pub metadata_columns: &'a [&'a str],
    pub source_system: &'a str,
}

impl<'a> Scd2Options<'a> {
    pub fn league(source_system: &'a str) -> Self {
        Self {
            key: "league_id",
            metadata_columns: LEAGUE_METADATA_COLUMNS,
            source_system,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scd2Stats {
    /// Keys seen for the first time.
    pub new: usize,
    /// Keys whose tracked values changed; each expires one row and inserts one.
    pub changed: usize,
    pub unchanged: usize,
    /// Current rows left alone because their key was absent from the batch.
    pub untouched: usize,
    /// Non-current rows carried over.
    pub historical: usize,
}

impl Scd2Stats {
    pub fn inserted(&self) -> usize {
        self.new + self.changed
    }
}

fn stamp_new_versions(rows: LazyFrame, now: DateTime<Utc>, source_system: &str) -> LazyFrame {
    rows.with_columns([
        timestamp_lit(now).alias(VALID_FROM),
        null_timestamp().alias(VALID_TO),
        lit(true).alias(IS_CURRENT),
        lit(source_system).alias(SOURCE_SYSTEM),
        timestamp_lit(now).alias(LOADED_AT),
    ])
}

/// True where `column` differs from its stored value, nulls included.
///
/// Sides stored with different dtypes are compared as Float64 when both are
/// numeric and as text otherwise, so a column whose Parquet type drifted
/// between runs (Int64 to String when one league sends text) still matches
/// unchanged values.
fn differs(column: &str, incoming: &DataType, stored: &DataType) -> Expr {
    let (fresh, old) = (col(column), col(prior(column)));
    if incoming == stored {
        return fresh.neq_missing(old);
    }
    let common = if incoming.is_primitive_numeric() && stored.is_primitive_numeric() {
        DataType::Float64
    } else {
        DataType::String
    };
    fresh.cast(common.clone()).neq_missing(old.cast(common))
}

/// Apply one batch of incoming rows to an SCD2 table.
///
/// With no existing table every incoming row becomes a current version.
/// Otherwise, for each incoming key:
/// - new key: inserted as current
/// - tracked values differ from the current version: the current version is
///   expired (`valid_to = now`, `is_current = false`) and a new one inserted
/// - unchanged: the current version is kept with `loaded_at = now`
///
/// Tracked columns are the incoming columns that are neither metadata nor
/// absent from the existing table. Current versions whose key is not in the
/// batch are kept unchanged, and historical versions are carried over as is.
pub fn apply_scd2(
    existing: Option<&DataFrame>,
    incoming: &DataFrame,
    now: DateTime<Utc>,
    options: &Scd2Options<'_>,
) -> Result<(DataFrame, Scd2Stats)> {
    let key = options.key;
    require_column(incoming, key)?;
    if let Some((key, _)) = duplicate_key(incoming, key)? {
        return Err(LakeError::DuplicateKey {
            table: "incoming batch".to_string(),
            key,
        });
    }

    let mut stats = Scd2Stats::default();

    let Some(existing) = existing.filter(|t| t.width() > 0) else {
        let table = stamp_new_versions(incoming.clone().lazy(), now, options.source_system).collect()?;
        stats.new = table.height();
        info!(new = stats.new, "initial SCD2 load");
        return Ok((table, stats));
    };
    require_column(existing, key)?;
    require_column(existing, IS_CURRENT)?;

    let is_current = col(IS_CURRENT).eq_missing(lit(true));
    let current = existing.clone().lazy().filter(is_current.clone()).collect()?;
    let historical = existing.clone().lazy().filter(is_current.not()).collect()?;
    if let Some((key, count)) = duplicate_key(&current, key)? {
        return Err(LakeError::MultipleCurrent { key, count });
    }

    let tracked: Vec<String> = column_names(incoming)
        .into_iter()
        .filter(|c| !options.metadata_columns.contains(&c.as_str()) && has_column(existing, c))
        .collect();

    let mut lookup = vec![text_expr(&current, key)?.alias(ROW_KEY), lit(true).alias(MATCHED)];
    lookup.extend(tracked.iter().map(|c| col(c.as_str()).alias(prior(c))));
    let changed = tracked
        .iter()
        .map(|c| -> Result<Expr> {
            Ok(differs(
                c,
                incoming.column(c)?.dtype(),
                existing.column(c)?.dtype(),
            ))
        })
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .reduce(|a, b| a.or(b))
        .unwrap_or(lit(false));

    let flagged = incoming
        .clone()
        .lazy()
        .with_column(text_expr(incoming, key)?.alias(ROW_KEY))
        .join(
            current.clone().lazy().select(lookup),
            [col(ROW_KEY)],
            [col(ROW_KEY)],
            JoinArgs::new(JoinType::Left),
        )
        .with_columns([col(MATCHED).fill_null(lit(false)), changed.alias(CHANGED)])
        .collect()?;

    let matched = col(MATCHED);
    stats.new = flagged.clone().lazy().filter(matched.clone().not()).collect()?.height();
    stats.changed = flagged
        .clone()
        .lazy()
        .filter(matched.clone().and(col(CHANGED)))
        .collect()?
        .height();
    stats.unchanged = flagged
        .clone()
        .lazy()
        .filter(matched.clone().and(col(CHANGED).not()))
        .collect()?
        .height();

    let incoming_columns: Vec<Expr> = column_names(incoming).iter().map(|c| col(c.as_str())).collect();
    let inserted = stamp_new_versions(
        flagged
            .clone()
            .lazy()
            .filter(matched.clone().not().or(col(CHANGED)))
            .select(&incoming_columns),
        now,
        options.source_system,
    )
    .collect()?;

    // What happened to each current key: true changed, false unchanged, null absent.
    let outcome = flagged
        .lazy()
        .filter(matched)
        .select([col(ROW_KEY), col(CHANGED)]);
    let existing_columns: Vec<Expr> = column_names(existing).iter().map(|c| col(c.as_str())).collect();
    let classified = current
        .lazy()
        .with_column(text_expr(existing, key)?.alias(ROW_KEY))
        .join(outcome, [col(ROW_KEY)], [col(ROW_KEY)], JoinArgs::new(JoinType::Left))
        .collect()?;

    let expired = classified
        .clone()
        .lazy()
        .filter(col(CHANGED).eq_missing(lit(true)))
        .select(&existing_columns)
        .with_columns([timestamp_lit(now).alias(VALID_TO), lit(false).alias(IS_CURRENT)])
        .collect()?;
    let heartbeat = classified
        .clone()
        .lazy()
        .filter(col(CHANGED).eq_missing(lit(false)))
        .select(&existing_columns)
        .with_column(timestamp_lit(now).alias(LOADED_AT))
        .collect()?;
    let untouched = classified
        .lazy()
        .filter(col(CHANGED).is_null())
        .select(&existing_columns)
        .collect()?;
    stats.untouched = untouched.height();
    stats.historical = historical.height();

    let result = concat_diagonal(vec![historical, expired, heartbeat, untouched, inserted])?;
    info!(
        new = stats.new,
        changed = stats.changed,
        unchanged = stats.unchanged,
        untouched = stats.untouched,
        historical = stats.historical,
        "applied SCD2 batch"
    );
    Ok((result, stats))
}
