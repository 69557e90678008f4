//! Reconcile a full historical load with a newer incremental load.

use polars::prelude::*;

use crate::error::Result;
use crate::table::frame::{
    concat_diagonal, has_column, left_join, select_existing, unique_by, with_null_columns,
};

/// Combine `full` and `incremental` into one row per `key`.
///
/// Rows are unioned (missing columns null), the last row per key wins so
/// incremental data supersedes the full load, and each `preserve` column is
/// then taken from the full load: incremental pulls do not know some
/// attributes (the lineage id, for one). Keys that only appear
/// incrementally get nulls for preserved columns.
pub fn merge_full_and_incremental(
    full: &DataFrame,
    incremental: &DataFrame,
    key: &str,
    preserve: &[&str],
) -> Result<DataFrame> {
    let merged = concat_diagonal(vec![full.clone(), incremental.clone()])?;
    let merged = unique_by(&merged, &[key], UniqueKeepStrategy::Last)?;
    if preserve.is_empty() || merged.width() == 0 {
        return Ok(merged);
    }

    let mut kept: Vec<&str> = vec![key];
    kept.extend(preserve.iter().copied().filter(|c| has_column(full, c)));
    let from_full = if has_column(full, key) {
        unique_by(&select_existing(full, &kept)?, &[key], UniqueKeepStrategy::First)?
    } else {
        DataFrame::empty()
    };

    let without = merged.drop_many(preserve.iter().copied());
    let out = if from_full.width() > 1 {
        left_join(&without, &from_full, key, key)?
    } else {
        without
    };
    with_null_columns(&out, preserve)
}
