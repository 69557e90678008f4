//! Dimension builders.
//!
//! Each builder is a pure function over already-loaded tables; the jobs in
//! `commands::silver` do the reading and writing.

pub mod franchises;
pub mod leagues;
pub mod players;
pub mod users;

#[cfg(test)]
mod tests;

use polars::prelude::*;

use super::merge::merge_full_and_incremental;
use crate::error::Result;
use crate::table::frame::select_existing;

/// The two bronze loads of one league entity.
#[derive(Debug, Clone, Default)]
pub struct BronzePair {
    pub full: DataFrame,
    pub incremental: DataFrame,
}

impl BronzePair {
    pub fn new(full: DataFrame, incremental: DataFrame) -> Self {
        Self { full, incremental }
    }

    /// Merge on `league_id`, keeping the lineage id from the full load.
    pub fn merged(&self) -> Result<DataFrame> {
        merge_full_and_incremental(
            &self.full,
            &self.incremental,
            "league_id",
            &["league_lineage_id"],
        )
    }

    /// Project both loads onto the columns of `keep` they have, then merge.
    pub fn merged_subset(&self, keep: &[&str], preserve: &[&str]) -> Result<DataFrame> {
        merge_full_and_incremental(
            &select_existing(&self.full, keep)?,
            &select_existing(&self.incremental, keep)?,
            "league_id",
            preserve,
        )
    }
}
