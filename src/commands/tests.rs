//! Unit tests for job helpers

use super::common::{active_league_ids, league_ids_where};
use super::ktc::errors_path;
use super::silver::SilverDim;
use crate::sources::ktc::Board;
use crate::storage::Partition;
use crate::table::{Record, Table, Value};
use chrono::NaiveDate;
use polars::prelude::DataFrame;

fn leagues() -> DataFrame {
    Table::from_records(vec![
        Record::new().with("league_id", "1").with("status", "complete"),
        Record::new().with("league_id", "2").with("status", "in_season"),
        Record::new().with("league_id", "3").with("status", "pre_draft"),
        Record::new().with("league_id", "2").with("status", "in_season"),
        Record::new().with("league_id", "4").with("status", Value::Null),
    ])
    .to_frame()
    .unwrap()
}

#[test]
fn test_active_league_ids() {
    let ids: Vec<String> = active_league_ids(&leagues())
        .unwrap()
        .into_iter()
        .map(|id| id.0)
        .collect();
    assert_eq!(ids, ["2", "3", "4"]);
}

#[test]
fn test_league_ids_where_status() {
    let ids = league_ids_where(&leagues(), |s| s == Some("in_season")).unwrap();
    assert_eq!(ids.len(), 1);
    assert_eq!(ids[0].as_str(), "2");
}

#[test]
fn test_league_ids_without_status_column() {
    let table = Table::from_records(vec![Record::new().with("league_id", "9")])
        .to_frame()
        .unwrap();
    assert_eq!(active_league_ids(&table).unwrap().len(), 1);
    assert!(league_ids_where(&table, |s| s == Some("in_season"))
        .unwrap()
        .is_empty());
}

#[test]
fn test_silver_dim_expand() {
    let all = SilverDim::All.expand();
    assert_eq!(all.len(), 7);
    assert_eq!(all[0], SilverDim::Leagues);
    assert_eq!(all[6], SilverDim::Players);
    assert_eq!(SilverDim::Users.expand(), vec![SilverDim::Users]);
    assert_eq!(SilverDim::Franchises.to_string(), "dim_franchises_meta");
}

#[test]
fn test_ktc_errors_path() {
    let date = NaiveDate::from_ymd_opt(2025, 9, 10).unwrap();
    assert_eq!(
        errors_path(Board::Devy, Partition::LoadDate(date)),
        "bronze/ktc/devy/full_load/errors/load_date=2025-09-10/errors.json"
    );
}
