//! Unit tests for storage paths and the local store

use super::paths::*;
use super::*;
use crate::table::{Record, Table, Value};
use chrono::{NaiveDate, Weekday};
use std::sync::Arc;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn lake() -> (TempDir, Lake) {
    let dir = TempDir::new().unwrap();
    let store = LocalStore::new(dir.path());
    (dir, Lake::new(Arc::new(store)))
}

fn one_row(id: &str) -> Table {
    Table::from_records(vec![Record::new().with("league_id", id)])
}

#[test]
fn test_partition_display() {
    assert_eq!(
        Partition::LoadDate(date(2025, 9, 2)).to_string(),
        "load_date=2025-09-02"
    );
    assert_eq!(Partition::Season(2024).to_string(), "season=2024");
    assert_eq!(Partition::Leg(3).to_string(), "leg=3");
}

#[test]
fn test_bronze_and_silver_paths() {
    assert_eq!(
        bronze_path(
            "sleeper",
            "league/settings/incremental/",
            Partition::LoadDate(date(2025, 9, 2)),
            DATA_FILE
        ),
        "bronze/sleeper/league/settings/incremental/load_date=2025-09-02/data.parquet"
    );
    assert_eq!(
        silver_path("dim_leagues"),
        "silver/fantasy/dim_leagues/data.parquet"
    );
}

#[test]
fn test_week_start_for_tuesday() {
    // 2025-09-02 is a Tuesday
    assert_eq!(week_start_for(date(2025, 9, 2), Weekday::Tue), date(2025, 9, 2));
    assert_eq!(week_start_for(date(2025, 9, 8), Weekday::Tue), date(2025, 9, 2));
    assert_eq!(week_start_for(date(2025, 9, 1), Weekday::Tue), date(2025, 8, 26));
}

#[test]
fn test_load_date_of() {
    assert_eq!(
        load_date_of("bronze/x/load_date=2025-01-02/data.parquet"),
        Some("2025-01-02")
    );
    assert_eq!(load_date_of("bronze/x/season=2024/data.parquet"), None);
}

#[tokio::test]
async fn test_local_store_roundtrip_and_missing() {
    let dir = TempDir::new().unwrap();
    let store = LocalStore::new(dir.path());
    store.put("a/b/c.json", b"{}".to_vec()).await.unwrap();

    assert_eq!(store.get("a/b/c.json").await.unwrap(), Some(b"{}".to_vec()));
    assert_eq!(store.get("a/b/missing.json").await.unwrap(), None);

    let listed = store.list("a/").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "a/b/c.json");
}

#[tokio::test]
async fn test_latest_bronze_picks_max_load_date() {
    let (_dir, lake) = lake();
    for (day, id) in [("2025-09-01", "old"), ("2025-09-03", "new"), ("2025-09-02", "mid")] {
        let name = format!("bronze/sleeper/league/leagues/incremental/load_date={day}/data.parquet");
        lake.write_table(&name, &one_row(id)).await.unwrap();
    }

    let path = latest_bronze_path(lake.store(), "league/leagues/incremental", "sleeper")
        .await
        .unwrap();
    assert!(path.ends_with("load_date=2025-09-03/data.parquet"));

    let table = lake
        .read_latest_bronze("league/leagues/incremental", "sleeper")
        .await
        .unwrap();
    let table = Table::from_frame(&table).unwrap();
    assert_eq!(table.height(), 1);
    assert_eq!(table.value(0, "league_id"), &Value::from("new"));
}

#[tokio::test]
async fn test_latest_bronze_concatenates_partition_files() {
    let (_dir, lake) = lake();
    let base = "bronze/ktc/dynasty/full_load/load_date=2025-09-02";
    lake.write_table(&format!("{base}/josh-allen-1.parquet"), &one_row("a"))
        .await
        .unwrap();
    lake.write_table(&format!("{base}/puka-nacua-2.parquet"), &one_row("b"))
        .await
        .unwrap();
    lake.write_json(&format!("{base}/errors.json"), &vec!["x"])
        .await
        .unwrap();

    let table = lake.read_latest_bronze("dynasty/full_load", "ktc").await.unwrap();
    assert_eq!(table.height(), 2);
}

#[tokio::test]
async fn test_latest_bronze_without_data_errors() {
    let (_dir, lake) = lake();
    let err = lake
        .read_latest_bronze("league/leagues/full_load", "sleeper")
        .await
        .unwrap_err();
    assert!(matches!(err, crate::LakeError::NoBronzeData { .. }));
}

#[tokio::test]
async fn test_write_empty_table_is_skipped() {
    let (_dir, lake) = lake();
    let out = lake
        .write_table("silver/fantasy/empty/data.parquet", &Table::with_columns(&["a"]))
        .await
        .unwrap();
    assert!(out.is_none());
    assert!(lake
        .read_table_opt("silver/fantasy/empty/data.parquet")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_latest_object_ignores_directory_markers() {
    let (_dir, lake) = lake();
    lake.put_bytes("overrides/first.json", b"[]".to_vec()).await.unwrap();
    let latest = latest_object(lake.store(), "overrides/").await.unwrap();
    assert_eq!(latest.map(|o| o.name), Some("overrides/first.json".to_string()));
    assert!(latest_object(lake.store(), "nothing/").await.unwrap().is_none());
}

#[tokio::test]
async fn test_latest_weekly_partition() {
    let (_dir, lake) = lake();
    for (week, id) in [("2025-08-26", "old"), ("2025-09-02", "new")] {
        let name = format!("bronze/sleeper/rosters/users/weekly/week_start={week}/data.parquet");
        lake.write_table(&name, &one_row(id)).await.unwrap();
    }
    let table = lake
        .read_latest_partition("rosters/users/weekly", "sleeper", WEEK_START_KEY)
        .await
        .unwrap();
    let table = Table::from_frame(&table).unwrap();
    assert_eq!(table.value(0, "league_id"), &Value::from("new"));
    assert_eq!(
        partition_value("a/week_start=2025-09-02/data.parquet", WEEK_START_KEY),
        Some("2025-09-02")
    );
}
