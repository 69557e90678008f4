//! Unit tests for the row builder, frame helpers and Parquet codec

use super::frame::{
    concat_diagonal, duplicate_key, infer_kind, left_join, rename_existing, select_existing,
    select_or_null, string_values, text_expr, unique_by, ColumnKind,
};
use super::parquet::{filter_parquet_eq, read_parquet, write_parquet};
use super::*;
use chrono::{NaiveDate, TimeZone, Utc};
use polars::prelude::*;
use serde_json::json;

fn league_rows() -> Table {
    Table::from_records(vec![
        Record::new().with("league_id", "1").with("name", "Dynasty A"),
        Record::new()
            .with("league_id", "2")
            .with("name", "Dynasty B")
            .with("season", "2024"),
    ])
}

fn frame(records: Vec<Record>) -> DataFrame {
    Table::from_records(records).to_frame().unwrap()
}

fn rows(df: &DataFrame) -> Table {
    Table::from_frame(df).unwrap()
}

#[test]
fn test_from_records_widens_schema() {
    let table = league_rows();
    assert_eq!(table.columns(), &["league_id", "name", "season"]);
    assert_eq!(table.height(), 2);
    assert!(table.value(0, "season").is_null());
    assert_eq!(table.value(1, "season"), &Value::from("2024"));
}

#[test]
fn test_missing_column_reads_null() {
    let table = league_rows();
    assert!(table.value(0, "does_not_exist").is_null());
    assert!(table.value(99, "league_id").is_null());
}

#[test]
fn test_concat_unions_columns() {
    let a = Table::from_records(vec![Record::new().with("id", 1i64).with("a", "x")]);
    let b = Table::from_records(vec![Record::new().with("id", 2i64).with("b", true)]);

    let out = Table::concat(vec![a, b]);
    assert_eq!(out.columns(), &["id", "a", "b"]);
    assert_eq!(out.height(), 2);
    assert!(out.value(0, "b").is_null());
    assert!(out.value(1, "a").is_null());
    assert_eq!(out.value(1, "b"), &Value::Bool(true));
}

#[test]
fn test_frame_round_trip_keeps_schema_order() {
    let table = league_rows();
    let df = table.to_frame().unwrap();
    assert_eq!(df.get_column_names_str(), vec!["league_id", "name", "season"]);
    assert_eq!(rows(&df), table);
}

#[test]
fn test_concat_diagonal_widens_to_supertype() {
    let a = frame(vec![Record::new().with("id", "1").with("n", 1i64)]);
    let b = frame(vec![Record::new().with("id", "2").with("n", 2.5).with("extra", true)]);

    let out = concat_diagonal(vec![a, DataFrame::empty(), b]).unwrap();
    assert_eq!(out.height(), 2);
    assert_eq!(out.column("n").unwrap().dtype(), &DataType::Float64);
    let out = rows(&out);
    assert_eq!(out.value(0, "n"), &Value::Float(1.0));
    assert!(out.value(0, "extra").is_null());
    assert_eq!(out.value(1, "extra"), &Value::Bool(true));

    assert_eq!(concat_diagonal(vec![]).unwrap().width(), 0);
}

#[test]
fn test_unique_by_keep_last_and_first() {
    let df = frame(vec![
        Record::new().with("id", "1").with("v", 1i64),
        Record::new().with("id", "2").with("v", 2i64),
        Record::new().with("id", "1").with("v", 3i64),
    ]);

    let last = rows(&unique_by(&df, &["id"], UniqueKeepStrategy::Last).unwrap());
    assert_eq!(last.height(), 2);
    assert_eq!(last.value(0, "id"), &Value::from("2"));
    assert_eq!(last.value(1, "v"), &Value::Int(3));

    let first = rows(&unique_by(&df, &["id"], UniqueKeepStrategy::First).unwrap());
    assert_eq!(first.height(), 2);
    assert_eq!(first.value(0, "v"), &Value::Int(1));

    assert!(unique_by(&df, &["nope"], UniqueKeepStrategy::First).is_err());
    assert_eq!(
        unique_by(&DataFrame::empty(), &["id"], UniqueKeepStrategy::First)
            .unwrap()
            .width(),
        0
    );
}

#[test]
fn test_select_and_rename_helpers() {
    let df = league_rows().to_frame().unwrap();
    assert_eq!(
        select_existing(&df, &["nope", "name"]).unwrap().get_column_names_str(),
        vec!["name"]
    );

    let padded = rows(&select_or_null(&df, &["league_id", "draft_id"]).unwrap());
    assert_eq!(padded.columns(), &["league_id", "draft_id"]);
    assert!(padded.value(0, "draft_id").is_null());

    let renamed = rename_existing(&df, &[("name", "league_name"), ("ghost", "x")]).unwrap();
    assert_eq!(
        renamed.get_column_names_str(),
        vec!["league_id", "league_name", "season"]
    );
}

#[test]
fn test_left_join_matches_and_suffixes() {
    let left = league_rows().to_frame().unwrap();
    let right = frame(vec![
        Record::new().with("league_id", "1").with("name", "other").with("qb", 1i64),
        Record::new().with("league_id", "3").with("qb", 2i64),
    ]);

    let joined = rows(&left_join(&left, &right, "league_id", "league_id").unwrap());
    assert_eq!(
        joined.columns(),
        &["league_id", "name", "season", "name_right", "qb"]
    );
    assert_eq!(joined.height(), 2);
    assert_eq!(joined.value(0, "qb"), &Value::Int(1));
    assert!(joined.value(1, "qb").is_null());
}

#[test]
fn test_left_join_different_key_names_and_null_keys() {
    let left = frame(vec![
        Record::new().with("owner_id", "u1"),
        Record::new().with("owner_id", Value::Null),
    ]);
    let right = frame(vec![
        Record::new().with("user_id", "u1").with("name", "Alice"),
        Record::new().with("user_id", Value::Null).with("name", "Ghost"),
    ]);

    let joined = rows(&left_join(&left, &right, "owner_id", "user_id").unwrap());
    assert!(!joined.has_column("user_id"));
    assert_eq!(joined.value(0, "name"), &Value::from("Alice"));
    assert!(joined.value(1, "name").is_null());
}

#[test]
fn test_duplicate_key_reports_first_repeat() {
    let df = frame(vec![
        Record::new().with("id", 7i64),
        Record::new().with("id", 8i64),
        Record::new().with("id", 8i64),
    ]);
    assert_eq!(duplicate_key(&df, "id").unwrap(), Some(("8".to_string(), 2)));
    assert_eq!(duplicate_key(&df.head(Some(2)), "id").unwrap(), None);
}

#[test]
fn test_text_of_whole_floats_has_no_fraction() {
    let df = frame(vec![
        Record::new().with("sleeper_id", 4046.0),
        Record::new().with("sleeper_id", Value::Null),
    ]);
    let text = df
        .clone()
        .lazy()
        .select([text_expr(&df, "sleeper_id").unwrap()])
        .collect()
        .unwrap();
    assert_eq!(
        string_values(&text, "sleeper_id").unwrap(),
        vec![Some("4046".to_string()), None]
    );
}

#[test]
fn test_value_from_json() {
    assert_eq!(Value::from(json!(3)), Value::Int(3));
    assert_eq!(Value::from(json!(0.5)), Value::Float(0.5));
    assert_eq!(Value::from(json!(null)), Value::Null);
    assert_eq!(Value::from(json!(["QB", "RB"])), Value::from(r#"["QB","RB"]"#));
}

#[test]
fn test_record_extend_json() {
    let mut record = Record::new().with("league_id", "9");
    let settings = json!({"num_teams": 12, "taxi_slots": 4});
    record.extend_json(settings.as_object().unwrap());
    assert_eq!(record.len(), 3);
    assert_eq!(record.get("num_teams"), &Value::Int(12));
}

#[test]
fn test_infer_kind() {
    let ints = [Value::Int(1), Value::Null];
    assert_eq!(infer_kind(ints.iter()), ColumnKind::Int);
    let mixed_numbers = [Value::Int(1), Value::Float(1.5)];
    assert_eq!(infer_kind(mixed_numbers.iter()), ColumnKind::Float);
    let mixed = [Value::Int(1), Value::from("x")];
    assert_eq!(infer_kind(mixed.iter()), ColumnKind::Str);
    let nulls = [Value::Null];
    assert_eq!(infer_kind(nulls.iter()), ColumnKind::Str);
}

#[test]
fn test_parquet_preserves_types() {
    let ts = Utc.with_ymd_and_hms(2025, 9, 2, 12, 30, 0).unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 9, 2).unwrap();
    let table = Table::from_records(vec![
        Record::new()
            .with("league_id", "1")
            .with("num_teams", 12i64)
            .with("rec", 0.5)
            .with("is_current", true)
            .with("valid_from", ts)
            .with("load_date", date)
            .with("valid_to", Value::Null),
        Record::new()
            .with("league_id", "2")
            .with("num_teams", Value::Null)
            .with("rec", 1i64)
            .with("is_current", false)
            .with("valid_from", ts)
            .with("load_date", date)
            .with("valid_to", ts),
    ]);

    let bytes = write_parquet(&table.to_frame().unwrap()).unwrap();
    let decoded = rows(&read_parquet(bytes).unwrap());
    assert_eq!(decoded.columns(), table.columns());
    assert_eq!(decoded.value(0, "num_teams"), &Value::Int(12));
    assert!(decoded.value(1, "num_teams").is_null());
    assert_eq!(decoded.value(1, "rec"), &Value::Float(1.0));
    assert_eq!(decoded.value(0, "is_current"), &Value::Bool(true));
    assert_eq!(decoded.value(0, "valid_from"), &Value::Timestamp(ts));
    assert_eq!(decoded.value(0, "load_date"), &Value::Date(date));
    assert!(decoded.value(0, "valid_to").is_null());
    assert_eq!(decoded.value(1, "valid_to"), &Value::Timestamp(ts));
}

#[test]
fn test_filter_parquet_eq() {
    let df = frame(vec![
        Record::new().with("season", 2023i64).with("game", "a"),
        Record::new().with("season", 2024i64).with("game", "b"),
        Record::new().with("season", 2024i64).with("game", "c"),
    ]);
    let bytes = write_parquet(&df).unwrap();

    let (filtered, count) = filter_parquet_eq(bytes.clone(), "season", 2024).unwrap();
    assert_eq!(count, 2);
    let decoded = rows(&read_parquet(filtered).unwrap());
    assert_eq!(decoded.value(0, "game"), &Value::from("b"));

    let err = filter_parquet_eq(bytes, "week", 1).unwrap_err();
    assert!(matches!(err, crate::error::LakeError::MissingColumn { .. }));
}
