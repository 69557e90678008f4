//! Unit tests for the dimension builders

use super::franchises::build_dim_franchises;
use super::leagues::*;
use super::players::build_dim_players;
use super::users::{build_dim_users, empty_name_map, parse_name_map};
use super::BronzePair;
use crate::table::{Record, Table, Value};
use chrono::{DateTime, TimeZone, Utc};
use polars::prelude::DataFrame;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 10, 8, 0, 0).unwrap()
}

fn frame(records: Vec<Record>) -> DataFrame {
    Table::from_records(records).to_frame().unwrap()
}

fn rows(df: &DataFrame) -> Table {
    Table::from_frame(df).unwrap()
}

fn league(id: &str, status: &str) -> Record {
    Record::new()
        .with("league_id", id)
        .with("league_name", "Dynasty")
        .with("season", "2025")
        .with("status", status)
        .with("leg", 1i64)
        .with("last_scored_leg", 0i64)
}

fn leagues_pair() -> BronzePair {
    BronzePair::new(
        frame(vec![
            league("100", "complete").with("league_lineage_id", "100"),
            league("200", "complete").with("league_lineage_id", "100"),
        ]),
        frame(vec![league("200", "in_season")]),
    )
}

fn rosters_pair() -> BronzePair {
    BronzePair::new(
        frame(vec![
            Record::new()
                .with("league_id", "100")
                .with("league_lineage_id", "100")
                .with("QB", 1i64)
                .with("SUPER_FLEX", 1i64)
                .with("BN", 10i64),
            Record::new()
                .with("league_id", "200")
                .with("league_lineage_id", "100")
                .with("QB", 1i64)
                .with("BN", 12i64),
        ]),
        DataFrame::default(),
    )
}

fn settings_pair() -> BronzePair {
    BronzePair::new(
        frame(vec![
            Record::new()
                .with("league_id", "100")
                .with("league_lineage_id", "100")
                .with("num_teams", 12i64)
                .with("leg", 18i64)
                .with("waiver_budget", 100i64)
                .with("pick_trading", 1i64),
        ]),
        frame(vec![Record::new()
            .with("league_id", "200")
            .with("num_teams", 12i64)
            .with("leg", 2i64)]),
    )
}

fn row_of(table: &Table, column: &str, id: &str) -> usize {
    (0..table.height())
        .find(|i| table.value(*i, column) == &Value::from(id))
        .unwrap()
}

#[test]
fn test_roster_slots_renames_and_fills() {
    let slots = rows(&roster_slots(&rosters_pair()).unwrap());
    let i = row_of(&slots, "league_id", "200");
    assert_eq!(slots.value(i, "qb_slots"), &Value::Int(1));
    assert_eq!(slots.value(i, "superflex_slots"), &Value::Int(0));
    assert_eq!(slots.value(i, "def_slots"), &Value::Int(0));
    assert!(!slots.has_column("QB"));
}

#[test]
fn test_dim_leagues_derivations() {
    let dim = rows(&build_dim_leagues(&leagues_pair(), &rosters_pair(), &settings_pair(), now()).unwrap());
    assert_eq!(dim.height(), 2);

    let founding = row_of(&dim, "league_id", "100");
    assert_eq!(dim.value(founding, "is_original"), &Value::Bool(true));
    assert_eq!(dim.value(founding, "is_active"), &Value::Bool(false));
    assert_eq!(dim.value(founding, "is_superflex"), &Value::Bool(true));
    assert_eq!(dim.value(founding, "total_roster_spots"), &Value::Int(12));
    assert_eq!(dim.value(founding, "num_teams"), &Value::Int(12));
    assert!(!dim.has_column("pick_trading"));

    let second = row_of(&dim, "league_id", "200");
    assert_eq!(dim.value(second, "is_original"), &Value::Bool(false));
    assert_eq!(dim.value(second, "is_active"), &Value::Bool(true));
    assert_eq!(dim.value(second, "league_lineage_id"), &Value::from("100"));
    assert_eq!(dim.value(second, "is_superflex"), &Value::Bool(false));
    assert_eq!(dim.value(second, "source_system"), &Value::from("sleeper"));
    assert_eq!(dim.value(second, "loaded_at"), &Value::Timestamp(now()));
}

#[test]
fn test_dim_leagues_meta_has_fixed_columns() {
    let dim = rows(&build_dim_leagues_meta(&leagues_pair(), &settings_pair(), now()).unwrap());
    assert_eq!(dim.columns(), LEAGUES_META_COLUMNS);
    let i = row_of(&dim, "league_id", "100");
    assert!(dim.value(i, "draft_id").is_null());
    assert_eq!(dim.value(i, "leg"), &Value::Int(1));
}

#[test]
fn test_league_rules_batch_excludes_weekly_columns() {
    let scoring = BronzePair::new(
        frame(vec![Record::new()
            .with("league_id", "100")
            .with("league_lineage_id", "100")
            .with("rec", 1.0)]),
        DataFrame::default(),
    );
    let rules = rows(&league_rules_batch(&scoring, &rosters_pair(), &settings_pair()).unwrap());
    assert_eq!(rules.height(), 1);
    assert!(!rules.has_column("leg"));
    assert_eq!(rules.value(0, "waiver_budget"), &Value::Int(100));
    assert_eq!(rules.value(0, "qb_slots"), &Value::Int(1));
    assert_eq!(rules.value(0, "league_lineage_id"), &Value::from("100"));
}

#[test]
fn test_parse_name_map() {
    let csv = "user_id,real_name\n730630390791929856,Alex\n123, \n";
    let map = rows(&parse_name_map(csv).unwrap());
    assert_eq!(map.height(), 2);
    assert_eq!(map.value(0, "user_id"), &Value::from("730630390791929856"));
    assert!(map.value(1, "real_name").is_null());

    let empty = rows(&parse_name_map("user_id,real_name\n").unwrap());
    assert_eq!(empty.columns(), &["user_id", "real_name"]);
}

#[test]
fn test_dim_users_primary_name() {
    let users = frame(vec![
        Record::new().with("user_id", "1").with("display_name", "old").with("avatar", "a"),
        Record::new().with("user_id", "1").with("display_name", "alpha"),
        Record::new().with("user_id", "2").with("display_name", "beta"),
        Record::new().with("user_id", "3").with("display_name", Value::Null),
    ]);
    let names = parse_name_map("user_id,real_name\n2,Bea\n").unwrap();

    let dim = rows(&build_dim_users(&users, &names, now()).unwrap());
    assert_eq!(dim.height(), 3);
    assert_eq!(dim.value(row_of(&dim, "user_id", "1"), "primary_name"), &Value::from("alpha"));
    assert_eq!(dim.value(row_of(&dim, "user_id", "2"), "primary_name"), &Value::from("Bea"));
    assert_eq!(dim.value(row_of(&dim, "user_id", "3"), "primary_name"), &Value::from("Unknown"));

    let bare = rows(&build_dim_users(&users, &empty_name_map().unwrap(), now()).unwrap());
    assert!(bare.value(0, "real_name").is_null());
}

#[test]
fn test_dim_franchises() {
    let team_state = frame(vec![
        Record::new().with("league_id", "200").with("roster_id", 1i64).with("owner_id", "u1"),
        Record::new().with("league_id", "200").with("roster_id", 2i64).with("owner_id", Value::Null),
    ]);
    let meta = build_dim_leagues_meta(&leagues_pair(), &settings_pair(), now()).unwrap();
    let users = frame(vec![Record::new()
        .with("user_id", "u1")
        .with("primary_name", "Alex")
        .with("avatar", "abc")]);

    let dim = rows(&build_dim_franchises(&team_state, &meta, &users, now()).unwrap());
    let owned = row_of(&dim, "franchise_id", "100_1");
    assert_eq!(dim.value(owned, "current_team_name"), &Value::from("Alex"));
    assert_eq!(dim.value(owned, "is_orphan"), &Value::Bool(false));
    assert_eq!(dim.value(owned, "avatar"), &Value::from("abc"));

    let orphan = row_of(&dim, "franchise_id", "100_2");
    assert_eq!(dim.value(orphan, "current_team_name"), &Value::from("Orphan Roster 2"));
    assert_eq!(dim.value(orphan, "is_orphan"), &Value::Bool(true));
}

#[test]
fn test_dim_players() {
    let sleeper = frame(vec![
        Record::new()
            .with("player_id", "4046")
            .with("full_name", "Patrick Mahomes")
            .with("position", "QB")
            .with("birth_date", "1995-09-17"),
        Record::new()
            .with("player_id", "9999")
            .with("first_name", "Rookie")
            .with("last_name", "Guy")
            .with("birth_date", "2002-01-01")
            .with("swish_id", 1234i64),
    ]);
    let ids = frame(vec![
        Record::new()
            .with("sleeper_id", 4046i64)
            .with("gsis_id", "00-0033873")
            .with("ktc_id", "100")
            .with("fantasy_data_id", 18890i64),
        Record::new().with("sleeper_id", 4046i64).with("gsis_id", "dupe"),
    ]);
    let nfl = frame(vec![Record::new()
        .with("gsis_id", "00-0033873")
        .with("headshot", "https://img/mahomes.png")
        .with("college_name", "Texas Tech")
        .with("draft_year", 2017i64)
        .with("draft_round", 1i64)
        .with("draft_pick", 10i64)]);

    let dim = rows(&build_dim_players(&sleeper, &ids, &nfl, now()).unwrap());
    assert_eq!(dim.height(), 2);

    let mahomes = row_of(&dim, "player_key", "4046");
    assert_eq!(dim.value(mahomes, "gsis_id"), &Value::from("00-0033873"));
    assert_eq!(dim.value(mahomes, "ktc_id"), &Value::Int(100));
    assert_eq!(dim.value(mahomes, "fantasydata_id"), &Value::Int(18890));
    assert_eq!(dim.value(mahomes, "draft_year"), &Value::Int(2017));
    assert_eq!(dim.value(mahomes, "avatar_url"), &Value::from("https://img/mahomes.png"));
    assert_eq!(dim.value(mahomes, "display_name"), &Value::from("Patrick Mahomes"));

    let rookie = row_of(&dim, "player_key", "9999");
    assert_eq!(dim.value(rookie, "display_name"), &Value::from("Rookie Guy"));
    assert_eq!(dim.value(rookie, "draft_year"), &Value::Int(2024));
    assert_eq!(dim.value(rookie, "avatar_url"), &Value::from("1234"));
    assert_eq!(dim.value(rookie, "source_system"), &Value::from("sleeper+nflverse"));
}
