//! End-to-end runs of the Sleeper bronze jobs and the silver dimensions
//! against a mocked API and a local lake.

use chrono::{DateTime, TimeZone, Utc};
use ffl_lake::{
    commands::{
        silver::{handle_silver, SilverDim},
        sleeper::{handle_sleeper_lineage, handle_sleeper_rosters, handle_sleeper_users},
        JobContext,
    },
    config::Config,
    core::Pacer,
    silver::{scd2::IS_CURRENT, DIM_FRANCHISES_META, DIM_LEAGUES, DIM_LEAGUES_META, DIM_LEAGUE_SCORING, DIM_USERS},
    sources::sleeper::SleeperClient,
    storage::{paths::silver_path, Lake, LocalStore},
    Season, Table, UserId, Value, LAKE_ROOT_ENV_VAR,
};
use serde_json::json;
use std::{path::Path, sync::Arc};
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, d, 8, 0, 0).unwrap()
}

fn context(root: &Path, now: DateTime<Utc>) -> JobContext {
    let root = root.display().to_string();
    let config = Config::from_lookup(
        |key| (key == LAKE_ROOT_ENV_VAR).then(|| root.clone()),
        false,
    )
    .unwrap();
    let lake = Lake::new(Arc::new(LocalStore::new(root.clone())));
    JobContext::with_lake(lake, reqwest::Client::new(), config, now)
}

fn league(id: &str, previous: Option<&str>, season: &str, status: &str, pass_td: f64) -> serde_json::Value {
    json!({
        "league_id": id,
        "name": "Dynasty Warriors",
        "season": season,
        "status": status,
        "season_type": "regular",
        "total_rosters": 2,
        "draft_id": format!("d{id}"),
        "previous_league_id": previous,
        "roster_positions": ["QB", "RB", "WR", "SUPER_FLEX", "BN"],
        "settings": {"leg": 2, "last_scored_leg": 1, "taxi_slots": 2, "num_teams": 2},
        "scoring_settings": {"rec": 1.0, "pass_td": pass_td}
    })
}

/// Sleeper with a two-season lineage: 200 (2024, complete) -> 300 (2025).
async fn sleeper_server(pass_td_2025: f64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/u1/leagues/nfl/2025"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            league("300", Some("200"), "2025", "in_season", pass_td_2025)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/league/200"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(league("200", None, "2024", "complete", 4.0)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/league/300/rosters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"roster_id": 1, "league_id": "300", "owner_id": "u1", "players": ["4046", "6794"],
             "starters": ["4046"], "settings": {"wins": 1, "losses": 0},
             "metadata": {"record": "W", "p_nick_4046": "Mahomie"}},
            {"roster_id": 2, "league_id": "300", "owner_id": null, "players": ["1234"],
             "settings": {"wins": 0, "losses": 1}}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/league/300/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"user_id": "u1", "display_name": " alice ", "avatar": "av1",
             "metadata": {"team_name": "Alice's Team"}}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn sleeper(server: &MockServer) -> SleeperClient {
    SleeperClient::with_base_url(reqwest::Client::new(), server.uri()).with_pacer(Pacer::None)
}

fn row_where(table: &Table, column: &str, value: &str) -> Vec<usize> {
    (0..table.height())
        .filter(|&i| table.value(i, column).as_str() == Some(value))
        .collect()
}

/// A silver dimension as rows.
async fn read(ctx: &JobContext, dim: &str) -> Table {
    let df = ctx.lake.read_table(&silver_path(dim)).await.unwrap();
    Table::from_frame(&df).unwrap()
}

async fn run_bronze(ctx: &JobContext, server: &MockServer) {
    let sleeper = sleeper(server);
    handle_sleeper_lineage(ctx, &sleeper, Some(UserId::new("u1")), Some(Season::new(2025)))
        .await
        .unwrap();
    handle_sleeper_rosters(ctx, &sleeper).await.unwrap();
    handle_sleeper_users(ctx, &sleeper).await.unwrap();
}

#[tokio::test]
async fn test_bronze_to_silver() {
    let dir = TempDir::new().unwrap();
    let ctx = context(dir.path(), day(10));
    let server = sleeper_server(4.0).await;
    run_bronze(&ctx, &server).await;

    assert!(dir
        .path()
        .join("bronze/sleeper/league/leagues/full_load/load_date=2025-09-10/data.parquet")
        .exists());
    assert!(dir
        .path()
        .join("bronze/sleeper/rosters/users/weekly/week_start=2025-09-09/data.parquet")
        .exists());

    for dim in [
        SilverDim::Leagues,
        SilverDim::LeaguesMeta,
        SilverDim::LeagueScoring,
        SilverDim::LeagueSettings,
        SilverDim::Users,
        SilverDim::Franchises,
    ] {
        handle_silver(&ctx, dim).await.unwrap();
    }

    let leagues = read(&ctx, DIM_LEAGUES).await;
    assert_eq!(leagues.height(), 2);
    let current = row_where(&leagues, "league_id", "300")[0];
    assert_eq!(leagues.value(current, "league_lineage_id"), &Value::from("200"));
    assert_eq!(leagues.value(current, "season_number"), &Value::Int(2));
    assert_eq!(leagues.value(current, "is_original"), &Value::Bool(false));
    assert_eq!(leagues.value(current, "is_active"), &Value::Bool(true));
    assert_eq!(leagues.value(current, "is_superflex"), &Value::Bool(true));
    let original = row_where(&leagues, "league_id", "200")[0];
    assert_eq!(leagues.value(original, "is_original"), &Value::Bool(true));
    assert_eq!(leagues.value(original, "is_active"), &Value::Bool(false));

    let meta = read(&ctx, DIM_LEAGUES_META).await;
    assert_eq!(meta.height(), 2);

    let users = read(&ctx, DIM_USERS).await;
    assert_eq!(users.height(), 1);
    assert_eq!(users.value(0, "primary_name"), &Value::from("alice"));

    let franchises = read(&ctx, DIM_FRANCHISES_META).await;
    assert_eq!(franchises.height(), 2);
    let owned = row_where(&franchises, "franchise_id", "200_1")[0];
    assert_eq!(franchises.value(owned, "current_team_name"), &Value::from("alice"));
    assert_eq!(franchises.value(owned, "is_orphan"), &Value::Bool(false));
    let orphan = row_where(&franchises, "franchise_id", "200_2")[0];
    assert_eq!(
        franchises.value(orphan, "current_team_name"),
        &Value::from("Orphan Roster 2")
    );
    assert_eq!(franchises.value(orphan, "is_orphan"), &Value::Bool(true));
}

#[tokio::test]
async fn test_scoring_change_creates_new_version() {
    let dir = TempDir::new().unwrap();

    let first = context(dir.path(), day(10));
    run_bronze(&first, &sleeper_server(4.0).await).await;
    handle_silver(&first, SilverDim::LeagueScoring).await.unwrap();

    let second = context(dir.path(), day(11));
    run_bronze(&second, &sleeper_server(6.0).await).await;
    handle_silver(&second, SilverDim::LeagueScoring).await.unwrap();

    let scoring = read(&second, DIM_LEAGUE_SCORING).await;
    assert_eq!(scoring.height(), 3);

    let versions = row_where(&scoring, "league_id", "300");
    assert_eq!(versions.len(), 2);
    let (current, expired): (Vec<usize>, Vec<usize>) = versions
        .into_iter()
        .partition(|&i| scoring.value(i, IS_CURRENT) == &Value::Bool(true));
    assert_eq!(scoring.value(current[0], "pass_td"), &Value::Float(6.0));
    assert_eq!(scoring.value(expired[0], "pass_td"), &Value::Float(4.0));
    assert_eq!(scoring.value(expired[0], "valid_to"), &Value::Timestamp(day(11)));

    let untouched = row_where(&scoring, "league_id", "200");
    assert_eq!(untouched.len(), 1);
    assert_eq!(scoring.value(untouched[0], IS_CURRENT), &Value::Bool(true));
}
