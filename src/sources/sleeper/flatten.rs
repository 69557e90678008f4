//! Sleeper payloads flattened into bronze tables.

use chrono::{DateTime, Utc};
use polars::prelude::{DataFrame, UniqueKeepStrategy};
use serde_json::Value as Json;
use std::collections::HashSet;
use tracing::warn;

use super::lineage::Lineage;
use super::types::{Draft, JsonMap, League, Roster, Transaction, User};
use crate::table::{frame::unique_by, Record, Table, Value};
use crate::{error::LakeError, Result};

const NICKNAME_PREFIX: &str = "p_nick_";

const TEAM_STATE_SETTINGS: &[&str] = &[
    "division",
    "wins",
    "losses",
    "ties",
    "fpts",
    "fpts_decimal",
    "fpts_against",
    "fpts_against_decimal",
    "ppts",
    "ppts_decimal",
    "total_moves",
    "waiver_position",
    "waiver_budget_used",
];

const PLAYER_INFO_FIELDS: &[(&str, &str)] = &[
    ("player_first_name", "first_name"),
    ("player_last_name", "last_name"),
    ("player_position", "position"),
    ("player_team", "team"),
    ("player_number", "number"),
    ("player_status", "status"),
    ("player_injury_status", "injury_status"),
    ("player_years_exp", "years_exp"),
];

pub const DRAFT_PICK_COLUMNS: &[&str] = &[
    "draft_id",
    "pick_no",
    "round",
    "draft_slot",
    "picked_by",
    "roster_id",
    "player_id",
    "is_keeper",
    "player_first_name",
    "player_last_name",
    "player_position",
    "player_team",
    "player_status",
    "player_years_exp",
    "player_number",
    "player_injury_status",
    "player_news_updated_ms",
    "player_news_updated_iso",
    "player_team_changed_at",
    "player_team_abbr",
    "timestamp",
];

pub const TRADED_PICK_COLUMNS: &[&str] = &[
    "draft_id",
    "season",
    "round",
    "roster_id",
    "owner_roster_id",
    "previous_owner_roster_id",
    "timestamp",
];

pub const OVERRIDE_COLUMNS: &[&str] = &[
    "transaction_id",
    "league_id",
    "draft_pick_id",
    "roster_id",
    "season",
    "round",
    "from_team_id",
    "to_team_id",
    "created",
];

/// Trimmed string, `None` when blank. Numbers are rendered as text.
fn str_or_none(v: Option<&Json>) -> Option<String> {
    let s = match v? {
        Json::String(s) => s.trim().to_string(),
        Json::Number(n) => n.to_string(),
        Json::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// Integer tolerant of `""`, `"NA"`, `"N/A"` and padded strings.
fn int_or_none(v: Option<&Json>) -> Option<i64> {
    match v? {
        Json::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Json::String(s) => match s.trim() {
            "" | "NA" | "N/A" => None,
            t => t.parse().ok(),
        },
        _ => None,
    }
}

fn ms_to_iso(ms: Option<i64>) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(ms?).map(|t| t.to_rfc3339())
}

fn trimmed(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn json_text(v: &Json, default: &str) -> String {
    match v {
        Json::Null => default.to_string(),
        other => other.to_string(),
    }
}

fn field<'a>(map: Option<&'a JsonMap>, key: &str) -> Option<&'a Json> {
    map.and_then(|m| m.get(key))
}

/// Rows for one league across the four league entities.
#[derive(Debug, Clone, Default)]
pub struct LeagueTables {
    pub leagues: Table,
    pub settings: Table,
    pub roster_slots: Table,
    pub scoring: Table,
}

impl LeagueTables {
    fn from_rows(
        leagues: Vec<Record>,
        settings: Vec<Record>,
        roster_slots: Vec<Record>,
        scoring: Vec<Record>,
    ) -> Self {
        // A position absent from one league counts as zero slots there.
        let mut slot_columns: Vec<String> = Vec::new();
        for record in &roster_slots {
            for (name, _) in record.iter() {
                if !matches!(name, "league_id" | "league_lineage_id")
                    && !slot_columns.iter().any(|c| c == name)
                {
                    slot_columns.push(name.to_string());
                }
            }
        }
        let roster_slots = roster_slots
            .into_iter()
            .map(|mut record| {
                for column in &slot_columns {
                    if record.get(column).is_null() {
                        record.set(column, 0i64);
                    }
                }
                record
            })
            .collect();

        Self {
            leagues: Table::from_records(leagues),
            settings: Table::from_records(settings),
            roster_slots: Table::from_records(roster_slots),
            scoring: Table::from_records(scoring),
        }
    }

    /// `(entity, table)` pairs in landing order.
    pub fn entities(&self) -> [(&'static str, &Table); 4] {
        [
            ("leagues", &self.leagues),
            ("settings", &self.settings),
            ("roster_slots", &self.roster_slots),
            ("scoring", &self.scoring),
        ]
    }
}

fn id_record(league: &League, lineage_id: Option<&str>) -> Record {
    let mut r = Record::new().with("league_id", league.league_id.as_str());
    if let Some(lineage_id) = lineage_id {
        r.set("league_lineage_id", lineage_id);
    }
    r
}

fn league_row(league: &League, lineage: Option<(&str, i64)>) -> Record {
    let mut r = id_record(league, lineage.map(|(id, _)| id));
    if let Some((_, season_number)) = lineage {
        r.set("season_number", season_number);
    }
    r.with("league_name", league.name.clone())
        .with("season", league.season.clone())
        .with("status", league.status.clone())
        .with("season_type", league.season_type.clone())
        .with("total_rosters", league.total_rosters)
        .with("draft_id", league.draft_id.clone())
        .with("bracket_id", Value::from(&league.bracket_id))
        .with("leg", Value::from(league.setting("leg")))
        .with("last_scored_leg", Value::from(league.setting("last_scored_leg")))
        .with("previous_league_id", league.previous_league_id.clone())
}

/// Count of each roster position plus taxi and IR slots.
fn roster_slot_row(league: &League, lineage_id: Option<&str>) -> Record {
    let mut r = id_record(league, lineage_id);
    for position in &league.roster_positions {
        let count = r.get(position).as_i64().unwrap_or(0);
        r.set(position, count + 1);
    }
    r.set("TAXI", league.setting("taxi_slots").as_i64().unwrap_or(0));
    r.set("IR", league.setting("reserve_slots").as_i64().unwrap_or(0));
    r
}

/// leagues, settings, roster slots, scoring
type LeagueRows = (Vec<Record>, Vec<Record>, Vec<Record>, Vec<Record>);

fn push_league(league: &League, lineage: Option<(&str, i64)>, rows: &mut LeagueRows) {
    let lineage_id = lineage.map(|(id, _)| id);
    rows.0.push(league_row(league, lineage));

    let mut settings = id_record(league, lineage_id);
    settings.extend_json(&league.settings);
    rows.1.push(settings);

    rows.2.push(roster_slot_row(league, lineage_id));

    let mut scoring = id_record(league, lineage_id);
    scoring.extend_json(&league.scoring_settings);
    rows.3.push(scoring);
}

/// Full-load tables for every season of every lineage.
pub fn flatten_lineages(lineages: &[Lineage]) -> LeagueTables {
    let mut rows: LeagueRows = Default::default();
    for lineage in lineages {
        for (league, season_number) in lineage.seasons() {
            push_league(league, Some((lineage.lineage_id.as_str(), season_number)), &mut rows);
        }
    }
    LeagueTables::from_rows(rows.0, rows.1, rows.2, rows.3)
}

/// Incremental tables; lineage ids are filled in at the silver merge.
pub fn flatten_leagues(leagues: &[League]) -> LeagueTables {
    let mut rows: LeagueRows = Default::default();
    for league in leagues {
        push_league(league, None, &mut rows);
    }
    LeagueTables::from_rows(rows.0, rows.1, rows.2, rows.3)
}

#[derive(Debug, Clone, Default)]
pub struct RosterTables {
    pub roster_players: Table,
    pub team_state: Table,
    pub nicknames: Table,
}

impl RosterTables {
    pub fn entities(&self) -> [(&'static str, &Table); 3] {
        [
            ("roster_players", &self.roster_players),
            ("team_state", &self.team_state),
            ("nicknames", &self.nicknames),
        ]
    }
}

fn roster_key(roster: &Roster) -> Record {
    Record::new()
        .with("league_id", roster.league_id.clone())
        .with("roster_id", roster.roster_id)
        .with("owner_id", roster.owner_id.clone())
}

fn id_set(ids: &Option<Vec<String>>) -> HashSet<&str> {
    ids.iter().flatten().map(String::as_str).collect()
}

pub fn flatten_rosters(rosters: &[Roster], now: DateTime<Utc>) -> RosterTables {
    let mut players = Vec::new();
    let mut team_state = Vec::new();
    let mut nicknames = Vec::new();

    for roster in rosters {
        let starters = id_set(&roster.starters);
        let taxi = id_set(&roster.taxi);
        let reserve = id_set(&roster.reserve);

        for player_id in roster.players.iter().flatten() {
            let id = player_id.as_str();
            let (is_taxi, is_reserve) = (taxi.contains(id), reserve.contains(id));
            players.push(
                roster_key(roster)
                    .with("player_id", id)
                    .with("is_starter", starters.contains(id))
                    .with("is_taxi", is_taxi)
                    .with("is_reserve", is_reserve)
                    .with("is_active", !is_taxi && !is_reserve)
                    .with("timestamp", now),
            );
        }

        let metadata = roster.metadata.as_ref();
        let settings = roster.settings.as_ref();
        let mut state = roster_key(roster)
            .with("timestamp", now)
            .with("record", str_or_none(field(metadata, "record")))
            .with("streak", str_or_none(field(metadata, "streak")));
        for key in TEAM_STATE_SETTINGS {
            state.set(key, int_or_none(field(settings, key)));
        }
        team_state.push(state);

        for (key, raw) in metadata.into_iter().flatten() {
            let Some(suffix) = key.strip_prefix(NICKNAME_PREFIX) else {
                continue;
            };
            let is_player = !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit());
            nicknames.push(
                roster_key(roster)
                    .with("meta_key", key.as_str())
                    .with("nickname_raw", Value::from(raw))
                    .with("subject_id", suffix)
                    .with("subject_type", if is_player { "player" } else { "team" })
                    .with("timestamp", now),
            );
        }
    }

    RosterTables {
        roster_players: Table::from_records(players),
        team_state: Table::from_records(team_state),
        nicknames: Table::from_records(nicknames),
    }
}

/// One row per (league_id, user_id), last occurrence wins.
pub fn flatten_users(users: &[User], league_id: &str, now: DateTime<Utc>) -> Result<DataFrame> {
    let rows = users
        .iter()
        .map(|u| {
            let team_name = u
                .metadata
                .as_ref()
                .and_then(|m| m.get("team_name"))
                .and_then(Json::as_str);
            Record::new()
                .with("league_id", league_id)
                .with("user_id", trimmed(u.user_id.as_deref()))
                .with("display_name", trimmed(u.display_name.as_deref()))
                .with("user_team_name", trimmed(team_name))
                .with("avatar", trimmed(u.avatar.as_deref()))
                .with("timestamp", now)
        })
        .collect();
    let table = Table::from_records(rows).to_frame()?;
    unique_by(&table, &["league_id", "user_id"], UniqueKeepStrategy::Last)
}

/// A traded pick as `"roster,season,round,from,to"`.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftPickRef {
    pub draft_pick_id: String,
    pub roster_id: Option<i64>,
    pub season: Option<String>,
    pub round: Option<i64>,
    pub from_team_id: i64,
    pub to_team_id: i64,
}

pub fn parse_draft_pick(raw: &str) -> Option<DraftPickRef> {
    let mut tail = raw.rsplitn(3, ',');
    let to_team_id = tail.next()?.trim().parse().ok()?;
    let from_team_id = tail.next()?.trim().parse().ok()?;
    let pick = tail.next()?;

    let mut parts = pick.split(',');
    Some(DraftPickRef {
        draft_pick_id: raw.to_string(),
        roster_id: parts.next().and_then(|p| p.trim().parse().ok()),
        season: parts.next().map(|p| p.trim().to_string()),
        round: parts.next().and_then(|p| p.trim().parse().ok()),
        from_team_id,
        to_team_id,
    })
}

/// REST transactions carry picks as objects rather than strings.
fn draft_pick_from_json(pick: &Json) -> Option<DraftPickRef> {
    match pick {
        Json::String(s) => parse_draft_pick(s),
        Json::Object(o) => {
            let roster_id = int_or_none(o.get("roster_id"));
            let season = str_or_none(o.get("season"));
            let round = int_or_none(o.get("round"));
            let from_team_id = int_or_none(o.get("previous_owner_id"))?;
            let to_team_id = int_or_none(o.get("owner_id"))?;
            let draft_pick_id = format!(
                "{},{},{},{from_team_id},{to_team_id}",
                roster_id.map(|r| r.to_string()).unwrap_or_default(),
                season.clone().unwrap_or_default(),
                round.map(|r| r.to_string()).unwrap_or_default(),
            );
            Some(DraftPickRef {
                draft_pick_id,
                roster_id,
                season,
                round,
                from_team_id,
                to_team_id,
            })
        }
        _ => None,
    }
}

fn draft_pick_record(pick: &DraftPickRef) -> Record {
    Record::new()
        .with("draft_pick_id", pick.draft_pick_id.as_str())
        .with("roster_id", pick.roster_id)
        .with("season", pick.season.clone())
        .with("round", pick.round)
        .with("from_team_id", pick.from_team_id)
        .with("to_team_id", pick.to_team_id)
}

#[derive(Debug, Clone, Default)]
pub struct TransactionTables {
    pub transactions: Table,
    pub players: Table,
    pub draft_picks: Table,
}

impl TransactionTables {
    pub fn entities(&self) -> [(&'static str, &Table); 3] {
        [
            ("transactions", &self.transactions),
            ("transaction_players", &self.players),
            ("draft_picks", &self.draft_picks),
        ]
    }

    pub fn concat(parts: Vec<TransactionTables>) -> Self {
        let (mut t, mut p, mut d) = (Vec::new(), Vec::new(), Vec::new());
        for part in parts {
            t.push(part.transactions);
            p.push(part.players);
            d.push(part.draft_picks);
        }
        Self {
            transactions: Table::concat(t),
            players: Table::concat(p),
            draft_picks: Table::concat(d),
        }
    }
}

fn player_moves(
    txn: &Transaction,
    league_id: &str,
    moves: Option<&JsonMap>,
    action: &str,
    out: &mut Vec<Record>,
) {
    for (player_id, roster_id) in moves.into_iter().flatten() {
        let info = txn
            .player_map
            .as_ref()
            .and_then(|m| m.get(player_id))
            .and_then(Json::as_object);
        let mut r = Record::new()
            .with("transaction_id", txn.transaction_id.as_str())
            .with("league_id", league_id)
            .with("player_id", player_id.as_str())
            .with("roster_id", Value::from(roster_id))
            .with("action", action);
        for (column, key) in PLAYER_INFO_FIELDS {
            r.set(column, Value::from(field(info, key).unwrap_or(&Json::Null)));
        }
        out.push(r);
    }
}

/// Header, player move and traded pick rows. `league_id` fills in for
/// REST payloads, which do not carry it.
pub fn flatten_transactions(transactions: &[Transaction], league_id: &str) -> TransactionTables {
    let mut headers = Vec::new();
    let mut players = Vec::new();
    let mut picks = Vec::new();

    for txn in transactions {
        let league_id = txn.league_id.as_deref().unwrap_or(league_id);
        let settings = txn.settings.as_ref();
        let notes = txn
            .metadata
            .as_ref()
            .and_then(|m| m.get("notes"))
            .unwrap_or(&Json::Null);

        headers.push(
            Record::new()
                .with("transaction_id", txn.transaction_id.as_str())
                .with("league_id", league_id)
                .with("type", txn.kind.clone())
                .with("status", txn.status.clone())
                .with("created", Value::from(&txn.created))
                .with("status_updated", Value::from(&txn.status_updated))
                .with("creator", txn.creator.clone())
                .with("leg", Value::from(&txn.leg))
                .with("waiver_bid", int_or_none(field(settings, "waiver_bid")))
                .with("waiver_seq", int_or_none(field(settings, "seq")))
                .with("waiver_budget", json_text(&txn.waiver_budget, "null"))
                .with("metadata_notes", Value::from(notes))
                .with("consenter_ids", json_text(&txn.consenter_ids, "[]"))
                .with("roster_ids", json_text(&txn.roster_ids, "[]")),
        );

        player_moves(txn, league_id, txn.adds.as_ref(), "add", &mut players);
        player_moves(txn, league_id, txn.drops.as_ref(), "drop", &mut players);

        for raw in txn.draft_picks.iter().flatten() {
            match draft_pick_from_json(raw) {
                Some(pick) => picks.push(
                    Record::new()
                        .with("transaction_id", txn.transaction_id.as_str())
                        .with("league_id", league_id)
                        .merge(draft_pick_record(&pick)),
                ),
                None => warn!(
                    transaction_id = %txn.transaction_id,
                    pick = %raw,
                    "unparseable draft pick, skipping"
                ),
            }
        }
    }

    TransactionTables {
        transactions: Table::from_records(headers),
        players: Table::from_records(players),
        draft_picks: Table::from_records(picks),
    }
}

/// Draft rows and the long-form draft order.
pub fn flatten_drafts(drafts: &[Draft], now: DateTime<Utc>) -> (Table, Table) {
    let mut rows = Vec::new();
    let mut order = Vec::new();

    for d in drafts {
        let metadata = d.metadata.as_ref();
        let settings = d.settings.as_ref();
        let draft_order = d.draft_order.clone().unwrap_or_default();

        let mut r = Record::new()
            .with("draft_id", d.draft_id.as_str())
            .with("league_id", d.league_id.clone());
        for (name, ms) in [
            ("created", d.created),
            ("last_message_time", d.last_message_time),
            ("last_picked", d.last_picked),
            ("start_time", d.start_time),
        ] {
            r.set(name, ms);
        }
        for (name, ms) in [
            ("created_iso", d.created),
            ("last_message_time_iso", d.last_message_time),
            ("last_picked_iso", d.last_picked),
            ("start_time_iso", d.start_time),
        ] {
            r.set(name, ms_to_iso(ms));
        }
        r = r
            .with("season", d.season.clone())
            .with("season_type", d.season_type.clone())
            .with("status", d.status.clone())
            .with("type", d.kind.clone())
            .with("sport", d.sport.clone())
            .with("draft_name", str_or_none(field(metadata, "name")))
            .with("draft_description", str_or_none(field(metadata, "description")))
            .with("scoring_type", str_or_none(field(metadata, "scoring_type")));
        for key in [
            "rounds",
            "teams",
            "pick_timer",
            "nomination_timer",
            "enforce_position_limits",
            "reversal_round",
            "player_type",
        ] {
            r.set(key, int_or_none(field(settings, key)));
        }
        r = r
            .with("creators_raw", json_text(&d.creators, "[]"))
            .with("draft_order_raw", Json::Object(draft_order.clone()).to_string())
            .with("timestamp", now);
        rows.push(r);

        for (user_id, slot) in &draft_order {
            order.push(
                Record::new()
                    .with("draft_id", d.draft_id.as_str())
                    .with("league_id", d.league_id.clone())
                    .with("user_id", user_id.as_str())
                    .with("slot", Value::from(slot)),
            );
        }
    }

    (Table::from_records(rows), Table::from_records(order))
}

/// One row per pick, deduplicated on (draft_id, pick_no).
pub fn flatten_draft_picks(picks: &[Json], now: DateTime<Utc>) -> Result<DataFrame> {
    let rows: Vec<Record> = picks
        .iter()
        .filter_map(Json::as_object)
        .map(|p| {
            let meta = p.get("metadata").and_then(Json::as_object);
            let news_ms = int_or_none(field(meta, "news_updated"));
            Record::new()
                .with("draft_id", str_or_none(p.get("draft_id")))
                .with("pick_no", int_or_none(p.get("pick_no")))
                .with("round", int_or_none(p.get("round")))
                .with("draft_slot", int_or_none(p.get("draft_slot")))
                .with("picked_by", str_or_none(p.get("picked_by")))
                .with("roster_id", int_or_none(p.get("roster_id")))
                .with("player_id", str_or_none(p.get("player_id")))
                .with("is_keeper", p.get("is_keeper").and_then(Json::as_bool))
                .with("player_first_name", str_or_none(field(meta, "first_name")))
                .with("player_last_name", str_or_none(field(meta, "last_name")))
                .with("player_position", str_or_none(field(meta, "position")))
                .with("player_team", str_or_none(field(meta, "team")))
                .with("player_status", str_or_none(field(meta, "status")))
                .with("player_years_exp", int_or_none(field(meta, "years_exp")))
                .with("player_number", int_or_none(field(meta, "number")))
                .with("player_injury_status", str_or_none(field(meta, "injury_status")))
                .with("player_news_updated_ms", news_ms)
                .with("player_news_updated_iso", ms_to_iso(news_ms))
                .with("player_team_changed_at", str_or_none(field(meta, "team_changed_at")))
                .with("player_team_abbr", str_or_none(field(meta, "team_abbr")))
                .with("timestamp", now)
        })
        .collect();

    if rows.is_empty() {
        return Table::with_columns(DRAFT_PICK_COLUMNS).to_frame();
    }
    let table = Table::from_records(rows).to_frame()?;
    unique_by(&table, &["draft_id", "pick_no"], UniqueKeepStrategy::Last)
}

/// Traded future picks with owner ids renamed to roster ids.
pub fn flatten_traded_picks(trades: &[Json], now: DateTime<Utc>) -> Result<DataFrame> {
    let rows: Vec<Record> = trades
        .iter()
        .filter_map(Json::as_object)
        .map(|t| {
            Record::new()
                .with("draft_id", str_or_none(t.get("draft_id")))
                .with("season", str_or_none(t.get("season")))
                .with("round", int_or_none(t.get("round")))
                .with("roster_id", int_or_none(t.get("roster_id")))
                .with("owner_roster_id", int_or_none(t.get("owner_id")))
                .with("previous_owner_roster_id", int_or_none(t.get("previous_owner_id")))
                .with("timestamp", now)
        })
        .collect();

    if rows.is_empty() {
        return Table::with_columns(TRADED_PICK_COLUMNS).to_frame();
    }
    let table = Table::from_records(rows).to_frame()?;
    unique_by(
        &table,
        &["draft_id", "season", "round", "roster_id"],
        UniqueKeepStrategy::Last,
    )
}

/// One row per player, every attribute as a column, `player_id` as text.
pub fn flatten_players(players: &JsonMap) -> Table {
    let rows = players
        .iter()
        .filter_map(|(id, data)| {
            let data = data.as_object()?;
            let mut r = Record::new().with("player_id", id.as_str());
            r.extend_json(data);
            r.set("player_id", id.as_str());
            Some(r)
        })
        .collect();
    Table::from_records(rows)
}

/// Pick movements made by a commissioner outside the transaction log.
///
/// `roster_id`, `season` and `round` are recovered from `draft_pick_id`
/// when an entry leaves them out.
pub fn flatten_commissioner_overrides(entries: &[Json]) -> Result<Table> {
    let mut rows = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let o = entry.as_object().ok_or_else(|| LakeError::InvalidValue {
            message: format!("override #{i} is not an object"),
        })?;
        let draft_pick_id = str_or_none(o.get("draft_pick_id")).ok_or_else(|| {
            LakeError::InvalidValue {
                message: format!("override #{i} has no draft_pick_id"),
            }
        })?;
        let parsed = parse_draft_pick(&draft_pick_id);

        rows.push(
            Record::new()
                .with("transaction_id", str_or_none(o.get("transaction_id")))
                .with("league_id", str_or_none(o.get("league_id")))
                .with("draft_pick_id", draft_pick_id.as_str())
                .with(
                    "roster_id",
                    int_or_none(o.get("roster_id"))
                        .or_else(|| parsed.as_ref().and_then(|p| p.roster_id)),
                )
                .with(
                    "season",
                    str_or_none(o.get("season"))
                        .or_else(|| parsed.as_ref().and_then(|p| p.season.clone())),
                )
                .with(
                    "round",
                    int_or_none(o.get("round")).or_else(|| parsed.as_ref().and_then(|p| p.round)),
                )
                .with(
                    "from_team_id",
                    int_or_none(o.get("from_team_id"))
                        .or_else(|| parsed.as_ref().map(|p| p.from_team_id)),
                )
                .with(
                    "to_team_id",
                    int_or_none(o.get("to_team_id")).or_else(|| parsed.as_ref().map(|p| p.to_team_id)),
                )
                .with("created", int_or_none(o.get("created"))),
        );
    }
    if rows.is_empty() {
        return Ok(Table::with_columns(OVERRIDE_COLUMNS));
    }
    Ok(Table::from_records(rows))
}
