//! KeepTradeCut dynasty values
//!
//! KTC has no API. The rankings page embeds `playersArray = [...];` in a
//! script tag and each player page embeds `var playerSuperflex = {...};`
//! and `var playerOneQB = {...};` with the full value history.

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::{Map, Value as Json};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use crate::core::http::{browser_headers, get_text};
use crate::core::Pacer;
use crate::table::{Record, Table, Value};
use crate::{error::LakeError, Result};


pub const KTC_BASE_URL: &str = "https://keeptradecut.com";

/// Bronze source directory.
pub const SOURCE: &str = "ktc";

/// Draft-pick pseudo players carry no positional rank.
pub const ROOKIE_PICK_POSITION: &str = "RDP";

const RANKING_DATE_FORMAT: &str = "%y%m%d";

type JsonMap = Map<String, Json>;

const VALUE_FIELDS: &[&str] = &[
    "startSitValue",
    "overallTrend",
    "positionalTrend",
    "overall7DayTrend",
    "positional7DayTrend",
    "kept",
    "traded",
    "cut",
    "diff",
    "isOutThisWeek",
    "adp",
    "avgAuctionPercentage",
    "startupAdp",
    "startupAvgAuctionPercentage",
    "rawLiquidity",
    "stdLiquidity",
    "tradeCount",
    "value",
    "rank",
    "positionalRank",
    "overallTier",
    "positionalTier",
];

/// Tight-end premium sub-blocks.
const PREMIUM_BLOCKS: &[&str] = &["tep", "tepp", "teppp"];
const PREMIUM_FIELDS: &[&str] = &["value", "rank", "positionalRank", "overallTier", "positionalTier"];

const INT_FIELDS: &[&str] = &[
    "kept",
    "traded",
    "cut",
    "tradeCount",
    "rank",
    "positionalRank",
    "overallTier",
    "positionalTier",
];
const BOOL_FIELDS: &[&str] = &["isTrending", "isOutThisWeek"];

/// Which KTC rankings board to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Board {
    Dynasty,
    Devy,
}

impl Board {
    fn page(&self) -> &'static str {
        match self {
            Board::Dynasty => "dynasty-rankings",
            Board::Devy => "devy-rankings",
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Board::Dynasty => write!(f, "dynasty"),
            Board::Devy => write!(f, "devy"),
        }
    }
}

/// `{board}/daily_load`
pub fn rankings_entity(board: Board) -> String {
    format!("{board}/daily_load")
}

/// `{board}/full_load`
pub fn history_entity(board: Board) -> String {
    format!("{board}/full_load")
}

#[derive(Debug, Clone)]
pub struct KtcClient {
    client: Client,
    base_url: String,
    pacer: Pacer,
}

impl KtcClient {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, KTC_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            pacer: Pacer::Uniform {
                min: Duration::from_secs(2),
                max: Duration::from_secs(6),
            },
        }
    }

    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.pacer.pause().await;
        get_text(&self.client, url, Some(browser_headers())).await
    }

    /// Every player on the board, as embedded in the rankings page.
    pub async fn rankings(&self, board: Board) -> Result<Vec<Json>> {
        let url = format!("{}/{}", self.base_url, board.page());
        players_array(&self.fetch_page(&url).await?)
    }

    /// Raw HTML of one player's page.
    pub async fn player_page(&self, board: Board, slug: &str) -> Result<String> {
        let url = format!("{}/{}/players/{slug}", self.base_url, board.page());
        self.fetch_page(&url).await
    }
}

fn scrape_error(what: &str, reason: impl Into<String>) -> LakeError {
    LakeError::Scrape {
        what: what.to_string(),
        reason: reason.into(),
    }
}

/// Text of the first `<script>` whose body contains `marker`.
pub fn find_script_containing(html: &str, marker: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script").ok()?;
    document
        .select(&selector)
        .map(|script| script.text().collect::<String>())
        .find(|text| text.contains(marker))
}

fn extract_json(html: &str, what: &str, marker: &str, pattern: &str) -> Result<Json> {
    let script =
        find_script_containing(html, marker).ok_or_else(|| scrape_error(what, "no script tag"))?;
    let re = Regex::new(pattern)?;
    let raw = re
        .captures(&script)
        .and_then(|c| c.get(1))
        .ok_or_else(|| scrape_error(what, "no match in script"))?;
    Ok(serde_json::from_str(raw.as_str())?)
}

/// `playersArray` from the rankings page.
pub fn players_array(html: &str) -> Result<Vec<Json>> {
    match extract_json(html, "playersArray", "playersArray", r"(?s)playersArray = (\[.*?\]);")? {
        Json::Array(players) => Ok(players),
        _ => Err(scrape_error("playersArray", "not an array")),
    }
}

fn object(value: Json, what: &str) -> Result<JsonMap> {
    match value {
        Json::Object(map) => Ok(map),
        _ => Err(scrape_error(what, "not an object")),
    }
}

/// One-QB history block from a player page.
pub fn player_one_qb(html: &str) -> Result<JsonMap> {
    let value = extract_json(
        html,
        "playerOneQB",
        "var playerOneQB",
        r"(?s)var playerOneQB = (\{.*?\});\s+var leagueType",
    )?;
    object(value, "playerOneQB")
}

/// Superflex history block from a player page.
pub fn player_superflex(html: &str) -> Result<JsonMap> {
    let value = extract_json(
        html,
        "playerSuperflex",
        "var playerSuperflex",
        r"(?s)var playerSuperflex = (\{.*?\});\s+var playerOneQB",
    )?;
    object(value, "playerSuperflex")
}

fn typed(field: &str, value: &Json) -> Value {
    let value = Value::from(value);
    if BOOL_FIELDS.contains(&field) {
        value.to_bool_value()
    } else if INT_FIELDS.contains(&field) {
        value.to_int_value()
    } else {
        value.to_float_value()
    }
}

fn flatten_block(record: &mut Record, prefix: &str, block: &JsonMap) {
    for field in VALUE_FIELDS {
        let value = block.get(*field).unwrap_or(&Json::Null);
        record.set(&format!("{prefix}_{field}"), typed(field, value));
    }
    for premium in PREMIUM_BLOCKS {
        let Some(sub) = block.get(*premium).and_then(Json::as_object) else {
            continue;
        };
        for field in PREMIUM_FIELDS {
            let value = sub.get(*field).unwrap_or(&Json::Null);
            record.set(&format!("{prefix}_{premium}_{field}"), typed(field, value));
        }
    }
}

/// One rankings row: identity, then one-QB and superflex blocks when present.
pub fn flatten_ranking_player(player: &Json) -> Record {
    let get = |k: &str| player.get(k).unwrap_or(&Json::Null);
    let mut record = Record::new()
        .with("playerName", Value::from(get("playerName")))
        .with("playerID", Value::from(get("playerID")))
        .with("slug", Value::from(get("slug")))
        .with("position", Value::from(get("position")))
        .with("positionID", Value::from(get("positionID")).to_int_value())
        .with("isTrending", Value::from(get("isTrending")).to_bool_value());

    if let Some(block) = get("oneQBValues").as_object() {
        flatten_block(&mut record, "oneqb", block);
    }
    if let Some(block) = get("superflexValues").as_object() {
        flatten_block(&mut record, "sf", block);
    }
    record
}

pub fn rankings_table(players: &[Json]) -> Table {
    Table::from_records(players.iter().map(flatten_ranking_player).collect())
}

/// Identity carried onto every history row.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPlayer {
    pub slug: String,
    pub player_id: Value,
    pub player_name: Value,
    pub position: Option<String>,
}

impl HistoryPlayer {
    /// From a `playersArray` entry; `None` without a slug.
    pub fn from_ranking(player: &Json) -> Option<Self> {
        Some(Self {
            slug: player.get("slug")?.as_str()?.to_string(),
            player_id: Value::from(player.get("playerID").unwrap_or(&Json::Null)),
            player_name: Value::from(player.get("playerName").unwrap_or(&Json::Null)),
            position: player
                .get("position")
                .and_then(Json::as_str)
                .map(str::to_string),
        })
    }

    fn is_rookie_pick(&self) -> bool {
        self.position.as_deref() == Some(ROOKIE_PICK_POSITION)
    }
}

/// `[{d, v}, ...]` as date -> value.
fn series(block: &JsonMap, key: &str) -> BTreeMap<String, Json> {
    block
        .get(key)
        .and_then(Json::as_array)
        .into_iter()
        .flatten()
        .filter_map(|point| {
            let d = point.get("d")?;
            let d = d.as_str().map(str::to_string).unwrap_or_else(|| d.to_string());
            Some((d, point.get("v").cloned().unwrap_or(Json::Null)))
        })
        .collect()
}

/// One row per ranking date across the one-QB and superflex histories.
pub fn history_rows(
    player: &HistoryPlayer,
    one_qb: &JsonMap,
    superflex: &JsonMap,
    scrape_date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Table> {
    let mut columns = vec![
        ("one_qb_value", series(one_qb, "overallValue")),
        ("one_qb_overall_rank", series(one_qb, "overallRankHistory")),
        ("sf_value", series(superflex, "overallValue")),
        ("sf_overall_rank", series(superflex, "overallRankHistory")),
    ];
    if !player.is_rookie_pick() {
        columns.push(("one_qb_pos_rank", series(one_qb, "positionalRankHistory")));
        columns.push(("sf_pos_rank", series(superflex, "positionalRankHistory")));
    }

    let dates: BTreeSet<&String> =
        columns.iter().flat_map(|(_, s)| s.keys()).collect();

    let mut rows = Vec::with_capacity(dates.len());
    for date in dates {
        let ranking_date = NaiveDate::parse_from_str(date, RANKING_DATE_FORMAT)?;
        let mut record = Record::new()
            .with("player_id", player.player_id.clone())
            .with("player_name", player.player_name.clone())
            .with("position", player.position.clone())
            .with("slug", player.slug.as_str())
            .with("ranking_date", ranking_date);
        for (name, values) in &columns {
            let value = Value::from(values.get(date).unwrap_or(&Json::Null));
            let value = if name.ends_with("_value") {
                value.to_float_value()
            } else {
                value.to_int_value()
            };
            record.set(name, value);
        }
        record.set("scrape_date", scrape_date);
        record.set("processed_at", now);
        rows.push(record);
    }
    Ok(Table::from_records(rows))
}
