//! FantasyCalc trade values
//!
//! One request per league shape (QB count, team count, PPR). FantasyCalc
//! blocks aggressive clients, so requests are paced and rate limits are
//! waited out rather than retried in a loop.

use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER, USER_AGENT},
    Client,
};
use serde_json::Value as Json;
use std::fmt;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::core::http::{get_json, BROWSER_USER_AGENT};
use crate::core::Pacer;
use crate::error::LakeError;
use crate::table::{Record, Table, Value};
use crate::Result;


pub const FANTASYCALC_BASE_URL: &str = "https://api.fantasycalc.com";

/// Bronze source directory.
pub const SOURCE: &str = "fantasycalc";
pub const VALUES_ENTITY: &str = "values/daily";

const QB_COUNTS: &[u8] = &[1, 2];
const TEAM_COUNTS: &[u8] = &[8, 10, 12, 14];
const PPR_VALUES: &[f64] = &[0.0, 0.5, 1.0];

/// Output columns sourced from the nested `player` object.
const PLAYER_FIELDS: &[(&str, &str)] = &[
    ("id", "id"),
    ("name", "name"),
    ("mfl_id", "mflId"),
    ("sleeper_id", "sleeperId"),
    ("position", "position"),
    ("espn_id", "espnId"),
    ("fleaflicker_id", "fleaflickerId"),
    ("birthday", "maybeBirthday"),
    ("height", "maybeHeight"),
    ("weight", "maybeWeight"),
    ("college", "maybeCollege"),
    ("team", "maybeTeam"),
    ("age", "maybeAge"),
    ("years_exp", "maybeYoe"),
];

/// Output columns sourced from the value record itself.
const VALUE_FIELDS: &[(&str, &str)] = &[
    ("value", "value"),
    ("overall_rank", "overallRank"),
    ("position_rank", "positionRank"),
    ("trend_30_day", "trend30Day"),
    ("redraft_dynasty_value_difference", "redraftDynastyValueDifference"),
    ("redraft_dynasty_value_perc_difference", "redraftDynastyValuePercDifference"),
    ("redraft_value", "redraftValue"),
    ("combined_value", "combinedValue"),
    ("tier", "maybeTier"),
    ("adp", "maybeAdp"),
    ("trade_frequency", "maybeTradeFrequency"),
    ("moving_std_dev", "maybeMovingStandardDeviation"),
    ("moving_std_dev_perc", "maybeMovingStandardDeviationPerc"),
    ("moving_std_dev_adjusted", "maybeMovingStandardDeviationAdjusted"),
];

/// League settings a value set is computed for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeagueShape {
    pub n_qb: u8,
    pub n_teams: u8,
    pub ppr: f64,
}

impl LeagueShape {
    fn ppr_param(&self) -> String {
        if self.ppr.fract() == 0.0 {
            format!("{}", self.ppr as i64)
        } else {
            format!("{}", self.ppr)
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("isDynasty", "true".to_string()),
            ("numQbs", self.n_qb.to_string()),
            ("numTeams", self.n_teams.to_string()),
            ("ppr", self.ppr_param()),
            ("includeAdp", "false".to_string()),
        ]
    }
}

impl fmt::Display for LeagueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "qbs={} teams={} ppr={}", self.n_qb, self.n_teams, self.ppr)
    }
}

/// Every league shape the daily load covers, in request order.
pub fn league_shapes() -> Vec<LeagueShape> {
    let mut shapes = Vec::with_capacity(QB_COUNTS.len() * TEAM_COUNTS.len() * PPR_VALUES.len());
    for &n_qb in QB_COUNTS {
        for &n_teams in TEAM_COUNTS {
            for &ppr in PPR_VALUES {
                shapes.push(LeagueShape { n_qb, n_teams, ppr });
            }
        }
    }
    shapes
}

/// Sleeps used while walking the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waits {
    /// Before retrying a 429.
    pub rate_limited: Duration,
    /// After a 403, before moving on.
    pub forbidden: Duration,
    pub between: Pacer,
    pub long_break_every: usize,
    pub long_break: Pacer,
}

impl Default for Waits {
    fn default() -> Self {
        Self {
            rate_limited: Duration::from_secs(90),
            forbidden: Duration::from_secs(300),
            between: Pacer::Normal {
                mean_secs: 6.0,
                std_secs: 2.0,
                floor: Duration::from_secs(1),
            },
            long_break_every: 5,
            long_break: Pacer::Uniform {
                min: Duration::from_secs(10),
                max: Duration::from_secs(20),
            },
        }
    }
}

impl Waits {
    /// No sleeping at all.
    pub fn none() -> Self {
        Self {
            rate_limited: Duration::ZERO,
            forbidden: Duration::ZERO,
            between: Pacer::None,
            long_break_every: 0,
            long_break: Pacer::None,
        }
    }
}

async fn sleep(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

fn api_headers() -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    h.insert(ORIGIN, HeaderValue::from_static("https://www.fantasycalc.com"));
    h.insert(REFERER, HeaderValue::from_static("https://www.fantasycalc.com/"));
    h.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    h
}

/// Result of walking the grid.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Value records tagged with `n_qb`, `n_teams` and `ppr`.
    pub records: Vec<Json>,
    pub failures: Vec<(LeagueShape, String)>,
}

#[derive(Debug, Clone)]
pub struct FantasyCalcClient {
    client: Client,
    base_url: String,
    waits: Waits,
}

impl FantasyCalcClient {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, FANTASYCALC_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            waits: Waits::default(),
        }
    }

    pub fn with_waits(mut self, waits: Waits) -> Self {
        self.waits = waits;
        self
    }

    async fn get_values(&self, shape: &LeagueShape) -> Result<Vec<Json>> {
        let url = format!("{}/values/current", self.base_url);
        get_json(&self.client, &url, &shape.query(), Some(api_headers())).await
    }

    /// Values for one league shape; a 429 is waited out and retried once.
    pub async fn values(&self, shape: &LeagueShape) -> Result<Vec<Json>> {
        match self.get_values(shape).await {
            Err(LakeError::Status { status: 429, .. }) => {
                warn!(%shape, wait_secs = self.waits.rate_limited.as_secs(), "rate limited, waiting");
                sleep(self.waits.rate_limited).await;
                self.get_values(shape).await
            }
            other => other,
        }
    }

    /// Walk every shape, tagging records with the shape they came from.
    ///
    /// A failed shape is logged and skipped; a 403 additionally pauses
    /// before the next request.
    pub async fn fetch_all(&self, shapes: &[LeagueShape]) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();
        info!(requests = shapes.len(), "fetching FantasyCalc values");

        for (i, shape) in shapes.iter().enumerate() {
            let n = i + 1;
            match self.values(shape).await {
                Ok(records) => {
                    info!(%shape, players = records.len(), "fetched values");
                    outcome
                        .records
                        .extend(records.into_iter().map(|r| tag_record(r, shape)));
                }
                Err(err @ LakeError::Status { status: 403, .. }) => {
                    error!(%shape, "access forbidden, pausing");
                    sleep(self.waits.forbidden).await;
                    outcome.failures.push((*shape, err.to_string()));
                    continue;
                }
                Err(err) => {
                    error!(%shape, error = %err, "failed to fetch values");
                    outcome.failures.push((*shape, err.to_string()));
                    continue;
                }
            }

            if n < shapes.len() {
                self.waits.between.pause().await;
            }
            if self.waits.long_break_every > 0 && n % self.waits.long_break_every == 0 {
                self.waits.long_break.pause().await;
            }
        }

        info!(
            records = outcome.records.len(),
            failures = outcome.failures.len(),
            "FantasyCalc fetch complete"
        );
        outcome
    }
}

fn tag_record(mut record: Json, shape: &LeagueShape) -> Json {
    if let Some(map) = record.as_object_mut() {
        map.insert("n_qb".into(), Json::from(shape.n_qb));
        map.insert("n_teams".into(), Json::from(shape.n_teams));
        map.insert("ppr".into(), Json::from(shape.ppr));
    }
    record
}

/// One row per value record, player fields lifted to the top level.
pub fn flatten_values(records: &[Json]) -> Table {
    let rows = records
        .iter()
        .map(|item| {
            let player = item.get("player").unwrap_or(&Json::Null);
            let mut record = Record::new();
            for (column, key) in PLAYER_FIELDS {
                record.set(column, Value::from(player.get(*key).unwrap_or(&Json::Null)));
            }
            for (column, key) in VALUE_FIELDS {
                record.set(column, Value::from(item.get(*key).unwrap_or(&Json::Null)));
            }
            record.set("n_qb", Value::from(item.get("n_qb").unwrap_or(&Json::Null)).to_int_value());
            record.set("n_teams", Value::from(item.get("n_teams").unwrap_or(&Json::Null)).to_int_value());
            record.set("ppr", Value::from(item.get("ppr").unwrap_or(&Json::Null)).to_float_value());
            record
        })
        .collect();
    Table::from_records(rows)
}
