//! Sleeper API payloads
//!
//! Only the fields the flatteners rely on are typed. Settings blocks stay
//! as JSON maps because every key is unpacked into its own bronze column.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cli::types::Leg;

pub type JsonMap = Map<String, Value>;

/// `GET /state/{sport}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SportState {
    pub season: String,
    #[serde(default)]
    pub season_type: Option<String>,
    #[serde(default)]
    pub week: Option<u32>,
    #[serde(default)]
    pub leg: Option<u32>,
    #[serde(default)]
    pub display_week: Option<u32>,
}

impl SportState {
    /// Current scoring leg, falling back to the display week.
    pub fn current_leg(&self) -> Leg {
        let leg = self.leg.or(self.week).or(self.display_week).unwrap_or(1);
        Leg::new(u16::try_from(leg).unwrap_or(1).max(1))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct League {
    pub league_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub season_type: Option<String>,
    #[serde(default)]
    pub total_rosters: Option<i64>,
    #[serde(default)]
    pub draft_id: Option<String>,
    /// Numeric on most leagues, occasionally a string.
    #[serde(default)]
    pub bracket_id: Value,
    #[serde(default)]
    pub previous_league_id: Option<String>,
    #[serde(default)]
    pub roster_positions: Vec<String>,
    #[serde(default)]
    pub settings: JsonMap,
    #[serde(default)]
    pub scoring_settings: JsonMap,
}

impl League {
    /// Sleeper uses `"0"` as well as null for "no previous league".
    pub fn previous_id(&self) -> Option<&str> {
        self.previous_league_id
            .as_deref()
            .filter(|id| !id.is_empty() && *id != "0")
    }

    pub fn setting(&self, key: &str) -> &Value {
        self.settings.get(key).unwrap_or(&Value::Null)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Roster {
    #[serde(default)]
    pub league_id: Option<String>,
    pub roster_id: i64,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub players: Option<Vec<String>>,
    #[serde(default)]
    pub starters: Option<Vec<String>>,
    #[serde(default)]
    pub taxi: Option<Vec<String>>,
    #[serde(default)]
    pub reserve: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: Option<JsonMap>,
    #[serde(default)]
    pub settings: Option<JsonMap>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub metadata: Option<JsonMap>,
}

/// Shared by the REST endpoint and the GraphQL query. GraphQL adds
/// `player_map` and sends draft picks as comma-joined strings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Transaction {
    pub transaction_id: String,
    #[serde(default)]
    pub league_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created: Value,
    #[serde(default)]
    pub status_updated: Value,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub leg: Value,
    #[serde(default)]
    pub settings: Option<JsonMap>,
    #[serde(default)]
    pub metadata: Option<JsonMap>,
    #[serde(default)]
    pub waiver_budget: Value,
    #[serde(default)]
    pub consenter_ids: Value,
    #[serde(default)]
    pub roster_ids: Value,
    #[serde(default)]
    pub adds: Option<JsonMap>,
    #[serde(default)]
    pub drops: Option<JsonMap>,
    #[serde(default)]
    pub draft_picks: Option<Vec<Value>>,
    #[serde(default)]
    pub player_map: Option<JsonMap>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Draft {
    pub draft_id: String,
    #[serde(default)]
    pub league_id: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub last_message_time: Option<i64>,
    #[serde(default)]
    pub last_picked: Option<i64>,
    #[serde(default)]
    pub start_time: Option<i64>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub season_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub sport: Option<String>,
    #[serde(default)]
    pub metadata: Option<JsonMap>,
    #[serde(default)]
    pub settings: Option<JsonMap>,
    #[serde(default)]
    pub creators: Value,
    #[serde(default)]
    pub draft_order: Option<JsonMap>,
}
