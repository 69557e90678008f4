use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::types::{Draft, JsonMap, League, Roster, SportState, Transaction, User};
use crate::cli::types::{DraftId, LeagueId, Leg, Season, UserId};
use crate::core::{get_json, Pacer};
use crate::Result;

/// Base path for the Sleeper v1 REST API.
pub const SLEEPER_BASE_URL: &str = "https://api.sleeper.app/v1";

pub const DEFAULT_SPORT: &str = "nfl";

/// Thin wrapper over the public Sleeper REST endpoints.
#[derive(Debug, Clone)]
pub struct SleeperClient {
    client: Client,
    base_url: String,
    pacer: Pacer,
}

impl SleeperClient {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, SLEEPER_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            pacer: Pacer::Fixed(Duration::from_secs(1)),
        }
    }

    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    /// Sleep between per-league requests.
    pub fn pacer(&self) -> Pacer {
        self.pacer
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        get_json(&self.client, &url, &[], None).await
    }

    pub async fn sport_state(&self, sport: &str) -> Result<SportState> {
        self.get(&format!("/state/{sport}")).await
    }

    pub async fn league(&self, league_id: &LeagueId) -> Result<League> {
        self.get(&format!("/league/{league_id}")).await
    }

    pub async fn rosters(&self, league_id: &LeagueId) -> Result<Vec<Roster>> {
        self.get(&format!("/league/{league_id}/rosters")).await
    }

    pub async fn users(&self, league_id: &LeagueId) -> Result<Vec<User>> {
        self.get(&format!("/league/{league_id}/users")).await
    }

    pub async fn transactions(&self, league_id: &LeagueId, leg: Leg) -> Result<Vec<Transaction>> {
        self.get(&format!("/league/{league_id}/transactions/{leg}"))
            .await
    }

    pub async fn user_leagues(
        &self,
        user_id: &UserId,
        sport: &str,
        season: Season,
    ) -> Result<Vec<League>> {
        self.get(&format!("/user/{user_id}/leagues/{sport}/{season}"))
            .await
    }

    pub async fn drafts(&self, league_id: &LeagueId) -> Result<Vec<Draft>> {
        self.get(&format!("/league/{league_id}/drafts")).await
    }

    /// Picks are kept as raw JSON; numeric fields arrive as strings or numbers.
    pub async fn draft_picks(&self, draft_id: &DraftId) -> Result<Vec<Value>> {
        self.get(&format!("/draft/{draft_id}/picks")).await
    }

    pub async fn traded_picks(&self, draft_id: &DraftId) -> Result<Vec<Value>> {
        self.get(&format!("/draft/{draft_id}/traded_picks")).await
    }

    /// Every player keyed by Sleeper player id (several MB).
    pub async fn all_players(&self, sport: &str) -> Result<JsonMap> {
        self.get(&format!("/players/{sport}")).await
    }
}
