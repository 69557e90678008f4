//! League lineage: a dynasty league is a chain of season leagues linked
//! by `previous_league_id`.

use std::collections::HashSet;
use tracing::{info, warn};

use super::client::SleeperClient;
use super::types::League;
use crate::cli::types::{LeagueId, Season, UserId};
use crate::Result;

/// One dynasty league across every season it has existed.
#[derive(Debug, Clone)]
pub struct Lineage {
    /// Id of the founding league.
    pub lineage_id: String,
    /// Newest season first.
    pub leagues: Vec<League>,
}

impl Lineage {
    /// Build from a chain ordered newest first.
    pub fn from_chain(leagues: Vec<League>) -> Option<Self> {
        let lineage_id = leagues.last()?.league_id.clone();
        Some(Self {
            lineage_id,
            leagues,
        })
    }

    /// `season_number` of the league at `index`; the founding league is 1.
    pub fn season_number(&self, index: usize) -> i64 {
        (self.leagues.len() - index) as i64
    }

    /// Leagues paired with their season number.
    pub fn seasons(&self) -> impl Iterator<Item = (&League, i64)> {
        self.leagues
            .iter()
            .enumerate()
            .map(|(i, league)| (league, self.season_number(i)))
    }
}

/// Walk `previous_league_id` back from `start` until the founding league.
///
/// A league id seen twice ends the walk so a malformed chain cannot loop.
pub async fn walk_lineage(client: &SleeperClient, start: League) -> Result<Vec<League>> {
    let mut seen = HashSet::from([start.league_id.clone()]);
    let mut previous = start.previous_id().map(str::to_string);
    let mut chain = vec![start];

    while let Some(id) = previous {
        if !seen.insert(id.clone()) {
            warn!(league_id = %id, "lineage cycle detected, stopping walk");
            break;
        }
        client.pacer().pause().await;
        let league = client.league(&LeagueId::new(id)).await?;
        previous = league.previous_id().map(str::to_string);
        chain.push(league);
    }
    Ok(chain)
}

/// Every lineage the user belongs to in `season`.
pub async fn user_lineages(
    client: &SleeperClient,
    user_id: &UserId,
    sport: &str,
    season: Season,
) -> Result<Vec<Lineage>> {
    let leagues = client.user_leagues(user_id, sport, season).await?;
    info!(user_id = %user_id, %season, leagues = leagues.len(), "found user leagues");

    let mut lineages = Vec::with_capacity(leagues.len());
    for league in leagues {
        let name = league.name.clone().unwrap_or_default();
        let chain = walk_lineage(client, league).await?;
        if let Some(lineage) = Lineage::from_chain(chain) {
            info!(
                league = %name,
                lineage_id = %lineage.lineage_id,
                seasons = lineage.leagues.len(),
                "resolved lineage"
            );
            lineages.push(lineage);
        }
    }
    Ok(lineages)
}
