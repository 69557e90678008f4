//! Sleeper fantasy platform
//!
//! - `client`: public REST endpoints
//! - `graphql`: login and full transaction history
//! - `lineage`: walking a dynasty league back to its founding season
//! - `flatten`: payloads to bronze tables
//! - `types`: the payloads themselves

pub mod client;
pub mod flatten;
pub mod graphql;
pub mod lineage;
pub mod types;


pub use client::{SleeperClient, DEFAULT_SPORT, SLEEPER_BASE_URL};
pub use graphql::{SleeperGraphQl, SLEEPER_GRAPHQL_URL};
pub use lineage::{user_lineages, Lineage};

use std::fmt;

/// Bronze source directory.
pub const SOURCE: &str = "sleeper";

pub const USERS_ENTITY: &str = "rosters/users/weekly";
pub const PLAYERS_ENTITY: &str = "league/players/incremental";
pub const TRANSACTIONS_DAILY_ENTITY: &str = "league/transactions/daily";
pub const OVERRIDES_ENTITY: &str = "transactions/commission_overrides";

/// How a league entity was landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Load {
    /// Every season of every lineage, from the lineage walk.
    FullLoad,
    /// Current season only, refreshed daily.
    Incremental,
}

impl fmt::Display for Load {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Load::FullLoad => write!(f, "full_load"),
            Load::Incremental => write!(f, "incremental"),
        }
    }
}

/// `league/{entity}/{load}`, e.g. `league/settings/full_load`.
pub fn league_entity(entity: &str, load: Load) -> String {
    format!("league/{entity}/{load}")
}

/// `rosters/{entity}/daily`
pub fn rosters_entity(entity: &str) -> String {
    format!("rosters/{entity}/daily")
}

/// `transactions/{entity}/full_load`
pub fn transactions_entity(entity: &str) -> String {
    format!("transactions/{entity}/full_load")
}

/// `drafts/{entity}`
pub fn drafts_entity(entity: &str) -> String {
    format!("drafts/{entity}")
}
