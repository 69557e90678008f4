//! Type-safe wrappers for Sleeper identifiers and NFL calendar values.

pub mod ids;
pub mod time;

pub use ids::{DraftId, LeagueId, UserId};
pub use time::{season_kickoff, Leg, Season};
