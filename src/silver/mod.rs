//! Silver layer: conformed dimensions built from bronze tables
//!
//! - `merge`: full-load and incremental reconciliation
//! - `scd2`: slowly changing dimension versioning
//! - `dims`: the dimension builders themselves

pub mod dims;
pub mod merge;
pub mod scd2;


pub use merge::merge_full_and_incremental;
pub use scd2::{apply_scd2, Scd2Options, Scd2Stats};

/// `source_system` stamped on Sleeper-derived dimensions.
pub const SLEEPER_SOURCE: &str = "sleeper";

pub const DIM_LEAGUES: &str = "dim_leagues";
pub const DIM_LEAGUES_META: &str = "dim_leagues_meta";
pub const DIM_LEAGUE_SCORING: &str = "dim_league_scoring";
pub const DIM_LEAGUE_SETTINGS: &str = "dim_league_settings";
pub const DIM_USERS: &str = "dim_users";
pub const DIM_FRANCHISES_META: &str = "dim_franchises_meta";
pub const DIM_PLAYERS_MASTER: &str = "dim_players_master";
