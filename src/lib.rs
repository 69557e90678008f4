//! Fantasy football data lake
//!
//! Batch jobs that land raw fantasy football data in a bronze layer and
//! build conformed silver dimensions from it.
//!
//! ## Sources
//!
//! - **Sleeper**: leagues and their lineages, rosters, users, players,
//!   transactions and drafts (REST and GraphQL)
//! - **KeepTradeCut**: dynasty and devy rankings and per-player value history
//! - **FantasyCalc**: dynasty trade values across league shapes
//! - **nflverse**: statistics, rosters and player id maps
//!
//! ## Layout
//!
//! ```text
//! bronze/{source}/{entity}/load_date=YYYY-MM-DD/data.parquet
//! silver/fantasy/{dim}/data.parquet
//! ```
//!
//! The silver league tables `dim_league_scoring` and `dim_league_settings`
//! are kept as SCD Type 2 history.
//!
//! ## Environment Configuration
//!
//! ```bash
//! export GCS_BUCKET_NAME=my-lake
//! export GCS_ACCESS_TOKEN=$(gcloud auth print-access-token)
//! export SLEEPER_USER_ID=123456789
//! # or write to a local directory instead
//! export FFL_LAKE_ROOT=/tmp/lake
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod silver;
pub mod sources;
pub mod storage;
pub mod table;

// Re-export commonly used types
pub use cli::types::{DraftId, LeagueId, Leg, Season, UserId};
pub use error::{LakeError, Result};
pub use table::{IntoFrame, Record, Table, Value};

pub const GCS_BUCKET_ENV_VAR: &str = "GCS_BUCKET_NAME";
pub const GCS_TOKEN_ENV_VAR: &str = "GCS_ACCESS_TOKEN";
pub const LAKE_ROOT_ENV_VAR: &str = "FFL_LAKE_ROOT";
pub const SLEEPER_USER_ENV_VAR: &str = "SLEEPER_USER_ID";
pub const SLEEPER_AUTH_ENV_VAR: &str = "SLEEPER_AUTH_TOKEN";
pub const SLEEPER_EMAIL_ENV_VAR: &str = "SLEEPER_EMAIL";
pub const SLEEPER_PASSWORD_ENV_VAR: &str = "SLEEPER_PASSWORD";
pub const USER_SHEET_ENV_VAR: &str = "USER_NAME_SHEET_URL";
pub const FORCE_RUN_ENV_VAR: &str = "FORCE_RUN";
