//! Bronze-layer sources
//!
//! Each source owns its HTTP client, its flatteners and the bronze
//! entity names it lands:
//! - `sleeper`: REST and GraphQL league data
//! - `ktc`: KeepTradeCut dynasty rankings scraped from HTML
//! - `fantasycalc`: FantasyCalc trade values
//! - `nflverse`: nflverse release assets

pub mod fantasycalc;
pub mod ktc;
pub mod nflverse;
pub mod sleeper;
