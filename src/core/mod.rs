//! Core utilities shared across sources and jobs
//!
//! - `http`: client construction, JSON/text fetches, request pacing

pub mod http;

pub use http::{build_client, get_json, get_text, Pacer};
