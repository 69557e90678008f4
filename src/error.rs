//! Error types for the fantasy football lake jobs

use thiserror::Error;

#[cfg(test)]
mod tests;

pub type Result<T> = std::result::Result<T, LakeError>;

#[derive(Error, Debug)]
pub enum LakeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("GraphQL request failed: {message}")]
    GraphQl { message: String },

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid regex: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid number: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("Invalid date: {0}")]
    Date(#[from] chrono::ParseError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("{env_var} environment variable not set")]
    MissingConfig { env_var: String },

    #[error("No bronze data found under {prefix}")]
    NoBronzeData { prefix: String },

    #[error("Object not found: {path}")]
    ObjectNotFound { path: String },

    #[error("Could not extract {what} from page: {reason}")]
    Scrape { what: String, reason: String },

    #[error("Column {column} not found")]
    MissingColumn { column: String },

    #[error("Duplicate key {key} in {table}")]
    DuplicateKey { table: String, key: String },

    #[error("Key {key} has {count} current rows")]
    MultipleCurrent { key: String, count: usize },

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },

    #[error("{job} finished with {failed} failed item(s)")]
    BatchFailed { job: String, failed: usize },
}
