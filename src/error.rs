use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Page format changed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Failure of the per-day page fetch. Transient and permanent causes are not told apart.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// The page has markup, but not the table layout the extractor is built for.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector {css:?}: {reason}")]
    Selector { css: &'static str, reason: String },

    #[error("unexpected table header {found:?}")]
    UnexpectedHeader { found: Vec<String> },

    #[error("{cells} cells do not fit a {width}-cell row layout")]
    RaggedTable { cells: usize, width: usize },

    #[error("header has no {0:?} column")]
    MissingColumn(&'static str),

    #[error("row {row}: settled score {score:?} has no recognised colour (found {colour:?})")]
    UnknownResultColour {
        row: usize,
        score: String,
        colour: Option<String>,
    },

    #[error("row {row}: unparseable time of day {value:?}")]
    BadTime { row: usize, value: String },
}
