use std::path::PathBuf;

use crate::error::{AppError, Result};

/// Per-day pages live at `BASE_URL` + `dd-mm-yyyy`.
pub const BASE_URL: &str = "https://tipsbet.co.uk/free-betting-tips-";

/// chrono format for the day suffix of a page URL.
pub const URL_DAY_FORMAT: &str = "%d-%m-%Y";

pub const DEFAULT_SNAPSHOT_PATH: &str = "tips_snapshot.db";

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fixed layout of the tips table.
pub mod layout {
    pub const TABLE_SELECTOR: &str = "table#table-tipsbet";

    /// Expected header, in order. Matched case-insensitively.
    pub const COLUMNS: [&str; 9] = [
        "Date", "Time", "Sport", "Flag", "League", "Match", "Tip", "Odds", "Result",
    ];

    /// Cells per data row.
    pub const ROW_WIDTH: usize = COLUMNS.len();

    /// Position of the result cell inside a row; every `ROW_WIDTH`-th flat cell from here.
    pub const RESULT_OFFSET: usize = 8;

    /// Score text of a tip that has not been settled yet.
    pub const UNRESOLVED_SCORE: &str = "?";

    /// Separator of the combined `"<score> | <status>"` result text.
    pub const RESULT_SEPARATOR: char = '|';
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    /// SQLite file holding the accumulated snapshot (SNAPSHOT_PATH)
    pub snapshot_path: PathBuf,
    /// Per-request timeout for page fetches (HTTP_TIMEOUT_SECS)
    pub http_timeout_secs: u64,
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            snapshot_path: std::env::var("SNAPSHOT_PATH")
                .unwrap_or_else(|_| DEFAULT_SNAPSHOT_PATH.to_string())
                .into(),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .map_err(|_| {
                    AppError::Config("HTTP_TIMEOUT_SECS must be a whole number of seconds".to_string())
                })?,
            user_agent: std::env::var("USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
        })
    }

    /// `-v` raises the filter to debug, `-vv` and above to trace.
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        match verbose {
            0 => {}
            1 => self.log_level = "debug".to_string(),
            _ => self.log_level = "trace".to_string(),
        }
        self
    }

    pub fn with_snapshot_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(p) = path {
            self.snapshot_path = p;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            log_level: "info".to_string(),
            snapshot_path: DEFAULT_SNAPSHOT_PATH.into(),
            http_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(base().with_verbosity(0).log_level, "info");
        assert_eq!(base().with_verbosity(1).log_level, "debug");
        assert_eq!(base().with_verbosity(3).log_level, "trace");
    }

    #[test]
    fn snapshot_override_only_when_given() {
        assert_eq!(base().with_snapshot_path(None).snapshot_path, PathBuf::from(DEFAULT_SNAPSHOT_PATH));
        assert_eq!(
            base().with_snapshot_path(Some("other.db".into())).snapshot_path,
            PathBuf::from("other.db")
        );
    }

    #[test]
    fn result_cell_is_last_column() {
        assert_eq!(layout::COLUMNS[layout::RESULT_OFFSET], "Result");
    }
}
