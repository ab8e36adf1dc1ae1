use std::path::PathBuf;

use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};

pub const RECENT_LIMIT: i64 = 200;

// ---------------------------------------------------------------------------
// Snapshot row types (mirror migrations/0001_snapshot.sql)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MetaRow {
    pub saved_at: NaiveDateTime,
    pub row_count: i64,
    pub first_day: Option<String>,
    pub last_day: Option<String>,
}

#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct SportCounts {
    pub sport: String,
    pub won: i64,
    pub lost: i64,
    pub pending: i64,
}

impl SportCounts {
    pub fn win_rate(&self) -> Option<f64> {
        match self.won + self.lost {
            0 => None,
            n => Some(self.won as f64 / n as f64),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecentRow {
    pub timestamp: NaiveDateTime,
    pub sport: String,
    pub league: String,
    pub event: String,
    pub tip: String,
    pub odds: String,
    pub outcome_score: String,
    pub status: String,
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotStatus {
    Loaded,
    /// The file exists but nothing has been saved into it yet.
    Empty,
    Error(String),
    Opening,
}

#[derive(Debug)]
pub struct AppState {
    pub status: SnapshotStatus,
    pub meta: Option<MetaRow>,
    pub counts: Vec<SportCounts>,
    pub recent: Vec<RecentRow>,
    pub last_refresh: std::time::Instant,
    pub path: PathBuf,
    pool: Option<SqlitePool>,
}

impl AppState {
    pub fn new(path: PathBuf) -> Self {
        Self {
            status: SnapshotStatus::Opening,
            meta: None,
            counts: Vec::new(),
            recent: Vec::new(),
            last_refresh: std::time::Instant::now(),
            path,
            pool: None,
        }
    }

    /// Totals across sports.
    pub fn totals(&self) -> SportCounts {
        self.counts.iter().fold(
            SportCounts {
                sport: "Total".to_string(),
                ..SportCounts::default()
            },
            |mut acc, c| {
                acc.won += c.won;
                acc.lost += c.lost;
                acc.pending += c.pending;
                acc
            },
        )
    }

    pub async fn refresh(&mut self) {
        if self.pool.is_none() {
            // Read-only: the viewer must never create or migrate the snapshot.
            let opts = SqliteConnectOptions::new().filename(&self.path).read_only(true);
            match SqlitePool::connect_with(opts).await {
                Ok(pool) => self.pool = Some(pool),
                Err(e) => {
                    self.status = SnapshotStatus::Error(format!("{e}"));
                    return;
                }
            }
        }

        let Some(pool) = self.pool.clone() else {
            return;
        };
        if let Err(e) = self.load(&pool).await {
            self.status = SnapshotStatus::Error(format!("{e}"));
        }
    }

    pub async fn load(&mut self, pool: &SqlitePool) -> Result<(), sqlx::Error> {
        let meta: Option<MetaRow> = sqlx::query_as(
            "SELECT saved_at, row_count, first_day, last_day FROM snapshot_meta WHERE id = 1",
        )
        .fetch_optional(pool)
        .await?;

        let counts: Vec<SportCounts> = sqlx::query_as(
            r#"
            SELECT sport,
                   SUM(CASE WHEN status = 'Won' THEN 1 ELSE 0 END) AS won,
                   SUM(CASE WHEN status = 'Lost' THEN 1 ELSE 0 END) AS lost,
                   SUM(CASE WHEN status = 'Pending' THEN 1 ELSE 0 END) AS pending
            FROM records
            GROUP BY sport
            ORDER BY COUNT(*) DESC, sport
            "#,
        )
        .fetch_all(pool)
        .await?;

        let recent: Vec<RecentRow> = sqlx::query_as(
            r#"
            SELECT timestamp, sport, league, event, tip, odds, outcome_score, status
            FROM records
            ORDER BY timestamp DESC
            LIMIT ?
            "#,
        )
        .bind(RECENT_LIMIT)
        .fetch_all(pool)
        .await?;

        self.status = if meta.is_some() {
            SnapshotStatus::Loaded
        } else {
            SnapshotStatus::Empty
        };
        self.meta = meta;
        self.counts = counts;
        self.recent = recent;
        self.last_refresh = std::time::Instant::now();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

pub fn format_rate(rate: Option<f64>) -> String {
    rate.map_or("—".to_string(), |r| format!("{:.1}%", r * 100.0))
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
