//! Database row types matching `migrations/0001_snapshot.sql`.

use chrono::NaiveDateTime;

use crate::error::AppError;
use crate::types::{parse_sport_str, parse_status_str, Record};

#[derive(Debug, sqlx::FromRow)]
pub struct RecordRow {
    pub timestamp: NaiveDateTime,
    pub sport: String,
    pub league: String,
    pub event: String,
    pub tip: String,
    pub odds: String,
    pub outcome_score: String,
    pub status: String,
}

impl TryFrom<RecordRow> for Record {
    type Error = AppError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let status = parse_status_str(&row.status).ok_or_else(|| {
            AppError::Snapshot(format!("unknown status {:?} stored at {}", row.status, row.timestamp))
        })?;
        Ok(Record {
            timestamp: row.timestamp,
            sport: parse_sport_str(&row.sport),
            league: row.league,
            event: row.event,
            tip: row.tip,
            odds: row.odds,
            outcome_score: row.outcome_score,
            status,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct SnapshotMetaRow {
    pub saved_at: NaiveDateTime,
    pub row_count: i64,
}
