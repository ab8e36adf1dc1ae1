use std::path::Path;

use async_trait::async_trait;
use chrono::Local;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use tracing::{debug, info};

use crate::db::models::{RecordRow, SnapshotMetaRow};
use crate::error::{AppError, Result};
use crate::state::Dataset;
use crate::types::Record;

/// Durable home of the accumulated dataset. The reconciler is its only writer.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// `None` when no snapshot has been saved yet.
    async fn load(&self) -> Result<Option<Dataset>>;

    /// Replaces the stored snapshot with `dataset` as a whole.
    async fn save(&self, dataset: &Dataset) -> Result<()>;

    /// Copies whatever is stored aside, so a snapshot that failed to load is not lost
    /// when the next `save` replaces it.
    async fn backup(&self) -> Result<()>;
}

/// SQLite-backed snapshot. One writer process at a time is assumed.
pub struct SqliteSnapshotStore {
    pool: SqlitePool,
}

impl SqliteSnapshotStore {
    pub async fn open(path: &Path) -> Result<Self> {
        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opts).await?;
        let store = Self::from_pool(pool).await?;
        info!("Snapshot store ready at {}", path.display());
        Ok(store)
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn load(&self) -> Result<Option<Dataset>> {
        let meta: Option<SnapshotMetaRow> =
            sqlx::query_as("SELECT saved_at, row_count FROM snapshot_meta WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;
        let Some(meta) = meta else {
            return Ok(None);
        };

        let rows: Vec<RecordRow> = sqlx::query_as(
            r#"
            SELECT timestamp, sport, league, event, tip, odds, outcome_score, status
            FROM records
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        if rows.len() as i64 != meta.row_count {
            return Err(AppError::Snapshot(format!(
                "snapshot saved at {} lists {} rows, found {}",
                meta.saved_at,
                meta.row_count,
                rows.len()
            )));
        }

        let records = rows
            .into_iter()
            .map(Record::try_from)
            .collect::<Result<Vec<_>>>()?;
        debug!(rows = records.len(), saved_at = %meta.saved_at, "snapshot loaded");
        Ok(Some(Dataset::from_records(records)))
    }

    async fn save(&self, dataset: &Dataset) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM records").execute(&mut *tx).await?;
        for r in dataset.records() {
            sqlx::query(
                r#"
                INSERT INTO records (timestamp, sport, league, event, tip, odds, outcome_score, status)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(r.timestamp)
            .bind(r.sport.to_string())
            .bind(&r.league)
            .bind(&r.event)
            .bind(&r.tip)
            .bind(&r.odds)
            .bind(&r.outcome_score)
            .bind(r.status.to_string())
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO snapshot_meta (id, saved_at, row_count, first_day, last_day)
            VALUES (1, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                saved_at = excluded.saved_at,
                row_count = excluded.row_count,
                first_day = excluded.first_day,
                last_day = excluded.last_day
            "#,
        )
        .bind(Local::now().naive_local())
        .bind(dataset.len() as i64)
        .bind(dataset.first_day())
        .bind(dataset.last_day())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn backup(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DROP TABLE IF EXISTS records_unreadable")
            .execute(&mut *tx)
            .await?;
        sqlx::query("CREATE TABLE records_unreadable AS SELECT * FROM records")
            .execute(&mut *tx)
            .await?;
        let (kept,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM records_unreadable")
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        info!(rows = kept, "Unreadable snapshot copied to records_unreadable");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Sport, Status};
    use chrono::NaiveDate;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_store() -> SqliteSnapshotStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteSnapshotStore::from_pool(pool).await.unwrap()
    }

    fn rec(day: u32, hour: u32, score: &str, status: Status) -> Record {
        Record {
            timestamp: NaiveDate::from_ymd_opt(2020, 4, day)
                .unwrap()
                .and_hms_opt(hour, 30, 0)
                .unwrap(),
            sport: Sport::Tennis,
            league: "ATP Madrid".to_string(),
            event: "Nadal v Thiem".to_string(),
            tip: "Nadal -1.5 sets".to_string(),
            odds: "2.05".to_string(),
            outcome_score: score.to_string(),
            status,
        }
    }

    #[tokio::test]
    async fn fresh_store_has_no_snapshot() {
        let store = memory_store().await;
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = memory_store().await;
        let ds = Dataset::from_records(vec![
            rec(13, 18, "?", Status::Pending),
            rec(12, 9, "2-0", Status::Won),
            rec(12, 21, "1-2", Status::Lost),
        ]);
        store.save(&ds).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, ds);

        // Saving what was loaded changes nothing.
        store.save(&loaded).await.unwrap();
        assert_eq!(store.load().await.unwrap().unwrap(), ds);
    }

    #[tokio::test]
    async fn save_replaces_previous_snapshot() {
        let store = memory_store().await;
        store
            .save(&Dataset::from_records(vec![rec(12, 9, "2-0", Status::Won)]))
            .await
            .unwrap();
        let second = Dataset::from_records(vec![rec(20, 9, "0-1", Status::Lost)]);
        store.save(&second).await.unwrap();
        assert_eq!(store.load().await.unwrap().unwrap(), second);
    }

    #[tokio::test]
    async fn inconsistent_snapshot_is_kept_aside_before_replacement() {
        let store = memory_store().await;
        store
            .save(&Dataset::from_records(vec![
                rec(12, 9, "2-0", Status::Won),
                rec(12, 21, "1-2", Status::Lost),
            ]))
            .await
            .unwrap();
        sqlx::query("UPDATE snapshot_meta SET row_count = 5")
            .execute(&store.pool)
            .await
            .unwrap();
        assert!(matches!(store.load().await, Err(AppError::Snapshot(_))));

        store.backup().await.unwrap();
        let replacement = Dataset::from_records(vec![rec(20, 9, "0-1", Status::Lost)]);
        store.save(&replacement).await.unwrap();

        let (kept,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM records_unreadable")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(kept, 2);
        assert_eq!(store.load().await.unwrap().unwrap(), replacement);
    }

    #[tokio::test]
    async fn empty_snapshot_is_distinct_from_none() {
        let store = memory_store().await;
        store.save(&Dataset::new()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(Dataset::new()));
    }
}
