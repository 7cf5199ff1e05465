//! Closure Repository
//!
//! Reads are filtered to closures that can affect a given day: active rows
//! whose window overlaps the day, plus every active recurring rule (its
//! occurrences are expanded by the evaluator). Rows that fail to decode are
//! skipped one at a time so a single bad closure never takes down an
//! availability query.

use super::{BaseRepository, RepoResult};
use crate::db::models::{Closure, ClosureCreate, ClosureRow};
use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::warn;

#[derive(Clone)]
pub struct ClosureRepository {
    base: BaseRepository,
}

impl ClosureRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            base: BaseRepository::new(pool),
        }
    }

    /// Find all active closures that may affect `date`
    pub async fn find_for_day(&self, date: NaiveDate) -> RepoResult<Vec<Closure>> {
        let mut conn = self.base.pool().acquire().await?;
        Self::fetch_for_day(&mut conn, date).await
    }

    /// Create a new closure
    pub async fn create(&self, data: ClosureCreate) -> RepoResult<Closure> {
        let recurrence_blob = serde_json::to_string(&data.recurrence)
            .map_err(|e| super::RepoError::Validation(format!("Bad recurrence rule: {e}")))?;
        let row: ClosureRow = sqlx::query_as(
            "INSERT INTO closure
                 (scope, room_id, table_id, kind, starts_at, ends_at, recurrence, capacity_pct, is_active)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1)
             RETURNING *",
        )
        .bind(data.scope.as_str())
        .bind(data.room_id)
        .bind(data.table_id)
        .bind(data.kind.as_str())
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(recurrence_blob)
        .bind(data.capacity_pct.map(|p| p as i64))
        .fetch_one(self.base.pool())
        .await?;

        Closure::try_from(row).map_err(super::RepoError::Validation)
    }

    /// Soft delete a closure
    pub async fn deactivate(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("UPDATE closure SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(self.base.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetch day-relevant closures through an existing connection
    /// (transactional reads during reservation commit)
    pub(crate) async fn fetch_for_day(
        conn: &mut SqliteConnection,
        date: NaiveDate,
    ) -> RepoResult<Vec<Closure>> {
        let day_start = date.and_time(chrono::NaiveTime::MIN);
        let day_end = day_start + chrono::Duration::days(1);

        // Recurring rules always start at or before their occurrences, so
        // starts_at < day_end is enough to keep every candidate.
        let rows: Vec<ClosureRow> = sqlx::query_as(
            "SELECT * FROM closure
             WHERE is_active = 1
               AND starts_at < ?
               AND (ends_at > ? OR (recurrence IS NOT NULL AND recurrence != '' AND recurrence NOT LIKE '%\"none\"%'))",
        )
        .bind(day_end)
        .bind(day_start)
        .fetch_all(conn)
        .await?;

        let mut closures = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            match Closure::try_from(row) {
                Ok(closure) => closures.push(closure),
                Err(reason) => {
                    warn!(target: "config", closure_id = id, %reason, "Dropping undecodable closure row");
                }
            }
        }
        Ok(closures)
    }
}
