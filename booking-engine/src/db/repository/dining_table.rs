//! Dining Table Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{DiningTable, DiningTableCreate, TableStatus};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::warn;

#[derive(Clone)]
pub struct DiningTableRepository {
    base: BaseRepository,
}

impl DiningTableRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            base: BaseRepository::new(pool),
        }
    }

    /// Find all active dining tables
    pub async fn find_all(&self) -> RepoResult<Vec<DiningTable>> {
        let mut conn = self.base.pool().acquire().await?;
        Self::fetch_all(&mut conn).await
    }

    /// Find all active tables in a room
    pub async fn find_by_room(&self, room_id: i64) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = sqlx::query_as(
            "SELECT * FROM dining_table WHERE room_id = ? AND is_active = 1 ORDER BY code",
        )
        .bind(room_id)
        .fetch_all(self.base.pool())
        .await?;
        Ok(tables)
    }

    /// Find table by id
    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<DiningTable>> {
        let table: Option<DiningTable> = sqlx::query_as("SELECT * FROM dining_table WHERE id = ?")
            .bind(id)
            .fetch_optional(self.base.pool())
            .await?;
        Ok(table)
    }

    /// Create a new dining table
    pub async fn create(&self, data: DiningTableCreate) -> RepoResult<DiningTable> {
        let candidate = DiningTable {
            id: 0,
            room_id: data.room_id,
            code: data.code.clone(),
            min_covers: data.min_covers,
            standard_covers: data.standard_covers,
            max_covers: data.max_covers,
            join_group: data.join_group.clone(),
            status: TableStatus::Available,
            is_active: true,
        };
        candidate.validate().map_err(RepoError::Validation)?;

        let existing: Option<DiningTable> =
            sqlx::query_as("SELECT * FROM dining_table WHERE room_id = ? AND code = ? LIMIT 1")
                .bind(data.room_id)
                .bind(&data.code)
                .fetch_optional(self.base.pool())
                .await?;
        if existing.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Table '{}' already exists in this room",
                data.code
            )));
        }

        let table: DiningTable = sqlx::query_as(
            "INSERT INTO dining_table
                 (room_id, code, min_covers, standard_covers, max_covers, join_group, status, is_active)
             VALUES (?, ?, ?, ?, ?, ?, 'available', 1)
             RETURNING *",
        )
        .bind(data.room_id)
        .bind(&data.code)
        .bind(data.min_covers)
        .bind(data.standard_covers)
        .bind(data.max_covers)
        .bind(&data.join_group)
        .fetch_one(self.base.pool())
        .await?;
        Ok(table)
    }

    /// Change a table's service status
    pub async fn set_status(&self, id: i64, status: TableStatus) -> RepoResult<bool> {
        let result = sqlx::query("UPDATE dining_table SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(self.base.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetch all active tables through an existing connection, dropping rows
    /// whose seating range fails validation (logged, never fatal)
    pub(crate) async fn fetch_all(conn: &mut SqliteConnection) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = sqlx::query_as(
            "SELECT * FROM dining_table WHERE is_active = 1 ORDER BY room_id, code",
        )
        .fetch_all(conn)
        .await?;

        let mut valid = Vec::with_capacity(tables.len());
        for table in tables {
            match table.validate() {
                Ok(()) => valid.push(table),
                Err(reason) => {
                    warn!(target: "config", table_id = table.id, %reason, "Dropping invalid table row");
                }
            }
        }
        Ok(valid)
    }
}
