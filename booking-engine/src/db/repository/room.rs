//! Room Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Room, RoomCreate};
use sqlx::{SqliteConnection, SqlitePool};

#[derive(Clone)]
pub struct RoomRepository {
    base: BaseRepository,
}

impl RoomRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            base: BaseRepository::new(pool),
        }
    }

    /// Find all active rooms in display order
    pub async fn find_all(&self) -> RepoResult<Vec<Room>> {
        let mut conn = self.base.pool().acquire().await?;
        Self::fetch_all(&mut conn).await
    }

    /// Find room by id
    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Room>> {
        let room: Option<Room> = sqlx::query_as("SELECT * FROM room WHERE id = ?")
            .bind(id)
            .fetch_optional(self.base.pool())
            .await?;
        Ok(room)
    }

    /// Create a new room
    pub async fn create(&self, data: RoomCreate) -> RepoResult<Room> {
        let existing: Option<Room> = sqlx::query_as("SELECT * FROM room WHERE name = ?")
            .bind(&data.name)
            .fetch_optional(self.base.pool())
            .await?;
        if existing.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Room '{}' already exists",
                data.name
            )));
        }

        let room: Room = sqlx::query_as(
            "INSERT INTO room (name, capacity, sort_order, is_active)
             VALUES (?, ?, ?, 1)
             RETURNING *",
        )
        .bind(&data.name)
        .bind(data.capacity.unwrap_or(0))
        .bind(data.sort_order.unwrap_or(0))
        .fetch_one(self.base.pool())
        .await?;
        Ok(room)
    }

    /// Soft delete a room
    pub async fn deactivate(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("UPDATE room SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(self.base.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetch all active rooms through an existing connection (transactional
    /// reads during reservation commit)
    pub(crate) async fn fetch_all(conn: &mut SqliteConnection) -> RepoResult<Vec<Room>> {
        let rooms: Vec<Room> =
            sqlx::query_as("SELECT * FROM room WHERE is_active = 1 ORDER BY sort_order, name")
                .fetch_all(conn)
                .await?;
        Ok(rooms)
    }
}
