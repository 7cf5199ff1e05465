//! Reservation Repository
//!
//! Reads committed occupancy and inserts new reservations. The insert path
//! is connection-based so the availability service can run re-validation and
//! insert inside one storage transaction.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Reservation, ReservationCreate, ReservationRow};
use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

#[derive(Clone)]
pub struct ReservationRepository {
    base: BaseRepository,
}

impl ReservationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            base: BaseRepository::new(pool),
        }
    }

    /// All non-cancelled reservations for a date
    pub async fn find_for_date(&self, date: NaiveDate) -> RepoResult<Vec<Reservation>> {
        let mut conn = self.base.pool().acquire().await?;
        Self::fetch_for_date(&mut conn, date).await
    }

    /// Find reservation by id
    pub async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Reservation>> {
        let row: Option<ReservationRow> = sqlx::query_as("SELECT * FROM reservation WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.base.pool())
            .await?;
        row.map(|r| Reservation::try_from(r).map_err(RepoError::Database))
            .transpose()
    }

    /// Fetch non-cancelled reservations for a date through an existing
    /// connection (transactional reads during commit)
    pub(crate) async fn fetch_for_date(
        conn: &mut SqliteConnection,
        date: NaiveDate,
    ) -> RepoResult<Vec<Reservation>> {
        let rows: Vec<ReservationRow> = sqlx::query_as(
            "SELECT * FROM reservation WHERE date = ? AND status != 'cancelled' ORDER BY time, id",
        )
        .bind(date)
        .fetch_all(conn)
        .await?;

        rows.into_iter()
            .map(|r| Reservation::try_from(r).map_err(RepoError::Database))
            .collect()
    }

    /// Insert a reservation through the caller's connection; the caller owns
    /// the enclosing transaction
    pub(crate) async fn insert(
        conn: &mut SqliteConnection,
        data: ReservationCreate,
    ) -> RepoResult<Reservation> {
        let now = chrono::Utc::now().naive_utc();
        let id = Uuid::new_v4();
        let table_ids_blob = serde_json::to_string(&data.table_ids)
            .map_err(|e| RepoError::Validation(format!("Bad table assignment: {e}")))?;

        let row: ReservationRow = sqlx::query_as(
            "INSERT INTO reservation
                 (id, status, date, time, party_size, meal_key, room_id, table_ids, customer_ref, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(id.to_string())
        .bind(data.status.as_str())
        .bind(data.date)
        .bind(data.time)
        .bind(data.party_size)
        .bind(&data.meal_key)
        .bind(data.room_id)
        .bind(table_ids_blob)
        .bind(&data.customer_ref)
        .bind(now)
        .bind(now)
        .fetch_one(conn)
        .await?;

        Reservation::try_from(row).map_err(RepoError::Database)
    }
}
