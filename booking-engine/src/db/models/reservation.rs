//! Reservation Model
//!
//! Committed occupancy rows. The engine only reads non-cancelled
//! reservations to compute load, and writes a new row inside the commit
//! step of table assignment; all other lifecycle transitions are driven by
//! the external booking workflow.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Waitlist,
    Cancelled,
    NoShow,
    Visited,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Waitlist => "waitlist",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
            Self::Visited => "visited",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "waitlist" => Some(Self::Waitlist),
            "cancelled" => Some(Self::Cancelled),
            "no_show" => Some(Self::NoShow),
            "visited" => Some(Self::Visited),
            _ => None,
        }
    }

    /// Whether this reservation counts toward committed occupancy
    pub fn occupies(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// Reservation entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub status: ReservationStatus,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub party_size: i64,
    pub meal_key: String,
    pub room_id: Option<i64>,
    /// Assigned tables; joined parties carry every member table
    pub table_ids: Vec<i64>,
    pub customer_ref: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Reservation {
    pub fn occupies_table(&self, table_id: i64) -> bool {
        self.table_ids.contains(&table_id)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// Raw reservation row as stored
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReservationRow {
    pub id: String,
    pub status: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub party_size: i64,
    pub meal_key: String,
    pub room_id: Option<i64>,
    pub table_ids: String,
    pub customer_ref: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = String;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| format!("reservation id '{}' is not a uuid: {}", row.id, e))?;
        let status = ReservationStatus::parse(&row.status)
            .ok_or_else(|| format!("reservation {} has unknown status '{}'", row.id, row.status))?;
        let table_ids: Vec<i64> = serde_json::from_str(&row.table_ids)
            .map_err(|e| format!("reservation {} has bad table_ids: {}", row.id, e))?;
        Ok(Reservation {
            id,
            status,
            date: row.date,
            time: row.time,
            party_size: row.party_size,
            meal_key: row.meal_key,
            room_id: row.room_id,
            table_ids,
            customer_ref: row.customer_ref,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Create reservation payload (committed by the engine inside a transaction)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreate {
    pub status: ReservationStatus,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub party_size: i64,
    pub meal_key: String,
    pub room_id: Option<i64>,
    pub table_ids: Vec<i64>,
    pub customer_ref: String,
}
