//! Room Model

use serde::{Deserialize, Serialize};

/// Room entity (dining area: hall, terrace, private room)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Room {
    pub id: i64,
    pub name: String,
    /// Flat cover capacity, informational when table inventory is enabled
    pub capacity: i64,
    pub sort_order: i64,
    pub is_active: bool,
}

/// Create room payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomCreate {
    pub name: String,
    pub capacity: Option<i64>,
    pub sort_order: Option<i64>,
}
