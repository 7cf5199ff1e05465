//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Physical table service status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TableStatus {
    Available,
    OutOfService,
}

/// Dining table entity
///
/// Seating range invariant: `min_covers <= standard_covers <= max_covers`
/// (when the optional bounds are set), validated at row decode.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DiningTable {
    pub id: i64,
    pub room_id: i64,
    pub code: String,
    pub min_covers: i64,
    pub standard_covers: i64,
    pub max_covers: Option<i64>,
    /// Tables sharing a tag may be physically combined
    pub join_group: Option<String>,
    pub status: TableStatus,
    pub is_active: bool,
}

impl DiningTable {
    /// Effective capacity for assignment: max if set, else standard, else min
    pub fn effective_covers(&self) -> i64 {
        if let Some(max) = self.max_covers {
            max
        } else if self.standard_covers > 0 {
            self.standard_covers
        } else {
            self.min_covers
        }
    }

    /// Whether a party of `p` fits this single table's seating range
    pub fn seats(&self, p: u32) -> bool {
        let p = p as i64;
        self.min_covers <= p && p <= self.effective_covers()
    }

    /// Whether the table can take reservations at all
    pub fn in_service(&self) -> bool {
        self.is_active && self.status == TableStatus::Available
    }

    /// Seating range invariant check, used when decoding storage rows
    pub fn validate(&self) -> Result<(), String> {
        if self.min_covers < 1 {
            return Err(format!("Table '{}' min_covers must be >= 1", self.code));
        }
        if self.standard_covers > 0 && self.standard_covers < self.min_covers {
            return Err(format!(
                "Table '{}' standard_covers below min_covers",
                self.code
            ));
        }
        if let Some(max) = self.max_covers {
            if max < self.standard_covers.max(self.min_covers) {
                return Err(format!("Table '{}' max_covers below standard/min", self.code));
            }
        }
        Ok(())
    }
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub room_id: i64,
    pub code: String,
    pub min_covers: i64,
    pub standard_covers: i64,
    pub max_covers: Option<i64>,
    pub join_group: Option<String>,
}
