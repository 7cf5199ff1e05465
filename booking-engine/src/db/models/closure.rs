//! Closure Model
//!
//! A closure blocks booking entirely or reduces capacity during a time
//! window, at venue, room, or table scope. Recurrence rules are stored as a
//! tagged JSON blob and decoded once when the row is loaded, never re-parsed
//! per query.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Scope a closure applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosureScope {
    Venue,
    Room,
    Table,
}

impl ClosureScope {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "venue" => Some(Self::Venue),
            "room" => Some(Self::Room),
            "table" => Some(Self::Table),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Venue => "venue",
            Self::Room => "room",
            Self::Table => "table",
        }
    }
}

/// Full block vs capacity reduction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosureKind {
    Full,
    Reduced,
}

impl ClosureKind {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "full" => Some(Self::Full),
            "reduced" => Some(Self::Reduced),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Reduced => "reduced",
        }
    }
}

/// Recurrence rule, decoded once at load time
///
/// `weekday` is 0-based from Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recurrence {
    #[default]
    None,
    Daily {
        interval_days: u32,
    },
    Weekly {
        weekday: u8,
        interval_weeks: u32,
    },
    Monthly {
        day_of_month: u32,
    },
}

impl Recurrence {
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::None)
    }
}

/// Closure entity with invariants already enforced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Closure {
    pub id: i64,
    pub scope: ClosureScope,
    pub room_id: Option<i64>,
    pub table_id: Option<i64>,
    pub kind: ClosureKind,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub recurrence: Recurrence,
    /// Remaining-capacity percentage for `Reduced` closures (0-100)
    pub capacity_pct: Option<u32>,
    pub is_active: bool,
}

/// Raw closure row as stored; converted to [`Closure`] one row at a time so
/// a single bad row degrades gracefully instead of failing the whole query
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClosureRow {
    pub id: i64,
    pub scope: String,
    pub room_id: Option<i64>,
    pub table_id: Option<i64>,
    pub kind: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub recurrence: Option<String>,
    pub capacity_pct: Option<i64>,
    pub is_active: bool,
}

impl TryFrom<ClosureRow> for Closure {
    type Error = String;

    fn try_from(row: ClosureRow) -> Result<Self, Self::Error> {
        let scope = ClosureScope::parse(&row.scope)
            .ok_or_else(|| format!("closure {} has unknown scope '{}'", row.id, row.scope))?;
        let kind = ClosureKind::parse(&row.kind)
            .ok_or_else(|| format!("closure {} has unknown kind '{}'", row.id, row.kind))?;

        if row.starts_at >= row.ends_at {
            return Err(format!("closure {} has start >= end", row.id));
        }
        match scope {
            ClosureScope::Room if row.room_id.is_none() => {
                return Err(format!("room-scoped closure {} lacks a room reference", row.id));
            }
            ClosureScope::Table if row.table_id.is_none() => {
                return Err(format!(
                    "table-scoped closure {} lacks a table reference",
                    row.id
                ));
            }
            _ => {}
        }

        let recurrence = match row.recurrence.as_deref() {
            None | Some("") => Recurrence::None,
            Some(blob) => serde_json::from_str(blob)
                .map_err(|e| format!("closure {} has an undecodable recurrence rule: {}", row.id, e))?,
        };
        match recurrence {
            Recurrence::Weekly { weekday, .. } if weekday > 6 => {
                return Err(format!(
                    "closure {} has weekday {} out of range",
                    row.id, weekday
                ));
            }
            Recurrence::Monthly { day_of_month } if !(1..=31).contains(&day_of_month) => {
                return Err(format!(
                    "closure {} has day_of_month {} out of range",
                    row.id, day_of_month
                ));
            }
            _ => {}
        }

        let capacity_pct = match row.capacity_pct {
            None => None,
            Some(pct) if (0..=100).contains(&pct) => Some(pct as u32),
            Some(pct) => {
                return Err(format!("closure {} capacity_pct {} out of range", row.id, pct));
            }
        };
        if kind == ClosureKind::Reduced && capacity_pct.is_none() {
            return Err(format!("reduction closure {} lacks capacity_pct", row.id));
        }

        Ok(Closure {
            id: row.id,
            scope,
            room_id: row.room_id,
            table_id: row.table_id,
            kind,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            recurrence,
            capacity_pct,
            is_active: row.is_active,
        })
    }
}

/// Create closure payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosureCreate {
    pub scope: ClosureScope,
    pub room_id: Option<i64>,
    pub table_id: Option<i64>,
    pub kind: ClosureKind,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    #[serde(default)]
    pub recurrence: Recurrence,
    pub capacity_pct: Option<u32>,
}
