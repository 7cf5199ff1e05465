//! Slot Payload Builder
//!
//! Pure assembly of the public slot shape. Nothing is re-derived here.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::Serialize;

use super::status::SlotStatus;
use super::suggest::Suggestion;

/// A single bookable time point as presented to the booking workflow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    pub time: NaiveTime,
    pub status: SlotStatus,
    pub remaining_capacity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_tables: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
}

pub fn build_slot(
    time: NaiveTime,
    status: SlotStatus,
    capacity: u32,
    load: u32,
    suggestion: Option<&Suggestion>,
    price: Option<Decimal>,
) -> Slot {
    let remaining_capacity = if status == SlotStatus::Closed {
        0
    } else {
        capacity.saturating_sub(load)
    };
    Slot {
        time,
        status,
        remaining_capacity,
        suggested_tables: suggestion.map(Suggestion::table_ids),
        price,
    }
}
