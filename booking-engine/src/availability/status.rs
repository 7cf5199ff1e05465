//! Slot Status Determiner
//!
//! Combines resolved capacity and committed occupancy into a display status.
//! The status is advisory; the authoritative accept/reject decision happens
//! at commit time inside the storage transaction.

use serde::{Deserialize, Serialize};

use crate::core::VenueSettings;
use crate::db::models::DiningTable;

/// Fallback limited threshold when tables are disabled or no table has a
/// usable standard size
pub const DEFAULT_LIMITED_THRESHOLD: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Open,
    Limited,
    Full,
    Closed,
}

impl SlotStatus {
    pub fn is_bookable(&self) -> bool {
        matches!(self, SlotStatus::Open | SlotStatus::Limited)
    }
}

/// Label a slot from resolved capacity `capacity` and committed load `load`
///
/// - `closed` when outside service ranges or fully blocked
/// - `full` when no seat is left at all
/// - `limited` when remaining covers fall below `threshold`
pub fn determine(blocked: bool, capacity: u32, load: u32, threshold: u32) -> SlotStatus {
    if blocked {
        return SlotStatus::Closed;
    }
    if capacity == 0 || load >= capacity {
        return SlotStatus::Full;
    }
    if capacity - load < threshold {
        return SlotStatus::Limited;
    }
    SlotStatus::Open
}

/// Low-availability threshold for the venue
///
/// Configured value wins; otherwise the largest standard table size when
/// tables are enabled, or a small fixed constant when they are not.
pub fn low_availability_threshold(venue: &VenueSettings, tables: &[DiningTable]) -> u32 {
    if let Some(threshold) = venue.low_availability_threshold {
        return threshold;
    }
    if venue.use_tables {
        let largest_standard = tables
            .iter()
            .filter(|t| t.in_service())
            .map(|t| t.standard_covers.max(0) as u32)
            .max()
            .unwrap_or(0);
        if largest_standard > 0 {
            return largest_standard;
        }
    }
    DEFAULT_LIMITED_THRESHOLD
}
