//! Reservation Filter
//!
//! Selects existing reservations whose occupancy window overlaps a candidate
//! slot. A reservation occupies `[start - buffer, start + turnover]` on its
//! assigned resource; the slot under evaluation spans
//! `[slot_start, slot_start + turnover]`. The overlap catches both parties
//! still seated when the slot begins and parties arriving too soon after it.

use chrono::{Duration, NaiveDateTime};

use crate::core::MealDefinition;
use crate::db::models::Reservation;

/// Half-open occupancy interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Window {
    pub fn intersects(&self, other: &Window) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Occupancy window a reservation blocks on its resource
pub fn reservation_window(reservation: &Reservation, meal: &MealDefinition) -> Window {
    let start = reservation.start();
    Window {
        start: start - Duration::minutes(meal.buffer_before_min as i64),
        end: start + Duration::minutes(meal.turnover_min as i64),
    }
}

/// Window a candidate slot occupies
pub fn slot_window(slot_start: NaiveDateTime, meal: &MealDefinition) -> Window {
    Window {
        start: slot_start,
        end: slot_start + Duration::minutes(meal.turnover_min as i64),
    }
}

/// Resource scope the filter is evaluated against
#[derive(Debug, Clone, Copy)]
pub enum OccupancyScope {
    /// All reservations for the date count (tables disabled)
    Venue,
    /// Only reservations assigned to this exact table (any member of a
    /// join combination counts)
    Table(i64),
}

/// Reservations whose occupancy window intersects the candidate slot
pub fn overlapping<'a>(
    reservations: &'a [Reservation],
    meal: &MealDefinition,
    slot_start: NaiveDateTime,
    scope: OccupancyScope,
) -> Vec<&'a Reservation> {
    let slot = slot_window(slot_start, meal);
    reservations
        .iter()
        .filter(|r| r.status.occupies())
        .filter(|r| match scope {
            OccupancyScope::Venue => true,
            OccupancyScope::Table(table_id) => r.occupies_table(table_id),
        })
        .filter(|r| reservation_window(r, meal).intersects(&slot))
        .collect()
}

/// Committed party-size sum against the whole venue for a slot
pub fn committed_load(
    reservations: &[Reservation],
    meal: &MealDefinition,
    slot_start: NaiveDateTime,
) -> u32 {
    overlapping(reservations, meal, slot_start, OccupancyScope::Venue)
        .iter()
        .map(|r| r.party_size.max(0) as u32)
        .sum()
}

/// Whether a specific table is already taken for the slot window
pub fn table_occupied(
    reservations: &[Reservation],
    meal: &MealDefinition,
    slot_start: NaiveDateTime,
    table_id: i64,
) -> bool {
    !overlapping(reservations, meal, slot_start, OccupancyScope::Table(table_id)).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::schedule::WeekSchedule;
    use crate::db::models::ReservationStatus;
    use chrono::{NaiveDate, NaiveTime};
    use uuid::Uuid;

    fn meal() -> MealDefinition {
        MealDefinition {
            key: "dinner".to_string(),
            label: "Dinner".to_string(),
            schedule: WeekSchedule::parse("fri: 19:00-23:00"),
            slot_interval_min: 15,
            turnover_min: 120,
            buffer_before_min: 15,
            max_parallel: 8,
            capacity_override: None,
            price: None,
            is_default: true,
        }
    }

    fn reservation(h: u32, m: u32, party: i64, tables: Vec<i64>) -> Reservation {
        let date = NaiveDate::from_ymd_opt(2026, 9, 4).unwrap();
        Reservation {
            id: Uuid::new_v4(),
            status: ReservationStatus::Confirmed,
            date,
            time: NaiveTime::from_hms_opt(h, m, 0).unwrap(),
            party_size: party,
            meal_key: "dinner".to_string(),
            room_id: Some(1),
            table_ids: tables,
            customer_ref: "customer:1".to_string(),
            created_at: date.and_hms_opt(9, 0, 0).unwrap(),
            updated_at: date.and_hms_opt(9, 0, 0).unwrap(),
        }
    }

    fn slot(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 9, 4)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn reservation_occupies_buffer_plus_turnover() {
        let r = reservation(19, 30, 4, vec![]);
        let w = reservation_window(&r, &meal());
        assert_eq!(w.start, slot(19, 15));
        assert_eq!(w.end, slot(21, 30));
    }

    #[test]
    fn overlap_catches_seated_and_arriving_parties() {
        let reservations = vec![reservation(19, 30, 4, vec![])];
        let m = meal();
        // Slot window [21:15, 23:15) still intersects [19:15, 21:30)
        assert_eq!(committed_load(&reservations, &m, slot(21, 15)), 4);
        // [21:30, 23:30) no longer does
        assert_eq!(committed_load(&reservations, &m, slot(21, 30)), 0);
        // An earlier slot whose turnover runs into the reservation's buffer
        assert_eq!(committed_load(&reservations, &m, slot(17, 30)), 4);
        assert_eq!(committed_load(&reservations, &m, slot(17, 15)), 0);
    }

    #[test]
    fn cancelled_reservations_never_count() {
        let mut r = reservation(19, 30, 4, vec![]);
        r.status = ReservationStatus::Cancelled;
        assert_eq!(committed_load(&[r], &meal(), slot(19, 30)), 0);
    }

    #[test]
    fn table_scope_matches_any_member_of_a_join() {
        let reservations = vec![reservation(19, 30, 6, vec![3, 5])];
        let m = meal();
        assert!(table_occupied(&reservations, &m, slot(19, 30), 3));
        assert!(table_occupied(&reservations, &m, slot(19, 30), 5));
        assert!(!table_occupied(&reservations, &m, slot(19, 30), 4));
    }
}
