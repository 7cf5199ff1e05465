//! Capacity Resolver
//!
//! Computes the theoretical maximum concurrent covers for a slot, either
//! from the flat parallel-booking limit (tables disabled) or from table
//! inventory, then applies closure overrides. Results are floored so scaled
//! capacity is never overcounted.

use chrono::NaiveDateTime;

use super::closure::ClosureEvaluator;
use crate::core::{MealDefinition, VenueSettings};
use crate::db::models::DiningTable;

pub struct CapacityResolver<'a> {
    venue: &'a VenueSettings,
    closures: &'a ClosureEvaluator,
}

impl<'a> CapacityResolver<'a> {
    pub fn new(venue: &'a VenueSettings, closures: &'a ClosureEvaluator) -> Self {
        Self { venue, closures }
    }

    /// Resolve slot capacity for the configured mode
    pub fn resolve(
        &self,
        meal: &MealDefinition,
        tables: &[DiningTable],
        instant: NaiveDateTime,
    ) -> u32 {
        if self.venue.use_tables {
            self.resolve_tables(tables, instant)
        } else {
            self.resolve_flat(meal, instant)
        }
    }

    /// Flat mode: per-meal parallel limit scaled by venue-scope reductions
    pub fn resolve_flat(&self, meal: &MealDefinition, instant: NaiveDateTime) -> u32 {
        let base = meal.flat_capacity(self.venue);
        let multiplier = self.closures.capacity_multiplier(None, None, instant);
        scale(base as i64, multiplier)
    }

    /// Table mode: sum of effective capacities of in-service tables, each
    /// scaled by its own worst applicable reduction; blocked tables (or
    /// tables in fully blocked rooms) contribute zero
    pub fn resolve_tables(&self, tables: &[DiningTable], instant: NaiveDateTime) -> u32 {
        tables
            .iter()
            .filter(|t| t.in_service())
            .map(|t| {
                if self
                    .closures
                    .is_blocked(Some(t.room_id), Some(t.id), instant)
                {
                    return 0;
                }
                let multiplier =
                    self.closures
                        .capacity_multiplier(Some(t.room_id), Some(t.id), instant);
                scale(t.effective_covers(), multiplier)
            })
            .sum()
    }
}

fn scale(base: i64, multiplier: f64) -> u32 {
    if base <= 0 {
        return 0;
    }
    (base as f64 * multiplier).floor().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::schedule::WeekSchedule;
    use crate::db::models::{ClosureKind, ClosureScope, Recurrence, TableStatus};
    use chrono::NaiveDate;

    fn dt(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 9, 4)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn meal(max_parallel: u32) -> MealDefinition {
        MealDefinition {
            key: "dinner".to_string(),
            label: "Dinner".to_string(),
            schedule: WeekSchedule::parse("fri: 19:00-23:00"),
            slot_interval_min: 15,
            turnover_min: 120,
            buffer_before_min: 15,
            max_parallel,
            capacity_override: None,
            price: None,
            is_default: true,
        }
    }

    fn table(id: i64, room_id: i64, max: i64) -> DiningTable {
        DiningTable {
            id,
            room_id,
            code: format!("T{id}"),
            min_covers: 1,
            standard_covers: 2,
            max_covers: Some(max),
            join_group: None,
            status: TableStatus::Available,
            is_active: true,
        }
    }

    fn reduction(scope: ClosureScope, room_id: Option<i64>, table_id: Option<i64>, pct: u32) -> crate::db::models::Closure {
        crate::db::models::Closure {
            id: 1,
            scope,
            room_id,
            table_id,
            kind: ClosureKind::Reduced,
            starts_at: dt(0),
            ends_at: dt(23),
            recurrence: Recurrence::None,
            capacity_pct: Some(pct),
            is_active: true,
        }
    }

    #[test]
    fn flat_mode_uses_meal_limit_and_multiplier() {
        let venue = VenueSettings::default();
        let none = ClosureEvaluator::new(vec![]);
        let resolver = CapacityResolver::new(&venue, &none);
        assert_eq!(resolver.resolve(&meal(9), &[], dt(20)), 9);

        let halved = ClosureEvaluator::new(vec![reduction(ClosureScope::Venue, None, None, 50)]);
        let resolver = CapacityResolver::new(&venue, &halved);
        // floor(9 * 0.5)
        assert_eq!(resolver.resolve(&meal(9), &[], dt(20)), 4);
    }

    #[test]
    fn table_mode_sums_effective_covers() {
        let venue = VenueSettings {
            use_tables: true,
            ..VenueSettings::default()
        };
        let none = ClosureEvaluator::new(vec![]);
        let resolver = CapacityResolver::new(&venue, &none);
        let tables = vec![table(1, 1, 4), table(2, 1, 4)];
        assert_eq!(resolver.resolve(&meal(0), &tables, dt(20)), 8);
    }

    #[test]
    fn out_of_service_and_blocked_tables_contribute_zero() {
        let venue = VenueSettings {
            use_tables: true,
            ..VenueSettings::default()
        };
        let mut oos = table(1, 1, 4);
        oos.status = TableStatus::OutOfService;
        let tables = vec![oos, table(2, 1, 4)];

        let none = ClosureEvaluator::new(vec![]);
        let resolver = CapacityResolver::new(&venue, &none);
        assert_eq!(resolver.resolve_tables(&tables, dt(20)), 4);

        let blocked = ClosureEvaluator::new(vec![crate::db::models::Closure {
            id: 9,
            scope: ClosureScope::Table,
            room_id: None,
            table_id: Some(2),
            kind: ClosureKind::Full,
            starts_at: dt(0),
            ends_at: dt(23),
            recurrence: Recurrence::None,
            capacity_pct: None,
            is_active: true,
        }]);
        let resolver = CapacityResolver::new(&venue, &blocked);
        assert_eq!(resolver.resolve_tables(&tables, dt(20)), 0);
    }

    #[test]
    fn room_reduction_floors_each_table() {
        let venue = VenueSettings {
            use_tables: true,
            ..VenueSettings::default()
        };
        let halved = ClosureEvaluator::new(vec![reduction(ClosureScope::Room, Some(1), None, 50)]);
        let resolver = CapacityResolver::new(&venue, &halved);
        // Two 5-seat tables in room 1: floor(5*0.5) each
        let tables = vec![table(1, 1, 5), table(2, 1, 5), table(3, 2, 5)];
        assert_eq!(resolver.resolve_tables(&tables, dt(20)), 2 + 2 + 5);
    }
}
