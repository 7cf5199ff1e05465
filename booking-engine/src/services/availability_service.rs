//! Availability Service
//!
//! Orchestrates the availability pipeline per request and commits new
//! reservations. Slot queries are read-only and freely parallel; the commit
//! path re-validates the targeted slot inside a `BEGIN IMMEDIATE` storage
//! transaction so two concurrent commits can never both succeed past
//! capacity, even across processes sharing the database file.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::SqliteConnection;
use tracing::{debug, info, warn};

use crate::availability::capacity::CapacityResolver;
use crate::availability::closure::ClosureEvaluator;
use crate::availability::occupancy;
use crate::availability::payload::{self, Slot};
use crate::availability::status;
use crate::availability::suggest::{self, Suggestion};
use crate::common::{EngineError, EngineResult};
use crate::core::{EngineConfig, MealDefinition};
use crate::db::DbService;
use crate::db::models::{
    Closure, DiningTable, Reservation, ReservationCreate, ReservationStatus, Room,
};
use crate::db::repository::{
    ClosureRepository, DiningTableRepository, ReservationRepository, RoomRepository,
};

/// Commit request for a single targeted slot
#[derive(Debug, Clone)]
pub struct ReservationRequest {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub party_size: u32,
    pub meal_key: String,
    pub customer_ref: String,
}

/// The availability & table-assignment engine
#[derive(Clone)]
pub struct AvailabilityService {
    config: Arc<EngineConfig>,
    db: DbService,
    rooms: RoomRepository,
    tables: DiningTableRepository,
    closures: ClosureRepository,
    reservations: ReservationRepository,
}

/// Day state loaded from storage for one evaluation pass
struct DaySnapshot {
    tables: Vec<DiningTable>,
    evaluator: ClosureEvaluator,
    reservations: Vec<Reservation>,
    threshold: u32,
}

impl AvailabilityService {
    pub fn new(db: DbService, config: Arc<EngineConfig>) -> Self {
        let pool = db.pool.clone();
        Self {
            config,
            db,
            rooms: RoomRepository::new(pool.clone()),
            tables: DiningTableRepository::new(pool.clone()),
            closures: ClosureRepository::new(pool.clone()),
            reservations: ReservationRepository::new(pool),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute the bookable slot list for a date, party size, and meal
    ///
    /// A weekday without service yields an empty list, never an error.
    pub async fn query_slots(
        &self,
        date: NaiveDate,
        party_size: u32,
        meal_key: &str,
    ) -> EngineResult<Vec<Slot>> {
        if party_size == 0 {
            return Err(EngineError::InvalidInput(
                "Party size must be at least 1".to_string(),
            ));
        }
        let meal = self.config.resolve_meal(meal_key)?;
        let ranges = meal.schedule.ranges_for(date);
        if ranges.is_empty() {
            return Ok(Vec::new());
        }

        let rooms = self.rooms.find_all().await?;
        let tables = self.tables.find_all().await?;
        let closures = self.closures.find_for_day(date).await?;
        let reservations = self.reservations.find_for_date(date).await?;
        let snapshot = self.snapshot(rooms, tables, closures, reservations);

        let mut slots = Vec::new();
        for range in ranges {
            for time in range.slot_times(meal.slot_interval_min) {
                slots.push(self.evaluate_slot(&snapshot, meal, date, time, party_size));
            }
        }

        debug!(
            %date,
            meal = meal.key,
            party_size,
            slots = slots.len(),
            "Availability query evaluated"
        );
        Ok(slots)
    }

    /// Commit a reservation for a single slot
    ///
    /// Re-validates capacity and (when tables are enabled) re-runs the table
    /// suggester inside the same storage transaction that inserts the row.
    /// A slot that filled up since it was queried yields
    /// [`EngineError::Conflict`] so the caller can prompt for another slot;
    /// the engine never retries on its own.
    pub async fn commit_reservation(
        &self,
        request: ReservationRequest,
    ) -> EngineResult<Reservation> {
        if request.party_size == 0 {
            return Err(EngineError::InvalidInput(
                "Party size must be at least 1".to_string(),
            ));
        }
        let meal = self.config.resolve_meal(&request.meal_key)?;

        // The targeted time must be one of the meal's slot points that day
        let is_slot = meal
            .schedule
            .ranges_for(request.date)
            .iter()
            .any(|r| r.slot_times(meal.slot_interval_min).contains(&request.time));
        if !is_slot {
            return Err(EngineError::InvalidInput(format!(
                "{} is not a bookable {} slot on {}",
                request.time, meal.key, request.date
            )));
        }

        // Take the write lock up front: re-validation and insert form one
        // atomic unit against the backing store. The transaction rolls back
        // on drop, so a failed COMMIT or an abandoned in-flight commit never
        // returns a dirty connection (or the held write lock) to the pool.
        let mut tx = self
            .db
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| EngineError::Storage(format!("Failed to open transaction: {e}")))?;

        match self.commit_inner(&mut *tx, meal, &request).await {
            Ok(reservation) => {
                tx.commit()
                    .await
                    .map_err(|e| EngineError::Storage(format!("Commit failed: {e}")))?;
                info!(
                    reservation_id = %reservation.id,
                    date = %reservation.date,
                    time = %reservation.time,
                    party_size = reservation.party_size,
                    tables = ?reservation.table_ids,
                    "Reservation committed"
                );
                Ok(reservation)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed after commit error");
                }
                Err(err)
            }
        }
    }

    /// Re-validation and insert, executed inside the caller's transaction
    async fn commit_inner(
        &self,
        conn: &mut SqliteConnection,
        meal: &MealDefinition,
        request: &ReservationRequest,
    ) -> EngineResult<Reservation> {
        let rooms = RoomRepository::fetch_all(conn).await?;
        let tables = DiningTableRepository::fetch_all(conn).await?;
        let closures = ClosureRepository::fetch_for_day(conn, request.date).await?;
        let reservations = ReservationRepository::fetch_for_date(conn, request.date).await?;
        let snapshot = self.snapshot(rooms, tables, closures, reservations);

        let instant = request.date.and_time(request.time);
        if snapshot.evaluator.is_blocked(None, None, instant) {
            return Err(EngineError::Conflict("Slot is closed".to_string()));
        }

        let resolver = CapacityResolver::new(&self.config.venue, &snapshot.evaluator);
        let capacity = resolver.resolve(meal, &snapshot.tables, instant);
        let load = occupancy::committed_load(&snapshot.reservations, meal, instant);
        if load + request.party_size > capacity {
            return Err(EngineError::Conflict(format!(
                "Slot holds {} of {} covers, cannot seat {} more",
                load, capacity, request.party_size
            )));
        }

        let (room_id, table_ids) = if self.config.venue.use_tables {
            let candidates = self.candidate_tables(&snapshot, meal, instant);
            let suggestion = suggest::suggest_assignment(&candidates, request.party_size)
                .ok_or_else(|| {
                    EngineError::Conflict("No table assignment available".to_string())
                })?;
            let table_ids = suggestion.table_ids();
            let room_id = snapshot
                .tables
                .iter()
                .find(|t| Some(t.id) == table_ids.first().copied())
                .map(|t| t.room_id);
            (room_id, table_ids)
        } else {
            (None, Vec::new())
        };

        let created = ReservationRepository::insert(
            conn,
            ReservationCreate {
                status: ReservationStatus::Confirmed,
                date: request.date,
                time: request.time,
                party_size: request.party_size as i64,
                meal_key: meal.key.clone(),
                room_id,
                table_ids,
                customer_ref: request.customer_ref.clone(),
            },
        )
        .await?;
        Ok(created)
    }

    /// Assemble the per-day evaluation state, keeping only tables that sit
    /// in an active room
    fn snapshot(
        &self,
        rooms: Vec<Room>,
        tables: Vec<DiningTable>,
        closures: Vec<Closure>,
        reservations: Vec<Reservation>,
    ) -> DaySnapshot {
        let active_rooms: HashSet<i64> = rooms.iter().map(|r| r.id).collect();
        let tables: Vec<DiningTable> = tables
            .into_iter()
            .filter(|t| active_rooms.contains(&t.room_id))
            .collect();
        let threshold = status::low_availability_threshold(&self.config.venue, &tables);
        DaySnapshot {
            tables,
            evaluator: ClosureEvaluator::new(closures),
            reservations,
            threshold,
        }
    }

    fn evaluate_slot(
        &self,
        snapshot: &DaySnapshot,
        meal: &MealDefinition,
        date: NaiveDate,
        time: NaiveTime,
        party_size: u32,
    ) -> Slot {
        let instant = date.and_time(time);
        let venue_blocked = snapshot.evaluator.is_blocked(None, None, instant);
        let resolver = CapacityResolver::new(&self.config.venue, &snapshot.evaluator);
        let capacity = resolver.resolve(meal, &snapshot.tables, instant);
        let load = occupancy::committed_load(&snapshot.reservations, meal, instant);
        let slot_status = status::determine(venue_blocked, capacity, load, snapshot.threshold);

        let suggestion: Option<Suggestion> =
            if self.config.venue.use_tables && slot_status.is_bookable() {
                let candidates = self.candidate_tables(snapshot, meal, instant);
                suggest::suggest_assignment(&candidates, party_size)
            } else {
                None
            };

        payload::build_slot(
            time,
            slot_status,
            capacity,
            load,
            suggestion.as_ref(),
            meal.price,
        )
    }

    /// Tables eligible for assignment at `instant`: in service, not blocked
    /// by a closure, and not already committed for the window
    fn candidate_tables<'a>(
        &self,
        snapshot: &'a DaySnapshot,
        meal: &MealDefinition,
        instant: NaiveDateTime,
    ) -> Vec<&'a DiningTable> {
        snapshot
            .tables
            .iter()
            .filter(|t| t.in_service())
            .filter(|t| {
                !snapshot
                    .evaluator
                    .is_blocked(Some(t.room_id), Some(t.id), instant)
            })
            .filter(|t| {
                !occupancy::table_occupied(&snapshot.reservations, meal, instant, t.id)
            })
            .collect()
    }
}
