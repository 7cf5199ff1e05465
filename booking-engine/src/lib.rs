//! Booking Engine - restaurant availability & table assignment
//!
//! Given a date, a party size, and a meal, computes which time slots can
//! still accept a reservation, at what capacity, and (when physical tables
//! are modeled) which table or join-group combination should be offered.
//!
//! # Module structure
//!
//! ```text
//! booking-engine/src/
//! ├── core/          # injected configuration (venue settings, meals)
//! ├── availability/  # schedule, closures, capacity, occupancy, suggester
//! ├── services/      # availability service (query + transactional commit)
//! ├── db/            # SQLite pool, typed models, repositories
//! └── common/        # errors, logging
//! ```
//!
//! Notification dispatch, admin CRUD, payments, and every other outer
//! surface live in external collaborators; this crate only reads their
//! configuration/storage rows and exposes the slot-query and commit APIs.

pub mod availability;
pub mod common;
pub mod core;
pub mod db;
pub mod services;

// Re-export public types
pub use availability::{Slot, SlotStatus, Suggestion, TimeRange, WeekSchedule};
pub use common::{EngineError, EngineResult};
pub use core::{EngineConfig, MealDefinition, VenueSettings};
pub use db::DbService;
pub use db::models::{
    Closure, ClosureCreate, ClosureKind, ClosureScope, DiningTable, DiningTableCreate, Recurrence,
    Reservation, ReservationCreate, ReservationStatus, Room, RoomCreate, TableStatus,
};
pub use db::repository::{
    ClosureRepository, DiningTableRepository, ReservationRepository, RoomRepository,
};
pub use services::{AvailabilityService, ReservationRequest};

// Re-export logger functions
pub use common::logger::{init_logger, init_logger_with_file};
