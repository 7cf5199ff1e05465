//! Database Models
//!
//! Typed row structs per entity. Storage rows are decoded into these at the
//! repository boundary; engine logic never inspects raw untyped rows.

// Location
pub mod dining_table;
pub mod room;

// Availability
pub mod closure;
pub mod reservation;

pub use closure::{Closure, ClosureCreate, ClosureKind, ClosureRow, ClosureScope, Recurrence};
pub use dining_table::{DiningTable, DiningTableCreate, TableStatus};
pub use reservation::{Reservation, ReservationCreate, ReservationRow, ReservationStatus};
pub use room::{Room, RoomCreate};
