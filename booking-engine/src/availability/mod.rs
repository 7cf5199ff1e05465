//! Availability engine collaborators
//!
//! The pipeline, leaf to root:
//!
//! 1. [`schedule`] - service-hours parsing
//! 2. [`closure`] - blocking and capacity-reduction evaluation
//! 3. [`capacity`] - theoretical concurrent covers per slot
//! 4. [`occupancy`] - committed reservation overlap
//! 5. [`status`] - open / limited / full / closed
//! 6. [`suggest`] - single-table and join-group assignment search
//! 7. [`payload`] - final slot assembly

pub mod capacity;
pub mod closure;
pub mod occupancy;
pub mod payload;
pub mod schedule;
pub mod status;
pub mod suggest;

pub use capacity::CapacityResolver;
pub use closure::ClosureEvaluator;
pub use occupancy::OccupancyScope;
pub use payload::Slot;
pub use schedule::{TimeRange, WeekSchedule};
pub use status::SlotStatus;
pub use suggest::{Suggestion, suggest_assignment};
