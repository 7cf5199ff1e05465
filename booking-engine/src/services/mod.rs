//! Engine services

pub mod availability_service;

pub use availability_service::{AvailabilityService, ReservationRequest};
