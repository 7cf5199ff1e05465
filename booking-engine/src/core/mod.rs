//! Core module - engine configuration
//!
//! - [`EngineConfig`] - injected venue + meal configuration
//! - [`VenueSettings`] - venue-wide switches and defaults
//! - [`MealDefinition`] - per-meal schedule and capacity rules

pub mod config;

pub use config::{EngineConfig, MealDefinition, VenueSettings};
