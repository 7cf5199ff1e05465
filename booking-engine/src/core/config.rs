//! Engine Configuration
//!
//! The configuration collaborator (external admin CRUD) loads these values
//! and injects them into the [`crate::services::AvailabilityService`] at
//! construction. The engine never reads ambient global state per query.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::availability::schedule::WeekSchedule;
use crate::common::{EngineError, EngineResult};

/// Venue-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueSettings {
    /// Whether physical table inventory drives capacity and assignment.
    /// When false, capacity is the flat per-meal parallel-party limit.
    pub use_tables: bool,
    /// Fallback parallel-party limit when a meal does not set its own
    pub default_parallel: u32,
    /// Remaining-covers threshold below which a slot is reported `limited`.
    /// When unset: the largest standard table size (tables enabled) or a
    /// small fixed constant (tables disabled).
    pub low_availability_threshold: Option<u32>,
}

impl Default for VenueSettings {
    fn default() -> Self {
        Self {
            use_tables: false,
            default_parallel: 10,
            low_availability_threshold: None,
        }
    }
}

/// A named service window (lunch, dinner) with its own schedule and rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealDefinition {
    pub key: String,
    pub label: String,
    /// Weekly service hours, decoded once at load time
    pub schedule: WeekSchedule,
    /// Minutes between bookable slot starts
    pub slot_interval_min: u32,
    /// Minutes a reservation is assumed to occupy its resource
    pub turnover_min: u32,
    /// Extra lead minutes required before an occupancy starts
    pub buffer_before_min: u32,
    /// Parallel-party limit used when tables are disabled (0 = venue default)
    pub max_parallel: u32,
    /// Overrides `max_parallel` entirely when set
    pub capacity_override: Option<u32>,
    /// Per-cover price surfaced on every slot of this meal
    pub price: Option<Decimal>,
    /// Exactly one meal must be the default
    pub is_default: bool,
}

impl MealDefinition {
    /// Flat parallel-party capacity before closure scaling
    pub fn flat_capacity(&self, venue: &VenueSettings) -> u32 {
        if let Some(cap) = self.capacity_override {
            return cap;
        }
        if self.max_parallel > 0 {
            self.max_parallel
        } else {
            venue.default_parallel
        }
    }
}

/// Full engine configuration, injected at service construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub venue: VenueSettings,
    pub meals: Vec<MealDefinition>,
}

impl EngineConfig {
    pub fn new(venue: VenueSettings, meals: Vec<MealDefinition>) -> EngineResult<Self> {
        let config = Self { venue, meals };
        config.validate()?;
        Ok(config)
    }

    /// Validate load-time invariants
    ///
    /// Exactly one default meal; unique keys; turnover covering at least one
    /// slot interval. Violations are configuration errors, caught here at
    /// the boundary rather than mid-query.
    pub fn validate(&self) -> EngineResult<()> {
        if self.meals.is_empty() {
            return Err(EngineError::Configuration(
                "At least one meal must be defined".to_string(),
            ));
        }
        let defaults = self.meals.iter().filter(|m| m.is_default).count();
        if defaults != 1 {
            return Err(EngineError::Configuration(format!(
                "Exactly one default meal required, found {}",
                defaults
            )));
        }
        for meal in &self.meals {
            if meal.key.trim().is_empty() {
                return Err(EngineError::Configuration(
                    "Meal key must not be empty".to_string(),
                ));
            }
            if self.meals.iter().filter(|m| m.key == meal.key).count() > 1 {
                return Err(EngineError::Configuration(format!(
                    "Duplicate meal key '{}'",
                    meal.key
                )));
            }
            if meal.slot_interval_min == 0 {
                return Err(EngineError::Configuration(format!(
                    "Meal '{}' has a zero slot interval",
                    meal.key
                )));
            }
            if meal.turnover_min < meal.slot_interval_min {
                return Err(EngineError::Configuration(format!(
                    "Meal '{}' turnover ({}min) must cover at least one slot interval ({}min)",
                    meal.key, meal.turnover_min, meal.slot_interval_min
                )));
            }
        }
        Ok(())
    }

    pub fn meal(&self, key: &str) -> Option<&MealDefinition> {
        self.meals.iter().find(|m| m.key == key)
    }

    pub fn default_meal(&self) -> Option<&MealDefinition> {
        self.meals.iter().find(|m| m.is_default)
    }

    /// Resolve a requested meal key
    ///
    /// An empty key falls back to the default meal; an unknown non-empty key
    /// is a caller error, never silently defaulted.
    pub fn resolve_meal(&self, key: &str) -> EngineResult<&MealDefinition> {
        let key = key.trim();
        if key.is_empty() {
            return self.default_meal().ok_or_else(|| {
                EngineError::Configuration("No default meal configured".to_string())
            });
        }
        self.meal(key)
            .ok_or_else(|| EngineError::InvalidInput(format!("Unknown meal '{}'", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal(key: &str, is_default: bool) -> MealDefinition {
        MealDefinition {
            key: key.to_string(),
            label: key.to_string(),
            schedule: WeekSchedule::parse("mon: 19:00-23:00"),
            slot_interval_min: 15,
            turnover_min: 120,
            buffer_before_min: 15,
            max_parallel: 8,
            capacity_override: None,
            price: None,
            is_default,
        }
    }

    #[test]
    fn requires_exactly_one_default_meal() {
        assert!(EngineConfig::new(VenueSettings::default(), vec![meal("dinner", true)]).is_ok());
        assert!(
            EngineConfig::new(
                VenueSettings::default(),
                vec![meal("lunch", false), meal("dinner", false)]
            )
            .is_err()
        );
        assert!(
            EngineConfig::new(
                VenueSettings::default(),
                vec![meal("lunch", true), meal("dinner", true)]
            )
            .is_err()
        );
    }

    #[test]
    fn rejects_duplicate_keys_and_short_turnover() {
        let err = EngineConfig::new(
            VenueSettings::default(),
            vec![meal("dinner", true), meal("dinner", false)],
        );
        assert!(err.is_err());

        let mut short = meal("dinner", true);
        short.turnover_min = 10;
        assert!(EngineConfig::new(VenueSettings::default(), vec![short]).is_err());
    }

    #[test]
    fn empty_key_resolves_to_default() {
        let config = EngineConfig::new(
            VenueSettings::default(),
            vec![meal("lunch", false), meal("dinner", true)],
        )
        .unwrap();
        assert_eq!(config.resolve_meal("").unwrap().key, "dinner");
        assert_eq!(config.resolve_meal("lunch").unwrap().key, "lunch");
        assert!(matches!(
            config.resolve_meal("brunch"),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn flat_capacity_fallback_chain() {
        let venue = VenueSettings {
            default_parallel: 12,
            ..VenueSettings::default()
        };
        let mut m = meal("dinner", true);
        assert_eq!(m.flat_capacity(&venue), 8);
        m.max_parallel = 0;
        assert_eq!(m.flat_capacity(&venue), 12);
        m.capacity_override = Some(3);
        assert_eq!(m.flat_capacity(&venue), 3);
    }
}
