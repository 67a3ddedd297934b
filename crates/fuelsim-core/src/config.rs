//! Simulation tuning parameters and host-adapter settings.

use serde::{Deserialize, Serialize};

/// Tunables for the fuel state machine. Every field has a default, so a
/// config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Speed sensitivity divisor: `rate * (1 + speed / sensitivity)`.
    pub sensitivity: f64,
    /// Seconds of timer time per engine-health decrement while the tanked
    /// fuel does not match the required type.
    pub degrade_interval_secs: f64,
    /// Engine health lost per degradation interval.
    pub health_decrement: f64,
    /// Engine health regained per tick once the correct fuel is tanked.
    pub health_regen: f64,
    /// Upper bound of engine health.
    pub max_health: f64,
    /// When a refill names no fuel type, assume the correct type was used.
    pub refill_resets_tanked_type: bool,
    /// Capacity of the simulation's event log ring buffer.
    pub event_log_capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sensitivity: 100.0,
            degrade_interval_secs: 1.0,
            health_decrement: 25.0,
            health_regen: 5.0,
            max_health: 1000.0,
            refill_resets_tanked_type: false,
            event_log_capacity: 256,
        }
    }
}

/// Settings for the host adapter that drives the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Period of the host scheduler that calls `on_interval`.
    pub tick_interval_ms: u64,
    /// How far a player may be from a vehicle for a nearby refill.
    pub refill_radius: f64,
    /// Push the fuel percentage to the driver's HUD after each change.
    pub push_hud: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            refill_radius: 5.0,
            push_hud: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = SimConfig::default();
        assert_eq!(c.sensitivity, 100.0);
        assert_eq!(c.health_decrement, 25.0);
        assert_eq!(c.max_health, 1000.0);
        assert!(!c.refill_resets_tanked_type);
    }

    #[test]
    fn service_defaults() {
        let c = ServiceConfig::default();
        assert_eq!(c.tick_interval_ms, 1000);
        assert_eq!(c.refill_radius, 5.0);
        assert!(c.push_hud);
    }
}
