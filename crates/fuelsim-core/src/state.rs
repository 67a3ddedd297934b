//! Per-vehicle fuel state and the state-machine phase.

use serde::{Deserialize, Serialize};

use crate::fuel::{self, FuelSpec, FuelType};
use crate::id::ModelHash;
use crate::math::Vec3;
use crate::store::{FuelFields, VehicleFuelDocument};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where a vehicle sits in the fuel state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelPhase {
    /// Registered but not sampled yet (no driver since binding).
    Idle,
    /// Sampled each tick and consuming fuel.
    Tracking,
    /// Out of fuel; engine forced off until refilled.
    Stalled,
    /// Running on the wrong fuel; engine health draining.
    Degrading,
    /// Mismatch cleared; engine health regenerating.
    Repaired,
    /// Engine health hit zero; engine forced off until repaired.
    BrokenDown,
}

// ---------------------------------------------------------------------------
// Degradation timer
// ---------------------------------------------------------------------------

/// Fixed-interval timer driving engine-health loss during a fuel type
/// mismatch. Runs on its own clock, sampled by the tick driver, so its
/// cadence is independent of how often the vehicle moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegradationTimer {
    /// Timestamp the timer was last advanced to.
    pub last_sample: f64,
    /// Elapsed time not yet converted into a decrement.
    pub accumulated: f64,
    /// Decrements applied since the timer started.
    pub decrements: u32,
}

impl DegradationTimer {
    pub fn start(now: f64) -> Self {
        Self {
            last_sample: now,
            accumulated: 0.0,
            decrements: 0,
        }
    }

    /// Advance to `now` and return how many whole intervals elapsed.
    /// Non-monotonic samples are ignored.
    pub fn advance(&mut self, now: f64, interval: f64) -> u32 {
        let elapsed = now - self.last_sample;
        if elapsed <= 0.0 {
            return 0;
        }
        self.last_sample = now;
        self.accumulated += elapsed;
        if interval <= 0.0 {
            self.accumulated = 0.0;
            return 1;
        }
        let whole = (self.accumulated / interval).floor();
        self.accumulated -= whole * interval;
        whole as u32
    }
}

// ---------------------------------------------------------------------------
// Vehicle state
// ---------------------------------------------------------------------------

/// Everything the simulation knows about one bound vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleFuelState {
    pub model: ModelHash,
    pub last_position: Vec3,
    pub last_timestamp: f64,
    /// Always within `[0, max_fuel]`, rounded to 2 decimals.
    pub current_fuel: f64,
    pub consumption_rate: f64,
    pub max_fuel: f64,
    pub fuel_type: FuelType,
    pub tanked_type: FuelType,
    /// Always within `[0, max_health]`.
    pub engine_health: f64,
    pub engine_on: bool,
    /// Host-managed "engine disabled" flag.
    pub engine_locked: bool,
    pub phase: FuelPhase,
    /// Present exactly while a mismatch degradation is running.
    pub degradation: Option<DegradationTimer>,
}

impl VehicleFuelState {
    /// Build state for a freshly bound vehicle from its persisted document.
    pub fn from_document(model: ModelHash, doc: &VehicleFuelDocument, max_health: f64) -> Self {
        let fields = &doc.ascended_fuel;
        Self {
            model,
            last_position: Vec3::ZERO,
            last_timestamp: 0.0,
            current_fuel: fuel::round_fuel(doc.fuel.min(fields.max).max(0.0)),
            consumption_rate: fields.consumption,
            max_fuel: fields.max,
            fuel_type: fields.fuel_type,
            tanked_type: fields.type_tanked,
            engine_health: max_health,
            engine_on: false,
            engine_locked: false,
            phase: FuelPhase::Idle,
            degradation: None,
        }
    }

    /// Build state straight from a spec with a full tank.
    pub fn from_spec(model: ModelHash, spec: &FuelSpec, max_health: f64) -> Self {
        Self::from_document(model, &VehicleFuelDocument::from_spec(spec), max_health)
    }

    /// The persisted form of the current fuel fields.
    pub fn to_document(&self) -> VehicleFuelDocument {
        VehicleFuelDocument {
            fuel: self.current_fuel,
            ascended_fuel: FuelFields {
                consumption: self.consumption_rate,
                max: self.max_fuel,
                fuel_type: self.fuel_type,
                type_tanked: self.tanked_type,
            },
        }
    }

    /// True while a degradation timer is running.
    pub fn mismatch_active(&self) -> bool {
        self.degradation.is_some()
    }

    /// True when the tanked fuel differs from the required type.
    pub fn has_mismatch(&self) -> bool {
        self.tanked_type != self.fuel_type
    }

    pub fn fuel_percent(&self) -> f64 {
        fuel::percent(self.current_fuel, self.max_fuel)
    }

    pub fn is_empty(&self) -> bool {
        self.current_fuel <= 0.0
    }

    /// The phase a tracked vehicle settles into given its current fields.
    pub(crate) fn settled_phase(&self, max_health: f64) -> FuelPhase {
        if self.engine_health <= 0.0 {
            FuelPhase::BrokenDown
        } else if self.is_empty() {
            FuelPhase::Stalled
        } else if self.mismatch_active() {
            FuelPhase::Degrading
        } else if self.engine_health < max_health && !self.has_mismatch() {
            FuelPhase::Repaired
        } else {
            FuelPhase::Tracking
        }
    }
}
