//! Tick inputs and results.
//!
//! A tick never fails. Anything that prevents fuel from being consumed is
//! reported as [`TickOutcome::Unchanged`] with the reason, and the vehicle's
//! in-memory state is left exactly as it was (apart from degradation
//! bookkeeping on stationary ticks, which runs on its own clock).

use crate::event::{EventKind, FuelEvent, SideEffect};
use crate::id::VehicleId;
use crate::math::Vec3;

// ---------------------------------------------------------------------------
// Tick input
// ---------------------------------------------------------------------------

/// One host sample of a driven vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSample {
    pub vehicle: VehicleId,
    pub position: Vec3,
    /// Seconds on a monotonic clock.
    pub timestamp: f64,
    pub engine_on: bool,
}

// ---------------------------------------------------------------------------
// Tick result
// ---------------------------------------------------------------------------

/// Why a tick consumed no fuel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnchangedReason {
    /// The vehicle is not registered.
    Unknown,
    /// The vehicle is registered but tracking was never started.
    NotTracking,
    /// Elapsed time since the last sample was zero or negative.
    StaleTick,
    /// The vehicle did not move.
    Stationary,
    /// The new fuel level could not be persisted; retried next tick.
    PersistenceFailure,
}

/// What a tick did to the fuel level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Unchanged(UnchangedReason),
    /// Fuel was consumed; `fuel` is the new (rounded) level.
    Consumed { consumed: f64, fuel: f64 },
    /// The tank ran dry on this tick and the engine was forced off.
    Stalled,
}

/// Full result of one tick for one vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    pub outcome: TickOutcome,
    pub events: Vec<FuelEvent>,
    pub effects: Vec<SideEffect>,
}

impl TickResult {
    pub fn unchanged(reason: UnchangedReason) -> Self {
        Self {
            outcome: TickOutcome::Unchanged(reason),
            events: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// The reason no fuel was consumed, if none was.
    pub fn unchanged_reason(&self) -> Option<UnchangedReason> {
        match self.outcome {
            TickOutcome::Unchanged(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn is_stalled(&self) -> bool {
        self.outcome == TickOutcome::Stalled
    }

    /// Number of emitted events of one kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }
}

// ---------------------------------------------------------------------------
// Engine toggle result
// ---------------------------------------------------------------------------

/// A successful engine switch.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineToggled {
    /// The engine state after the switch.
    pub engine_on: bool,
    pub effects: Vec<SideEffect>,
}
