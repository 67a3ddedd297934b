//! Fuel events, host side-effect requests, and the event log.
//!
//! The state machine never talks to the host directly. Each operation
//! returns two lists:
//!
//! - **Events** ([`FuelEvent`]): what happened, for observers (HUD, audio,
//!   analytics). Every event is also appended to the simulation's
//!   [`EventLog`] ring buffer.
//! - **Side effects** ([`SideEffect`]): what the host must do (switch an
//!   engine off, notify players, reset passenger client state).
//!
//! Event kinds can be suppressed on the log, which skips recording them.
//! Suppression never removes events from operation results.

use crate::fuel::FuelType;
use crate::id::{PlayerId, VehicleId};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Something that happened to a vehicle's fuel or engine state.
#[derive(Debug, Clone, PartialEq)]
pub enum FuelEvent {
    /// The tank ran dry while the engine was running.
    EngineStall { vehicle: VehicleId },
    /// Engine health reached zero from running on the wrong fuel.
    EngineBreakdown { vehicle: VehicleId },
    /// A fuel type mismatch was detected and the degradation timer started.
    MismatchStarted {
        vehicle: VehicleId,
        required: FuelType,
        tanked: FuelType,
    },
    /// The mismatch was resolved and the degradation timer cleared.
    MismatchCleared { vehicle: VehicleId },
    /// One degradation interval elapsed; `health` is the new engine health.
    EngineDegraded { vehicle: VehicleId, health: f64 },
    /// The tank was refilled to `fuel`.
    Refilled {
        vehicle: VehicleId,
        fuel: f64,
        tanked: FuelType,
    },
    /// A player switched the engine.
    EngineToggled {
        vehicle: VehicleId,
        on: bool,
        by: PlayerId,
    },
    /// Engine health was restored to full.
    EngineRepaired { vehicle: VehicleId },
}

/// Discriminant tag for event types, used for suppression and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    EngineStall,
    EngineBreakdown,
    MismatchStarted,
    MismatchCleared,
    EngineDegraded,
    Refilled,
    EngineToggled,
    EngineRepaired,
}

const EVENT_KIND_COUNT: usize = 8;

impl FuelEvent {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            FuelEvent::EngineStall { .. } => EventKind::EngineStall,
            FuelEvent::EngineBreakdown { .. } => EventKind::EngineBreakdown,
            FuelEvent::MismatchStarted { .. } => EventKind::MismatchStarted,
            FuelEvent::MismatchCleared { .. } => EventKind::MismatchCleared,
            FuelEvent::EngineDegraded { .. } => EventKind::EngineDegraded,
            FuelEvent::Refilled { .. } => EventKind::Refilled,
            FuelEvent::EngineToggled { .. } => EventKind::EngineToggled,
            FuelEvent::EngineRepaired { .. } => EventKind::EngineRepaired,
        }
    }

    /// The vehicle this event concerns.
    pub fn vehicle(&self) -> VehicleId {
        match *self {
            FuelEvent::EngineStall { vehicle }
            | FuelEvent::EngineBreakdown { vehicle }
            | FuelEvent::MismatchStarted { vehicle, .. }
            | FuelEvent::MismatchCleared { vehicle }
            | FuelEvent::EngineDegraded { vehicle, .. }
            | FuelEvent::Refilled { vehicle, .. }
            | FuelEvent::EngineToggled { vehicle, .. }
            | FuelEvent::EngineRepaired { vehicle } => vehicle,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// Notifications and side effects
// ---------------------------------------------------------------------------

/// Icon hint for a player-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationIcon {
    Info,
    Warning,
    Error,
}

/// A fire-and-forget message for one or more players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub icon: NotificationIcon,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(icon: NotificationIcon, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            icon,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Who should receive a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// Everyone currently inside the vehicle.
    Occupants(VehicleId),
    /// A single player.
    Player(PlayerId),
}

/// A request for the host to act.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Set the vehicle's engine flag.
    SetEngine { vehicle: VehicleId, on: bool },
    /// Passengers should drop speed/RPM-dependent client state.
    ResetPassengerClients { vehicle: VehicleId },
    /// Show a notification.
    Notify {
        recipient: Recipient,
        notification: Notification,
    },
}

// ---------------------------------------------------------------------------
// EventLog: pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A fixed-capacity ring buffer of fuel events. When full, the oldest events
/// are dropped.
#[derive(Debug)]
pub struct EventLog {
    events: Vec<Option<FuelEvent>>,
    /// Write position (wraps around).
    head: usize,
    len: usize,
    /// Total events ever written (including dropped).
    total_written: u64,
    suppressed: [bool; EVENT_KIND_COUNT],
}

impl EventLog {
    /// Create a new log with the given capacity. A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
            suppressed: [false; EVENT_KIND_COUNT],
        }
    }

    /// Stop recording events of this kind.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
    }

    /// Resume recording events of this kind.
    pub fn unsuppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = false;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Append an event unless its kind is suppressed.
    pub fn push(&mut self, event: FuelEvent) {
        if self.is_suppressed(event.kind()) {
            return;
        }
        let capacity = self.capacity();
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % capacity;
        if self.len < capacity {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total events written since creation (including dropped).
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Iterate over events from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &FuelEvent> + '_ {
        let capacity = self.capacity();
        let start = if self.len < capacity { 0 } else { self.head };
        (0..self.len).filter_map(move |i| self.events[(start + i) % capacity].as_ref())
    }

    /// Count logged events of one kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(256)
    }
}
