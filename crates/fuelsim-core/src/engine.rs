//! The fuel simulation: owns per-vehicle state and runs the state machine.
//!
//! # Tick pipeline
//!
//! Each [`FuelSimulation::tick`] for one vehicle runs:
//! 1. **Sample** -- reject stale samples (non-positive elapsed time).
//! 2. **Consume** -- distance and speed since the last sample drive fuel use:
//!    `consumed = distance * rate * (1 + speed / sensitivity)`.
//! 3. **Stall** -- an empty tank with a running engine forces it off once.
//! 4. **Degrade / regenerate** -- a fuel type mismatch drains engine health
//!    on a fixed interval; the correct fuel regenerates it.
//! 5. **Persist** -- the new fuel level is written to the document store.
//! 6. **Commit** -- only after a successful write is the in-memory state
//!    replaced and the events logged.
//!
//! The tick is computed on a copy of the vehicle state, so a failed write
//! leaves nothing half-applied and the next tick simply retries.

use std::collections::BTreeMap;

use crate::catalog::VehicleCatalog;
use crate::config::SimConfig;
use crate::error::FuelError;
use crate::event::{
    EventLog, FuelEvent, Notification, NotificationIcon, Recipient, SideEffect,
};
use crate::fuel::{self, FuelType};
use crate::id::{ModelHash, PlayerId, VehicleId};
use crate::math::Vec3;
use crate::sim::{EngineToggled, TickOutcome, TickResult, TickSample, UnchangedReason};
use crate::state::{DegradationTimer, FuelPhase, VehicleFuelState};
use crate::store::{DocumentStore, VehicleFuelDocument};

// ---------------------------------------------------------------------------
// FuelSimulation
// ---------------------------------------------------------------------------

/// Per-vehicle fuel simulation. Each instance owns its own tracking map, so
/// independent simulations can run side by side.
#[derive(Debug)]
pub struct FuelSimulation<S: DocumentStore> {
    pub(crate) config: SimConfig,
    pub(crate) catalog: VehicleCatalog,
    pub(crate) store: S,
    /// Ordered so iteration (and snapshots) are deterministic.
    pub(crate) vehicles: BTreeMap<VehicleId, VehicleFuelState>,
    pub(crate) events: EventLog,
}

impl<S: DocumentStore> FuelSimulation<S> {
    pub fn new(config: SimConfig, catalog: VehicleCatalog, store: S) -> Self {
        let events = EventLog::new(config.event_log_capacity);
        Self {
            config,
            catalog,
            store,
            vehicles: BTreeMap::new(),
            events,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn catalog(&self) -> &VehicleCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Bind a vehicle. Loads its persisted document, or creates one from the
    /// catalog defaults for its model. Calling again for a bound vehicle is
    /// a no-op.
    pub fn register(&mut self, vehicle: VehicleId, model: ModelHash) -> Result<(), FuelError> {
        if self.vehicles.contains_key(&vehicle) {
            return Ok(());
        }

        let doc = match self.store.load(vehicle)? {
            Some(doc) => doc,
            None => {
                if !self.catalog.contains(model) {
                    log::warn!(
                        "no fuel data for model {model}, storing defaults for {vehicle}"
                    );
                }
                let doc = VehicleFuelDocument::from_spec(&self.catalog.resolve(model));
                self.store.save(vehicle, &doc)?;
                doc
            }
        };

        let state = VehicleFuelState::from_document(model, &doc, self.config.max_health);
        log::info!(
            "registered {vehicle} ({}, {} / {}, {} per unit)",
            state.fuel_type,
            state.current_fuel,
            state.max_fuel,
            state.consumption_rate
        );
        self.vehicles.insert(vehicle, state);
        Ok(())
    }

    /// Forget a vehicle. Returns its last state, if it was bound.
    pub fn unregister(&mut self, vehicle: VehicleId) -> Option<VehicleFuelState> {
        self.vehicles.remove(&vehicle)
    }

    /// Start (or restart) sampling a vehicle from `position` at `timestamp`
    /// with the given fuel level. Safe to call on every re-entry.
    pub fn start_tracking(
        &mut self,
        vehicle: VehicleId,
        position: Vec3,
        fuel: f64,
        timestamp: f64,
    ) -> Result<(), FuelError> {
        let max_health = self.config.max_health;
        let state = self
            .vehicles
            .get_mut(&vehicle)
            .ok_or(FuelError::Unknown(vehicle))?;

        state.last_position = position;
        state.last_timestamp = timestamp;
        state.current_fuel = fuel::round_fuel(fuel.min(state.max_fuel).max(0.0));
        // Time spent without a driver does not count towards degradation.
        if let Some(timer) = state.degradation.as_mut() {
            timer.last_sample = timestamp;
        }
        state.phase = state.settled_phase(max_health);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance one vehicle to a new sample. See the module docs for the
    /// pipeline. Never fails; problems are reported in the outcome.
    pub fn tick(
        &mut self,
        vehicle: VehicleId,
        position: Vec3,
        timestamp: f64,
        engine_on: bool,
    ) -> TickResult {
        let Some(current) = self.vehicles.get(&vehicle) else {
            log::debug!("tick for unknown {vehicle} ignored");
            return TickResult::unchanged(UnchangedReason::Unknown);
        };
        if current.phase == FuelPhase::Idle {
            return TickResult::unchanged(UnchangedReason::NotTracking);
        }

        // Phase 1: Sample.
        let elapsed = timestamp - current.last_timestamp;
        if !(elapsed > 0.0) {
            log::debug!("stale tick for {vehicle} (elapsed {elapsed}s), skipping");
            return TickResult::unchanged(UnchangedReason::StaleTick);
        }

        let mut next = current.clone();
        next.engine_on = engine_on;
        let mut result = TickResult::unchanged(UnchangedReason::Stationary);

        // Phase 2-3: Consume and stall.
        let distance = position.distance(next.last_position);
        let speed = distance / elapsed;
        if distance > 0.0 && speed > 0.0 && position.is_finite() {
            let adjusted_rate = next.consumption_rate * (1.0 + speed / self.config.sensitivity);
            let consumed = distance * adjusted_rate;
            let new_fuel = fuel::round_fuel((next.current_fuel - consumed).max(0.0));

            next.current_fuel = new_fuel;
            next.last_position = position;
            next.last_timestamp = timestamp;
            result.outcome = TickOutcome::Consumed {
                consumed: fuel::round_fuel(consumed),
                fuel: new_fuel,
            };
        }

        if next.is_empty() && next.engine_on {
            next.engine_on = false;
            if current.is_empty() {
                // Reported when the tank ran dry; the host still reports a
                // running engine.
                result.effects.push(SideEffect::SetEngine { vehicle, on: false });
            } else {
                result.outcome = TickOutcome::Stalled;
                self.force_off(vehicle, stall_notification(), &mut result);
                result.events.push(FuelEvent::EngineStall { vehicle });
            }
        }

        // Phase 4: Degrade / regenerate.
        self.advance_engine_health(vehicle, &mut next, timestamp, &mut result);
        next.phase = next.settled_phase(self.config.max_health);

        // Phase 5: Persist.
        if next.current_fuel != current.current_fuel {
            if let Err(e) = self.store.set_fuel(vehicle, next.current_fuel) {
                log::warn!("failed to persist fuel for {vehicle}: {e}; retrying next tick");
                return TickResult::unchanged(UnchangedReason::PersistenceFailure);
            }
        }

        // Phase 6: Commit.
        self.vehicles.insert(vehicle, next);
        for event in &result.events {
            self.events.push(event.clone());
        }
        result
    }

    /// Tick a batch of samples in order. Results are returned in the same
    /// order as the samples.
    pub fn tick_all(
        &mut self,
        samples: impl IntoIterator<Item = TickSample>,
    ) -> Vec<(VehicleId, TickResult)> {
        samples
            .into_iter()
            .map(|s| {
                (
                    s.vehicle,
                    self.tick(s.vehicle, s.position, s.timestamp, s.engine_on),
                )
            })
            .collect()
    }

    fn advance_engine_health(
        &self,
        vehicle: VehicleId,
        next: &mut VehicleFuelState,
        timestamp: f64,
        result: &mut TickResult,
    ) {
        let cfg = &self.config;

        if !next.has_mismatch() {
            if next.degradation.take().is_some() {
                log::info!("fuel mismatch cleared for {vehicle}");
                result.events.push(FuelEvent::MismatchCleared { vehicle });
            }
            if next.engine_health < cfg.max_health {
                next.engine_health = (next.engine_health + cfg.health_regen).min(cfg.max_health);
            }
            return;
        }

        if !next.engine_on || next.engine_health <= 0.0 {
            // Paused: the timer only runs while the engine burns the wrong fuel.
            if let Some(timer) = next.degradation.as_mut() {
                timer.last_sample = timer.last_sample.max(timestamp);
            }
            return;
        }

        if next.degradation.is_none() {
            next.degradation = Some(DegradationTimer::start(timestamp));
            log::info!(
                "fuel mismatch on {vehicle}: needs {}, tanked {}",
                next.fuel_type,
                next.tanked_type
            );
            result.events.push(FuelEvent::MismatchStarted {
                vehicle,
                required: next.fuel_type,
                tanked: next.tanked_type,
            });
            result.effects.push(SideEffect::Notify {
                recipient: Recipient::Occupants(vehicle),
                notification: Notification::new(
                    NotificationIcon::Warning,
                    "Engine",
                    format!(
                        "This vehicle runs on {}, but the tank holds {}.",
                        next.fuel_type, next.tanked_type
                    ),
                ),
            });
            return;
        }

        let Some(timer) = next.degradation.as_mut() else {
            return;
        };
        let intervals = timer.advance(timestamp, cfg.degrade_interval_secs);
        for _ in 0..intervals {
            next.engine_health = (next.engine_health - cfg.health_decrement).max(0.0);
            timer.decrements += 1;
            result.events.push(FuelEvent::EngineDegraded {
                vehicle,
                health: next.engine_health,
            });
            if next.engine_health <= 0.0 {
                break;
            }
        }

        if next.engine_health <= 0.0 {
            log::warn!("engine of {vehicle} broke down from fuel mismatch");
            next.degradation = None;
            next.engine_on = false;
            self.force_off(vehicle, breakdown_notification(), result);
            result.events.push(FuelEvent::EngineBreakdown { vehicle });
        }
    }

    fn force_off(&self, vehicle: VehicleId, notification: Notification, result: &mut TickResult) {
        result.effects.push(SideEffect::SetEngine { vehicle, on: false });
        result
            .effects
            .push(SideEffect::ResetPassengerClients { vehicle });
        result.effects.push(SideEffect::Notify {
            recipient: Recipient::Occupants(vehicle),
            notification,
        });
    }

    // -----------------------------------------------------------------------
    // Refill / engine control
    // -----------------------------------------------------------------------

    /// Refill a vehicle. `None` fills the tank; an amount is added and
    /// clamped to capacity. A supplied fuel type becomes the tanked type.
    /// Returns the new fuel level.
    pub fn refill(
        &mut self,
        vehicle: VehicleId,
        amount: Option<f64>,
        tanked: Option<FuelType>,
    ) -> Result<f64, FuelError> {
        let state = self
            .vehicles
            .get(&vehicle)
            .ok_or(FuelError::Unknown(vehicle))?;

        let new_fuel = match amount {
            None => state.max_fuel,
            Some(a) if !a.is_finite() || a < 0.0 => return Err(FuelError::InvalidAmount(a)),
            Some(a) => fuel::round_fuel((state.current_fuel + a).min(state.max_fuel)),
        };
        let new_tanked = match tanked {
            Some(t) => t,
            None if self.config.refill_resets_tanked_type => state.fuel_type,
            None => state.tanked_type,
        };

        // Fuel and tanked type go out in a single write.
        let mut doc = state.to_document();
        doc.fuel = new_fuel;
        doc.ascended_fuel.type_tanked = new_tanked;
        self.store.save(vehicle, &doc)?;

        let max_health = self.config.max_health;
        let Some(state) = self.vehicles.get_mut(&vehicle) else {
            return Err(FuelError::Unknown(vehicle));
        };
        state.current_fuel = new_fuel;
        state.tanked_type = new_tanked;
        if state.phase != FuelPhase::Idle {
            state.phase = state.settled_phase(max_health);
        }
        log::info!(
            "refilled {vehicle} to {new_fuel} / {} ({new_tanked})",
            state.max_fuel
        );
        self.events.push(FuelEvent::Refilled {
            vehicle,
            fuel: new_fuel,
            tanked: new_tanked,
        });
        Ok(new_fuel)
    }

    /// Switch a vehicle's engine on or off at a player's request. A broken
    /// engine starts again once the correct fuel is back in the tank and
    /// regenerates while it runs.
    pub fn toggle_engine(
        &mut self,
        vehicle: VehicleId,
        requested_by: PlayerId,
    ) -> Result<EngineToggled, FuelError> {
        let state = self
            .vehicles
            .get_mut(&vehicle)
            .ok_or(FuelError::Unknown(vehicle))?;

        let turning_on = !state.engine_on;
        if turning_on {
            if state.engine_locked {
                return Err(FuelError::Locked(vehicle));
            }
            if state.is_empty() {
                return Err(FuelError::NoFuel(vehicle));
            }
            if state.engine_health <= 0.0 && state.has_mismatch() {
                return Err(FuelError::Broken(vehicle));
            }
        }

        state.engine_on = turning_on;
        let mut effects = vec![SideEffect::SetEngine {
            vehicle,
            on: turning_on,
        }];
        if !turning_on {
            effects.push(SideEffect::ResetPassengerClients { vehicle });
        }
        log::info!(
            "{requested_by} switched engine of {vehicle} {}",
            if turning_on { "on" } else { "off" }
        );
        self.events.push(FuelEvent::EngineToggled {
            vehicle,
            on: turning_on,
            by: requested_by,
        });
        Ok(EngineToggled {
            engine_on: turning_on,
            effects,
        })
    }

    /// Record the host's engine flag without any checks. While the engine
    /// is off a running degradation timer is held at `now`.
    pub fn sync_engine(&mut self, vehicle: VehicleId, on: bool, now: f64) -> Result<(), FuelError> {
        let state = self
            .vehicles
            .get_mut(&vehicle)
            .ok_or(FuelError::Unknown(vehicle))?;
        state.engine_on = on;
        if !on {
            if let Some(timer) = state.degradation.as_mut() {
                timer.last_sample = timer.last_sample.max(now);
            }
        }
        Ok(())
    }

    /// Set the host-managed "engine disabled" flag.
    pub fn set_engine_locked(&mut self, vehicle: VehicleId, locked: bool) -> Result<(), FuelError> {
        let state = self
            .vehicles
            .get_mut(&vehicle)
            .ok_or(FuelError::Unknown(vehicle))?;
        state.engine_locked = locked;
        Ok(())
    }

    /// Restore engine health to full and drop any running degradation
    /// timer. A persisting mismatch restarts it on the next running tick.
    pub fn repair_engine(&mut self, vehicle: VehicleId) -> Result<f64, FuelError> {
        let max_health = self.config.max_health;
        let state = self
            .vehicles
            .get_mut(&vehicle)
            .ok_or(FuelError::Unknown(vehicle))?;
        state.engine_health = max_health;
        state.degradation = None;
        if state.phase != FuelPhase::Idle {
            state.phase = state.settled_phase(max_health);
        }
        self.events.push(FuelEvent::EngineRepaired { vehicle });
        Ok(max_health)
    }

    /// Swap in a new catalog and rewrite every bound vehicle's consumption,
    /// capacity and required type from it. Fuel is clamped to the new
    /// capacity. Stops at the first store failure; vehicles already
    /// rewritten keep their new values. Returns the number rewritten.
    pub fn apply_catalog(&mut self, catalog: VehicleCatalog) -> Result<usize, FuelError> {
        self.catalog = catalog;
        let max_health = self.config.max_health;
        let mut updated = 0;

        for (&vehicle, state) in self.vehicles.iter_mut() {
            let spec = self.catalog.resolve(state.model);
            let mut doc = VehicleFuelDocument::from_spec(&spec);
            doc.fuel = fuel::round_fuel(state.current_fuel.min(spec.max_fuel));
            doc.ascended_fuel.type_tanked = state.tanked_type;
            self.store.save(vehicle, &doc)?;

            state.consumption_rate = spec.consumption;
            state.max_fuel = spec.max_fuel;
            state.fuel_type = spec.fuel_type;
            state.current_fuel = doc.fuel;
            if state.phase != FuelPhase::Idle {
                state.phase = state.settled_phase(max_health);
            }
            updated += 1;
        }

        log::info!("applied catalog to {updated} vehicles");
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn state(&self, vehicle: VehicleId) -> Option<&VehicleFuelState> {
        self.vehicles.get(&vehicle)
    }

    pub fn is_registered(&self, vehicle: VehicleId) -> bool {
        self.vehicles.contains_key(&vehicle)
    }

    /// Registered and sampled at least once.
    pub fn is_tracked(&self, vehicle: VehicleId) -> bool {
        self.vehicles
            .get(&vehicle)
            .is_some_and(|s| s.phase != FuelPhase::Idle)
    }

    /// Fuel level as a percentage of capacity, in [0, 100].
    pub fn fuel_percent(&self, vehicle: VehicleId) -> Option<f64> {
        self.vehicles.get(&vehicle).map(|s| s.fuel_percent())
    }

    pub fn fuel(&self, vehicle: VehicleId) -> Option<f64> {
        self.vehicles.get(&vehicle).map(|s| s.current_fuel)
    }

    pub fn max_fuel(&self, vehicle: VehicleId) -> Option<f64> {
        self.vehicles.get(&vehicle).map(|s| s.max_fuel)
    }

    pub fn consumption(&self, vehicle: VehicleId) -> Option<f64> {
        self.vehicles.get(&vehicle).map(|s| s.consumption_rate)
    }

    pub fn fuel_type(&self, vehicle: VehicleId) -> Option<FuelType> {
        self.vehicles.get(&vehicle).map(|s| s.fuel_type)
    }

    pub fn tanked_type(&self, vehicle: VehicleId) -> Option<FuelType> {
        self.vehicles.get(&vehicle).map(|s| s.tanked_type)
    }

    pub fn engine_health(&self, vehicle: VehicleId) -> Option<f64> {
        self.vehicles.get(&vehicle).map(|s| s.engine_health)
    }

    pub fn phase(&self, vehicle: VehicleId) -> Option<FuelPhase> {
        self.vehicles.get(&vehicle).map(|s| s.phase)
    }

    /// All registered vehicles, in id order.
    pub fn vehicles(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.vehicles.keys().copied()
    }

    /// Vehicles that have been sampled since binding, in id order.
    pub fn tracked_vehicles(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.vehicles
            .iter()
            .filter(|(_, s)| s.phase != FuelPhase::Idle)
            .map(|(id, _)| *id)
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }
}

fn stall_notification() -> Notification {
    Notification::new(
        NotificationIcon::Warning,
        "Fuel",
        "The tank is empty and the engine stalled.",
    )
}

fn breakdown_notification() -> Notification {
    Notification::new(
        NotificationIcon::Error,
        "Engine",
        "The engine broke down from running on the wrong fuel.",
    )
}

// ===========================================================================
// Tests
// ===========================================================================
