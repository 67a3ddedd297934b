//! Fuelsim Core -- per-vehicle fuel simulation for multiplayer game servers.
//!
//! This crate holds the fuel state machine and everything it needs to run
//! without a host: vehicle identities, the model catalog, the document-store
//! capability, side-effect and event types, and snapshots.
//!
//! # Tick Pipeline
//!
//! The host samples each driven vehicle at a fixed interval and calls
//! [`engine::FuelSimulation::tick`]:
//!
//! 1. **Sample** -- stale samples (non-positive elapsed time) are skipped.
//! 2. **Consume** -- `distance * rate * (1 + speed / sensitivity)` is burnt.
//! 3. **Stall** -- an empty tank forces the engine off, reported once.
//! 4. **Degrade** -- the wrong fuel drains engine health on a fixed interval
//!    until breakdown; the right fuel regenerates it.
//! 5. **Persist** -- the new level goes to the [`store::DocumentStore`].
//! 6. **Commit** -- in-memory state is replaced only after the write.
//!
//! ```rust,ignore
//! let mut sim = FuelSimulation::new(SimConfig::default(), catalog, MemoryStore::new());
//! sim.register(vehicle, ModelHash::from_name("t20"))?;
//! sim.start_tracking(vehicle, position, fuel, now)?;
//! let result = sim.tick(vehicle, new_position, now + 1.0, true);
//! for effect in result.effects { host.apply(effect); }
//! ```
//!
//! # Key Types
//!
//! - [`engine::FuelSimulation`] -- owns vehicle states and runs the pipeline.
//! - [`state::VehicleFuelState`] / [`state::FuelPhase`] -- per-vehicle state.
//! - [`event::SideEffect`] -- requests for the host (engine off, notify).
//! - [`event::FuelEvent`] / [`event::EventLog`] -- what happened.
//! - [`catalog::VehicleCatalog`] -- per-model defaults.
//! - [`error::FuelError`] -- non-fatal operation failures.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod fuel;
pub mod id;
pub mod math;
pub mod sim;
pub mod snapshot;
pub mod state;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
