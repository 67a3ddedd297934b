//! The fuel service: reacts to host events and exposes the fuel API.
//!
//! # Interval pipeline
//!
//! On every [`FuelService::on_interval`] each driven vehicle is visited once:
//! 1. **Track** -- a vehicle that was never sampled starts tracking instead.
//! 2. **Engine** -- with the engine off only the flag is synced.
//! 3. **Tick** -- the simulation advances from the live position.
//! 4. **Apply** -- side effects go to the host (engine, resets, notices).
//! 5. **HUD** -- occupants get the new fuel percentage.

use std::collections::BTreeSet;

use fuelsim_core::catalog::VehicleCatalog;
use fuelsim_core::config::ServiceConfig;
use fuelsim_core::engine::FuelSimulation;
use fuelsim_core::event::{Notification, NotificationIcon, Recipient, SideEffect};
use fuelsim_core::fuel::FuelType;
use fuelsim_core::id::{PlayerId, VehicleId};
use fuelsim_core::sim::TickResult;
use fuelsim_core::state::FuelPhase;
use fuelsim_core::store::DocumentStore;

use crate::error::ServiceError;
use crate::host::{Host, HudSink};

pub struct FuelService<H: Host, S: DocumentStore> {
    sim: FuelSimulation<S>,
    host: H,
    hud: Option<Box<dyn HudSink>>,
    config: ServiceConfig,
    last_interval: Option<f64>,
}

impl<H: Host, S: DocumentStore> FuelService<H, S> {
    pub fn new(sim: FuelSimulation<S>, host: H, config: ServiceConfig) -> Self {
        Self {
            sim,
            host,
            hud: None,
            config,
            last_interval: None,
        }
    }

    /// Attach a HUD sink.
    pub fn with_hud(mut self, hud: Box<dyn HudSink>) -> Self {
        self.hud = Some(hud);
        self
    }

    pub fn set_hud(&mut self, hud: Option<Box<dyn HudSink>>) {
        self.hud = hud;
    }

    pub fn sim(&self) -> &FuelSimulation<S> {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut FuelSimulation<S> {
        &mut self.sim
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Host events
    // -----------------------------------------------------------------------

    /// A vehicle was bound to its persisted document.
    pub fn on_vehicle_bound(&mut self, vehicle: VehicleId) -> Result<(), ServiceError> {
        let Some(model) = self.host.vehicle_model(vehicle) else {
            log::error!("cannot bind {vehicle}: host reports no model");
            return Err(ServiceError::UnknownModel(vehicle));
        };
        self.sim.register(vehicle, model).map_err(|e| {
            log::error!("binding {vehicle} failed: {e}");
            ServiceError::from(e)
        })
    }

    /// A vehicle left the world. Returns whether it was bound.
    pub fn on_vehicle_destroyed(&mut self, vehicle: VehicleId) -> bool {
        self.sim.unregister(vehicle).is_some()
    }

    /// Start sampling the player's vehicle from its live position and
    /// stored fuel, then refresh the HUD.
    pub fn on_player_entered_vehicle(
        &mut self,
        player: PlayerId,
        now: f64,
    ) -> Result<(), ServiceError> {
        let vehicle = self
            .host
            .player_vehicle(player)
            .ok_or(ServiceError::NotInVehicle(player))?;
        self.begin_tracking(vehicle, now)?;
        self.push_hud(vehicle);
        Ok(())
    }

    /// Run [`on_interval`](Self::on_interval) if at least one tick interval
    /// has passed since the last run.
    pub fn poll(&mut self, now: f64) -> Option<Vec<(VehicleId, TickResult)>> {
        let interval = self.config.tick_interval_ms as f64 / 1000.0;
        if let Some(last) = self.last_interval {
            if now - last < interval {
                return None;
            }
        }
        self.last_interval = Some(now);
        Some(self.on_interval(now))
    }

    /// Tick every driven vehicle once. Returns the results of the vehicles
    /// that were actually ticked.
    pub fn on_interval(&mut self, now: f64) -> Vec<(VehicleId, TickResult)> {
        let mut seen = BTreeSet::new();
        let mut results = Vec::new();
        for (_, vehicle) in self.host.drivers() {
            if !seen.insert(vehicle) {
                continue;
            }
            if let Some(result) = self.tick_vehicle(vehicle, now) {
                results.push((vehicle, result));
            }
        }
        results
    }

    fn tick_vehicle(&mut self, vehicle: VehicleId, now: f64) -> Option<TickResult> {
        if !self.sim.is_tracked(vehicle) {
            if let Err(e) = self.begin_tracking(vehicle, now) {
                log::warn!("cannot track driven {vehicle}: {e}");
            }
            return None;
        }

        if !self.host.engine_on(vehicle) {
            if let Err(e) = self.sim.sync_engine(vehicle, false, now) {
                log::debug!("engine sync for {vehicle} skipped: {e}");
            }
            return None;
        }

        let Some(position) = self.host.vehicle_position(vehicle) else {
            log::warn!("host reports no position for driven {vehicle}");
            return None;
        };
        let result = self.sim.tick(vehicle, position, now, true);
        self.apply_effects(&result.effects);
        self.push_hud(vehicle);
        Some(result)
    }

    // -----------------------------------------------------------------------
    // Fuel API
    // -----------------------------------------------------------------------

    /// Switch the engine of the player's vehicle. Returns the new state.
    pub fn toggle_vehicle_engine(
        &mut self,
        player: PlayerId,
        now: f64,
    ) -> Result<bool, ServiceError> {
        let result = self.try_toggle(player, now);
        self.report(player, result)
    }

    fn try_toggle(&mut self, player: PlayerId, now: f64) -> Result<bool, ServiceError> {
        let vehicle = self
            .host
            .player_vehicle(player)
            .ok_or(ServiceError::NotInVehicle(player))?;
        self.ensure_registered(vehicle)?;

        // The host is authoritative for both flags.
        self.sim
            .set_engine_locked(vehicle, self.host.engine_locked(vehicle))?;
        self.sim
            .sync_engine(vehicle, self.host.engine_on(vehicle), now)?;

        let toggled = self.sim.toggle_engine(vehicle, player)?;
        self.apply_effects(&toggled.effects);
        if toggled.engine_on && !self.sim.is_tracked(vehicle) {
            self.begin_tracking(vehicle, now)?;
        }
        Ok(toggled.engine_on)
    }

    /// Refill the vehicle the player sits in. `None` fills the tank.
    pub fn refill(
        &mut self,
        player: PlayerId,
        amount: Option<f64>,
        fuel_type: Option<FuelType>,
    ) -> Result<f64, ServiceError> {
        let result = self
            .host
            .player_vehicle(player)
            .ok_or(ServiceError::NotInVehicle(player))
            .and_then(|vehicle| self.refill_vehicle(player, vehicle, amount, fuel_type));
        self.report(player, result)
    }

    /// Refill the closest bound vehicle within the refill radius.
    pub fn refill_closest_vehicle(
        &mut self,
        player: PlayerId,
        amount: Option<f64>,
        fuel_type: Option<FuelType>,
    ) -> Result<f64, ServiceError> {
        let result = self
            .closest_vehicle(player)
            .and_then(|vehicle| self.refill_vehicle(player, vehicle, amount, fuel_type));
        self.report(player, result)
    }

    fn refill_vehicle(
        &mut self,
        player: PlayerId,
        vehicle: VehicleId,
        amount: Option<f64>,
        fuel_type: Option<FuelType>,
    ) -> Result<f64, ServiceError> {
        self.ensure_registered(vehicle)?;
        let fuel = self.sim.refill(vehicle, amount, fuel_type)?;
        self.push_hud(vehicle);

        let max = self.sim.max_fuel(vehicle).unwrap_or(fuel);
        self.host.notify(
            player,
            &Notification::new(
                NotificationIcon::Info,
                "Fuel",
                format!("Refilled to {fuel:.2} / {max:.2}."),
            ),
        );
        Ok(fuel)
    }

    /// The closest bound vehicle within `refill_radius` of the player.
    pub fn closest_vehicle(&self, player: PlayerId) -> Result<VehicleId, ServiceError> {
        let origin = self
            .host
            .player_position(player)
            .ok_or(ServiceError::NoVehicleNearby(player))?;
        let radius = self.config.refill_radius;

        self.host
            .vehicles()
            .into_iter()
            .filter(|v| self.sim.is_registered(*v))
            .filter_map(|v| {
                self.host
                    .vehicle_position(v)
                    .map(|p| (v, p.distance(origin)))
            })
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(v, _)| v)
            .ok_or(ServiceError::NoVehicleNearby(player))
    }

    /// Restore a vehicle's engine health.
    pub fn repair_engine(&mut self, vehicle: VehicleId) -> Result<f64, ServiceError> {
        Ok(self.sim.repair_engine(vehicle)?)
    }

    /// Rewrite every bound vehicle from a new catalog.
    pub fn set_consumption_rates(&mut self, catalog: VehicleCatalog) -> Result<usize, ServiceError> {
        Ok(self.sim.apply_catalog(catalog)?)
    }

    pub fn fuel_types(&self) -> &'static [FuelType] {
        &FuelType::ALL
    }

    pub fn fuel_type(&self, vehicle: VehicleId) -> Option<FuelType> {
        self.sim.fuel_type(vehicle)
    }

    pub fn fuel_consumption(&self, vehicle: VehicleId) -> Option<f64> {
        self.sim.consumption(vehicle)
    }

    pub fn max_fuel(&self, vehicle: VehicleId) -> Option<f64> {
        self.sim.max_fuel(vehicle)
    }

    pub fn fuel(&self, vehicle: VehicleId) -> Option<f64> {
        self.sim.fuel(vehicle)
    }

    /// Fuel as a percentage of capacity, in `[0, 100]`.
    pub fn fuel_percent(&self, vehicle: VehicleId) -> Option<f64> {
        self.sim.fuel_percent(vehicle)
    }

    pub fn phase(&self, vehicle: VehicleId) -> Option<FuelPhase> {
        self.sim.phase(vehicle)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn ensure_registered(&mut self, vehicle: VehicleId) -> Result<(), ServiceError> {
        if self.sim.is_registered(vehicle) {
            return Ok(());
        }
        self.on_vehicle_bound(vehicle)
    }

    fn begin_tracking(&mut self, vehicle: VehicleId, now: f64) -> Result<(), ServiceError> {
        self.ensure_registered(vehicle)?;
        let position = self
            .host
            .vehicle_position(vehicle)
            .ok_or(ServiceError::NoPosition(vehicle))?;

        let fuel = match self.sim.store().load(vehicle) {
            Ok(Some(doc)) => doc.fuel,
            Ok(None) => self.sim.fuel(vehicle).unwrap_or_default(),
            Err(e) => {
                log::warn!("reading stored fuel of {vehicle} failed: {e}; using last known level");
                self.sim.fuel(vehicle).unwrap_or_default()
            }
        };

        self.sim.start_tracking(vehicle, position, fuel, now)?;
        self.sim
            .sync_engine(vehicle, self.host.engine_on(vehicle), now)?;
        self.sim
            .set_engine_locked(vehicle, self.host.engine_locked(vehicle))?;
        log::debug!("tracking {vehicle} from {fuel} fuel");
        Ok(())
    }

    fn apply_effects(&mut self, effects: &[SideEffect]) {
        for effect in effects {
            match effect {
                SideEffect::SetEngine { vehicle, on } => self.host.set_engine_on(*vehicle, *on),
                SideEffect::ResetPassengerClients { vehicle } => {
                    for player in self.host.occupants(*vehicle) {
                        self.host.reset_client_state(player);
                    }
                }
                SideEffect::Notify {
                    recipient,
                    notification,
                } => match recipient {
                    Recipient::Occupants(vehicle) => {
                        for player in self.host.occupants(*vehicle) {
                            self.host.notify(player, notification);
                        }
                    }
                    Recipient::Player(player) => self.host.notify(*player, notification),
                },
            }
        }
    }

    fn push_hud(&mut self, vehicle: VehicleId) {
        if !self.config.push_hud {
            return;
        }
        let Some(hud) = self.hud.as_mut() else {
            return;
        };
        let Some(percent) = self.sim.fuel_percent(vehicle) else {
            return;
        };
        for player in self.host.occupants(vehicle) {
            hud.push_fuel(player, percent);
        }
    }

    fn report<T>(
        &mut self,
        player: PlayerId,
        result: Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        if let Err(e) = &result {
            log::debug!("request from {player} failed: {e}");
            self.host.notify(player, &e.notification());
        }
        result
    }
}

// ===========================================================================
// Tests
// ===========================================================================
