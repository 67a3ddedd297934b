//! In-memory host and HUD for tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use fuelsim_core::config::ServiceConfig;
use fuelsim_core::event::Notification;
use fuelsim_core::id::{ModelHash, PlayerId, VehicleId};
use fuelsim_core::math::Vec3;
use fuelsim_core::store::MemoryStore;
use fuelsim_core::test_utils::{car, driver, empty_sim, pos, test_model};

use crate::host::{Host, HudSink, Notifier};
use crate::service::FuelService;

// ===========================================================================
// Mock host
// ===========================================================================

#[derive(Debug, Clone)]
pub struct MockVehicle {
    pub model: ModelHash,
    pub position: Vec3,
    pub engine_on: bool,
    pub locked: bool,
}

#[derive(Debug, Clone)]
pub struct MockPlayer {
    pub position: Vec3,
    pub vehicle: Option<VehicleId>,
    pub driver: bool,
}

/// A tiny game world: vehicles, players and what the service told them.
#[derive(Debug, Default)]
pub struct MockHost {
    pub vehicles: BTreeMap<VehicleId, MockVehicle>,
    pub players: BTreeMap<PlayerId, MockPlayer>,
    pub notifications: Vec<(PlayerId, Notification)>,
    pub resets: Vec<PlayerId>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, vehicle: VehicleId, model: ModelHash, position: Vec3) {
        self.vehicles.insert(
            vehicle,
            MockVehicle {
                model,
                position,
                engine_on: false,
                locked: false,
            },
        );
    }

    pub fn despawn(&mut self, vehicle: VehicleId) {
        self.vehicles.remove(&vehicle);
        for player in self.players.values_mut() {
            if player.vehicle == Some(vehicle) {
                player.vehicle = None;
                player.driver = false;
            }
        }
    }

    pub fn add_player(&mut self, player: PlayerId, position: Vec3) {
        self.players.insert(
            player,
            MockPlayer {
                position,
                vehicle: None,
                driver: false,
            },
        );
    }

    /// Put a player into a vehicle. Unknown players or vehicles are ignored.
    pub fn seat(&mut self, player: PlayerId, vehicle: VehicleId, driver: bool) {
        let Some(position) = self.vehicles.get(&vehicle).map(|v| v.position) else {
            return;
        };
        if let Some(p) = self.players.get_mut(&player) {
            p.vehicle = Some(vehicle);
            p.driver = driver;
            p.position = position;
        }
    }

    pub fn leave(&mut self, player: PlayerId) {
        if let Some(p) = self.players.get_mut(&player) {
            p.vehicle = None;
            p.driver = false;
        }
    }

    /// Move a vehicle and everyone inside it.
    pub fn move_vehicle(&mut self, vehicle: VehicleId, position: Vec3) {
        if let Some(v) = self.vehicles.get_mut(&vehicle) {
            v.position = position;
        }
        for p in self.players.values_mut() {
            if p.vehicle == Some(vehicle) {
                p.position = position;
            }
        }
    }

    pub fn set_engine(&mut self, vehicle: VehicleId, on: bool) {
        if let Some(v) = self.vehicles.get_mut(&vehicle) {
            v.engine_on = on;
        }
    }

    pub fn set_locked(&mut self, vehicle: VehicleId, locked: bool) {
        if let Some(v) = self.vehicles.get_mut(&vehicle) {
            v.locked = locked;
        }
    }

    pub fn is_engine_on(&self, vehicle: VehicleId) -> bool {
        self.vehicles.get(&vehicle).is_some_and(|v| v.engine_on)
    }

    pub fn notifications_for(&self, player: PlayerId) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|(p, _)| *p == player)
            .map(|(_, n)| n)
            .collect()
    }

    pub fn last_notification(&self, player: PlayerId) -> Option<&Notification> {
        self.notifications
            .iter()
            .rev()
            .find(|(p, _)| *p == player)
            .map(|(_, n)| n)
    }
}

impl Notifier for MockHost {
    fn notify(&mut self, player: PlayerId, notification: &Notification) {
        self.notifications.push((player, notification.clone()));
    }
}

impl Host for MockHost {
    fn player_vehicle(&self, player: PlayerId) -> Option<VehicleId> {
        self.players.get(&player).and_then(|p| p.vehicle)
    }

    fn player_position(&self, player: PlayerId) -> Option<Vec3> {
        self.players.get(&player).map(|p| p.position)
    }

    fn drivers(&self) -> Vec<(PlayerId, VehicleId)> {
        self.players
            .iter()
            .filter(|(_, p)| p.driver)
            .filter_map(|(id, p)| p.vehicle.map(|v| (*id, v)))
            .collect()
    }

    fn occupants(&self, vehicle: VehicleId) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|(_, p)| p.vehicle == Some(vehicle))
            .map(|(id, _)| *id)
            .collect()
    }

    fn vehicles(&self) -> Vec<VehicleId> {
        self.vehicles.keys().copied().collect()
    }

    fn vehicle_position(&self, vehicle: VehicleId) -> Option<Vec3> {
        self.vehicles.get(&vehicle).map(|v| v.position)
    }

    fn vehicle_model(&self, vehicle: VehicleId) -> Option<ModelHash> {
        self.vehicles.get(&vehicle).map(|v| v.model)
    }

    fn engine_on(&self, vehicle: VehicleId) -> bool {
        self.is_engine_on(vehicle)
    }

    fn set_engine_on(&mut self, vehicle: VehicleId, on: bool) {
        self.set_engine(vehicle, on);
    }

    fn engine_locked(&self, vehicle: VehicleId) -> bool {
        self.vehicles.get(&vehicle).is_some_and(|v| v.locked)
    }

    fn reset_client_state(&mut self, player: PlayerId) {
        self.resets.push(player);
    }
}

// ===========================================================================
// Recording HUD
// ===========================================================================

/// A HUD sink that records pushes. Clones share the same record, so keep a
/// clone to inspect after boxing one into the service.
#[derive(Debug, Clone, Default)]
pub struct RecordingHud {
    pushes: Rc<RefCell<Vec<(PlayerId, f64)>>>,
}

impl RecordingHud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pushes(&self) -> Vec<(PlayerId, f64)> {
        self.pushes.borrow().clone()
    }

    pub fn last_for(&self, player: PlayerId) -> Option<f64> {
        self.pushes
            .borrow()
            .iter()
            .rev()
            .find(|(p, _)| *p == player)
            .map(|(_, percent)| *percent)
    }
}

impl HudSink for RecordingHud {
    fn push_fuel(&mut self, player: PlayerId, percent: f64) {
        self.pushes.borrow_mut().push((player, percent));
    }
}

// ===========================================================================
// Services
// ===========================================================================

/// A service over an empty world and the core test catalog.
pub fn mock_service() -> FuelService<MockHost, MemoryStore> {
    FuelService::new(empty_sim(), MockHost::new(), ServiceConfig::default())
}

/// [`car`] spawned at the origin and bound, with [`driver`] in the driver
/// seat and tracking started at t=0. The engine is off.
pub fn driven_service() -> FuelService<MockHost, MemoryStore> {
    let mut service = mock_service();
    service.host_mut().spawn(car(), test_model(), pos(0.0));
    service.host_mut().add_player(driver(), pos(0.0));
    service.host_mut().seat(driver(), car(), true);
    service
        .on_vehicle_bound(car())
        .expect("car has a model");
    service
        .on_player_entered_vehicle(driver(), 0.0)
        .expect("driver is seated");
    service
}
