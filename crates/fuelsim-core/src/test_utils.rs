//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::catalog::{FuelSettings, VehicleCatalog};
use crate::config::SimConfig;
use crate::engine::FuelSimulation;
use crate::fuel::{FuelSpec, FuelType};
use crate::id::{ModelHash, PlayerId, VehicleId};
use crate::math::Vec3;
use crate::store::{DocumentStore, MemoryStore, StoreError, VehicleFuelDocument};

// ===========================================================================
// Ids and positions
// ===========================================================================

pub fn car() -> VehicleId {
    VehicleId(1)
}

pub fn truck() -> VehicleId {
    VehicleId(2)
}

pub fn driver() -> PlayerId {
    PlayerId(1)
}

pub fn passenger() -> PlayerId {
    PlayerId(2)
}

/// A point `x` units along the X axis.
pub fn pos(x: f64) -> Vec3 {
    Vec3::new(x, 0.0, 0.0)
}

// ===========================================================================
// Catalog
// ===========================================================================

pub fn test_model() -> ModelHash {
    ModelHash::from_name("testcar")
}

pub fn diesel_model() -> ModelHash {
    ModelHash::from_name("testtruck")
}

/// Gasoline, 0.01 per unit, 50 capacity.
pub fn test_spec() -> FuelSpec {
    FuelSpec {
        consumption: 0.01,
        max_fuel: 50.0,
        fuel_type: FuelType::Gasoline,
    }
}

/// A catalog with [`test_spec`] for [`test_model`] and a diesel truck.
pub fn test_catalog() -> VehicleCatalog {
    let spec = test_spec();
    let mut catalog = VehicleCatalog::new(FuelSettings::default());
    catalog.insert(test_model(), spec.consumption, spec.max_fuel, Some(spec.fuel_type));
    catalog.insert(diesel_model(), 0.02, 80.0, Some(FuelType::Diesel));
    catalog
}

// ===========================================================================
// Simulations
// ===========================================================================

pub fn empty_sim() -> FuelSimulation<MemoryStore> {
    FuelSimulation::new(SimConfig::default(), test_catalog(), MemoryStore::new())
}

/// A simulation with `vehicle` registered as a [`test_model`], not tracked.
pub fn sim_with_vehicle(vehicle: VehicleId) -> FuelSimulation<MemoryStore> {
    let mut sim = empty_sim();
    sim.register(vehicle, test_model())
        .expect("memory store never fails");
    sim
}

/// A simulation tracking [`car`] at the origin at t=0 with `fuel` in the tank.
pub fn tracked_sim(fuel: f64) -> FuelSimulation<MemoryStore> {
    let mut sim = sim_with_vehicle(car());
    sim.start_tracking(car(), pos(0.0), fuel, 0.0)
        .expect("car is registered");
    sim
}

// ===========================================================================
// Failure injection
// ===========================================================================

/// A [`MemoryStore`] whose writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: bool,
    pub failed_writes: u32,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn check(&mut self) -> Result<(), StoreError> {
        if self.fail_writes {
            self.failed_writes += 1;
            return Err(StoreError::Backend("injected write failure".into()));
        }
        Ok(())
    }
}

impl DocumentStore for FlakyStore {
    fn load(&self, vehicle: VehicleId) -> Result<Option<VehicleFuelDocument>, StoreError> {
        self.inner.load(vehicle)
    }

    fn save(&mut self, vehicle: VehicleId, doc: &VehicleFuelDocument) -> Result<(), StoreError> {
        self.check()?;
        self.inner.save(vehicle, doc)
    }

    fn set_fuel(&mut self, vehicle: VehicleId, fuel: f64) -> Result<(), StoreError> {
        self.check()?;
        self.inner.set_fuel(vehicle, fuel)
    }
}
