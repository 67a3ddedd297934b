//! Document store abstraction for persisted per-vehicle fuel fields.
//!
//! The host owns persistence. The simulation only needs to read a vehicle's
//! fuel document when it is bound and to write the fuel level (and, on
//! refill, the tanked type) back. [`MemoryStore`] is the in-process
//! implementation used by tests and embedders without a database.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::fuel::{FuelSpec, FuelType};
use crate::id::VehicleId;

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Fuel-specific fields nested under `ascendedFuel` in the vehicle document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelFields {
    pub consumption: f64,
    pub max: f64,
    #[serde(rename = "type")]
    pub fuel_type: FuelType,
    pub type_tanked: FuelType,
}

/// The persisted fuel record for one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleFuelDocument {
    pub fuel: f64,
    #[serde(rename = "ascendedFuel")]
    pub ascended_fuel: FuelFields,
}

impl VehicleFuelDocument {
    /// A fresh document for a vehicle with the given spec: full tank of the
    /// correct fuel type.
    pub fn from_spec(spec: &FuelSpec) -> Self {
        Self {
            fuel: spec.max_fuel,
            ascended_fuel: FuelFields {
                consumption: spec.consumption,
                max: spec.max_fuel,
                fuel_type: spec.fuel_type,
                type_tanked: spec.fuel_type,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors reported by a [`DocumentStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No document exists for the vehicle.
    #[error("no document for {0}")]
    Missing(VehicleId),
    /// The backend rejected or failed the operation.
    #[error("store backend failed: {0}")]
    Backend(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Persistence capability supplied by the host.
pub trait DocumentStore {
    /// Load the fuel document for a vehicle, `Ok(None)` if none exists.
    fn load(&self, vehicle: VehicleId) -> Result<Option<VehicleFuelDocument>, StoreError>;

    /// Create or replace the whole document.
    fn save(&mut self, vehicle: VehicleId, doc: &VehicleFuelDocument) -> Result<(), StoreError>;

    /// Write only the fuel level.
    fn set_fuel(&mut self, vehicle: VehicleId, fuel: f64) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// A [`DocumentStore`] backed by a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: HashMap<VehicleId, VehicleFuelDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow a stored document.
    pub fn get(&self, vehicle: VehicleId) -> Option<&VehicleFuelDocument> {
        self.docs.get(&vehicle)
    }

    /// Remove a vehicle's document, returning it.
    pub fn remove(&mut self, vehicle: VehicleId) -> Option<VehicleFuelDocument> {
        self.docs.remove(&vehicle)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self, vehicle: VehicleId) -> Result<Option<VehicleFuelDocument>, StoreError> {
        Ok(self.docs.get(&vehicle).cloned())
    }

    fn save(&mut self, vehicle: VehicleId, doc: &VehicleFuelDocument) -> Result<(), StoreError> {
        self.docs.insert(vehicle, doc.clone());
        Ok(())
    }

    fn set_fuel(&mut self, vehicle: VehicleId, fuel: f64) -> Result<(), StoreError> {
        let doc = self
            .docs
            .get_mut(&vehicle)
            .ok_or(StoreError::Missing(vehicle))?;
        doc.fuel = fuel;
        Ok(())
    }
}
