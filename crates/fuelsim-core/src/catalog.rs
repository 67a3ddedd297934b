//! Vehicle model catalog: default fuel characteristics per model.
//!
//! The catalog is built once at startup (usually by `fuelsim-data`) and is
//! read-only afterwards. Models without an entry fall back to the configured
//! [`FuelSettings`] defaults.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::fuel::{FuelSpec, FuelType};
use crate::id::ModelHash;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Fallback values for vehicle models that have no catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelSettings {
    pub default_consumption: f64,
    pub default_fuel: FuelType,
    pub default_max: f64,
}

impl Default for FuelSettings {
    fn default() -> Self {
        Self {
            default_consumption: 0.003,
            default_fuel: FuelType::Diesel,
            default_max: 30.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog entries
// ---------------------------------------------------------------------------

/// A catalog entry. Every field is optional; missing fields resolve to the
/// settings defaults. Type-only entries come from fuel-type model groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub consumption: Option<f64>,
    pub max_fuel: Option<f64>,
    pub fuel_type: Option<FuelType>,
}

/// Static lookup from vehicle model to fuel characteristics.
#[derive(Debug, Clone, Default)]
pub struct VehicleCatalog {
    settings: FuelSettings,
    entries: HashMap<ModelHash, CatalogEntry>,
}

impl VehicleCatalog {
    /// Create an empty catalog with the given fallback settings.
    pub fn new(settings: FuelSettings) -> Self {
        Self {
            settings,
            entries: HashMap::new(),
        }
    }

    /// The fallback settings.
    pub fn settings(&self) -> &FuelSettings {
        &self.settings
    }

    /// Insert or replace the consumption and capacity for a model. A
    /// `None` fuel type keeps whatever type the model already has.
    pub fn insert(
        &mut self,
        model: ModelHash,
        consumption: f64,
        max_fuel: f64,
        fuel_type: Option<FuelType>,
    ) {
        let entry = self.entries.entry(model).or_default();
        entry.consumption = Some(consumption);
        entry.max_fuel = Some(max_fuel);
        if fuel_type.is_some() {
            entry.fuel_type = fuel_type;
        }
    }

    /// Assign a fuel type to a model, keeping any consumption/capacity
    /// already recorded for it.
    pub fn set_fuel_type(&mut self, model: ModelHash, fuel_type: FuelType) {
        self.entries.entry(model).or_default().fuel_type = Some(fuel_type);
    }

    /// Get the raw entry for a model, if any.
    pub fn entry(&self, model: ModelHash) -> Option<&CatalogEntry> {
        self.entries.get(&model)
    }

    /// Whether the model has an explicit entry.
    pub fn contains(&self, model: ModelHash) -> bool {
        self.entries.contains_key(&model)
    }

    /// Number of models with an explicit entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no explicit entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve the full fuel spec for a model, filling gaps from the
    /// settings defaults.
    pub fn resolve(&self, model: ModelHash) -> FuelSpec {
        let entry = self.entries.get(&model).copied().unwrap_or_default();
        FuelSpec {
            consumption: entry
                .consumption
                .unwrap_or(self.settings.default_consumption),
            max_fuel: entry.max_fuel.unwrap_or(self.settings.default_max),
            fuel_type: entry.fuel_type.unwrap_or(self.settings.default_fuel),
        }
    }
}
