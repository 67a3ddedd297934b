//! Serde structs for the fuel configuration file.
//!
//! Fuel types stay strings here so that the loader can report an unknown
//! name together with the file it came from.

use std::collections::BTreeMap;

use fuelsim_core::config::{ServiceConfig, SimConfig};
use serde::Deserialize;

// ===========================================================================
// Top level
// ===========================================================================

/// The whole `fuel.*` file. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FuelConfigData {
    pub settings: SettingsData,
    pub simulation: SimConfig,
    pub service: ServiceConfig,
    pub vehicles: Vec<VehicleData>,
    /// Fuel type name -> model names that burn it.
    pub fuel_types: BTreeMap<String, Vec<String>>,
}

// ===========================================================================
// Settings
// ===========================================================================

/// Fallbacks for models missing from the table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SettingsData {
    pub default_consumption: f64,
    pub default_fuel: String,
    pub default_max: f64,
}

impl Default for SettingsData {
    fn default() -> Self {
        Self {
            default_consumption: 0.003,
            default_fuel: "Diesel".to_string(),
            default_max: 30.0,
        }
    }
}

// ===========================================================================
// Vehicles
// ===========================================================================

/// One row of the per-model table.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleData {
    /// Model name, hashed with `ModelHash::from_name`.
    pub model: String,
    /// Fuel per distance unit at standstill speed.
    pub consume: f64,
    #[serde(rename = "type", default)]
    pub fuel_type: Option<String>,
    pub max_fuel: f64,
}
