//! Fuel types, per-vehicle fuel specs, and display rounding.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Fuel type
// ---------------------------------------------------------------------------

/// The kind of fuel a vehicle burns, or that was last put into its tank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Gasoline,
    Diesel,
    Electric,
    Kerosene,
}

impl FuelType {
    /// Every fuel type, in declaration order.
    pub const ALL: [FuelType; 4] = [
        FuelType::Gasoline,
        FuelType::Diesel,
        FuelType::Electric,
        FuelType::Kerosene,
    ];

    /// Canonical display name.
    pub fn name(self) -> &'static str {
        match self {
            FuelType::Gasoline => "Gasoline",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Kerosene => "Kerosene",
        }
    }
}

impl std::fmt::Display for FuelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a fuel type name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fuel type '{0}'")]
pub struct UnknownFuelType(pub String);

impl FromStr for FuelType {
    type Err = UnknownFuelType;

    /// Case-insensitive. Accepts the legacy `Gasolin` / `Kerosin` spellings
    /// still found in older vehicle documents.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gasoline" | "gasolin" | "petrol" => Ok(FuelType::Gasoline),
            "diesel" => Ok(FuelType::Diesel),
            "electric" => Ok(FuelType::Electric),
            "kerosene" | "kerosin" => Ok(FuelType::Kerosene),
            _ => Err(UnknownFuelType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Fuel spec
// ---------------------------------------------------------------------------

/// Static fuel characteristics of a vehicle model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelSpec {
    /// Base fuel units consumed per unit of distance.
    pub consumption: f64,
    /// Tank capacity.
    pub max_fuel: f64,
    /// Required fuel type.
    pub fuel_type: FuelType,
}

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// Round a fuel amount to 2 decimal places. Applied before a value is
/// persisted or reported so displayed levels carry no float noise.
#[inline]
pub fn round_fuel(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Fuel level as a percentage of capacity, clamped to [0, 100].
pub fn percent(fuel: f64, max_fuel: f64) -> f64 {
    if max_fuel <= 0.0 {
        return 0.0;
    }
    round_fuel((fuel / max_fuel * 100.0).clamp(0.0, 100.0))
}
