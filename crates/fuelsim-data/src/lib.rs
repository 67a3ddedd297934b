//! Fuelsim Data -- loads the fuel configuration from RON, TOML or JSON.
//!
//! A single `fuel.{ron,toml,json}` file carries the fallback settings, the
//! simulation tuning, the host-adapter settings and the per-model table.
//! [`load_fuel_config`] turns it into a ready [`FuelConfig`].

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, FuelConfig, load_fuel_config, load_fuel_config_dir};
