//! Fuelsim Host -- glue between a game server and the fuel simulation.
//!
//! The server implements [`host::Host`] (entity accessors, engine flag,
//! notifications) and optionally [`host::HudSink`], then forwards its events
//! to a [`service::FuelService`]:
//!
//! - vehicle bound / destroyed -> [`service::FuelService::on_vehicle_bound`],
//!   [`service::FuelService::on_vehicle_destroyed`]
//! - player entered a vehicle -> [`service::FuelService::on_player_entered_vehicle`]
//! - scheduler -> [`service::FuelService::poll`] or
//!   [`service::FuelService::on_interval`]
//! - plugin API calls -> refill, engine toggle and the getters.

pub mod error;
pub mod host;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::ServiceError;
pub use host::{Host, HudSink, Notifier};
pub use service::FuelService;
