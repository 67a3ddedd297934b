//! Capabilities the game server provides to the fuel service.
//!
//! [`Host`] and [`Notifier`] are required. [`HudSink`] is optional; the
//! service holds it as an `Option` and skips HUD pushes without one.

use fuelsim_core::event::Notification;
use fuelsim_core::id::{ModelHash, PlayerId, VehicleId};
use fuelsim_core::math::Vec3;

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Shows fire-and-forget notifications to players.
pub trait Notifier {
    fn notify(&mut self, player: PlayerId, notification: &Notification);
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// Entity accessors and engine control of the game server.
pub trait Host: Notifier {
    /// The vehicle the player currently sits in.
    fn player_vehicle(&self, player: PlayerId) -> Option<VehicleId>;

    fn player_position(&self, player: PlayerId) -> Option<Vec3>;

    /// Every player in a driver seat, with the vehicle they drive.
    fn drivers(&self) -> Vec<(PlayerId, VehicleId)>;

    /// Everyone inside the vehicle, driver included.
    fn occupants(&self, vehicle: VehicleId) -> Vec<PlayerId>;

    /// All vehicles that currently exist in the world.
    fn vehicles(&self) -> Vec<VehicleId>;

    fn vehicle_position(&self, vehicle: VehicleId) -> Option<Vec3>;

    fn vehicle_model(&self, vehicle: VehicleId) -> Option<ModelHash>;

    fn engine_on(&self, vehicle: VehicleId) -> bool;

    fn set_engine_on(&mut self, vehicle: VehicleId, on: bool);

    /// The externally managed "engine disabled" flag.
    fn engine_locked(&self, vehicle: VehicleId) -> bool {
        let _ = vehicle;
        false
    }

    /// Drop speed/RPM-dependent client state after the engine went off.
    fn reset_client_state(&mut self, player: PlayerId) {
        let _ = player;
    }
}

// ---------------------------------------------------------------------------
// HUD
// ---------------------------------------------------------------------------

/// Receives fuel percentages for a player's HUD.
pub trait HudSink {
    /// `percent` is in `[0, 100]`.
    fn push_fuel(&mut self, player: PlayerId, percent: f64);
}
