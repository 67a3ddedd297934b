use crate::event::{Notification, NotificationIcon};
use crate::id::VehicleId;
use crate::store::StoreError;

/// Errors returned by fuel simulation operations. None of them is fatal:
/// the caller shows [`FuelError::notification`] to the requesting player and
/// carries on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FuelError {
    /// The vehicle is not registered with this simulation.
    #[error("{0} is not tracked")]
    Unknown(VehicleId),

    /// Tried to start an engine with an empty tank.
    #[error("{0} has no fuel")]
    NoFuel(VehicleId),

    /// The host has disabled this vehicle's engine.
    #[error("engine of {0} is locked")]
    Locked(VehicleId),

    /// Tried to start an engine with zero health and the wrong fuel.
    #[error("engine of {0} is broken")]
    Broken(VehicleId),

    /// A refill amount was negative or not a number.
    #[error("invalid refill amount {0}")]
    InvalidAmount(f64),

    /// The document store rejected a write; in-memory state is unchanged.
    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

impl FuelError {
    /// A player-facing notification describing the failure.
    pub fn notification(&self) -> Notification {
        match self {
            FuelError::Unknown(_) => Notification::new(
                NotificationIcon::Warning,
                "Fuel",
                "This vehicle has no fuel system.",
            ),
            FuelError::NoFuel(_) => Notification::new(
                NotificationIcon::Warning,
                "Engine",
                "The tank is empty. Refuel before starting the engine.",
            ),
            FuelError::Locked(_) => Notification::new(
                NotificationIcon::Error,
                "Engine",
                "The engine of this vehicle is disabled.",
            ),
            FuelError::Broken(_) => Notification::new(
                NotificationIcon::Error,
                "Engine",
                "The engine is broken. Refuel with the right fuel or repair it.",
            ),
            FuelError::InvalidAmount(_) => Notification::new(
                NotificationIcon::Warning,
                "Fuel",
                "That is not a valid amount of fuel.",
            ),
            FuelError::Persistence(_) => Notification::new(
                NotificationIcon::Error,
                "Fuel",
                "Saving the vehicle failed. Please try again.",
            ),
        }
    }
}
