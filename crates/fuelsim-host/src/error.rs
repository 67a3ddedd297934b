use fuelsim_core::error::FuelError;
use fuelsim_core::event::{Notification, NotificationIcon};
use fuelsim_core::id::{PlayerId, VehicleId};

/// Errors returned by the plugin-facing operations of a
/// [`FuelService`](crate::service::FuelService). Each one is also shown to
/// the requesting player.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    /// The player is not sitting in a vehicle.
    #[error("{0} is not in a vehicle")]
    NotInVehicle(PlayerId),

    /// No registered vehicle within the refill radius.
    #[error("no vehicle near {0}")]
    NoVehicleNearby(PlayerId),

    /// The host could not tell the vehicle's model.
    #[error("model of {0} is unknown to the host")]
    UnknownModel(VehicleId),

    /// The host could not tell where the vehicle is.
    #[error("position of {0} is unknown to the host")]
    NoPosition(VehicleId),

    #[error(transparent)]
    Fuel(#[from] FuelError),
}

impl ServiceError {
    /// A player-facing notification describing the failure.
    pub fn notification(&self) -> Notification {
        match self {
            ServiceError::NotInVehicle(_) => Notification::new(
                NotificationIcon::Warning,
                "Fuel",
                "You are not in a vehicle.",
            ),
            ServiceError::NoVehicleNearby(_) => Notification::new(
                NotificationIcon::Warning,
                "Fuel",
                "There is no vehicle close enough.",
            ),
            ServiceError::UnknownModel(_) => Notification::new(
                NotificationIcon::Error,
                "Fuel",
                "This vehicle has no fuel system.",
            ),
            ServiceError::NoPosition(_) => Notification::new(
                NotificationIcon::Error,
                "Fuel",
                "This vehicle cannot be located.",
            ),
            ServiceError::Fuel(e) => e.notification(),
        }
    }
}
