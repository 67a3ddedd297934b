//! Binary snapshots of the tracked vehicle states.
//!
//! Lets the host reload the plugin without dropping tracking: serialize the
//! in-memory map via `bitcode` behind a versioned header, then restore it
//! into a fresh [`FuelSimulation`]. Config, catalog, store and event log are
//! not part of a snapshot.

use serde::{Deserialize, Serialize};

use crate::engine::FuelSimulation;
use crate::id::VehicleId;
use crate::state::VehicleFuelState;
use crate::store::DocumentStore;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a fuel simulation snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0xF0E1_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version {0} (this build reads {FORMAT_VERSION})")]
    UnsupportedVersion(u32),
    #[error("header announces {expected} vehicles, snapshot holds {actual}")]
    CountMismatch { expected: u32, actual: usize },
    #[error("invalid state for {vehicle}: {detail}")]
    InvalidState { vehicle: VehicleId, detail: String },
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Header prepended to every snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    pub vehicle_count: u32,
}

impl SnapshotHeader {
    pub fn new(vehicle_count: u32) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            vehicle_count,
        }
    }

    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(SnapshotError::InvalidMagic(self.magic));
        }
        if self.version != FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FuelSnapshot {
    header: SnapshotHeader,
    vehicles: Vec<(VehicleId, VehicleFuelState)>,
}

// ---------------------------------------------------------------------------
// FuelSimulation integration
// ---------------------------------------------------------------------------

impl<S: DocumentStore> FuelSimulation<S> {
    /// Serialize every bound vehicle's state.
    pub fn snapshot(&self) -> Result<Vec<u8>, SnapshotError> {
        let vehicles: Vec<_> = self
            .vehicles
            .iter()
            .map(|(id, state)| (*id, state.clone()))
            .collect();
        let snapshot = FuelSnapshot {
            header: SnapshotHeader::new(vehicles.len() as u32),
            vehicles,
        };
        bitcode::serialize(&snapshot).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Replace all vehicle states with those in `data`. On error the current
    /// states are kept. Returns the number of restored vehicles.
    pub fn restore(&mut self, data: &[u8]) -> Result<usize, SnapshotError> {
        let snapshot: FuelSnapshot =
            bitcode::deserialize(data).map_err(|e| SnapshotError::Decode(e.to_string()))?;
        snapshot.header.validate()?;
        if snapshot.header.vehicle_count as usize != snapshot.vehicles.len() {
            return Err(SnapshotError::CountMismatch {
                expected: snapshot.header.vehicle_count,
                actual: snapshot.vehicles.len(),
            });
        }
        for (vehicle, state) in &snapshot.vehicles {
            check_state(*vehicle, state, self.config.max_health)?;
        }

        self.vehicles = snapshot.vehicles.into_iter().collect();
        log::info!("restored {} vehicle fuel states", self.vehicles.len());
        Ok(self.vehicles.len())
    }
}

/// Reject states that break the fuel or health bounds.
fn check_state(
    vehicle: VehicleId,
    state: &VehicleFuelState,
    max_health: f64,
) -> Result<(), SnapshotError> {
    let invalid = |detail: String| SnapshotError::InvalidState { vehicle, detail };
    if !(state.max_fuel.is_finite() && state.max_fuel > 0.0) {
        return Err(invalid(format!("capacity {}", state.max_fuel)));
    }
    if !(0.0..=state.max_fuel).contains(&state.current_fuel) {
        return Err(invalid(format!(
            "fuel {} outside [0, {}]",
            state.current_fuel, state.max_fuel
        )));
    }
    if !(0.0..=max_health).contains(&state.engine_health) {
        return Err(invalid(format!(
            "engine health {} outside [0, {max_health}]",
            state.engine_health
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuel::FuelType;
    use crate::state::FuelPhase;
    use crate::test_utils::*;

    #[test]
    fn snapshot_restores_tracking() {
        let mut sim = tracked_sim(50.0);
        sim.refill(car(), None, Some(FuelType::Diesel)).unwrap();
        sim.tick(car(), pos(100.0), 10.0, true);
        let data = sim.snapshot().unwrap();

        let mut fresh = empty_sim();
        assert_eq!(fresh.restore(&data).unwrap(), 1);
        assert_eq!(fresh.state(car()), sim.state(car()));
        assert_eq!(fresh.phase(car()), Some(FuelPhase::Degrading));
    }

    #[test]
    fn restored_sim_keeps_ticking() {
        let mut sim = tracked_sim(50.0);
        let data = sim.snapshot().unwrap();
        let mut fresh = sim_with_vehicle(car());
        fresh.restore(&data).unwrap();

        let a = sim.tick(car(), pos(100.0), 10.0, true);
        let b = fresh.tick(car(), pos(100.0), 10.0, true);
        assert_eq!(a.outcome, b.outcome);
    }

    #[test]
    fn garbage_is_rejected_and_state_kept() {
        let mut sim = tracked_sim(20.0);
        assert!(sim.restore(&[1, 2, 3]).is_err());
        assert_eq!(sim.fuel(car()), Some(20.0));
    }

    #[test]
    fn header_validation() {
        assert!(SnapshotHeader::new(0).validate().is_ok());
        let bad_magic = SnapshotHeader {
            magic: 0xDEAD_BEEF,
            ..SnapshotHeader::new(0)
        };
        assert!(matches!(
            bad_magic.validate(),
            Err(SnapshotError::InvalidMagic(0xDEAD_BEEF))
        ));
        let future = SnapshotHeader {
            version: FORMAT_VERSION + 1,
            ..SnapshotHeader::new(0)
        };
        assert!(matches!(
            future.validate(),
            Err(SnapshotError::UnsupportedVersion(_))
        ));
    }

    fn encode(header: SnapshotHeader, vehicles: Vec<(VehicleId, VehicleFuelState)>) -> Vec<u8> {
        bitcode::serialize(&FuelSnapshot { header, vehicles }).unwrap()
    }

    #[test]
    fn vehicle_count_must_match_header() {
        let sim = tracked_sim(20.0);
        let states = vec![(car(), sim.state(car()).cloned().unwrap())];
        let data = encode(SnapshotHeader::new(2), states);

        let mut fresh = tracked_sim(5.0);
        assert!(matches!(
            fresh.restore(&data),
            Err(SnapshotError::CountMismatch {
                expected: 2,
                actual: 1
            })
        ));
        assert_eq!(fresh.fuel(car()), Some(5.0));
    }

    #[test]
    fn out_of_bounds_state_is_rejected() {
        let sim = tracked_sim(20.0);
        let mut overfilled = sim.state(car()).cloned().unwrap();
        overfilled.current_fuel = 80.0;
        let data = encode(SnapshotHeader::new(1), vec![(car(), overfilled)]);
        assert!(matches!(
            empty_sim().restore(&data),
            Err(SnapshotError::InvalidState { .. })
        ));

        let mut wrecked = sim.state(car()).cloned().unwrap();
        wrecked.engine_health = -25.0;
        let data = encode(SnapshotHeader::new(1), vec![(car(), wrecked)]);
        assert!(matches!(
            empty_sim().restore(&data),
            Err(SnapshotError::InvalidState { .. })
        ));

        let mut nan = sim.state(car()).cloned().unwrap();
        nan.current_fuel = f64::NAN;
        let data = encode(SnapshotHeader::new(1), vec![(car(), nan)]);
        assert!(matches!(
            empty_sim().restore(&data),
            Err(SnapshotError::InvalidState { .. })
        ));
    }
}
