use serde::{Deserialize, Serialize};

/// Identifies a vehicle entity on the host. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub u32);

/// Identifies a connected player on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

/// Hash of a vehicle model name, as the host reports it on vehicle entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModelHash(pub u32);

impl ModelHash {
    /// Hash a model name the way the host does: Jenkins one-at-a-time over
    /// the ASCII-lowercased bytes.
    pub fn from_name(name: &str) -> Self {
        let mut hash: u32 = 0;
        for b in name.bytes() {
            hash = hash.wrapping_add(b.to_ascii_lowercase() as u32);
            hash = hash.wrapping_add(hash << 10);
            hash ^= hash >> 6;
        }
        hash = hash.wrapping_add(hash << 3);
        hash ^= hash >> 11;
        hash = hash.wrapping_add(hash << 15);
        Self(hash)
    }
}

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "vehicle#{}", self.0)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

impl std::fmt::Display for ModelHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_id_equality() {
        assert_eq!(VehicleId(3), VehicleId(3));
        assert_ne!(VehicleId(3), VehicleId(4));
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(VehicleId(0), "t20");
        map.insert(VehicleId(1), "panto");
        assert_eq!(map[&VehicleId(1)], "panto");
    }

    #[test]
    fn model_hash_known_value() {
        // Reference value of the one-at-a-time hash for "adder".
        assert_eq!(ModelHash::from_name("adder"), ModelHash(0xB779_A091));
    }

    #[test]
    fn model_hash_ignores_case() {
        assert_eq!(ModelHash::from_name("Zentorno"), ModelHash::from_name("zentorno"));
        assert_ne!(ModelHash::from_name("t20"), ModelHash::from_name("panto"));
    }

    #[test]
    fn display_formats() {
        assert_eq!(VehicleId(7).to_string(), "vehicle#7");
        assert_eq!(ModelHash(0xAB).to_string(), "0x000000AB");
    }
}
