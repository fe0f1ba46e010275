//! Vehicle class enum shared by the relay, dispatch and collision stages.

/// What kind of vehicle the traffic oracle is tracking.
///
/// Ambulances take no part in collision detection or V2V relay; they are
/// only ever dispatch candidates.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum VehicleClass {
    /// Ordinary passenger car (default).
    #[default]
    Passenger,
    /// Emergency response vehicle.
    Ambulance,
}

impl VehicleClass {
    /// `true` for vehicles that may collide and relay V2V messages.
    #[inline]
    pub fn is_civilian(self) -> bool {
        !matches!(self, VehicleClass::Ambulance)
    }

    /// Human-readable label, useful for CSV column values.
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleClass::Passenger => "passenger",
            VehicleClass::Ambulance => "ambulance",
        }
    }
}

impl std::fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
