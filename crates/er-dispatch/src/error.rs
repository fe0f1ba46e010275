use thiserror::Error;

use er_core::VehicleId;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no ambulance candidates")]
    NoCandidates,

    #[error("no candidate ambulance has a known position")]
    NoReachableAmbulance,

    #[error("ambulance {ambulance}: readiness {readiness} outside [0, 100]")]
    InvalidReadiness { ambulance: VehicleId, readiness: f64 },

    #[error("ambulance {0} already in the fleet")]
    DuplicateAmbulance(VehicleId),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
