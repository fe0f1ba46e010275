//! Spatial-subsystem error type.

use thiserror::Error;

use er_core::SegmentId;

/// Errors produced by `er-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("link {from} -> {to} has invalid weight {weight} (must be finite and > 0)")]
    InvalidWeight { from: SegmentId, to: SegmentId, weight: f64 },

    #[error("duplicate link {from} -> {to}")]
    DuplicateLink { from: SegmentId, to: SegmentId },

    #[error("cannot reroute around {0}: the vehicle is on the blocked segment")]
    StartIsBlocked(SegmentId),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
