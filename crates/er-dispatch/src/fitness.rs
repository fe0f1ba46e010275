//! Scoring one ambulance against one accident.
//!
//! ```text
//! fitness = readiness / 100 − distance / 200 − congestion / 10 + edge_bonus
//! ```
//!
//! `edge_bonus` is 1.0 when the ambulance is anchored on the accident
//! segment, 0.5 when the two segments share a junction, 0 otherwise.  An
//! ambulance whose position is unknown scores [`UNREACHABLE_FITNESS`].

use er_core::{Position, SegmentId, VehicleId};

/// Score of an ambulance that cannot be located.
pub const UNREACHABLE_FITNESS: f64 = -9999.0;

/// Congestion assumed when the estimator has no answer.
pub const NEUTRAL_CONGESTION: f64 = 5.0;

const READINESS_SCALE: f64 = 100.0;
const DISTANCE_SCALE: f64 = 200.0;
const CONGESTION_SCALE: f64 = 10.0;

/// Where the accident happened.
#[derive(Clone, Debug, PartialEq)]
pub struct AccidentSite {
    pub location: Position,
    pub segment:  Option<SegmentId>,
}

/// One ambulance as seen by the dispatcher at decision time.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub id:         VehicleId,
    pub readiness:  f64,
    pub anchor:     SegmentId,
    /// `None` if the traffic oracle could not locate the ambulance.
    pub position:   Option<Position>,
    /// Congestion on the ambulance's current segment, 0–10.
    pub congestion: Option<f64>,
}

pub fn edge_bonus(anchor: &SegmentId, accident: Option<&SegmentId>) -> f64 {
    match accident {
        Some(seg) if seg == anchor => 1.0,
        Some(seg) if seg.shares_endpoint(anchor) => 0.5,
        _ => 0.0,
    }
}

pub fn fitness(candidate: &Candidate, site: &AccidentSite) -> f64 {
    let Some(position) = candidate.position else {
        return UNREACHABLE_FITNESS;
    };
    let distance = position.distance(site.location);
    let congestion = candidate.congestion.unwrap_or(NEUTRAL_CONGESTION).clamp(0.0, CONGESTION_SCALE);

    candidate.readiness / READINESS_SCALE - distance / DISTANCE_SCALE - congestion / CONGESTION_SCALE
        + edge_bonus(&candidate.anchor, site.segment.as_ref())
}
