//! The `Accident` record shared by registration, broadcast and rerouting.

use std::collections::BTreeSet;

use er_core::{AccidentId, EdgeNodeId, Position, SegmentId, Tick, VehicleId};

/// A registered collision.
///
/// Created once per detected vehicle pair and owned by the
/// [`EdgeNodeNetwork`](crate::EdgeNodeNetwork) for the rest of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct Accident {
    pub id:            AccidentId,
    pub location:      Position,
    pub created_at:    Tick,
    /// The edge node nearest to `location` at registration time.
    pub registered_by: EdgeNodeId,
    pub involved:      BTreeSet<VehicleId>,
    /// Road segment the first involved vehicle occupied at detection; this is
    /// the segment other vehicles reroute around.  `None` if the traffic
    /// oracle could not report it.
    pub segment:       Option<SegmentId>,
    /// Reset to the current tick every time the accident is rebroadcast.
    pub last_broadcast: Tick,
}

impl Accident {
    #[inline]
    pub fn involves(&self, vehicle: VehicleId) -> bool {
        self.involved.contains(&vehicle)
    }

    /// `true` once at least `interval` ticks have passed since the last
    /// broadcast (or since creation).
    #[inline]
    pub fn broadcast_due(&self, now: Tick, interval: u64) -> bool {
        now.since(self.last_broadcast) >= interval
    }
}
