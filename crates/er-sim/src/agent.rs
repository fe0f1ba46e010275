//! Per-vehicle listener that reroutes around announced accidents.

use std::collections::BTreeSet;

use log::{debug, info, warn};

use er_core::{AccidentId, Position, SegmentId, SimRng, Tick, VehicleId};
use er_network::{Accident, NodePositions};
use er_spatial::{RerouteRequest, Rerouter, RoadGraph, SpatialError};

use crate::TrafficOracle;

/// What happened to a computed reroute.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RerouteOutcome {
    /// The new route differed and the traffic oracle accepted it.
    Committed,
    /// The new route equalled the current one; nothing was sent.
    Unchanged,
    /// The traffic oracle refused the new route; the old one stays.
    Rejected,
}

impl RerouteOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            RerouteOutcome::Committed => "committed",
            RerouteOutcome::Unchanged => "unchanged",
            RerouteOutcome::Rejected  => "rejected",
        }
    }
}

/// One vehicle's reaction to one accident.
#[derive(Clone, Debug, PartialEq)]
pub struct RerouteRecord {
    pub vehicle:   VehicleId,
    pub accident:  AccidentId,
    pub at:        Tick,
    pub blocked:   SegmentId,
    pub old_route: Vec<SegmentId>,
    pub new_route: Vec<SegmentId>,
    /// `true` if no ant reached the destination.
    pub fallback:  bool,
    pub outcome:   RerouteOutcome,
}

/// Everything a reroute needs besides the agent itself.
pub struct RerouteContext<'a> {
    pub graph:    &'a RoadGraph,
    pub rerouter: &'a dyn Rerouter,
    pub traffic:  &'a mut dyn TrafficOracle,
    pub rng:      &'a mut SimRng,
    pub now:      Tick,
}

/// Coordinator-side state of one ordinary vehicle.
#[derive(Clone, Debug)]
pub struct VehicleAgent {
    pub id:          VehicleId,
    pub destination: SegmentId,
    pub current:     Option<SegmentId>,
    pub route:       Vec<SegmentId>,
    processed:       BTreeSet<AccidentId>,
}

impl VehicleAgent {
    pub fn new(id: VehicleId, destination: SegmentId) -> Self {
        Self { id, destination, current: None, route: Vec::new(), processed: BTreeSet::new() }
    }

    /// Accidents this vehicle has already reacted to.  Only ever grows.
    pub fn processed(&self) -> &BTreeSet<AccidentId> {
        &self.processed
    }

    pub fn has_processed(&self, accident: AccidentId) -> bool {
        self.processed.contains(&accident)
    }

    /// Pull the current segment and route from the traffic oracle.  Fields
    /// the oracle cannot report keep their previous values.
    pub fn refresh(&mut self, traffic: &dyn TrafficOracle) {
        match traffic.segment_of(self.id) {
            Ok(seg) => self.current = Some(seg),
            Err(e) => debug!("{}: segment unavailable: {e}", self.id),
        }
        match traffic.route_of(self.id) {
            Ok(route) => self.route = route,
            Err(e) => debug!("{}: route unavailable: {e}", self.id),
        }
    }

    /// React to `accident` if it is new to this vehicle and the vehicle at
    /// `position` is within `comm_range` of the registering edge node.
    ///
    /// An accident that passes those checks is marked processed before any
    /// reroute is attempted, so a failed reroute is not retried.  Returns a
    /// record whenever a route was computed.
    pub fn hear(
        &mut self,
        accident:       &Accident,
        position:       Position,
        node_positions: &NodePositions,
        comm_range:     f64,
        ctx:            &mut RerouteContext<'_>,
    ) -> Option<RerouteRecord> {
        if self.processed.contains(&accident.id) || accident.involves(self.id) {
            return None;
        }
        let node = node_positions.get(&accident.registered_by)?;
        let distance = position.distance(*node);
        if distance > comm_range {
            return None;
        }
        self.processed.insert(accident.id);
        info!(
            "{} received {} from {} at {} ({distance:.1} m)",
            self.id, accident.id, accident.registered_by, ctx.now,
        );

        let Some(blocked) = accident.segment.clone() else {
            debug!("{}: {} has no known segment, keeping route", self.id, accident.id);
            return None;
        };
        let Some(current) = self.current.clone() else {
            debug!("{}: current segment unknown, keeping route", self.id);
            return None;
        };

        let request = RerouteRequest {
            current:        &current,
            destination:    &self.destination,
            blocked:        &blocked,
            existing_route: &self.route,
        };
        let reroute = match ctx.rerouter.reroute(ctx.graph, &request, ctx.rng) {
            Ok(r) => r,
            Err(SpatialError::StartIsBlocked(_)) => {
                debug!("{}: already on blocked segment {blocked}", self.id);
                return None;
            }
            Err(e) => {
                warn!("{}: reroute failed: {e}", self.id);
                return None;
            }
        };

        let old_route = self.route.clone();
        let outcome = if !reroute.differs_from(&old_route) {
            RerouteOutcome::Unchanged
        } else {
            match ctx.traffic.set_route(self.id, &reroute.segments) {
                Ok(()) => {
                    info!("{} rerouted around {blocked}: {:?} -> {:?}", self.id, old_route, reroute.segments);
                    self.route = reroute.segments.clone();
                    RerouteOutcome::Committed
                }
                Err(e) => {
                    warn!("{}: new route rejected: {e}", self.id);
                    RerouteOutcome::Rejected
                }
            }
        };

        Some(RerouteRecord {
            vehicle: self.id,
            accident: accident.id,
            at: ctx.now,
            blocked,
            old_route,
            fallback: reroute.is_fallback(),
            new_route: reroute.segments,
            outcome,
        })
    }
}
