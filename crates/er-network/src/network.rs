//! The edge-node network: accident registration and periodic rebroadcast.
//!
//! # Broadcast model
//!
//! Broadcasting is a node-centric sweep driven by the coordinator once per
//! tick.  For each accident whose rebroadcast interval has elapsed, the
//! registering node announces it to every other node within radio range of
//! the accident (informational only) and to every non-involved vehicle
//! within radio range of the registering node itself.  Vehicles are reached
//! through the [`BroadcastReceiver`] trait, which keeps this crate ignorant
//! of how vehicles react.

use std::collections::BTreeMap;

use log::{debug, info};

use er_core::{AccidentId, EdgeNodeId, Position, SegmentId, Tick, VehicleId};
use er_spatial::RoadGraph;

use crate::{Accident, EdgeNode, NetworkError, NetworkResult};

/// Position of every edge node, keyed by ID.
pub type NodePositions = BTreeMap<EdgeNodeId, Position>;

// ── BroadcastReceiver ─────────────────────────────────────────────────────────

/// The vehicle side of a broadcast sweep.
pub trait BroadcastReceiver {
    /// Candidate vehicles, in the order they should be notified.
    fn vehicles(&self) -> Vec<VehicleId>;

    /// Current position, or `None` if the vehicle has left the simulation.
    fn position_of(&self, vehicle: VehicleId) -> Option<Position>;

    /// Deliver `accident` to `vehicle` (its listen-and-reroute behavior).
    fn receive(
        &mut self,
        vehicle:        VehicleId,
        accident:       &Accident,
        node_positions: &NodePositions,
        graph:          &RoadGraph,
        comm_range:     f64,
    );
}

/// What one accident's rebroadcast reached.
#[derive(Clone, Debug, PartialEq)]
pub struct BroadcastRecord {
    pub accident:          AccidentId,
    pub from:              EdgeNodeId,
    pub at:                Tick,
    /// Edge nodes within range of the accident location, with distances.
    pub nodes_in_range:    Vec<(EdgeNodeId, f64)>,
    pub vehicles_notified: Vec<VehicleId>,
}

// ── EdgeNodeNetwork ───────────────────────────────────────────────────────────

/// All edge nodes plus every accident registered with them.
#[derive(Debug)]
pub struct EdgeNodeNetwork {
    nodes:     BTreeMap<EdgeNodeId, EdgeNode>,
    accidents: BTreeMap<AccidentId, Accident>,
    /// Minimum ticks between rebroadcasts of one accident.
    interval:  u64,
}

impl EdgeNodeNetwork {
    pub fn new(interval: u64) -> Self {
        Self { nodes: BTreeMap::new(), accidents: BTreeMap::new(), interval }
    }

    /// Build a network from a list of nodes.  Node IDs must be unique.
    pub fn with_nodes(interval: u64, nodes: impl IntoIterator<Item = EdgeNode>) -> NetworkResult<Self> {
        let mut net = Self::new(interval);
        for node in nodes {
            net.add_node(node)?;
        }
        Ok(net)
    }

    pub fn add_node(&mut self, node: EdgeNode) -> NetworkResult<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(NetworkError::DuplicateEdgeNode(node.id));
        }
        self.nodes.insert(node.id, node);
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn interval(&self) -> u64 {
        self.interval
    }

    pub fn node(&self, id: EdgeNodeId) -> Option<&EdgeNode> {
        self.nodes.get(&id)
    }

    pub(crate) fn node_mut(&mut self, id: EdgeNodeId) -> Option<&mut EdgeNode> {
        self.nodes.get_mut(&id)
    }

    /// Nodes in ascending ID order.
    pub fn nodes(&self) -> impl Iterator<Item = &EdgeNode> + '_ {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_positions(&self) -> NodePositions {
        self.nodes.iter().map(|(&id, n)| (id, n.position)).collect()
    }

    pub fn accident(&self, id: AccidentId) -> Option<&Accident> {
        self.accidents.get(&id)
    }

    /// Accidents in ascending ID order.
    pub fn accidents(&self) -> impl Iterator<Item = &Accident> + '_ {
        self.accidents.values()
    }

    pub fn accident_count(&self) -> usize {
        self.accidents.len()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The node closest to `position`.  On equal distances the node with
    /// the lower ID wins.  `None` only if the network has no nodes.
    pub fn nearest_node(&self, position: Position) -> Option<EdgeNodeId> {
        let mut best: Option<(EdgeNodeId, f64)> = None;
        for node in self.nodes.values() {
            let d = position.distance(node.position);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((node.id, d));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Nodes within `range` of `position`, nearest first (ties by ID).
    pub fn nodes_within(&self, position: Position, range: f64) -> Vec<(EdgeNodeId, f64)> {
        nodes_within(&self.nodes, position, range)
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Store a new accident under its nearest edge node and return that
    /// node's ID.
    pub fn register(
        &mut self,
        id:       AccidentId,
        location: Position,
        time:     Tick,
        involved: impl IntoIterator<Item = VehicleId>,
        segment:  Option<SegmentId>,
    ) -> NetworkResult<EdgeNodeId> {
        if self.accidents.contains_key(&id) {
            return Err(NetworkError::DuplicateAccident(id));
        }
        let registered_by = self.nearest_node(location).ok_or(NetworkError::NoEdgeNodes)?;

        let accident = Accident {
            id,
            location,
            created_at: time,
            registered_by,
            involved: involved.into_iter().collect(),
            segment,
            last_broadcast: time,
        };
        info!(
            "[{}] registered {} at {} involving {:?} ({})",
            self.nodes[&registered_by].name,
            id,
            location,
            accident.involved,
            time,
        );
        self.accidents.insert(id, accident);
        Ok(registered_by)
    }

    // ── Broadcast ─────────────────────────────────────────────────────────

    /// Rebroadcast every accident whose interval has elapsed and reset its
    /// last-broadcast tick to `now`.
    pub fn broadcast<R: BroadcastReceiver>(
        &mut self,
        now:        Tick,
        receiver:   &mut R,
        graph:      &RoadGraph,
        comm_range: f64,
    ) -> Vec<BroadcastRecord> {
        let positions = self.node_positions();
        let vehicles = receiver.vehicles();
        let mut records = Vec::new();

        for accident in self.accidents.values_mut() {
            if !accident.broadcast_due(now, self.interval) {
                continue;
            }
            let from = accident.registered_by;
            let from_node = &self.nodes[&from];
            info!("[{}] broadcasting {} at {}", from_node.name, accident.id, now);

            let nodes_in_range = nodes_within(&self.nodes, accident.location, comm_range);
            for (node, d) in &nodes_in_range {
                debug!("    {} received {} from {} ({d:.1} m)", self.nodes[node].name, accident.id, from_node.name);
            }

            let mut vehicles_notified = Vec::new();
            for &vehicle in &vehicles {
                if accident.involves(vehicle) {
                    continue;
                }
                let Some(pos) = receiver.position_of(vehicle) else {
                    continue;
                };
                if pos.within(from_node.position, comm_range) {
                    receiver.receive(vehicle, accident, &positions, graph, comm_range);
                    vehicles_notified.push(vehicle);
                }
            }

            accident.last_broadcast = now;
            records.push(BroadcastRecord {
                accident: accident.id,
                from,
                at: now,
                nodes_in_range,
                vehicles_notified,
            });
        }
        records
    }
}

fn nodes_within(
    nodes:    &BTreeMap<EdgeNodeId, EdgeNode>,
    position: Position,
    range:    f64,
) -> Vec<(EdgeNodeId, f64)> {
    let mut found: Vec<(EdgeNodeId, f64)> = nodes
        .values()
        .map(|n| (n.id, position.distance(n.position)))
        .filter(|&(_, d)| d <= range)
        .collect();
    found.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    found
}
