//! Unit tests for er-network.

use std::collections::BTreeMap;

use er_core::{AccidentId, EdgeNodeId, MessageId, Position, Tick, VehicleId};
use er_spatial::{RoadGraph, VehicleIndex};

use crate::{
    Accident, AlertRouter, BroadcastReceiver, EdgeNode, EdgeNodeNetwork, EmergencyPayload, Message,
    MessageKind, NetworkError, NodePositions, Severity,
};

fn v(n: u32) -> VehicleId {
    VehicleId(n)
}

fn p(x: f64, y: f64) -> Position {
    Position::new(x, y)
}

/// Two nodes 400 m apart on the x axis.
fn two_node_network(interval: u64) -> EdgeNodeNetwork {
    EdgeNodeNetwork::with_nodes(
        interval,
        [
            EdgeNode::new(EdgeNodeId(0), "EdgeCEN_A", p(0.0, 0.0)),
            EdgeNode::new(EdgeNodeId(1), "EdgeCEN_B", p(400.0, 0.0)),
        ],
    )
    .unwrap()
}

/// A single node at the origin.
fn one_node_network() -> EdgeNodeNetwork {
    EdgeNodeNetwork::with_nodes(10, [EdgeNode::new(EdgeNodeId(0), "EdgeCEN_A", p(0.0, 0.0))]).unwrap()
}

fn payload(accident: u32, involved: &[u32]) -> EmergencyPayload {
    EmergencyPayload {
        accident:  AccidentId(accident),
        involved:  involved.iter().copied().map(VehicleId).collect(),
        location:  p(500.0, 0.0),
        timestamp: Tick(3),
        severity:  Severity::High,
    }
}

fn relays(vehicles: &[(u32, f64, f64)]) -> VehicleIndex {
    VehicleIndex::build(vehicles.iter().map(|&(id, x, y)| (VehicleId(id), p(x, y))))
}

/// Receiver backed by a fixed position table; remembers every delivery.
#[derive(Default)]
struct RecordingReceiver {
    positions: BTreeMap<VehicleId, Position>,
    received:  Vec<(VehicleId, AccidentId)>,
}

impl RecordingReceiver {
    fn with(vehicles: &[(u32, f64, f64)]) -> Self {
        Self {
            positions: vehicles.iter().map(|&(id, x, y)| (VehicleId(id), p(x, y))).collect(),
            received:  Vec::new(),
        }
    }
}

impl BroadcastReceiver for RecordingReceiver {
    fn vehicles(&self) -> Vec<VehicleId> {
        self.positions.keys().copied().collect()
    }

    fn position_of(&self, vehicle: VehicleId) -> Option<Position> {
        self.positions.get(&vehicle).copied()
    }

    fn receive(
        &mut self,
        vehicle:         VehicleId,
        accident:        &Accident,
        _node_positions: &NodePositions,
        _graph:          &RoadGraph,
        _comm_range:     f64,
    ) {
        self.received.push((vehicle, accident.id));
    }
}

// ── Message ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod message_tests {
    use super::*;

    #[test]
    fn fresh_message_is_held_by_source() {
        let m = Message::emergency(MessageId(1), v(7), p(0.0, 0.0), payload(1, &[7, 8]), Tick(3));
        assert_eq!(m.hop_count, 0);
        assert_eq!(m.path, vec![v(7)]);
        assert_eq!(m.holder(), v(7));
        assert_eq!(m.kind(), MessageKind::Emergency);
        assert_eq!(m.kind().as_str(), "EMERGENCY");
        assert_eq!(m.accident(), AccidentId(1));
    }

    #[test]
    fn relay_copy_leaves_original_untouched() {
        let m = Message::emergency(MessageId(1), v(7), p(0.0, 0.0), payload(1, &[7]), Tick(0));
        let copy = m.relay_to(v(9));
        assert_eq!(copy.hop_count, 1);
        assert_eq!(copy.path, vec![v(7), v(9)]);
        assert_eq!(copy.holder(), v(9));
        assert!(copy.visited(v(7)));
        assert_eq!(m.hop_count, 0);
        assert!(!m.visited(v(9)));
    }
}

// ── EdgeNode ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod edge_node_tests {
    use super::*;

    #[test]
    fn accept_records_alert_once() {
        let mut node = EdgeNode::new(EdgeNodeId(0), "EdgeCEN_A", p(0.0, 0.0));
        let m = Message::emergency(MessageId(5), v(1), p(0.0, 0.0), payload(2, &[1, 2]), Tick(3))
            .relay_to(v(4));

        assert!(node.accept(&m, Tick(4)));
        assert!(!node.accept(&m, Tick(5)));

        assert!(node.has_seen(MessageId(5)));
        assert_eq!(node.messages_received, 1);
        assert_eq!(node.alerts.len(), 1);
        assert!(node.connected_vehicles.contains(&v(4)));
        assert!(node.accidents_reported.contains(&AccidentId(2)));

        let alert = &node.alerts[0];
        assert_eq!(alert.hop_count, 1);
        assert_eq!(alert.received_at, Tick(4));
        assert_eq!(alert.timestamp, Tick(3));
        assert_eq!(alert.path, vec![v(1), v(4)]);
    }
}

// ── Registration ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod register_tests {
    use super::*;

    #[test]
    fn nearest_node_registers() {
        let mut net = two_node_network(10);
        let by = net.register(AccidentId(1), p(350.0, 10.0), Tick(2), [v(1), v(2)], None).unwrap();
        assert_eq!(by, EdgeNodeId(1));

        let acc = net.accident(AccidentId(1)).unwrap();
        assert_eq!(acc.registered_by, EdgeNodeId(1));
        assert_eq!(acc.created_at, Tick(2));
        assert_eq!(acc.last_broadcast, Tick(2));
        assert!(acc.involves(v(1)) && acc.involves(v(2)));
        assert!(!acc.involves(v(3)));
    }

    #[test]
    fn equidistant_location_picks_lower_id() {
        let net = two_node_network(10);
        assert_eq!(net.nearest_node(p(200.0, 50.0)), Some(EdgeNodeId(0)));
    }

    #[test]
    fn duplicate_accident_rejected() {
        let mut net = two_node_network(10);
        net.register(AccidentId(1), p(0.0, 0.0), Tick(0), [v(1)], None).unwrap();
        let err = net.register(AccidentId(1), p(0.0, 0.0), Tick(1), [v(2)], None).unwrap_err();
        assert!(matches!(err, NetworkError::DuplicateAccident(AccidentId(1))));
        assert_eq!(net.accident_count(), 1);
    }

    #[test]
    fn empty_network_cannot_register() {
        let mut net = EdgeNodeNetwork::new(10);
        let err = net.register(AccidentId(1), p(0.0, 0.0), Tick(0), [v(1)], None).unwrap_err();
        assert!(matches!(err, NetworkError::NoEdgeNodes));
        assert_eq!(net.nearest_node(p(0.0, 0.0)), None);
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut net = two_node_network(10);
        let err = net.add_node(EdgeNode::new(EdgeNodeId(1), "again", p(9.0, 9.0))).unwrap_err();
        assert!(matches!(err, NetworkError::DuplicateEdgeNode(EdgeNodeId(1))));
        assert_eq!(net.node_count(), 2);
    }

    #[test]
    fn nodes_within_sorted_by_distance() {
        let net = two_node_network(10);
        let found = net.nodes_within(p(300.0, 0.0), 350.0);
        let ids: Vec<EdgeNodeId> = found.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, [EdgeNodeId(1), EdgeNodeId(0)]);
        assert!(net.nodes_within(p(300.0, 0.0), 50.0).is_empty());
    }
}

// ── Broadcast ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod broadcast_tests {
    use super::*;

    /// Accident next to node A; vehicle 1 and 2 involved, 3 near A, 4 near B.
    fn scenario() -> (EdgeNodeNetwork, RecordingReceiver) {
        let mut net = two_node_network(10);
        net.register(AccidentId(1), p(10.0, 0.0), Tick(0), [v(1), v(2)], None).unwrap();
        let rx = RecordingReceiver::with(&[
            (1, 10.0, 0.0),
            (2, 12.0, 0.0),
            (3, 50.0, 0.0),
            (4, 390.0, 0.0),
        ]);
        (net, rx)
    }

    #[test]
    fn nothing_before_interval() {
        let (mut net, mut rx) = scenario();
        let records = net.broadcast(Tick(9), &mut rx, &RoadGraph::empty(), 200.0);
        assert!(records.is_empty());
        assert!(rx.received.is_empty());
        assert_eq!(net.accident(AccidentId(1)).unwrap().last_broadcast, Tick(0));
    }

    #[test]
    fn delivers_once_interval_elapsed() {
        let (mut net, mut rx) = scenario();
        let records = net.broadcast(Tick(10), &mut rx, &RoadGraph::empty(), 200.0);

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.from, EdgeNodeId(0));
        assert_eq!(r.at, Tick(10));
        assert_eq!(r.vehicles_notified, vec![v(3)]);
        assert_eq!(r.nodes_in_range.len(), 1);
        assert_eq!(r.nodes_in_range[0].0, EdgeNodeId(0));

        assert_eq!(rx.received, vec![(v(3), AccidentId(1))]);
        assert_eq!(net.accident(AccidentId(1)).unwrap().last_broadcast, Tick(10));
    }

    #[test]
    fn involved_vehicles_never_notified() {
        let (mut net, mut rx) = scenario();
        net.broadcast(Tick(10), &mut rx, &RoadGraph::empty(), 200.0);
        net.broadcast(Tick(20), &mut rx, &RoadGraph::empty(), 200.0);
        assert!(rx.received.iter().all(|&(veh, _)| veh != v(1) && veh != v(2)));
    }

    #[test]
    fn interval_restarts_after_broadcast() {
        let (mut net, mut rx) = scenario();
        assert_eq!(net.broadcast(Tick(10), &mut rx, &RoadGraph::empty(), 200.0).len(), 1);
        assert!(net.broadcast(Tick(15), &mut rx, &RoadGraph::empty(), 200.0).is_empty());
        assert_eq!(net.broadcast(Tick(20), &mut rx, &RoadGraph::empty(), 200.0).len(), 1);
        assert_eq!(rx.received.len(), 2);
    }

    #[test]
    fn departed_vehicle_skipped() {
        let (mut net, _) = scenario();
        // Listed but without a position.
        struct Departed;
        impl BroadcastReceiver for Departed {
            fn vehicles(&self) -> Vec<VehicleId> {
                vec![VehicleId(9)]
            }
            fn position_of(&self, _: VehicleId) -> Option<Position> {
                None
            }
            fn receive(&mut self, _: VehicleId, _: &Accident, _: &NodePositions, _: &RoadGraph, _: f64) {
                panic!("departed vehicle must not be notified");
            }
        }
        let records = net.broadcast(Tick(10), &mut Departed, &RoadGraph::empty(), 200.0);
        assert!(records[0].vehicles_notified.is_empty());
    }
}

// ── Alert relay ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod alert_tests {
    use super::*;

    #[test]
    fn direct_delivery_has_zero_hops() {
        let mut net = one_node_network();
        let mut router = AlertRouter::new(200.0, 5);
        let idx = relays(&[(1, 100.0, 0.0)]);

        let out = router.send_emergency(&mut net, &idx, v(1), p(100.0, 0.0), payload(1, &[1]), Tick(3));
        assert!(out.success);
        assert_eq!(out.hop_count, 0);
        assert_eq!(out.path, vec![v(1)]);
        assert_eq!(out.delivered_to, Some(EdgeNodeId(0)));
        assert_eq!(router.attempts(), 1);
        assert_eq!(router.successes(), 1);
        assert_eq!(router.hop_histogram().get(&0), Some(&1));
    }

    #[test]
    fn two_hop_chain() {
        let mut net = one_node_network();
        let mut router = AlertRouter::new(200.0, 5);
        let idx = relays(&[(1, 500.0, 0.0), (2, 350.0, 0.0), (3, 180.0, 0.0)]);

        let out = router.send_emergency(&mut net, &idx, v(1), p(500.0, 0.0), payload(1, &[1]), Tick(3));
        assert!(out.success);
        assert_eq!(out.hop_count, 2);
        assert_eq!(out.path, vec![v(1), v(2), v(3)]);

        let node = net.node(EdgeNodeId(0)).unwrap();
        assert_eq!(node.messages_received, 1);
        assert!(node.connected_vehicles.contains(&v(3)));
        assert_eq!(node.alerts[0].hop_count, 2);
    }

    #[test]
    fn dead_end_branch_backtracks() {
        let mut net = one_node_network();
        let mut router = AlertRouter::new(200.0, 5);
        // 2 is nearest to the source but leads nowhere.
        let idx = relays(&[(1, 500.0, 0.0), (2, 600.0, 0.0), (3, 350.0, 0.0), (4, 180.0, 0.0)]);

        let out = router.send_emergency(&mut net, &idx, v(1), p(500.0, 0.0), payload(1, &[1]), Tick(0));
        assert!(out.success);
        assert_eq!(out.path, vec![v(1), v(3), v(4)]);

        let holders: Vec<VehicleId> = router.history(out.message).iter().map(|m| m.holder()).collect();
        assert_eq!(holders, [v(1), v(2), v(3), v(4)]);
    }

    #[test]
    fn history_copies_respect_hop_limit_and_never_revisit() {
        let mut net = one_node_network();
        let mut router = AlertRouter::new(200.0, 3);
        // A dense cluster out of node range: every branch dead-ends.
        let idx = relays(&[
            (1, 1000.0, 0.0),
            (2, 1050.0, 0.0),
            (3, 1100.0, 0.0),
            (4, 1050.0, 50.0),
            (5, 1000.0, 50.0),
        ]);

        let out = router.send_emergency(&mut net, &idx, v(1), p(1000.0, 0.0), payload(1, &[1]), Tick(0));
        assert!(!out.success);

        let history = router.history(out.message);
        assert!(history.len() > 1);
        for m in history {
            assert!(m.hop_count <= 3);
            assert_eq!(m.hop_count as usize + 1, m.path.len());
            let mut seen = m.path.clone();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), m.path.len(), "path revisits a vehicle: {:?}", m.path);
            for pair in m.path.windows(2) {
                assert_ne!(pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn isolated_source_fails() {
        let mut net = one_node_network();
        let mut router = AlertRouter::new(200.0, 5);
        let idx = relays(&[(1, 900.0, 0.0)]);

        let out = router.send_emergency(&mut net, &idx, v(1), p(900.0, 0.0), payload(1, &[1]), Tick(0));
        assert!(!out.success);
        assert_eq!(out.hop_count, 0);
        assert_eq!(out.path, vec![v(1)]);
        assert_eq!(out.delivered_to, None);
        assert_eq!(router.successes(), 0);
        assert_eq!(net.node(EdgeNodeId(0)).unwrap().messages_received, 0);
    }

    #[test]
    fn holder_at_max_hops_may_still_deliver() {
        let chain = [(1, 500.0, 0.0), (2, 350.0, 0.0), (3, 180.0, 0.0)];

        let mut net = one_node_network();
        let mut router = AlertRouter::new(200.0, 2);
        let out = router.send_emergency(&mut net, &relays(&chain), v(1), p(500.0, 0.0), payload(1, &[1]), Tick(0));
        assert!(out.success);
        assert_eq!(out.hop_count, 2);

        let mut net = one_node_network();
        let mut router = AlertRouter::new(200.0, 1);
        let out = router.send_emergency(&mut net, &relays(&chain), v(1), p(500.0, 0.0), payload(1, &[1]), Tick(0));
        assert!(!out.success);
        assert!(router.history(out.message).iter().all(|m| m.hop_count <= 1));
    }

    #[test]
    fn node_accepts_a_message_only_once() {
        let mut net = one_node_network();
        let mut router = AlertRouter::new(200.0, 5);
        let idx = relays(&[(1, 100.0, 0.0)]);
        let msg = Message::emergency(MessageId(42), v(1), p(100.0, 0.0), payload(1, &[1]), Tick(0));

        assert!(router.relay(&mut net, &idx, msg.clone(), p(100.0, 0.0), Tick(0)).success);
        assert!(!router.relay(&mut net, &idx, msg, p(100.0, 0.0), Tick(1)).success);

        let node = net.node(EdgeNodeId(0)).unwrap();
        assert_eq!(node.messages_received, 1);
        assert_eq!(router.attempts(), 2);
        assert_eq!(router.successes(), 1);
    }

    #[test]
    fn message_ids_increase() {
        let mut net = one_node_network();
        let mut router = AlertRouter::new(200.0, 5);
        let idx = relays(&[(1, 100.0, 0.0)]);
        let a = router.send_emergency(&mut net, &idx, v(1), p(100.0, 0.0), payload(1, &[1]), Tick(0));
        let b = router.send_emergency(&mut net, &idx, v(1), p(100.0, 0.0), payload(2, &[1]), Tick(1));
        assert!(b.message > a.message);
        assert!(a.success && b.success);
    }
}
