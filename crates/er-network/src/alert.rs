//! Hop-limited V2V relay of emergency alerts toward the edge-node network.
//!
//! # Search strategy
//!
//! Depth-first and greedy.  At every holder the router first looks for an
//! edge node in radio range that has not cached the message yet; the nearest
//! such node accepts it and the search stops.  Otherwise the message is
//! copied to each in-range vehicle not already on its path, nearest first,
//! and the search descends into that copy.  A branch that dead-ends returns
//! to its parent, which tries its next candidate.
//!
//! The DFS runs on an explicit stack of frames; hop limit and visited
//! set are plain data on each frame's message rather than recursion depth.
//!
//! A copy is never created with a hop count above `max_hops`.  A holder
//! sitting at exactly `max_hops` may still deliver to an in-range edge node.

use std::collections::{BTreeMap, VecDeque};

use log::{debug, info};

use er_core::{AccidentId, EdgeNodeId, MessageId, Position, Tick, VehicleId};
use er_spatial::{Neighbor, VehicleIndex};

use crate::{EdgeNodeNetwork, EmergencyPayload, Message};

/// Result of one propagation attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct AlertOutcome {
    pub message:      MessageId,
    pub accident:     AccidentId,
    pub success:      bool,
    /// Hops of the delivered copy; 0 on failure.
    pub hop_count:    u32,
    /// Path of the delivered copy; just the source on failure.
    pub path:         Vec<VehicleId>,
    pub delivered_to: Option<EdgeNodeId>,
}

/// One level of the depth-first search.
struct Frame {
    message:    Message,
    position:   Position,
    /// `None` until the frame is first visited; then the untried relays.
    candidates: Option<VecDeque<Neighbor>>,
}

/// Relays alerts and keeps per-message history and delivery statistics.
#[derive(Debug)]
pub struct AlertRouter {
    comm_range:    f64,
    max_hops:      u32,
    next_message:  u64,
    /// Every copy created for each message, origin first.
    history:       BTreeMap<MessageId, Vec<Message>>,
    /// Successful deliveries keyed by hop count.
    hop_histogram: BTreeMap<u32, u64>,
    attempts:      u64,
    successes:     u64,
}

impl AlertRouter {
    pub fn new(comm_range: f64, max_hops: u32) -> Self {
        Self {
            comm_range,
            max_hops,
            next_message:  1,
            history:       BTreeMap::new(),
            hop_histogram: BTreeMap::new(),
            attempts:      0,
            successes:     0,
        }
    }

    // ── Statistics ────────────────────────────────────────────────────────

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn hop_histogram(&self) -> &BTreeMap<u32, u64> {
        &self.hop_histogram
    }

    /// All copies made while propagating `message`, origin first.
    pub fn history(&self, message: MessageId) -> &[Message] {
        self.history.get(&message).map(Vec::as_slice).unwrap_or(&[])
    }

    // ── Propagation ───────────────────────────────────────────────────────

    /// Create a fresh emergency message at `source` and relay it.
    ///
    /// `relays` must contain only vehicles allowed to forward alerts
    /// (ambulances excluded).
    pub fn send_emergency(
        &mut self,
        network: &mut EdgeNodeNetwork,
        relays:  &VehicleIndex,
        source:  VehicleId,
        origin:  Position,
        payload: EmergencyPayload,
        now:     Tick,
    ) -> AlertOutcome {
        let id = MessageId(self.next_message);
        self.next_message += 1;
        info!("{} involving {:?} at {}: sending {id} from {source}", payload.accident, payload.involved, origin);
        let message = Message::emergency(id, source, origin, payload, now);
        self.relay(network, relays, message, origin, now)
    }

    /// Relay an existing message held at `position` until some edge node
    /// accepts it or every branch is exhausted.
    pub fn relay(
        &mut self,
        network:  &mut EdgeNodeNetwork,
        relays:   &VehicleIndex,
        message:  Message,
        position: Position,
        now:      Tick,
    ) -> AlertOutcome {
        self.attempts += 1;
        let id = message.id;
        let accident = message.accident();
        let source = message.source;
        self.history.entry(id).or_default().push(message.clone());

        let mut stack = vec![Frame { message, position, candidates: None }];

        while let Some(frame) = stack.last_mut() {
            if frame.candidates.is_none() {
                debug!(
                    "    {} holds {id}, hop {}",
                    frame.message.holder(),
                    frame.message.hop_count,
                );
                if let Some(node) = self.deliver(network, &mut frame.message, frame.position, now) {
                    self.successes += 1;
                    *self.hop_histogram.entry(frame.message.hop_count).or_default() += 1;
                    if let Some(last) = self.history.get_mut(&id).and_then(|h| h.last_mut()) {
                        last.reached_edge_node = true;
                    }
                    return AlertOutcome {
                        message: id,
                        accident,
                        success: true,
                        hop_count: frame.message.hop_count,
                        path: frame.message.path.clone(),
                        delivered_to: Some(node),
                    };
                }

                let untried = if frame.message.hop_count < self.max_hops {
                    relays
                        .within(frame.position, self.comm_range)
                        .into_iter()
                        .filter(|n| !frame.message.visited(n.id))
                        .collect()
                } else {
                    debug!("    {id} reached max hops ({})", self.max_hops);
                    VecDeque::new()
                };
                frame.candidates = Some(untried);
            }

            match frame.candidates.as_mut().and_then(VecDeque::pop_front) {
                Some(next) => {
                    let copy = frame.message.relay_to(next.id);
                    debug!("    {} -> {} ({id})", frame.message.holder(), next.id);
                    self.history.entry(id).or_default().push(copy.clone());
                    stack.push(Frame { message: copy, position: next.position, candidates: None });
                }
                None => {
                    stack.pop();
                }
            }
        }

        info!("{id} for {accident}: propagation failed");
        AlertOutcome {
            message: id,
            accident,
            success: false,
            hop_count: 0,
            path: vec![source],
            delivered_to: None,
        }
    }

    /// Hand `message` to the nearest in-range edge node that has not seen
    /// it.  Returns that node's ID.
    fn deliver(
        &self,
        network:  &mut EdgeNodeNetwork,
        message:  &mut Message,
        position: Position,
        now:      Tick,
    ) -> Option<EdgeNodeId> {
        for (node_id, distance) in network.nodes_within(position, self.comm_range) {
            let Some(node) = network.node_mut(node_id) else {
                continue;
            };
            if node.has_seen(message.id) {
                continue;
            }
            message.reached_edge_node = true;
            node.accept(message, now);
            info!(
                "[{}] received {} about {} after {} hops ({distance:.1} m)",
                node.name,
                message.id,
                message.accident(),
                message.hop_count,
            );
            return Some(node_id);
        }
        None
    }
}
