//! A single fixed infrastructure node.

use std::collections::{BTreeSet, HashSet};

use er_core::{AccidentId, EdgeNodeId, MessageId, Position, Tick, VehicleId};

use crate::message::{Message, Payload};

/// What an edge node remembers about one accepted emergency alert.
#[derive(Clone, Debug, PartialEq)]
pub struct AlertRecord {
    pub message:     MessageId,
    pub accident:    AccidentId,
    pub involved:    Vec<VehicleId>,
    pub location:    Position,
    pub timestamp:   Tick,
    pub received_at: Tick,
    pub hop_count:   u32,
    pub path:        Vec<VehicleId>,
}

/// A fixed edge node (CEN).
#[derive(Clone, Debug)]
pub struct EdgeNode {
    pub id:       EdgeNodeId,
    /// Display name used in logs, e.g. `"EdgeCEN_A"`.
    pub name:     String,
    pub position: Position,
    /// Vehicles that delivered at least one alert to this node.
    pub connected_vehicles: BTreeSet<VehicleId>,
    message_cache:          HashSet<MessageId>,
    pub messages_received:  u64,
    pub accidents_reported: BTreeSet<AccidentId>,
    pub alerts:             Vec<AlertRecord>,
}

impl EdgeNode {
    pub fn new(id: EdgeNodeId, name: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            connected_vehicles: BTreeSet::new(),
            message_cache:      HashSet::new(),
            messages_received:  0,
            accidents_reported: BTreeSet::new(),
            alerts:             Vec::new(),
        }
    }

    #[inline]
    pub fn has_seen(&self, message: MessageId) -> bool {
        self.message_cache.contains(&message)
    }

    /// Accept `message` if its ID is not cached yet.
    ///
    /// Returns `false` (and changes nothing) for a duplicate.
    pub fn accept(&mut self, message: &Message, now: Tick) -> bool {
        if !self.message_cache.insert(message.id) {
            return false;
        }
        self.messages_received += 1;
        self.connected_vehicles.insert(message.holder());

        match &message.payload {
            Payload::Emergency(p) => {
                self.accidents_reported.insert(p.accident);
                self.alerts.push(AlertRecord {
                    message:     message.id,
                    accident:    p.accident,
                    involved:    p.involved.clone(),
                    location:    p.location,
                    timestamp:   p.timestamp,
                    received_at: now,
                    hop_count:   message.hop_count,
                    path:        message.path.clone(),
                });
            }
        }
        true
    }
}
