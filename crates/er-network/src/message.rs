//! Alert envelope relayed between vehicles.

use er_core::{AccidentId, MessageId, Position, Tick, VehicleId};

/// Severity carried in an emergency payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    High,
}

/// Fixed field set of an emergency alert.
#[derive(Clone, Debug, PartialEq)]
pub struct EmergencyPayload {
    pub accident:  AccidentId,
    pub involved:  Vec<VehicleId>,
    pub location:  Position,
    pub timestamp: Tick,
    pub severity:  Severity,
}

/// Message body, one variant per message type.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Emergency(EmergencyPayload),
}

/// Discriminant of [`Payload`], handy for logging and output columns.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Emergency,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Emergency => "EMERGENCY",
        }
    }
}

/// One copy of an alert as held by a particular vehicle.
///
/// Relaying never mutates a message; [`relay_to`](Self::relay_to) produces
/// a new copy with one more hop and the next holder appended to the path.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub id:        MessageId,
    /// Vehicle that originated the alert.
    pub source:    VehicleId,
    pub origin:    Position,
    pub payload:   Payload,
    pub created_at: Tick,
    /// Number of vehicle-to-vehicle relays so far; 0 at the origin.
    pub hop_count: u32,
    /// Vehicles that have held this message, origin first.
    pub path:      Vec<VehicleId>,
    pub reached_edge_node: bool,
}

impl Message {
    /// A fresh emergency alert held by its source vehicle.
    pub fn emergency(
        id:      MessageId,
        source:  VehicleId,
        origin:  Position,
        payload: EmergencyPayload,
        now:     Tick,
    ) -> Self {
        Self {
            id,
            source,
            origin,
            payload: Payload::Emergency(payload),
            created_at: now,
            hop_count: 0,
            path: vec![source],
            reached_edge_node: false,
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self.payload {
            Payload::Emergency(_) => MessageKind::Emergency,
        }
    }

    pub fn accident(&self) -> AccidentId {
        match &self.payload {
            Payload::Emergency(p) => p.accident,
        }
    }

    /// The vehicle currently holding this copy.
    pub fn holder(&self) -> VehicleId {
        self.path.last().copied().unwrap_or(self.source)
    }

    /// `true` if `vehicle` already held this message on its way here.
    #[inline]
    pub fn visited(&self, vehicle: VehicleId) -> bool {
        self.path.contains(&vehicle)
    }

    /// Copy for the next hop: hop count + 1, `next` appended to the path.
    pub fn relay_to(&self, next: VehicleId) -> Message {
        let mut copy = self.clone();
        copy.hop_count += 1;
        copy.path.push(next);
        copy
    }
}
