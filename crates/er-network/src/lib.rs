//! `er-network` — fixed infrastructure nodes and alert propagation.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`accident`]  | `Accident`                                                |
//! | [`message`]   | `Message`, `Payload`, `EmergencyPayload`                  |
//! | [`edge_node`] | `EdgeNode`, `AlertRecord`                                 |
//! | [`network`]   | `EdgeNodeNetwork` (register / broadcast), `BroadcastReceiver` |
//! | [`alert`]     | `AlertRouter` (hop-limited V2V relay), `AlertOutcome`     |
//! | [`error`]     | `NetworkError`, `NetworkResult<T>`                        |
//!
//! # Delivery guarantees
//!
//! Every edge node keeps an append-only cache of message IDs, so a given
//! message is accepted at most once per node.  Accidents are never removed
//! from the network during a run; only their last-broadcast tick changes.

pub mod accident;
pub mod alert;
pub mod edge_node;
pub mod error;
pub mod message;
pub mod network;

#[cfg(test)]
mod tests;

pub use accident::Accident;
pub use alert::{AlertOutcome, AlertRouter};
pub use edge_node::{AlertRecord, EdgeNode};
pub use error::{NetworkError, NetworkResult};
pub use message::{EmergencyPayload, Message, MessageKind, Payload, Severity};
pub use network::{BroadcastReceiver, BroadcastRecord, EdgeNodeNetwork, NodePositions};
