//! `er-core` — foundational types for the emergency-response coordination
//! workspace.
//!
//! This crate is a dependency of every other `er-*` crate.  It has no `er-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`ids`]      | `VehicleId`, `EdgeNodeId`, `AccidentId`, `MessageId`, `SegmentId` |
//! | [`geo`]      | `Position`, Euclidean distance                              |
//! | [`time`]     | `Tick`                                                      |
//! | [`rng`]      | `SimRng` (the single run-wide random source)                |
//! | [`class`]    | `VehicleClass` enum                                         |
//! | [`config`]   | `EmergencyConfig`, `DispatchParams`, `RerouteParams`        |
//! | [`error`]    | `CoreError`, `CoreResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod class;
pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use class::VehicleClass;
pub use config::{DispatchParams, EmergencyConfig, RerouteParams};
pub use error::{CoreError, CoreResult};
pub use geo::Position;
pub use ids::{AccidentId, EdgeNodeId, MessageId, SegmentId, VehicleId};
pub use rng::SimRng;
pub use time::Tick;
