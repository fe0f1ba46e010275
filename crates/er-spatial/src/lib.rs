//! `er-spatial` — road graph, vehicle range queries, and rerouting.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`graph`]   | `RoadGraph` (segment adjacency), `RoadGraphBuilder`         |
//! | [`index`]   | `VehicleIndex` (R-tree over vehicle positions)              |
//! | [`reroute`] | `Rerouter` trait, `AntColonyRerouter`, `Reroute`            |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                          |

pub mod error;
pub mod graph;
pub mod index;
pub mod reroute;

#[cfg(test)]
mod tests;

pub use error::{SpatialError, SpatialResult};
pub use graph::{Link, RoadGraph, RoadGraphBuilder};
pub use index::{Neighbor, VehicleIndex};
pub use reroute::{AntColonyRerouter, Reroute, RerouteRequest, Rerouter, RouteSource};
