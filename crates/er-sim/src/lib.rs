//! `er-sim` — the per-tick emergency-response coordinator.
//!
//! # Tick pipeline
//!
//! ```text
//! for each tick:
//!   ① Snapshot   — positions of ordinary vehicles; new ones get an agent.
//!   ② Collide    — unreported pairs closer than the threshold are stopped
//!                  and given sequential accident IDs.
//!   ③ Register   — each accident is stored under its nearest edge node.
//!   ④ Alert      — the first involved vehicle relays an emergency message
//!                  hop by hop toward any edge node.
//!   ⑤ Dispatch   — the GA picks an available ambulance and routes it to
//!                  the accident segment.
//!   ⑥ Listen     — agents in range of a registering node reroute around
//!                  accidents they have not processed yet.
//!   ⑦ Broadcast  — accidents due for rebroadcast are announced.
//!   ⑧ Advance    — the traffic oracle steps.
//! ```
//!
//! Everything outside the coordinator is reached through traits:
//! [`TrafficOracle`] for the traffic simulator, [`CongestionOracle`] for
//! congestion scores, [`er_spatial::Rerouter`] for rerouting, and
//! [`CoordinatorObserver`] for whoever consumes the accident feed.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use er_core::EmergencyConfig;
//! use er_sim::{CoordinatorBuilder, NoopObserver};
//!
//! let mut coordinator = CoordinatorBuilder::standard(EmergencyConfig::default(), traffic)
//!     .graph(graph)
//!     .edge_nodes(nodes)
//!     .ambulances(ambulances)
//!     .build()?;
//! let stats = coordinator.run_ticks(500, &mut NoopObserver)?;
//! ```

pub mod agent;
pub mod builder;
pub mod collision;
pub mod congestion;
pub mod coordinator;
pub mod error;
pub mod observer;
pub mod oracle;


pub use agent::{RerouteContext, RerouteOutcome, RerouteRecord, VehicleAgent};
pub use builder::CoordinatorBuilder;
pub use collision::{Collision, CollisionRegistry};
pub use congestion::{CongestionOracle, FixedCongestion, FuzzyCongestion};
pub use coordinator::Coordinator;
pub use error::{SimError, SimResult};
pub use observer::{
    AccidentRecord, CoordinatorObserver, DispatchRecord, FeedRecorder, NoopObserver, RunStats, TickSummary,
};
pub use oracle::{OracleError, OracleResult, ScriptedTraffic, ScriptedVehicle, SegmentLoad, TrafficOracle};
