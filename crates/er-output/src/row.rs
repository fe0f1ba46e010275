//! Plain data row types written by output backends.
//!
//! IDs are stored as their raw integers and routes as space-separated
//! segment names so every backend can write them without further mapping.

/// A detected accident.
#[derive(Debug, Clone, PartialEq)]
pub struct AccidentRow {
    pub accident:      u32,
    pub tick:          u64,
    pub x:             f64,
    pub y:             f64,
    pub vehicle_a:     u32,
    pub vehicle_b:     u32,
    /// Empty if the segment was unknown.
    pub segment:       String,
    /// `None` if registration failed.
    pub registered_by: Option<u32>,
}

/// The outcome of one multi-hop alert.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRow {
    pub message:   u64,
    pub accident:  u32,
    pub tick:      u64,
    pub delivered: bool,
    pub hop_count: u32,
    /// Vehicle IDs of the delivered copy's path, space-separated.
    pub path:      String,
    pub edge_node: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRow {
    pub accident:  u32,
    pub tick:      u64,
    pub ambulance: Option<u32>,
    pub fitness:   Option<f64>,
    /// Empty if the ambulance could not be routed.
    pub routed_to: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RerouteRow {
    pub tick:      u64,
    pub vehicle:   u32,
    pub accident:  u32,
    pub blocked:   String,
    pub outcome:   &'static str,
    pub fallback:  bool,
    pub old_route: String,
    pub new_route: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastRow {
    pub tick:              u64,
    pub accident:          u32,
    pub edge_node:         u32,
    pub nodes_in_range:    u32,
    pub vehicles_notified: u32,
}

/// Counts for one coordinator tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:               u64,
    pub vehicles:           u64,
    pub new_accidents:      u64,
    pub alerts_delivered:   u64,
    pub alerts_failed:      u64,
    pub dispatches:         u64,
    pub reroutes_committed: u64,
    pub broadcasts:         u64,
}
