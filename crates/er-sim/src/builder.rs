//! Fluent builder for constructing a [`Coordinator`].

use std::collections::BTreeMap;

use er_core::{EmergencyConfig, SimRng};
use er_dispatch::{Ambulance, AmbulanceFleet, GeneticDispatcher};
use er_network::{AlertRouter, EdgeNode, EdgeNodeNetwork, NetworkError};
use er_spatial::{AntColonyRerouter, Rerouter, RoadGraph};

use crate::{
    CollisionRegistry, CongestionOracle, Coordinator, FuzzyCongestion, RunStats, SimResult, TrafficOracle,
};

/// Fluent builder for [`Coordinator<T, C, R>`].
///
/// # Required inputs
///
/// - [`EmergencyConfig`] — seed, ranges, GA and ACO parameters
/// - `T: TrafficOracle` — the traffic simulator
/// - `C: CongestionOracle` — congestion estimates for dispatch
/// - `R: Rerouter` — the reroute engine
///
/// # Optional inputs (have defaults)
///
/// | Method             | Default               |
/// |--------------------|-----------------------|
/// | `.graph(g)`        | `RoadGraph::empty()`  |
/// | `.edge_nodes(v)`   | none (build fails)    |
/// | `.ambulances(v)`   | empty fleet           |
///
/// # Example
///
/// ```rust,ignore
/// let mut coordinator = CoordinatorBuilder::standard(config, traffic)
///     .graph(graph)
///     .edge_nodes(nodes)
///     .ambulances(ambulances)
///     .build()?;
/// coordinator.run_ticks(500, &mut NoopObserver)?;
/// ```
pub struct CoordinatorBuilder<T: TrafficOracle, C: CongestionOracle, R: Rerouter> {
    config:     EmergencyConfig,
    traffic:    T,
    congestion: C,
    rerouter:   R,
    graph:      Option<RoadGraph>,
    nodes:      Vec<EdgeNode>,
    ambulances: Vec<Ambulance>,
}

impl<T: TrafficOracle> CoordinatorBuilder<T, FuzzyCongestion, AntColonyRerouter> {
    /// Fuzzy congestion and ant-colony rerouting with the configured
    /// parameters.
    pub fn standard(config: EmergencyConfig, traffic: T) -> Self {
        let rerouter = AntColonyRerouter::new(config.reroute.clone());
        Self::new(config, traffic, FuzzyCongestion, rerouter)
    }
}

impl<T: TrafficOracle, C: CongestionOracle, R: Rerouter> CoordinatorBuilder<T, C, R> {
    /// Create a builder with all required inputs.
    pub fn new(config: EmergencyConfig, traffic: T, congestion: C, rerouter: R) -> Self {
        Self {
            config,
            traffic,
            congestion,
            rerouter,
            graph:      None,
            nodes:      Vec::new(),
            ambulances: Vec::new(),
        }
    }

    /// Supply the segment graph used for rerouting.
    ///
    /// If not called, the graph is empty and every reroute falls back to the
    /// vehicle's existing route minus the blocked segment.
    pub fn graph(mut self, graph: RoadGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn edge_nodes(mut self, nodes: impl IntoIterator<Item = EdgeNode>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    pub fn ambulances(mut self, ambulances: impl IntoIterator<Item = Ambulance>) -> Self {
        self.ambulances.extend(ambulances);
        self
    }

    /// Validate inputs and return a ready-to-run [`Coordinator`].
    pub fn build(self) -> SimResult<Coordinator<T, C, R>> {
        self.config.validate()?;

        if self.nodes.is_empty() {
            return Err(NetworkError::NoEdgeNodes.into());
        }
        let network = EdgeNodeNetwork::with_nodes(self.config.broadcast_interval_ticks, self.nodes)?;

        let mut fleet = AmbulanceFleet::new();
        for amb in self.ambulances {
            fleet.add(amb)?;
        }

        Ok(Coordinator {
            alerts:     AlertRouter::new(self.config.comm_range_m, self.config.max_hop_count),
            dispatcher: GeneticDispatcher::new(self.config.dispatch.clone()),
            collisions: CollisionRegistry::new(self.config.collision_distance_m),
            rng:        SimRng::new(self.config.seed),
            graph:      self.graph.unwrap_or_else(RoadGraph::empty),
            agents:     BTreeMap::new(),
            stats:      RunStats::default(),
            config:     self.config,
            traffic:    self.traffic,
            congestion: self.congestion,
            rerouter:   self.rerouter,
            network,
            fleet,
        })
    }
}
