//! The `Coordinator` struct and its tick pipeline.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use er_core::{EmergencyConfig, Position, SimRng, Tick, VehicleId};
use er_dispatch::{AccidentSite, AmbulanceFleet, Candidate, GeneticDispatcher};
use er_network::{
    Accident, AlertRouter, BroadcastReceiver, EdgeNodeNetwork, EmergencyPayload, NodePositions, Severity,
};
use er_spatial::{Rerouter, RoadGraph, VehicleIndex};

use crate::{
    AccidentRecord, Collision, CollisionRegistry, CongestionOracle, CoordinatorObserver, DispatchRecord,
    RerouteContext, RerouteOutcome, RerouteRecord, RunStats, SimResult, TickSummary, TrafficOracle,
    VehicleAgent,
};

// ── Coordinator ───────────────────────────────────────────────────────────────

/// Owns every registry of the run and drives the per-tick pipeline:
///
/// 1. **Snapshot**: positions of all ordinary (non-ambulance) vehicles.
///    New vehicles get a [`VehicleAgent`].
/// 2. **Collisions**: unreported pairs closer than the threshold are stopped
///    and assigned accident IDs.
/// 3. **Registration**: each accident is stored under its nearest edge node.
/// 4. **Alerting**: the first involved vehicle relays an emergency message
///    toward any edge node.
/// 5. **Dispatch**: the GA picks an available ambulance, which is marked
///    deployed and routed to the accident segment.
/// 6. **Listen**: every agent in range of a registering node reacts to
///    accidents it has not processed (if `listen_every_tick`).
/// 7. **Broadcast**: accidents due for rebroadcast are announced.
/// 8. **Advance**: the traffic oracle steps once.
///
/// Create via [`CoordinatorBuilder`][crate::CoordinatorBuilder].
pub struct Coordinator<T: TrafficOracle, C: CongestionOracle, R: Rerouter> {
    pub config: EmergencyConfig,

    pub traffic: T,

    pub congestion: C,

    pub rerouter: R,

    /// Segment graph lent read-only to every reroute.
    pub graph: RoadGraph,

    /// Edge nodes plus every registered accident.
    pub network: EdgeNodeNetwork,

    /// Relay engine with per-message history.
    pub alerts: AlertRouter,

    pub dispatcher: GeneticDispatcher,

    pub fleet: AmbulanceFleet,

    pub collisions: CollisionRegistry,

    /// One agent per ordinary vehicle ever seen, keyed by ID.
    pub agents: BTreeMap<VehicleId, VehicleAgent>,

    /// The single random source of the run.
    pub rng: SimRng,

    pub stats: RunStats,
}

impl<T: TrafficOracle, C: CongestionOracle, R: Rerouter> Coordinator<T, C, R> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run `n` ticks, then report the cumulative stats to the observer.
    pub fn run_ticks<O: CoordinatorObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<RunStats> {
        for _ in 0..n {
            self.step(observer)?;
        }
        observer.on_run_end(&self.stats);
        Ok(self.stats.clone())
    }

    /// Process one tick.
    ///
    /// Only a failure of the oracle's clock aborts the tick; every other
    /// oracle failure skips the affected vehicle or command.
    pub fn step<O: CoordinatorObserver>(&mut self, observer: &mut O) -> SimResult<TickSummary> {
        let now = self.traffic.now()?;
        observer.on_tick_start(now);
        let mut summary = TickSummary { tick: now, ..TickSummary::default() };

        // ── Snapshot & tracking ───────────────────────────────────────────
        let snapshot = self.civilian_positions();
        summary.vehicles = snapshot.len();
        self.track(&snapshot);

        // ── Collisions & registration ─────────────────────────────────────
        let collisions = self.collisions.detect(&snapshot);
        summary.new_accidents = collisions.len();
        let mut sites = Vec::with_capacity(collisions.len());
        for collision in &collisions {
            let record = self.register(collision, now);
            observer.on_accident(&record);
            sites.push(record);
        }

        // ── Alerting ──────────────────────────────────────────────────────
        if !sites.is_empty() {
            let relays = VehicleIndex::build(snapshot.iter().copied());
            for site in &sites {
                let payload = EmergencyPayload {
                    accident:  site.accident,
                    involved:  site.involved.to_vec(),
                    location:  site.location,
                    timestamp: now,
                    severity:  Severity::High,
                };
                let outcome = self.alerts.send_emergency(
                    &mut self.network,
                    &relays,
                    site.involved[0],
                    site.location,
                    payload,
                    now,
                );
                if outcome.success {
                    summary.alerts_delivered += 1;
                } else {
                    summary.alerts_failed += 1;
                }
                observer.on_alert(now, &outcome);
            }
        }

        // ── Dispatch ──────────────────────────────────────────────────────
        for site in &sites {
            let record = self.dispatch(site, now);
            if record.ambulance.is_some() {
                summary.dispatches += 1;
            }
            observer.on_dispatch(&record);
        }

        // ── Listen & broadcast ────────────────────────────────────────────
        let positions: BTreeMap<VehicleId, Position> = snapshot.iter().copied().collect();
        let comm_range = self.config.comm_range_m;
        let mut pool = AgentPool {
            agents:    &mut self.agents,
            positions: &positions,
            traffic:   &mut self.traffic,
            rerouter:  &self.rerouter,
            rng:       &mut self.rng,
            now,
            records:   Vec::new(),
        };

        if self.config.listen_every_tick && self.network.accident_count() > 0 {
            let accidents: Vec<&Accident> = self.network.accidents().collect();
            pool.listen(&accidents, &self.network.node_positions(), &self.graph, comm_range);
        }
        let broadcasts = self.network.broadcast(now, &mut pool, &self.graph, comm_range);

        let reroutes = std::mem::take(&mut pool.records);
        for record in &reroutes {
            if record.outcome == RerouteOutcome::Committed {
                summary.reroutes_committed += 1;
            }
            observer.on_reroute(record);
        }
        summary.broadcasts = broadcasts.len();
        for record in &broadcasts {
            observer.on_broadcast(record);
        }

        // ── Advance ───────────────────────────────────────────────────────
        if let Err(e) = self.traffic.step() {
            warn!("traffic step failed at {now}: {e}");
        }

        self.stats.absorb(&summary);
        observer.on_tick_end(&summary);
        Ok(summary)
    }

    // ── Pipeline stages ───────────────────────────────────────────────────

    /// Positions of every ordinary vehicle the oracle can locate, ascending
    /// by ID.
    fn civilian_positions(&self) -> Vec<(VehicleId, Position)> {
        let ids = match self.traffic.vehicle_ids() {
            Ok(ids) => ids,
            Err(e) => {
                warn!("vehicle list unavailable: {e}");
                return Vec::new();
            }
        };

        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if self.fleet.contains(id) {
                continue;
            }
            match self.traffic.class_of(id) {
                Ok(class) if !class.is_civilian() => continue,
                Ok(_) => {}
                Err(e) => {
                    debug!("{id}: class unavailable: {e}");
                    continue;
                }
            }
            match self.traffic.position_of(id) {
                Ok(p) => out.push((id, p)),
                Err(e) => debug!("{id}: position unavailable: {e}"),
            }
        }
        out.sort_by_key(|&(id, _)| id);
        out
    }

    /// Create an agent for every vehicle seen for the first time.  A vehicle
    /// without a route is retried on the next tick.
    fn track(&mut self, snapshot: &[(VehicleId, Position)]) {
        for &(id, _) in snapshot {
            if self.agents.contains_key(&id) {
                continue;
            }
            let destination = match self.traffic.route_of(id) {
                Ok(route) => route.last().cloned(),
                Err(e) => {
                    debug!("{id}: route unavailable: {e}");
                    None
                }
            };
            let Some(destination) = destination else {
                continue;
            };
            debug!("tracking {id} (destination {destination})");
            let mut agent = VehicleAgent::new(id, destination);
            agent.refresh(&self.traffic);
            self.agents.insert(id, agent);
        }
    }

    /// Stop both vehicles and register the accident.
    fn register(&mut self, collision: &Collision, now: Tick) -> AccidentRecord {
        let (a, b) = collision.pair;
        for v in [a, b] {
            self.immobilize(v);
        }

        let segment = match self.traffic.segment_of(a) {
            Ok(seg) => Some(seg),
            Err(e) => {
                debug!("{}: accident segment unknown: {e}", collision.accident);
                None
            }
        };

        info!(
            "{} between {a} and {b} at {} on {}",
            collision.accident,
            collision.location,
            segment.as_ref().map_or("?", |s| s.as_str()),
        );

        let registered_by = match self.network.register(
            collision.accident,
            collision.location,
            now,
            [a, b],
            segment.clone(),
        ) {
            Ok(node) => Some(node),
            Err(e) => {
                warn!("{} not registered: {e}", collision.accident);
                None
            }
        };

        AccidentRecord {
            accident: collision.accident,
            at: now,
            location: collision.location,
            involved: [a, b],
            segment,
            registered_by,
        }
    }

    fn immobilize(&mut self, vehicle: VehicleId) {
        if let Err(e) = self.traffic.set_speed(vehicle, 0.0) {
            warn!("{vehicle}: set_speed(0) failed: {e}");
        }
        let stop = match (self.traffic.segment_of(vehicle), self.traffic.lane_offset_of(vehicle)) {
            (Ok(seg), Ok(offset)) => self.traffic.stop(vehicle, &seg, offset),
            (Err(e), _) | (_, Err(e)) => Err(e),
        };
        if let Err(e) = stop {
            warn!("{vehicle}: stop failed: {e}");
        }
    }

    /// Choose, deploy and route an ambulance for `site`.
    fn dispatch(&mut self, site: &AccidentRecord, now: Tick) -> DispatchRecord {
        let mut record = DispatchRecord {
            accident:  site.accident,
            at:        now,
            ambulance: None,
            fitness:   None,
            routed_to: None,
        };

        let candidates: Vec<Candidate> = self
            .fleet
            .available()
            .map(|amb| {
                let position = self.traffic.position_of(amb.id).ok();
                let congestion = self
                    .traffic
                    .segment_of(amb.id)
                    .ok()
                    .and_then(|seg| self.congestion.congestion(&seg, &self.traffic));
                amb.candidate(position, congestion)
            })
            .collect();

        let accident_site = AccidentSite { location: site.location, segment: site.segment.clone() };
        let selection = match self.dispatcher.select(&candidates, &accident_site, &mut self.rng) {
            Ok(s) => s,
            Err(e) => {
                warn!("{}: no ambulance dispatched: {e}", site.accident);
                return record;
            }
        };

        self.fleet.mark_deployed(selection.ambulance);
        record.ambulance = Some(selection.ambulance);
        record.fitness = Some(selection.fitness);

        if let Some(segment) = &site.segment {
            match self.traffic.set_route(selection.ambulance, std::slice::from_ref(segment)) {
                Ok(()) => {
                    info!("{} dispatched to {segment} for {}", selection.ambulance, site.accident);
                    record.routed_to = Some(segment.clone());
                }
                Err(e) => warn!("{}: route to {segment} rejected: {e}", selection.ambulance),
            }
        }
        record
    }
}

// ── AgentPool ─────────────────────────────────────────────────────────────────

/// Mutable view of the agents plus everything a reroute needs, borrowed
/// field by field from the coordinator.
struct AgentPool<'a, T: TrafficOracle, R: Rerouter> {
    agents:    &'a mut BTreeMap<VehicleId, VehicleAgent>,
    positions: &'a BTreeMap<VehicleId, Position>,
    traffic:   &'a mut T,
    rerouter:  &'a R,
    rng:       &'a mut SimRng,
    now:       Tick,
    records:   Vec<RerouteRecord>,
}

impl<T: TrafficOracle, R: Rerouter> AgentPool<'_, T, R> {
    /// Let every located agent hear every accident, in ascending ID order.
    fn listen(
        &mut self,
        accidents:      &[&Accident],
        node_positions: &NodePositions,
        graph:          &RoadGraph,
        comm_range:     f64,
    ) {
        for (&id, agent) in self.agents.iter_mut() {
            let Some(&position) = self.positions.get(&id) else {
                continue;
            };
            agent.refresh(&*self.traffic);
            let mut ctx = RerouteContext {
                graph,
                rerouter: self.rerouter,
                traffic:  &mut *self.traffic,
                rng:      &mut *self.rng,
                now:      self.now,
            };
            for accident in accidents {
                if let Some(r) = agent.hear(accident, position, node_positions, comm_range, &mut ctx) {
                    self.records.push(r);
                }
            }
        }
    }
}

impl<T: TrafficOracle, R: Rerouter> BroadcastReceiver for AgentPool<'_, T, R> {
    fn vehicles(&self) -> Vec<VehicleId> {
        self.agents.keys().copied().collect()
    }

    fn position_of(&self, vehicle: VehicleId) -> Option<Position> {
        self.positions.get(&vehicle).copied()
    }

    fn receive(
        &mut self,
        vehicle:        VehicleId,
        accident:       &Accident,
        node_positions: &NodePositions,
        graph:          &RoadGraph,
        comm_range:     f64,
    ) {
        let (Some(agent), Some(&position)) = (self.agents.get_mut(&vehicle), self.positions.get(&vehicle)) else {
            return;
        };
        agent.refresh(&*self.traffic);
        let mut ctx = RerouteContext {
            graph,
            rerouter: self.rerouter,
            traffic:  &mut *self.traffic,
            rng:      &mut *self.rng,
            now:      self.now,
        };
        if let Some(r) = agent.hear(accident, position, node_positions, comm_range, &mut ctx) {
            self.records.push(r);
        }
    }
}
