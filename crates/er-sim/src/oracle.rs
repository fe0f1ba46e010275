//! The traffic-simulator seam.
//!
//! The coordinator never moves vehicles itself.  It reads positions and
//! routes from a [`TrafficOracle`] and sends it stop / speed / route
//! commands.  [`ScriptedTraffic`] is a small in-memory implementation whose
//! vehicles only move when told to, handy for tests and replays.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use er_core::{Position, SegmentId, Tick, VehicleClass, VehicleId};

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("vehicle {0} is not in the simulation")]
    VehicleGone(VehicleId),

    #[error("unknown segment {0}")]
    UnknownSegment(SegmentId),

    #[error("command for {vehicle} rejected: {reason}")]
    Rejected { vehicle: VehicleId, reason: String },

    #[error("traffic simulator unavailable: {0}")]
    Unavailable(String),
}

pub type OracleResult<T> = Result<T, OracleError>;

/// Occupancy of one segment during the last step.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SegmentLoad {
    pub vehicles:   usize,
    /// Mean speed (m/s) of the vehicles on the segment; 0 if empty.
    pub mean_speed: f64,
}

/// Live view of, and command channel into, the traffic simulator.
///
/// The trait is object safe; the reroute path takes `&mut dyn
/// TrafficOracle`.
pub trait TrafficOracle {
    fn now(&self) -> OracleResult<Tick>;

    /// Every vehicle currently in the simulation, ascending.
    fn vehicle_ids(&self) -> OracleResult<Vec<VehicleId>>;

    fn class_of(&self, vehicle: VehicleId) -> OracleResult<VehicleClass>;

    fn position_of(&self, vehicle: VehicleId) -> OracleResult<Position>;

    fn segment_of(&self, vehicle: VehicleId) -> OracleResult<SegmentId>;

    /// Distance (m) from the start of the vehicle's current segment.
    fn lane_offset_of(&self, vehicle: VehicleId) -> OracleResult<f64>;

    fn route_of(&self, vehicle: VehicleId) -> OracleResult<Vec<SegmentId>>;

    fn set_route(&mut self, vehicle: VehicleId, route: &[SegmentId]) -> OracleResult<()>;

    fn set_speed(&mut self, vehicle: VehicleId, speed: f64) -> OracleResult<()>;

    /// Hold the vehicle at `offset` on `segment` for the rest of the run.
    fn stop(&mut self, vehicle: VehicleId, segment: &SegmentId, offset: f64) -> OracleResult<()>;

    fn segment_load(&self, segment: &SegmentId) -> OracleResult<SegmentLoad>;

    /// Advance the simulator by one tick.
    fn step(&mut self) -> OracleResult<()>;
}

// ── ScriptedTraffic ───────────────────────────────────────────────────────────

/// State of one [`ScriptedTraffic`] vehicle.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptedVehicle {
    pub class:       VehicleClass,
    pub position:    Position,
    pub segment:     SegmentId,
    pub lane_offset: f64,
    pub route:       Vec<SegmentId>,
    pub speed:       f64,
    /// Set by [`TrafficOracle::stop`].
    pub stopped_at:  Option<(SegmentId, f64)>,
}

/// In-memory traffic whose vehicles teleport on a script.
///
/// Stopped vehicles ignore later scripted moves.
#[derive(Clone, Debug, Default)]
pub struct ScriptedTraffic {
    now:      Tick,
    vehicles: BTreeMap<VehicleId, ScriptedVehicle>,
    /// Moves applied when the clock reaches the key tick.
    script:   BTreeMap<Tick, Vec<(VehicleId, Position, SegmentId)>>,
    /// Vehicles whose commands are refused.
    stubborn: BTreeSet<VehicleId>,
}

impl ScriptedTraffic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vehicle whose current segment is the first route segment.
    pub fn add_vehicle(
        &mut self,
        id:       VehicleId,
        class:    VehicleClass,
        position: Position,
        route:    &[&str],
    ) {
        let route: Vec<SegmentId> = route.iter().map(|&s| SegmentId::from(s)).collect();
        let segment = route.first().cloned().unwrap_or_else(|| SegmentId::from(""));
        self.vehicles.insert(
            id,
            ScriptedVehicle {
                class,
                position,
                segment,
                lane_offset: 0.0,
                route,
                speed: 10.0,
                stopped_at: None,
            },
        );
    }

    pub fn remove_vehicle(&mut self, id: VehicleId) -> Option<ScriptedVehicle> {
        self.vehicles.remove(&id)
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&ScriptedVehicle> {
        self.vehicles.get(&id)
    }

    /// Move `id` to `position` on `segment` once the clock reaches `at`.
    pub fn schedule_move(&mut self, at: Tick, id: VehicleId, position: Position, segment: &str) {
        self.script.entry(at).or_default().push((id, position, SegmentId::from(segment)));
    }

    /// Refuse every command addressed to `id` from now on.
    pub fn refuse_commands(&mut self, id: VehicleId) {
        self.stubborn.insert(id);
    }

    fn get(&self, id: VehicleId) -> OracleResult<&ScriptedVehicle> {
        self.vehicles.get(&id).ok_or(OracleError::VehicleGone(id))
    }

    fn command(&mut self, id: VehicleId) -> OracleResult<&mut ScriptedVehicle> {
        if self.stubborn.contains(&id) {
            return Err(OracleError::Rejected { vehicle: id, reason: "scripted refusal".to_owned() });
        }
        self.vehicles.get_mut(&id).ok_or(OracleError::VehicleGone(id))
    }
}

impl TrafficOracle for ScriptedTraffic {
    fn now(&self) -> OracleResult<Tick> {
        Ok(self.now)
    }

    fn vehicle_ids(&self) -> OracleResult<Vec<VehicleId>> {
        Ok(self.vehicles.keys().copied().collect())
    }

    fn class_of(&self, vehicle: VehicleId) -> OracleResult<VehicleClass> {
        self.get(vehicle).map(|v| v.class)
    }

    fn position_of(&self, vehicle: VehicleId) -> OracleResult<Position> {
        self.get(vehicle).map(|v| v.position)
    }

    fn segment_of(&self, vehicle: VehicleId) -> OracleResult<SegmentId> {
        self.get(vehicle).map(|v| v.segment.clone())
    }

    fn lane_offset_of(&self, vehicle: VehicleId) -> OracleResult<f64> {
        self.get(vehicle).map(|v| v.lane_offset)
    }

    fn route_of(&self, vehicle: VehicleId) -> OracleResult<Vec<SegmentId>> {
        self.get(vehicle).map(|v| v.route.clone())
    }

    fn set_route(&mut self, vehicle: VehicleId, route: &[SegmentId]) -> OracleResult<()> {
        self.command(vehicle)?.route = route.to_vec();
        Ok(())
    }

    fn set_speed(&mut self, vehicle: VehicleId, speed: f64) -> OracleResult<()> {
        self.command(vehicle)?.speed = speed;
        Ok(())
    }

    fn stop(&mut self, vehicle: VehicleId, segment: &SegmentId, offset: f64) -> OracleResult<()> {
        let v = self.command(vehicle)?;
        v.speed = 0.0;
        v.stopped_at = Some((segment.clone(), offset));
        Ok(())
    }

    fn segment_load(&self, segment: &SegmentId) -> OracleResult<SegmentLoad> {
        let on: Vec<&ScriptedVehicle> = self.vehicles.values().filter(|v| &v.segment == segment).collect();
        if on.is_empty() {
            return Ok(SegmentLoad::default());
        }
        let mean_speed = on.iter().map(|v| v.speed).sum::<f64>() / on.len() as f64;
        Ok(SegmentLoad { vehicles: on.len(), mean_speed })
    }

    fn step(&mut self) -> OracleResult<()> {
        self.now = self.now.next();
        if let Some(moves) = self.script.remove(&self.now) {
            for (id, position, segment) in moves {
                if let Some(v) = self.vehicles.get_mut(&id) {
                    if v.stopped_at.is_none() {
                        v.position = position;
                        v.segment = segment;
                    }
                }
            }
        }
        Ok(())
    }
}
