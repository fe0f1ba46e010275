//! Segment kinematics for the demo grid.
//!
//! Every vehicle sits at an offset along its current segment and advances by
//! `speed` metres per tick.  Positions are interpolated between the segment's
//! junctions, so cars travelling in opposite directions on the same road
//! pass within a few metres of each other.  That is how the demo produces
//! collisions.
//!
//! Passenger cars leave the simulation when their route runs out.
//! Ambulances start parked mid-segment and only move once routed.

use std::collections::BTreeMap;

use er_core::{Position, SegmentId, SimRng, Tick, VehicleClass, VehicleId};
use er_sim::{OracleError, OracleResult, SegmentLoad, TrafficOracle};

use crate::network::GridMap;

/// Passenger top speed (m/s).
const MAX_SPEED: f64 = 20.0;
/// Ambulance speed once dispatched (m/s).
const AMBULANCE_SPEED: f64 = 13.9;

#[derive(Clone, Debug)]
struct GridVehicle {
    class:   VehicleClass,
    route:   Vec<SegmentId>,
    /// Index into `route` of the current segment.
    leg:     usize,
    /// Metres from the start of the current segment.
    offset:  f64,
    speed:   f64,
    /// Held in place by a stop command.
    stopped: bool,
}

impl GridVehicle {
    fn segment(&self) -> &SegmentId {
        &self.route[self.leg]
    }
}

/// Spawning and stepping of vehicles on a [`GridMap`].
pub struct GridTraffic {
    map:          GridMap,
    routes:       Vec<Vec<SegmentId>>,
    rng:          SimRng,
    now:          Tick,
    next_vehicle: u32,
    vehicles:     BTreeMap<VehicleId, GridVehicle>,
}

impl GridTraffic {
    pub fn new(map: GridMap, seed: u64) -> Self {
        let routes = map.routes();
        Self {
            map,
            routes,
            rng: SimRng::new(seed),
            now: Tick::ZERO,
            next_vehicle: 0,
            vehicles: BTreeMap::new(),
        }
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    /// Add a passenger car on a random route at a random speed between 30 %
    /// and 100 % of the top speed.
    pub fn spawn(&mut self) -> Option<VehicleId> {
        let route = self.rng.choose(&self.routes)?.clone();
        let speed = self.rng.gen_range(MAX_SPEED * 0.3..=MAX_SPEED);
        let id = VehicleId(self.next_vehicle);
        self.next_vehicle += 1;
        self.vehicles.insert(
            id,
            GridVehicle { class: VehicleClass::Passenger, route, leg: 0, offset: 0.0, speed, stopped: false },
        );
        Some(id)
    }

    /// Spawn one or two cars.
    pub fn spawn_wave(&mut self) -> usize {
        let n = self.rng.gen_range(1..=2);
        (0..n).filter_map(|_| self.spawn()).count()
    }

    /// Park an ambulance halfway along `segment`.
    pub fn park_ambulance(&mut self, id: VehicleId, segment: &SegmentId) -> OracleResult<()> {
        let length = self.length(segment)?;
        self.vehicles.insert(
            id,
            GridVehicle {
                class:   VehicleClass::Ambulance,
                route:   vec![segment.clone()],
                leg:     0,
                offset:  length / 2.0,
                speed:   0.0,
                stopped: false,
            },
        );
        Ok(())
    }

    fn length(&self, segment: &SegmentId) -> OracleResult<f64> {
        self.map.length(segment).ok_or_else(|| OracleError::UnknownSegment(segment.clone()))
    }

    fn get(&self, id: VehicleId) -> OracleResult<&GridVehicle> {
        self.vehicles.get(&id).ok_or(OracleError::VehicleGone(id))
    }

    fn get_mut(&mut self, id: VehicleId) -> OracleResult<&mut GridVehicle> {
        self.vehicles.get_mut(&id).ok_or(OracleError::VehicleGone(id))
    }
}

impl TrafficOracle for GridTraffic {
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
        let v = self.get(vehicle)?;
        let segment = v.segment();
        let (from, to) = self
            .map
            .endpoints(segment)
            .ok_or_else(|| OracleError::UnknownSegment(segment.clone()))?;
        let length = from.distance(to);
        Ok(from.lerp(to, (v.offset / length).clamp(0.0, 1.0)))
    }

    fn segment_of(&self, vehicle: VehicleId) -> OracleResult<SegmentId> {
        self.get(vehicle).map(|v| v.segment().clone())
    }

    fn lane_offset_of(&self, vehicle: VehicleId) -> OracleResult<f64> {
        self.get(vehicle).map(|v| v.offset)
    }

    fn route_of(&self, vehicle: VehicleId) -> OracleResult<Vec<SegmentId>> {
        self.get(vehicle).map(|v| v.route[v.leg..].to_vec())
    }

    /// The route must start at the vehicle's current segment, except for a
    /// parked ambulance, which may be sent anywhere and jumps to the new
    /// route's first segment.
    fn set_route(&mut self, vehicle: VehicleId, route: &[SegmentId]) -> OracleResult<()> {
        if let Some(unknown) = route.iter().find(|s| !self.map.contains(s)) {
            return Err(OracleError::UnknownSegment(unknown.clone()));
        }
        let v = self.get_mut(vehicle)?;
        let Some(first) = route.first() else {
            return Err(OracleError::Rejected { vehicle, reason: "empty route".to_owned() });
        };

        if v.class == VehicleClass::Ambulance && v.speed == 0.0 && !v.stopped {
            v.route = route.to_vec();
            v.leg = 0;
            v.offset = 0.0;
            v.speed = AMBULANCE_SPEED;
            return Ok(());
        }
        if first != v.segment() {
            return Err(OracleError::Rejected {
                vehicle,
                reason: format!("route starts at {first}, vehicle is on {}", v.segment()),
            });
        }
        v.route = route.to_vec();
        v.leg = 0;
        Ok(())
    }

    fn set_speed(&mut self, vehicle: VehicleId, speed: f64) -> OracleResult<()> {
        self.get_mut(vehicle)?.speed = speed.max(0.0);
        Ok(())
    }

    fn stop(&mut self, vehicle: VehicleId, segment: &SegmentId, offset: f64) -> OracleResult<()> {
        let v = self.get_mut(vehicle)?;
        if segment != v.segment() {
            return Err(OracleError::Rejected {
                vehicle,
                reason: format!("cannot stop on {segment}, vehicle is on {}", v.segment()),
            });
        }
        v.speed = 0.0;
        v.offset = offset;
        v.stopped = true;
        Ok(())
    }

    fn segment_load(&self, segment: &SegmentId) -> OracleResult<SegmentLoad> {
        if !self.map.contains(segment) {
            return Err(OracleError::UnknownSegment(segment.clone()));
        }
        let speeds: Vec<f64> =
            self.vehicles.values().filter(|v| v.segment() == segment).map(|v| v.speed).collect();
        if speeds.is_empty() {
            return Ok(SegmentLoad::default());
        }
        Ok(SegmentLoad {
            vehicles:   speeds.len(),
            mean_speed: speeds.iter().sum::<f64>() / speeds.len() as f64,
        })
    }

    fn step(&mut self) -> OracleResult<()> {
        self.now = self.now.next();

        let mut arrived = Vec::new();
        for (&id, v) in &mut self.vehicles {
            if v.stopped || v.speed == 0.0 {
                continue;
            }
            v.offset += v.speed;
            loop {
                let length = self.map.length(v.segment()).unwrap_or(0.0);
                if v.offset < length {
                    break;
                }
                if v.leg + 1 == v.route.len() {
                    match v.class {
                        VehicleClass::Passenger => arrived.push(id),
                        // Dispatched ambulances wait at the end of their route.
                        _ => {
                            v.offset = length;
                            v.speed = 0.0;
                            v.stopped = true;
                        }
                    }
                    break;
                }
                v.offset -= length;
                v.leg += 1;
            }
        }
        for id in arrived {
            self.vehicles.remove(&id);
        }
        Ok(())
    }
}
