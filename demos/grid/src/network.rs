//! The 3×3 demo grid.
//!
//! Nine junctions `A`–`I` laid out 100 m apart, twelve two-way roads, and
//! one segment per driving direction (`A_B` and `B_A`).  The segment graph
//! links `X_Y → Y_Z` for every road leaving `Y` except the U-turn back to
//! `X`, weighted by the length of `Y_Z`.
//!
//! ```text
//!   G ── H ── I        y = 200
//!   │    │    │
//!   D ── E ── F        y = 100
//!   │    │    │
//!   A ── B ── C        y = 0
//! ```

use std::collections::BTreeMap;

use er_core::{EdgeNodeId, Position, SegmentId, VehicleId};
use er_dispatch::{Ambulance, DispatchResult};
use er_network::EdgeNode;
use er_spatial::{RoadGraph, RoadGraphBuilder, SpatialResult};

const JUNCTIONS: [(&str, f64, f64); 9] = [
    ("A", 0.0, 0.0),
    ("B", 100.0, 0.0),
    ("C", 200.0, 0.0),
    ("D", 0.0, 100.0),
    ("E", 100.0, 100.0),
    ("F", 200.0, 100.0),
    ("G", 0.0, 200.0),
    ("H", 100.0, 200.0),
    ("I", 200.0, 200.0),
];

const ROADS: [(&str, &str); 12] = [
    ("A", "B"), ("A", "D"),
    ("B", "C"), ("B", "E"),
    ("C", "F"),
    ("D", "E"), ("D", "G"),
    ("E", "F"), ("E", "H"),
    ("F", "I"),
    ("G", "H"),
    ("H", "I"),
];

/// Routes start and end at any junction but the centre one.
const BOUNDARY: [&str; 8] = ["A", "B", "C", "D", "F", "G", "H", "I"];

/// Longest route, counted in junctions.
const MAX_ROUTE_JUNCTIONS: usize = 6;

/// Junction coordinates plus the segment graph built from them.
pub struct GridMap {
    junctions: BTreeMap<String, Position>,
    neighbors: BTreeMap<String, Vec<String>>,
    pub graph: RoadGraph,
}

impl GridMap {
    pub fn build() -> SpatialResult<Self> {
        let junctions: BTreeMap<String, Position> = JUNCTIONS
            .iter()
            .map(|&(name, x, y)| (name.to_owned(), Position::new(x, y)))
            .collect();

        let mut neighbors: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for &(a, b) in &ROADS {
            neighbors.entry(a.to_owned()).or_default().push(b.to_owned());
            neighbors.entry(b.to_owned()).or_default().push(a.to_owned());
        }

        let mut b = RoadGraphBuilder::new();
        for (from, outs) in &neighbors {
            for to in outs {
                let entering = segment(from, to);
                b.add_node(entering.clone());
                for next in &neighbors[to] {
                    if next == from {
                        continue;
                    }
                    let length = junctions[to].distance(junctions[next]);
                    b.add_link(entering.clone(), segment(to, next), length);
                }
            }
        }

        Ok(Self { junctions, neighbors, graph: b.build()? })
    }

    /// Start and end coordinates of a segment, if both junctions exist.
    pub fn endpoints(&self, segment: &SegmentId) -> Option<(Position, Position)> {
        let (from, to) = segment.endpoints();
        Some((*self.junctions.get(from)?, *self.junctions.get(to)?))
    }

    pub fn length(&self, segment: &SegmentId) -> Option<f64> {
        self.endpoints(segment).map(|(a, b)| a.distance(b))
    }

    pub fn contains(&self, segment: &SegmentId) -> bool {
        self.graph.contains(segment)
    }

    /// Every cycle-free boundary-to-boundary route of at most
    /// six junctions, as segment sequences.  Order is deterministic.
    pub fn routes(&self) -> Vec<Vec<SegmentId>> {
        let mut out = Vec::new();
        for start in self.neighbors.keys() {
            self.extend_routes(&mut vec![start.clone()], &mut out);
        }
        out
    }

    fn extend_routes(&self, path: &mut Vec<String>, out: &mut Vec<Vec<SegmentId>>) {
        let Some(last) = path.last().cloned() else {
            return;
        };
        if path.len() > 1 && BOUNDARY.contains(&last.as_str()) {
            out.push(path.windows(2).map(|w| segment(&w[0], &w[1])).collect());
        }
        if path.len() >= MAX_ROUTE_JUNCTIONS {
            return;
        }
        for next in &self.neighbors[&last] {
            if path.contains(next) {
                continue;
            }
            path.push(next.clone());
            self.extend_routes(path, out);
            path.pop();
        }
    }
}

fn segment(from: &str, to: &str) -> SegmentId {
    SegmentId::new(format!("{from}_{to}"))
}

/// The four fixed CENs.
pub fn edge_nodes() -> Vec<EdgeNode> {
    [
        ("EdgeCEN_A", 30.0, 20.0),
        ("EdgeCEN_D", 30.0, 120.0),
        ("EdgeCEN_C", 200.0, 180.0),
        ("EdgeCEN_I", 200.0, 20.0),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (name, x, y))| EdgeNode::new(EdgeNodeId(i as u32), name, Position::new(x, y)))
    .collect()
}

/// First ambulance ID; ordinary vehicles are numbered from zero.
pub const FIRST_AMBULANCE: u32 = 1_000;

/// Three ambulances parked mid-segment on `A_B`, `D_G` and `H_I`.
pub fn ambulances() -> DispatchResult<Vec<Ambulance>> {
    [("ambulance0", 85.0, "A_B"), ("ambulance1", 70.0, "D_G"), ("ambulance2", 90.0, "H_I")]
        .into_iter()
        .enumerate()
        .map(|(i, (name, readiness, anchor))| {
            Ambulance::new(VehicleId(FIRST_AMBULANCE + i as u32), name, readiness, anchor)
        })
        .collect()
}
