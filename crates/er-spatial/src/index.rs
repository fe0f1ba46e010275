//! Range queries over vehicle positions.
//!
//! An R-tree (via `rstar`) holds one point per relay-capable vehicle.  It is
//! rebuilt from the position snapshot at the start of every tick, then
//! queried once per relay hop to find vehicles within radio range.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use er_core::{Position, VehicleId};

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct VehicleEntry {
    point: [f64; 2],
    id:    VehicleId,
}

impl RTreeObject for VehicleEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for VehicleEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// A vehicle found by a range query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Neighbor {
    pub id:       VehicleId,
    pub position: Position,
    pub distance: f64,
}

// ── VehicleIndex ──────────────────────────────────────────────────────────────

/// Spatial index over one tick's vehicle positions.
pub struct VehicleIndex {
    tree: RTree<VehicleEntry>,
}

impl VehicleIndex {
    /// Bulk-load the index (O(N log N)).
    pub fn build(vehicles: impl IntoIterator<Item = (VehicleId, Position)>) -> Self {
        let entries: Vec<VehicleEntry> = vehicles
            .into_iter()
            .map(|(id, p)| VehicleEntry { point: [p.x, p.y], id })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn empty() -> Self {
        Self { tree: RTree::new() }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Vehicles within `range` metres of `center` (inclusive), nearest
    /// first.  Equal distances are ordered by ascending `VehicleId`.
    pub fn within(&self, center: Position, range: f64) -> Vec<Neighbor> {
        let mut found: Vec<Neighbor> = self
            .tree
            .locate_within_distance([center.x, center.y], range * range)
            .map(|e| {
                let position = Position::new(e.point[0], e.point[1]);
                Neighbor { id: e.id, position, distance: center.distance(position) }
            })
            .filter(|n| n.distance <= range)
            .collect();
        found.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id)));
        found
    }
}
