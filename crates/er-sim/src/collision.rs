//! Pairwise collision detection with an append-only reported set.

use std::collections::BTreeSet;

use er_core::{AccidentId, Position, VehicleId};

/// A newly detected collision.
#[derive(Clone, Debug, PartialEq)]
pub struct Collision {
    pub accident: AccidentId,
    /// Lower ID first.
    pub pair:     (VehicleId, VehicleId),
    /// Position of `pair.0` at detection.
    pub location: Position,
}

#[derive(Clone, Debug)]
pub struct CollisionRegistry {
    threshold:     f64,
    reported:      BTreeSet<(VehicleId, VehicleId)>,
    next_accident: u32,
}

impl CollisionRegistry {
    /// Vehicles strictly closer than `threshold` metres have collided.
    pub fn new(threshold: f64) -> Self {
        Self { threshold, reported: BTreeSet::new(), next_accident: 1 }
    }

    pub fn reported_count(&self) -> usize {
        self.reported.len()
    }

    pub fn is_reported(&self, a: VehicleId, b: VehicleId) -> bool {
        self.reported.contains(&ordered(a, b))
    }

    /// Find every unreported pair closer than the threshold and assign each a
    /// fresh accident ID.
    ///
    /// Pairs are visited in ascending `(lower, higher)` ID order, so accident
    /// IDs are deterministic for a given snapshot.
    pub fn detect(&mut self, positions: &[(VehicleId, Position)]) -> Vec<Collision> {
        let mut sorted = positions.to_vec();
        sorted.sort_by_key(|&(id, _)| id);

        let mut found = Vec::new();
        for (i, &(a, pa)) in sorted.iter().enumerate() {
            for &(b, pb) in &sorted[i + 1..] {
                if a == b || pa.distance(pb) >= self.threshold {
                    continue;
                }
                if !self.reported.insert((a, b)) {
                    continue;
                }
                let accident = AccidentId(self.next_accident);
                self.next_accident += 1;
                found.push(Collision { accident, pair: (a, b), location: pa });
            }
        }
        found
    }
}

fn ordered(a: VehicleId, b: VehicleId) -> (VehicleId, VehicleId) {
    if a <= b { (a, b) } else { (b, a) }
}
