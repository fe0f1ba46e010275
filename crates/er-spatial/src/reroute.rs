//! Reroute trait and default ant-colony implementation.
//!
//! # Pluggability
//!
//! Vehicle agents call rerouting via the [`Rerouter`] trait, so applications
//! can swap in a deterministic search without touching the agent logic.  The
//! default [`AntColonyRerouter`] runs a small, fixed number of probabilistic
//! ant walks over the [`RoadGraph`].
//!
//! # Output invariants
//!
//! A successful [`Reroute`] always starts at the vehicle's current segment
//! and never contains the blocked segment.  When no ant reaches the
//! destination the result is the vehicle's existing route with the blocked
//! segment filtered out, which may be disconnected.  That fallback is kept
//! as-is and flagged via [`RouteSource::Fallback`].

use std::collections::HashMap;

use log::debug;

use er_core::{RerouteParams, SegmentId, SimRng};

use crate::graph::{Link, RoadGraph};
use crate::{SpatialError, SpatialResult};

// ── Request / result ──────────────────────────────────────────────────────────

/// Everything a rerouter needs to know about one vehicle.
#[derive(Debug, Clone, Copy)]
pub struct RerouteRequest<'a> {
    pub current:        &'a SegmentId,
    pub destination:    &'a SegmentId,
    pub blocked:        &'a SegmentId,
    /// The vehicle's route before rerouting (used for the fallback).
    pub existing_route: &'a [SegmentId],
}

/// Where a [`Reroute`] came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteSource {
    /// An ant reached the destination; `cost` is the summed link weight.
    Search { cost: f64 },
    /// No ant reached the destination; existing route minus the block.
    Fallback,
}

/// The ordered segments a vehicle should follow after rerouting.
#[derive(Debug, Clone, PartialEq)]
pub struct Reroute {
    pub segments: Vec<SegmentId>,
    pub source:   RouteSource,
}

impl Reroute {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, RouteSource::Fallback)
    }

    /// `true` if committing this route would change anything.
    pub fn differs_from(&self, old: &[SegmentId]) -> bool {
        self.segments.as_slice() != old
    }
}

// ── Rerouter trait ────────────────────────────────────────────────────────────

/// Pluggable reroute engine.
///
/// Randomness comes exclusively from `rng` so a run is reproducible from its
/// seed.
pub trait Rerouter {
    /// Compute a route from `request.current` to `request.destination` that
    /// avoids `request.blocked`.
    ///
    /// Returns [`SpatialError::StartIsBlocked`] if the vehicle is on the
    /// blocked segment itself.
    fn reroute(
        &self,
        graph:   &RoadGraph,
        request: &RerouteRequest<'_>,
        rng:     &mut SimRng,
    ) -> SpatialResult<Reroute>;
}

// ── AntColonyRerouter ─────────────────────────────────────────────────────────

/// Ant-colony style search over the segment graph.
///
/// Each ant walks from the current segment, choosing among unvisited,
/// unblocked neighbors with probability proportional to
/// `pheromone^alpha * (1/weight)^beta`.  After every walk, each visited
/// segment's pheromone becomes `(1 - rho) * p + deposit`, whether or not the
/// ant arrived.  The pheromone table lives only for one call.
#[derive(Debug, Clone, Default)]
pub struct AntColonyRerouter {
    pub params: RerouteParams,
}

/// One ant's walk.
struct Trial {
    visited: Vec<SegmentId>,
    cost:    f64,
}

impl AntColonyRerouter {
    pub fn new(params: RerouteParams) -> Self {
        Self { params }
    }

    fn pheromone(&self, table: &HashMap<SegmentId, f64>, segment: &SegmentId) -> f64 {
        table.get(segment).copied().unwrap_or(self.params.initial_pheromone)
    }

    fn walk(
        &self,
        graph:    &RoadGraph,
        request:  &RerouteRequest<'_>,
        table:    &HashMap<SegmentId, f64>,
        rng:      &mut SimRng,
    ) -> Trial {
        let mut current = request.current.clone();
        let mut trial = Trial { visited: vec![current.clone()], cost: 0.0 };

        for _ in 0..self.params.max_hops {
            let candidates: Vec<&Link> = graph
                .neighbors(&current)
                .iter()
                .filter(|l| &l.to != request.blocked && !trial.visited.contains(&l.to))
                .collect();
            if candidates.is_empty() {
                break;
            }

            let scores: Vec<f64> = candidates
                .iter()
                .map(|l| {
                    let tau = self.pheromone(table, &l.to).powf(self.params.alpha);
                    let eta = (1.0 / l.weight).powf(self.params.beta);
                    tau * eta
                })
                .collect();
            let pick = sample_index(&scores, rng);

            let link = candidates[pick];
            trial.visited.push(link.to.clone());
            trial.cost += link.weight;
            current = link.to.clone();
            if &current == request.destination {
                break;
            }
        }
        trial
    }

    fn deposit(&self, table: &mut HashMap<SegmentId, f64>, visited: &[SegmentId]) {
        let rho = self.params.evaporation;
        for segment in visited {
            let old = self.pheromone(table, segment);
            table.insert(segment.clone(), (1.0 - rho) * old + self.params.deposit);
        }
    }
}

impl Rerouter for AntColonyRerouter {
    fn reroute(
        &self,
        graph:   &RoadGraph,
        request: &RerouteRequest<'_>,
        rng:     &mut SimRng,
    ) -> SpatialResult<Reroute> {
        if request.current == request.blocked {
            return Err(SpatialError::StartIsBlocked(request.blocked.clone()));
        }
        if request.current == request.destination {
            return Ok(Reroute {
                segments: vec![request.current.clone()],
                source:   RouteSource::Search { cost: 0.0 },
            });
        }

        let mut table: HashMap<SegmentId, f64> = graph
            .nodes()
            .map(|s| (s.clone(), self.params.initial_pheromone))
            .collect();

        let mut best: Option<Trial> = None;
        for ant in 0..self.params.ants {
            let trial = self.walk(graph, request, &table, rng);
            let arrived = trial.visited.last() == Some(request.destination);
            debug!(
                "ant {ant}: {} segments, cost {:.1}, arrived={arrived}",
                trial.visited.len(),
                trial.cost,
            );

            self.deposit(&mut table, &trial.visited);

            if arrived && best.as_ref().is_none_or(|b| trial.cost < b.cost) {
                best = Some(trial);
            }
        }

        let (route, source) = match best {
            Some(t) => (t.visited, RouteSource::Search { cost: t.cost }),
            None => {
                let kept = request
                    .existing_route
                    .iter()
                    .filter(|s| *s != request.blocked)
                    .cloned()
                    .collect();
                (kept, RouteSource::Fallback)
            }
        };

        Ok(Reroute {
            segments: normalise(route, request.current, request.blocked),
            source,
        })
    }
}

// ── Internals ─────────────────────────────────────────────────────────────────

/// Inverse-CDF sampling against a single uniform draw.
///
/// Falls back to a uniform pick if every score is zero or non-finite; if
/// floating-point residue leaves the draw above the final cumulative value,
/// the last candidate wins.
fn sample_index(scores: &[f64], rng: &mut SimRng) -> usize {
    let total: f64 = scores.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return rng.gen_range(0..scores.len());
    }
    let r: f64 = rng.random();
    let mut cumulative = 0.0;
    for (i, score) in scores.iter().enumerate() {
        cumulative += score / total;
        if r <= cumulative {
            return i;
        }
    }
    scores.len() - 1
}

/// Prepend `current` if it is not already first, then strip `blocked`.
fn normalise(mut route: Vec<SegmentId>, current: &SegmentId, blocked: &SegmentId) -> Vec<SegmentId> {
    if route.first() != Some(current) {
        route.insert(0, current.clone());
    }
    route.retain(|s| s != blocked);
    route
}
