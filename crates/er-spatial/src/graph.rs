//! Road graph representation and builder.
//!
//! # Data layout
//!
//! The graph is a **segment graph**: every node is a named road segment and a
//! directed link `a → b` means a vehicle leaving segment `a` may enter
//! segment `b`.  The link weight is the cost of traversing `b` (its length).
//! Vehicle positions, routes, destinations and the blocked accident segment
//! are all expressed in the same segment vocabulary, so the reroute search
//! never has to translate between junctions and roads.
//!
//! Nodes are kept in a `BTreeMap` so iteration order is stable across runs;
//! each node's outgoing links keep insertion order.

use std::collections::BTreeMap;

use er_core::SegmentId;

use crate::{SpatialError, SpatialResult};

/// One outgoing link of a segment.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub to:     SegmentId,
    /// Traversal cost, always finite and > 0.
    pub weight: f64,
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Static, weighted, directed adjacency over road segments.
///
/// Immutable once built; shared read-only by the dispatch and reroute
/// stages.  Construct with [`RoadGraphBuilder`].
#[derive(Clone, Debug, Default)]
pub struct RoadGraph {
    adjacency: BTreeMap<SegmentId, Vec<Link>>,
}

impl RoadGraph {
    /// A graph with no segments.  Every reroute against it falls back to the
    /// vehicle's existing route.
    pub fn empty() -> Self {
        Self::default()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn link_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    pub fn contains(&self, segment: &SegmentId) -> bool {
        self.adjacency.contains_key(segment)
    }

    /// Outgoing links of `segment` in insertion order.  Unknown segments
    /// have no links.
    #[inline]
    pub fn neighbors(&self, segment: &SegmentId) -> &[Link] {
        self.adjacency.get(segment).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All segments in ascending name order.
    pub fn nodes(&self) -> impl Iterator<Item = &SegmentId> + '_ {
        self.adjacency.keys()
    }

    /// Weight of the direct link `from → to`, if any.
    pub fn weight(&self, from: &SegmentId, to: &SegmentId) -> Option<f64> {
        self.neighbors(from)
            .iter()
            .find(|l| &l.to == to)
            .map(|l| l.weight)
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use er_spatial::RoadGraphBuilder;
///
/// let mut b = RoadGraphBuilder::new();
/// b.add_road("A", "B", 1.0);
/// b.add_road("B", "C", 1.0);
/// let graph = b.build().unwrap();
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.link_count(), 4); // bidirectional
/// ```
#[derive(Default)]
pub struct RoadGraphBuilder {
    adjacency: BTreeMap<SegmentId, Vec<Link>>,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an isolated segment (no-op if it already exists).
    pub fn add_node(&mut self, segment: impl Into<SegmentId>) {
        self.adjacency.entry(segment.into()).or_default();
    }

    /// Add a **directed** link `from → to`.  Both segments are created if
    /// missing.  Validation happens in [`build`](Self::build).
    pub fn add_link(&mut self, from: impl Into<SegmentId>, to: impl Into<SegmentId>, weight: f64) {
        let to = to.into();
        self.adjacency.entry(to.clone()).or_default();
        self.adjacency
            .entry(from.into())
            .or_default()
            .push(Link { to, weight });
    }

    /// Convenience: add links in **both directions** with the same weight.
    pub fn add_road(&mut self, a: impl Into<SegmentId>, b: impl Into<SegmentId>, weight: f64) {
        let (a, b) = (a.into(), b.into());
        self.add_link(a.clone(), b.clone(), weight);
        self.add_link(b, a, weight);
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Validate weights and uniqueness, then produce the immutable graph.
    pub fn build(self) -> SpatialResult<RoadGraph> {
        for (from, links) in &self.adjacency {
            for (i, link) in links.iter().enumerate() {
                if !(link.weight.is_finite() && link.weight > 0.0) {
                    return Err(SpatialError::InvalidWeight {
                        from:   from.clone(),
                        to:     link.to.clone(),
                        weight: link.weight,
                    });
                }
                if links[..i].iter().any(|earlier| earlier.to == link.to) {
                    return Err(SpatialError::DuplicateLink {
                        from: from.clone(),
                        to:   link.to.clone(),
                    });
                }
            }
        }
        Ok(RoadGraph { adjacency: self.adjacency })
    }
}
