//! Strongly typed identifier wrappers.
//!
//! Integer IDs are `Copy + Ord + Hash` so they can be used as map keys and
//! sorted collection elements without ceremony.  Ordering is what makes
//! collision detection and relay candidate selection deterministic: every
//! "first found" rule in the pipeline iterates in ascending ID order.
//!
//! Road segments are named (`"A_B"`, `"D_G"`, …) rather than numbered, so
//! [`SegmentId`] wraps a string instead.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// A vehicle known to the traffic oracle (ordinary car or ambulance).
    pub struct VehicleId(u32);
}

typed_id! {
    /// A fixed infrastructure edge node (CEN).
    pub struct EdgeNodeId(u32);
}

typed_id! {
    /// Sequential accident identifier, assigned once per detected collision pair.
    pub struct AccidentId(u32);
}

typed_id! {
    /// Identifier of one alert propagation attempt.  Distinct from the
    /// accident it carries: a later rebroadcast gets a fresh `MessageId`.
    pub struct MessageId(u64);
}

// ── SegmentId ─────────────────────────────────────────────────────────────────

/// Name of a road segment, e.g. `"A_B"` for the segment from junction `A` to
/// junction `B`.
///
/// Segments double as the nodes of the road graph searched by the reroute
/// optimizer.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentId(pub String);

impl SegmentId {
    pub fn new(name: impl Into<String>) -> Self {
        SegmentId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The junctions this segment connects.
    ///
    /// `"A_B"` yields `("A", "B")`.  A name without `_` is treated as a
    /// single-junction segment and yields the name twice.
    pub fn endpoints(&self) -> (&str, &str) {
        match self.0.split_once('_') {
            Some((from, to)) => (from, to),
            None => (self.0.as_str(), self.0.as_str()),
        }
    }

    /// `true` if the two segments have at least one junction in common.
    pub fn shares_endpoint(&self, other: &SegmentId) -> bool {
        let (a0, a1) = self.endpoints();
        let (b0, b1) = other.endpoints();
        a0 == b0 || a0 == b1 || a1 == b0 || a1 == b1
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SegmentId {
    fn from(name: &str) -> Self {
        SegmentId(name.to_owned())
    }
}

impl From<String> for SegmentId {
    fn from(name: String) -> Self {
        SegmentId(name)
    }
}
