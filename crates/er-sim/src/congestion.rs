//! Congestion estimates fed into ambulance fitness.

use std::collections::BTreeMap;

use er_core::SegmentId;

use crate::TrafficOracle;

/// Maps a road segment to a congestion score in `[0, 10]`.
///
/// `None` means "no estimate"; the dispatcher then assumes a neutral value.
pub trait CongestionOracle {
    fn congestion(&self, segment: &SegmentId, traffic: &dyn TrafficOracle) -> Option<f64>;
}

// ── FixedCongestion ───────────────────────────────────────────────────────────

/// Constant scores, optionally overridden per segment.
#[derive(Clone, Debug, Default)]
pub struct FixedCongestion {
    pub default:     Option<f64>,
    pub per_segment: BTreeMap<SegmentId, f64>,
}

impl FixedCongestion {
    pub fn new(default: Option<f64>) -> Self {
        Self { default, per_segment: BTreeMap::new() }
    }

    pub fn with(mut self, segment: impl Into<SegmentId>, score: f64) -> Self {
        self.per_segment.insert(segment.into(), score);
        self
    }
}

impl CongestionOracle for FixedCongestion {
    fn congestion(&self, segment: &SegmentId, _traffic: &dyn TrafficOracle) -> Option<f64> {
        self.per_segment.get(segment).copied().or(self.default)
    }
}

// ── FuzzyCongestion ───────────────────────────────────────────────────────────

/// Triangular membership `(a, b, c)`: 0 at `a`, 1 at `b`, 0 at `c`.
/// `a == b` or `b == c` gives a shoulder.
#[derive(Copy, Clone, Debug)]
struct Tri(f64, f64, f64);

impl Tri {
    fn grade(self, x: f64) -> f64 {
        let Tri(a, b, c) = self;
        if x < a || x > c {
            0.0
        } else if x == b {
            1.0
        } else if x < b {
            (x - a) / (b - a)
        } else {
            (c - x) / (c - b)
        }
    }
}

const COUNT_LOW: Tri = Tri(0.0, 0.0, 5.0);
const COUNT_MEDIUM: Tri = Tri(3.0, 7.0, 12.0);
const COUNT_HIGH: Tri = Tri(10.0, 20.0, 20.0);

const SPEED_LOW: Tri = Tri(0.0, 0.0, 5.0);
const SPEED_MEDIUM: Tri = Tri(3.0, 8.0, 12.0);
const SPEED_HIGH: Tri = Tri(10.0, 20.0, 20.0);

const OUT_LOW: Tri = Tri(0.0, 0.0, 3.0);
const OUT_MEDIUM: Tri = Tri(2.0, 5.0, 8.0);
const OUT_HIGH: Tri = Tri(7.0, 10.0, 10.0);

/// (vehicle count, mean speed) ⇒ congestion.
const RULES: [(Tri, Tri, Tri); 6] = [
    (COUNT_HIGH, SPEED_LOW, OUT_HIGH),
    (COUNT_MEDIUM, SPEED_MEDIUM, OUT_MEDIUM),
    (COUNT_LOW, SPEED_HIGH, OUT_LOW),
    (COUNT_HIGH, SPEED_MEDIUM, OUT_MEDIUM),
    (COUNT_MEDIUM, SPEED_LOW, OUT_HIGH),
    (COUNT_LOW, SPEED_LOW, OUT_MEDIUM),
];

/// Both inputs are clamped to this range.
const INPUT_MAX: f64 = 20.0;
/// The output universe is sampled at the integers `0..=OUTPUT_MAX`.
const OUTPUT_MAX: u32 = 10;

/// Mamdani inference over segment load.
///
/// Rule strength is the minimum of the two antecedent grades; each rule
/// clips its consequent at that strength, the clipped sets are combined by
/// maximum, and the result is the centroid over the integer universe
/// `0..=10`.  When no rule fires the estimate is `None`.
#[derive(Copy, Clone, Debug, Default)]
pub struct FuzzyCongestion;

impl FuzzyCongestion {
    pub fn estimate(vehicle_count: f64, mean_speed: f64) -> Option<f64> {
        let count = vehicle_count.clamp(0.0, INPUT_MAX);
        let speed = mean_speed.clamp(0.0, INPUT_MAX);

        let strengths: Vec<(f64, Tri)> = RULES
            .iter()
            .map(|&(c, s, out)| (c.grade(count).min(s.grade(speed)), out))
            .filter(|&(w, _)| w > 0.0)
            .collect();
        if strengths.is_empty() {
            return None;
        }

        let (mut num, mut den) = (0.0, 0.0);
        for u in 0..=OUTPUT_MAX {
            let u = f64::from(u);
            let mu = strengths.iter().map(|&(w, out)| w.min(out.grade(u))).fold(0.0, f64::max);
            num += u * mu;
            den += mu;
        }
        (den > 0.0).then(|| num / den)
    }
}

impl CongestionOracle for FuzzyCongestion {
    fn congestion(&self, segment: &SegmentId, traffic: &dyn TrafficOracle) -> Option<f64> {
        let load = traffic.segment_load(segment).ok()?;
        Self::estimate(load.vehicles as f64, load.mean_speed.max(0.0))
    }
}
