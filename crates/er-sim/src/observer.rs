//! Coordinator observer trait and the records it receives.

use er_core::{AccidentId, EdgeNodeId, Position, SegmentId, Tick, VehicleId};
use er_network::{AlertOutcome, BroadcastRecord};

use crate::RerouteRecord;

// ── Records ───────────────────────────────────────────────────────────────────

/// A newly detected and (if possible) registered accident.
#[derive(Clone, Debug, PartialEq)]
pub struct AccidentRecord {
    pub accident:      AccidentId,
    pub at:            Tick,
    pub location:      Position,
    pub involved:      [VehicleId; 2],
    pub segment:       Option<SegmentId>,
    /// `None` if registration failed.
    pub registered_by: Option<EdgeNodeId>,
}

/// Result of one dispatch decision.
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchRecord {
    pub accident:  AccidentId,
    pub at:        Tick,
    /// `None` if no ambulance could be chosen.
    pub ambulance: Option<VehicleId>,
    pub fitness:   Option<f64>,
    /// Segment the ambulance was successfully routed to.
    pub routed_to: Option<SegmentId>,
}

/// Counts for one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickSummary {
    pub tick:               Tick,
    /// Ordinary vehicles with a known position.
    pub vehicles:           usize,
    pub new_accidents:      usize,
    pub alerts_delivered:   usize,
    pub alerts_failed:      usize,
    pub dispatches:         usize,
    pub reroutes_committed: usize,
    pub broadcasts:         usize,
}

/// Totals since the coordinator was built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunStats {
    pub ticks:              u64,
    pub accidents:          u64,
    pub alerts_delivered:   u64,
    pub alerts_failed:      u64,
    pub dispatches:         u64,
    pub reroutes_committed: u64,
    pub broadcasts:         u64,
}

impl RunStats {
    pub fn absorb(&mut self, tick: &TickSummary) {
        self.ticks += 1;
        self.accidents += tick.new_accidents as u64;
        self.alerts_delivered += tick.alerts_delivered as u64;
        self.alerts_failed += tick.alerts_failed as u64;
        self.dispatches += tick.dispatches as u64;
        self.reroutes_committed += tick.reroutes_committed as u64;
        self.broadcasts += tick.broadcasts as u64;
    }

    /// Fraction of alerts that reached an edge node; 0 before any alert.
    pub fn delivery_rate(&self) -> f64 {
        let sent = self.alerts_delivered + self.alerts_failed;
        if sent == 0 { 0.0 } else { self.alerts_delivered as f64 / sent as f64 }
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Callbacks invoked by [`Coordinator::step`][crate::Coordinator::step].
///
/// Every method has a no-op default so implementors only override what they
/// care about.  Within a tick the calls arrive in pipeline order: accidents,
/// alerts, dispatches, reroutes, broadcasts, then `on_tick_end`.
///
/// # Example — accident printer
///
/// ```rust,ignore
/// struct Printer;
///
/// impl CoordinatorObserver for Printer {
///     fn on_accident(&mut self, r: &AccidentRecord) {
///         println!("{} at {} involving {:?}", r.accident, r.location, r.involved);
///     }
/// }
/// ```
pub trait CoordinatorObserver {
    fn on_tick_start(&mut self, _tick: Tick) {}

    fn on_accident(&mut self, _record: &AccidentRecord) {}

    fn on_alert(&mut self, _tick: Tick, _outcome: &AlertOutcome) {}

    fn on_dispatch(&mut self, _record: &DispatchRecord) {}

    fn on_reroute(&mut self, _record: &RerouteRecord) {}

    fn on_broadcast(&mut self, _record: &BroadcastRecord) {}

    fn on_tick_end(&mut self, _summary: &TickSummary) {}

    /// Called once by [`Coordinator::run_ticks`][crate::Coordinator::run_ticks]
    /// after its last tick.
    fn on_run_end(&mut self, _stats: &RunStats) {}
}

/// A [`CoordinatorObserver`] that does nothing.
pub struct NoopObserver;

impl CoordinatorObserver for NoopObserver {}

/// Keeps every record in memory.
#[derive(Clone, Debug, Default)]
pub struct FeedRecorder {
    pub accidents:  Vec<AccidentRecord>,
    pub alerts:     Vec<(Tick, AlertOutcome)>,
    pub dispatches: Vec<DispatchRecord>,
    pub reroutes:   Vec<RerouteRecord>,
    pub broadcasts: Vec<BroadcastRecord>,
    pub ticks:      Vec<TickSummary>,
    pub final_stats: Option<RunStats>,
}

impl CoordinatorObserver for FeedRecorder {
    fn on_accident(&mut self, record: &AccidentRecord) {
        self.accidents.push(record.clone());
    }

    fn on_alert(&mut self, tick: Tick, outcome: &AlertOutcome) {
        self.alerts.push((tick, outcome.clone()));
    }

    fn on_dispatch(&mut self, record: &DispatchRecord) {
        self.dispatches.push(record.clone());
    }

    fn on_reroute(&mut self, record: &RerouteRecord) {
        self.reroutes.push(record.clone());
    }

    fn on_broadcast(&mut self, record: &BroadcastRecord) {
        self.broadcasts.push(record.clone());
    }

    fn on_tick_end(&mut self, summary: &TickSummary) {
        self.ticks.push(summary.clone());
    }

    fn on_run_end(&mut self, stats: &RunStats) {
        self.final_stats = Some(stats.clone());
    }
}
