//! `FeedOutputObserver<W>` — bridges `CoordinatorObserver` to a `FeedWriter`.

use std::fmt::Display;

use er_core::Tick;
use er_network::{AlertOutcome, BroadcastRecord};
use er_sim::{AccidentRecord, CoordinatorObserver, DispatchRecord, RerouteRecord, RunStats, TickSummary};

use crate::row::{AccidentRow, AlertRow, BroadcastRow, DispatchRow, RerouteRow, TickSummaryRow};
use crate::writer::FeedWriter;
use crate::{OutputError, OutputResult};

/// A [`CoordinatorObserver`] that writes every feed record to any
/// [`FeedWriter`] backend.
///
/// Errors from the writer are stored internally because observer methods
/// have no return value.  After `run_ticks` returns, check for errors with
/// [`take_error`][Self::take_error].
///
/// Reroutes are buffered and written as one batch when the tick ends.
pub struct FeedOutputObserver<W: FeedWriter> {
    writer:     W,
    reroutes:   Vec<RerouteRow>,
    last_error: Option<OutputError>,
}

impl<W: FeedWriter> FeedOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, reroutes: Vec::new(), last_error: None }
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

fn join<T: Display>(items: &[T]) -> String {
    items.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(" ")
}

impl<W: FeedWriter> CoordinatorObserver for FeedOutputObserver<W> {
    fn on_accident(&mut self, record: &AccidentRecord) {
        let row = AccidentRow {
            accident:      record.accident.0,
            tick:          record.at.0,
            x:             record.location.x,
            y:             record.location.y,
            vehicle_a:     record.involved[0].0,
            vehicle_b:     record.involved[1].0,
            segment:       record.segment.as_ref().map(|s| s.to_string()).unwrap_or_default(),
            registered_by: record.registered_by.map(|n| n.0),
        };
        let result = self.writer.write_accident(&row);
        self.store_err(result);
    }

    fn on_alert(&mut self, tick: Tick, outcome: &AlertOutcome) {
        let path: Vec<u32> = outcome.path.iter().map(|v| v.0).collect();
        let row = AlertRow {
            message:   outcome.message.0,
            accident:  outcome.accident.0,
            tick:      tick.0,
            delivered: outcome.success,
            hop_count: outcome.hop_count,
            path:      join(&path),
            edge_node: outcome.delivered_to.map(|n| n.0),
        };
        let result = self.writer.write_alert(&row);
        self.store_err(result);
    }

    fn on_dispatch(&mut self, record: &DispatchRecord) {
        let row = DispatchRow {
            accident:  record.accident.0,
            tick:      record.at.0,
            ambulance: record.ambulance.map(|a| a.0),
            fitness:   record.fitness,
            routed_to: record.routed_to.as_ref().map(|s| s.to_string()).unwrap_or_default(),
        };
        let result = self.writer.write_dispatch(&row);
        self.store_err(result);
    }

    fn on_reroute(&mut self, record: &RerouteRecord) {
        self.reroutes.push(RerouteRow {
            tick:      record.at.0,
            vehicle:   record.vehicle.0,
            accident:  record.accident.0,
            blocked:   record.blocked.to_string(),
            outcome:   record.outcome.as_str(),
            fallback:  record.fallback,
            old_route: join(&record.old_route),
            new_route: join(&record.new_route),
        });
    }

    fn on_broadcast(&mut self, record: &BroadcastRecord) {
        let row = BroadcastRow {
            tick:              record.at.0,
            accident:          record.accident.0,
            edge_node:         record.from.0,
            nodes_in_range:    record.nodes_in_range.len() as u32,
            vehicles_notified: record.vehicles_notified.len() as u32,
        };
        let result = self.writer.write_broadcast(&row);
        self.store_err(result);
    }

    fn on_tick_end(&mut self, summary: &TickSummary) {
        if !self.reroutes.is_empty() {
            let rows = std::mem::take(&mut self.reroutes);
            let result = self.writer.write_reroutes(&rows);
            self.store_err(result);
        }

        let row = TickSummaryRow {
            tick:               summary.tick.0,
            vehicles:           summary.vehicles as u64,
            new_accidents:      summary.new_accidents as u64,
            alerts_delivered:   summary.alerts_delivered as u64,
            alerts_failed:      summary.alerts_failed as u64,
            dispatches:         summary.dispatches as u64,
            reroutes_committed: summary.reroutes_committed as u64,
            broadcasts:         summary.broadcasts as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_run_end(&mut self, _stats: &RunStats) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
