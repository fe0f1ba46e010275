//! CSV output backend.
//!
//! Creates one file per record kind in the configured output directory:
//! `accidents.csv`, `alerts.csv`, `dispatches.csv`, `reroutes.csv`,
//! `broadcasts.csv` and `tick_summaries.csv`.  Optional fields are written
//! as empty cells.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::{AccidentRow, AlertRow, BroadcastRow, DispatchRow, OutputResult, RerouteRow, TickSummaryRow};
use crate::writer::FeedWriter;

/// Writes the accident feed to six CSV files.
pub struct CsvFeedWriter {
    accidents:  Writer<File>,
    alerts:     Writer<File>,
    dispatches: Writer<File>,
    reroutes:   Writer<File>,
    broadcasts: Writer<File>,
    summaries:  Writer<File>,
    finished:   bool,
}

fn open(dir: &Path, name: &str, header: &[&str]) -> OutputResult<Writer<File>> {
    let mut w = Writer::from_path(dir.join(name))?;
    w.write_record(header)?;
    Ok(w)
}

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl CsvFeedWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        Ok(Self {
            accidents: open(dir, "accidents.csv", &[
                "accident", "tick", "x", "y", "vehicle_a", "vehicle_b", "segment", "registered_by",
            ])?,
            alerts: open(dir, "alerts.csv", &[
                "message", "accident", "tick", "delivered", "hop_count", "path", "edge_node",
            ])?,
            dispatches: open(dir, "dispatches.csv", &[
                "accident", "tick", "ambulance", "fitness", "routed_to",
            ])?,
            reroutes: open(dir, "reroutes.csv", &[
                "tick", "vehicle", "accident", "blocked", "outcome", "fallback", "old_route", "new_route",
            ])?,
            broadcasts: open(dir, "broadcasts.csv", &[
                "tick", "accident", "edge_node", "nodes_in_range", "vehicles_notified",
            ])?,
            summaries: open(dir, "tick_summaries.csv", &[
                "tick", "vehicles", "new_accidents", "alerts_delivered", "alerts_failed",
                "dispatches", "reroutes_committed", "broadcasts",
            ])?,
            finished: false,
        })
    }
}

impl FeedWriter for CsvFeedWriter {
    fn write_accident(&mut self, row: &AccidentRow) -> OutputResult<()> {
        self.accidents.write_record(&[
            row.accident.to_string(),
            row.tick.to_string(),
            row.x.to_string(),
            row.y.to_string(),
            row.vehicle_a.to_string(),
            row.vehicle_b.to_string(),
            row.segment.clone(),
            cell(row.registered_by),
        ])?;
        Ok(())
    }

    fn write_alert(&mut self, row: &AlertRow) -> OutputResult<()> {
        self.alerts.write_record(&[
            row.message.to_string(),
            row.accident.to_string(),
            row.tick.to_string(),
            (row.delivered as u8).to_string(),
            row.hop_count.to_string(),
            row.path.clone(),
            cell(row.edge_node),
        ])?;
        Ok(())
    }

    fn write_dispatch(&mut self, row: &DispatchRow) -> OutputResult<()> {
        self.dispatches.write_record(&[
            row.accident.to_string(),
            row.tick.to_string(),
            cell(row.ambulance),
            cell(row.fitness),
            row.routed_to.clone(),
        ])?;
        Ok(())
    }

    fn write_reroutes(&mut self, rows: &[RerouteRow]) -> OutputResult<()> {
        for row in rows {
            self.reroutes.write_record(&[
                row.tick.to_string(),
                row.vehicle.to_string(),
                row.accident.to_string(),
                row.blocked.clone(),
                row.outcome.to_owned(),
                (row.fallback as u8).to_string(),
                row.old_route.clone(),
                row.new_route.clone(),
            ])?;
        }
        Ok(())
    }

    fn write_broadcast(&mut self, row: &BroadcastRow) -> OutputResult<()> {
        self.broadcasts.write_record(&[
            row.tick.to_string(),
            row.accident.to_string(),
            row.edge_node.to_string(),
            row.nodes_in_range.to_string(),
            row.vehicles_notified.to_string(),
        ])?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.vehicles.to_string(),
            row.new_accidents.to_string(),
            row.alerts_delivered.to_string(),
            row.alerts_failed.to_string(),
            row.dispatches.to_string(),
            row.reroutes_committed.to_string(),
            row.broadcasts.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.accidents.flush()?;
        self.alerts.flush()?;
        self.dispatches.flush()?;
        self.reroutes.flush()?;
        self.broadcasts.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
