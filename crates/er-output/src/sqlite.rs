//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `feed.db` file in the configured output directory with
//! one table per record kind.

use std::path::Path;

use rusqlite::Connection;

use crate::{AccidentRow, AlertRow, BroadcastRow, DispatchRow, OutputResult, RerouteRow, TickSummaryRow};
use crate::writer::FeedWriter;

/// Writes the accident feed to an SQLite database.
pub struct SqliteFeedWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteFeedWriter {
    /// Open (or create) `feed.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("feed.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS accidents (
                 accident      INTEGER PRIMARY KEY,
                 tick          INTEGER NOT NULL,
                 x             REAL    NOT NULL,
                 y             REAL    NOT NULL,
                 vehicle_a     INTEGER NOT NULL,
                 vehicle_b     INTEGER NOT NULL,
                 segment       TEXT    NOT NULL,
                 registered_by INTEGER
             );
             CREATE TABLE IF NOT EXISTS alerts (
                 message   INTEGER PRIMARY KEY,
                 accident  INTEGER NOT NULL,
                 tick      INTEGER NOT NULL,
                 delivered INTEGER NOT NULL,
                 hop_count INTEGER NOT NULL,
                 path      TEXT    NOT NULL,
                 edge_node INTEGER
             );
             CREATE TABLE IF NOT EXISTS dispatches (
                 accident  INTEGER NOT NULL,
                 tick      INTEGER NOT NULL,
                 ambulance INTEGER,
                 fitness   REAL,
                 routed_to TEXT    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS reroutes (
                 tick      INTEGER NOT NULL,
                 vehicle   INTEGER NOT NULL,
                 accident  INTEGER NOT NULL,
                 blocked   TEXT    NOT NULL,
                 outcome   TEXT    NOT NULL,
                 fallback  INTEGER NOT NULL,
                 old_route TEXT    NOT NULL,
                 new_route TEXT    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS broadcasts (
                 tick              INTEGER NOT NULL,
                 accident          INTEGER NOT NULL,
                 edge_node         INTEGER NOT NULL,
                 nodes_in_range    INTEGER NOT NULL,
                 vehicles_notified INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick               INTEGER PRIMARY KEY,
                 vehicles           INTEGER NOT NULL,
                 new_accidents      INTEGER NOT NULL,
                 alerts_delivered   INTEGER NOT NULL,
                 alerts_failed      INTEGER NOT NULL,
                 dispatches         INTEGER NOT NULL,
                 reroutes_committed INTEGER NOT NULL,
                 broadcasts         INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl FeedWriter for SqliteFeedWriter {
    fn write_accident(&mut self, row: &AccidentRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO accidents \
             (accident, tick, x, y, vehicle_a, vehicle_b, segment, registered_by) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                row.accident,
                row.tick,
                row.x,
                row.y,
                row.vehicle_a,
                row.vehicle_b,
                row.segment,
                row.registered_by,
            ],
        )?;
        Ok(())
    }

    fn write_alert(&mut self, row: &AlertRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO alerts \
             (message, accident, tick, delivered, hop_count, path, edge_node) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                row.message,
                row.accident,
                row.tick,
                row.delivered as i64,
                row.hop_count,
                row.path,
                row.edge_node,
            ],
        )?;
        Ok(())
    }

    fn write_dispatch(&mut self, row: &DispatchRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO dispatches (accident, tick, ambulance, fitness, routed_to) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![row.accident, row.tick, row.ambulance, row.fitness, row.routed_to],
        )?;
        Ok(())
    }

    fn write_reroutes(&mut self, rows: &[RerouteRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO reroutes \
                 (tick, vehicle, accident, blocked, outcome, fallback, old_route, new_route) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick,
                    row.vehicle,
                    row.accident,
                    row.blocked,
                    row.outcome,
                    row.fallback as i64,
                    row.old_route,
                    row.new_route,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_broadcast(&mut self, row: &BroadcastRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO broadcasts (tick, accident, edge_node, nodes_in_range, vehicles_notified) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                row.tick,
                row.accident,
                row.edge_node,
                row.nodes_in_range,
                row.vehicles_notified,
            ],
        )?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries \
             (tick, vehicles, new_accidents, alerts_delivered, alerts_failed, \
              dispatches, reroutes_committed, broadcasts) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                row.tick,
                row.vehicles,
                row.new_accidents,
                row.alerts_delivered,
                row.alerts_failed,
                row.dispatches,
                row.reroutes_committed,
                row.broadcasts,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
