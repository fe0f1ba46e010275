//! The `FeedWriter` trait implemented by all backend writers.

use crate::{AccidentRow, AlertRow, BroadcastRow, DispatchRow, OutputResult, RerouteRow, TickSummaryRow};

/// Trait implemented by the CSV and SQLite feed writers.
///
/// Errors surface through [`FeedOutputObserver::take_error`][crate::FeedOutputObserver::take_error]
/// when the writer is driven by the observer.
pub trait FeedWriter {
    fn write_accident(&mut self, row: &AccidentRow) -> OutputResult<()>;

    fn write_alert(&mut self, row: &AlertRow) -> OutputResult<()>;

    fn write_dispatch(&mut self, row: &DispatchRow) -> OutputResult<()>;

    /// Write every reroute of one tick.
    fn write_reroutes(&mut self, rows: &[RerouteRow]) -> OutputResult<()>;

    fn write_broadcast(&mut self, row: &BroadcastRow) -> OutputResult<()>;

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
