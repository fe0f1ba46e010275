//! `er-output` — accident feed writers for the emergency coordinator.
//!
//! Two backends are provided:
//!
//! | Feature   | Backend | Files created                                                   |
//! |-----------|---------|-----------------------------------------------------------------|
//! | *(none)*  | CSV     | `accidents.csv`, `alerts.csv`, `dispatches.csv`, `reroutes.csv`, `broadcasts.csv`, `tick_summaries.csv` |
//! | `sqlite`  | SQLite  | `feed.db`                                                       |
//!
//! Both implement [`FeedWriter`] and are driven by [`FeedOutputObserver`],
//! which implements `er_sim::CoordinatorObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use er_output::{CsvFeedWriter, FeedOutputObserver};
//!
//! let writer = CsvFeedWriter::new(Path::new("./output"))?;
//! let mut obs = FeedOutputObserver::new(writer);
//! coordinator.run_ticks(500, &mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvFeedWriter;
pub use error::{OutputError, OutputResult};
pub use observer::FeedOutputObserver;
pub use row::{AccidentRow, AlertRow, BroadcastRow, DispatchRow, RerouteRow, TickSummaryRow};
pub use writer::FeedWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteFeedWriter;
