//! grid — emergency-response coordination on a 3×3 road grid.
//!
//! Passenger cars drive random boundary-to-boundary routes across the nine
//! junction grid and collide when they pass too close.  Each crash is
//! alerted to the nearest edge node over multi-hop V2V, the best parked
//! ambulance is dispatched, and nearby drivers are rerouted around the
//! blocked segment.
//!
//! ```text
//! cargo run -p grid                     # default configuration
//! cargo run -p grid -- config.json      # EmergencyConfig as JSON
//! RUST_LOG=debug cargo run -p grid      # relay and broadcast detail
//! ```

mod network;
mod traffic;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;

use er_core::{EmergencyConfig, Tick};
use er_network::{AlertOutcome, BroadcastRecord};
use er_output::{CsvFeedWriter, FeedOutputObserver, FeedWriter};
use er_sim::{
    AccidentRecord, CoordinatorBuilder, CoordinatorObserver, DispatchRecord, RerouteOutcome, RerouteRecord,
    RunStats, TickSummary,
};

use network::{GridMap, ambulances, edge_nodes};
use traffic::GridTraffic;

// ── Constants ─────────────────────────────────────────────────────────────────

const MAX_TICKS:        u64  = 500;
const INITIAL_VEHICLES: usize = 4;
const SPAWN_INTERVAL:   u64  = 20;
const OUTPUT_DIR:       &str = "output/grid";

// ── Observer wrapper to count rows ───────────────────────────────────────────

struct CountingObserver<W: FeedWriter> {
    inner:      FeedOutputObserver<W>,
    accidents:  usize,
    alerts:     usize,
    dispatches: usize,
    reroutes:   usize,
    broadcasts: usize,
    summaries:  usize,
    rejected:   usize,
}

impl<W: FeedWriter> CountingObserver<W> {
    fn new(inner: FeedOutputObserver<W>) -> Self {
        Self { inner, accidents: 0, alerts: 0, dispatches: 0, reroutes: 0, broadcasts: 0, summaries: 0, rejected: 0 }
    }
}

impl<W: FeedWriter> CoordinatorObserver for CountingObserver<W> {
    fn on_accident(&mut self, record: &AccidentRecord) {
        self.accidents += 1;
        println!(
            "[{}] {} between {} and {} at {}",
            record.at, record.accident, record.involved[0], record.involved[1], record.location
        );
        self.inner.on_accident(record);
    }

    fn on_alert(&mut self, tick: Tick, outcome: &AlertOutcome) {
        self.alerts += 1;
        self.inner.on_alert(tick, outcome);
    }

    fn on_dispatch(&mut self, record: &DispatchRecord) {
        self.dispatches += 1;
        self.inner.on_dispatch(record);
    }

    fn on_reroute(&mut self, record: &RerouteRecord) {
        self.reroutes += 1;
        if record.outcome == RerouteOutcome::Rejected {
            self.rejected += 1;
        }
        self.inner.on_reroute(record);
    }

    fn on_broadcast(&mut self, record: &BroadcastRecord) {
        self.broadcasts += 1;
        self.inner.on_broadcast(record);
    }

    fn on_tick_end(&mut self, summary: &TickSummary) {
        self.summaries += 1;
        self.inner.on_tick_end(summary);
    }

    fn on_run_end(&mut self, stats: &RunStats) {
        self.inner.on_run_end(stats);
    }
}

fn load_config() -> Result<EmergencyConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(EmergencyConfig::default());
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let config = serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    info!("loaded configuration from {path}");
    Ok(config)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    let config = load_config()?;
    println!("=== grid — emergency response coordination ===");
    println!(
        "Ticks: {MAX_TICKS}  |  Seed: {}  |  Comm range: {} m  |  Max hops: {}",
        config.seed, config.comm_range_m, config.max_hop_count
    );
    println!();

    // 1. Road grid.
    let map = GridMap::build()?;
    println!("Segment graph: {} segments, {} links", map.graph.node_count(), map.graph.link_count());
    let graph = map.graph.clone();

    // 2. Traffic: parked ambulances plus the first cars.
    let fleet = ambulances()?;
    let mut traffic = GridTraffic::new(map, config.seed);
    println!("Routes: {}", traffic.route_count());
    for amb in &fleet {
        traffic.park_ambulance(amb.id, &amb.anchor)?;
        println!("  {} ({}) parked on {}, readiness {}", amb.name, amb.id, amb.anchor, amb.readiness());
    }
    for _ in 0..INITIAL_VEHICLES {
        traffic.spawn();
    }

    // 3. Edge nodes.
    let nodes = edge_nodes();
    for node in &nodes {
        println!("  {} at {}", node.name, node.position);
    }
    println!();

    // 4. Coordinator.
    let mut coordinator = CoordinatorBuilder::standard(config, traffic)
        .graph(graph)
        .edge_nodes(nodes)
        .ambulances(fleet)
        .build()?;

    // 5. Output.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let writer = CsvFeedWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = CountingObserver::new(FeedOutputObserver::new(writer));

    // 6. Run, topping up traffic every few ticks.
    let t0 = Instant::now();
    for tick in 0..MAX_TICKS {
        if tick > 0 && tick % SPAWN_INTERVAL == 0 {
            coordinator.traffic.spawn_wave();
        }
        coordinator.step(&mut obs)?;
    }
    obs.on_run_end(&coordinator.stats);
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 7. Summary.
    let stats = &coordinator.stats;
    println!();
    println!("Run complete in {:.3} s", elapsed.as_secs_f64());
    println!("  accidents.csv      : {} rows", obs.accidents);
    println!("  alerts.csv         : {} rows", obs.alerts);
    println!("  dispatches.csv     : {} rows", obs.dispatches);
    println!("  reroutes.csv       : {} rows", obs.reroutes);
    println!("  broadcasts.csv     : {} rows", obs.broadcasts);
    println!("  tick_summaries.csv : {} rows", obs.summaries);
    println!();
    println!("Accidents          : {}", stats.accidents);
    println!(
        "Alerts delivered   : {} / {} ({:.1} %)",
        stats.alerts_delivered,
        stats.alerts_delivered + stats.alerts_failed,
        stats.delivery_rate() * 100.0
    );
    println!("Hop histogram      : {:?}", coordinator.alerts.hop_histogram());
    println!("Dispatches         : {}", stats.dispatches);
    println!("Reroutes committed : {}", stats.reroutes_committed);
    println!("Vehicles remaining : {}", coordinator.traffic.vehicle_count());
    println!();

    // 8. Fleet table.
    println!("{:<12} {:<14} {:<9} {:<8}", "Ambulance", "Id", "Anchor", "Deployed");
    println!("{}", "-".repeat(45));
    for amb in coordinator.fleet.iter() {
        println!(
            "{:<12} {:<14} {:<9} {:<8}",
            amb.name,
            amb.id.to_string(),
            amb.anchor.as_str(),
            if amb.deployed { "yes" } else { "no" },
        );
    }

    if obs.rejected > 0 {
        println!("\n{} reroute commands were rejected by the traffic model", obs.rejected);
    }

    Ok(())
}
