//! Run configuration.
//!
//! `EmergencyConfig` collects every tunable constant of the pipeline.  The
//! `Default` values reproduce the reference scenario (3×3 grid, 200 m radio
//! range).  Applications typically load it from JSON with the `serde` feature
//! enabled and call [`EmergencyConfig::validate`] before building a
//! coordinator.

use crate::{CoreError, CoreResult};

// ── DispatchParams ────────────────────────────────────────────────────────────

/// Genetic-algorithm parameters for ambulance selection.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DispatchParams {
    /// Individuals per generation.
    pub population_size: usize,
    /// Number of generations evolved before the final pick.
    pub generations: usize,
    /// Individuals sampled per tournament.
    pub tournament_size: usize,
    /// Probability that crossover picks uniformly between both parents.
    pub crossover_rate: f64,
    /// Probability that a child is replaced by a random ambulance.
    pub mutation_rate: f64,
}

impl Default for DispatchParams {
    fn default() -> Self {
        Self {
            population_size: 20,
            generations:     30,
            tournament_size: 3,
            crossover_rate:  0.8,
            mutation_rate:   0.1,
        }
    }
}

// ── RerouteParams ─────────────────────────────────────────────────────────────

/// Ant-colony parameters for the reroute search.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RerouteParams {
    /// Independent ant trials per reroute.
    pub ants: usize,
    /// Maximum steps per trial.
    pub max_hops: usize,
    /// Pheromone exponent.
    pub alpha: f64,
    /// Inverse-weight (visibility) exponent.
    pub beta: f64,
    /// Evaporation factor ρ applied on every deposit.
    pub evaporation: f64,
    /// Deposit Δ added to each visited node after a trial.
    pub deposit: f64,
    /// Starting pheromone on every node.
    pub initial_pheromone: f64,
}

impl Default for RerouteParams {
    fn default() -> Self {
        Self {
            ants:              6,
            max_hops:          20,
            alpha:             1.0,
            beta:              2.0,
            evaporation:       0.1,
            deposit:           0.1,
            initial_pheromone: 1.0,
        }
    }
}

// ── EmergencyConfig ───────────────────────────────────────────────────────────

/// Top-level configuration for one coordinated run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EmergencyConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Two vehicles strictly closer than this (metres) have collided.
    pub collision_distance_m: f64,

    /// Radio range (metres) shared by V2V, V2I and CEN-to-CEN links.
    pub comm_range_m: f64,

    /// Maximum number of vehicle-to-vehicle relays per alert.
    pub max_hop_count: u32,

    /// Minimum ticks between two rebroadcasts of the same accident.
    pub broadcast_interval_ticks: u64,

    /// If `true`, every tracked vehicle also listens to all known accidents
    /// each tick, not only during the periodic broadcast sweep.
    pub listen_every_tick: bool,

    pub dispatch: DispatchParams,
    pub reroute: RerouteParams,
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self {
            seed:                     42,
            collision_distance_m:     7.5,
            comm_range_m:             200.0,
            max_hop_count:            5,
            broadcast_interval_ticks: 10,
            listen_every_tick:        true,
            dispatch:                 DispatchParams::default(),
            reroute:                  RerouteParams::default(),
        }
    }
}

impl EmergencyConfig {
    /// Reject values that would make a stage degenerate (empty populations,
    /// probabilities outside [0, 1], non-positive ranges).
    pub fn validate(&self) -> CoreResult<()> {
        fn check(ok: bool, msg: &str) -> CoreResult<()> {
            if ok { Ok(()) } else { Err(CoreError::Config(msg.to_owned())) }
        }

        check(self.collision_distance_m > 0.0, "collision_distance_m must be > 0")?;
        check(self.comm_range_m > 0.0, "comm_range_m must be > 0")?;

        let d = &self.dispatch;
        check(d.population_size > 0, "dispatch.population_size must be > 0")?;
        check(d.tournament_size > 0, "dispatch.tournament_size must be > 0")?;
        check((0.0..=1.0).contains(&d.crossover_rate), "dispatch.crossover_rate must be in [0, 1]")?;
        check((0.0..=1.0).contains(&d.mutation_rate), "dispatch.mutation_rate must be in [0, 1]")?;

        let r = &self.reroute;
        check(r.ants > 0, "reroute.ants must be > 0")?;
        check(r.max_hops > 0, "reroute.max_hops must be > 0")?;
        check((0.0..=1.0).contains(&r.evaporation), "reroute.evaporation must be in [0, 1]")?;
        check(r.deposit >= 0.0, "reroute.deposit must be >= 0")?;
        check(r.initial_pheromone > 0.0, "reroute.initial_pheromone must be > 0")?;
        Ok(())
    }
}
