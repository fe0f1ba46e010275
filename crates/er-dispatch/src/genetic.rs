//! Genetic-algorithm ambulance selection.
//!
//! An individual is an index into the candidate list.  Fitness depends only
//! on the candidate, so it is computed once per call and looked up during
//! evolution.
//!
//! # Generation step
//!
//! Each child is bred from two tournament winners.  With probability
//! `crossover_rate` the child copies one parent chosen uniformly, otherwise
//! parent 1.  With probability `mutation_rate` it is then replaced by a
//! uniformly random candidate.
//!
//! # Disqualified candidates
//!
//! A candidate with no known position scores [`UNREACHABLE_FITNESS`].  If
//! the final population's best individual is such a candidate, the best
//! located candidate is returned instead, so any located ambulance always
//! beats an unlocated one.
//!
//! [`UNREACHABLE_FITNESS`]: crate::UNREACHABLE_FITNESS

use log::{debug, info};

use er_core::{DispatchParams, SimRng, VehicleId};

use crate::{AccidentSite, Candidate, DispatchError, DispatchResult, fitness};

/// The ambulance chosen for one accident.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub ambulance: VehicleId,
    pub fitness:   f64,
    /// `true` if the evolved winner was unreachable and the best located
    /// candidate was substituted.
    pub fallback:  bool,
}

#[derive(Clone, Debug, Default)]
pub struct GeneticDispatcher {
    pub params: DispatchParams,
}

impl GeneticDispatcher {
    pub fn new(params: DispatchParams) -> Self {
        Self { params }
    }

    /// Pick the best-suited ambulance for `site` among `candidates`.
    pub fn select(
        &self,
        candidates: &[Candidate],
        site:       &AccidentSite,
        rng:        &mut SimRng,
    ) -> DispatchResult<Selection> {
        if candidates.is_empty() {
            return Err(DispatchError::NoCandidates);
        }
        if candidates.iter().all(|c| c.position.is_none()) {
            return Err(DispatchError::NoReachableAmbulance);
        }

        let scores: Vec<f64> = candidates.iter().map(|c| fitness(c, site)).collect();
        for (c, s) in candidates.iter().zip(&scores) {
            debug!("    candidate {}: fitness {s:.3}", c.id);
        }

        let population = self.evolve(candidates.len(), &scores, rng);
        let winner = first_best(population.iter().copied(), &scores);

        let (index, fallback) = match winner {
            Some(i) if candidates[i].position.is_some() => (i, false),
            _ => {
                let located = (0..candidates.len()).filter(|&i| candidates[i].position.is_some());
                let Some(i) = first_best(located, &scores) else {
                    return Err(DispatchError::NoReachableAmbulance);
                };
                (i, true)
            }
        };

        let selection = Selection { ambulance: candidates[index].id, fitness: scores[index], fallback };
        info!(
            "selected {} (fitness {:.3}{})",
            selection.ambulance,
            selection.fitness,
            if fallback { ", fallback" } else { "" },
        );
        Ok(selection)
    }

    /// Run every generation and return the final population.
    fn evolve(&self, n: usize, scores: &[f64], rng: &mut SimRng) -> Vec<usize> {
        let size = self.params.population_size.max(1);
        let mut population: Vec<usize> = (0..size).map(|_| rng.gen_range(0..n)).collect();

        for generation in 0..self.params.generations {
            let mut next = Vec::with_capacity(size);
            while next.len() < size {
                let p1 = self.tournament(&population, scores, rng);
                let p2 = self.tournament(&population, scores, rng);
                let mut child = if rng.random::<f64>() < self.params.crossover_rate {
                    if rng.gen_bool(0.5) { p1 } else { p2 }
                } else {
                    p1
                };
                if rng.random::<f64>() < self.params.mutation_rate {
                    child = rng.gen_range(0..n);
                }
                next.push(child);
            }
            population = next;

            if log::log_enabled!(log::Level::Debug) {
                if let Some(best) = first_best(population.iter().copied(), scores) {
                    debug!("    generation {generation}: best fitness {:.3}", scores[best]);
                }
            }
        }
        population
    }

    /// Sample `tournament_size` individuals with replacement; a challenger
    /// replaces the current best only if strictly fitter.
    fn tournament(&self, population: &[usize], scores: &[f64], rng: &mut SimRng) -> usize {
        let mut best = population[rng.gen_range(0..population.len())];
        for _ in 1..self.params.tournament_size.max(1) {
            let challenger = population[rng.gen_range(0..population.len())];
            if scores[challenger] > scores[best] {
                best = challenger;
            }
        }
        best
    }
}

/// First index with the maximal score.
fn first_best(indices: impl Iterator<Item = usize>, scores: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for i in indices {
        if best.is_none_or(|b| scores[i] > scores[b]) {
            best = Some(i);
        }
    }
    best
}
