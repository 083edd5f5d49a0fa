//! Biased random-key genetic algorithm engine.
//!
//! A chromosome is a vector of real keys in [0, 1). The engine is generic
//! over the decoder: callers supply a pure fitness closure mapping keys to a
//! lexicographic [`Cost`], which lets the same generational loop drive both
//! the per-cluster sequencing router and the giant-tour hybrid.
//!
//! # Generational loop
//!
//! Each generation the population is sorted by `(cost, index)`. The top
//! `elite_fraction` is carried over verbatim, the bottom `mutant_fraction` is
//! replaced by fresh random chromosomes, and the remainder is bred by biased
//! crossover: each key is inherited from a uniformly chosen elite parent with
//! probability `bias`, else from a uniformly chosen non-elite parent.
//!
//! Fitness evaluation across a generation is embarrassingly parallel and runs
//! on the rayon pool; the deterministic `(cost, index)` sort restores a total
//! order afterwards, so a fixed seed reproduces the exact output.
//!
//! # Reference
//!
//! Gonçalves, J.F., Resende, M.G.C. (2011). "Biased random-key genetic
//! algorithms for combinatorial optimization", *Journal of Heuristics* 17,
//! 487-525.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::evaluation::Cost;
use crate::problem::Deadline;

/// Tuning knobs for one BRKGA run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrkgaParams {
    /// Population size.
    pub population_size: usize,
    /// Fraction of the population carried over verbatim each generation.
    pub elite_fraction: f64,
    /// Fraction of the population replaced by fresh random chromosomes.
    pub mutant_fraction: f64,
    /// Probability a child key comes from the elite parent.
    pub bias: f64,
    /// Maximum number of breeding generations.
    pub max_generations: usize,
    /// Stop after this many consecutive generations without improvement.
    pub stall_limit: usize,
    /// PRNG seed; a fixed seed reproduces the exact output.
    pub seed: u64,
}

impl Default for BrkgaParams {
    fn default() -> Self {
        Self {
            population_size: 100,
            elite_fraction: 0.2,
            mutant_fraction: 0.15,
            bias: 0.7,
            max_generations: 100,
            stall_limit: 20,
            seed: 0,
        }
    }
}

impl BrkgaParams {
    /// Checks the parameters for internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::NonPositive {
                field: "brkga.population_size",
                value: 0.0,
            });
        }
        if self.max_generations == 0 {
            return Err(ConfigError::NonPositive {
                field: "brkga.max_generations",
                value: 0.0,
            });
        }
        if self.stall_limit == 0 {
            return Err(ConfigError::NonPositive {
                field: "brkga.stall_limit",
                value: 0.0,
            });
        }
        for (field, value) in [
            ("brkga.elite_fraction", self.elite_fraction),
            ("brkga.mutant_fraction", self.mutant_fraction),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(ConfigError::InvalidFraction { field, value });
            }
        }
        if !(0.0..=1.0).contains(&self.bias) {
            return Err(ConfigError::InvalidFraction {
                field: "brkga.bias",
                value: self.bias,
            });
        }
        let sum = self.elite_fraction + self.mutant_fraction;
        if sum >= 1.0 {
            return Err(ConfigError::DegeneratePopulation { sum });
        }
        Ok(())
    }

    /// Returns a copy with the given seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Derives a per-stream seed from the configured seed.
///
/// Used to give each cluster its own reproducible key stream within one
/// decision tick.
pub fn derive_seed(seed: u64, stream: u64) -> u64 {
    seed.wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Result of one BRKGA run.
#[derive(Debug, Clone)]
pub struct BrkgaOutcome {
    /// Keys of the best chromosome seen.
    pub best_keys: Vec<f64>,
    /// Its cost.
    pub best_cost: Cost,
    /// Breeding generations executed.
    pub generations: usize,
    /// Best-so-far cost after the initial population and each generation.
    pub history: Vec<Cost>,
}

/// Evolves a population of `num_keys`-long chromosomes against `eval`.
///
/// Stops at `max_generations`, at `stall_limit` generations without
/// best-cost improvement, or when the soft `deadline` expires; the best
/// chromosome seen so far is returned in every case.
pub fn evolve<F>(num_keys: usize, params: &BrkgaParams, deadline: &Deadline, eval: F) -> BrkgaOutcome
where
    F: Fn(&[f64]) -> Cost + Sync,
{
    if num_keys == 0 {
        return BrkgaOutcome {
            best_keys: Vec::new(),
            best_cost: Cost::ZERO,
            generations: 0,
            history: vec![Cost::ZERO],
        };
    }

    let pop_size = params.population_size;
    let elite_size = ((pop_size as f64 * params.elite_fraction) as usize).max(1);
    let mutant_size = ((pop_size as f64 * params.mutant_fraction) as usize)
        .max(1)
        .min(pop_size.saturating_sub(elite_size));

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut population: Vec<Vec<f64>> = (0..pop_size)
        .map(|_| (0..num_keys).map(|_| rng.random::<f64>()).collect())
        .collect();

    let mut best_keys = Vec::new();
    let mut best_cost = Cost::INFEASIBLE;
    let mut history = Vec::new();
    let mut stall = 0usize;
    let mut generations = 0usize;

    for gen in 0..=params.max_generations {
        let costs: Vec<Cost> = population.par_iter().map(|c| eval(c)).collect();

        let mut order: Vec<usize> = (0..population.len()).collect();
        order.sort_by(|&a, &b| costs[a].total_cmp(&costs[b]).then(a.cmp(&b)));

        let leader = order[0];
        if costs[leader].improves(&best_cost) || best_keys.is_empty() {
            best_cost = costs[leader];
            best_keys = population[leader].clone();
            stall = 0;
        } else {
            stall += 1;
        }
        history.push(best_cost);
        generations = gen;

        if gen == params.max_generations || stall >= params.stall_limit || deadline.expired() {
            break;
        }

        // Breed the next generation: elites verbatim, then crossover
        // children, then fresh mutants.
        let mut next: Vec<Vec<f64>> = Vec::with_capacity(pop_size);
        for &idx in order.iter().take(elite_size) {
            next.push(population[idx].clone());
        }

        let non_elite = &order[elite_size..];
        while next.len() < pop_size - mutant_size {
            let elite_parent = &population[order[rng.random_range(0..elite_size)]];
            let other: Vec<f64> = if non_elite.is_empty() {
                (0..num_keys).map(|_| rng.random::<f64>()).collect()
            } else {
                population[non_elite[rng.random_range(0..non_elite.len())]].clone()
            };
            let child: Vec<f64> = (0..num_keys)
                .map(|k| {
                    if rng.random::<f64>() < params.bias {
                        elite_parent[k]
                    } else {
                        other[k]
                    }
                })
                .collect();
            next.push(child);
        }
        while next.len() < pop_size {
            next.push((0..num_keys).map(|_| rng.random::<f64>()).collect());
        }

        population = next;
    }

    BrkgaOutcome {
        best_keys,
        best_cost,
        generations,
        history,
    }
}

/// Decodes keys into a visit order: ascending key, ties by position.
///
/// `nodes[i]` is ranked by `keys[i]`; the returned sequence holds the nodes
/// sorted by their key values.
pub fn decode_to_sequence(keys: &[f64], nodes: &[usize]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&a, &b| keys[a].total_cmp(&keys[b]).then(a.cmp(&b)));
    order.into_iter().map(|i| nodes[i]).collect()
}
