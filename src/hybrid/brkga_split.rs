//! BRKGA over a giant tour with optimal split decoding.
//!
//! One key per ready delivery; sorting the keys yields a giant tour which the
//! split DP partitions into capacity-feasible sub-tours, one per vehicle in
//! registration order. A chromosome whose tour admits no feasible split gets
//! infinite fitness. When the ready demand overflows the idle fleet, the
//! snapshot's first-fit trim picks the delivery subset to encode so that
//! feasible chromosomes exist at all.
//!
//! Should the best chromosome still decode infeasibly (a heterogeneous-fleet
//! corner the trim cannot see), the tick falls back to the greedy insertion
//! hybrid, which is feasible by construction.

use log::warn;

use crate::brkga::{self, BrkgaParams};
use crate::evaluation::Cost;
use crate::problem::{Deadline, DispatchProblem, DraftPlan};

use super::{greedy_insertion_plan, split_giant_tour};

/// Builds a full tick plan by evolving a giant-tour permutation.
///
/// A fixed `params.seed` reproduces the exact output.
pub fn brkga_split_plan(
    problem: &DispatchProblem,
    params: &BrkgaParams,
    deadline: &Deadline,
) -> DraftPlan {
    let num_vehicles = problem.num_vehicles();
    let (kept, dropped) = problem.feasible_subset();
    if kept.is_empty() || num_vehicles == 0 {
        return DraftPlan {
            routes: vec![Vec::new(); num_vehicles],
            unassigned: problem.order_nodes(),
        };
    }

    let eval_keys = |keys: &[f64]| {
        let tour = brkga::decode_to_sequence(keys, &kept);
        match split_giant_tour(&tour, problem) {
            Some(outcome) => outcome.cost,
            None => Cost::INFEASIBLE,
        }
    };
    let outcome = brkga::evolve(kept.len(), params, deadline, eval_keys);

    let tour = brkga::decode_to_sequence(&outcome.best_keys, &kept);
    let Some(split) = split_giant_tour(&tour, problem) else {
        warn!("giant-tour split infeasible for every chromosome; falling back to greedy insertion");
        return greedy_insertion_plan(problem, deadline);
    };

    let mut routes = vec![Vec::new(); num_vehicles];
    for (r, segment) in split.segments.into_iter().enumerate() {
        routes[r] = segment;
    }

    DraftPlan {
        routes,
        unassigned: dropped,
    }
}
