//! Global cheapest insertion.
//!
//! # Algorithm
//!
//! Clustering and sequencing fused: every vehicle starts with an empty route,
//! and each round prices inserting every unplaced delivery at every position
//! of every vehicle with remaining capacity. The price of a candidate is the
//! lexicographic difference between the vehicle's route cost after and before
//! the insertion, both from the shared evaluator with departure at the tick.
//! The cheapest `(delivery, vehicle, position)` triple is committed; ties
//! resolve to the lowest node, then the lowest vehicle index, then the lowest
//! position. Rounds continue until nothing fits or the soft deadline expires;
//! the partial plan is feasible either way.

use crate::evaluation::{evaluate_sequence, Cost};
use crate::problem::{Deadline, DispatchProblem, DraftPlan};

/// Builds a full tick plan by global cheapest insertion.
pub fn greedy_insertion_plan(problem: &DispatchProblem, deadline: &Deadline) -> DraftPlan {
    let num_vehicles = problem.num_vehicles();
    let travel = problem.travel();
    let deadlines = problem.deadlines();

    let mut routes: Vec<Vec<usize>> = vec![Vec::new(); num_vehicles];
    let mut route_costs = vec![Cost::ZERO; num_vehicles];
    let mut remaining: Vec<u64> = problem
        .vehicles()
        .iter()
        .map(|v| u64::from(v.capacity))
        .collect();
    let mut unplaced = problem.order_nodes();

    while !unplaced.is_empty() && !deadline.expired() {
        let mut best: Option<(Cost, usize, usize, usize)> = None;

        for &k in &unplaced {
            let need = u64::from(problem.size(k));
            for v in 0..num_vehicles {
                if remaining[v] < need {
                    continue;
                }
                for p in 0..=routes[v].len() {
                    let mut candidate = routes[v].clone();
                    candidate.insert(p, k);
                    let cost = evaluate_sequence(&candidate, 0.0, travel, deadlines).cost();
                    let delta = Cost::new(
                        cost.penalty - route_costs[v].penalty,
                        cost.duration - route_costs[v].duration,
                    );
                    if best.as_ref().map_or(true, |(d, ..)| delta.improves(d)) {
                        best = Some((delta, k, v, p));
                    }
                }
            }
        }

        let Some((_, k, v, p)) = best else {
            break;
        };
        routes[v].insert(p, k);
        remaining[v] -= u64::from(problem.size(k));
        route_costs[v] = evaluate_sequence(&routes[v], 0.0, travel, deadlines).cost();
        unplaced.retain(|&n| n != k);
    }

    DraftPlan {
        routes,
        unassigned: unplaced,
    }
}
