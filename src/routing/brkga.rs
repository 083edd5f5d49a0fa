//! BRKGA sequencing for one cluster.
//!
//! Wraps the random-key engine around the shared route evaluator: one key per
//! delivery in the cluster, decoded by ascending key into a visit sequence.
//! The best sequence found is then polished by 2-opt, Or-opt, and relocate,
//! each run to a strict-improvement fixpoint, so the returned cost is never
//! worse than the best chromosome's.

use crate::brkga::{self, BrkgaParams};
use crate::distance::TravelMatrix;
use crate::evaluation::{evaluate_sequence, Cost};
use crate::local_search::{or_opt_improve, relocate_improve, two_opt_improve};
use crate::problem::Deadline;

/// Sequences one cluster's deliveries by BRKGA plus local search.
///
/// `deadlines` is indexed by matrix node and expressed in minutes relative to
/// the decision tick; the route departs the depot at relative time zero. A
/// fixed `params.seed` reproduces the exact output.
pub fn brkga_route(
    cluster: &[usize],
    travel: &TravelMatrix,
    deadlines: &[f64],
    params: &BrkgaParams,
    deadline: &Deadline,
) -> (Vec<usize>, Cost) {
    if cluster.is_empty() {
        return (Vec::new(), Cost::ZERO);
    }
    if cluster.len() == 1 {
        let seq = cluster.to_vec();
        let cost = evaluate_sequence(&seq, 0.0, travel, deadlines).cost();
        return (seq, cost);
    }

    let eval_keys = |keys: &[f64]| {
        let seq = brkga::decode_to_sequence(keys, cluster);
        evaluate_sequence(&seq, 0.0, travel, deadlines).cost()
    };
    let outcome = brkga::evolve(cluster.len(), params, deadline, eval_keys);

    let eval_seq = |seq: &[usize]| evaluate_sequence(seq, 0.0, travel, deadlines).cost();
    let seq = brkga::decode_to_sequence(&outcome.best_keys, cluster);
    let (seq, _) = two_opt_improve(&seq, &eval_seq);
    let (seq, _) = or_opt_improve(&seq, &eval_seq);
    let (seq, cost) = relocate_improve(&seq, &eval_seq);

    (seq, cost)
}
