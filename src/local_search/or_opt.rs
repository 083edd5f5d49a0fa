//! Intra-route Or-opt improvement.
//!
//! # Algorithm
//!
//! Tries moving contiguous segments of 1, 2, or 3 visits to every other
//! position in the sequence, accepting a move only when it strictly reduces
//! the lexicographic cost. Repeats until no segment move improves.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.

use crate::evaluation::Cost;

/// Maximum relocated segment length.
const MAX_SEGMENT: usize = 3;

/// Applies Or-opt to a visit sequence under the given cost closure.
///
/// Returns the improved sequence and its cost; never worse than the input.
pub fn or_opt_improve<F>(seq: &[usize], eval: &F) -> (Vec<usize>, Cost)
where
    F: Fn(&[usize]) -> Cost,
{
    let mut current = seq.to_vec();
    let mut best = eval(&current);
    if current.len() < 2 {
        return (current, best);
    }

    let mut improved = true;
    while improved {
        improved = false;
        for seg_len in 1..=MAX_SEGMENT.min(current.len() - 1) {
            let n = current.len();
            'segment: for from in 0..=n - seg_len {
                let segment: Vec<usize> = current[from..from + seg_len].to_vec();
                let mut remainder = current.clone();
                remainder.drain(from..from + seg_len);

                for to in 0..=remainder.len() {
                    if to == from {
                        continue;
                    }
                    let mut candidate = remainder.clone();
                    for (k, &node) in segment.iter().enumerate() {
                        candidate.insert(to + k, node);
                    }
                    let cost = eval(&candidate);
                    if cost.improves(&best) {
                        current = candidate;
                        best = cost;
                        improved = true;
                        break 'segment;
                    }
                }
            }
        }
    }

    (current, best)
}
