//! Single-visit relocation.
//!
//! Removes one visit and reinserts it at every other position, accepting the
//! move when it strictly reduces the lexicographic cost. A special case of
//! Or-opt with segment length 1, kept as its own pass because it is the
//! cheapest operator and often finishes the polishing the longer-segment
//! moves started.

use crate::evaluation::Cost;

/// Applies single-visit relocation under the given cost closure.
///
/// Returns the improved sequence and its cost; never worse than the input.
pub fn relocate_improve<F>(seq: &[usize], eval: &F) -> (Vec<usize>, Cost)
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
        let n = current.len();
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mut candidate = current.clone();
                let node = candidate.remove(i);
                candidate.insert(j, node);
                let cost = eval(&candidate);
                if cost.improves(&best) {
                    current = candidate;
                    best = cost;
                    improved = true;
                }
            }
        }
    }

    (current, best)
}
