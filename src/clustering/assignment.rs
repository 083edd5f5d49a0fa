//! Exact capacitated assignment.
//!
//! Solves the K-Means assignment step as the binary program
//!
//! ```text
//! min  Σᵢⱼ dist[i][j]·xᵢⱼ
//! s.t. Σⱼ xᵢⱼ = 1            ∀ item i
//!      Σᵢ sizeᵢ·xᵢⱼ ≤ capⱼ   ∀ cluster j
//! ```
//!
//! by depth-first branch-and-bound: items are branched in decreasing-size
//! order (big items constrain the packing most), clusters are tried in
//! increasing-distance order, and a suffix sum of per-item minimum distances
//! gives an admissible lower bound for pruning. A node budget bounds the
//! worst case; exhausting it is a [`SolverError`] the caller recovers from
//! with a greedy fallback.
//!
//! With deterministic tie-breaks (lower cluster index on equal distance,
//! lower item index on equal size, first incumbent kept on equal cost) the
//! solver's output is a pure function of its input.

use crate::error::SolverError;

/// Node budget for one solve; enough for the few-hundred-variable instances
/// a decision tick produces.
pub(crate) const NODE_BUDGET: usize = 200_000;

struct Search<'a> {
    dist: &'a [f64],
    num_clusters: usize,
    sizes: &'a [u32],
    order: Vec<usize>,
    suffix_bound: Vec<f64>,
    remaining: Vec<u64>,
    assign: Vec<usize>,
    best_cost: f64,
    best_assign: Option<Vec<usize>>,
    nodes: usize,
    budget: usize,
}

impl Search<'_> {
    fn dist_to(&self, item: usize, cluster: usize) -> f64 {
        self.dist[item * self.num_clusters + cluster]
    }

    fn dfs(&mut self, depth: usize, cost: f64) -> Result<(), SolverError> {
        if depth == self.order.len() {
            if cost < self.best_cost {
                self.best_cost = cost;
                self.best_assign = Some(self.assign.clone());
            }
            return Ok(());
        }
        if cost + self.suffix_bound[depth] >= self.best_cost {
            return Ok(());
        }

        let item = self.order[depth];
        let need = u64::from(self.sizes[item]);

        let mut candidates: Vec<usize> = (0..self.num_clusters).collect();
        candidates.sort_by(|&a, &b| {
            self.dist_to(item, a)
                .total_cmp(&self.dist_to(item, b))
                .then(a.cmp(&b))
        });

        for cluster in candidates {
            if self.remaining[cluster] < need {
                continue;
            }
            self.nodes += 1;
            if self.nodes > self.budget {
                return Err(SolverError::NodeBudgetExceeded {
                    budget: self.budget,
                });
            }

            self.remaining[cluster] -= need;
            self.assign[item] = cluster;
            self.dfs(depth + 1, cost + self.dist_to(item, cluster))?;
            self.remaining[cluster] += need;
        }
        Ok(())
    }
}

/// Solves the capacitated assignment exactly.
///
/// `dist` is row-major `num_items × num_clusters`; `sizes[i]` is item `i`'s
/// demand; `caps[j]` is cluster `j`'s capacity. Returns the cluster index per
/// item.
///
/// # Errors
///
/// [`SolverError::Infeasible`] when no complete assignment fits the
/// capacities, [`SolverError::NodeBudgetExceeded`] when the search is cut
/// off. Callers fall back to a greedy assignment in both cases.
pub fn solve_assignment(
    dist: &[f64],
    sizes: &[u32],
    caps: &[u32],
) -> Result<Vec<usize>, SolverError> {
    let num_items = sizes.len();
    let num_clusters = caps.len();
    assert_eq!(dist.len(), num_items * num_clusters, "distance matrix shape");

    if num_items == 0 {
        return Ok(Vec::new());
    }
    if num_clusters == 0 {
        return Err(SolverError::Infeasible);
    }

    let mut order: Vec<usize> = (0..num_items).collect();
    order.sort_by(|&a, &b| sizes[b].cmp(&sizes[a]).then(a.cmp(&b)));

    // suffix_bound[t] = sum of each still-unassigned item's cheapest cluster,
    // ignoring capacity: an admissible lower bound on the remaining cost.
    let min_dist = |item: usize| {
        (0..num_clusters)
            .map(|j| dist[item * num_clusters + j])
            .fold(f64::INFINITY, f64::min)
    };
    let mut suffix_bound = vec![0.0; num_items + 1];
    for t in (0..num_items).rev() {
        suffix_bound[t] = suffix_bound[t + 1] + min_dist(order[t]);
    }

    let mut search = Search {
        dist,
        num_clusters,
        sizes,
        order,
        suffix_bound,
        remaining: caps.iter().map(|&c| u64::from(c)).collect(),
        assign: vec![0; num_items],
        best_cost: f64::INFINITY,
        best_assign: None,
        nodes: 0,
        budget: NODE_BUDGET,
    };
    search.dfs(0, 0.0)?;

    search.best_assign.ok_or(SolverError::Infeasible)
}
