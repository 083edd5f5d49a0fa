//! Capacitated K-Means clustering.
//!
//! # Algorithm
//!
//! Seeds one centroid per idle vehicle with K-Means++, then iterates
//! {assign, update} until the centroids stabilize:
//!
//! 1. **Assign** — solve the capacitated assignment of deliveries to
//!    centroids exactly (branch-and-bound over the binary assignment matrix,
//!    see [`super::solve_assignment`]); on solver failure fall back to
//!    sorted-greedy first-fit for that iteration.
//! 2. **Update** — move each centroid to the size-weighted mean of its
//!    cluster; empty clusters keep their previous centroid.
//!
//! Stops when the largest centroid shift drops below `tol` or after
//! `max_iters` iterations. Distances are Euclidean on raw coordinates.
//!
//! When the ready demand overflows the idle fleet, the snapshot's first-fit
//! trim picks the subset to cluster and the rest stays in the ready pool.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::Point;
use crate::problem::{Deadline, DispatchProblem};

use super::{solve_assignment, Clustering};

/// Tuning knobs for the capacitated K-Means loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CkmeansParams {
    /// Maximum {assign, update} iterations.
    pub max_iters: usize,
    /// Convergence threshold on the largest centroid shift.
    pub tol: f64,
    /// Seed for the K-Means++ initialization.
    pub seed: u64,
}

impl Default for CkmeansParams {
    fn default() -> Self {
        Self {
            max_iters: 50,
            tol: 1e-4,
            seed: 0,
        }
    }
}

impl CkmeansParams {
    /// Checks the parameters for internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iters == 0 {
            return Err(ConfigError::NonPositive {
                field: "ckmeans.max_iters",
                value: 0.0,
            });
        }
        if self.tol <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "ckmeans.tol",
                value: self.tol,
            });
        }
        Ok(())
    }
}

/// Clusters the snapshot's ready orders around the idle vehicles.
///
/// Cluster `j` is dedicated to vehicle index `j` and respects its capacity.
/// Orders the fleet cannot hold are returned unassigned.
pub fn ckmeans_clustering(
    problem: &DispatchProblem,
    params: &CkmeansParams,
    deadline: &Deadline,
) -> Clustering {
    let num_vehicles = problem.num_vehicles();
    let (kept, mut unassigned) = problem.feasible_subset();
    if kept.is_empty() || num_vehicles == 0 {
        return Clustering {
            clusters: vec![Vec::new(); num_vehicles],
            unassigned: problem.order_nodes(),
        };
    }

    let points: Vec<Point> = kept.iter().map(|&n| problem.point(n)).collect();
    let sizes: Vec<u32> = kept.iter().map(|&n| problem.size(n)).collect();
    let caps: Vec<u32> = problem.vehicles().iter().map(|v| v.capacity).collect();

    let mut centroids = seed_centroids(&points, num_vehicles, params.seed);
    let mut assign: Vec<Option<usize>> = vec![None; kept.len()];

    for iteration in 0..params.max_iters {
        let dist = distance_grid(&points, &centroids);

        assign = match solve_assignment(&dist, &sizes, &caps) {
            Ok(exact) => exact.into_iter().map(Some).collect(),
            Err(err) => {
                warn!("ckmeans assignment fell back to greedy first-fit: {err}");
                greedy_assignment(&dist, &sizes, &caps)
            }
        };

        let shift = update_centroids(&mut centroids, &points, &sizes, &assign);
        debug!("ckmeans iteration {iteration}: max centroid shift {shift:.6}");
        if shift < params.tol || deadline.expired() {
            break;
        }
    }

    let mut clusters = vec![Vec::new(); num_vehicles];
    for (i, &node) in kept.iter().enumerate() {
        match assign[i] {
            Some(j) => clusters[j].push(node),
            None => unassigned.push(node),
        }
    }
    unassigned.sort_unstable();

    Clustering {
        clusters,
        unassigned,
    }
}

/// K-Means++ seeding over the raw point set, ignoring capacities.
fn seed_centroids(points: &[Point], k: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.random_range(0..points.len())]);

    while centroids.len() < k {
        let weights: Vec<f64> = points
            .iter()
            .map(|p| {
                centroids
                    .iter()
                    .map(|c| {
                        let d = p.distance_to(c);
                        d * d
                    })
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        let total: f64 = weights.iter().sum();

        if total <= 0.0 {
            // Every point coincides with a centroid; cycle through the
            // points so the remaining centroids are still well-defined.
            let idx = centroids.len() % points.len();
            centroids.push(points[idx]);
            continue;
        }

        let mut target = rng.random::<f64>() * total;
        let mut chosen = points.len() - 1;
        for (i, w) in weights.iter().enumerate() {
            if target < *w {
                chosen = i;
                break;
            }
            target -= w;
        }
        centroids.push(points[chosen]);
    }

    centroids
}

/// Row-major point-to-centroid Euclidean distances.
fn distance_grid(points: &[Point], centroids: &[Point]) -> Vec<f64> {
    let mut grid = Vec::with_capacity(points.len() * centroids.len());
    for p in points {
        for c in centroids {
            grid.push(p.distance_to(c));
        }
    }
    grid
}

/// Sorted-greedy first-fit assignment used when the exact solver fails.
///
/// Items in decreasing-size order each take the nearest centroid with enough
/// remaining capacity; items that fit nowhere stay unassigned.
fn greedy_assignment(dist: &[f64], sizes: &[u32], caps: &[u32]) -> Vec<Option<usize>> {
    let k = caps.len();
    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by(|&a, &b| sizes[b].cmp(&sizes[a]).then(a.cmp(&b)));

    let mut remaining: Vec<u64> = caps.iter().map(|&c| u64::from(c)).collect();
    let mut assign = vec![None; sizes.len()];

    for item in order {
        let need = u64::from(sizes[item]);
        let mut clusters: Vec<usize> = (0..k).collect();
        clusters.sort_by(|&a, &b| {
            dist[item * k + a]
                .total_cmp(&dist[item * k + b])
                .then(a.cmp(&b))
        });
        for cluster in clusters {
            if remaining[cluster] >= need {
                remaining[cluster] -= need;
                assign[item] = Some(cluster);
                break;
            }
        }
    }

    assign
}

/// Moves centroids to the size-weighted mean of their cluster; returns the
/// largest shift.
fn update_centroids(
    centroids: &mut [Point],
    points: &[Point],
    sizes: &[u32],
    assign: &[Option<usize>],
) -> f64 {
    let mut max_shift = 0.0f64;
    for (j, centroid) in centroids.iter_mut().enumerate() {
        let mut weight = 0.0;
        let mut lng = 0.0;
        let mut lat = 0.0;
        for (i, a) in assign.iter().enumerate() {
            if *a == Some(j) {
                let w = f64::from(sizes[i]);
                weight += w;
                lng += w * points[i].lng;
                lat += w * points[i].lat;
            }
        }
        if weight > 0.0 {
            let updated = Point::new(lng / weight, lat / weight);
            max_shift = max_shift.max(centroid.distance_to(&updated));
            *centroid = updated;
        }
    }
    max_shift
}
