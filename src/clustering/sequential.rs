//! Greedy sequential clustering.
//!
//! Sorts the ready orders by decreasing depot distance (the farthest, most
//! expensive orders claim space first) and places each in the first vehicle
//! with enough remaining capacity, in registration order. Orders that fit
//! nowhere stay in the ready pool.

use crate::problem::DispatchProblem;

use super::Clustering;

/// First-fit clustering in decreasing depot-distance order.
///
/// Deterministic: distance ties resolve to the lower node (lower order id),
/// and vehicles are scanned in registration order.
pub fn sequential_clustering(problem: &DispatchProblem) -> Clustering {
    let num_vehicles = problem.num_vehicles();
    let mut by_distance = problem.order_nodes();
    by_distance.sort_by(|&a, &b| {
        problem
            .depot_distance(b)
            .total_cmp(&problem.depot_distance(a))
            .then(a.cmp(&b))
    });

    let mut remaining: Vec<u64> = problem
        .vehicles()
        .iter()
        .map(|v| u64::from(v.capacity))
        .collect();
    let mut clusters = vec![Vec::new(); num_vehicles];
    let mut unassigned = Vec::new();

    for node in by_distance {
        let need = u64::from(problem.size(node));
        match remaining.iter().position(|&cap| cap >= need) {
            Some(v) => {
                remaining[v] -= need;
                clusters[v].push(node);
            }
            None => unassigned.push(node),
        }
    }

    unassigned.sort_unstable();
    Clustering {
        clusters,
        unassigned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;
    use crate::problem::{OrderRef, VehicleSlot};

    fn problem(orders: &[(f64, u32)], caps: &[u32]) -> DispatchProblem {
        let orders = orders
            .iter()
            .enumerate()
            .map(|(i, &(lng, size))| OrderRef {
                id: format!("o{i}"),
                point: Point::new(lng, 0.0),
                size,
                deadline: 60.0,
            })
            .collect();
        let vehicles = caps
            .iter()
            .enumerate()
            .map(|(i, &capacity)| VehicleSlot { id: i, capacity })
            .collect();
        DispatchProblem::new(Point::new(0.0, 0.0), orders, vehicles, 1.0)
    }

    #[test]
    fn test_farthest_first() {
        // Orders at distance 1, 2, 3; capacity fits only two per vehicle.
        let p = problem(&[(1.0, 5), (2.0, 5), (3.0, 5)], &[10, 10]);
        let c = sequential_clustering(&p);
        // Farthest (node 3) and next (node 2) fill vehicle 0; node 1 goes to
        // vehicle 1.
        assert_eq!(c.clusters[0], vec![3, 2]);
        assert_eq!(c.clusters[1], vec![1]);
        assert!(c.unassigned.is_empty());
    }

    #[test]
    fn test_unfittable_left_ready() {
        let p = problem(&[(1.0, 7), (2.0, 7)], &[10]);
        let c = sequential_clustering(&p);
        assert_eq!(c.num_assigned(), 1);
        // The farther order (node 2) is placed, the nearer stays ready.
        assert_eq!(c.clusters[0], vec![2]);
        assert_eq!(c.unassigned, vec![1]);
    }

    #[test]
    fn test_oversized_order_skipped() {
        let p = problem(&[(1.0, 20), (2.0, 3)], &[10]);
        let c = sequential_clustering(&p);
        assert_eq!(c.clusters[0], vec![2]);
        assert_eq!(c.unassigned, vec![1]);
    }

    #[test]
    fn test_empty_inputs() {
        let p = problem(&[], &[10]);
        let c = sequential_clustering(&p);
        assert_eq!(c.clusters, vec![Vec::<usize>::new()]);
        assert!(c.unassigned.is_empty());

        let p = problem(&[(1.0, 2)], &[]);
        let c = sequential_clustering(&p);
        assert!(c.clusters.is_empty());
        assert_eq!(c.unassigned, vec![1]);
    }
}
