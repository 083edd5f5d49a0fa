//! Cheapest-insertion route construction.
//!
//! # Algorithm
//!
//! Starts the route with the cluster's delivery nearest the depot. Then,
//! until every delivery is placed, evaluates inserting each remaining
//! delivery `k` at each position `p` (the depot bounds both ends) with the
//! classic delta
//!
//! ```text
//! Δ = T[prev, k] + T[k, next] − T[prev, next]
//! ```
//!
//! and commits the cheapest `(k, p)`. Ties keep the lowest node (lowest order
//! id) and, within one delivery, the latest insertion point; the append bias
//! keeps collinear clusters monotone instead of growing backwards from the
//! depot.

use crate::distance::TravelMatrix;

/// Builds a visit sequence for one cluster by cheapest insertion.
///
/// # Examples
///
/// ```
/// use dispatch_routing::distance::TravelMatrix;
/// use dispatch_routing::models::Point;
/// use dispatch_routing::routing::cheapest_insertion_route;
///
/// let points = vec![
///     Point::new(0.0, 0.0),
///     Point::new(1.0, 0.0),
///     Point::new(2.0, 0.0),
///     Point::new(3.0, 0.0),
/// ];
/// let tm = TravelMatrix::from_points(&points, 1.0);
/// assert_eq!(cheapest_insertion_route(&[1, 2, 3], &tm), vec![1, 2, 3]);
/// ```
pub fn cheapest_insertion_route(cluster: &[usize], travel: &TravelMatrix) -> Vec<usize> {
    const DEPOT: usize = 0;

    let Some(first) = travel.nearest(DEPOT, cluster) else {
        return Vec::new();
    };

    let mut route = vec![first];
    let mut remaining: Vec<usize> = cluster.iter().copied().filter(|&n| n != first).collect();
    remaining.sort_unstable();

    while !remaining.is_empty() {
        let mut best_delta = f64::INFINITY;
        let mut best_node = usize::MAX;
        let mut best_pos = 0;

        for &k in &remaining {
            for p in 0..=route.len() {
                let prev = if p == 0 { DEPOT } else { route[p - 1] };
                let next = if p == route.len() { DEPOT } else { route[p] };
                let delta =
                    travel.minutes(prev, k) + travel.minutes(k, next) - travel.minutes(prev, next);
                match delta.total_cmp(&best_delta) {
                    std::cmp::Ordering::Less => {
                        best_delta = delta;
                        best_node = k;
                        best_pos = p;
                    }
                    std::cmp::Ordering::Equal if k == best_node => {
                        best_pos = p;
                    }
                    _ => {}
                }
            }
        }

        route.insert(best_pos, best_node);
        remaining.retain(|&n| n != best_node);
    }

    route
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;

    fn line_matrix(n: usize) -> TravelMatrix {
        let points: Vec<Point> = (0..=n).map(|i| Point::new(i as f64, 0.0)).collect();
        TravelMatrix::from_points(&points, 1.0)
    }

    #[test]
    fn test_empty_cluster() {
        let tm = line_matrix(3);
        assert!(cheapest_insertion_route(&[], &tm).is_empty());
    }

    #[test]
    fn test_single_delivery() {
        let tm = line_matrix(3);
        assert_eq!(cheapest_insertion_route(&[2], &tm), vec![2]);
    }

    #[test]
    fn test_line_is_monotone() {
        let tm = line_matrix(4);
        assert_eq!(cheapest_insertion_route(&[1, 2, 3, 4], &tm), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_input_order_irrelevant() {
        let tm = line_matrix(4);
        assert_eq!(cheapest_insertion_route(&[4, 2, 1, 3], &tm), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_starts_at_nearest() {
        let tm = line_matrix(3);
        assert_eq!(cheapest_insertion_route(&[2, 3], &tm), vec![2, 3]);
    }

    #[test]
    fn test_tie_keeps_lowest_node() {
        // Symmetric pair equidistant from the depot: every insertion of the
        // second delivery ties, so the lowest node leads and the tie lands on
        // the append position.
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(0.0, -1.0),
        ];
        let tm = TravelMatrix::from_points(&points, 1.0);
        assert_eq!(cheapest_insertion_route(&[1, 2], &tm), vec![1, 2]);
    }

    #[test]
    fn test_two_sided_instance() {
        // Deliveries on both sides of the depot; insertion keeps each side
        // contiguous rather than zig-zagging.
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(-1.0, 0.0),
        ];
        let tm = TravelMatrix::from_points(&points, 1.0);
        let route = cheapest_insertion_route(&[1, 2, 3], &tm);
        // Node 3 sits opposite 1 and 2; it must be first or last.
        assert!(route[0] == 3 || route[2] == 3, "route was {route:?}");
    }
}
