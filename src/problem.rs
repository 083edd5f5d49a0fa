//! Per-tick optimizer input.
//!
//! At each decision tick the driver freezes the ready orders, the idle
//! vehicles, and the travel-time matrix into a [`DispatchProblem`] snapshot.
//! Optimizers work on matrix node indices (depot = 0, orders = 1..n) and in
//! minutes relative to the tick; the driver maps node indices back to order
//! ids and relative minutes back to absolute time.
//!
//! Orders are sorted by id during construction, so node-index order equals
//! id-lexicographic order and every "lowest id" tie-break in the optimizers
//! reduces to a "lowest node" comparison.

use std::time::{Duration, Instant};

use crate::distance::TravelMatrix;
use crate::models::Point;

/// A ready order as seen by the optimizers.
#[derive(Debug, Clone)]
pub struct OrderRef {
    /// Opaque order id.
    pub id: String,
    /// Drop-off location.
    pub point: Point,
    /// Capacity units.
    pub size: u32,
    /// Deadline in minutes relative to the decision tick.
    pub deadline: f64,
}

/// An idle vehicle as seen by the optimizers.
#[derive(Debug, Clone, Copy)]
pub struct VehicleSlot {
    /// Vehicle id.
    pub id: usize,
    /// Maximum load in capacity units.
    pub capacity: u32,
}

/// Frozen input for one decision tick.
#[derive(Debug, Clone)]
pub struct DispatchProblem {
    points: Vec<Point>,
    orders: Vec<OrderRef>,
    vehicles: Vec<VehicleSlot>,
    travel: TravelMatrix,
    deadlines: Vec<f64>,
}

impl DispatchProblem {
    /// Builds a snapshot from the depot, the ready orders, and the idle
    /// vehicles (in registration order).
    ///
    /// Orders are sorted by id; `minutes_per_unit` scales coordinate distance
    /// to travel minutes.
    pub fn new(
        depot: Point,
        mut orders: Vec<OrderRef>,
        vehicles: Vec<VehicleSlot>,
        minutes_per_unit: f64,
    ) -> Self {
        orders.sort_by(|a, b| a.id.cmp(&b.id));

        let mut points = Vec::with_capacity(orders.len() + 1);
        points.push(depot);
        points.extend(orders.iter().map(|o| o.point));

        let mut deadlines = Vec::with_capacity(orders.len() + 1);
        deadlines.push(f64::INFINITY);
        deadlines.extend(orders.iter().map(|o| o.deadline));

        let travel = TravelMatrix::from_points(&points, minutes_per_unit);

        Self {
            points,
            orders,
            vehicles,
            travel,
            deadlines,
        }
    }

    /// Number of ready orders.
    pub fn num_orders(&self) -> usize {
        self.orders.len()
    }

    /// Number of idle vehicles.
    pub fn num_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    /// All orders, sorted by id. The order at index `i` is matrix node `i+1`.
    pub fn orders(&self) -> &[OrderRef] {
        &self.orders
    }

    /// Idle vehicles in registration order.
    pub fn vehicles(&self) -> &[VehicleSlot] {
        &self.vehicles
    }

    /// The order behind a matrix node (1..=n).
    pub fn order(&self, node: usize) -> &OrderRef {
        &self.orders[node - 1]
    }

    /// All matrix nodes carrying orders, ascending.
    pub fn order_nodes(&self) -> Vec<usize> {
        (1..=self.orders.len()).collect()
    }

    /// Travel-time matrix (node 0 = depot).
    pub fn travel(&self) -> &TravelMatrix {
        &self.travel
    }

    /// Relative deadlines indexed by matrix node (`deadlines[0]` is +∞).
    pub fn deadlines(&self) -> &[f64] {
        &self.deadlines
    }

    /// Coordinate of a matrix node (0 = depot).
    pub fn point(&self, node: usize) -> Point {
        self.points[node]
    }

    /// Capacity units demanded by a node's order.
    pub fn size(&self, node: usize) -> u32 {
        self.orders[node - 1].size
    }

    /// Summed load of a node sequence.
    pub fn load(&self, seq: &[usize]) -> u64 {
        seq.iter().map(|&n| u64::from(self.size(n))).sum()
    }

    /// Total demand over all ready orders.
    pub fn total_demand(&self) -> u64 {
        self.orders.iter().map(|o| u64::from(o.size)).sum()
    }

    /// Total capacity over all idle vehicles.
    pub fn total_capacity(&self) -> u64 {
        self.vehicles.iter().map(|v| u64::from(v.capacity)).sum()
    }

    /// Euclidean coordinate distance from the depot to a node.
    pub fn depot_distance(&self, node: usize) -> f64 {
        self.points[0].distance_to(&self.points[node])
    }

    /// Selects a capacity-coverable subset of the order nodes.
    ///
    /// First-fit in descending depot-distance order over the idle fleet's
    /// capacities (the same order the greedy sequential clusterer uses).
    /// Returns `(kept, dropped)`, both ascending. `dropped` is empty whenever
    /// a first-fit packing covers everything.
    pub fn feasible_subset(&self) -> (Vec<usize>, Vec<usize>) {
        let mut by_distance = self.order_nodes();
        by_distance.sort_by(|&a, &b| {
            self.depot_distance(b)
                .total_cmp(&self.depot_distance(a))
                .then(a.cmp(&b))
        });

        let mut remaining: Vec<u64> = self
            .vehicles
            .iter()
            .map(|v| u64::from(v.capacity))
            .collect();
        let mut kept = Vec::new();
        let mut dropped = Vec::new();

        for node in by_distance {
            let need = u64::from(self.size(node));
            match remaining.iter_mut().find(|cap| **cap >= need) {
                Some(cap) => {
                    *cap -= need;
                    kept.push(node);
                }
                None => dropped.push(node),
            }
        }

        kept.sort_unstable();
        dropped.sort_unstable();
        (kept, dropped)
    }
}

/// Raw optimizer output for one decision tick, still in matrix-node terms.
///
/// `routes[i]` is the visit sequence proposed for vehicle index `i` (empty
/// when that vehicle stays idle); `unassigned` holds the nodes left in the
/// ready pool. The driver prices the routes, applies the dispatch policy, and
/// maps nodes back to order ids.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftPlan {
    /// Per-vehicle node sequences, aligned with the snapshot's vehicle order.
    pub routes: Vec<Vec<usize>>,
    /// Nodes not dispatched this tick, ascending.
    pub unassigned: Vec<usize>,
}

impl DraftPlan {
    /// Total number of dispatched nodes.
    pub fn num_assigned(&self) -> usize {
        self.routes.iter().map(Vec::len).sum()
    }
}

/// Soft wall-clock budget for one optimizer call.
///
/// Optimizers poll `expired()` at iteration boundaries and return their best
/// feasible solution so far when the budget runs out.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    /// Starts a deadline with the given budget in seconds.
    pub fn after_seconds(secs: f64) -> Self {
        Self {
            start: Instant::now(),
            budget: Duration::from_secs_f64(secs.max(0.0)),
        }
    }

    /// A deadline that never expires (used by tests).
    pub fn unlimited() -> Self {
        Self::after_seconds(f64::from(u32::MAX))
    }

    /// Returns `true` once the budget is exhausted.
    pub fn expired(&self) -> bool {
        self.start.elapsed() >= self.budget
    }
}
