//! Route plan produced by an optimizer for one decision tick.

use std::collections::{HashMap, HashSet};

/// One vehicle's share of a plan: an ordered delivery sequence, an intended
/// departure minute, and the timing computed by the route evaluator.
#[derive(Debug, Clone)]
pub struct PlannedRoute {
    /// Vehicle executing this route.
    pub vehicle_id: usize,
    /// Ordered delivery ids (depot not included).
    pub sequence: Vec<String>,
    /// Absolute departure minute from the depot.
    pub departure: f64,
    /// Absolute arrival minute per delivery, aligned with `sequence`.
    pub arrivals: Vec<f64>,
    /// Summed lateness over the route, in minutes.
    pub penalty: f64,
    /// Total on-road minutes, depot to depot.
    pub duration: f64,
}

impl PlannedRoute {
    /// Absolute minute the vehicle is back at the depot.
    pub fn return_time(&self) -> f64 {
        self.departure + self.duration
    }
}

/// The full product of one decision tick: zero or more non-empty planned
/// routes. Vehicles absent from the plan stay idle.
#[derive(Debug, Clone, Default)]
pub struct RoutePlan {
    /// Non-empty routes, at most one per vehicle.
    pub routes: Vec<PlannedRoute>,
}

impl RoutePlan {
    /// Returns `true` if no vehicle was given a route.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Total number of deliveries dispatched by this plan.
    pub fn num_deliveries(&self) -> usize {
        self.routes.iter().map(|r| r.sequence.len()).sum()
    }

    /// Checks the plan invariants against the order sizes and vehicle
    /// capacities it was built for.
    ///
    /// # Panics
    ///
    /// Panics if a delivery appears in more than one route, a route exceeds
    /// its vehicle's capacity, or a vehicle appears twice. These must never
    /// occur given correct optimizers; a violation is a bug, not a recoverable
    /// condition.
    pub fn assert_valid(&self, sizes: &HashMap<String, u32>, capacities: &HashMap<usize, u32>) {
        let mut seen_orders = HashSet::new();
        let mut seen_vehicles = HashSet::new();
        for route in &self.routes {
            assert!(
                seen_vehicles.insert(route.vehicle_id),
                "vehicle {} appears in two plan entries",
                route.vehicle_id
            );
            let capacity = capacities
                .get(&route.vehicle_id)
                .copied()
                .unwrap_or_else(|| panic!("plan references unknown vehicle {}", route.vehicle_id));
            let mut load: u64 = 0;
            for id in &route.sequence {
                assert!(
                    seen_orders.insert(id.clone()),
                    "delivery {id} appears in two routes"
                );
                let size = sizes
                    .get(id)
                    .copied()
                    .unwrap_or_else(|| panic!("plan references unknown delivery {id}"));
                load += u64::from(size);
            }
            assert!(
                load <= u64::from(capacity),
                "route for vehicle {} carries {load} over capacity {capacity}",
                route.vehicle_id
            );
        }
    }
}
