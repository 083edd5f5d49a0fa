//! Vehicle type with capacity and route state.

use serde::{Deserialize, Serialize};

/// Operational status of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    /// Available at the depot.
    Idle,
    /// Executing a route.
    OnRoute,
}

/// A vehicle that departs from and returns to the single depot.
///
/// The depot is not stored in `current_route`; an idle vehicle has an empty
/// route and no end time.
///
/// # Examples
///
/// ```
/// use dispatch_routing::models::{Vehicle, VehicleStatus};
///
/// let mut v = Vehicle::new(1, 10);
/// assert_eq!(v.status(), VehicleStatus::Idle);
///
/// v.depart(vec!["a".into(), "b".into()], 42.0);
/// assert_eq!(v.status(), VehicleStatus::OnRoute);
/// assert_eq!(v.route_end_time(), Some(42.0));
///
/// v.return_to_depot();
/// assert!(v.current_route().is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    id: usize,
    capacity: u32,
    status: VehicleStatus,
    current_route: Vec<String>,
    route_end_time: Option<f64>,
}

impl Vehicle {
    /// Creates an idle vehicle with the given id and capacity.
    pub fn new(id: usize, capacity: u32) -> Self {
        Self {
            id,
            capacity,
            status: VehicleStatus::Idle,
            current_route: Vec::new(),
            route_end_time: None,
        }
    }

    /// Vehicle id.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Maximum load in capacity units.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Current operational status.
    pub fn status(&self) -> VehicleStatus {
        self.status
    }

    /// Returns `true` if the vehicle is available at the depot.
    pub fn is_idle(&self) -> bool {
        self.status == VehicleStatus::Idle
    }

    /// Ordered delivery ids of the route in progress (empty when idle).
    pub fn current_route(&self) -> &[String] {
        &self.current_route
    }

    /// Absolute minute the vehicle returns to the depot, when on route.
    pub fn route_end_time(&self) -> Option<f64> {
        self.route_end_time
    }

    /// Sends the vehicle out on a route.
    ///
    /// # Panics
    ///
    /// Panics if the vehicle is already on route; a double dispatch indicates
    /// a driver bug.
    pub fn depart(&mut self, route: Vec<String>, end_time: f64) {
        assert!(
            self.is_idle(),
            "vehicle {} dispatched while already on route",
            self.id
        );
        self.status = VehicleStatus::OnRoute;
        self.current_route = route;
        self.route_end_time = Some(end_time);
    }

    /// Returns the vehicle to the depot, clearing its route.
    pub fn return_to_depot(&mut self) {
        self.status = VehicleStatus::Idle;
        self.current_route.clear();
        self.route_end_time = None;
    }
}
