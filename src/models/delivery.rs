//! Delivery order type and its status lifecycle.

use serde::{Deserialize, Serialize};

use super::Point;

/// Lifecycle status of a delivery order.
///
/// Transitions are monotone: `Pending → Ready → Dispatched → Delivered`.
/// Attempting to move backwards is an invariant violation and panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Received but still being prepared.
    Pending,
    /// Preparation complete; awaiting dispatch.
    Ready,
    /// On board a vehicle.
    Dispatched,
    /// Handed over to the customer.
    Delivered,
}

/// A delivery order.
///
/// Immutable except for its status and the vehicle assignment tracked while
/// dispatched. Times are absolute simulation minutes.
///
/// # Examples
///
/// ```
/// use dispatch_routing::models::{Delivery, OrderStatus, Point};
///
/// let d = Delivery::new("o-1", Point::new(1.0, 0.0), 3, 5, 60, 100.0);
/// assert_eq!(d.status(), OrderStatus::Pending);
/// assert_eq!(d.ready_time(), 105.0);
/// assert_eq!(d.deadline(), 160.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    id: String,
    point: Point,
    size: u32,
    preparation_minutes: u32,
    service_minutes: u32,
    receipt_time: f64,
    status: OrderStatus,
    assigned_vehicle: Option<usize>,
}

impl Delivery {
    /// Creates a new order in `Pending` status.
    pub fn new(
        id: impl Into<String>,
        point: Point,
        size: u32,
        preparation_minutes: u32,
        service_minutes: u32,
        receipt_time: f64,
    ) -> Self {
        Self {
            id: id.into(),
            point,
            size,
            preparation_minutes,
            service_minutes,
            receipt_time,
            status: OrderStatus::Pending,
            assigned_vehicle: None,
        }
    }

    /// Opaque order id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Drop-off location.
    pub fn point(&self) -> Point {
        self.point
    }

    /// Capacity units this order occupies on a vehicle.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Minutes of preparation after receipt before the order is `Ready`.
    pub fn preparation_minutes(&self) -> u32 {
        self.preparation_minutes
    }

    /// Promised-delivery offset from receipt, in minutes.
    pub fn service_minutes(&self) -> u32 {
        self.service_minutes
    }

    /// Absolute minute the order entered the system.
    pub fn receipt_time(&self) -> f64 {
        self.receipt_time
    }

    /// Absolute minute the order becomes `Ready`.
    pub fn ready_time(&self) -> f64 {
        self.receipt_time + f64::from(self.preparation_minutes)
    }

    /// Absolute deadline: receipt time plus the promised service minutes.
    pub fn deadline(&self) -> f64 {
        self.receipt_time + f64::from(self.service_minutes)
    }

    /// Current lifecycle status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Vehicle currently carrying this order, if dispatched.
    pub fn assigned_vehicle(&self) -> Option<usize> {
        self.assigned_vehicle
    }

    /// Advances the lifecycle status.
    ///
    /// # Panics
    ///
    /// Panics if the transition is not strictly forward; the status lifecycle
    /// is monotone and a backwards move indicates a driver bug.
    pub fn advance_status(&mut self, next: OrderStatus) {
        assert!(
            next > self.status,
            "non-monotone status transition for order {}: {:?} -> {:?}",
            self.id,
            self.status,
            next
        );
        self.status = next;
    }

    /// Records the vehicle taking this order at dispatch.
    pub fn assign_vehicle(&mut self, vehicle_id: usize) {
        self.assigned_vehicle = Some(vehicle_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Delivery {
        Delivery::new("d1", Point::new(1.0, 2.0), 3, 10, 45, 60.0)
    }

    #[test]
    fn test_new_order_is_pending() {
        let d = order();
        assert_eq!(d.status(), OrderStatus::Pending);
        assert_eq!(d.id(), "d1");
        assert_eq!(d.size(), 3);
        assert!(d.assigned_vehicle().is_none());
    }

    #[test]
    fn test_derived_times() {
        let d = order();
        assert_eq!(d.receipt_time(), 60.0);
        assert_eq!(d.ready_time(), 70.0);
        assert_eq!(d.deadline(), 105.0);
    }

    #[test]
    fn test_monotone_transitions() {
        let mut d = order();
        d.advance_status(OrderStatus::Ready);
        d.advance_status(OrderStatus::Dispatched);
        d.advance_status(OrderStatus::Delivered);
        assert_eq!(d.status(), OrderStatus::Delivered);
    }

    #[test]
    fn test_skipping_ready_is_allowed() {
        // Zero preparation: an order may be dispatched from Ready in the same
        // tick it was created, but the transition itself is still forward.
        let mut d = order();
        d.advance_status(OrderStatus::Dispatched);
        assert_eq!(d.status(), OrderStatus::Dispatched);
    }

    #[test]
    #[should_panic(expected = "non-monotone")]
    fn test_backwards_transition_panics() {
        let mut d = order();
        d.advance_status(OrderStatus::Dispatched);
        d.advance_status(OrderStatus::Ready);
    }

    #[test]
    #[should_panic(expected = "non-monotone")]
    fn test_same_status_panics() {
        let mut d = order();
        d.advance_status(OrderStatus::Ready);
        d.advance_status(OrderStatus::Ready);
    }

    #[test]
    fn test_assign_vehicle() {
        let mut d = order();
        d.assign_vehicle(7);
        assert_eq!(d.assigned_vehicle(), Some(7));
    }
}
