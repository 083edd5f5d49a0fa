//! Simulation driver.
//!
//! Owns the clock, the event queue, and all vehicle/delivery state. Each
//! simulated minute it drains the events that have come due, and on decision
//! ticks it freezes a [`DispatchProblem`] snapshot, runs the configured
//! strategy, applies the dispatch policy, and commits the resulting plan:
//! statuses flip, departure/delivery/return events are scheduled, and a
//! `routes_update` snapshot is queued for the caller.
//!
//! The driver and the optimizers are single-threaded cooperative: the clock
//! never advances while a strategy call runs, so the effects of one tick are
//! fully visible to the next.

use std::collections::HashMap;

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::evaluation::evaluate_sequence;
use crate::models::{Delivery, OrderStatus, PlannedRoute, Point, RoutePlan, Vehicle, VehicleStatus};
use crate::problem::{Deadline, DispatchProblem, OrderRef, VehicleSlot};
use crate::strategy::Strategy;

use super::event::{EventKind, EventQueue};
use super::monitor::Monitor;

/// One vehicle's state inside a [`RoutesUpdate`].
#[derive(Debug, Clone, Serialize)]
pub struct VehicleSnapshot {
    /// Vehicle id.
    pub vehicle_id: usize,
    /// Operational status.
    pub status: VehicleStatus,
    /// Ordered delivery ids of the route in progress.
    pub current_route: Vec<String>,
    /// Absolute minute the vehicle returns, when on route.
    pub route_end_time: Option<f64>,
}

/// Egress payload emitted after every decision tick that mutated a route.
#[derive(Debug, Clone, Serialize)]
pub struct RoutesUpdate {
    /// Tick timestamp in absolute simulation minutes.
    pub timestamp: f64,
    /// All vehicles, in registration order.
    pub vehicles: Vec<VehicleSnapshot>,
}

/// The dispatch simulation.
pub struct Simulation {
    config: SimulationConfig,
    strategy: Strategy,
    depot: Point,
    clock: f64,
    started: bool,
    decision_due: bool,
    vehicles: HashMap<usize, Vehicle>,
    vehicle_order: Vec<usize>,
    deliveries: HashMap<String, Delivery>,
    queue: EventQueue,
    monitor: Monitor,
    updates: Vec<RoutesUpdate>,
}

impl Simulation {
    /// Builds a simulation from a validated configuration.
    pub fn new(config: SimulationConfig, depot: Point) -> Result<Self, ConfigError> {
        let strategy = Strategy::from_config(&config)?;
        let mut queue = EventQueue::new();
        queue.push(0.0, EventKind::DecisionTick);

        Ok(Self {
            config,
            strategy,
            depot,
            clock: 0.0,
            started: false,
            decision_due: false,
            vehicles: HashMap::new(),
            vehicle_order: Vec::new(),
            deliveries: HashMap::new(),
            queue,
            monitor: Monitor::default(),
            updates: Vec::new(),
        })
    }

    /// Current simulation minute.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Aggregate counters.
    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    /// Looks up a vehicle by id.
    pub fn vehicle(&self, id: usize) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    /// All vehicles in registration order.
    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicle_order.iter().map(|id| &self.vehicles[id])
    }

    /// Looks up a delivery by id.
    pub fn delivery(&self, id: &str) -> Option<&Delivery> {
        self.deliveries.get(id)
    }

    /// Drains the `routes_update` payloads produced since the last call.
    pub fn take_updates(&mut self) -> Vec<RoutesUpdate> {
        std::mem::take(&mut self.updates)
    }

    /// Registers a vehicle. Only allowed before the simulation starts.
    pub fn register_vehicle(&mut self, id: usize, capacity: u32) -> Result<(), ConfigError> {
        if self.started {
            return Err(ConfigError::LateRegistration { id });
        }
        if capacity == 0 {
            return Err(ConfigError::InvalidVehicle { id });
        }
        if self.vehicles.contains_key(&id) {
            return Err(ConfigError::DuplicateVehicle { id });
        }
        self.vehicles.insert(id, Vehicle::new(id, capacity));
        self.vehicle_order.push(id);
        Ok(())
    }

    /// Submits an order at the current clock.
    ///
    /// The order becomes `Ready` after its preparation minutes and its
    /// deadline is `service_minutes` after receipt. Duplicate ids are ignored
    /// with a warning.
    pub fn submit_order(
        &mut self,
        id: &str,
        point: Point,
        size: u32,
        preparation_minutes: u32,
        service_minutes: u32,
    ) {
        self.started = true;
        if self.deliveries.contains_key(id) {
            warn!("duplicate order {id} ignored");
            return;
        }

        let delivery = Delivery::new(id, point, size, preparation_minutes, service_minutes, self.clock);
        let ready_at = delivery.ready_time();
        self.deliveries.insert(id.to_string(), delivery);
        self.monitor.record_created();

        self.queue.push(
            self.clock,
            EventKind::OrderReceived {
                order_id: id.to_string(),
            },
        );
        self.queue.push(
            ready_at,
            EventKind::OrderReady {
                order_id: id.to_string(),
            },
        );
        debug!("order {id} received at {:.1}, ready at {ready_at:.1}", self.clock);
    }

    /// Runs ticks until the clock has advanced by `minutes`.
    pub fn advance_time(&mut self, minutes: u32) {
        self.started = true;
        for _ in 0..minutes {
            self.tick();
        }
        self.drain_due();
        if self.decision_due {
            self.decision_due = false;
            self.decide();
        }
    }

    /// Forces a decision tick right now, regardless of the schedule.
    pub fn trigger_decision(&mut self) {
        self.started = true;
        self.drain_due();
        self.decision_due = false;
        self.decide();
    }

    /// Runs the simulation until the clock reaches `end_time`.
    ///
    /// On return the clock equals `end_time` (for integral horizons) and
    /// every event at or before it has been processed.
    pub fn run(&mut self, end_time: f64) {
        self.started = true;
        while self.clock < end_time {
            self.tick();
        }
        self.drain_due();
        if self.decision_due {
            self.decision_due = false;
            self.decide();
        }
    }

    /// One simulated minute: drain due events, maybe decide, advance.
    fn tick(&mut self) {
        self.drain_due();
        if self.decision_due {
            self.decision_due = false;
            self.decide();
        }
        self.clock += 1.0;
    }

    fn drain_due(&mut self) {
        while let Some(event) = self.queue.pop_due(self.clock) {
            self.handle(event.time, event.kind);
        }
    }

    fn handle(&mut self, time: f64, kind: EventKind) {
        match kind {
            EventKind::OrderReceived { order_id } => {
                debug!("[{time:.1}] order {order_id} received");
            }
            EventKind::OrderReady { order_id } => {
                if let Some(delivery) = self.deliveries.get_mut(&order_id) {
                    if delivery.status() == OrderStatus::Pending {
                        delivery.advance_status(OrderStatus::Ready);
                        debug!("[{time:.1}] order {order_id} ready");
                    }
                }
            }
            EventKind::DecisionTick => {
                self.decision_due = true;
                self.queue.push(
                    time + f64::from(self.config.decision_interval_minutes),
                    EventKind::DecisionTick,
                );
            }
            EventKind::VehicleDepart { vehicle_id } => {
                debug!("[{time:.1}] vehicle {vehicle_id} departs");
            }
            EventKind::ExpectedDelivery {
                vehicle_id,
                order_id,
            } => {
                let delivery = self
                    .deliveries
                    .get_mut(&order_id)
                    .unwrap_or_else(|| panic!("delivery event for unknown order {order_id}"));
                delivery.advance_status(OrderStatus::Delivered);
                let lateness = (time - delivery.deadline()).max(0.0);
                self.monitor.record_delivered(lateness);
                debug!(
                    "[{time:.1}] vehicle {vehicle_id} delivered {order_id} (lateness {lateness:.1})"
                );
            }
            EventKind::VehicleReturn { vehicle_id } => {
                let vehicle = self
                    .vehicles
                    .get_mut(&vehicle_id)
                    .unwrap_or_else(|| panic!("return event for unknown vehicle {vehicle_id}"));
                vehicle.return_to_depot();
                debug!("[{time:.1}] vehicle {vehicle_id} back at depot");
            }
        }
    }

    /// Plans and commits routes for the ready orders and idle vehicles.
    fn decide(&mut self) {
        let idle: Vec<VehicleSlot> = self
            .vehicle_order
            .iter()
            .map(|id| &self.vehicles[id])
            .filter(|v| v.is_idle())
            .map(|v| VehicleSlot {
                id: v.id(),
                capacity: v.capacity(),
            })
            .collect();

        let ready: Vec<OrderRef> = self
            .deliveries
            .values()
            .filter(|d| d.status() == OrderStatus::Ready)
            .map(|d| OrderRef {
                id: d.id().to_string(),
                point: d.point(),
                size: d.size(),
                deadline: d.deadline() - self.clock,
            })
            .collect();

        if ready.is_empty() || idle.is_empty() {
            debug!(
                "[{:.1}] no decision: {} ready orders, {} idle vehicles",
                self.clock,
                ready.len(),
                idle.len()
            );
            return;
        }

        // An order larger than every vehicle in the fleet can never be
        // served, even once everyone is back at the depot.
        let fleet_max = self
            .vehicles
            .values()
            .map(Vehicle::capacity)
            .max()
            .unwrap_or(0);
        if ready.iter().any(|o| o.size > fleet_max) {
            warn!("[{:.1}] ready demand contains orders no vehicle can carry", self.clock);
            self.monitor.record_infeasible();
        }

        let problem = DispatchProblem::new(
            self.depot,
            ready,
            idle,
            self.config.minutes_per_unit,
        );
        let deadline = Deadline::after_seconds(self.config.optimizer_deadline_s);
        let draft = self.strategy.plan(&problem, &deadline);

        let interval = f64::from(self.config.decision_interval_minutes);
        let mut plan = RoutePlan::default();
        for (v_idx, seq) in draft.routes.iter().enumerate() {
            if seq.is_empty() {
                continue;
            }
            let asap = evaluate_sequence(seq, 0.0, problem.travel(), problem.deadlines());
            let delay = self
                .config
                .dispatch_policy
                .departure_delay(seq, &asap, problem.deadlines(), interval);
            let eval = if delay > 0.0 {
                evaluate_sequence(seq, delay, problem.travel(), problem.deadlines())
            } else {
                asap
            };

            plan.routes.push(PlannedRoute {
                vehicle_id: problem.vehicles()[v_idx].id,
                sequence: seq.iter().map(|&n| problem.order(n).id.clone()).collect(),
                departure: self.clock + delay,
                arrivals: eval.arrivals.iter().map(|a| self.clock + a).collect(),
                penalty: eval.penalty,
                duration: eval.duration,
            });
        }

        if plan.is_empty() {
            debug!("[{:.1}] strategy dispatched nothing", self.clock);
            return;
        }

        let sizes: HashMap<String, u32> = problem
            .orders()
            .iter()
            .map(|o| (o.id.clone(), o.size))
            .collect();
        let capacities: HashMap<usize, u32> = problem
            .vehicles()
            .iter()
            .map(|v| (v.id, v.capacity))
            .collect();
        plan.assert_valid(&sizes, &capacities);

        self.commit(plan);
    }

    fn commit(&mut self, plan: RoutePlan) {
        info!(
            "[{:.1}] dispatching {} deliveries on {} vehicles via {}",
            self.clock,
            plan.num_deliveries(),
            plan.routes.len(),
            self.strategy
        );

        for route in &plan.routes {
            let vehicle = self
                .vehicles
                .get_mut(&route.vehicle_id)
                .unwrap_or_else(|| panic!("plan for unknown vehicle {}", route.vehicle_id));
            vehicle.depart(route.sequence.clone(), route.return_time());
            self.monitor.record_route_time(route.duration);

            self.queue.push(
                route.departure,
                EventKind::VehicleDepart {
                    vehicle_id: route.vehicle_id,
                },
            );
            for (order_id, &arrival) in route.sequence.iter().zip(&route.arrivals) {
                let delivery = self
                    .deliveries
                    .get_mut(order_id)
                    .unwrap_or_else(|| panic!("plan for unknown order {order_id}"));
                delivery.advance_status(OrderStatus::Dispatched);
                delivery.assign_vehicle(route.vehicle_id);
                self.queue.push(
                    arrival,
                    EventKind::ExpectedDelivery {
                        vehicle_id: route.vehicle_id,
                        order_id: order_id.clone(),
                    },
                );
            }
            self.queue.push(
                route.return_time(),
                EventKind::VehicleReturn {
                    vehicle_id: route.vehicle_id,
                },
            );
        }

        let snapshot = RoutesUpdate {
            timestamp: self.clock,
            vehicles: self
                .vehicle_order
                .iter()
                .map(|id| {
                    let v = &self.vehicles[id];
                    VehicleSnapshot {
                        vehicle_id: v.id(),
                        status: v.status(),
                        current_route: v.current_route().to_vec(),
                        route_end_time: v.route_end_time(),
                    }
                })
                .collect(),
        };
        self.updates.push(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClusteringAlgo, RoutingAlgo, StrategyConfig};

    fn two_stage_greedy() -> SimulationConfig {
        SimulationConfig {
            strategy: StrategyConfig::TwoStage {
                clustering_algo: ClusteringAlgo::GreedySequential,
                routing_algo: RoutingAlgo::CheapestInsertion,
            },
            ..SimulationConfig::default()
        }
    }

    fn sim() -> Simulation {
        Simulation::new(two_stage_greedy(), Point::new(0.0, 0.0)).expect("valid config")
    }

    #[test]
    fn test_register_after_start_rejected() {
        let mut s = sim();
        s.register_vehicle(1, 10).expect("before start");
        s.advance_time(1);
        assert_eq!(
            s.register_vehicle(2, 10),
            Err(ConfigError::LateRegistration { id: 2 })
        );
    }

    #[test]
    fn test_duplicate_vehicle_rejected() {
        let mut s = sim();
        s.register_vehicle(1, 10).expect("first");
        assert_eq!(
            s.register_vehicle(1, 10),
            Err(ConfigError::DuplicateVehicle { id: 1 })
        );
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut s = sim();
        assert_eq!(
            s.register_vehicle(1, 0),
            Err(ConfigError::InvalidVehicle { id: 1 })
        );
    }

    #[test]
    fn test_order_lifecycle_with_preparation() {
        let mut s = sim();
        s.register_vehicle(1, 10).expect("register");
        s.submit_order("a", Point::new(1.0, 0.0), 3, 5, 60);
        assert_eq!(s.delivery("a").expect("exists").status(), OrderStatus::Pending);

        // After 5 minutes of preparation the order is ready and the next
        // decision dispatches it.
        s.advance_time(4);
        assert_eq!(s.delivery("a").expect("exists").status(), OrderStatus::Pending);
        s.advance_time(1);
        assert_eq!(
            s.delivery("a").expect("exists").status(),
            OrderStatus::Dispatched
        );
    }

    #[test]
    fn test_single_delivery_completes() {
        let mut s = sim();
        s.register_vehicle(1, 10).expect("register");
        s.submit_order("a", Point::new(1.0, 0.0), 3, 0, 60);
        s.trigger_decision();

        let v = s.vehicle(1).expect("registered");
        assert_eq!(v.status(), VehicleStatus::OnRoute);
        assert_eq!(v.current_route(), &["a".to_string()]);

        // Arrival at 10, return at 20.
        s.advance_time(10);
        assert_eq!(
            s.delivery("a").expect("exists").status(),
            OrderStatus::Delivered
        );
        s.advance_time(10);
        assert!(s.vehicle(1).expect("registered").is_idle());

        let m = s.monitor();
        assert_eq!(m.created, 1);
        assert_eq!(m.delivered, 1);
        assert_eq!(m.late, 0);
        assert!(m.total_penalty.abs() < 1e-10);
        assert!((m.total_route_time_minutes - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_updates_emitted_on_mutation_only() {
        let mut s = sim();
        s.register_vehicle(1, 10).expect("register");
        s.advance_time(3);
        assert!(s.take_updates().is_empty());

        s.submit_order("a", Point::new(1.0, 0.0), 3, 0, 60);
        s.trigger_decision();
        let updates = s.take_updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].vehicles.len(), 1);
        assert_eq!(updates[0].vehicles[0].current_route, vec!["a".to_string()]);
        assert!(s.take_updates().is_empty());
    }

    #[test]
    fn test_clock_advances_strictly() {
        let mut s = sim();
        let t0 = s.clock();
        s.advance_time(7);
        assert!((s.clock() - t0 - 7.0).abs() < 1e-10);
    }

    #[test]
    fn test_oversized_order_counts_infeasible() {
        let mut s = sim();
        s.register_vehicle(1, 5).expect("register");
        s.submit_order("big", Point::new(1.0, 0.0), 9, 0, 60);
        s.trigger_decision();
        assert!(s.monitor().infeasible >= 1);
        assert_eq!(s.delivery("big").expect("exists").status(), OrderStatus::Ready);
    }

    #[test]
    fn test_busy_fleet_retries_next_tick() {
        let mut s = sim();
        s.register_vehicle(1, 10).expect("register");
        s.submit_order("a", Point::new(1.0, 0.0), 7, 0, 200);
        s.submit_order("b", Point::new(1.5, 0.0), 7, 0, 200);
        s.trigger_decision();

        // Only one fits; the other is ready but not infeasible.
        assert_eq!(s.monitor().infeasible, 0);
        let dispatched = [
            s.delivery("a").expect("a").status(),
            s.delivery("b").expect("b").status(),
        ]
        .iter()
        .filter(|&&st| st == OrderStatus::Dispatched)
        .count();
        assert_eq!(dispatched, 1);

        // Run long enough for the vehicle to return and take the second.
        s.advance_time(120);
        assert_eq!(s.monitor().delivered, 2);
    }
}
