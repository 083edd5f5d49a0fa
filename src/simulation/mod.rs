//! Discrete-event simulation of the dispatch system.
//!
//! - [`Event`]/[`EventQueue`] — timestamp-ordered event heap
//! - [`Monitor`] — aggregate delivery counters
//! - [`Simulation`] — the driver: ingestion surface, tick loop, decision
//!   logic, and the `routes_update` egress

mod driver;
mod event;
mod monitor;

pub use driver::{RoutesUpdate, Simulation, VehicleSnapshot};
pub use event::{Event, EventKind, EventQueue};
pub use monitor::Monitor;
