//! Single-vehicle sequencing over a capacity-feasible cluster.
//!
//! - [`cheapest_insertion_route`] — deterministic constructive heuristic
//! - [`brkga_route`] — evolutionary search plus local-search refinement
//!
//! Clusters arrive already capacity-feasible, so the routers only decide the
//! visit order.

mod brkga;
mod cheapest_insertion;

pub use brkga::brkga_route;
pub use cheapest_insertion::cheapest_insertion_route;
