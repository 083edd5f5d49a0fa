//! Fused clustering-and-sequencing solvers.
//!
//! - [`greedy_insertion_plan`] — global cheapest insertion over every
//!   (delivery, vehicle, position) triple
//! - [`brkga_split_plan`] — BRKGA over a giant tour of all ready deliveries,
//!   decoded by an optimal capacity-constrained split
//! - [`split_giant_tour`] — the split DP itself

mod brkga_split;
mod greedy_insertion;
mod split;

pub use brkga_split::brkga_split_plan;
pub use greedy_insertion::greedy_insertion_plan;
pub use split::{split_giant_tour, SplitOutcome};
