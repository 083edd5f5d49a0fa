//! Local search operators for refining a single visit sequence.
//!
//! - [`two_opt_improve`] — sub-segment reversal
//! - [`or_opt_improve`] — relocation of segments of length 1, 2, 3
//! - [`relocate_improve`] — single-position move
//!
//! All operators score candidates through a caller-supplied cost closure
//! (normally a thin wrapper over the shared route evaluator) and accept a
//! move only when it strictly reduces the lexicographic cost, so the refined
//! sequence never costs more than the input. Arrival times depend on position
//! in the route, which is why moves are re-priced by full evaluation rather
//! than by edge deltas.

mod or_opt;
mod relocate;
mod two_opt;

pub use or_opt::or_opt_improve;
pub use relocate::relocate_improve;
pub use two_opt::two_opt_improve;
