//! Shared route evaluation.
//!
//! Every optimizer in the crate prices candidate sequences through the same
//! pure evaluator so that their costs are directly comparable.

mod evaluator;

pub use evaluator::{evaluate_sequence, Cost, RouteEval};
