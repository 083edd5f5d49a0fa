//! Error taxonomy.
//!
//! Configuration problems are fatal at startup; solver failures inside the
//! capacitated K-Means assignment step are recovered locally by a greedy
//! fallback; optimizer deadline expiry is not an error at all (best-so-far is
//! returned). Invariant violations are bugs and panic instead of surfacing
//! here.

use thiserror::Error;

/// A fatal configuration problem detected before the simulation starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A numeric field that must be strictly positive was zero or negative.
    #[error("{field} must be positive (got {value})")]
    NonPositive {
        /// Name of the offending configuration field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A fraction field fell outside its allowed range.
    #[error("{field} must lie in [0, 1) (got {value})")]
    InvalidFraction {
        /// Name of the offending configuration field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Elite and mutant fractions together leave no room for crossover.
    #[error("elite_fraction + mutant_fraction must be < 1 (got {sum})")]
    DegeneratePopulation {
        /// Sum of the two fractions.
        sum: f64,
    },

    /// A vehicle was registered with a non-positive capacity.
    #[error("vehicle {id} has non-positive capacity")]
    InvalidVehicle {
        /// The offending vehicle id.
        id: usize,
    },

    /// A vehicle id was registered twice.
    #[error("vehicle {id} is already registered")]
    DuplicateVehicle {
        /// The duplicated vehicle id.
        id: usize,
    },

    /// Vehicles may only be registered before the first event is processed.
    #[error("vehicle {id} registered after simulation start")]
    LateRegistration {
        /// The offending vehicle id.
        id: usize,
    },
}

/// Failure of the exact capacitated-assignment solver.
///
/// Recovered by the caller: the K-Means iteration falls back to sorted-greedy
/// first-fit and the simulation continues.
#[derive(Debug, Error, PartialEq)]
pub enum SolverError {
    /// The branch-and-bound search exhausted its node budget.
    #[error("assignment search exceeded {budget} nodes")]
    NodeBudgetExceeded {
        /// The configured node budget.
        budget: usize,
    },

    /// No capacity-feasible complete assignment exists.
    #[error("no feasible capacitated assignment")]
    Infeasible,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let e = ConfigError::NonPositive {
            field: "optimizer_deadline_s",
            value: 0.0,
        };
        assert!(e.to_string().contains("optimizer_deadline_s"));
    }

    #[test]
    fn test_solver_error_display() {
        let e = SolverError::NodeBudgetExceeded { budget: 1000 };
        assert!(e.to_string().contains("1000"));
        assert_eq!(SolverError::Infeasible, SolverError::Infeasible);
    }
}
