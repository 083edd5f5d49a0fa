//! Departure-time policy.
//!
//! An optimizer decides *what* each vehicle carries and in which order; the
//! dispatch policy decides *when* the vehicle leaves the depot. ASAP departs
//! at the decision tick. JIT delays departure by the route's slack — the
//! smallest margin by which any arrival precedes its deadline — capped by the
//! time until the next decision tick, so waiting can only consolidate with
//! near-future orders and never introduces lateness the ASAP departure would
//! not have had.

use serde::{Deserialize, Serialize};

use crate::evaluation::RouteEval;

/// When a planned route leaves the depot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// Depart at the decision tick.
    Asap,
    /// Delay departure by up to the route's slack, at most one decision
    /// interval.
    Jit,
}

impl DispatchPolicy {
    /// Minutes to hold a planned route at the depot.
    ///
    /// `eval` is the route's evaluation for an ASAP departure (relative time
    /// zero), `deadlines` is indexed by matrix node and aligned with the
    /// tick, and `interval` is the time until the next decision tick.
    pub fn departure_delay(
        &self,
        seq: &[usize],
        eval: &RouteEval,
        deadlines: &[f64],
        interval: f64,
    ) -> f64 {
        match self {
            DispatchPolicy::Asap => 0.0,
            DispatchPolicy::Jit => {
                let slack = seq
                    .iter()
                    .zip(&eval.arrivals)
                    .map(|(&node, &arrival)| deadlines[node] - arrival)
                    .fold(f64::INFINITY, f64::min);
                slack.min(interval).max(0.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::TravelMatrix;
    use crate::evaluation::evaluate_sequence;
    use crate::models::Point;

    fn eval_line(deadlines: &[f64]) -> (Vec<usize>, RouteEval, Vec<f64>) {
        let points = vec![Point::new(0.0, 0.0), Point::new(0.5, 0.0)];
        let tm = TravelMatrix::from_points(&points, 10.0);
        let seq = vec![1];
        let eval = evaluate_sequence(&seq, 0.0, &tm, deadlines);
        (seq, eval, deadlines.to_vec())
    }

    #[test]
    fn test_asap_never_delays() {
        let (seq, eval, dl) = eval_line(&[f64::INFINITY, 30.0]);
        let delay = DispatchPolicy::Asap.departure_delay(&seq, &eval, &dl, 1.0);
        assert_eq!(delay, 0.0);
    }

    #[test]
    fn test_jit_delays_up_to_interval() {
        // Arrival at 5, deadline 30: slack 25, but the next tick is 1 minute
        // away so the delay is capped at 1.
        let (seq, eval, dl) = eval_line(&[f64::INFINITY, 30.0]);
        let delay = DispatchPolicy::Jit.departure_delay(&seq, &eval, &dl, 1.0);
        assert!((delay - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_jit_respects_small_slack() {
        // Arrival at 5, deadline 5.5: slack 0.5 < interval.
        let (seq, eval, dl) = eval_line(&[f64::INFINITY, 5.5]);
        let delay = DispatchPolicy::Jit.departure_delay(&seq, &eval, &dl, 2.0);
        assert!((delay - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_jit_never_delays_late_route() {
        // Already late: slack negative, delay clamps to zero.
        let (seq, eval, dl) = eval_line(&[f64::INFINITY, 2.0]);
        let delay = DispatchPolicy::Jit.departure_delay(&seq, &eval, &dl, 5.0);
        assert_eq!(delay, 0.0);
    }

    #[test]
    fn test_jit_lateness_never_exceeds_asap() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ];
        let tm = TravelMatrix::from_points(&points, 10.0);
        let dl = vec![f64::INFINITY, 25.0, 40.0];
        let seq = vec![1, 2];
        let asap = evaluate_sequence(&seq, 0.0, &tm, &dl);
        let delay = DispatchPolicy::Jit.departure_delay(&seq, &asap, &dl, 10.0);
        let delayed = evaluate_sequence(&seq, delay, &tm, &dl);
        assert!(delayed.penalty <= asap.penalty + 1e-10);
    }
}
