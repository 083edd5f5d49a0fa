//! Simulation configuration.
//!
//! A flat serde record with per-algorithm sub-records. The mutually exclusive
//! two-stage / hybrid branches are a tagged enum on `strategy_kind`, so a
//! JSON config reads naturally:
//!
//! ```json
//! {
//!   "strategy_kind": "two_stage",
//!   "clustering_algo": "ckmeans",
//!   "routing_algo": "brkga",
//!   "dispatch_policy": "jit",
//!   "decision_interval_minutes": 1,
//!   "brkga": { "seed": 42 }
//! }
//! ```
//!
//! Every field other than the strategy branch has a default; validation runs
//! once at startup and rejects inconsistent values as fatal
//! [`ConfigError`]s.

use serde::{Deserialize, Serialize};

use crate::brkga::BrkgaParams;
use crate::clustering::CkmeansParams;
use crate::dispatch::DispatchPolicy;
use crate::error::ConfigError;

/// Clustering stage of a two-stage strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusteringAlgo {
    /// Capacitated K-Means (§ exact assignment step).
    Ckmeans,
    /// First-fit in decreasing depot-distance order.
    GreedySequential,
}

/// Routing stage of a two-stage strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingAlgo {
    /// Random-key evolutionary sequencing plus local search.
    Brkga,
    /// Deterministic cheapest insertion.
    CheapestInsertion,
}

/// Fused solver of a hybrid strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HybridAlgo {
    /// Global cheapest insertion over all (delivery, vehicle, position).
    GreedyInsertion,
    /// BRKGA over a giant tour, decoded by the optimal split DP.
    BrkgaSplit,
}

/// The strategy branch: either a clusterer/router pair or a fused hybrid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy_kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Cluster first, then sequence each cluster independently.
    TwoStage {
        /// Which clusterer runs first.
        clustering_algo: ClusteringAlgo,
        /// Which router sequences each cluster.
        routing_algo: RoutingAlgo,
    },
    /// One solver decides assignment and sequencing together.
    Hybrid {
        /// Which fused solver runs.
        hybrid_algo: HybridAlgo,
    },
}

/// Full configuration record for a simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Strategy branch (two-stage or hybrid).
    #[serde(flatten)]
    pub strategy: StrategyConfig,
    /// Departure policy for planned routes.
    #[serde(default = "defaults::dispatch_policy")]
    pub dispatch_policy: DispatchPolicy,
    /// Minutes between decision ticks.
    #[serde(default = "defaults::decision_interval")]
    pub decision_interval_minutes: u32,
    /// BRKGA tuning, shared by the router and the giant-tour hybrid.
    #[serde(default)]
    pub brkga: BrkgaParams,
    /// Capacitated K-Means tuning.
    #[serde(default)]
    pub ckmeans: CkmeansParams,
    /// Soft wall-clock budget per optimizer call, in seconds.
    #[serde(default = "defaults::optimizer_deadline")]
    pub optimizer_deadline_s: f64,
    /// Scale from coordinate distance to travel minutes.
    #[serde(default = "defaults::minutes_per_unit")]
    pub minutes_per_unit: f64,
}

mod defaults {
    use crate::dispatch::DispatchPolicy;

    pub(super) fn dispatch_policy() -> DispatchPolicy {
        DispatchPolicy::Asap
    }

    pub(super) fn decision_interval() -> u32 {
        1
    }

    pub(super) fn optimizer_deadline() -> f64 {
        5.0
    }

    pub(super) fn minutes_per_unit() -> f64 {
        10.0
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyConfig::TwoStage {
                clustering_algo: ClusteringAlgo::Ckmeans,
                routing_algo: RoutingAlgo::Brkga,
            },
            dispatch_policy: defaults::dispatch_policy(),
            decision_interval_minutes: defaults::decision_interval(),
            brkga: BrkgaParams::default(),
            ckmeans: CkmeansParams::default(),
            optimizer_deadline_s: defaults::optimizer_deadline(),
            minutes_per_unit: defaults::minutes_per_unit(),
        }
    }
}

impl SimulationConfig {
    /// Validates the whole record; any violation is fatal at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decision_interval_minutes == 0 {
            return Err(ConfigError::NonPositive {
                field: "decision_interval_minutes",
                value: 0.0,
            });
        }
        if self.optimizer_deadline_s <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "optimizer_deadline_s",
                value: self.optimizer_deadline_s,
            });
        }
        if self.minutes_per_unit <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "minutes_per_unit",
                value: self.minutes_per_unit,
            });
        }
        self.brkga.validate()?;
        self.ckmeans.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validates() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let cfg = SimulationConfig {
            decision_interval_minutes: 0,
            ..SimulationConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_bad_deadline_rejected() {
        let cfg = SimulationConfig {
            optimizer_deadline_s: -1.0,
            ..SimulationConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_two_stage_json_round_trip() {
        let json = r#"{
            "strategy_kind": "two_stage",
            "clustering_algo": "greedy_sequential",
            "routing_algo": "cheapest_insertion",
            "dispatch_policy": "jit",
            "decision_interval_minutes": 5
        }"#;
        let cfg: SimulationConfig = serde_json::from_str(json).expect("parses");
        assert_eq!(
            cfg.strategy,
            StrategyConfig::TwoStage {
                clustering_algo: ClusteringAlgo::GreedySequential,
                routing_algo: RoutingAlgo::CheapestInsertion,
            }
        );
        assert_eq!(cfg.dispatch_policy, DispatchPolicy::Jit);
        assert_eq!(cfg.decision_interval_minutes, 5);
        // Untouched fields come from defaults.
        assert_eq!(cfg.brkga.population_size, 100);
        assert!((cfg.optimizer_deadline_s - 5.0).abs() < 1e-10);

        let text = serde_json::to_string(&cfg).expect("serializes");
        let back: SimulationConfig = serde_json::from_str(&text).expect("round trips");
        assert_eq!(back.strategy, cfg.strategy);
    }

    #[test]
    fn test_hybrid_json() {
        let json = r#"{
            "strategy_kind": "hybrid",
            "hybrid_algo": "brkga_split",
            "brkga": { "seed": 42, "population_size": 60 }
        }"#;
        let cfg: SimulationConfig = serde_json::from_str(json).expect("parses");
        assert_eq!(
            cfg.strategy,
            StrategyConfig::Hybrid {
                hybrid_algo: HybridAlgo::BrkgaSplit,
            }
        );
        assert_eq!(cfg.brkga.seed, 42);
        assert_eq!(cfg.brkga.population_size, 60);
        assert_eq!(cfg.brkga.max_generations, 100);
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let json = r#"{ "strategy_kind": "magic" }"#;
        assert!(serde_json::from_str::<SimulationConfig>(json).is_err());
    }

    #[test]
    fn test_mixed_branch_fields_rejected() {
        // A hybrid tag with two-stage fields is not a valid record.
        let json = r#"{ "strategy_kind": "hybrid", "clustering_algo": "ckmeans" }"#;
        assert!(serde_json::from_str::<SimulationConfig>(json).is_err());
    }
}
