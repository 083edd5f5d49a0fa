//! Strategy selection.
//!
//! The configuration's tagged branch collapses to a small enum constructed
//! once at startup: either a {clusterer, router} pair whose stages run back
//! to back, or a fused hybrid solver. Every variant consumes the same
//! [`DispatchProblem`] snapshot and produces the same [`DraftPlan`], so the
//! driver is oblivious to which algorithms are running.

use std::fmt;

use log::debug;

use crate::brkga::{derive_seed, BrkgaParams};
use crate::clustering::{ckmeans_clustering, sequential_clustering, CkmeansParams, Clustering};
use crate::config::{ClusteringAlgo, HybridAlgo, RoutingAlgo, SimulationConfig, StrategyConfig};
use crate::error::ConfigError;
use crate::hybrid::{brkga_split_plan, greedy_insertion_plan};
use crate::problem::{Deadline, DispatchProblem, DraftPlan};
use crate::routing::{brkga_route, cheapest_insertion_route};

/// The optimizer stack chosen at startup.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Cluster, then sequence each cluster independently.
    TwoStage {
        /// Clustering stage.
        clustering: ClusteringAlgo,
        /// Sequencing stage.
        routing: RoutingAlgo,
        /// BRKGA tuning for the router.
        brkga: BrkgaParams,
        /// K-Means tuning for the clusterer.
        ckmeans: CkmeansParams,
    },
    /// One fused solver.
    Hybrid {
        /// Which fused solver.
        algo: HybridAlgo,
        /// BRKGA tuning for the giant-tour solver.
        brkga: BrkgaParams,
    },
}

impl Strategy {
    /// Builds and validates the strategy from the configuration.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(match config.strategy {
            StrategyConfig::TwoStage {
                clustering_algo,
                routing_algo,
            } => Strategy::TwoStage {
                clustering: clustering_algo,
                routing: routing_algo,
                brkga: config.brkga.clone(),
                ckmeans: config.ckmeans.clone(),
            },
            StrategyConfig::Hybrid { hybrid_algo } => Strategy::Hybrid {
                algo: hybrid_algo,
                brkga: config.brkga.clone(),
            },
        })
    }

    /// Plans one decision tick.
    pub fn plan(&self, problem: &DispatchProblem, deadline: &Deadline) -> DraftPlan {
        match self {
            Strategy::TwoStage {
                clustering,
                routing,
                brkga,
                ckmeans,
            } => {
                let clusters = match clustering {
                    ClusteringAlgo::Ckmeans => ckmeans_clustering(problem, ckmeans, deadline),
                    ClusteringAlgo::GreedySequential => sequential_clustering(problem),
                };
                debug!(
                    "clustering assigned {} of {} orders",
                    clusters.num_assigned(),
                    problem.num_orders()
                );
                self.sequence_clusters(problem, clusters, *routing, brkga, deadline)
            }
            Strategy::Hybrid { algo, brkga } => match algo {
                HybridAlgo::GreedyInsertion => greedy_insertion_plan(problem, deadline),
                HybridAlgo::BrkgaSplit => brkga_split_plan(problem, brkga, deadline),
            },
        }
    }

    fn sequence_clusters(
        &self,
        problem: &DispatchProblem,
        clusters: Clustering,
        routing: RoutingAlgo,
        brkga: &BrkgaParams,
        deadline: &Deadline,
    ) -> DraftPlan {
        let routes = clusters
            .clusters
            .iter()
            .enumerate()
            .map(|(v, cluster)| match routing {
                RoutingAlgo::CheapestInsertion => {
                    cheapest_insertion_route(cluster, problem.travel())
                }
                RoutingAlgo::Brkga => {
                    // Give every cluster its own reproducible key stream.
                    let params = brkga.clone().with_seed(derive_seed(brkga.seed, v as u64));
                    let (seq, _) = brkga_route(
                        cluster,
                        problem.travel(),
                        problem.deadlines(),
                        &params,
                        deadline,
                    );
                    seq
                }
            })
            .collect();

        DraftPlan {
            routes,
            unassigned: clusters.unassigned,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::TwoStage {
                clustering, routing, ..
            } => write!(f, "two-stage {clustering:?}+{routing:?}"),
            Strategy::Hybrid { algo, .. } => write!(f, "hybrid {algo:?}"),
        }
    }
}
