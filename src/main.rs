//! Scenario runner.
//!
//! Loads a JSON scenario (configuration, depot, fleet, timed order arrivals,
//! horizon), drives the simulation to the end of the operating window, and
//! prints the monitor as JSON. Exit code 0 on completion, 2 on configuration
//! or scenario errors.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use serde::Deserialize;

use dispatch_routing::config::SimulationConfig;
use dispatch_routing::models::Point;
use dispatch_routing::simulation::Simulation;

#[derive(Debug, Parser)]
#[command(name = "dispatch-routing", about = "Meal-delivery dispatch simulator")]
struct Args {
    /// Path to the scenario JSON file.
    scenario: PathBuf,
    /// Print every routes_update payload as it is emitted.
    #[arg(long)]
    show_routes: bool,
}

#[derive(Debug, Deserialize)]
struct ScenarioVehicle {
    id: usize,
    capacity: u32,
}

#[derive(Debug, Deserialize)]
struct ScenarioOrder {
    id: String,
    point: Point,
    size: u32,
    preparation_minutes: u32,
    service_minutes: u32,
    /// Minute (from simulation start) at which the order arrives.
    #[serde(default)]
    submit_minute: u32,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    config: SimulationConfig,
    depot: Point,
    vehicles: Vec<ScenarioVehicle>,
    orders: Vec<ScenarioOrder>,
    /// Length of the operating window in minutes.
    end_minute: u32,
}

fn run(args: &Args) -> Result<(), String> {
    let text = std::fs::read_to_string(&args.scenario)
        .map_err(|e| format!("cannot read {}: {e}", args.scenario.display()))?;
    let scenario: Scenario =
        serde_json::from_str(&text).map_err(|e| format!("invalid scenario: {e}"))?;

    let mut sim = Simulation::new(scenario.config, scenario.depot).map_err(|e| e.to_string())?;
    for v in &scenario.vehicles {
        sim.register_vehicle(v.id, v.capacity)
            .map_err(|e| e.to_string())?;
    }
    info!("registered {} vehicles", scenario.vehicles.len());

    let mut orders = scenario.orders;
    orders.sort_by_key(|o| o.submit_minute);

    for order in &orders {
        let due = order.submit_minute.saturating_sub(sim.clock() as u32);
        if due > 0 {
            sim.advance_time(due);
        }
        sim.submit_order(
            &order.id,
            order.point,
            order.size,
            order.preparation_minutes,
            order.service_minutes,
        );
        if args.show_routes {
            for update in sim.take_updates() {
                match serde_json::to_string(&update) {
                    Ok(line) => println!("{line}"),
                    Err(e) => error!("routes_update serialization failed: {e}"),
                }
            }
        }
    }

    sim.run(f64::from(scenario.end_minute));
    info!("simulation finished at minute {:.0}", sim.clock());

    if args.show_routes {
        for update in sim.take_updates() {
            match serde_json::to_string(&update) {
                Ok(line) => println!("{line}"),
                Err(e) => error!("routes_update serialization failed: {e}"),
            }
        }
    }

    let summary = serde_json::to_string_pretty(sim.monitor())
        .map_err(|e| format!("monitor serialization failed: {e}"))?;
    println!("{summary}");
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            ExitCode::from(2)
        }
    }
}
