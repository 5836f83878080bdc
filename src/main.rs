use std::fs;

use log::info;

use subset_frontier::domain::cross_validate::{cross_validate, load_reference};
use subset_frontier::domain::exhaustive::exhaustive_frontier;
use subset_frontier::domain::model_builder::ConstraintSystem;
use subset_frontier::domain::optimizer::PointOptimizer;
use subset_frontier::{frontier, FrontierError, RegionModel, Result, RunConfig, RunMode, Validation};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RunConfig::from_env()?;
    let path = config
        .region
        .clone()
        .ok_or_else(|| FrontierError::Config("FRONTIER_REGION is not set".to_string()))?;
    let region: RegionModel = serde_json::from_str(&fs::read_to_string(&path)?)?;
    info!("Loaded region {} from {}", region.name(), path.display());

    match config.mode {
        RunMode::Point => run_point(&region, &config),
        RunMode::All => run_all(&region, &config),
        RunMode::Write => {
            let system = ConstraintSystem::build(&region)?;
            let written = system.write_mps(&config.model_path)?;
            info!("Model written to {}", written.display());
            Ok(())
        }
    }
}

fn run_point(region: &RegionModel, config: &RunConfig) -> Result<()> {
    let mut optimizer = PointOptimizer::new(region, config.solver)?;
    match optimizer.optimize(config.threshold_a, config.threshold_b)? {
        Some(solution) => println!("{}", serde_json::to_string(&solution)?),
        None => info!(
            "no solution for thresholds ({}, {})",
            config.threshold_a, config.threshold_b
        ),
    }
    Ok(())
}

fn run_all(region: &RegionModel, config: &RunConfig) -> Result<()> {
    let solutions = frontier(region, config)?;
    for solution in &solutions {
        println!("{}", serde_json::to_string(solution)?);
    }

    let reference = match &config.validate {
        None => return Ok(()),
        Some(Validation::Exhaustive) => exhaustive_frontier(region)?,
        Some(Validation::File(path)) => load_reference(path)?,
    };
    cross_validate(&solutions, &reference);
    Ok(())
}
