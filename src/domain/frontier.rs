use log::info;

use crate::config::RunConfig;
use crate::domain::dominance::retain_dominating;
use crate::domain::enumerate::enumerate_staircase;
use crate::domain::grid::compress;
use crate::domain::optimizer::PointOptimizer;
use crate::domain::parallel::{enumerate_parallel, ParallelConfig};
use crate::domain::region_tree::RegionTree;
use crate::error::Result;
use crate::models::{RegionModel, Solution};

/// Enumerate, compress and filter the region's Pareto frontier.
///
/// One worker runs the staircase sweep on a single optimizer; more workers run
/// the parallel enumerator. The result is sorted by `(sum_b, sum_a)`.
pub fn frontier(region: &RegionModel, config: &RunConfig) -> Result<Vec<Solution>> {
    let max_a = region.max_sum_a();
    let max_b = region.max_sum_b();
    let tree = RegionTree::new(region)?;
    info!(
        "Generating for {} with {} items in {} selections and max ({}, {}).",
        region.name(),
        region.items().len(),
        tree.count_selections(region),
        max_a,
        max_b
    );

    let solutions = if config.workers <= 1 {
        let mut optimizer = PointOptimizer::new(region, config.solver)?;
        enumerate_staircase(&mut optimizer, max_a, max_b)?
    } else {
        enumerate_parallel(
            region,
            &ParallelConfig {
                workers: config.workers,
                solver: config.solver,
                strategy: config.strategy,
                seed: config.seed,
            },
        )?
    };

    info!("post-processing... compressing {} solutions", solutions.len());
    let mut solutions = compress(&solutions, max_a, max_b)?;
    info!("post-processing... dominating {} solutions", solutions.len());
    retain_dominating(&mut solutions);
    solutions.sort_unstable_by_key(|s| (s.sum_b, s.sum_a));
    info!("Retained count {}", solutions.len());
    Ok(solutions)
}
