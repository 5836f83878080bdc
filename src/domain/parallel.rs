//! Parallel frontier enumeration.
//!
//! Every worker owns an independent copy of the region, builds its own model and
//! solver, and solves its share of the threshold plane sequentially. Results are
//! merged by concatenation; ordering between workers does not matter because
//! compression and dominance filtering run after the merge.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::domain::enumerate::staircase_row;
use crate::domain::optimizer::PointOptimizer;
use crate::domain::solver_factory::SolverType;
use crate::error::{FrontierError, Result};
use crate::models::{RegionModel, Solution};

/// How the threshold plane is divided between workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartitionStrategy {
    /// Every `(a, b)` pair, shuffled and split into contiguous chunks
    #[default]
    Grid,
    /// Whole `b` rows dealt round-robin, each swept with the staircase
    Rows,
}

impl PartitionStrategy {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "grid" => Some(PartitionStrategy::Grid),
            "rows" => Some(PartitionStrategy::Rows),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParallelConfig {
    pub workers: usize,
    pub solver: SolverType,
    pub strategy: PartitionStrategy,
    /// Shuffle seed for the grid strategy; random when unset.
    pub seed: Option<u64>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            solver: SolverType::default(),
            strategy: PartitionStrategy::default(),
            seed: None,
        }
    }
}

/// One worker's share of the threshold plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Pairs(Vec<(u32, u32)>),
    Rows(Vec<u32>),
}

impl Job {
    fn len(&self) -> usize {
        match self {
            Job::Pairs(pairs) => pairs.len(),
            Job::Rows(rows) => rows.len(),
        }
    }
}

/// Shuffle the full `[0, max_a] x [0, max_b]` cross product and split it into at
/// most `workers` contiguous chunks. Shuffling spreads the hard threshold pairs
/// (large sums) evenly over the chunks.
pub fn chunk_threshold_pairs(
    max_a: u32,
    max_b: u32,
    workers: usize,
    seed: Option<u64>,
) -> Vec<Vec<(u32, u32)>> {
    let mut pairs: Vec<(u32, u32)> = (0..=max_a)
        .flat_map(|a| (0..=max_b).map(move |b| (a, b)))
        .collect();
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    pairs.shuffle(&mut rng);

    let workers = workers.max(1);
    let chunk_size = pairs.len().div_ceil(workers).max(1);
    pairs.chunks(chunk_size).map(|chunk| chunk.to_vec()).collect()
}

/// Deal the `b` rows `0..=max_b` round-robin to at most `workers` jobs.
pub fn deal_rows(max_b: u32, workers: usize) -> Vec<Vec<u32>> {
    let workers = workers.max(1).min(max_b as usize + 1);
    let mut rows = vec![Vec::new(); workers];
    for b in 0..=max_b {
        rows[b as usize % workers].push(b);
    }
    rows
}

/// Enumerate the region's solutions across `config.workers` threads.
///
/// The first failing worker fails the whole enumeration; no partial result is
/// returned.
pub fn enumerate_parallel(region: &RegionModel, config: &ParallelConfig) -> Result<Vec<Solution>> {
    let max_a = region.max_sum_a();
    let max_b = region.max_sum_b();
    let jobs: Vec<Job> = match config.strategy {
        PartitionStrategy::Grid => chunk_threshold_pairs(max_a, max_b, config.workers, config.seed)
            .into_iter()
            .map(Job::Pairs)
            .collect(),
        PartitionStrategy::Rows => deal_rows(max_b, config.workers)
            .into_iter()
            .map(Job::Rows)
            .collect(),
    };
    for (i, job) in jobs.iter().enumerate() {
        debug!("job {i}: {} units", job.len());
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(jobs.len().max(1))
        .build()
        .map_err(|e| FrontierError::Config(format!("failed to build worker pool: {e}")))?;

    let worker_solutions: Vec<Vec<Solution>> = pool.install(|| {
        jobs.into_par_iter()
            .enumerate()
            .map(|(worker, job)| {
                run_job(region.clone_for_worker(), config.solver, job, max_a).map_err(|e| {
                    FrontierError::Worker {
                        worker,
                        source: Box::new(e),
                    }
                })
            })
            .collect::<Result<Vec<_>>>()
    })?;

    let solutions: Vec<Solution> = worker_solutions.into_iter().flatten().collect();
    info!(
        "{} workers captured {} solutions over ({}, {}).",
        config.workers,
        solutions.len(),
        max_a,
        max_b
    );
    Ok(solutions)
}

fn run_job(region: RegionModel, solver: SolverType, job: Job, max_a: u32) -> Result<Vec<Solution>> {
    let mut optimizer = PointOptimizer::new(&region, solver)?;
    let mut solutions = Vec::new();
    match job {
        Job::Pairs(pairs) => {
            for (a, b) in pairs {
                if let Some(solution) = optimizer.optimize(a, b)? {
                    solutions.push(solution);
                }
            }
        }
        Job::Rows(rows) => {
            for b in rows {
                staircase_row(&mut optimizer, b, max_a, &mut solutions)?;
            }
        }
    }
    Ok(solutions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Item;

    #[test]
    fn test_chunks_cover_every_pair_once() {
        let chunks = chunk_threshold_pairs(3, 2, 5, Some(7));
        assert!(chunks.len() <= 5);
        let mut all: Vec<(u32, u32)> = chunks.into_iter().flatten().collect();
        all.sort();
        let expected: Vec<(u32, u32)> =
            (0..=3).flat_map(|a| (0..=2).map(move |b| (a, b))).collect();
        assert_eq!(all, expected);
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        assert_eq!(
            chunk_threshold_pairs(4, 4, 3, Some(42)),
            chunk_threshold_pairs(4, 4, 3, Some(42))
        );
    }

    #[test]
    fn test_more_workers_than_pairs() {
        let chunks = chunk_threshold_pairs(0, 1, 8, Some(1));
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn test_deal_rows_round_robin() {
        assert_eq!(deal_rows(4, 2), vec![vec![0, 2, 4], vec![1, 3]]);
        assert_eq!(deal_rows(1, 4), vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_partition_strategy_from_str() {
        assert_eq!(PartitionStrategy::from_str("Grid"), Some(PartitionStrategy::Grid));
        assert_eq!(PartitionStrategy::from_str("rows"), Some(PartitionStrategy::Rows));
        assert_eq!(PartitionStrategy::from_str("diagonal"), None);
    }

    #[test]
    fn test_worker_failure_fails_enumeration() {
        // A cycle makes every worker's model build fail.
        let region = RegionModel::new(
            "broken",
            0,
            vec![Item::new(1, Some(2), 1, 1, 0), Item::new(2, Some(1), 1, 0, 1)],
        );
        let config = ParallelConfig {
            workers: 2,
            ..ParallelConfig::default()
        };
        let err = enumerate_parallel(&region, &config).unwrap_err();
        match err {
            FrontierError::Worker { source, .. } => {
                assert!(matches!(*source, FrontierError::MalformedRegion(_)))
            }
            other => panic!("unexpected error {other}"),
        }
    }
}
