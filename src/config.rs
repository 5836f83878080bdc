use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use dotenv::dotenv;

use crate::domain::parallel::PartitionStrategy;
use crate::domain::solver_factory::SolverType;
use crate::error::{FrontierError, Result};

/// What a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Optimal selection for one threshold pair
    Point,
    /// The full Pareto frontier
    #[default]
    All,
    /// MPS export of the built model
    Write,
}

/// Reference used to cross-validate an `All` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Solver-independent exhaustive enumeration
    Exhaustive,
    /// JSON file of `{cost, sumA, sumB}` records
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub region: Option<PathBuf>,
    pub mode: RunMode,
    pub threshold_a: u32,
    pub threshold_b: u32,
    pub workers: usize,
    pub solver: SolverType,
    pub strategy: PartitionStrategy,
    pub seed: Option<u64>,
    pub validate: Option<Validation>,
    pub model_path: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            region: None,
            mode: RunMode::default(),
            threshold_a: 0,
            threshold_b: 0,
            workers: 1,
            solver: SolverType::default(),
            strategy: PartitionStrategy::default(),
            seed: None,
            validate: None,
            model_path: PathBuf::from("subset_selection.mps"),
        }
    }
}

impl RunConfig {
    /// Read the run configuration from `FRONTIER_*` environment variables,
    /// loading a `.env` file first when present.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let defaults = RunConfig::default();

        let mode = match env_var("FRONTIER_MODE") {
            None => defaults.mode,
            Some(mode) => match mode.to_lowercase().as_str() {
                "point" => RunMode::Point,
                "all" => RunMode::All,
                "write" => RunMode::Write,
                other => return Err(FrontierError::Config(format!("unknown mode '{other}'"))),
            },
        };

        let solver = match env_var("FRONTIER_SOLVER") {
            None => defaults.solver,
            Some(name) => {
                SolverType::from_str(&name).ok_or(FrontierError::UnknownSolver(name))?
            }
        };

        let strategy = match env_var("FRONTIER_STRATEGY") {
            None => defaults.strategy,
            Some(name) => PartitionStrategy::from_str(&name).ok_or_else(|| {
                FrontierError::Config(format!("unknown partition strategy '{name}'"))
            })?,
        };

        let validate = env_var("FRONTIER_VALIDATE").map(|v| {
            if v.eq_ignore_ascii_case("exhaustive") {
                Validation::Exhaustive
            } else {
                Validation::File(PathBuf::from(v))
            }
        });

        let workers = parse_var("FRONTIER_WORKERS")?.unwrap_or(defaults.workers);
        if workers == 0 {
            return Err(FrontierError::Config(
                "FRONTIER_WORKERS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            region: env_var("FRONTIER_REGION").map(PathBuf::from),
            mode,
            threshold_a: parse_var("FRONTIER_THRESHOLD_A")?.unwrap_or(defaults.threshold_a),
            threshold_b: parse_var("FRONTIER_THRESHOLD_B")?.unwrap_or(defaults.threshold_b),
            workers,
            solver,
            strategy,
            seed: parse_var("FRONTIER_SEED")?,
            validate,
            model_path: env_var("FRONTIER_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
        })
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>> {
    env_var(key)
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|_| FrontierError::Config(format!("{key}: cannot parse '{v}'")))
        })
        .transpose()
}
