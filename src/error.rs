use thiserror::Error;

/// Result type for frontier engine operations
pub type Result<T> = std::result::Result<T, FrontierError>;

/// Errors that can occur while building, solving or enumerating a region model
#[derive(Error, Debug)]
pub enum FrontierError {
    /// Region has duplicate ids, dangling or cyclic requirements
    #[error("Malformed region: {0}")]
    MalformedRegion(String),

    /// Solver name not recognised, or its backend feature is disabled
    #[error("Unknown solver: {0}")]
    UnknownSolver(String),

    /// Solver backend failed or returned a status other than optimal/infeasible
    #[error("{solver} solver failed: {details}")]
    Solver { solver: String, details: String },

    /// A parallel worker failed; the whole enumeration is abandoned
    #[error("Worker {worker} failed: {source}")]
    Worker {
        worker: usize,
        #[source]
        source: Box<FrontierError>,
    },

    /// Solution sums fall outside the compression grid
    #[error("Solution ({sum_a}, {sum_b}) is outside the solution grid")]
    OutOfGrid { sum_a: u32, sum_b: u32 },

    /// Invalid run configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FrontierError {
    pub(crate) fn solver(solver: &str, details: impl Into<String>) -> Self {
        FrontierError::Solver {
            solver: solver.to_string(),
            details: details.into(),
        }
    }
}
