use crate::domain::model_builder::ConstraintSystem;
use crate::error::Result;

/// Outcome of a single oracle call.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveStatus {
    /// Optimal column values, one per `ConstraintSystem::columns()` entry
    Optimal(Vec<f64>),
    Infeasible,
}

/// Common interface for the integer programming oracles
///
/// An instance is owned by exactly one optimizer; it may keep backend state between
/// calls but is never shared across threads while solving.
pub trait Solver: Send {
    /// Solve the system at its current thresholds
    ///
    /// The objective value must be deterministic for fixed thresholds; which of
    /// several equally cheap selections is returned is not.
    fn solve(&mut self, system: &ConstraintSystem) -> Result<SolveStatus>;

    /// Get the solver name for logging/debugging
    fn name(&self) -> &str;
}
