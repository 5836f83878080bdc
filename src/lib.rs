pub mod config;
pub mod domain;
pub mod error;
pub mod models;

pub use config::{RunConfig, RunMode, Validation};
pub use domain::frontier::frontier;
pub use error::{FrontierError, Result};
pub use models::{Assignment, Dimension, Item, RegionModel, Solution, SolutionKey};
