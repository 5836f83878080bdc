pub mod cross_validate;
pub mod dominance;
pub mod enumerate;
pub mod exhaustive;
pub mod frontier;
pub mod grid;
pub mod model_builder;
pub mod optimizer;
pub mod parallel;
pub mod region_tree;
pub mod solver;
pub mod solver_factory;
pub mod solvers;
