use log::debug;

use crate::domain::model_builder::ConstraintSystem;
use crate::domain::solver::{SolveStatus, Solver};
use crate::domain::solver_factory::{create_solver, SolverType};
use crate::error::{FrontierError, Result};
use crate::models::{Assignment, Dimension, RegionModel, Solution};

/// Solves single threshold pairs against one built model.
///
/// Owns its `ConstraintSystem` and its solver exclusively; repeated calls only move
/// the two threshold bounds.
pub struct PointOptimizer {
    system: ConstraintSystem,
    solver: Box<dyn Solver>,
}

impl PointOptimizer {
    pub fn new(region: &RegionModel, solver_type: SolverType) -> Result<Self> {
        Ok(Self::with_solver(
            ConstraintSystem::build(region)?,
            create_solver(solver_type),
        ))
    }

    pub fn with_solver(system: ConstraintSystem, solver: Box<dyn Solver>) -> Self {
        Self { system, solver }
    }

    pub fn system(&self) -> &ConstraintSystem {
        &self.system
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    /// Minimum-cost selection reaching `threshold_a` and `threshold_b`, or `None`
    /// when no selection can.
    pub fn optimize(&mut self, threshold_a: u32, threshold_b: u32) -> Result<Option<Solution>> {
        self.system.set_thresholds(threshold_a, threshold_b);

        // Nothing to hand to a backend; only the empty selection exists.
        if self.system.columns().is_empty() {
            return Ok((threshold_a == 0 && threshold_b == 0).then(|| Solution::new(0, 0, 0)));
        }

        let solution = match self.solver.solve(&self.system)? {
            SolveStatus::Infeasible => None,
            SolveStatus::Optimal(values) => {
                if let Some(row) = self.system.violated_row(&values) {
                    return Err(FrontierError::solver(
                        self.solver.name(),
                        format!("solution violates row {}", row.name),
                    ));
                }
                Some(self.extract_solution(&values))
            }
        };
        debug!("({threshold_a}, {threshold_b}) -> {:?}", solution);
        Ok(solution)
    }

    /// Sum the selection weight and the dimension sums, and collect the selected
    /// items with their dimension, in layout order.
    fn extract_solution(&self, values: &[f64]) -> Solution {
        let is_set = |col: usize| values.get(col).map_or(false, |v| v.round() >= 1.0);

        let mut solution = Solution::new(0, 0, 0);
        for item in self.system.layout() {
            if !is_set(item.selected) {
                continue;
            }
            solution.cost += item.weight;
            let dimension = if is_set(item.state_b) {
                solution.sum_b += item.value_b;
                Dimension::B
            } else {
                solution.sum_a += item.value_a;
                Dimension::A
            };
            solution.selected.push(Assignment {
                id: item.id,
                dimension,
            });
        }
        solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Item;

    fn two_item_region() -> RegionModel {
        RegionModel::new(
            "scenario",
            0,
            vec![Item::new(1, None, 1, 2, 0), Item::new(2, Some(1), 3, 0, 5)],
        )
    }

    #[test]
    fn test_optimize_single_item() {
        let mut optimizer =
            PointOptimizer::new(&two_item_region(), SolverType::TreeSearch).unwrap();
        let solution = optimizer.optimize(2, 0).unwrap().unwrap();
        assert_eq!(solution.selected_ids(), vec![1]);
        assert_eq!(solution.cost, 1);
        assert_eq!((solution.sum_a, solution.sum_b), (2, 0));
        assert_eq!(solution.selected[0].dimension, Dimension::A);
    }

    #[test]
    fn test_optimize_requires_parent() {
        let mut optimizer =
            PointOptimizer::new(&two_item_region(), SolverType::TreeSearch).unwrap();
        let solution = optimizer.optimize(2, 5).unwrap().unwrap();
        assert_eq!(solution.selected_ids(), vec![1, 2]);
        assert_eq!(solution.cost, 4);
        assert_eq!((solution.sum_a, solution.sum_b), (2, 5));
    }

    #[test]
    fn test_optimize_infeasible_is_none() {
        let mut optimizer =
            PointOptimizer::new(&two_item_region(), SolverType::TreeSearch).unwrap();
        assert_eq!(optimizer.optimize(10, 0).unwrap(), None);
        // the model is reusable after an infeasible solve
        assert!(optimizer.optimize(0, 5).unwrap().is_some());
    }

    struct FixedSolver(Vec<f64>);

    impl Solver for FixedSolver {
        fn solve(&mut self, _system: &ConstraintSystem) -> Result<SolveStatus> {
            Ok(SolveStatus::Optimal(self.0.clone()))
        }

        fn name(&self) -> &str {
            "Fixed"
        }
    }

    #[test]
    fn test_backend_output_violating_rows_is_rejected() {
        let system = ConstraintSystem::build(&two_item_region()).unwrap();
        // item 2 without its required parent
        let solver = FixedSolver(vec![0.0, 0.0, 0.0, 1.0, 0.0, 1.0]);
        let mut optimizer = PointOptimizer::with_solver(system, Box::new(solver));
        match optimizer.optimize(0, 5) {
            Err(FrontierError::Solver { solver, details }) => {
                assert_eq!(solver, "Fixed");
                assert!(details.contains("req_2"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_optimize_empty_region() {
        let region = RegionModel::new("empty", 0, vec![]);
        let mut optimizer = PointOptimizer::new(&region, SolverType::TreeSearch).unwrap();
        assert_eq!(optimizer.optimize(0, 0).unwrap(), Some(Solution::new(0, 0, 0)));
        assert_eq!(optimizer.optimize(1, 0).unwrap(), None);
    }

    #[test]
    fn test_sums_match_assigned_values() {
        let region = RegionModel::new(
            "mixed",
            0,
            vec![
                Item::new(1, None, 2, 3, 4),
                Item::new(2, Some(1), 1, 2, 2),
                Item::new(3, None, 4, 0, 6),
            ],
        );
        let mut optimizer = PointOptimizer::new(&region, SolverType::TreeSearch).unwrap();
        for (a, b) in [(0, 0), (3, 2), (2, 6), (5, 6), (3, 8)] {
            let solution = optimizer.optimize(a, b).unwrap().unwrap();
            let (mut sum_a, mut sum_b) = (0, 0);
            for assignment in &solution.selected {
                let item = region.items().iter().find(|i| i.id == assignment.id).unwrap();
                match assignment.dimension {
                    Dimension::A => sum_a += item.value_a,
                    Dimension::B => sum_b += item.value_b,
                }
            }
            assert_eq!((solution.sum_a, solution.sum_b), (sum_a, sum_b));
            assert!(solution.sum_a >= a && solution.sum_b >= b);
        }
    }
}
