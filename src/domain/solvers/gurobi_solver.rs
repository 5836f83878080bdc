use crate::domain::model_builder::{ConstraintSystem, RowKind};
use crate::domain::solver::{SolveStatus, Solver};
use crate::error::{FrontierError, Result};

use grb::prelude::*;

/// Gurobi solver implementation
///
/// The environment and model are built on the first solve and kept; later
/// solves of the same system only update the right-hand sides of the two
/// threshold constraints.
#[derive(Default)]
pub struct GurobiSolver {
    cached: Option<CachedModel>,
}

impl GurobiSolver {
    pub fn new() -> Self {
        GurobiSolver { cached: None }
    }
}

struct CachedModel {
    structure: u64,
    model: Model,
    vars: Vec<Var>,
    /// `None` for a threshold row without entries
    threshold_a: Option<Constr>,
    threshold_b: Option<Constr>,
}

// SAFETY: a cached model is owned by exactly one solver, which is owned by one
// optimizer and never used from two threads at once.
unsafe impl Send for CachedModel {}

fn gurobi_error(action: &str, e: grb::Error) -> FrontierError {
    FrontierError::solver("Gurobi", format!("Failed to {}: {}", action, e))
}

impl CachedModel {
    fn build(system: &ConstraintSystem) -> Result<Self> {
        let mut env = Env::new("").map_err(|e| gurobi_error("create environment", e))?;

        // Disable Gurobi console output
        env.set(param::OutputFlag, 0)
            .map_err(|e| gurobi_error("set output flag", e))?;

        // One thread per solver instance; parallelism comes from the worker pool
        env.set(param::Threads, 1)
            .map_err(|e| gurobi_error("set thread count", e))?;

        let mut model = Model::with_env(system.name(), &env)
            .map_err(|e| gurobi_error("create model", e))?;

        let mut vars: Vec<Var> = Vec::with_capacity(system.columns().len());
        for column in system.columns() {
            let var = add_binvar!(model, name: &column.name)
                .map_err(|e| gurobi_error("add binary variable", e))?;
            vars.push(var);
        }
        model
            .update()
            .map_err(|e| gurobi_error("update model after adding variables", e))?;

        let (row_a, row_b) = system.threshold_rows();
        let mut threshold_a = None;
        let mut threshold_b = None;
        for (index, row) in system.rows().iter().enumerate() {
            if row.entries.is_empty() {
                continue;
            }
            let expr = row.entries.iter().fold(Expr::Constant(0.0), |acc, &(col, coeff)| {
                acc + coeff * vars[col]
            });
            let constr = match row.kind {
                RowKind::Equal => c!(expr == row.rhs),
                RowKind::Less => c!(expr <= row.rhs),
                RowKind::Greater => c!(expr >= row.rhs),
            };
            let handle = model
                .add_constr(&row.name, constr)
                .map_err(|e| gurobi_error("add constraint", e))?;
            if index == row_a {
                threshold_a = Some(handle);
            } else if index == row_b {
                threshold_b = Some(handle);
            }
        }

        let objective = system
            .columns()
            .iter()
            .zip(&vars)
            .filter(|(c, _)| c.cost != 0.0)
            .fold(Expr::Constant(0.0), |acc, (c, &var)| acc + c.cost * var);
        model
            .set_objective(objective, ModelSense::Minimize)
            .map_err(|e| gurobi_error("set objective", e))?;

        Ok(CachedModel {
            structure: system.structure(),
            model,
            vars,
            threshold_a,
            threshold_b,
        })
    }

    fn set_thresholds(&mut self, (threshold_a, threshold_b): (u32, u32)) -> Result<()> {
        for (constr, rhs) in [(self.threshold_a, threshold_a), (self.threshold_b, threshold_b)] {
            if let Some(constr) = constr {
                self.model
                    .set_obj_attr(attr::RHS, &constr, rhs as f64)
                    .map_err(|e| gurobi_error("set threshold", e))?;
            }
        }
        Ok(())
    }
}

impl Solver for GurobiSolver {
    fn solve(&mut self, system: &ConstraintSystem) -> Result<SolveStatus> {
        // Empty rows are not added to the model, but an empty threshold row
        // still has to hold: 0 >= rhs
        if system
            .rows()
            .iter()
            .any(|r| r.entries.is_empty() && r.kind == RowKind::Greater && r.rhs > 0.0)
        {
            return Ok(SolveStatus::Infeasible);
        }

        let cached = match self.cached.take() {
            Some(cached) if cached.structure == system.structure() => cached,
            _ => CachedModel::build(system)?,
        };
        let cached = self.cached.insert(cached);
        cached.set_thresholds(system.thresholds())?;

        cached
            .model
            .optimize()
            .map_err(|e| gurobi_error("optimize", e))?;

        match cached.model.status().map_err(|e| gurobi_error("get model status", e))? {
            Status::Optimal => {
                let values = cached
                    .vars
                    .iter()
                    .map(|var| cached.model.get_obj_attr(attr::X, var))
                    .collect::<grb::Result<Vec<f64>>>()
                    .map_err(|e| gurobi_error("get solution", e))?;
                Ok(SolveStatus::Optimal(values))
            }
            // binary columns cannot be unbounded
            Status::Infeasible | Status::InfOrUnbd => Ok(SolveStatus::Infeasible),
            status => Err(FrontierError::solver(
                "Gurobi",
                format!("model status {:?}", status),
            )),
        }
    }

    fn name(&self) -> &str {
        "Gurobi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Item, RegionModel};

    #[test]
    fn test_solve_reuses_model_across_thresholds() {
        let mut system = ConstraintSystem::build(&RegionModel::new(
            "chain",
            0,
            vec![Item::new(1, None, 1, 2, 0), Item::new(2, Some(1), 3, 0, 5)],
        ))
        .unwrap();
        let mut solver = GurobiSolver::new();

        system.set_thresholds(2, 5);
        let SolveStatus::Optimal(values) = solver.solve(&system).unwrap() else {
            panic!("expected optimal");
        };
        assert_eq!(system.objective(&values), 4.0);
        let structure = solver.cached.as_ref().map(|c| c.structure);

        system.set_thresholds(10, 0);
        assert_eq!(solver.solve(&system).unwrap(), SolveStatus::Infeasible);
        assert_eq!(solver.cached.as_ref().map(|c| c.structure), structure);

        system.set_thresholds(2, 0);
        let SolveStatus::Optimal(values) = solver.solve(&system).unwrap() else {
            panic!("expected optimal");
        };
        assert_eq!(system.objective(&values), 1.0);
    }
}
