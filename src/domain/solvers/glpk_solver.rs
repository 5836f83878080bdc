use std::collections::HashMap;

use crate::domain::model_builder::{ConstraintSystem, RowKind};
use crate::domain::solver::{SolveStatus, Solver};
use crate::error::{FrontierError, Result};

use glpk_rust::{
    solve_ilps as glpk_solve_ilps, Bound, IntegerSparseMatrix as GlpkMatrix,
    SparseLEIntegerPolyhedron as GlpkPoly, Status as GlpkStatus, Variable as GlpkVar,
};

const MAXIMIZE: bool = false;
const USE_PRESOLVE: bool = true;
const NO_TERMINAL_OUTPUT: bool = false;

/// `glp_intopt` return code for an LP relaxation without a primal feasible
/// solution. Only reported with the MIP presolver on.
const GLP_ENOPFS: i32 = 0x0A;

/// GLPK solver implementation
///
/// `solve_ilps` creates and deletes the native problem on every call, so only
/// the `A x <= b` conversion is kept between solves; a new threshold pair just
/// rewrites the two threshold bounds.
#[derive(Default)]
pub struct GlpkSolver {
    cached: Option<LeForm>,
}

impl GlpkSolver {
    pub fn new() -> Self {
        GlpkSolver { cached: None }
    }
}

/// The system in GLPK's `A x <= b` form: equalities become two rows and `>=`
/// rows are negated.
#[derive(Clone)]
struct LeForm {
    structure: u64,
    matrix: GlpkMatrix,
    b: Vec<Bound>,
    /// Positions in `b` of the negated `sum_a_lb` and `sum_b_lb` rows
    threshold_bounds: (usize, usize),
}

impl LeForm {
    fn new(system: &ConstraintSystem) -> Self {
        let mut matrix = GlpkMatrix {
            rows: Vec::new(),
            cols: Vec::new(),
            vals: Vec::new(),
        };
        let mut b: Vec<Bound> = Vec::new();
        let mut positions = Vec::with_capacity(system.rows().len());

        let mut push_row = |entries: &[(usize, f64)], rhs: f64, sign: i32| {
            let row = b.len();
            for &(col, val) in entries {
                matrix.rows.push(row as i32);
                matrix.cols.push(col as i32);
                matrix.vals.push(sign * val.round() as i32);
            }
            b.push((0, sign * rhs.round() as i32));
            row
        };

        for row in system.rows() {
            let position = match row.kind {
                RowKind::Less => push_row(&row.entries, row.rhs, 1),
                RowKind::Greater => push_row(&row.entries, row.rhs, -1),
                RowKind::Equal => {
                    push_row(&row.entries, row.rhs, 1);
                    push_row(&row.entries, row.rhs, -1)
                }
            };
            positions.push(position);
        }

        let (row_a, row_b) = system.threshold_rows();
        LeForm {
            structure: system.structure(),
            matrix,
            b,
            threshold_bounds: (positions[row_a], positions[row_b]),
        }
    }

    fn set_thresholds(&mut self, (threshold_a, threshold_b): (u32, u32)) {
        let (a, b) = self.threshold_bounds;
        self.b[a] = (0, -(threshold_a as i32));
        self.b[b] = (0, -(threshold_b as i32));
    }
}

impl Solver for GlpkSolver {
    fn solve(&mut self, system: &ConstraintSystem) -> Result<SolveStatus> {
        let le = match self.cached.take() {
            Some(le) if le.structure == system.structure() => le,
            _ => LeForm::new(system),
        };
        let le = self.cached.insert(le);
        le.set_thresholds(system.thresholds());

        let mut polyhedron = GlpkPoly {
            a: le.matrix.clone(),
            b: le.b.clone(),
            variables: system
                .columns()
                .iter()
                .map(|c| GlpkVar {
                    id: c.name.as_str(),
                    bound: (0, 1),
                })
                .collect(),
            double_bound: false,
        };
        let objective: HashMap<&str, f64> = system
            .columns()
            .iter()
            .filter(|c| c.cost != 0.0)
            .map(|c| (c.name.as_str(), c.cost))
            .collect();

        let mut solutions = glpk_solve_ilps(
            &mut polyhedron,
            vec![objective],
            MAXIMIZE,
            USE_PRESOLVE,
            NO_TERMINAL_OUTPUT,
        );
        let solution = solutions
            .pop()
            .ok_or_else(|| FrontierError::solver("GLPK", "no solution returned"))?;

        match solution.status {
            GlpkStatus::Optimal => Ok(SolveStatus::Optimal(
                system
                    .columns()
                    .iter()
                    .map(|c| solution.solution.get(c.name.as_str()).copied().unwrap_or(0) as f64)
                    .collect(),
            )),
            GlpkStatus::Infeasible | GlpkStatus::NoFeasible => Ok(SolveStatus::Infeasible),
            GlpkStatus::MIPFailed if relaxation_infeasible(solution.error.as_deref()) => {
                Ok(SolveStatus::Infeasible)
            }
            status => Err(FrontierError::solver(
                "GLPK",
                solution
                    .error
                    .unwrap_or_else(|| format!("model status {:?}", status)),
            )),
        }
    }

    fn name(&self) -> &str {
        "GLPK"
    }
}

fn relaxation_infeasible(error: Option<&str>) -> bool {
    error.is_some_and(|e| e.ends_with(&format!("code: {}", GLP_ENOPFS)))
}
