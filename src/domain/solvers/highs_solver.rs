use crate::domain::model_builder::{ConstraintSystem, RowKind};
use crate::domain::solver::{SolveStatus, Solver};
use crate::error::{FrontierError, Result};

use ::highs::{ColProblem, HighsModelStatus, Row, Sense};

/// HiGHS solver implementation
///
/// `ColProblem::optimise` consumes the problem, so the native model is rebuilt
/// per solve. The column-major transposition of the system is kept; only the row
/// bounds are read again, which picks up the current thresholds.
#[derive(Default)]
pub struct HighsSolver {
    cached: Option<ColumnLayout>,
}

impl HighsSolver {
    pub fn new() -> Self {
        HighsSolver { cached: None }
    }
}

/// `(row index, coefficient)` entries per column.
struct ColumnLayout {
    structure: u64,
    columns: Vec<Vec<(usize, f64)>>,
}

impl ColumnLayout {
    fn new(system: &ConstraintSystem) -> Self {
        let mut columns: Vec<Vec<(usize, f64)>> = vec![Vec::new(); system.columns().len()];
        for (row_idx, row) in system.rows().iter().enumerate() {
            for &(col, val) in &row.entries {
                columns[col].push((row_idx, val));
            }
        }
        ColumnLayout {
            structure: system.structure(),
            columns,
        }
    }
}

impl Solver for HighsSolver {
    fn solve(&mut self, system: &ConstraintSystem) -> Result<SolveStatus> {
        let layout = match self.cached.take() {
            Some(layout) if layout.structure == system.structure() => layout,
            _ => ColumnLayout::new(system),
        };
        let layout = self.cached.insert(layout);

        let mut problem = ColProblem::new();

        // First, add all constraint rows
        let rows: Vec<Row> = system
            .rows()
            .iter()
            .map(|row| match row.kind {
                RowKind::Equal => problem.add_row(row.rhs..=row.rhs),
                RowKind::Less => problem.add_row(..=row.rhs),
                RowKind::Greater => problem.add_row(row.rhs..),
            })
            .collect();

        for (column, entries) in system.columns().iter().zip(&layout.columns) {
            let row_factors: Vec<(Row, f64)> =
                entries.iter().map(|&(row_idx, val)| (rows[row_idx], val)).collect();
            problem.add_integer_column(column.cost, 0.0..=1.0, &row_factors);
        }

        let mut model = problem.optimise(Sense::Minimise);
        model.set_option("output_flag", false);
        model.set_option("threads", 1);
        let solved = model.solve();

        match solved.status() {
            HighsModelStatus::Optimal => Ok(SolveStatus::Optimal(
                solved.get_solution().columns().to_vec(),
            )),
            HighsModelStatus::Infeasible => Ok(SolveStatus::Infeasible),
            status => Err(FrontierError::solver(
                "HiGHS",
                format!("model status {:?}", status),
            )),
        }
    }

    fn name(&self) -> &str {
        "HiGHS"
    }
}
