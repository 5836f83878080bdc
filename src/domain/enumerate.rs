use log::info;

use crate::domain::optimizer::PointOptimizer;
use crate::error::Result;
use crate::models::Solution;

/// Staircase sweep over the threshold plane.
///
/// For each `b` in `0..=max_b` the `a` threshold starts at zero and jumps to one
/// past the achieved `sum_a` after every feasible solve: every threshold in the
/// skipped range has the same optimum. The row ends at the first infeasible `a`,
/// since raising a lower bound only shrinks the feasible region.
pub fn enumerate_staircase(
    optimizer: &mut PointOptimizer,
    max_a: u32,
    max_b: u32,
) -> Result<Vec<Solution>> {
    let mut solutions = Vec::new();
    for b in 0..=max_b {
        staircase_row(optimizer, b, max_a, &mut solutions)?;
    }
    info!(
        "Staircase sweep over ({}, {}) captured {} solutions.",
        max_a,
        max_b,
        solutions.len()
    );
    Ok(solutions)
}

/// One `b` row of the staircase sweep; appends to `solutions`.
pub(crate) fn staircase_row(
    optimizer: &mut PointOptimizer,
    b: u32,
    max_a: u32,
    solutions: &mut Vec<Solution>,
) -> Result<()> {
    let mut a = 0;
    while a <= max_a {
        match optimizer.optimize(a, b)? {
            Some(solution) => {
                a = solution.sum_a + 1;
                solutions.push(solution);
            }
            None => break,
        }
    }
    Ok(())
}
