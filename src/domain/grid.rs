use crate::error::{FrontierError, Result};
use crate::models::Solution;

/// Elegant pairing of two non-negative integers into a dense index.
///
/// Injective, and every pair with both coordinates at most `m` maps below
/// `(m + 1)^2`.
#[inline(always)]
pub fn elegant_pair(x: u32, y: u32) -> usize {
    let (x, y) = (x as usize, y as usize);
    if x < y {
        y * y + x
    } else {
        x * x + x + y
    }
}

/// Keeps the cheapest solution per exact `(sum_a, sum_b)` pair.
#[derive(Debug, Clone)]
pub struct SolutionGrid {
    max_a: u32,
    max_b: u32,
    /// Pairing index -> position in `solutions`
    slots: Vec<Option<usize>>,
    solutions: Vec<Solution>,
}

impl SolutionGrid {
    pub fn new(max_a: u32, max_b: u32) -> Self {
        let side = max_a.max(max_b) as usize + 1;
        Self {
            max_a,
            max_b,
            slots: vec![None; side * side],
            solutions: Vec::new(),
        }
    }

    /// Store `solution` if its pair is new or it is strictly cheaper than the
    /// stored one. Returns whether it was stored.
    pub fn insert_or_update(&mut self, solution: &Solution) -> Result<bool> {
        if solution.sum_a > self.max_a || solution.sum_b > self.max_b {
            return Err(FrontierError::OutOfGrid {
                sum_a: solution.sum_a,
                sum_b: solution.sum_b,
            });
        }
        let key = elegant_pair(solution.sum_a, solution.sum_b);
        match self.slots[key] {
            None => {
                self.slots[key] = Some(self.solutions.len());
                self.solutions.push(solution.clone());
                Ok(true)
            }
            Some(index) if solution.cost < self.solutions[index].cost => {
                self.solutions[index] = solution.clone();
                Ok(true)
            }
            Some(_) => Ok(false),
        }
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn into_solutions(self) -> Vec<Solution> {
        self.solutions
    }
}

/// Deduplicate `solutions` to the cheapest one per `(sum_a, sum_b)` pair.
pub fn compress(solutions: &[Solution], max_a: u32, max_b: u32) -> Result<Vec<Solution>> {
    let mut grid = SolutionGrid::new(max_a, max_b);
    for solution in solutions {
        grid.insert_or_update(solution)?;
    }
    Ok(grid.into_solutions())
}
