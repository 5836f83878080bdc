use crate::domain::model_builder::{ConstraintSystem, ItemColumns};
use crate::domain::solver::{SolveStatus, Solver};
use crate::error::Result;
use crate::models::Dimension;

/// Exact depth-first branch and bound over the requirement forest.
///
/// Walks the layout in pre-order; each item is either skipped together with its
/// whole subtree (a jump to its subtree end) or selected into one dimension.
/// Branches are cut when they cannot beat the incumbent cost or can no longer
/// reach a threshold. Needs no native library; it is the fallback oracle when no
/// MIP backend is compiled in and a reference for the backends that are.
pub struct TreeSearchSolver;

impl TreeSearchSolver {
    pub fn new() -> Self {
        TreeSearchSolver
    }
}

impl Default for TreeSearchSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for TreeSearchSolver {
    fn solve(&mut self, system: &ConstraintSystem) -> Result<SolveStatus> {
        let (threshold_a, threshold_b) = system.thresholds();
        let mut search = Search::new(system.layout(), threshold_a as u64, threshold_b as u64);
        search.descend(0, 0, 0, 0);

        let Some(best) = search.best else {
            return Ok(SolveStatus::Infeasible);
        };
        let mut values = vec![0.0; system.columns().len()];
        for (position, dimension) in best {
            let item = &system.layout()[position];
            values[item.selected] = 1.0;
            match dimension {
                Dimension::A => values[item.state_a] = 1.0,
                Dimension::B => values[item.state_b] = 1.0,
            }
        }
        Ok(SolveStatus::Optimal(values))
    }

    fn name(&self) -> &str {
        "TreeSearch"
    }
}

struct Search<'a> {
    items: &'a [ItemColumns],
    threshold_a: u64,
    threshold_b: u64,
    /// Optimistic dimension sums still reachable from each position onward.
    rest_a: Vec<u64>,
    rest_b: Vec<u64>,
    path: Vec<(usize, Dimension)>,
    best_cost: u64,
    best: Option<Vec<(usize, Dimension)>>,
}

impl<'a> Search<'a> {
    fn new(items: &'a [ItemColumns], threshold_a: u64, threshold_b: u64) -> Self {
        let mut rest_a = vec![0; items.len() + 1];
        let mut rest_b = vec![0; items.len() + 1];
        for p in (0..items.len()).rev() {
            rest_a[p] = rest_a[p + 1] + items[p].value_a as u64;
            rest_b[p] = rest_b[p + 1] + items[p].value_b as u64;
        }
        Self {
            items,
            threshold_a,
            threshold_b,
            rest_a,
            rest_b,
            path: Vec::new(),
            best_cost: u64::MAX,
            best: None,
        }
    }

    fn descend(&mut self, position: usize, cost: u64, sum_a: u64, sum_b: u64) {
        if cost >= self.best_cost {
            return;
        }
        if sum_a >= self.threshold_a && sum_b >= self.threshold_b {
            // Weights are non-negative; selecting more never gets cheaper.
            self.best_cost = cost;
            self.best = Some(self.path.clone());
            return;
        }
        if position == self.items.len()
            || sum_a + self.rest_a[position] < self.threshold_a
            || sum_b + self.rest_b[position] < self.threshold_b
        {
            return;
        }

        let item = &self.items[position];
        let cost_with = cost + item.weight as u64;
        let wants_a = item.value_a > 0 && sum_a < self.threshold_a;
        let wants_b = item.value_b > 0 && sum_b < self.threshold_b;

        if wants_a {
            self.path.push((position, Dimension::A));
            self.descend(position + 1, cost_with, sum_a + item.value_a as u64, sum_b);
            self.path.pop();
        }
        if wants_b {
            self.path.push((position, Dimension::B));
            self.descend(position + 1, cost_with, sum_a, sum_b + item.value_b as u64);
            self.path.pop();
        }
        if !wants_a && !wants_b && item.end > position + 1 {
            // Only useful as a requirement for its descendants.
            self.path.push((position, Dimension::A));
            self.descend(position + 1, cost_with, sum_a, sum_b);
            self.path.pop();
        }

        self.descend(item.end, cost, sum_a, sum_b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Item, RegionModel};

    fn solve(region: &RegionModel, a: u32, b: u32) -> SolveStatus {
        let mut system = ConstraintSystem::build(region).unwrap();
        system.set_thresholds(a, b);
        TreeSearchSolver::new().solve(&system).unwrap()
    }

    #[test]
    fn test_zero_thresholds_select_nothing() {
        let region = RegionModel::new("r", 0, vec![Item::new(1, None, 1, 2, 0)]);
        assert_eq!(solve(&region, 0, 0), SolveStatus::Optimal(vec![0.0; 3]));
    }

    #[test]
    fn test_requirement_ancestor_is_selected() {
        // 1 (no value) -> 2 (B 5)
        let region = RegionModel::new(
            "r",
            0,
            vec![Item::new(1, None, 2, 0, 0), Item::new(2, Some(1), 3, 0, 5)],
        );
        let SolveStatus::Optimal(values) = solve(&region, 0, 5) else {
            panic!("expected optimal");
        };
        assert_eq!(values, vec![1.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_cheapest_branch_wins() {
        let region = RegionModel::new(
            "r",
            0,
            vec![
                Item::new(1, None, 5, 3, 0),
                Item::new(2, None, 1, 2, 0),
                Item::new(3, None, 1, 1, 0),
            ],
        );
        let SolveStatus::Optimal(values) = solve(&region, 3, 0) else {
            panic!("expected optimal");
        };
        // items 2 and 3 (cost 2) beat item 1 (cost 5)
        assert_eq!(values[0], 0.0);
        assert_eq!(values[3], 1.0);
        assert_eq!(values[6], 1.0);
    }

    /// Minimum objective over every 0/1 column vector satisfying all rows.
    fn brute_force(system: &ConstraintSystem) -> Option<f64> {
        let n = system.columns().len();
        (0u32..1 << n)
            .map(|mask| (0..n).map(|c| ((mask >> c) & 1) as f64).collect::<Vec<_>>())
            .filter(|values| system.violated_row(values).is_none())
            .map(|values| system.objective(&values))
            .min_by(|x, y| x.total_cmp(y))
    }

    #[test]
    fn test_matches_brute_force_over_model_rows() {
        let region = RegionModel::new(
            "r",
            0,
            vec![
                Item::new(1, None, 2, 1, 1),
                Item::new(2, Some(1), 1, 2, 0),
                Item::new(3, Some(1), 3, 0, 2),
                Item::new(4, None, 4, 3, 1),
            ],
        );
        let mut system = ConstraintSystem::build(&region).unwrap();
        for a in 0..=region.max_sum_a() + 1 {
            for b in 0..=region.max_sum_b() + 1 {
                system.set_thresholds(a, b);
                let expected = brute_force(&system);
                match TreeSearchSolver::new().solve(&system).unwrap() {
                    SolveStatus::Optimal(values) => {
                        assert!(system.violated_row(&values).is_none(), "({a}, {b})");
                        assert_eq!(Some(system.objective(&values)), expected, "({a}, {b})");
                    }
                    SolveStatus::Infeasible => assert_eq!(expected, None, "({a}, {b})"),
                }
            }
        }
    }

    #[test]
    fn test_unreachable_threshold_is_infeasible() {
        let region = RegionModel::new("r", 0, vec![Item::new(1, None, 1, 2, 3)]);
        // one item cannot count toward both dimensions
        assert_eq!(solve(&region, 2, 3), SolveStatus::Infeasible);
        assert_eq!(solve(&region, 3, 0), SolveStatus::Infeasible);
    }
}
