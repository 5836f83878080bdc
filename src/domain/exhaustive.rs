//! Exact reference frontier by exhaustive enumeration.
//!
//! Every connected selection (a set of items closed under requirements) is walked
//! in pre-order together with every useful dimension choice of its items. Skipping
//! an item jumps over its whole subtree. Nothing here touches a solver, so the
//! result can cross-check the oracle-driven enumerators. Runtime grows with the
//! number of selections, see `RegionTree::count_selections`.

use log::info;

use crate::domain::dominance::retain_dominating;
use crate::domain::grid::SolutionGrid;
use crate::domain::region_tree::RegionTree;
use crate::error::Result;
use crate::models::{Assignment, Dimension, Item, RegionModel, Solution};

pub fn exhaustive_frontier(region: &RegionModel) -> Result<Vec<Solution>> {
    let tree = RegionTree::new(region)?;
    let items: Vec<&Item> = tree.order.iter().map(|&i| &region.items()[i]).collect();

    let mut walk = Walk {
        items: &items,
        ends: &tree.ends,
        grid: SolutionGrid::new(region.max_sum_a(), region.max_sum_b()),
        path: Vec::with_capacity(items.len()),
        visited: 0,
    };
    walk.visit(0, Solution::new(0, 0, 0))?;
    info!(
        "Exhaustive walk visited {} selections yielding {} distinct pairs.",
        walk.visited,
        walk.grid.len()
    );

    let mut solutions = walk.grid.into_solutions();
    retain_dominating(&mut solutions);
    solutions.sort_unstable_by_key(|s| (s.sum_b, s.sum_a));
    Ok(solutions)
}

struct Walk<'a> {
    items: &'a [&'a Item],
    ends: &'a [usize],
    grid: SolutionGrid,
    path: Vec<Assignment>,
    visited: u64,
}

impl Walk<'_> {
    fn visit(&mut self, position: usize, current: Solution) -> Result<()> {
        if position == self.items.len() {
            self.visited += 1;
            let mut solution = current;
            solution.selected = self.path.clone();
            self.grid.insert_or_update(&solution)?;
            return Ok(());
        }

        let items = self.items;
        let item = items[position];
        for &dimension in dimensions(item) {
            let mut next = current.clone();
            next.cost += item.weight;
            match dimension {
                Dimension::A => next.sum_a += item.value_a,
                Dimension::B => next.sum_b += item.value_b,
            }
            self.path.push(Assignment {
                id: item.id,
                dimension,
            });
            self.visit(position + 1, next)?;
            self.path.pop();
        }

        self.visit(self.ends[position], current)
    }
}

fn dimensions(item: &Item) -> &'static [Dimension] {
    match (item.value_a > 0, item.value_b > 0) {
        (true, true) => &[Dimension::A, Dimension::B],
        (false, true) => &[Dimension::B],
        _ => &[Dimension::A],
    }
}
