use std::collections::HashMap;

use crate::error::{FrontierError, Result};
use crate::models::{Item, RegionModel};

/// The requirement forest of a region laid out in traversal pre-order.
///
/// Position `p` holds `order[p]`, an index into `RegionModel::items()`. The subtree
/// rooted at position `p` covers `p..ends[p]`, so skipping a node and all of its
/// descendants is a jump to `ends[p]`.
#[derive(Clone, Debug)]
pub struct RegionTree {
    pub order: Vec<usize>,
    pub ends: Vec<usize>,
    /// Pre-order position of each node's parent; `None` for children of the root.
    pub parents: Vec<Option<usize>>,
}

impl RegionTree {
    /// Validate the region's requirement relation and arrange it in pre-order.
    ///
    /// Fails on duplicate ids, requirements naming unknown items, and any item that
    /// cannot be reached from the root (a requirement cycle).
    pub fn new(region: &RegionModel) -> Result<Self> {
        let root_id = region.root().id;
        let items = region.items();

        let mut index_of: HashMap<u32, usize> = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            if index_of.insert(item.id, i).is_some() {
                return Err(FrontierError::MalformedRegion(format!(
                    "{}: duplicate item id {}",
                    region.name(),
                    item.id
                )));
            }
        }

        // parent -> children adjacency; `None` is the root.
        let mut roots: Vec<usize> = Vec::new();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
        for (i, item) in items.iter().enumerate() {
            match parent_index(item, root_id, &index_of) {
                Ok(None) => roots.push(i),
                Ok(Some(p)) => children[p].push(i),
                Err(parent) => {
                    return Err(FrontierError::MalformedRegion(format!(
                        "{}: item {} requires unknown item {}",
                        region.name(),
                        item.id,
                        parent
                    )))
                }
            }
        }

        let mut order = Vec::with_capacity(items.len());
        let mut parents = Vec::with_capacity(items.len());
        let mut stack: Vec<(usize, Option<usize>)> =
            roots.iter().rev().map(|&i| (i, None)).collect();
        while let Some((node, parent)) = stack.pop() {
            let position = order.len();
            order.push(node);
            parents.push(parent);
            for &child in children[node].iter().rev() {
                stack.push((child, Some(position)));
            }
        }

        if order.len() != items.len() {
            let mut reached = vec![false; items.len()];
            order.iter().for_each(|&i| reached[i] = true);
            let cyclic: Vec<u32> = items
                .iter()
                .zip(reached)
                .filter(|(_, r)| !r)
                .map(|(item, _)| item.id)
                .collect();
            return Err(FrontierError::MalformedRegion(format!(
                "{}: requirement cycle through items {:?}",
                region.name(),
                cyclic
            )));
        }

        let ends = subtree_ends(&parents);
        Ok(Self {
            order,
            ends,
            parents,
        })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of non-empty connected selections, counting each dimension an item
    /// can usefully take as a separate selection. Saturates at `u128::MAX`.
    pub fn count_selections(&self, region: &RegionModel) -> u128 {
        let items = region.items();
        // Children follow their parents in pre-order, so a reverse walk sees
        // every subtree before its root.
        let mut counts = vec![1u128; self.len()];
        let mut total = 1u128;
        for p in (0..self.len()).rev() {
            let here = counts[p].saturating_mul(state_count(&items[self.order[p]]));
            let options = here.saturating_add(1);
            match self.parents[p] {
                Some(parent) => counts[parent] = counts[parent].saturating_mul(options),
                None => total = total.saturating_mul(options),
            }
        }
        total - 1
    }
}

/// Number of dimensions an item can be assigned to without wasting it.
pub(crate) fn state_count(item: &Item) -> u128 {
    match (item.value_a > 0, item.value_b > 0) {
        (true, true) => 2,
        _ => 1,
    }
}

fn parent_index(
    item: &Item,
    root_id: u32,
    index_of: &HashMap<u32, usize>,
) -> std::result::Result<Option<usize>, u32> {
    match item.parent {
        None => Ok(None),
        Some(p) if p == root_id => Ok(None),
        Some(p) => index_of.get(&p).map(|&i| Some(i)).ok_or(p),
    }
}

/// One-past-last pre-order position of each subtree. Parents must precede children.
fn subtree_ends(parents: &[Option<usize>]) -> Vec<usize> {
    let mut ends: Vec<usize> = (1..=parents.len()).collect();
    for p in (0..parents.len()).rev() {
        if let Some(parent) = parents[p] {
            ends[parent] = ends[parent].max(ends[p]);
        }
    }
    ends
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(items: Vec<Item>) -> RegionModel {
        RegionModel::new("test", 0, items)
    }

    #[test]
    fn test_pre_order_and_jump_indices() {
        // 0 -> 1 -> {2, 3}, 0 -> 4
        let region = region(vec![
            Item::new(1, None, 1, 1, 0),
            Item::new(4, Some(0), 1, 1, 0),
            Item::new(2, Some(1), 1, 1, 0),
            Item::new(3, Some(1), 1, 1, 0),
        ]);
        let tree = RegionTree::new(&region).unwrap();
        let ids: Vec<u32> = tree.order.iter().map(|&i| region.items()[i].id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(tree.ends, vec![3, 2, 3, 4]);
        assert_eq!(tree.parents, vec![None, Some(0), Some(0), None]);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let region = region(vec![
            Item::new(1, None, 1, 1, 0),
            Item::new(2, Some(3), 1, 1, 0),
            Item::new(3, Some(2), 1, 1, 0),
        ]);
        let err = RegionTree::new(&region).unwrap_err();
        assert!(matches!(err, FrontierError::MalformedRegion(_)));
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_self_requirement_is_rejected() {
        let region = region(vec![Item::new(1, Some(1), 1, 1, 0)]);
        assert!(RegionTree::new(&region).is_err());
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let region = region(vec![Item::new(1, Some(42), 1, 1, 0)]);
        let err = RegionTree::new(&region).unwrap_err();
        assert!(err.to_string().contains("unknown item 42"));
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let region = region(vec![Item::new(1, None, 1, 1, 0), Item::new(1, None, 2, 0, 1)]);
        assert!(RegionTree::new(&region).is_err());
    }

    #[test]
    fn test_count_selections() {
        // 1 (A or B) -> 2 (A only): {1a}, {1b}, {1a,2}, {1b,2}
        let region = region(vec![Item::new(1, None, 1, 1, 1), Item::new(2, Some(1), 1, 1, 0)]);
        let tree = RegionTree::new(&region).unwrap();
        assert_eq!(tree.count_selections(&region), 4);
    }
}
