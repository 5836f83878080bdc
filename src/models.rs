use serde::{Deserialize, Serialize};

pub type ItemId = u32;

// ---------- Region input ----------

/// A selectable unit of a region.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    /// Item that must be selected first; `None` (or the root id) means only the root.
    #[serde(default)]
    pub parent: Option<ItemId>,
    pub weight: u32,
    #[serde(default)]
    pub value_a: u32,
    #[serde(default)]
    pub value_b: u32,
}

impl Item {
    pub fn new(
        id: ItemId,
        parent: Option<ItemId>,
        weight: u32,
        value_a: u32,
        value_b: u32,
    ) -> Self {
        Self {
            id,
            parent,
            weight,
            value_a,
            value_b,
        }
    }

    fn root(id: ItemId) -> Self {
        Self::new(id, None, 0, 0, 0)
    }
}

#[derive(Serialize, Deserialize)]
struct RegionFile {
    name: String,
    root: ItemId,
    items: Vec<Item>,
}

/// The items of one region together with the synthetic root at index 0.
///
/// The root is always implicitly selected and never costs or contributes anything;
/// it only anchors the requirement forest.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(from = "RegionFile", into = "RegionFile")]
pub struct RegionModel {
    name: String,
    items: Vec<Item>,
}

impl From<RegionFile> for RegionModel {
    fn from(file: RegionFile) -> Self {
        RegionModel::new(file.name, file.root, file.items)
    }
}

impl From<RegionModel> for RegionFile {
    fn from(region: RegionModel) -> Self {
        let root = region.root().id;
        let mut items = region.items;
        items.remove(0);
        RegionFile {
            name: region.name,
            root,
            items,
        }
    }
}

impl RegionModel {
    /// Create a region rooted at `root`. An item carrying the root id is dropped
    /// in favour of the synthetic root.
    pub fn new(name: impl Into<String>, root: ItemId, items: Vec<Item>) -> Self {
        let mut all = Vec::with_capacity(items.len() + 1);
        all.push(Item::root(root));
        all.extend(items.into_iter().filter(|item| item.id != root));
        Self {
            name: name.into(),
            items: all,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Item {
        &self.items[0]
    }

    /// Non-root items in input order.
    pub fn items(&self) -> &[Item] {
        &self.items[1..]
    }

    /// All items, root first.
    pub fn all_items(&self) -> &[Item] {
        &self.items
    }

    /// Upper bound of any achievable dimension A sum.
    pub fn max_sum_a(&self) -> u32 {
        self.items().iter().map(|i| i.value_a).sum()
    }

    /// Upper bound of any achievable dimension B sum.
    pub fn max_sum_b(&self) -> u32 {
        self.items().iter().map(|i| i.value_b).sum()
    }

    /// Independent copy handed to a parallel worker.
    pub fn clone_for_worker(&self) -> RegionModel {
        self.clone()
    }
}

// ---------- Solutions ----------

/// The value dimension a selected item counts toward.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    A,
    B,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub id: ItemId,
    pub dimension: Dimension,
}

/// The `(cost, sumA, sumB)` triple used for comparison and flat output.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub struct SolutionKey {
    pub cost: u32,
    pub sum_a: u32,
    pub sum_b: u32,
}

/// A cost-optimal selection for some threshold pair.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub cost: u32,
    pub sum_a: u32,
    pub sum_b: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected: Vec<Assignment>,
}

impl Solution {
    pub fn new(cost: u32, sum_a: u32, sum_b: u32) -> Self {
        Self {
            cost,
            sum_a,
            sum_b,
            selected: Vec::new(),
        }
    }

    pub fn key(&self) -> SolutionKey {
        SolutionKey {
            cost: self.cost,
            sum_a: self.sum_a,
            sum_b: self.sum_b,
        }
    }

    pub fn selected_ids(&self) -> Vec<ItemId> {
        self.selected.iter().map(|a| a.id).collect()
    }
}

impl From<SolutionKey> for Solution {
    fn from(key: SolutionKey) -> Self {
        Solution::new(key.cost, key.sum_a, key.sum_b)
    }
}
