use std::collections::hash_map::DefaultHasher;
use std::fmt::Write as _;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use crate::domain::region_tree::RegionTree;
use crate::error::Result;
use crate::models::{ItemId, RegionModel};

pub const SUM_A_ROW: &str = "sum_a_lb";
pub const SUM_B_ROW: &str = "sum_b_lb";

/// Sense of a constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// `row == rhs`
    Equal,
    /// `row <= rhs`
    Less,
    /// `row >= rhs`
    Greater,
}

/// A binary decision variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cost: f64,
}

/// A sparse constraint row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub name: String,
    pub kind: RowKind,
    pub rhs: f64,
    /// `(column index, coefficient)`, zero coefficients omitted.
    pub entries: Vec<(usize, f64)>,
}

/// Column indices and data of one non-root item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemColumns {
    pub id: ItemId,
    pub weight: u32,
    pub value_a: u32,
    pub value_b: u32,
    pub selected: usize,
    pub state_a: usize,
    pub state_b: usize,
    /// One past the last layout position of this item's subtree.
    pub end: usize,
}

/// The integer program of one region: minimize selection weight subject to the
/// requirement forest and two adjustable lower bounds on the dimension sums.
///
/// Items appear in requirement pre-order, three columns each
/// (`sel_<id>`, `a_<id>`, `b_<id>`). The threshold rows are always the last two.
#[derive(Debug, Clone)]
pub struct ConstraintSystem {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
    layout: Vec<ItemColumns>,
    thresholds: (u32, u32),
    structure: u64,
}

impl ConstraintSystem {
    /// Build the model for `region`. Fails on a malformed requirement relation.
    pub fn build(region: &RegionModel) -> Result<Self> {
        let tree = RegionTree::new(region)?;
        let items = region.items();

        let mut columns = Vec::with_capacity(3 * tree.len());
        let mut layout = Vec::with_capacity(tree.len());
        for (position, &index) in tree.order.iter().enumerate() {
            let item = &items[index];
            let selected = columns.len();
            columns.push(Column {
                name: format!("sel_{}", item.id),
                cost: item.weight as f64,
            });
            columns.push(Column {
                name: format!("a_{}", item.id),
                cost: 0.0,
            });
            columns.push(Column {
                name: format!("b_{}", item.id),
                cost: 0.0,
            });
            layout.push(ItemColumns {
                id: item.id,
                weight: item.weight,
                value_a: item.value_a,
                value_b: item.value_b,
                selected,
                state_a: selected + 1,
                state_b: selected + 2,
                end: tree.ends[position],
            });
        }

        let mut rows = Vec::with_capacity(2 * layout.len() + 2);

        // One state on selected items, no state otherwise.
        for item in &layout {
            rows.push(Row {
                name: format!("assign_{}", item.id),
                kind: RowKind::Equal,
                rhs: 0.0,
                entries: vec![(item.selected, 1.0), (item.state_a, -1.0), (item.state_b, -1.0)],
            });
        }

        // Requirement edges; transitive back to the root.
        for (position, item) in layout.iter().enumerate() {
            if let Some(parent) = tree.parents[position] {
                rows.push(Row {
                    name: format!("req_{}", item.id),
                    kind: RowKind::Less,
                    rhs: 0.0,
                    entries: vec![(item.selected, 1.0), (layout[parent].selected, -1.0)],
                });
            }
        }

        rows.push(Row {
            name: SUM_A_ROW.to_string(),
            kind: RowKind::Greater,
            rhs: 0.0,
            entries: layout
                .iter()
                .filter(|i| i.value_a > 0)
                .map(|i| (i.state_a, i.value_a as f64))
                .collect(),
        });
        rows.push(Row {
            name: SUM_B_ROW.to_string(),
            kind: RowKind::Greater,
            rhs: 0.0,
            entries: layout
                .iter()
                .filter(|i| i.value_b > 0)
                .map(|i| (i.state_b, i.value_b as f64))
                .collect(),
        });

        let structure = structure_hash(&columns, &rows);
        Ok(Self {
            name: region.name().to_string(),
            columns,
            rows,
            layout,
            thresholds: (0, 0),
            structure,
        })
    }

    /// Change the dimension lower bounds in place.
    pub fn set_thresholds(&mut self, threshold_a: u32, threshold_b: u32) {
        let (row_a, row_b) = self.threshold_rows();
        self.rows[row_a].rhs = threshold_a as f64;
        self.rows[row_b].rhs = threshold_b as f64;
        self.thresholds = (threshold_a, threshold_b);
    }

    pub fn thresholds(&self) -> (u32, u32) {
        self.thresholds
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Per-item columns in requirement pre-order.
    pub fn layout(&self) -> &[ItemColumns] {
        &self.layout
    }

    /// Fingerprint of everything except the threshold values. Backends key their
    /// cached native models on it.
    pub fn structure(&self) -> u64 {
        self.structure
    }

    /// Indices of the `sum_a_lb` and `sum_b_lb` rows.
    pub fn threshold_rows(&self) -> (usize, usize) {
        let n = self.rows.len();
        (n - 2, n - 1)
    }

    /// First row that `values` (one per column, rounded) does not satisfy.
    pub fn violated_row(&self, values: &[f64]) -> Option<&Row> {
        let value = |col: usize| values.get(col).map_or(0.0, |v| v.round());
        self.rows.iter().find(|row| {
            let lhs: f64 = row.entries.iter().map(|&(col, coeff)| coeff * value(col)).sum();
            match row.kind {
                RowKind::Equal => (lhs - row.rhs).abs() > 1e-6,
                RowKind::Less => lhs > row.rhs + 1e-6,
                RowKind::Greater => lhs < row.rhs - 1e-6,
            }
        })
    }

    /// Objective value of `values`.
    pub fn objective(&self, values: &[f64]) -> f64 {
        self.columns
            .iter()
            .zip(values)
            .map(|(column, value)| column.cost * value.round())
            .sum()
    }

    /// Render the model in fixed-layout MPS.
    pub fn to_mps(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "NAME          {}", self.name.replace(' ', "_"));
        let _ = writeln!(out, "ROWS");
        let _ = writeln!(out, " N  COST");
        for row in &self.rows {
            let sense = match row.kind {
                RowKind::Equal => "E",
                RowKind::Less => "L",
                RowKind::Greater => "G",
            };
            let _ = writeln!(out, " {:<2} {}", sense, row.name);
        }

        // column -> (row name, coefficient) in row order
        let mut by_column: Vec<Vec<(&str, f64)>> = vec![Vec::new(); self.columns.len()];
        for row in &self.rows {
            for &(col, val) in &row.entries {
                by_column[col].push((row.name.as_str(), val));
            }
        }

        let _ = writeln!(out, "COLUMNS");
        let _ = writeln!(out, "    MARKER                 'MARKER'                 'INTORG'");
        for (column, entries) in self.columns.iter().zip(&by_column) {
            if column.cost != 0.0 {
                let _ = writeln!(out, "    {:<8}  {:<8}  {}", column.name, "COST", column.cost);
            }
            for (row, val) in entries {
                let _ = writeln!(out, "    {:<8}  {:<8}  {}", column.name, row, val);
            }
        }
        let _ = writeln!(out, "    MARKER                 'MARKER'                 'INTEND'");

        let _ = writeln!(out, "RHS");
        for row in self.rows.iter().filter(|r| r.rhs != 0.0) {
            let _ = writeln!(out, "    {:<8}  {:<8}  {}", "RHS", row.name, row.rhs);
        }

        let _ = writeln!(out, "BOUNDS");
        for column in &self.columns {
            let _ = writeln!(out, " BV {:<8}  {}", "BND", column.name);
        }
        let _ = writeln!(out, "ENDATA");
        out
    }

    /// Write the MPS export next to `path` without clobbering an existing file:
    /// `model.mps`, then `model(1).mps`, `model(2).mps`, ...
    pub fn write_mps(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = unique_path(path.as_ref());
        fs::write(&path, self.to_mps())?;
        Ok(path)
    }
}

fn structure_hash(columns: &[Column], rows: &[Row]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for column in columns {
        column.name.hash(&mut hasher);
        column.cost.to_bits().hash(&mut hasher);
    }
    for row in rows {
        row.name.hash(&mut hasher);
        (row.kind as u8).hash(&mut hasher);
        for &(col, coeff) in &row.entries {
            col.hash(&mut hasher);
            coeff.to_bits().hash(&mut hasher);
        }
    }
    hasher.finish()
}

fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
    (1..)
        .map(|i| {
            let name = match &ext {
                Some(ext) => format!("{stem}({i}).{ext}"),
                None => format!("{stem}({i})"),
            };
            path.with_file_name(name)
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}
