use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::Serialize;

use crate::error::Result;
use crate::models::{Solution, SolutionKey};

/// Set difference between an engine frontier and a reference frontier,
/// compared on `(cost, sum_a, sum_b)` only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// In the reference but not found by the engine
    pub missing: Vec<SolutionKey>,
    /// Found by the engine but absent from the reference
    pub unexpected: Vec<SolutionKey>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }
}

/// Compare two solution sets. Item selections are ignored; equally cheap
/// selections make them non-unique.
pub fn cross_validate(found: &[Solution], reference: &[Solution]) -> ValidationReport {
    let found: BTreeSet<SolutionKey> = found.iter().map(Solution::key).collect();
    let reference: BTreeSet<SolutionKey> = reference.iter().map(Solution::key).collect();

    let report = ValidationReport {
        missing: reference.difference(&found).copied().collect(),
        unexpected: found.difference(&reference).copied().collect(),
    };

    if report.passed() {
        info!("Validation passed: {} solutions agree.", found.len());
    } else {
        warn!("Validation failed.");
        warn!("  reference - found: {:?}", report.missing);
        warn!("  found - reference: {:?}", report.unexpected);
    }
    report
}

/// Read reference solutions from a JSON array of `{cost, sumA, sumB}` records.
pub fn load_reference(path: impl AsRef<Path>) -> Result<Vec<Solution>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, Dimension};

    #[test]
    fn test_identical_sets_pass() {
        let a = vec![Solution::new(0, 0, 0), Solution::new(3, 2, 5)];
        let b = vec![Solution::new(3, 2, 5), Solution::new(0, 0, 0)];
        assert!(cross_validate(&a, &b).passed());
    }

    #[test]
    fn test_item_selection_is_ignored() {
        let mut a = Solution::new(1, 2, 0);
        a.selected.push(Assignment {
            id: 1,
            dimension: Dimension::A,
        });
        let mut b = Solution::new(1, 2, 0);
        b.selected.push(Assignment {
            id: 7,
            dimension: Dimension::A,
        });
        assert!(cross_validate(&[a], &[b]).passed());
    }

    #[test]
    fn test_differences_are_reported() {
        let found = vec![Solution::new(0, 0, 0), Solution::new(4, 2, 5)];
        let reference = vec![Solution::new(0, 0, 0), Solution::new(3, 2, 5)];
        let report = cross_validate(&found, &reference);
        assert!(!report.passed());
        assert_eq!(
            report.missing,
            vec![SolutionKey {
                cost: 3,
                sum_a: 2,
                sum_b: 5
            }]
        );
        assert_eq!(
            report.unexpected,
            vec![SolutionKey {
                cost: 4,
                sum_a: 2,
                sum_b: 5
            }]
        );
    }

    #[test]
    fn test_load_reference_reads_flat_records() {
        let path = std::env::temp_dir().join(format!("frontier_ref_{}.json", std::process::id()));
        let records = r#"[{"cost": 0, "sumA": 0, "sumB": 0}, {"cost": 2, "sumA": 0, "sumB": 1}]"#;
        fs::write(&path, records).unwrap();
        let reference = load_reference(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(reference, vec![Solution::new(0, 0, 0), Solution::new(2, 0, 1)]);
    }
}
