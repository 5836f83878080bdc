use crate::models::Solution;

/// `s1` dominates `s2` when it costs no more and reaches at least as much in both
/// dimensions, and is strictly better somewhere. Equal triples do not dominate
/// each other.
#[inline(always)]
pub fn dominates(s1: &Solution, s2: &Solution) -> bool {
    s1.cost <= s2.cost
        && s1.sum_a >= s2.sum_a
        && s1.sum_b >= s2.sum_b
        && (s1.cost < s2.cost || s1.sum_a > s2.sum_a || s1.sum_b > s2.sum_b)
}

/// Reduce `solutions` to its Pareto frontier in place.
///
/// One pass: `0..j` holds the confirmed non-dominated entries. Candidate `i` is
/// checked only against that prefix and the unscanned suffix `i+1..`; if nothing
/// there dominates it, it is swapped into the prefix. Transitivity of dominance
/// covers the entries already dropped.
pub fn retain_dominating(solutions: &mut Vec<Solution>) {
    let mut j = 0;
    for i in 0..solutions.len() {
        if (0..j)
            .chain(i + 1..solutions.len())
            .all(|k| !dominates(&solutions[k], &solutions[i]))
        {
            solutions.swap(i, j);
            j += 1;
        }
    }
    solutions.truncate(j);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(solutions: &[Solution]) -> Vec<(u32, u32, u32)> {
        let mut keys: Vec<_> = solutions.iter().map(|s| (s.cost, s.sum_a, s.sum_b)).collect();
        keys.sort();
        keys
    }

    fn sample() -> Vec<Solution> {
        vec![
            Solution::new(4, 2, 5),
            Solution::new(5, 2, 5), // dominated: costs more
            Solution::new(1, 2, 0),
            Solution::new(1, 1, 0), // dominated: less A
            Solution::new(0, 0, 0),
            Solution::new(3, 0, 5),
            Solution::new(6, 1, 4), // dominated by (4, 2, 5)
        ]
    }

    #[test]
    fn test_dominates_requires_strict_improvement() {
        let s = Solution::new(3, 2, 2);
        assert!(!dominates(&s, &s));
        assert!(dominates(&Solution::new(2, 2, 2), &s));
        assert!(dominates(&Solution::new(3, 3, 2), &s));
        assert!(dominates(&Solution::new(3, 2, 3), &s));
        assert!(!dominates(&Solution::new(2, 1, 3), &s));
    }

    #[test]
    fn test_retain_dominating_keeps_frontier() {
        let mut solutions = sample();
        retain_dominating(&mut solutions);
        assert_eq!(
            keys(&solutions),
            vec![(0, 0, 0), (1, 2, 0), (3, 0, 5), (4, 2, 5)]
        );
    }

    #[test]
    fn test_no_survivor_dominates_another() {
        let mut solutions = sample();
        retain_dominating(&mut solutions);
        for s1 in &solutions {
            for s2 in &solutions {
                assert!(!dominates(s1, s2));
            }
        }
    }

    #[test]
    fn test_retain_dominating_is_idempotent() {
        let mut once = sample();
        retain_dominating(&mut once);
        let mut twice = once.clone();
        retain_dominating(&mut twice);
        assert_eq!(keys(&once), keys(&twice));
    }

    #[test]
    fn test_exact_ties_both_survive() {
        let mut solutions = vec![Solution::new(2, 1, 1), Solution::new(2, 1, 1)];
        retain_dominating(&mut solutions);
        assert_eq!(solutions.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let mut solutions: Vec<Solution> = Vec::new();
        retain_dominating(&mut solutions);
        assert!(solutions.is_empty());
    }
}
