//! Greedy lowest-cost-first assignment
//!
//! Not optimal, but cheap and order-stable. Useful as a baseline against the
//! Hungarian solver.

use ndarray::Array2;

use super::hungarian::HungarianResult;

/// Repeatedly take the cheapest feasible pair whose row and column are both free.
///
/// Ties are broken by row, then column, so results are deterministic.
pub fn greedy(perf: &Array2<f64>) -> HungarianResult {
    let (m, n) = perf.dim();

    let mut edges: Vec<(f64, usize, usize)> = perf
        .indexed_iter()
        .filter(|(_, v)| v.is_finite())
        .map(|((i, j), &v)| (v, i, j))
        .collect();
    edges.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut row_used = vec![false; m];
    let mut col_used = vec![false; n];
    let mut assignments = Vec::new();
    let mut cost = 0.0;

    for (v, i, j) in edges {
        if row_used[i] || col_used[j] {
            continue;
        }
        row_used[i] = true;
        col_used[j] = true;
        assignments.push((i, j));
        cost += v;
    }

    assignments.sort_unstable();
    HungarianResult { assignments, cost }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_greedy_takes_cheapest_first() {
        // Greedy picks (0,0)=0.1 and is then forced into (1,1)=0.9,
        // where the optimum would be 0.2 + 0.3.
        let perf = array![[0.1, 0.2], [0.3, 0.9]];
        let result = greedy(&perf);
        assert_eq!(result.assignments, vec![(0, 0), (1, 1)]);
        assert!((result.cost - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_greedy_skips_non_edges() {
        let inf = f64::INFINITY;
        let perf = array![[inf, 0.4], [inf, 0.2]];
        let result = greedy(&perf);
        assert_eq!(result.assignments, vec![(1, 1)]);
    }
}
