//! Hungarian (Munkres) algorithm for optimal assignment
//!
//! Finds the minimum cost assignment in a bipartite graph given as a cost
//! matrix. Entries equal to `f64::INFINITY` (or NaN) are non-edges: they are
//! never part of the returned assignment. Rows or columns with no feasible
//! entry are dropped before solving, the remainder is padded to a square
//! matrix, and non-edges are replaced by a cost larger than any feasible
//! assignment so the solver prefers more feasible pairs over fewer.

use ndarray::Array2;

use crate::common::constants::HUNGARIAN_ZERO_TOLERANCE;

/// Hungarian algorithm result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HungarianResult {
    /// Assigned `(row, col)` pairs, sorted by row
    pub assignments: Vec<(usize, usize)>,
    /// Total cost of the assigned pairs
    pub cost: f64,
}

#[inline]
fn is_feasible(v: f64) -> bool {
    v.is_finite()
}

/// Hungarian algorithm for optimal assignment
///
/// # Arguments
/// * `perf` - Cost matrix (MxN). Use `f64::INFINITY` for impossible assignments.
///
/// # Returns
/// HungarianResult with the feasible assigned pairs and their total cost
pub fn hungarian(perf: &Array2<f64>) -> HungarianResult {
    let (m, n) = perf.dim();

    // Connected vertices (rows/columns with at least one feasible entry)
    let x_con: Vec<usize> = (0..m)
        .filter(|&i| perf.row(i).iter().any(|&v| is_feasible(v)))
        .collect();
    let y_con: Vec<usize> = (0..n)
        .filter(|&j| perf.column(j).iter().any(|&v| is_feasible(v)))
        .collect();

    if x_con.is_empty() || y_con.is_empty() {
        return HungarianResult::default();
    }

    let mut min_cost = f64::INFINITY;
    let mut max_cost = f64::NEG_INFINITY;
    for &i in &x_con {
        for &j in &y_con {
            let v = perf[(i, j)];
            if is_feasible(v) {
                min_cost = min_cost.min(v);
                max_cost = max_cost.max(v);
            }
        }
    }

    // Shifted feasible costs lie in [0, range]; any assignment containing one
    // more non-edge costs more than all feasible pairs combined.
    let size = x_con.len().max(y_con.len());
    let range = max_cost - min_cost;
    let forbidden = (range + 1.0) * (size as f64 + 1.0);

    let mut cond = Array2::zeros((size, size));
    for (i_new, &i_old) in x_con.iter().enumerate() {
        for (j_new, &j_old) in y_con.iter().enumerate() {
            let v = perf[(i_old, j_old)];
            cond[(i_new, j_new)] = if is_feasible(v) { v - min_cost } else { forbidden };
        }
    }

    let stars = Munkres::new(cond).solve();

    let mut assignments = Vec::new();
    let mut cost = 0.0;
    for (i_new, star) in stars.into_iter().enumerate() {
        let Some(j_new) = star else { continue };
        if i_new >= x_con.len() || j_new >= y_con.len() {
            continue; // padding
        }
        let (i, j) = (x_con[i_new], y_con[j_new]);
        let v = perf[(i, j)];
        if is_feasible(v) {
            assignments.push((i, j));
            cost += v;
        }
    }

    HungarianResult { assignments, cost }
}

/// Square Munkres solver state
struct Munkres {
    cost: Array2<f64>,
    size: usize,
    star_in_row: Vec<Option<usize>>,
    star_in_col: Vec<Option<usize>>,
    prime_in_row: Vec<Option<usize>>,
    row_covered: Vec<bool>,
    col_covered: Vec<bool>,
}

impl Munkres {
    fn new(cost: Array2<f64>) -> Self {
        let size = cost.nrows();
        Self {
            cost,
            size,
            star_in_row: vec![None; size],
            star_in_col: vec![None; size],
            prime_in_row: vec![None; size],
            row_covered: vec![false; size],
            col_covered: vec![false; size],
        }
    }

    #[inline]
    fn is_zero(&self, i: usize, j: usize) -> bool {
        self.cost[(i, j)].abs() <= HUNGARIAN_ZERO_TOLERANCE
    }

    /// Solve and return the starred column of every row
    fn solve(mut self) -> Vec<Option<usize>> {
        self.reduce();
        self.star_initial_zeros();

        loop {
            if self.cover_starred_columns() == self.size {
                break;
            }
            loop {
                match self.find_uncovered_zero() {
                    None => self.adjust_by_min_uncovered(),
                    Some((r, c)) => {
                        self.prime_in_row[r] = Some(c);
                        match self.star_in_row[r] {
                            Some(sc) => {
                                self.row_covered[r] = true;
                                self.col_covered[sc] = false;
                            }
                            None => {
                                self.augment(r, c);
                                break;
                            }
                        }
                    }
                }
            }
        }

        self.star_in_row
    }

    /// Subtract row minimums, then column minimums
    fn reduce(&mut self) {
        for mut row in self.cost.rows_mut() {
            let min = row.iter().cloned().fold(f64::INFINITY, f64::min);
            row.mapv_inplace(|v| v - min);
        }
        for mut col in self.cost.columns_mut() {
            let min = col.iter().cloned().fold(f64::INFINITY, f64::min);
            col.mapv_inplace(|v| v - min);
        }
    }

    fn star_initial_zeros(&mut self) {
        for i in 0..self.size {
            for j in 0..self.size {
                if self.star_in_row[i].is_none()
                    && self.star_in_col[j].is_none()
                    && self.is_zero(i, j)
                {
                    self.star_in_row[i] = Some(j);
                    self.star_in_col[j] = Some(i);
                }
            }
        }
    }

    fn cover_starred_columns(&mut self) -> usize {
        let mut covered = 0;
        for j in 0..self.size {
            self.col_covered[j] = self.star_in_col[j].is_some();
            if self.col_covered[j] {
                covered += 1;
            }
        }
        covered
    }

    fn find_uncovered_zero(&self) -> Option<(usize, usize)> {
        for i in (0..self.size).filter(|&i| !self.row_covered[i]) {
            for j in (0..self.size).filter(|&j| !self.col_covered[j]) {
                if self.is_zero(i, j) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// Add the minimum uncovered value to covered rows and subtract it from
    /// uncovered columns
    fn adjust_by_min_uncovered(&mut self) {
        let mut min = f64::INFINITY;
        for i in (0..self.size).filter(|&i| !self.row_covered[i]) {
            for j in (0..self.size).filter(|&j| !self.col_covered[j]) {
                min = min.min(self.cost[(i, j)]);
            }
        }

        for i in 0..self.size {
            for j in 0..self.size {
                if self.row_covered[i] {
                    self.cost[(i, j)] += min;
                }
                if !self.col_covered[j] {
                    self.cost[(i, j)] -= min;
                }
            }
        }
    }

    /// Flip stars and primes along the alternating path starting at the
    /// primed zero `(row, col)`, then clear covers and primes
    fn augment(&mut self, row: usize, col: usize) {
        let mut path = vec![(row, col)];
        loop {
            let (_, c) = path[path.len() - 1];
            let Some(r) = self.star_in_col[c] else { break };
            path.push((r, c));
            // A starred row on the path always carries a prime
            let Some(pc) = self.prime_in_row[r] else { break };
            path.push((r, pc));
        }

        // Unstar first so re-starring a column cannot be clobbered
        for &(r, c) in &path {
            if self.star_in_row[r] == Some(c) {
                self.star_in_row[r] = None;
                self.star_in_col[c] = None;
            }
        }
        for &(r, c) in &path {
            if self.prime_in_row[r] == Some(c) {
                self.star_in_row[r] = Some(c);
                self.star_in_col[c] = Some(r);
            }
        }

        self.row_covered.fill(false);
        self.col_covered.fill(false);
        self.prime_in_row.fill(None);
    }
}
