use crate::linear_assignment::cancellation::{self, Cancellation};
use crate::linear_assignment::cost::{check_headroom, Cost};
use crate::linear_assignment::cost_matrix::SquareCostMatrix;
use crate::linear_assignment::error::{AssignmentError, AssignmentResult};
use crate::linear_assignment::AssignmentSolver;
use log::{debug, trace};

/// Jonker-Volgenant style solver: rows are matched one at a time along shortest
/// augmenting paths in the reduced costs `cost[i][j] - u[i] - v[j]`.
pub struct ShortestAugmentingPath<C> {
    n: usize,
    costs: Vec<Option<C>>,

    // dual potentials
    u: Vec<C>,
    v: Vec<C>,

    col_for_row: Vec<Option<usize>>,
    row_for_col: Vec<Option<usize>>,

    // per-row search
    shortest_path_costs: Vec<Option<C>>,
    predecessors: Vec<usize>,
    scanned_rows: Vec<bool>,
    scanned_cols: Vec<bool>,
    remaining: Vec<usize>,

    cancellation: Option<Cancellation>,
}

impl<C> Default for ShortestAugmentingPath<C> {
    fn default() -> Self {
        Self {
            n: 0,
            costs: Vec::new(),
            u: Vec::new(),
            v: Vec::new(),
            col_for_row: Vec::new(),
            row_for_col: Vec::new(),
            shortest_path_costs: Vec::new(),
            predecessors: Vec::new(),
            scanned_rows: Vec::new(),
            scanned_cols: Vec::new(),
            remaining: Vec::new(),
            cancellation: None,
        }
    }
}

impl<C> ShortestAugmentingPath<C>
where
    C: Cost,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    pub fn solve(&mut self, matrix: SquareCostMatrix<C>) -> AssignmentResult<Vec<usize>> {
        debug!("shortest augmenting path: solving {}x{}", matrix.size(), matrix.size());
        self.load(&matrix)?;

        for cur_row in 0..self.n {
            cancellation::check(self.cancellation.as_ref())?;
            self.augment_row(cur_row)?;
        }

        let assignment = self.assignment();
        debug!("shortest augmenting path: done, {} rows assigned", assignment.len());
        Ok(assignment)
    }

    #[inline]
    pub fn row_potentials(&self) -> &[C] {
        &self.u
    }

    #[inline]
    pub fn column_potentials(&self) -> &[C] {
        &self.v
    }

    pub(crate) fn load(&mut self, matrix: &SquareCostMatrix<C>) -> AssignmentResult<()> {
        let n = matrix.size();
        check_headroom(matrix.max_finite_cost(), n)?;

        self.n = n;
        self.costs = (0..n * n).map(|k| matrix.entry(k / n, k % n).working_cost()).collect();
        self.u = vec![C::zero(); n];
        self.v = vec![C::zero(); n];
        self.col_for_row = vec![None; n];
        self.row_for_col = vec![None; n];
        self.shortest_path_costs = vec![None; n];
        self.predecessors = vec![usize::MAX; n];
        self.scanned_rows = vec![false; n];
        self.scanned_cols = vec![false; n];
        self.remaining = Vec::with_capacity(n);
        Ok(())
    }

    pub(crate) fn augment_row(&mut self, cur_row: usize) -> AssignmentResult<()> {
        let (sink, min_val) = self.find_augmenting_path(cur_row)?;
        trace!("shortest augmenting path: row {} reaches column {} at {:?}", cur_row, sink, min_val);

        // update dual potentials
        self.u[cur_row] += min_val;
        for i in 0..self.n {
            if self.scanned_rows[i] && i != cur_row {
                let Some(j) = self.col_for_row[i] else {
                    unreachable!("scanned row {} is unassigned", i);
                };
                let delta = min_val - self.path_cost(j);
                self.u[i] += delta;
            }
        }
        for j in 0..self.n {
            if self.scanned_cols[j] {
                let delta = min_val - self.path_cost(j);
                self.v[j] -= delta;
            }
        }

        // flip the path from the sink back to cur_row
        let mut j = sink;
        loop {
            let i = self.predecessors[j];
            self.row_for_col[j] = Some(i);
            let previous = self.col_for_row[i].replace(j);
            if i == cur_row {
                debug_assert!(previous.is_none());
                break;
            }
            let Some(previous) = previous else {
                unreachable!("row {} on the augmenting path was unassigned", i);
            };
            j = previous;
        }

        Ok(())
    }

    fn find_augmenting_path(&mut self, cur_row: usize) -> AssignmentResult<(usize, C)> {
        let n = self.n;
        self.shortest_path_costs.fill(None);
        self.scanned_rows.fill(false);
        self.scanned_cols.fill(false);
        self.remaining.clear();
        self.remaining.extend((0..n).rev());

        let mut min_val = C::zero();
        let mut i = cur_row;
        loop {
            self.scanned_rows[i] = true;

            let mut lowest: Option<C> = None;
            let mut index = usize::MAX;
            for (it, &j) in self.remaining.iter().enumerate() {
                if let Some(cost) = self.costs[i * n + j] {
                    let r = min_val + cost - self.u[i] - self.v[j];
                    if self.shortest_path_costs[j].map_or(true, |spc| r < spc) {
                        self.predecessors[j] = i;
                        self.shortest_path_costs[j] = Some(r);
                    }
                }

                // ties go to an unassigned column to end the path early
                if let Some(spc) = self.shortest_path_costs[j] {
                    if lowest.map_or(true, |l| spc < l || (spc == l && self.row_for_col[j].is_none())) {
                        lowest = Some(spc);
                        index = it;
                    }
                }
            }

            let Some(lowest) = lowest else {
                return Err(AssignmentError::Infeasible { row: cur_row });
            };
            min_val = lowest;

            let j = self.remaining.swap_remove(index);
            self.scanned_cols[j] = true;
            match self.row_for_col[j] {
                None => return Ok((j, min_val)),
                Some(row) => i = row,
            }
        }
    }

    #[inline]
    fn path_cost(&self, col: usize) -> C {
        self.shortest_path_costs[col].unwrap_or_else(C::zero)
    }

    fn assignment(&self) -> Vec<usize> {
        self.col_for_row
            .iter()
            .enumerate()
            .map(|(i, col)| match col {
                Some(j) => *j,
                None => unreachable!("row {} is unassigned after the last augmentation", i),
            })
            .collect()
    }
}

impl<C> AssignmentSolver<C> for ShortestAugmentingPath<C>
where
    C: Cost,
{
    fn solve(&mut self, matrix: SquareCostMatrix<C>) -> AssignmentResult<Vec<usize>> {
        ShortestAugmentingPath::solve(self, matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear_assignment::cost_matrix::{square, CostMatrix};

    fn assert_dual_feasible(solver: &ShortestAugmentingPath<i64>, matrix: &SquareCostMatrix<i64>) {
        let n = matrix.size();
        for i in 0..n {
            for j in 0..n {
                if let Some(cost) = matrix.entry(i, j).working_cost() {
                    assert!(cost - solver.u[i] - solver.v[j] >= 0, "negative reduced cost at ({}, {})", i, j);
                }
            }
            if let Some(j) = solver.col_for_row[i] {
                let cost = matrix.entry(i, j).working_cost().unwrap();
                assert_eq!(cost - solver.u[i] - solver.v[j], 0, "matched pair ({}, {}) is not tight", i, j);
            }
        }
    }

    #[test]
    fn duals_stay_feasible_after_every_row() {
        let rows = vec![vec![7, 3, 9, 4, 2], vec![1, 8, 8, 6, 5], vec![4, 4, 2, 9, 3], vec![6, 1, 5, 2, 8], vec![3, 7, 6, 1, 4]];
        let matrix = square(CostMatrix::from_rows(rows).unwrap());
        let mut solver = ShortestAugmentingPath::new();
        solver.load(&matrix).unwrap();
        for cur_row in 0..matrix.size() {
            solver.augment_row(cur_row).unwrap();
            assert_dual_feasible(&solver, &matrix);
        }
        assert_eq!(solver.col_for_row.iter().filter(|c| c.is_some()).count(), 5);
    }

    #[test]
    fn contested_column_updates_visited_rows() {
        // every row is cheapest on column 0, so later rows reroute earlier ones
        let rows = vec![vec![1i64, 2, 3], vec![1, 3, 4], vec![1, 4, 6]];
        let matrix = square(CostMatrix::from_rows(rows.clone()).unwrap());
        let mut solver = ShortestAugmentingPath::new();
        solver.load(&matrix).unwrap();
        for cur_row in 0..3 {
            solver.augment_row(cur_row).unwrap();
            assert_dual_feasible(&solver, &matrix);
        }
        assert_ne!(solver.u[0], 1);

        let total: i64 = solver.assignment().iter().enumerate().map(|(i, &j)| rows[i][j]).sum();
        assert_eq!(total, 7);
    }

    #[test]
    fn padded_rows_use_zero_cost_edges() {
        let matrix = square(CostMatrix::from_rows(vec![vec![5i64, 1, 9]]).unwrap());
        let mut solver = ShortestAugmentingPath::new();
        let assignment = solver.solve(matrix.clone()).unwrap();
        assert_eq!(assignment[0], 1);
        assert_dual_feasible(&solver, &matrix);
    }

    #[test]
    fn unreachable_column_is_infeasible() {
        let matrix = square(CostMatrix::from_rows(vec![vec![1, i64::MAX], vec![2, i64::MAX]]).unwrap());
        assert_eq!(ShortestAugmentingPath::new().solve(matrix), Err(AssignmentError::Infeasible { row: 1 }));
    }

    #[test]
    fn no_headroom_overflows() {
        let matrix = square(CostMatrix::from_rows(vec![vec![i32::MAX - 1, 0], vec![0, 1]]).unwrap());
        assert!(matches!(ShortestAugmentingPath::new().solve(matrix), Err(AssignmentError::NumericOverflow(_))));
    }
}
