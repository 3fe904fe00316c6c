use crate::linear_assignment::cancellation::{self, Cancellation};
use crate::linear_assignment::cost::Cost;
use crate::linear_assignment::cost_matrix::SquareCostMatrix;
use crate::linear_assignment::error::{AssignmentError, AssignmentResult};
use crate::linear_assignment::AssignmentSolver;
use log::{debug, trace};

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Mask {
    #[default]
    Empty,
    Starred,
    Primed,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Step {
    Reduce,
    CoverColumns,
    PrimeZeros,
    Augment,
    AdjustCosts,
    Done,
}

/// Kuhn-Munkres primal-dual solver, O(n^3).
///
/// The costs are never rewritten: the reduced cost of cell `(i, j)` is
/// `costs[i][j] + row_offset[i] + col_offset[j]`, and `None` cells are infeasible pairings
/// that never become zeros. Every uncovered row keeps its smallest reduced cost over the
/// uncovered columns in `slack`, so finding a zero and adjusting the costs are both O(n).
pub struct Hungarian<C> {
    n: usize,
    costs: Vec<Option<C>>,
    row_offset: Vec<C>,
    col_offset: Vec<C>,
    // (smallest reduced cost, its column) over the uncovered columns, per row
    slack: Vec<Option<(C, usize)>>,
    mask: Vec<Mask>,
    row_covered: Vec<bool>,
    col_covered: Vec<bool>,
    path: Vec<(usize, usize)>,
    path_start: (usize, usize),
    num_covered_cols: usize,
    cancellation: Option<Cancellation>,
}

impl<C> Default for Hungarian<C> {
    fn default() -> Self {
        Self {
            n: 0,
            costs: Vec::new(),
            row_offset: Vec::new(),
            col_offset: Vec::new(),
            slack: Vec::new(),
            mask: Vec::new(),
            row_covered: Vec::new(),
            col_covered: Vec::new(),
            path: Vec::new(),
            path_start: (usize::MAX, usize::MAX),
            num_covered_cols: 0,
            cancellation: None,
        }
    }
}

impl<C> Hungarian<C>
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

    /// Returns the assigned column of every row of the square matrix.
    pub fn solve(&mut self, matrix: SquareCostMatrix<C>) -> AssignmentResult<Vec<usize>> {
        debug!("hungarian: solving {}x{} ({} real rows, {} real cols)", matrix.size(), matrix.size(), matrix.num_real_rows(), matrix.num_real_cols());
        self.load(&matrix);

        let mut step = Step::Reduce;
        let mut num_steps = 0usize;
        while step != Step::Done {
            step = self.step(step)?;
            num_steps += 1;
        }

        debug!("hungarian: done after {} steps", num_steps);
        Ok(self.assignment())
    }

    fn load(&mut self, matrix: &SquareCostMatrix<C>) {
        let n = matrix.size();
        self.n = n;
        self.costs = (0..n * n).map(|k| matrix.entry(k / n, k % n).working_cost()).collect();
        self.row_offset.clear();
        self.row_offset.resize(n, C::zero());
        self.col_offset.clear();
        self.col_offset.resize(n, C::zero());
        self.slack.clear();
        self.slack.resize(n, None);
        self.mask.clear();
        self.mask.resize(n * n, Mask::Empty);
        self.row_covered.clear();
        self.row_covered.resize(n, false);
        self.col_covered.clear();
        self.col_covered.resize(n, false);
        self.path.clear();
        self.num_covered_cols = 0;
    }

    pub(crate) fn step(&mut self, step: Step) -> AssignmentResult<Step> {
        let next = match step {
            Step::Reduce => self.reduce()?,
            Step::CoverColumns => self.cover_columns()?,
            Step::PrimeZeros => self.prime_zeros()?,
            Step::Augment => self.augment(),
            Step::AdjustCosts => self.adjust_costs()?,
            Step::Done => Step::Done,
        };
        trace!("hungarian: {:?} -> {:?}", step, next);
        Ok(next)
    }

    // subtract row minima, then star zeros greedily
    fn reduce(&mut self) -> AssignmentResult<Step> {
        let n = self.n;
        for i in 0..n {
            let min = self.costs[i * n..(i + 1) * n].iter().flatten().min().copied().ok_or(AssignmentError::Infeasible { row: i })?;
            self.row_offset[i] = C::zero() - min;
        }

        for i in 0..n {
            for j in 0..n {
                if self.reduced_cost(i, j)? == Some(C::zero()) && !self.row_covered[i] && !self.col_covered[j] {
                    self.mask[i * n + j] = Mask::Starred;
                    self.row_covered[i] = true;
                    self.col_covered[j] = true;
                }
            }
        }
        self.clear_covers();

        Ok(Step::CoverColumns)
    }

    fn cover_columns(&mut self) -> AssignmentResult<Step> {
        cancellation::check(self.cancellation.as_ref())?;

        let n = self.n;
        for j in 0..n {
            if self.find_in_col(j, Mask::Starred).is_some() {
                self.col_covered[j] = true;
            }
        }

        let covered = self.col_covered.iter().filter(|&&covered| covered).count();
        debug_assert_eq!(covered, self.num_starred());
        debug_assert!(covered >= self.num_covered_cols);
        self.num_covered_cols = covered;

        if covered == n {
            return Ok(Step::Done);
        }

        // all rows are uncovered here
        self.slack.fill(None);
        for j in 0..n {
            if !self.col_covered[j] {
                self.relax_column(j)?;
            }
        }
        Ok(Step::PrimeZeros)
    }

    fn prime_zeros(&mut self) -> AssignmentResult<Step> {
        let Some((row, col)) = self.find_uncovered_zero() else {
            return Ok(Step::AdjustCosts);
        };

        self.mask[row * self.n + col] = Mask::Primed;
        match self.find_in_row(row, Mask::Starred) {
            Some(star_col) => {
                self.row_covered[row] = true;
                self.col_covered[star_col] = false;
                self.relax_column(star_col)?;
                Ok(Step::PrimeZeros)
            }
            None => {
                self.path_start = (row, col);
                Ok(Step::Augment)
            }
        }
    }

    // flip the alternating prime/star path starting at `path_start`
    fn augment(&mut self) -> Step {
        let n = self.n;
        let (mut row, mut col) = self.path_start;
        self.path.clear();
        self.path.push((row, col));

        while let Some(star_row) = self.find_in_col(col, Mask::Starred) {
            row = star_row;
            self.path.push((row, col));
            let Some(prime_col) = self.find_in_row(row, Mask::Primed) else {
                unreachable!("starred row {} on the augmenting path has no primed zero", row);
            };
            col = prime_col;
            self.path.push((row, col));
        }
        trace!("hungarian: augmenting path {:?}", self.path);

        for &(i, j) in self.path.iter() {
            let cell = &mut self.mask[i * n + j];
            *cell = match *cell {
                Mask::Starred => Mask::Empty,
                Mask::Primed => Mask::Starred,
                Mask::Empty => unreachable!("unmarked cell ({}, {}) on the augmenting path", i, j),
            };
        }

        self.clear_covers();
        self.mask.iter_mut().filter(|m| **m == Mask::Primed).for_each(|m| *m = Mask::Empty);
        Step::CoverColumns
    }

    // subtract delta from uncovered rows and add it to covered columns
    fn adjust_costs(&mut self) -> AssignmentResult<Step> {
        let n = self.n;
        let delta = (0..n).filter(|&i| !self.row_covered[i]).filter_map(|i| self.slack[i]).map(|(c, _)| c).min();

        // every finite cell lies under fewer than n lines: no perfect matching exists
        let Some(delta) = delta else {
            let row = (0..n).find(|&i| !self.row_covered[i]).unwrap_or(0);
            return Err(AssignmentError::Infeasible { row });
        };
        debug_assert!(delta > C::zero());
        trace!("hungarian: delta {:?}", delta);

        let overflow = || AssignmentError::NumericOverflow(format!("adjusting potentials by {:?}", delta));
        for i in (0..n).filter(|&i| !self.row_covered[i]) {
            self.row_offset[i] = self.row_offset[i].checked_sub(&delta).ok_or_else(overflow)?;
            if let Some((c, _)) = self.slack[i].as_mut() {
                *c -= delta;
            }
        }
        for j in (0..n).filter(|&j| self.col_covered[j]) {
            self.col_offset[j] = self.col_offset[j].checked_add(&delta).ok_or_else(overflow)?;
        }

        Ok(Step::PrimeZeros)
    }

    // column `col` became uncovered: fold it into the slack of every uncovered row
    fn relax_column(&mut self, col: usize) -> AssignmentResult<()> {
        for i in (0..self.n).filter(|&i| !self.row_covered[i]) {
            if let Some(r) = self.reduced_cost(i, col)? {
                if self.slack[i].map_or(true, |(s, _)| r < s) {
                    self.slack[i] = Some((r, col));
                }
            }
        }
        Ok(())
    }

    fn reduced_cost(&self, row: usize, col: usize) -> AssignmentResult<Option<C>> {
        let Some(c) = self.costs[row * self.n + col] else {
            return Ok(None);
        };
        c.checked_add(&self.row_offset[row])
            .and_then(|c| c.checked_add(&self.col_offset[col]))
            .map(Some)
            .ok_or_else(|| AssignmentError::NumericOverflow(format!("reduced cost of cell ({}, {})", row, col)))
    }

    fn assignment(&self) -> Vec<usize> {
        (0..self.n)
            .map(|i| match self.find_in_row(i, Mask::Starred) {
                Some(j) => j,
                None => unreachable!("row {} has no starred zero after termination", i),
            })
            .collect()
    }

    fn find_uncovered_zero(&self) -> Option<(usize, usize)> {
        (0..self.n).filter(|&i| !self.row_covered[i]).find_map(|i| match self.slack[i] {
            Some((c, j)) if c == C::zero() => Some((i, j)),
            _ => None,
        })
    }

    #[inline]
    fn find_in_row(&self, row: usize, mask: Mask) -> Option<usize> {
        (0..self.n).find(|&j| self.mask[row * self.n + j] == mask)
    }

    #[inline]
    fn find_in_col(&self, col: usize, mask: Mask) -> Option<usize> {
        (0..self.n).find(|&i| self.mask[i * self.n + col] == mask)
    }

    fn clear_covers(&mut self) {
        self.row_covered.fill(false);
        self.col_covered.fill(false);
    }

    pub(crate) fn num_starred(&self) -> usize {
        self.mask.iter().filter(|&&m| m == Mask::Starred).count()
    }

    #[cfg(test)]
    pub(crate) fn num_covered_columns(&self) -> usize {
        self.col_covered.iter().filter(|&&covered| covered).count()
    }

    // smallest reduced cost over the uncovered columns, recomputed from scratch
    #[cfg(test)]
    fn uncovered_minimum(&self, row: usize) -> Option<C> {
        (0..self.n).filter(|&j| !self.col_covered[j]).filter_map(|j| self.reduced_cost(row, j).unwrap()).min()
    }
}

impl<C> AssignmentSolver<C> for Hungarian<C>
where
    C: Cost,
{
    fn solve(&mut self, matrix: SquareCostMatrix<C>) -> AssignmentResult<Vec<usize>> {
        Hungarian::solve(self, matrix)
    }
}
