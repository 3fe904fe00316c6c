use crate::linear_assignment::cost::{infeasible, is_infeasible, Cost, Entry};
use crate::linear_assignment::error::{AssignmentError, AssignmentResult};
use std::ops::Index;

/// Dense `num_rows x num_cols` cost matrix stored row-major.
///
/// Every entry is non-negative or the infeasible sentinel (`C::max_value()`).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CostMatrix<C> {
    num_rows: usize,
    num_cols: usize,
    costs: Vec<C>,
}

impl<C> CostMatrix<C>
where
    C: Cost,
{
    pub fn filled(num_rows: usize, num_cols: usize, cost: C) -> AssignmentResult<Self> {
        validate_shape(num_rows, num_cols)?;
        validate_cost(cost)?;
        Ok(Self { num_rows, num_cols, costs: vec![cost; num_rows * num_cols] })
    }

    pub fn from_rows(rows: Vec<Vec<C>>) -> AssignmentResult<Self> {
        let num_rows = rows.len();
        let num_cols = rows.first().map_or(0, |row| row.len());
        validate_shape(num_rows, num_cols)?;

        let mut costs = Vec::with_capacity(num_rows * num_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != num_cols {
                return Err(AssignmentError::MalformedInput(format!("row {} has {} columns, expected {}", i, row.len(), num_cols)));
            }
            for &cost in row.iter() {
                validate_cost(cost)?;
            }
            costs.extend(row);
        }

        Ok(Self { num_rows, num_cols, costs })
    }

    pub fn from_fn<F: FnMut(usize, usize) -> C>(num_rows: usize, num_cols: usize, mut f: F) -> AssignmentResult<Self> {
        validate_shape(num_rows, num_cols)?;
        let mut costs = Vec::with_capacity(num_rows * num_cols);
        for i in 0..num_rows {
            for j in 0..num_cols {
                let cost = f(i, j);
                validate_cost(cost)?;
                costs.push(cost);
            }
        }
        Ok(Self { num_rows, num_cols, costs })
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[inline]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.num_rows == self.num_cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<C> {
        if row >= self.num_rows || col >= self.num_cols {
            return None;
        }
        Some(self.costs[row * self.num_cols + col])
    }

    pub fn set(&mut self, row: usize, col: usize, cost: C) -> AssignmentResult<()> {
        if row >= self.num_rows || col >= self.num_cols {
            return Err(AssignmentError::MalformedInput(format!("cell ({}, {}) is outside a {}x{} matrix", row, col, self.num_rows, self.num_cols)));
        }
        validate_cost(cost)?;
        self.costs[row * self.num_cols + col] = cost;
        Ok(())
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[C] {
        &self.costs[row * self.num_cols..(row + 1) * self.num_cols]
    }

    /// Largest entry that is not the sentinel, or zero when every entry is infeasible.
    pub fn max_finite_cost(&self) -> C {
        self.costs.iter().copied().filter(|&c| !is_infeasible(c)).fold(C::zero(), |acc, c| acc.max(c))
    }

    /// Rewrites every finite cost `c` as `max - c`, turning a maximization into a minimization.
    pub fn complement(&self) -> Self {
        let max = self.max_finite_cost();
        let costs = self.costs.iter().map(|&c| if is_infeasible(c) { c } else { max - c }).collect();
        Self { num_rows: self.num_rows, num_cols: self.num_cols, costs }
    }
}

impl<C> Index<(usize, usize)> for CostMatrix<C> {
    type Output = C;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &C {
        assert!(row < self.num_rows && col < self.num_cols);
        &self.costs[row * self.num_cols + col]
    }
}

fn validate_shape(num_rows: usize, num_cols: usize) -> AssignmentResult<()> {
    if num_rows == 0 || num_cols == 0 {
        return Err(AssignmentError::MalformedInput(format!("cost matrix must not be empty, got {}x{}", num_rows, num_cols)));
    }
    Ok(())
}

fn validate_cost<C: Cost>(cost: C) -> AssignmentResult<()> {
    if cost < C::zero() {
        return Err(AssignmentError::MalformedInput(format!("negative cost {:?}", cost)));
    }
    Ok(())
}

/// A square cost matrix together with the size of the problem it was padded from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SquareCostMatrix<C> {
    matrix: CostMatrix<C>,
    num_real_rows: usize,
    num_real_cols: usize,
}

impl<C> SquareCostMatrix<C>
where
    C: Cost,
{
    #[inline]
    pub fn size(&self) -> usize {
        self.matrix.num_rows
    }

    #[inline]
    pub fn num_real_rows(&self) -> usize {
        self.num_real_rows
    }

    #[inline]
    pub fn num_real_cols(&self) -> usize {
        self.num_real_cols
    }

    #[inline]
    pub fn is_padding(&self, row: usize, col: usize) -> bool {
        row >= self.num_real_rows || col >= self.num_real_cols
    }

    #[inline]
    pub fn entry(&self, row: usize, col: usize) -> Entry<C> {
        if self.is_padding(row, col) {
            return Entry::Padding;
        }
        let cost = self.matrix[(row, col)];
        if is_infeasible(cost) {
            Entry::Infeasible
        } else {
            Entry::Finite(cost)
        }
    }

    #[inline]
    pub fn as_matrix(&self) -> &CostMatrix<C> {
        &self.matrix
    }

    pub fn into_inner(self) -> CostMatrix<C> {
        self.matrix
    }

    /// Largest finite cost over the real cells.
    pub fn max_finite_cost(&self) -> C {
        self.matrix.max_finite_cost()
    }
}

impl<C> From<CostMatrix<C>> for SquareCostMatrix<C>
where
    C: Cost,
{
    fn from(matrix: CostMatrix<C>) -> Self {
        square(matrix)
    }
}

/// Pads the smaller dimension with the infeasible sentinel up to `max(num_rows, num_cols)`.
pub fn square<C: Cost>(matrix: CostMatrix<C>) -> SquareCostMatrix<C> {
    let (num_real_rows, num_real_cols) = (matrix.num_rows, matrix.num_cols);
    if matrix.is_square() {
        return SquareCostMatrix { matrix, num_real_rows, num_real_cols };
    }

    let m = num_real_rows.max(num_real_cols);
    let mut costs = vec![infeasible::<C>(); m * m];
    for i in 0..num_real_rows {
        costs[i * m..i * m + num_real_cols].copy_from_slice(matrix.row(i));
    }

    SquareCostMatrix { matrix: CostMatrix { num_rows: m, num_cols: m, costs }, num_real_rows, num_real_cols }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_rows() {
        assert!(matches!(CostMatrix::<i64>::from_rows(vec![]), Err(AssignmentError::MalformedInput(_))));
        assert!(matches!(CostMatrix::<i64>::from_rows(vec![vec![]]), Err(AssignmentError::MalformedInput(_))));
        assert!(matches!(CostMatrix::from_rows(vec![vec![1i64, 2], vec![3]]), Err(AssignmentError::MalformedInput(_))));
        assert!(matches!(CostMatrix::from_rows(vec![vec![1i64, -2]]), Err(AssignmentError::MalformedInput(_))));
    }

    #[test]
    fn square_pads_columns() {
        let matrix = CostMatrix::from_rows(vec![vec![1i64, 2], vec![3, 4], vec![5, 6]]).unwrap();
        let square = square(matrix);
        assert_eq!(square.size(), 3);
        assert_eq!((square.num_real_rows(), square.num_real_cols()), (3, 2));
        assert_eq!(square.as_matrix().row(1), &[3, 4, i64::MAX]);
        assert_eq!(square.entry(2, 1), Entry::Finite(6));
        assert_eq!(square.entry(2, 2), Entry::Padding);
    }

    #[test]
    fn square_pads_rows() {
        let matrix = CostMatrix::from_rows(vec![vec![1i32, 2, 3]]).unwrap();
        let square = square(matrix);
        assert_eq!(square.size(), 3);
        assert_eq!(square.as_matrix().row(0), &[1, 2, 3]);
        assert_eq!(square.as_matrix().row(2), &[i32::MAX; 3]);
        assert!(square.is_padding(1, 0));
    }

    #[test]
    fn square_keeps_square_input() {
        let matrix = CostMatrix::from_rows(vec![vec![0i64, i64::MAX], vec![2, 3]]).unwrap();
        let square = square(matrix.clone());
        assert_eq!(square.as_matrix(), &matrix);
        assert_eq!(square.entry(0, 1), Entry::Infeasible);
    }

    #[test]
    fn complement_keeps_sentinel() {
        let matrix = CostMatrix::from_rows(vec![vec![1i64, 5], vec![i64::MAX, 0]]).unwrap();
        let complement = matrix.complement();
        assert_eq!(complement.row(0), &[4, 0]);
        assert_eq!(complement.row(1), &[i64::MAX, 5]);
    }
}
