use crate::linear_assignment::cost::{is_infeasible, Cost};
use crate::linear_assignment::cost_matrix::CostMatrix;
use crate::linear_assignment::error::{AssignmentError, AssignmentResult};

/// Trims a raw square assignment back to a `num_rows x num_cols` problem.
///
/// A row matched to a padding column becomes `None`; padding rows are dropped.
pub fn remap(raw: &[usize], num_rows: usize, num_cols: usize) -> Vec<Option<usize>> {
    debug_assert!(raw.len() >= num_rows);
    raw.iter().take(num_rows).map(|&col| if col >= num_cols { None } else { Some(col) }).collect()
}

/// A one-to-one assignment over the original, unpadded problem.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Assignment {
    row_to_col: Vec<Option<usize>>,
    col_to_row: Vec<Option<usize>>,
}

impl Assignment {
    pub fn from_raw(raw: &[usize], num_rows: usize, num_cols: usize) -> Self {
        let row_to_col = remap(raw, num_rows, num_cols);
        let mut col_to_row = vec![None; num_cols];
        for (row, col) in row_to_col.iter().enumerate() {
            if let Some(col) = *col {
                debug_assert!(col_to_row[col].is_none());
                col_to_row[col] = Some(row);
            }
        }
        Self { row_to_col, col_to_row }
    }

    #[inline]
    pub fn row_to_col(&self) -> &[Option<usize>] {
        &self.row_to_col
    }

    #[inline]
    pub fn col_to_row(&self) -> &[Option<usize>] {
        &self.col_to_row
    }

    #[inline]
    pub fn column_of(&self, row: usize) -> Option<usize> {
        self.row_to_col.get(row).copied().flatten()
    }

    #[inline]
    pub fn row_of(&self, col: usize) -> Option<usize> {
        self.col_to_row.get(col).copied().flatten()
    }

    pub fn num_assigned(&self) -> usize {
        self.row_to_col.iter().filter(|c| c.is_some()).count()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.row_to_col.iter().enumerate().filter_map(|(row, col)| col.map(|col| (row, col)))
    }

    /// Column per row with `-1` for an unassigned row.
    pub fn to_signed_indices(&self) -> Vec<isize> {
        self.row_to_col.iter().map(|col| col.map_or(-1, |c| c as isize)).collect()
    }
}

/// Sums the selected entries of the original (unreduced) matrix. Unassigned rows add nothing.
pub fn total_cost<C: Cost>(matrix: &CostMatrix<C>, assignment: &[Option<usize>]) -> AssignmentResult<C> {
    if assignment.len() != matrix.num_rows() {
        return Err(AssignmentError::MalformedInput(format!("assignment covers {} rows, matrix has {}", assignment.len(), matrix.num_rows())));
    }

    let mut total = C::zero();
    for (row, col) in assignment.iter().enumerate() {
        let Some(col) = *col else {
            continue;
        };
        let cost = matrix.get(row, col).ok_or_else(|| AssignmentError::MalformedInput(format!("row {} is assigned to column {} out of range", row, col)))?;
        if is_infeasible(cost) {
            return Err(AssignmentError::Infeasible { row });
        }
        total = total.checked_add(&cost).ok_or_else(|| AssignmentError::NumericOverflow(format!("total cost overflows at row {}", row)))?;
    }

    Ok(total)
}
