pub mod assignment;
pub mod cancellation;
pub mod config;
pub mod cost;
pub mod cost_matrix;
mod csr;
pub mod error;
pub mod graph;
pub mod hungarian;
pub mod shortest_augmenting_path;
pub mod sparse_shortest_augmenting_path;

use crate::linear_assignment::assignment::{total_cost, Assignment};
use crate::linear_assignment::config::{Algorithm, Objective, SolverConfig};
use crate::linear_assignment::cost::Cost;
use crate::linear_assignment::cost_matrix::{square, CostMatrix, SquareCostMatrix};
use crate::linear_assignment::error::AssignmentResult;
use crate::linear_assignment::hungarian::Hungarian;
use crate::linear_assignment::shortest_augmenting_path::ShortestAugmentingPath;
use crate::linear_assignment::sparse_shortest_augmenting_path::SparseShortestAugmentingPath;
use log::debug;

/// Common signature of every backend: column per row of a square matrix.
///
/// The matrix is consumed; keep a clone of the original costs for [`total_cost`].
pub trait AssignmentSolver<C: Cost> {
    fn solve(&mut self, matrix: SquareCostMatrix<C>) -> AssignmentResult<Vec<usize>>;
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Solution<C> {
    pub assignment: Assignment,
    pub total_cost: C,
}

/// Squares `matrix`, solves it with the configured backend and maps the result back to the
/// original rows and columns. The total is evaluated on `matrix` itself.
pub fn solve<C: Cost>(matrix: &CostMatrix<C>, config: &SolverConfig) -> AssignmentResult<Solution<C>> {
    debug!("solving {}x{} with {:?} ({:?})", matrix.num_rows(), matrix.num_cols(), config.algorithm, config.objective);

    let working = match config.objective {
        Objective::Minimize => matrix.clone(),
        Objective::Maximize => matrix.complement(),
    };
    let mut solver = backend(config);
    let raw = solver.solve(square(working))?;

    let assignment = Assignment::from_raw(&raw, matrix.num_rows(), matrix.num_cols());
    let total_cost = total_cost(matrix, assignment.row_to_col())?;
    debug!("assigned {} pairs, total cost {:?}", assignment.num_assigned(), total_cost);

    Ok(Solution { assignment, total_cost })
}

fn backend<C: Cost>(config: &SolverConfig) -> Box<dyn AssignmentSolver<C>> {
    match (config.algorithm, config.cancellation.clone()) {
        (Algorithm::Hungarian, Some(c)) => Box::new(Hungarian::<C>::new().with_cancellation(c)),
        (Algorithm::Hungarian, None) => Box::new(Hungarian::<C>::new()),
        (Algorithm::ShortestAugmentingPath, Some(c)) => Box::new(ShortestAugmentingPath::<C>::new().with_cancellation(c)),
        (Algorithm::ShortestAugmentingPath, None) => Box::new(ShortestAugmentingPath::<C>::new()),
        (Algorithm::SparseShortestAugmentingPath, Some(c)) => Box::new(SparseShortestAugmentingPath::<C>::new().with_cancellation(c)),
        (Algorithm::SparseShortestAugmentingPath, None) => Box::new(SparseShortestAugmentingPath::<C>::new()),
    }
}
