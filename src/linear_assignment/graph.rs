use crate::linear_assignment::cost::{is_infeasible, Cost};
use crate::linear_assignment::cost_matrix::SquareCostMatrix;

#[derive(PartialEq, Debug, Clone)]
pub struct Edge<C> {
    pub row: usize,
    pub col: usize,
    pub cost: C,
}

/// Bipartite rows x columns graph; a missing edge is an infeasible pairing.
#[derive(Clone, Debug)]
pub struct BipartiteGraph<C> {
    num_rows: usize,
    num_cols: usize,
    pub(crate) edges: Vec<Edge<C>>,
}

impl<C> BipartiteGraph<C>
where
    C: Cost,
{
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self { num_rows, num_cols, edges: Vec::new() }
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
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.num_rows == self.num_cols
    }

    // return edge index
    pub fn add_edge(&mut self, row: usize, col: usize, cost: C) -> Option<usize> {
        if row >= self.num_rows || col >= self.num_cols || cost < C::zero() || is_infeasible(cost) {
            return None;
        }

        self.edges.push(Edge { row, col, cost });
        Some(self.edges.len() - 1)
    }

    pub fn get_edge(&self, edge_id: usize) -> Option<Edge<C>> {
        self.edges.get(edge_id).cloned()
    }

    pub fn max_cost(&self) -> C {
        self.edges.iter().fold(C::zero(), |acc, e| acc.max(e.cost))
    }
}

// padding cells become zero-cost edges, infeasible cells are left out
impl<C> From<&SquareCostMatrix<C>> for BipartiteGraph<C>
where
    C: Cost,
{
    fn from(matrix: &SquareCostMatrix<C>) -> Self {
        let n = matrix.size();
        let mut graph = Self::new(n, n);
        for row in 0..n {
            for col in 0..n {
                if let Some(cost) = matrix.entry(row, col).working_cost() {
                    graph.edges.push(Edge { row, col, cost });
                }
            }
        }
        graph
    }
}
