use crate::linear_assignment::cost::Cost;
use crate::linear_assignment::graph::BipartiteGraph;

/// Compressed-row storage: the edges of row `i` are `start[i]..start[i + 1]`.
pub struct CSR<C> {
    pub num_rows: usize,
    pub num_edges: usize,
    pub start: Vec<usize>,
    pub columns: Vec<usize>,
    pub costs: Vec<C>,
}

impl<C> Default for CSR<C> {
    fn default() -> Self {
        Self { num_rows: 0, num_edges: 0, start: Vec::new(), columns: Vec::new(), costs: Vec::new() }
    }
}

impl<C> CSR<C>
where
    C: Cost,
{
    pub fn build(&mut self, graph: &BipartiteGraph<C>) {
        self.num_rows = graph.num_rows();
        self.num_edges = graph.num_edges();

        // initialize
        self.start.clear();
        self.start.resize(self.num_rows + 1, 0);
        self.columns.clear();
        self.columns.resize(self.num_edges, usize::MAX);
        self.costs.clear();
        self.costs.resize(self.num_edges, C::zero());

        let mut degree = vec![0; self.num_rows];
        for edge in graph.edges.iter() {
            degree[edge.row] += 1;
        }

        for i in 1..=self.num_rows {
            self.start[i] = self.start[i - 1] + degree[i - 1];
        }

        let mut counter = vec![0; self.num_rows];
        for edge in graph.edges.iter() {
            let k = self.start[edge.row] + counter[edge.row];
            counter[edge.row] += 1;
            self.columns[k] = edge.col;
            self.costs[k] = edge.cost;
        }
        debug_assert_eq!(self.start[self.num_rows], self.num_edges);
    }

    #[inline]
    pub fn neighbors(&self, row: usize) -> impl Iterator<Item = (usize, C)> + '_ {
        let range = self.start[row]..self.start[row + 1];
        self.columns[range.clone()].iter().copied().zip(self.costs[range].iter().copied())
    }
}
