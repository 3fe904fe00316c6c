use crate::linear_assignment::cancellation::{self, Cancellation};
use crate::linear_assignment::cost::{check_headroom, Cost};
use crate::linear_assignment::cost_matrix::SquareCostMatrix;
use crate::linear_assignment::csr::CSR;
use crate::linear_assignment::error::{AssignmentError, AssignmentResult};
use crate::linear_assignment::graph::BipartiteGraph;
use crate::linear_assignment::AssignmentSolver;
use log::{debug, trace};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Shortest augmenting path over the real edges of a sparse square bipartite graph.
///
/// Same relaxation and dual updates as the dense solver. Columns are settled through a
/// binary heap and only the columns touched by a search are reset afterwards.
pub struct SparseShortestAugmentingPath<C> {
    csr: CSR<C>,

    u: Vec<C>,
    v: Vec<C>,

    col_for_row: Vec<Option<usize>>,
    row_for_col: Vec<Option<usize>>,

    shortest_path_costs: Vec<Option<C>>,
    predecessors: Vec<usize>,
    scanned_cols: Vec<bool>,
    visited_rows: Vec<usize>,
    visited_cols: Vec<usize>,
    touched_cols: Vec<usize>,
    // (path cost, column already assigned, column)
    heap: BinaryHeap<Reverse<(C, bool, usize)>>,

    cancellation: Option<Cancellation>,
}

impl<C> Default for SparseShortestAugmentingPath<C>
where
    C: Ord,
{
    fn default() -> Self {
        Self {
            csr: CSR::default(),
            u: Vec::new(),
            v: Vec::new(),
            col_for_row: Vec::new(),
            row_for_col: Vec::new(),
            shortest_path_costs: Vec::new(),
            predecessors: Vec::new(),
            scanned_cols: Vec::new(),
            visited_rows: Vec::new(),
            visited_cols: Vec::new(),
            touched_cols: Vec::new(),
            heap: BinaryHeap::new(),
            cancellation: None,
        }
    }
}

impl<C> SparseShortestAugmentingPath<C>
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

    pub fn solve(&mut self, graph: &BipartiteGraph<C>) -> AssignmentResult<Vec<usize>> {
        if graph.num_rows() == 0 || !graph.is_square() {
            return Err(AssignmentError::MalformedInput(format!("sparse solver needs a non-empty square graph, got {}x{}", graph.num_rows(), graph.num_cols())));
        }
        let n = graph.num_rows();
        check_headroom(graph.max_cost(), n)?;
        debug!("sparse shortest augmenting path: solving {}x{} with {} edges", n, n, graph.num_edges());

        self.csr.build(graph);
        self.u = vec![C::zero(); n];
        self.v = vec![C::zero(); n];
        self.col_for_row = vec![None; n];
        self.row_for_col = vec![None; n];
        self.shortest_path_costs = vec![None; n];
        self.predecessors = vec![usize::MAX; n];
        self.scanned_cols = vec![false; n];
        self.visited_rows.clear();
        self.visited_cols.clear();
        self.touched_cols.clear();

        for cur_row in 0..n {
            cancellation::check(self.cancellation.as_ref())?;
            self.augment_row(cur_row)?;
        }

        debug!("sparse shortest augmenting path: done");
        Ok(self.assignment())
    }

    #[inline]
    pub fn row_potentials(&self) -> &[C] {
        &self.u
    }

    #[inline]
    pub fn column_potentials(&self) -> &[C] {
        &self.v
    }

    fn augment_row(&mut self, cur_row: usize) -> AssignmentResult<()> {
        let (sink, min_val) = self.find_augmenting_path(cur_row)?;
        trace!("sparse shortest augmenting path: row {} reaches column {} at {:?}, {} rows visited", cur_row, sink, min_val, self.visited_rows.len());

        // update dual potentials
        self.u[cur_row] += min_val;
        for &i in self.visited_rows.iter().filter(|&&i| i != cur_row) {
            let Some(j) = self.col_for_row[i] else {
                unreachable!("visited row {} is unassigned", i);
            };
            self.u[i] += min_val - self.shortest_path_costs[j].unwrap_or_else(C::zero);
        }
        for &j in self.visited_cols.iter() {
            self.v[j] -= min_val - self.shortest_path_costs[j].unwrap_or_else(C::zero);
        }

        // flip the path from the sink back to cur_row
        let mut j = sink;
        loop {
            let i = self.predecessors[j];
            self.row_for_col[j] = Some(i);
            let previous = self.col_for_row[i].replace(j);
            if i == cur_row {
                break;
            }
            let Some(previous) = previous else {
                unreachable!("row {} on the augmenting path was unassigned", i);
            };
            j = previous;
        }

        self.reset_search();
        Ok(())
    }

    fn find_augmenting_path(&mut self, cur_row: usize) -> AssignmentResult<(usize, C)> {
        self.heap.clear();

        let mut min_val = C::zero();
        let mut i = cur_row;
        loop {
            self.visited_rows.push(i);

            for (j, cost) in self.csr.neighbors(i) {
                if self.scanned_cols[j] {
                    continue;
                }
                let r = min_val + cost - self.u[i] - self.v[j];
                if self.shortest_path_costs[j].map_or(true, |spc| r < spc) {
                    if self.shortest_path_costs[j].is_none() {
                        self.touched_cols.push(j);
                    }
                    self.shortest_path_costs[j] = Some(r);
                    self.predecessors[j] = i;
                    self.heap.push(Reverse((r, self.row_for_col[j].is_some(), j)));
                }
            }

            // skip stale heap entries
            let j = loop {
                let Some(Reverse((r, _, j))) = self.heap.pop() else {
                    self.reset_search();
                    return Err(AssignmentError::Infeasible { row: cur_row });
                };
                if !self.scanned_cols[j] && self.shortest_path_costs[j] == Some(r) {
                    min_val = r;
                    break j;
                }
            };

            self.scanned_cols[j] = true;
            self.visited_cols.push(j);
            match self.row_for_col[j] {
                None => return Ok((j, min_val)),
                Some(row) => i = row,
            }
        }
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

    fn reset_search(&mut self) {
        for &j in self.touched_cols.iter() {
            self.shortest_path_costs[j] = None;
            self.scanned_cols[j] = false;
        }
        self.touched_cols.clear();
        self.visited_rows.clear();
        self.visited_cols.clear();
    }
}

impl<C> AssignmentSolver<C> for SparseShortestAugmentingPath<C>
where
    C: Cost,
{
    fn solve(&mut self, matrix: SquareCostMatrix<C>) -> AssignmentResult<Vec<usize>> {
        let graph = BipartiteGraph::from(&matrix);
        SparseShortestAugmentingPath::solve(self, &graph)
    }
}
