use linear_assignment::linear_assignment::config::{Algorithm, Objective, SolverConfig};
use linear_assignment::linear_assignment::cost_matrix::{square, CostMatrix};
use linear_assignment::linear_assignment::error::AssignmentError;
use linear_assignment::linear_assignment::graph::BipartiteGraph;
use linear_assignment::linear_assignment::shortest_augmenting_path::ShortestAugmentingPath;
use linear_assignment::linear_assignment::sparse_shortest_augmenting_path::SparseShortestAugmentingPath;
use linear_assignment::linear_assignment::solve;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const INF: i64 = i64::MAX;
const ALGORITHMS: [Algorithm; 3] = [Algorithm::Hungarian, Algorithm::ShortestAugmentingPath, Algorithm::SparseShortestAugmentingPath];

fn permute(perm: &mut [usize], k: usize, visit: &mut impl FnMut(&[usize])) {
    if k == perm.len() {
        visit(perm);
        return;
    }
    for i in k..perm.len() {
        perm.swap(k, i);
        permute(perm, k + 1, visit);
        perm.swap(k, i);
    }
}

// best total over every full matching of the padded problem, None if each one needs a forbidden pair
fn brute_force(rows: &[Vec<i64>], objective: Objective) -> Option<i64> {
    let (m, n) = (rows.len(), rows[0].len());
    let mut perm: Vec<usize> = (0..m.max(n)).collect();
    let mut best: Option<i64> = None;
    permute(&mut perm, 0, &mut |p: &[usize]| {
        let mut total = 0;
        for (i, row) in rows.iter().enumerate() {
            let j = p[i];
            if j >= n {
                continue;
            }
            if row[j] == INF {
                return;
            }
            total += row[j];
        }
        best = Some(match (best, objective) {
            (None, _) => total,
            (Some(b), Objective::Minimize) => b.min(total),
            (Some(b), Objective::Maximize) => b.max(total),
        });
    });
    best
}

fn cost_rows(max_side: usize, with_infeasible: bool) -> impl Strategy<Value = Vec<Vec<i64>>> {
    let cell = if with_infeasible { prop_oneof![7 => 0i64..20, 1 => Just(INF)].boxed() } else { (0i64..20).boxed() };
    (1..=max_side, 1..=max_side).prop_flat_map(move |(m, n)| prop::collection::vec(prop::collection::vec(cell.clone(), n), m))
}

fn square_rows(max_side: usize) -> impl Strategy<Value = Vec<Vec<i64>>> {
    (1..=max_side).prop_flat_map(|n| prop::collection::vec(prop::collection::vec(0i64..100, n), n))
}

proptest! {
    #[test]
    fn every_backend_matches_brute_force(rows in cost_rows(5, true), maximize in any::<bool>()) {
        let objective = if maximize { Objective::Maximize } else { Objective::Minimize };
        let costs = CostMatrix::from_rows(rows.clone()).unwrap();
        let expected = brute_force(&rows, objective);
        for algorithm in ALGORITHMS {
            let config = SolverConfig::new(algorithm).with_objective(objective);
            match (solve(&costs, &config), expected) {
                (Ok(solution), Some(best)) => {
                    prop_assert_eq!(solution.total_cost, best);
                }
                (Err(AssignmentError::Infeasible { .. }), None) => {}
                (result, best) => {
                    prop_assert!(false, "{:?}: got {:?}, brute force {:?}", algorithm, result, best);
                }
            }
        }
    }

    #[test]
    fn backends_agree_on_cost(rows in square_rows(24)) {
        let costs = CostMatrix::from_rows(rows).unwrap();
        let totals: Vec<i64> = ALGORITHMS.iter().map(|&a| solve(&costs, &SolverConfig::new(a)).unwrap().total_cost).collect();
        prop_assert!(totals.windows(2).all(|w| w[0] == w[1]), "totals differ: {:?}", totals);
    }

    #[test]
    fn solving_twice_gives_the_same_cost(rows in cost_rows(8, false), algorithm in prop::sample::select(ALGORITHMS.to_vec())) {
        let costs = CostMatrix::from_rows(rows).unwrap();
        let first = solve(&costs.clone(), &SolverConfig::new(algorithm)).unwrap();
        let second = solve(&costs.clone(), &SolverConfig::new(algorithm)).unwrap();
        prop_assert_eq!(first.total_cost, second.total_cost);
    }

    #[test]
    fn padding_leaves_the_surplus_unassigned(rows in cost_rows(8, false), algorithm in prop::sample::select(ALGORITHMS.to_vec())) {
        let costs = CostMatrix::from_rows(rows).unwrap();
        let (m, n) = (costs.num_rows(), costs.num_cols());
        let solution = solve(&costs, &SolverConfig::new(algorithm)).unwrap();
        let assignment = &solution.assignment;
        prop_assert_eq!(assignment.num_assigned(), m.min(n));
        prop_assert_eq!(assignment.row_to_col().iter().filter(|c| c.is_none()).count(), m - m.min(n));
        prop_assert_eq!(assignment.col_to_row().iter().filter(|r| r.is_none()).count(), n - m.min(n));
    }

    #[test]
    fn dual_potentials_stay_feasible(rows in square_rows(12)) {
        let costs = CostMatrix::from_rows(rows.clone()).unwrap();
        let n = costs.num_rows();

        let mut dense = ShortestAugmentingPath::new();
        let dense_assignment = dense.solve(square(costs.clone())).unwrap();
        let mut sparse = SparseShortestAugmentingPath::new();
        let sparse_assignment = sparse.solve(&BipartiteGraph::from(&square(costs))).unwrap();

        for (assignment, u, v) in [(dense_assignment, dense.row_potentials(), dense.column_potentials()), (sparse_assignment, sparse.row_potentials(), sparse.column_potentials())] {
            for i in 0..n {
                for j in 0..n {
                    prop_assert!(rows[i][j] - u[i] - v[j] >= 0, "negative reduced cost at ({}, {})", i, j);
                }
                prop_assert_eq!(rows[i][assignment[i]] - u[i] - v[assignment[i]], 0);
            }
        }
    }
}

#[test]
fn dense_backends_agree_on_large_instances() {
    let mut rng = StdRng::seed_from_u64(42);
    for n in [30, 60, 150] {
        let costs = CostMatrix::from_fn(n, n, |_, _| rng.gen_range(0..1_000i64)).unwrap();
        let totals: Vec<i64> = ALGORITHMS.iter().map(|&a| solve(&costs, &SolverConfig::new(a)).unwrap().total_cost).collect();
        assert!(totals.windows(2).all(|w| w[0] == w[1]), "n = {}: {:?}", n, totals);
    }
}

#[test]
fn sparse_backend_agrees_on_mostly_infeasible_instances() {
    let mut rng = StdRng::seed_from_u64(7);
    let n = 300;
    // a cheap-ish diagonal keeps the instance feasible
    let costs = CostMatrix::from_fn(n, n, |i, j| if i == j { 500 } else if rng.gen_bool(0.03) { rng.gen_range(0..1_000i64) } else { INF }).unwrap();

    let dense = solve(&costs, &SolverConfig::new(Algorithm::ShortestAugmentingPath)).unwrap();
    let sparse = solve(&costs, &SolverConfig::new(Algorithm::SparseShortestAugmentingPath)).unwrap();
    assert_eq!(dense.total_cost, sparse.total_cost);
    assert!(dense.total_cost <= 500 * n as i64);
    assert_eq!(sparse.assignment.num_assigned(), n);
}

#[test]
fn rectangular_random_instances_agree() {
    let mut rng = StdRng::seed_from_u64(3);
    for (m, n) in [(10, 25), (25, 10), (1, 40), (40, 1)] {
        let costs = CostMatrix::from_fn(m, n, |_, _| rng.gen_range(0..50i64)).unwrap();
        let totals: Vec<i64> = ALGORITHMS.iter().map(|&a| solve(&costs, &SolverConfig::new(a)).unwrap().total_cost).collect();
        assert!(totals.windows(2).all(|w| w[0] == w[1]), "{}x{}: {:?}", m, n, totals);
    }
}
