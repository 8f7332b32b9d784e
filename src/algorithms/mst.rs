//! MST-based 2-approximation.
//!
//! Builds a minimum spanning tree with Prim's algorithm, then emits a
//! preorder walk of the tree rooted at city 0. For metric instances the
//! resulting tour costs at most twice the optimum.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use crate::algorithms::{cycle_cost, Solved, TspSolver};
use crate::error::HarnessError;

#[derive(Debug, Default)]
pub struct MstApproximation {
    solved: Option<Solved>,
}

impl MstApproximation {
    pub fn new() -> Self {
        MstApproximation::default()
    }

    /// Prim's algorithm over the dense matrix; returns the parent of each
    /// city in the tree rooted at 0.
    fn minimum_spanning_tree(matrix: &[Vec<f64>]) -> Vec<Option<usize>> {
        let n = matrix.len();
        let mut parent: Vec<Option<usize>> = vec![None; n];
        let mut key = vec![f64::INFINITY; n];
        let mut in_tree = vec![false; n];
        let mut heap = BinaryHeap::new();

        key[0] = 0.0;
        heap.push(Reverse((OrderedFloat(0.0), 0usize)));

        while let Some(Reverse((_, u))) = heap.pop() {
            if in_tree[u] {
                continue;
            }
            in_tree[u] = true;

            for v in 0..n {
                if !in_tree[v] && matrix[u][v] < key[v] {
                    parent[v] = Some(u);
                    key[v] = matrix[u][v];
                    heap.push(Reverse((OrderedFloat(key[v]), v)));
                }
            }
        }

        parent
    }

    /// Preorder walk of the tree, visiting children in ascending city order.
    fn preorder(parent: &[Option<usize>]) -> Vec<usize> {
        let n = parent.len();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (city, p) in parent.iter().enumerate() {
            if let Some(p) = p {
                children[*p].push(city);
            }
        }

        let mut tour = Vec::with_capacity(n);
        let mut stack = vec![0usize];
        while let Some(v) = stack.pop() {
            tour.push(v);
            for &child in children[v].iter().rev() {
                stack.push(child);
            }
        }
        tour
    }
}

impl TspSolver for MstApproximation {
    fn solve(&mut self, matrix: &[Vec<f64>]) -> Result<(), HarnessError> {
        let n = matrix.len();
        if n == 0 {
            return Err(HarnessError::Execution("empty distance matrix".into()));
        }

        let parent = Self::minimum_spanning_tree(matrix);
        let tour = Self::preorder(&parent);

        if tour.len() != n {
            return Err(HarnessError::Execution(
                "spanning tree did not reach every city".into(),
            ));
        }

        let cost = cycle_cost(matrix, &tour);
        self.solved = Some(Solved { tour, cost });
        Ok(())
    }

    fn tour(&self) -> Result<&[usize], HarnessError> {
        Solved::tour(&self.solved)
    }

    fn cost(&self) -> Result<f64, HarnessError> {
        Solved::cost(&self.solved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::tests_support::{
        assert_permutation, points_matrix, unit_square_matrix,
    };
    use crate::algorithms::BruteForce;

    #[test]
    fn produces_a_permutation() {
        let matrix = unit_square_matrix();
        let mut solver = MstApproximation::new();
        solver.solve(&matrix).unwrap();
        assert_permutation(solver.tour().unwrap(), 4);
    }

    #[test]
    fn stays_within_twice_the_optimum() {
        let matrix = points_matrix(&[
            (0.0, 0.0),
            (2.0, 1.0),
            (4.0, 0.5),
            (1.0, 3.0),
            (3.0, 4.0),
            (0.5, 5.0),
            (5.0, 3.0),
            (2.5, 2.5),
        ]);

        let mut exact = BruteForce::new();
        exact.solve(&matrix).unwrap();

        let mut approx = MstApproximation::new();
        approx.solve(&matrix).unwrap();

        let optimal = exact.cost().unwrap();
        let approximate = approx.cost().unwrap();
        assert_permutation(approx.tour().unwrap(), 8);
        assert!(approximate >= optimal - 1e-9);
        assert!(approximate <= 2.0 * optimal + 1e-9);
    }

    #[test]
    fn single_city_has_zero_cost() {
        let mut solver = MstApproximation::new();
        solver.solve(&[vec![0.0]]).unwrap();
        assert_eq!(solver.tour().unwrap(), &[0]);
        assert_eq!(solver.cost().unwrap(), 0.0);
    }
}
