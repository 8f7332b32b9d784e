//! Exhaustive permutation search.
//!
//! Enumerates every tour with city 0 fixed as the start, pruning branches
//! whose partial cost already exceeds the best complete tour. Exact but
//! factorial time; only feasible for very small instances.

use crate::algorithms::{Solved, TspSolver};
use crate::error::HarnessError;

#[derive(Debug, Default)]
pub struct BruteForce {
    solved: Option<Solved>,
}

impl BruteForce {
    pub fn new() -> Self {
        BruteForce::default()
    }

    fn search(
        matrix: &[Vec<f64>],
        current: &mut Vec<usize>,
        remaining: &mut Vec<usize>,
        partial_cost: f64,
        best: &mut (Vec<usize>, f64),
    ) {
        if partial_cost >= best.1 {
            return;
        }

        if remaining.is_empty() {
            let last = *current.last().unwrap_or(&0);
            let total = partial_cost + matrix[last][current[0]];
            if total < best.1 {
                best.0 = current.clone();
                best.1 = total;
            }
            return;
        }

        for i in 0..remaining.len() {
            let city = remaining.swap_remove(i);
            let step = matrix[*current.last().unwrap_or(&0)][city];
            current.push(city);
            Self::search(matrix, current, remaining, partial_cost + step, best);
            current.pop();
            remaining.push(city);
            let last = remaining.len() - 1;
            remaining.swap(i.min(last), last);
        }
    }
}

impl TspSolver for BruteForce {
    fn solve(&mut self, matrix: &[Vec<f64>]) -> Result<(), HarnessError> {
        let n = matrix.len();
        if n == 0 {
            return Err(HarnessError::Execution("empty distance matrix".into()));
        }
        if n == 1 {
            self.solved = Some(Solved {
                tour: vec![0],
                cost: 0.0,
            });
            return Ok(());
        }

        let mut current = vec![0];
        let mut remaining: Vec<usize> = (1..n).collect();
        let mut best = (Vec::new(), f64::INFINITY);
        Self::search(matrix, &mut current, &mut remaining, 0.0, &mut best);

        if best.0.is_empty() {
            return Err(HarnessError::Execution("no tour found".into()));
        }

        self.solved = Some(Solved {
            tour: best.0,
            cost: best.1,
        });
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

    #[test]
    fn finds_the_optimal_square_tour() {
        let matrix = unit_square_matrix();
        let mut solver = BruteForce::new();
        solver.solve(&matrix).unwrap();
        assert_permutation(solver.tour().unwrap(), 4);
        assert!((solver.cost().unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn handles_a_single_city() {
        let mut solver = BruteForce::new();
        solver.solve(&[vec![0.0]]).unwrap();
        assert_eq!(solver.tour().unwrap(), &[0]);
        assert_eq!(solver.cost().unwrap(), 0.0);
    }

    #[test]
    fn optimal_on_collinear_points() {
        // Points on a line: the optimal closed tour sweeps right then back,
        // cost = 2 * span.
        let matrix = points_matrix(&[(0.0, 0.0), (3.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let mut solver = BruteForce::new();
        solver.solve(&matrix).unwrap();
        assert!((solver.cost().unwrap() - 6.0).abs() < 1e-9);
    }
}
