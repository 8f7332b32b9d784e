//! Greedy nearest-neighbour construction.
//!
//! Starts at city 0 and repeatedly moves to the nearest unvisited city.
//! O(n^2), no optimality guarantee.

use crate::algorithms::{cycle_cost, Solved, TspSolver};
use crate::error::HarnessError;

#[derive(Debug, Default)]
pub struct Greedy {
    solved: Option<Solved>,
}

impl Greedy {
    pub fn new() -> Self {
        Greedy::default()
    }

    fn nearest_unvisited(matrix: &[Vec<f64>], current: usize, visited: &[bool]) -> Option<usize> {
        let mut next = None;
        let mut best = f64::INFINITY;
        for (city, &seen) in visited.iter().enumerate() {
            if !seen && matrix[current][city] < best {
                best = matrix[current][city];
                next = Some(city);
            }
        }
        next
    }
}

impl TspSolver for Greedy {
    fn solve(&mut self, matrix: &[Vec<f64>]) -> Result<(), HarnessError> {
        let n = matrix.len();
        if n == 0 {
            return Err(HarnessError::Execution("empty distance matrix".into()));
        }

        let mut tour = Vec::with_capacity(n);
        let mut visited = vec![false; n];
        let mut current = 0;
        tour.push(current);
        visited[current] = true;

        for _ in 1..n {
            let Some(next) = Self::nearest_unvisited(matrix, current, &visited) else {
                return Err(HarnessError::Execution(
                    "no reachable unvisited city".into(),
                ));
            };
            tour.push(next);
            visited[next] = true;
            current = next;
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
