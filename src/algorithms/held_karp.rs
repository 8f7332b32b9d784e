//! Held-Karp exact dynamic programming.
//!
//! Bitmask DP over subsets of cities with city 0 fixed as the start.
//! O(2^n * n^2) time and O(2^n * n) memory, so the feasibility bound keeps
//! this well below the point where the subset table stops fitting in RAM.

use crate::algorithms::{Solved, TspSolver};
use crate::error::HarnessError;

const NO_PARENT: u32 = u32::MAX;

#[derive(Debug, Default)]
pub struct HeldKarp {
    solved: Option<Solved>,
}

impl HeldKarp {
    pub fn new() -> Self {
        HeldKarp::default()
    }
}

impl TspSolver for HeldKarp {
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

        // DP over the m = n - 1 cities other than the start. City index
        // i in the tables stands for city i + 1 of the instance.
        let m = n - 1;
        let full: usize = (1 << m) - 1;
        let mut dp = vec![f64::INFINITY; (full + 1) * m];
        let mut parent = vec![NO_PARENT; (full + 1) * m];

        for i in 0..m {
            dp[(1 << i) * m + i] = matrix[0][i + 1];
        }

        for mask in 1..=full {
            for last in 0..m {
                if mask & (1 << last) == 0 {
                    continue;
                }
                let here = dp[mask * m + last];
                if !here.is_finite() {
                    continue;
                }
                for next in 0..m {
                    if mask & (1 << next) != 0 {
                        continue;
                    }
                    let next_mask = mask | (1 << next);
                    let candidate = here + matrix[last + 1][next + 1];
                    if candidate < dp[next_mask * m + next] {
                        dp[next_mask * m + next] = candidate;
                        parent[next_mask * m + next] = last as u32;
                    }
                }
            }
        }

        let mut best_cost = f64::INFINITY;
        let mut best_last = 0;
        for last in 0..m {
            let total = dp[full * m + last] + matrix[last + 1][0];
            if total < best_cost {
                best_cost = total;
                best_last = last;
            }
        }

        if !best_cost.is_finite() {
            return Err(HarnessError::Execution("no tour found".into()));
        }

        // Walk the parent chain back to the start.
        let mut tour = Vec::with_capacity(n);
        let mut mask = full;
        let mut last = best_last;
        loop {
            tour.push(last + 1);
            let prev = parent[mask * m + last];
            mask &= !(1 << last);
            if prev == NO_PARENT {
                break;
            }
            last = prev as usize;
        }
        tour.push(0);
        tour.reverse();

        self.solved = Some(Solved {
            tour,
            cost: best_cost,
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
    use crate::algorithms::BruteForce;

    #[test]
    fn finds_the_optimal_square_tour() {
        let matrix = unit_square_matrix();
        let mut solver = HeldKarp::new();
        solver.solve(&matrix).unwrap();
        assert_permutation(solver.tour().unwrap(), 4);
        assert!((solver.cost().unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn matches_brute_force_on_a_small_instance() {
        let matrix = points_matrix(&[
            (0.0, 0.0),
            (4.0, 1.0),
            (1.0, 3.0),
            (5.0, 4.0),
            (2.0, 6.0),
            (6.0, 2.0),
            (3.0, 0.5),
        ]);

        let mut exact = BruteForce::new();
        exact.solve(&matrix).unwrap();

        let mut dp = HeldKarp::new();
        dp.solve(&matrix).unwrap();

        assert_permutation(dp.tour().unwrap(), 7);
        assert!((dp.cost().unwrap() - exact.cost().unwrap()).abs() < 1e-9);
    }

    #[test]
    fn handles_two_cities() {
        let matrix = points_matrix(&[(0.0, 0.0), (3.0, 4.0)]);
        let mut solver = HeldKarp::new();
        solver.solve(&matrix).unwrap();
        assert_eq!(solver.tour().unwrap(), &[0, 1]);
        assert!((solver.cost().unwrap() - 10.0).abs() < 1e-9);
    }
}
