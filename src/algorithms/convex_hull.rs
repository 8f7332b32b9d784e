//! Convex-hull-based construction.
//!
//! Works from pseudo-coordinates recovered from the distance matrix (each
//! city's distances to cities 0 and 1), since the contract only supplies
//! distances. Builds the convex hull of those points with a Graham scan,
//! spans the interior points with a minimum spanning tree, and splices the
//! tree's preorder chain into the hull cycle at the cheapest position.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use crate::algorithms::{cycle_cost, Solved, TspSolver};
use crate::error::HarnessError;

#[derive(Debug, Default)]
pub struct ConvexHull {
    solved: Option<Solved>,
}

impl ConvexHull {
    pub fn new() -> Self {
        ConvexHull::default()
    }

    /// Approximate planar coordinates: distance to city 0 as x, distance to
    /// city 1 as y. Exact geometry is unavailable through the contract; the
    /// hull over these points is still a useful tour skeleton.
    fn pseudo_coordinates(matrix: &[Vec<f64>]) -> Vec<(f64, f64)> {
        matrix.iter().map(|row| (row[0], row[1])).collect()
    }

    /// Graham scan. Returns hull city indices in counter-clockwise order;
    /// collinear points are dropped from the hull and handled as interior.
    fn convex_hull(points: &[(f64, f64)]) -> Vec<usize> {
        let n = points.len();
        let mut lowest = 0;
        for i in 1..n {
            if points[i].1 < points[lowest].1
                || (points[i].1 == points[lowest].1 && points[i].0 < points[lowest].0)
            {
                lowest = i;
            }
        }

        let mut order: Vec<usize> = (0..n).collect();
        let anchor = points[lowest];
        order.sort_by(|&i, &j| {
            if i == lowest {
                return std::cmp::Ordering::Less;
            }
            if j == lowest {
                return std::cmp::Ordering::Greater;
            }
            let angle_i = (points[i].1 - anchor.1).atan2(points[i].0 - anchor.0);
            let angle_j = (points[j].1 - anchor.1).atan2(points[j].0 - anchor.0);
            angle_i
                .total_cmp(&angle_j)
                .then_with(|| {
                    let di = squared(points[i], anchor);
                    let dj = squared(points[j], anchor);
                    di.total_cmp(&dj)
                })
        });

        let mut hull: Vec<usize> = Vec::with_capacity(n);
        for &idx in &order {
            while hull.len() >= 2
                && cross(
                    points[hull[hull.len() - 2]],
                    points[hull[hull.len() - 1]],
                    points[idx],
                ) <= 0.0
            {
                hull.pop();
            }
            hull.push(idx);
        }
        hull
    }

    /// Prim's algorithm restricted to the interior cities. Returns an
    /// adjacency list over all city indices.
    fn interior_mst(matrix: &[Vec<f64>], interior: &[usize]) -> Vec<Vec<usize>> {
        let n = matrix.len();
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
        if interior.len() < 2 {
            return adjacency;
        }

        let mut in_tree = vec![false; n];
        let mut heap = BinaryHeap::new();

        in_tree[interior[0]] = true;
        for &v in &interior[1..] {
            heap.push(Reverse((OrderedFloat(matrix[interior[0]][v]), interior[0], v)));
        }

        while let Some(Reverse((_, u, v))) = heap.pop() {
            if in_tree[v] {
                continue;
            }
            in_tree[v] = true;
            adjacency[u].push(v);
            adjacency[v].push(u);

            for &w in interior {
                if !in_tree[w] {
                    heap.push(Reverse((OrderedFloat(matrix[v][w]), v, w)));
                }
            }
        }

        for neighbours in &mut adjacency {
            neighbours.sort_unstable();
        }
        adjacency
    }

    /// Preorder walk of the interior tree starting at `start`.
    fn tree_chain(adjacency: &[Vec<usize>], start: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut visited = vec![false; adjacency.len()];
        let mut stack = vec![start];
        while let Some(v) = stack.pop() {
            if visited[v] {
                continue;
            }
            visited[v] = true;
            chain.push(v);
            for &u in adjacency[v].iter().rev() {
                if !visited[u] {
                    stack.push(u);
                }
            }
        }
        chain
    }
}

fn cross(p1: (f64, f64), p2: (f64, f64), p3: (f64, f64)) -> f64 {
    (p2.0 - p1.0) * (p3.1 - p1.1) - (p2.1 - p1.1) * (p3.0 - p1.0)
}

fn squared(p: (f64, f64), q: (f64, f64)) -> f64 {
    (p.0 - q.0) * (p.0 - q.0) + (p.1 - q.1) * (p.1 - q.1)
}

impl TspSolver for ConvexHull {
    fn solve(&mut self, matrix: &[Vec<f64>]) -> Result<(), HarnessError> {
        let n = matrix.len();
        if n == 0 {
            return Err(HarnessError::Execution("empty distance matrix".into()));
        }
        if n <= 3 {
            // Every permutation describes the same cycle.
            let tour: Vec<usize> = (0..n).collect();
            let cost = cycle_cost(matrix, &tour);
            self.solved = Some(Solved { tour, cost });
            return Ok(());
        }

        let points = Self::pseudo_coordinates(matrix);
        let hull = Self::convex_hull(&points);

        let mut on_hull = vec![false; n];
        for &h in &hull {
            on_hull[h] = true;
        }
        let interior: Vec<usize> = (0..n).filter(|&i| !on_hull[i]).collect();

        let tour = if interior.is_empty() {
            hull
        } else {
            // Connect the interior tree to the hull at the closest pair,
            // then splice its preorder chain into the cheapest hull edge.
            let (_, start) = hull
                .iter()
                .flat_map(|&h| interior.iter().map(move |&i| (OrderedFloat(matrix[h][i]), i)))
                .min()
                .expect("hull and interior are non-empty");

            let adjacency = Self::interior_mst(matrix, &interior);
            let chain = Self::tree_chain(&adjacency, start);

            let mut best_pos = 0;
            let mut best_delta = f64::INFINITY;
            for i in 0..hull.len() {
                let prev = hull[i];
                let next = hull[(i + 1) % hull.len()];
                let delta = matrix[prev][chain[0]] + matrix[*chain.last().unwrap()][next]
                    - matrix[prev][next];
                if delta < best_delta {
                    best_delta = delta;
                    best_pos = i + 1;
                }
            }

            let mut tour = hull;
            tour.splice(best_pos..best_pos, chain);
            tour
        };

        if tour.len() != n {
            return Err(HarnessError::Execution(
                "hull merge did not produce a complete tour".into(),
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
