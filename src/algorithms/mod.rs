//! The algorithm contract and the solver roster.
//!
//! Every solver variant implements [`TspSolver`]: `solve` consumes a square
//! distance matrix, after which `tour` and `cost` become queryable. Calling
//! an accessor before `solve` completes fails with `NotSolved`. Variants own
//! their result state privately; there is no shared mutable base.
//!
//! Feasibility is enforced *around* the contract, not inside it: a
//! [`RosterEntry`] pairs a solver constructor with a display name and an
//! optional maximum feasible dimension, and `check_dimension` must pass
//! before any computation starts. This is the harness's only defense against
//! runaway exponential-time runs.

pub mod brute_force;
pub mod convex_hull;
pub mod greedy;
pub mod held_karp;
pub mod mst;

pub use brute_force::BruteForce;
pub use convex_hull::ConvexHull;
pub use greedy::Greedy;
pub use held_karp::HeldKarp;
pub use mst::MstApproximation;

use crate::error::HarnessError;

/// Uniform contract for TSP solver variants.
pub trait TspSolver {
    /// Solve the instance described by a square matrix of pairwise
    /// non-negative distances.
    fn solve(&mut self, matrix: &[Vec<f64>]) -> Result<(), HarnessError>;

    /// The computed tour, a permutation of `0..n`.
    fn tour(&self) -> Result<&[usize], HarnessError>;

    /// The cost of the computed tour, including the closing edge.
    fn cost(&self) -> Result<f64, HarnessError>;
}

/// Result state owned by each solved variant.
#[derive(Debug, Clone)]
pub struct Solved {
    pub tour: Vec<usize>,
    pub cost: f64,
}

impl Solved {
    pub fn tour(this: &Option<Solved>) -> Result<&[usize], HarnessError> {
        this.as_ref()
            .map(|s| s.tour.as_slice())
            .ok_or(HarnessError::NotSolved)
    }

    pub fn cost(this: &Option<Solved>) -> Result<f64, HarnessError> {
        this.as_ref().map(|s| s.cost).ok_or(HarnessError::NotSolved)
    }
}

/// Cost of a closed tour under a distance matrix, including the edge from
/// the last city back to the first.
pub(crate) fn cycle_cost(matrix: &[Vec<f64>], tour: &[usize]) -> f64 {
    let mut cost = 0.0;
    for i in 0..tour.len() {
        let j = (i + 1) % tour.len();
        cost += matrix[tour[i]][tour[j]];
    }
    cost
}

/// A roster entry: solver constructor, display name, and feasibility bound.
///
/// Display names must be unique within a run; they form half of the
/// result-artifact key.
pub struct RosterEntry {
    name: String,
    max_dimension: Option<usize>,
    build: Box<dyn Fn() -> Box<dyn TspSolver>>,
}

impl RosterEntry {
    pub fn new(
        name: impl Into<String>,
        max_dimension: Option<usize>,
        build: impl Fn() -> Box<dyn TspSolver> + 'static,
    ) -> Self {
        RosterEntry {
            name: name.into(),
            max_dimension,
            build: Box::new(build),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_dimension(&self) -> Option<usize> {
        self.max_dimension
    }

    /// Whether the declared bound accommodates the given dimension.
    pub fn can_handle(&self, dimension: usize) -> bool {
        self.max_dimension.map_or(true, |max| dimension <= max)
    }

    /// Enforce the feasibility bound before any computation is attempted.
    pub fn check_dimension(&self, dimension: usize) -> Result<(), HarnessError> {
        match self.max_dimension {
            Some(max) if dimension > max => Err(HarnessError::Capability {
                algorithm: self.name.clone(),
                dimension,
                max,
            }),
            _ => Ok(()),
        }
    }

    /// Construct a fresh solver for a single run.
    pub fn build(&self) -> Box<dyn TspSolver> {
        (self.build)()
    }
}

impl std::fmt::Debug for RosterEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RosterEntry")
            .field("name", &self.name)
            .field("max_dimension", &self.max_dimension)
            .finish()
    }
}

/// The default solver roster with the feasibility bounds used for the
/// standard instance collection.
pub fn default_roster() -> Vec<RosterEntry> {
    vec![
        RosterEntry::new("BruteForce", Some(12), || Box::new(BruteForce::new())),
        RosterEntry::new("HeldKarp", Some(20), || Box::new(HeldKarp::new())),
        RosterEntry::new("Greedy", Some(90_000), || Box::new(Greedy::new())),
        RosterEntry::new("MSTApproximation", Some(90_000), || {
            Box::new(MstApproximation::new())
        }),
        RosterEntry::new("ConvexHull", Some(90_000), || Box::new(ConvexHull::new())),
    ]
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn accessors_fail_before_solve() {
        let solver = Greedy::new();
        assert!(matches!(solver.tour(), Err(HarnessError::NotSolved)));
        assert!(matches!(solver.cost(), Err(HarnessError::NotSolved)));
    }

    #[test]
    fn check_dimension_allows_the_bound_itself() {
        let entry = RosterEntry::new("BruteForce", Some(12), || Box::new(BruteForce::new()));
        assert!(entry.check_dimension(12).is_ok());
        assert!(entry.can_handle(12));
    }

    #[test]
    fn check_dimension_rejects_beyond_the_bound() {
        let entry = RosterEntry::new("BruteForce", Some(12), || Box::new(BruteForce::new()));
        let err = entry.check_dimension(13).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Capability {
                dimension: 13,
                max: 12,
                ..
            }
        ));
        assert!(!entry.can_handle(13));
    }

    #[test]
    fn unbounded_entries_accept_any_dimension() {
        let entry = RosterEntry::new("Greedy", None, || Box::new(Greedy::new()));
        assert!(entry.check_dimension(usize::MAX).is_ok());
    }

    #[test]
    fn default_roster_names_are_unique() {
        let roster = default_roster();
        let names: HashSet<&str> = roster.iter().map(|e| e.name()).collect();
        assert_eq!(names.len(), roster.len());
    }
}
