//! TSP Evaluation Harness
//!
//! Evaluates interchangeable tour-construction and approximation algorithms
//! against named geometric TSP instances, records solution quality and
//! resource cost, and persists one result artifact per (algorithm, instance)
//! pair for later comparison.
//!
//! # Features
//!
//! - Uniform solver contract with per-variant result state
//! - Dimension-gated run selection (exact solvers never see large instances)
//! - Memoized, durable result store with idempotent re-runs
//! - Per-algorithm failure isolation in comparisons
//! - Approximation ratios against a known-optima registry
//!
//! # Example
//!
//! ```no_run
//! use tsp_harness::algorithms::default_roster;
//! use tsp_harness::evaluator::Evaluator;
//! use tsp_harness::instance::TspInstance;
//! use tsp_harness::store::ResultStore;
//!
//! let instance = TspInstance::from_file("datasets/a280.tsp").unwrap();
//! let store = ResultStore::with_known_optima("results").unwrap();
//! let mut evaluator = Evaluator::new(store);
//!
//! let roster = default_roster();
//! let feasible: Vec<_> = roster
//!     .iter()
//!     .filter(|e| e.can_handle(instance.dimension))
//!     .collect();
//! let summary = evaluator.compare_all(feasible, &instance);
//! println!("{}", summary);
//! ```

pub mod algorithms;
pub mod error;
pub mod evaluator;
pub mod instance;
pub mod perf;
pub mod runner;
pub mod store;

pub use error::HarnessError;
pub use instance::TspInstance;
pub use store::ResultRecord;
