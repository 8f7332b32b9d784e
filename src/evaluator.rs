//! Orchestration of algorithm runs over a single instance.
//!
//! The evaluator consults the result store before ever invoking an
//! algorithm, so re-running the harness after a crash never redoes completed
//! work. `compare_all` isolates failures per algorithm: one failing solver is
//! recorded as a failure projection and the remaining roster still runs.

use serde::Serialize;

use crate::algorithms::RosterEntry;
use crate::error::HarnessError;
use crate::instance::TspInstance;
use crate::store::{ResultRecord, ResultStore};

/// Per-algorithm projection in a comparison summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AlgorithmOutcome {
    Success {
        runtime_seconds: f64,
        memory_delta_bytes: i64,
        tour_cost: f64,
    },
    Failure {
        error: String,
    },
}

/// Comparison of a roster against one instance. Built fresh on every call;
/// persistence happens at the record granularity, not here.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonSummary {
    pub instance: String,
    pub dimension: usize,
    /// Outcomes in roster order; the order defines report ordering.
    pub outcomes: Vec<(String, AlgorithmOutcome)>,
}

impl ComparisonSummary {
    pub fn outcome(&self, algorithm: &str) -> Option<&AlgorithmOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == algorithm)
            .map(|(_, outcome)| outcome)
    }
}

impl std::fmt::Display for ComparisonSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance {} (n={})", self.instance, self.dimension)?;
        writeln!(
            f,
            "{:<20} {:>12} {:>14} {:>12}",
            "Algorithm", "Runtime (s)", "Memory (KB)", "Tour Cost"
        )?;
        writeln!(f, "{}", "-".repeat(62))?;
        for (name, outcome) in &self.outcomes {
            match outcome {
                AlgorithmOutcome::Success {
                    runtime_seconds,
                    memory_delta_bytes,
                    tour_cost,
                } => writeln!(
                    f,
                    "{:<20} {:>12.4} {:>14.2} {:>12.2}",
                    name,
                    runtime_seconds,
                    *memory_delta_bytes as f64 / 1024.0,
                    tour_cost
                )?,
                AlgorithmOutcome::Failure { error } => {
                    writeln!(f, "{:<20} error: {}", name, error)?
                }
            }
        }
        Ok(())
    }
}

/// Drives algorithm runs against the result store.
pub struct Evaluator {
    store: ResultStore,
}

impl Evaluator {
    pub fn new(store: ResultStore) -> Self {
        Evaluator { store }
    }

    /// Evaluate one algorithm on one instance, memoized.
    ///
    /// On a store hit the existing record is returned unchanged and the
    /// algorithm is not invoked.
    pub fn evaluate(
        &mut self,
        entry: &RosterEntry,
        instance: &TspInstance,
    ) -> Result<ResultRecord, HarnessError> {
        if let Some(record) = self.store.lookup(entry.name(), &instance.name)? {
            log::info!(
                "using stored result for {} on {}",
                entry.name(),
                instance.name
            );
            return Ok(record);
        }

        self.store.compute_and_store(entry, instance)
    }

    /// Evaluate every roster entry independently, in the order supplied.
    ///
    /// A failure from one algorithm is recorded as a failure projection and
    /// never aborts the evaluation of the others.
    pub fn compare_all<'a, I>(&mut self, roster: I, instance: &TspInstance) -> ComparisonSummary
    where
        I: IntoIterator<Item = &'a RosterEntry>,
    {
        let roster: Vec<&RosterEntry> = roster.into_iter().collect();
        let mut outcomes = Vec::with_capacity(roster.len());

        for (i, entry) in roster.iter().enumerate() {
            log::info!(
                "evaluating algorithm {}/{}: {}",
                i + 1,
                roster.len(),
                entry.name()
            );

            let outcome = match self.evaluate(entry, instance) {
                Ok(record) => match record.tour_cost {
                    Some(tour_cost) => AlgorithmOutcome::Success {
                        runtime_seconds: record.runtime_seconds,
                        memory_delta_bytes: record.memory_delta_bytes,
                        tour_cost,
                    },
                    None => AlgorithmOutcome::Failure {
                        error: "stored record has no tour cost".to_string(),
                    },
                },
                Err(err) => {
                    log::error!("{} failed on {}: {}", entry.name(), instance.name, err);
                    AlgorithmOutcome::Failure {
                        error: err.to_string(),
                    }
                }
            };
            outcomes.push((entry.name().to_string(), outcome));
        }

        ComparisonSummary {
            instance: instance.name.clone(),
            dimension: instance.dimension,
            outcomes,
        }
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn into_store(self) -> ResultStore {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::algorithms::{Solved, TspSolver};
    use crate::instance::Point;

    /// Returns a fixed tour and cost, counting `solve` invocations.
    struct ScriptedSolver {
        tour: Vec<usize>,
        cost: f64,
        fail: bool,
        invocations: Arc<AtomicUsize>,
        solved: Option<Solved>,
    }

    impl TspSolver for ScriptedSolver {
        fn solve(&mut self, _matrix: &[Vec<f64>]) -> Result<(), HarnessError> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(HarnessError::Execution("scripted failure".into()));
            }
            self.solved = Some(Solved {
                tour: self.tour.clone(),
                cost: self.cost,
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

    fn scripted_entry(
        name: &str,
        max_dimension: Option<usize>,
        cost: f64,
        fail: bool,
    ) -> (RosterEntry, Arc<AtomicUsize>) {
        let invocations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&invocations);
        let entry = RosterEntry::new(name, max_dimension, move || {
            Box::new(ScriptedSolver {
                tour: vec![0, 1, 2, 3],
                cost,
                fail,
                invocations: Arc::clone(&counter),
                solved: None,
            })
        });
        (entry, invocations)
    }

    fn square_instance(name: &str) -> TspInstance {
        TspInstance {
            name: name.to_string(),
            dimension: 4,
            coordinates: vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(0.0, 1.0),
            ],
        }
    }

    fn evaluator_with_registry(
        dir: &std::path::Path,
        registry: HashMap<String, f64>,
    ) -> Evaluator {
        Evaluator::new(ResultStore::new(dir, registry).unwrap())
    }

    #[test]
    fn evaluate_is_idempotent_and_solves_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut evaluator = evaluator_with_registry(dir.path(), HashMap::new());
        let (entry, invocations) = scripted_entry("Scripted", None, 4.0, false);
        let instance = square_instance("square");

        let first = evaluator.evaluate(&entry, &instance).unwrap();
        let second = evaluator.evaluate(&entry, &instance).unwrap();

        assert_eq!(first, second);
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn evaluate_reuses_artifacts_across_processes() {
        let dir = tempfile::tempdir().unwrap();
        let instance = square_instance("square");

        let (entry, invocations) = scripted_entry("Scripted", None, 4.0, false);
        let written = {
            let mut evaluator = evaluator_with_registry(dir.path(), HashMap::new());
            evaluator.evaluate(&entry, &instance).unwrap()
        };

        // A fresh evaluator over the same directory must return the stored
        // record without invoking the solver again.
        let mut evaluator = evaluator_with_registry(dir.path(), HashMap::new());
        let read = evaluator.evaluate(&entry, &instance).unwrap();
        assert_eq!(read, written);
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn infeasible_entries_are_never_invoked() {
        let dir = tempfile::tempdir().unwrap();
        let mut evaluator = evaluator_with_registry(dir.path(), HashMap::new());
        let (entry, invocations) = scripted_entry("Bounded", Some(3), 4.0, false);
        let instance = square_instance("square");

        let err = evaluator.evaluate(&entry, &instance).unwrap_err();
        assert!(matches!(err, HarnessError::Capability { .. }));
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn bound_equal_to_dimension_is_invoked() {
        let dir = tempfile::tempdir().unwrap();
        let mut evaluator = evaluator_with_registry(dir.path(), HashMap::new());
        let (entry, invocations) = scripted_entry("Bounded", Some(4), 4.0, false);
        let instance = square_instance("square");

        evaluator.evaluate(&entry, &instance).unwrap();
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn one_failing_algorithm_does_not_abort_the_others() {
        let dir = tempfile::tempdir().unwrap();
        let mut evaluator = evaluator_with_registry(dir.path(), HashMap::new());
        let (first, _) = scripted_entry("First", None, 4.0, false);
        let (second, _) = scripted_entry("Second", None, 4.0, true);
        let (third, _) = scripted_entry("Third", None, 5.0, false);
        let instance = square_instance("square");

        let summary = evaluator.compare_all(&[first, second, third], &instance);

        assert_eq!(summary.outcomes.len(), 3);
        assert!(matches!(
            summary.outcome("First"),
            Some(AlgorithmOutcome::Success { .. })
        ));
        assert!(matches!(
            summary.outcome("Second"),
            Some(AlgorithmOutcome::Failure { .. })
        ));
        assert!(matches!(
            summary.outcome("Third"),
            Some(AlgorithmOutcome::Success { .. })
        ));
    }

    #[test]
    fn summary_preserves_roster_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut evaluator = evaluator_with_registry(dir.path(), HashMap::new());
        let (a, _) = scripted_entry("Zebra", None, 4.0, false);
        let (b, _) = scripted_entry("Aardvark", None, 4.0, false);
        let instance = square_instance("square");

        let summary = evaluator.compare_all(&[a, b], &instance);
        let names: Vec<&str> = summary.outcomes.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["Zebra", "Aardvark"]);
    }

    #[test]
    fn approximation_ratio_against_registered_optimum() {
        let dir = tempfile::tempdir().unwrap();
        let registry = HashMap::from([("a280".to_string(), 2579.0)]);
        let mut evaluator = evaluator_with_registry(dir.path(), registry);
        let (entry, _) = scripted_entry("Scripted", None, 2700.0, false);
        let instance = square_instance("a280");

        let record = evaluator.evaluate(&entry, &instance).unwrap();
        assert_eq!(record.ground_truth, Some(2579.0));
        let ratio = record.approximation_ratio.unwrap();
        assert!((ratio - 2700.0 / 2579.0).abs() < 1e-9);
        assert!((ratio - 1.0469).abs() < 1e-3);
    }
}
