//! Dimension-gated run selection over a collection of instances.
//!
//! For each named instance the selector peeks at the declared dimension from
//! the file header alone, filters the roster to algorithms whose feasibility
//! bound accommodates it, and only then pays for a full coordinate parse.
//! Instances with no qualifying algorithm are skipped with a visible notice,
//! and a failure while loading or selecting for one instance never prevents
//! processing of the ones after it.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::algorithms::RosterEntry;
use crate::error::HarnessError;
use crate::evaluator::{ComparisonSummary, Evaluator};
use crate::instance::TspInstance;
use crate::store::{self, ResultStore};

/// Configuration of one harness run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory holding `<name>.tsp` instance files.
    pub dataset_dir: PathBuf,
    /// Directory for result artifacts.
    pub results_dir: PathBuf,
    /// Instance names to process, in order.
    pub instances: Vec<String>,
}

impl RunConfig {
    pub fn new(dataset_dir: PathBuf, results_dir: PathBuf, instances: Vec<String>) -> Self {
        RunConfig {
            dataset_dir,
            results_dir,
            instances,
        }
    }
}

/// The standard instance collection.
pub fn default_instances() -> Vec<String> {
    ["a280", "xql662", "kz9976", "mona-lisa100K"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Top-level driver: selects feasible algorithms per instance and hands the
/// rest to the evaluator.
pub struct RunSelector {
    config: RunConfig,
    evaluator: Evaluator,
}

impl RunSelector {
    /// Create a selector with the default known-optima registry.
    pub fn new(config: RunConfig) -> Result<Self, HarnessError> {
        Self::with_ground_truth(config, store::known_optima())
    }

    /// Create a selector with an explicit known-optima registry.
    pub fn with_ground_truth(
        config: RunConfig,
        ground_truth: HashMap<String, f64>,
    ) -> Result<Self, HarnessError> {
        let store = ResultStore::new(&config.results_dir, ground_truth)?;
        Ok(RunSelector {
            config,
            evaluator: Evaluator::new(store),
        })
    }

    /// Process every configured instance, each inside its own failure
    /// boundary, and return the summaries of those that were evaluated.
    pub fn run(&mut self, roster: &[RosterEntry]) -> Vec<ComparisonSummary> {
        let names = self.config.instances.clone();
        let mut summaries = Vec::new();

        for name in &names {
            match self.process_instance(roster, name) {
                Ok(Some(summary)) => summaries.push(summary),
                Ok(None) => {}
                Err(err) => {
                    log::error!("error processing {}: {}", name, err);
                }
            }
        }

        summaries
    }

    fn process_instance(
        &mut self,
        roster: &[RosterEntry],
        name: &str,
    ) -> Result<Option<ComparisonSummary>, HarnessError> {
        let path = self.config.dataset_dir.join(format!("{name}.tsp"));
        if !path.exists() {
            log::warn!("skipping {}: file not found at {}", name, path.display());
            return Ok(None);
        }

        log::info!("processing instance {}", name);
        let dimension = TspInstance::peek_dimension(&path)?;
        log::info!("instance dimension: {}", dimension);

        let feasible: Vec<&RosterEntry> =
            roster.iter().filter(|e| e.can_handle(dimension)).collect();

        if feasible.is_empty() {
            log::warn!(
                "skipping {}: no algorithm can handle dimension {}",
                name,
                dimension
            );
            return Ok(None);
        }

        // Coordinates are only parsed once at least one algorithm qualifies.
        let instance = TspInstance::from_file(&path)?;
        Ok(Some(self.evaluator.compare_all(feasible, &instance)))
    }

    pub fn store(&self) -> &ResultStore {
        self.evaluator.store()
    }

    /// Export a flat CSV summary of everything evaluated in this run.
    pub fn export_summary_csv(&self, path: &std::path::Path) -> Result<(), HarnessError> {
        self.evaluator.store().export_csv(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::algorithms::Greedy;
    use crate::evaluator::AlgorithmOutcome;

    fn write_instance(dir: &std::path::Path, name: &str, coords: &[(f64, f64)]) {
        write_instance_with_dimension(dir, name, coords.len(), coords);
    }

    fn write_instance_with_dimension(
        dir: &std::path::Path,
        name: &str,
        dimension: usize,
        coords: &[(f64, f64)],
    ) {
        let mut text = format!("NAME : {name}\nDIMENSION : {dimension}\nNODE_COORD_SECTION\n");
        for (i, (x, y)) in coords.iter().enumerate() {
            text.push_str(&format!("{} {} {}\n", i + 1, x, y));
        }
        text.push_str("EOF\n");
        fs::write(dir.join(format!("{name}.tsp")), text).unwrap();
    }

    fn square_coords() -> Vec<(f64, f64)> {
        vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
    }

    fn test_roster(bound: Option<usize>) -> Vec<RosterEntry> {
        vec![RosterEntry::new("Greedy", bound, || {
            Box::new(Greedy::new())
        })]
    }

    fn config(datasets: &std::path::Path, results: &std::path::Path, names: &[&str]) -> RunConfig {
        RunConfig::new(
            datasets.to_path_buf(),
            results.to_path_buf(),
            names.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn evaluates_feasible_instances() {
        let datasets = tempfile::tempdir().unwrap();
        let results = tempfile::tempdir().unwrap();
        write_instance(datasets.path(), "square", &square_coords());

        let mut selector = RunSelector::with_ground_truth(
            config(datasets.path(), results.path(), &["square"]),
            HashMap::new(),
        )
        .unwrap();
        let summaries = selector.run(&test_roster(None));

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].instance, "square");
        assert!(matches!(
            summaries[0].outcome("Greedy"),
            Some(AlgorithmOutcome::Success { .. })
        ));
        assert!(results.path().join("Greedy_square.json").exists());
    }

    #[test]
    fn missing_files_are_skipped() {
        let datasets = tempfile::tempdir().unwrap();
        let results = tempfile::tempdir().unwrap();

        let mut selector = RunSelector::with_ground_truth(
            config(datasets.path(), results.path(), &["ghost"]),
            HashMap::new(),
        )
        .unwrap();
        let summaries = selector.run(&test_roster(None));
        assert!(summaries.is_empty());
    }

    #[test]
    fn instances_beyond_every_bound_are_skipped_without_loading() {
        let datasets = tempfile::tempdir().unwrap();
        let results = tempfile::tempdir().unwrap();
        write_instance(datasets.path(), "square", &square_coords());

        let mut selector = RunSelector::with_ground_truth(
            config(datasets.path(), results.path(), &["square"]),
            HashMap::new(),
        )
        .unwrap();
        let summaries = selector.run(&test_roster(Some(3)));
        assert!(summaries.is_empty());
    }

    #[test]
    fn a_broken_instance_does_not_stop_the_run() {
        let datasets = tempfile::tempdir().unwrap();
        let results = tempfile::tempdir().unwrap();
        // Header declares more coordinates than the section provides.
        write_instance_with_dimension(datasets.path(), "broken", 9, &square_coords());
        write_instance(datasets.path(), "square", &square_coords());

        let mut selector = RunSelector::with_ground_truth(
            config(datasets.path(), results.path(), &["broken", "square"]),
            HashMap::new(),
        )
        .unwrap();
        let summaries = selector.run(&test_roster(None));

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].instance, "square");
    }

    #[test]
    fn rerunning_reuses_stored_results() {
        let datasets = tempfile::tempdir().unwrap();
        let results = tempfile::tempdir().unwrap();
        write_instance(datasets.path(), "square", &square_coords());

        let cfg = config(datasets.path(), results.path(), &["square"]);
        let artifact = results.path().join("Greedy_square.json");

        {
            let mut selector =
                RunSelector::with_ground_truth(cfg.clone(), HashMap::new()).unwrap();
            selector.run(&test_roster(None));
        }
        let first = fs::read_to_string(&artifact).unwrap();

        // A second run must return the stored artifact untouched; a
        // recomputation would rewrite it with a fresh timestamp.
        let mut selector = RunSelector::with_ground_truth(cfg, HashMap::new()).unwrap();
        let summaries = selector.run(&test_roster(None));
        assert_eq!(summaries.len(), 1);
        let second = fs::read_to_string(&artifact).unwrap();
        assert_eq!(first, second);
    }
}
