//! TSP Evaluation Harness - Command Line Interface

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use tsp_harness::algorithms::{
    default_roster, BruteForce, ConvexHull, Greedy, HeldKarp, MstApproximation, RosterEntry,
    TspSolver,
};
use tsp_harness::instance::TspInstance;
use tsp_harness::perf;
use tsp_harness::runner::{default_instances, RunConfig, RunSelector};

#[derive(Parser)]
#[command(name = "tsp-harness")]
#[command(version = "1.0")]
#[command(about = "Evaluate TSP construction and approximation algorithms against named instances")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the full roster against a collection of instances
    Run {
        /// Directory containing <name>.tsp instance files
        #[arg(short, long, default_value = "datasets")]
        datasets: PathBuf,

        /// Output directory for result artifacts
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Instance names to process (defaults to the standard collection)
        #[arg(short, long)]
        instances: Vec<String>,

        /// Also write a flat CSV summary to this path
        #[arg(long)]
        summary_csv: Option<PathBuf>,
    },

    /// Run a single algorithm on a single instance, without persistence
    Solve {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Algorithm to use
        #[arg(short, long, value_enum, default_value = "greedy")]
        algorithm: Algorithm,

        /// Write the tour and cost as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print statistics about an instance
    Analyze {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Algorithm {
    /// Exhaustive permutation search (exact, factorial time)
    BruteForce,
    /// Held-Karp dynamic programming (exact, exponential memory)
    HeldKarp,
    /// Nearest-neighbour construction
    Greedy,
    /// MST-based 2-approximation
    Mst,
    /// Convex-hull-based construction
    ConvexHull,
}

impl Algorithm {
    fn roster_entry(self) -> RosterEntry {
        match self {
            Algorithm::BruteForce => {
                RosterEntry::new("BruteForce", Some(12), || Box::new(BruteForce::new()))
            }
            Algorithm::HeldKarp => {
                RosterEntry::new("HeldKarp", Some(20), || Box::new(HeldKarp::new()))
            }
            Algorithm::Greedy => {
                RosterEntry::new("Greedy", Some(90_000), || Box::new(Greedy::new()))
            }
            Algorithm::Mst => RosterEntry::new("MSTApproximation", Some(90_000), || {
                Box::new(MstApproximation::new())
            }),
            Algorithm::ConvexHull => {
                RosterEntry::new("ConvexHull", Some(90_000), || Box::new(ConvexHull::new()))
            }
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            datasets,
            output,
            instances,
            summary_csv,
        } => run(datasets, output, instances, summary_csv),
        Commands::Solve {
            instance,
            algorithm,
            output,
        } => solve(&instance, algorithm, output),
        Commands::Analyze { instance } => analyze(&instance),
    }
}

fn run(
    datasets: PathBuf,
    output: PathBuf,
    instances: Vec<String>,
    summary_csv: Option<PathBuf>,
) {
    let instances = if instances.is_empty() {
        default_instances()
    } else {
        instances
    };

    let config = RunConfig::new(datasets, output, instances);
    let mut selector = match RunSelector::new(config) {
        Ok(selector) => selector,
        Err(e) => {
            eprintln!("Error opening result store: {}", e);
            std::process::exit(1);
        }
    };

    let roster = default_roster();
    let summaries = selector.run(&roster);

    for summary in &summaries {
        println!("\n{}", summary);
    }

    if let Some(path) = summary_csv {
        match selector.export_summary_csv(&path) {
            Ok(()) => println!("Summary exported to {:?}", path),
            Err(e) => eprintln!("Failed to export summary: {}", e),
        }
    }

    println!(
        "\nAll results have been saved to {:?}",
        selector.store().dir()
    );
}

fn solve(path: &PathBuf, algorithm: Algorithm, output: Option<PathBuf>) {
    let instance = match TspInstance::from_file(path) {
        Ok(instance) => instance,
        Err(e) => {
            eprintln!("Error loading instance: {}", e);
            std::process::exit(1);
        }
    };

    let entry = algorithm.roster_entry();
    if let Err(e) = entry.check_dimension(instance.dimension) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    println!(
        "Solving {} (n={}) with {}...",
        instance.name,
        instance.dimension,
        entry.name()
    );

    let matrix = instance.distance_matrix();
    let mut solver = entry.build();
    let measured = perf::measure(|| solver.solve(&matrix));
    if let Err(e) = measured.value {
        eprintln!("Solver failed: {}", e);
        std::process::exit(1);
    }

    let tour = solver.tour().expect("solved").to_vec();
    let cost = solver.cost().expect("solved");

    println!("\n========== Results ==========");
    println!("Algorithm: {}", entry.name());
    println!("Tour cost: {:.2}", cost);
    println!("Runtime: {:.4}s (CPU)", measured.runtime_seconds);
    println!(
        "Memory delta: {:.2} KB",
        measured.memory_delta_bytes as f64 / 1024.0
    );

    if let Some(out_path) = output {
        let payload = serde_json::json!({
            "algorithm": entry.name(),
            "instance": instance.name,
            "tour": tour,
            "tour_cost": cost,
        });
        match std::fs::write(&out_path, serde_json::to_string_pretty(&payload).unwrap()) {
            Ok(()) => println!("\nSolution saved to {:?}", out_path),
            Err(e) => eprintln!("Failed to write output: {}", e),
        }
    }
}

fn analyze(path: &PathBuf) {
    let instance = match TspInstance::from_file(path) {
        Ok(instance) => instance,
        Err(e) => {
            eprintln!("Error loading instance: {}", e);
            std::process::exit(1);
        }
    };

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics());

    let roster = default_roster();
    let feasible: Vec<&str> = roster
        .iter()
        .filter(|e| e.can_handle(instance.dimension))
        .map(|e| e.name())
        .collect();
    println!("Feasible algorithms: {}", feasible.join(", "));
}
