//! erdbeermet command-line interface.
//!
//! `simulate` draws a random history and writes it to a file;
//! `recognize` replays a history file and runs the recognition search on
//! the resulting matrix.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use erdbeermet::config::NEWICK_PRECISION;
use erdbeermet::io::{load_scenario, save_report, write_history};
use erdbeermet::recognition::{RecognitionConfig, Recognizer};
use erdbeermet::simulation::{simulate, SimulationConfig};

/// Type-R distance matrix simulation and recognition.
#[derive(Parser, Debug)]
#[command(name = "erdbeermet", version, propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Draw a random duplication/recombination history.
    Simulate {
        /// Number of items.
        #[arg(short = 'n', long, default_value_t = 8)]
        items: usize,

        /// Probability of a pure duplication event.
        #[arg(long, default_value_t = 0.0)]
        branching_prob: f64,

        /// Only recombine circular neighbours.
        #[arg(long, default_value_t = false)]
        circular: bool,

        /// Share one increment between all items per event.
        #[arg(long, default_value_t = false)]
        clocklike: bool,

        /// Random seed.
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Output history file.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Recognise the matrix generated by a history file.
    Recognize {
        /// History file.
        history: PathBuf,

        /// Replay only the first N items.
        #[arg(long)]
        stop_after: Option<usize>,

        /// Keep only the first valid reduction per node above five items.
        #[arg(long, default_value_t = false)]
        first_candidate_only: bool,

        /// Score candidates on a single thread.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Write the full recognition report to this file.
        #[arg(long)]
        report: Option<PathBuf>,

        /// Omit matrices from the report.
        #[arg(long, default_value_t = false)]
        no_matrices: bool,

        /// Print the recognition tree in Newick format.
        #[arg(long, default_value_t = false)]
        newick: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("erdbeermet v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Simulate {
            items,
            branching_prob,
            circular,
            clocklike,
            seed,
            output,
        } => {
            let config = SimulationConfig::default()
                .with_branching_prob(branching_prob)
                .with_circular(circular)
                .with_clocklike(clocklike);
            let scenario = simulate(items, &config, seed)?;
            write_history(&output, scenario.history())?;
            tracing::info!(
                "Simulated {} items ({} events), circular={}",
                scenario.item_count(),
                scenario.history().len(),
                scenario.is_circular(),
            );
            if let Some(order) = scenario.circular_order() {
                tracing::info!("Circular order: {:?}", order);
            }
            tracing::info!("History written to {}", output.display());
        }
        Commands::Recognize {
            history,
            stop_after,
            first_candidate_only,
            sequential,
            report,
            no_matrices,
            newick,
        } => {
            let scenario = load_scenario(&history, stop_after)?;
            let config = RecognitionConfig::default()
                .with_first_candidate_only(first_candidate_only)
                .with_parallel(!sequential);
            let tree = Recognizer::new(config).recognize(scenario.distances())?;

            tracing::info!(
                "Recognition on {} items: {} nodes, {} successful reduction paths",
                scenario.item_count(),
                tree.len(),
                tree.total_successes(),
            );
            if tree.is_recognized() {
                tracing::info!("Matrix is type R");
            } else {
                let root = tree.node(tree.root());
                tracing::warn!(
                    "Matrix is not type R ({})",
                    root.failure_reason()
                        .map_or("no successful branch", |reason| reason.as_str()),
                );
            }

            if let Some(path) = report {
                save_report(&path, &tree, !no_matrices)?;
                tracing::info!("Report written to {}", path.display());
            }
            if newick {
                println!("{}", tree.to_newick(NEWICK_PRECISION));
            }
        }
    }

    Ok(())
}
