#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use scanpath_rust::simulation::{
    decision::{evaluate, train, DecisionAgent},
    heuristic::evaluate_batch,
    layout::Expertise,
    search::{exhaustive_search, run_search, SearchOutcome, SearchQuery},
    SimulationConfig, Surface,
};

#[derive(Parser, Debug)]
#[command(name = "scanpath", about = "Simulate eye movements on graphical layouts")]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a guided search and print its scanpath.
    Search {
        /// Element to start from.
        #[arg(long)]
        start: Option<String>,
        /// Element to look for; searches everything when omitted.
        #[arg(long)]
        target: Option<String>,
        /// Color to guide the search towards.
        #[arg(long)]
        top_down: Option<String>,
        /// Move the eye to every candidate.
        #[arg(long)]
        force_fixation: bool,
        /// Learn every position and color with this memory strength first.
        #[arg(long)]
        expertise: Option<f64>,
        /// Nearest-first search instead of saliency-guided search.
        #[arg(long)]
        exhaustive: bool,
    },
    /// Evaluate the heuristic decision maker on random layouts.
    Decide {
        #[arg(long, default_value_t = 1000)]
        trials: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Train the decision agent and report its greedy performance.
    Train {
        #[arg(long, default_value_t = 100_000)]
        episodes: usize,
        /// Greedy evaluation episodes after training.
        #[arg(long, default_value_t = 1000)]
        evaluate: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    let mut surface = config.layout.build_surface()?;
    info!(elements = surface.len(), "layout ready");

    match cli.command {
        Command::Search {
            start,
            target,
            top_down,
            force_fixation,
            expertise,
            exhaustive,
        } => {
            if let Some(strength) = expertise {
                surface.learn_all(Expertise::Strength(strength));
            }
            let start = start.map(|name| surface.id(&name)).transpose()?;
            let target = target.map(|name| surface.id(&name)).transpose()?;
            let outcome = if exhaustive {
                exhaustive_search(&surface, start, target)?
            } else {
                let query = SearchQuery {
                    start,
                    target,
                    top_down,
                    force_fixation,
                };
                run_search(&surface, &query)?
            };
            print_search(&surface, &outcome);
        }
        Command::Decide { trials, seed } => {
            let summary = evaluate_batch(&surface, &config.heuristic, trials, seed)?;
            println!(
                "trials: {}  accuracy: {:.3}  mean time: {:.3}s  mean fixations: {:.2}",
                summary.trials, summary.accuracy, summary.mean_time, summary.mean_fixations
            );
        }
        Command::Train {
            episodes,
            evaluate: evaluation_episodes,
        } => {
            let mut agent = DecisionAgent::new(surface, config.agent)?;
            let report = train(&mut agent, episodes)?;
            println!(
                "trained {} episodes: mean reward {:.2}, {} stuck, {} states",
                report.episodes,
                report.mean_reward,
                report.stuck,
                agent.q_table().len()
            );
            let eval = evaluate(&mut agent, evaluation_episodes)?;
            println!(
                "greedy: accuracy {:.3}  mean time {:.3}s  mean fixations {:.2}  stuck {}",
                eval.accuracy, eval.mean_task_time, eval.mean_fixations, eval.stuck
            );
        }
    }

    Ok(())
}

fn print_search(surface: &Surface, outcome: &SearchOutcome) {
    println!("total time: {:.3}s", outcome.total_time);
    println!("scanpath: {}", surface.names(&outcome.scanpath).join(" -> "));
    println!("searched: {}", surface.names(&outcome.searched).join(", "));
    println!("found: {}", outcome.found);
}
