//! Command-line interface for the TEMPO simulator
//!
//! Integrates the assay scenarios of a configuration and prints a summary of the
//! fluorescent signal for each of them.
//!
//! # Usage
//!
//! ```bash
//! # Run the three reference scenarios with default settings
//! tempo run
//!
//! # Run the scenarios of a configuration file and store the F series
//! tempo run --config assay.json --output series.json
//!
//! # List the species in state-vector order
//! tempo species
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use log::info;
use tempo_sim::{
    io::{load_config, save_series, SimulationConfig},
    report::{Reporter, Status, TimeUnit},
    simulation::{
        runner::{BatchResult, Simulator},
        scenario::ScenarioSet,
    },
    species::Species,
};

/// Main CLI configuration struct
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Integrate the scenarios of a configuration
    Run {
        /// Path to a JSON configuration, defaults to the reference assay
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// End time of the integration in seconds
        #[arg(long)]
        t_end: Option<f64>,

        /// Number of output samples including both ends
        #[arg(long)]
        points: Option<usize>,

        /// Relative tolerance of the stepper
        #[arg(long)]
        rtol: Option<f64>,

        /// Absolute tolerance of the stepper
        #[arg(long)]
        atol: Option<f64>,

        /// Integrate scenarios one after another
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Report time in seconds instead of minutes
        #[arg(long, default_value_t = false)]
        seconds: bool,

        /// Path to save the F series of every completed scenario to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the species in state-vector order
    Species,
}

/// Main entry point for the CLI application
pub fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            t_end,
            points,
            rtol,
            atol,
            sequential,
            seconds,
            output,
        } => {
            let mut config = match config {
                Some(path) => load_config(path).expect("Failed to load configuration"),
                None => SimulationConfig::default(),
            };

            if let Some(t_end) = t_end {
                config.setup.t1 = t_end;
            }
            if let Some(points) = points {
                config.setup.n_points = points;
            }
            if let Some(rtol) = rtol {
                config.setup.rtol = rtol;
            }
            if let Some(atol) = atol {
                config.setup.atol = atol;
            }

            let simulator = config.simulator();
            info!("Running {} scenarios", config.scenarios.len());

            let results = run_batch(&simulator, &config.scenarios, sequential);

            let time_unit = if seconds {
                TimeUnit::Seconds
            } else {
                TimeUnit::Minutes
            };
            let reporter = Reporter::new(Species::F, time_unit);
            let summary = reporter.summarize(&results);

            println!("{summary}");
            for row in &summary.rows {
                let status = match row.status {
                    Status::Completed => row.status.to_string().bold().green(),
                    Status::Invalid => row.status.to_string().bold().yellow(),
                    Status::Failed => row.status.to_string().bold().red(),
                };
                match &row.message {
                    Some(message) => println!("{} [{}] {}", row.scenario.bold(), status, message),
                    None => println!("{} [{}]", row.scenario.bold(), status),
                }
            }

            if let Some(path) = output {
                let series = reporter.collect(&results);
                save_series(&path, &series).expect("Failed to write series");
                info!("Wrote {} series to {}", series.len(), path.display());
            }

            if summary.completed() < summary.rows.len() {
                std::process::exit(1);
            }
        }
        Commands::Species => {
            for species in Species::ALL {
                println!("{:>2}  {}", species.index(), species.name());
            }
        }
    }
}

#[cfg(feature = "parallel")]
fn run_batch(simulator: &Simulator, scenarios: &ScenarioSet, sequential: bool) -> BatchResult {
    if sequential {
        simulator.simulate_batch(scenarios)
    } else {
        simulator.par_simulate_batch(scenarios)
    }
}

#[cfg(not(feature = "parallel"))]
fn run_batch(simulator: &Simulator, scenarios: &ScenarioSet, _sequential: bool) -> BatchResult {
    simulator.simulate_batch(scenarios)
}
