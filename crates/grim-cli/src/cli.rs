use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "grim",
    version,
    about = "Capacity-expansion planning for generation, storage and transmission"
)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build and solve the capacity-expansion LP, then write result tables
    Optimize {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// LP solver backend (clarabel, highs)
        #[arg(long)]
        solver: Option<String>,

        /// Solver thread count, passed through to the backend
        #[arg(long)]
        threads: Option<u32>,
    },
    /// Load inputs and assemble the model without solving
    Validate {
        #[command(flatten)]
        scenario: ScenarioArgs,
    },
    /// Compute the PTDF matrix of a transmission topology table
    Ptdf {
        /// Topology CSV (region1, region2, x, capacity, length)
        #[arg(long)]
        lines: PathBuf,

        /// Number of nodes (default: highest node id in the table + 1)
        #[arg(long)]
        nodes: Option<usize>,

        /// Output CSV (rows = lines, columns = nodes)
        #[arg(short, long)]
        out: PathBuf,
    },
}

/// Scenario selection shared by `optimize` and `validate`.
#[derive(clap::Args, Debug, Clone)]
pub struct ScenarioArgs {
    /// Scenario config file (default: ./grim.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Renewable share target in [0, 1]; output files are tagged with the
    /// truncated percentage (0.29 gives `28%`)
    #[arg(long)]
    pub omega: Option<f64>,

    /// Number of sampled hours
    #[arg(long)]
    pub hours: Option<usize>,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
