pub mod cli;
pub mod config;

pub use cli::{build_cli_command, Cli, Commands, ScenarioArgs};
pub use config::{OptimizationConfig, Scenario, ScenarioConfig};
