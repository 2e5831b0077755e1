//! Scenario configuration.
//!
//! A TOML file with a single `[optimization]` table. Every key is optional;
//! partial configs fill the rest from defaults.
//!
//! ```toml
//! [optimization]
//! num_rows_cost_params = 1000
//!
//! [optimization.sets]
//! nodes = 32
//! generation = ["onshore", "solar", "biomass", "gas"]
//! storage = ["battery", "hydrogen"]
//! renewable = ["onshore", "solar", "biomass"]
//!
//! [optimization.params]
//! hours = 24
//! omega = 0.8
//!
//! [optimization.solver]
//! name = "clarabel"
//!
//! [optimization.paths]
//! root = "experiment"
//! ```

use crate::cli::ScenarioArgs;
use anyhow::{Context, Result};
use grim_algo::{ModelParameters, SolverOptions, TechnologySets};
use grim_core::GrimError;
use grim_io::{ExperimentPaths, PathOverrides, RequiredTables};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG: &str = "grim.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub optimization: OptimizationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    /// Cost multiplier; overrides `params.cost_multiplier` when set
    pub num_rows_cost_params: Option<f64>,
    pub sets: TechnologySets,
    pub params: ModelParameters,
    pub solver: SolverOptions,
    pub paths: PathOverrides,
}

/// A parsed config plus the directory its relative paths resolve against.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub config: ScenarioConfig,
    pub base_dir: PathBuf,
}

impl ScenarioConfig {
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| GrimError::Config(format!("invalid scenario TOML: {}", e)))
            .context("parsing scenario TOML")
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(GrimError::from)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("in {}", path.display()))
    }

    /// Scalar parameters with the top-level cost multiplier applied.
    pub fn model_parameters(&self) -> ModelParameters {
        let mut params = self.optimization.params.clone();
        if let Some(multiplier) = self.optimization.num_rows_cost_params {
            params.cost_multiplier = multiplier;
        }
        params
    }
}

impl Scenario {
    /// Load the scenario named on the command line, or `./grim.toml`, or
    /// defaults rooted at the working directory.
    pub fn load(args: &ScenarioArgs) -> Result<Self> {
        let (config, base_dir) = match &args.config {
            Some(path) => (ScenarioConfig::load_from(path)?, parent_dir(path)),
            None => {
                let default = Path::new(DEFAULT_CONFIG);
                if default.is_file() {
                    (ScenarioConfig::load_from(default)?, PathBuf::from("."))
                } else {
                    tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG);
                    (ScenarioConfig::default(), PathBuf::from("."))
                }
            }
        };
        let mut scenario = Self { config, base_dir };
        scenario.apply_overrides(args.omega, args.hours)?;
        Ok(scenario)
    }

    pub fn apply_overrides(&mut self, omega: Option<f64>, hours: Option<usize>) -> Result<()> {
        let params = &mut self.config.optimization.params;
        if let Some(omega) = omega {
            if !(0.0..=1.0).contains(&omega) {
                return Err(GrimError::Config(format!(
                    "--omega must be in [0, 1], got {}",
                    omega
                ))
                .into());
            }
            params.omega = omega;
        }
        if let Some(hours) = hours {
            params.hours = hours;
        }
        Ok(())
    }

    pub fn apply_solver_overrides(&mut self, solver: Option<&str>, threads: Option<u32>) {
        let options = &mut self.config.optimization.solver;
        if let Some(name) = solver {
            options.name = name.to_string();
        }
        if threads.is_some() {
            options.threads = threads;
        }
    }

    pub fn sets(&self) -> &TechnologySets {
        &self.config.optimization.sets
    }

    pub fn params(&self) -> ModelParameters {
        self.config.model_parameters()
    }

    pub fn solver(&self) -> &SolverOptions {
        &self.config.optimization.solver
    }

    pub fn paths(&self) -> ExperimentPaths {
        ExperimentPaths::resolve(&self.base_dir, &self.config.optimization.paths)
    }

    pub fn required_tables(&self) -> RequiredTables {
        RequiredTables {
            wind: self.sets().has_wind(),
            solar: self.sets().has_solar(),
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
