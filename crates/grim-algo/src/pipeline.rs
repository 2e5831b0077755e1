//! End-to-end capacity-expansion run: assemble, PTDF, build, solve, extract.

use crate::expansion::build_model;
use crate::params::{assemble, AssemblyError, ModelData, ModelParameters, TechnologySets};
use crate::results::{extract, ExpansionResult};
use crate::sensitivity::{compute_ptdf, PtdfMatrix, SensitivityError};
use crate::solver::{solve, SolveError, SolverOptions};
use grim_core::InputTables;
use thiserror::Error;
use tracing::{info, instrument};

/// "Could not build model" causes.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Topology(#[from] SensitivityError),

    /// Solver selection that no compiled backend accepts
    #[error(transparent)]
    Solver(SolveError),
}

/// Failure of a run, split by the stage an operator has to look at.
#[derive(Debug, Error)]
pub enum ExpansionError {
    #[error("could not build model: {0}")]
    Build(#[from] BuildError),

    #[error("optimization failed: {0}")]
    Solve(#[from] SolveError),

    #[error("could not write results: {0}")]
    Output(String),
}

impl ExpansionError {
    pub fn is_build_error(&self) -> bool {
        matches!(self, ExpansionError::Build(_))
    }

    pub fn is_solve_error(&self) -> bool {
        matches!(self, ExpansionError::Solve(_))
    }
}

impl From<AssemblyError> for ExpansionError {
    fn from(err: AssemblyError) -> Self {
        ExpansionError::Build(err.into())
    }
}

impl From<SensitivityError> for ExpansionError {
    fn from(err: SensitivityError) -> Self {
        ExpansionError::Build(err.into())
    }
}

/// Assembled parameters and network sensitivities, ready for model building.
#[derive(Debug, Clone)]
pub struct PreparedModel {
    pub data: ModelData,
    pub ptdf: PtdfMatrix,
}

/// Run every step up to (not including) model building.
#[instrument(skip_all)]
pub fn prepare(
    tables: &InputTables,
    sets: &TechnologySets,
    params: &ModelParameters,
) -> Result<PreparedModel, BuildError> {
    let data = assemble(tables, sets, params)?;
    let ptdf = compute_ptdf(&data.lines, data.n_nodes)?;
    Ok(PreparedModel { data, ptdf })
}

/// Build, solve and extract one capacity-expansion model.
#[instrument(skip_all, fields(omega = params.omega, solver = %options.name))]
pub fn run_capacity_expansion(
    tables: &InputTables,
    sets: &TechnologySets,
    params: &ModelParameters,
    options: &SolverOptions,
) -> Result<ExpansionResult, ExpansionError> {
    options.kind().map_err(BuildError::Solver)?;
    let PreparedModel { data, ptdf } = prepare(tables, sets, params)?;

    let model = build_model(&data, &ptdf);
    let (problem, variables, costs) = model.into_parts();

    let outcome = solve(problem, options)?;
    let result = extract(&data, &variables, &costs, &outcome);

    info!(
        objective = result.summary.objective,
        solve_time_ms = result.summary.solve_time_ms,
        "capacity expansion complete"
    );
    Ok(result)
}
