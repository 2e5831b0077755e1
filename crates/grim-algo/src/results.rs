//! Result extraction.
//!
//! Reads every variable family out of a solved model into dense arrays, then
//! reshapes the capacity decisions into the two output tables. Extraction is
//! a pure read: index order follows the model's sets exactly.

use crate::expansion::{CostCoefficients, CostTerms, VariableSet};
use crate::grid::{Grid2, Grid3};
use crate::params::ModelData;
use crate::solver::SolverOutcome;
use good_lp::Solution;
use grim_core::{node_range, CapacityTable, LineCapacityTable, LineId, RunSummary};
use tracing::{info, instrument};

/// Optimal values of every variable family, same shapes as [`VariableSet`].
#[derive(Debug, Clone)]
pub struct SolutionValues {
    pub capacity: Grid2<f64>,
    pub storage_energy: Grid2<f64>,
    pub dispatch: Grid3<f64>,
    pub loss_of_load: Grid2<f64>,
    pub discharge: Grid3<f64>,
    pub charge: Grid3<f64>,
    pub state_of_charge: Grid3<f64>,
    pub line_capacity: Vec<f64>,
    pub flow: Grid2<f64>,
    pub injection: Grid2<f64>,
}

impl SolutionValues {
    pub fn read(vars: &VariableSet, solution: &dyn Solution) -> Self {
        Self {
            capacity: vars.capacity.map(|v| solution.value(*v)),
            storage_energy: vars.storage_energy.map(|v| solution.value(*v)),
            dispatch: vars.dispatch.map(|v| solution.value(*v)),
            loss_of_load: vars.loss_of_load.map(|v| solution.value(*v)),
            discharge: vars.discharge.map(|v| solution.value(*v)),
            charge: vars.charge.map(|v| solution.value(*v)),
            state_of_charge: vars.state_of_charge.map(|v| solution.value(*v)),
            line_capacity: vars.line_capacity.iter().map(|v| solution.value(*v)).collect(),
            flow: vars.flow.map(|v| solution.value(*v)),
            injection: vars.injection.map(|v| solution.value(*v)),
        }
    }

    pub fn total_loss_of_load(&self) -> f64 {
        self.loss_of_load.iter().sum()
    }

    /// Renewable output over total output across the horizon; 0 without output.
    pub fn renewable_share(&self, data: &ModelData) -> f64 {
        let (n_gen, n_nodes, n_hours) = self.dispatch.dims();
        let mut renewable = 0.0;
        let mut total = 0.0;
        for g in 0..n_gen {
            let mut output = 0.0;
            for n in 0..n_nodes {
                for t in 0..n_hours {
                    output += self.dispatch[(g, n, t)];
                }
            }
            total += output;
            if data.generation[g].renewable {
                renewable += output;
            }
        }
        if total.abs() < f64::EPSILON {
            0.0
        } else {
            renewable / total
        }
    }
}

/// Everything a solved run produces.
#[derive(Debug, Clone)]
pub struct ExpansionResult {
    /// New capacity, technologies (G then SC) × nodes
    pub capacity: CapacityTable,
    /// New transmission capacity per line
    pub line_capacity: LineCapacityTable,
    pub costs: CostTerms<f64>,
    pub values: SolutionValues,
    pub summary: RunSummary,
}

#[instrument(skip_all, fields(solver = outcome.solver))]
pub fn extract(
    data: &ModelData,
    vars: &VariableSet,
    costs: &CostCoefficients,
    outcome: &SolverOutcome,
) -> ExpansionResult {
    let values = SolutionValues::read(vars, outcome.solution.as_ref());

    let capacity = CapacityTable {
        technologies: data.capacity_technologies(),
        nodes: node_range(data.n_nodes).collect(),
        values: values.capacity.to_rows(),
    };
    let line_capacity = LineCapacityTable {
        lines: (0..data.num_lines()).map(LineId::new).collect(),
        values: values.line_capacity.clone(),
    };

    let terms = costs.evaluate(&values);
    let summary = RunSummary {
        status: outcome.status.as_str().to_string(),
        solver: outcome.solver.to_string(),
        omega: data.params.omega,
        objective: terms.total(),
        cost_investment_generation: terms.investment_generation,
        cost_investment_storage: terms.investment_storage,
        cost_investment_transmission: terms.investment_transmission,
        cost_operation: terms.operation,
        cost_loss_of_load: terms.loss_of_load,
        total_loss_of_load: values.total_loss_of_load(),
        renewable_share: values.renewable_share(data),
        solve_time_ms: outcome.elapsed.as_millis() as u64,
    };

    info!(
        objective = summary.objective,
        loss_of_load = summary.total_loss_of_load,
        renewable_share = summary.renewable_share,
        "results extracted"
    );

    ExpansionResult {
        capacity,
        line_capacity,
        costs: terms,
        values,
        summary,
    }
}
