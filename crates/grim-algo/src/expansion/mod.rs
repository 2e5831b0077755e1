//! Capacity-expansion LP builder
//!
//! Declares the decision variables, the additive objective and every
//! constraint family over the assembled parameters and the network PTDF.
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐
//! │  ModelData   │   │  PtdfMatrix  │
//! └──────┬───────┘   └──────┬───────┘
//!        └────────┬─────────┘
//!                 ▼
//!         build_model()  ──►  CapacityModel { LpProblem, VariableSet, CostCoefficients }
//!                                   │
//!                                   ▼
//!                           solver::solve()  ──►  results::extract()
//! ```
//!
//! The builder is purely declarative: it performs no numerical work beyond
//! computing coefficients and never fails on assembled inputs.

mod constraints;
mod objective;
mod variables;

pub use constraints::ConstraintFamily;
pub use objective::{CostCoefficients, CostTerms};
pub use variables::VariableSet;

use crate::params::ModelData;
use crate::sensitivity::PtdfMatrix;
use crate::solver::LpProblem;
use good_lp::ProblemVariables;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// A built, unsolved expansion model.
pub struct CapacityModel {
    problem: LpProblem,
    variables: VariableSet,
    costs: CostCoefficients,
    families: BTreeMap<ConstraintFamily, usize>,
}

impl CapacityModel {
    pub fn variables(&self) -> &VariableSet {
        &self.variables
    }

    pub fn costs(&self) -> &CostCoefficients {
        &self.costs
    }

    pub fn num_variables(&self) -> usize {
        self.variables.count()
    }

    pub fn num_constraints(&self) -> usize {
        self.problem.num_constraints()
    }

    /// Number of constraints in one family; zero if the family is empty.
    pub fn family_count(&self, family: ConstraintFamily) -> usize {
        self.families.get(&family).copied().unwrap_or(0)
    }

    pub fn family_counts(&self) -> &BTreeMap<ConstraintFamily, usize> {
        &self.families
    }

    /// Split into the solver input and the handles needed to read the solution.
    pub fn into_parts(self) -> (LpProblem, VariableSet, CostCoefficients) {
        (self.problem, self.variables, self.costs)
    }
}

/// Build the expansion LP. `ptdf` must be computed over `data.lines` and
/// `data.n_nodes`.
#[instrument(skip_all, fields(nodes = data.n_nodes, hours = data.n_hours))]
pub fn build_model(data: &ModelData, ptdf: &PtdfMatrix) -> CapacityModel {
    debug_assert_eq!(ptdf.num_lines(), data.num_lines());
    debug_assert_eq!(ptdf.num_nodes(), data.n_nodes);

    let mut vars = ProblemVariables::new();
    let variables = VariableSet::declare(&mut vars, data);
    let costs = CostCoefficients::new(data);
    let objective = costs.expressions(&variables).total();
    let set = constraints::build_constraints(data, ptdf, &variables);

    for (family, count) in &set.counts {
        debug!(family = family.as_str(), count, "constraint family");
    }
    info!(
        variables = variables.count(),
        constraints = set.constraints.len(),
        "model built"
    );

    CapacityModel {
        problem: LpProblem {
            variables: vars,
            objective,
            constraints: set.constraints,
        },
        variables,
        costs,
        families: set.counts,
    }
}
