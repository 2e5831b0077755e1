//! # grim-algo: network sensitivities and the capacity-expansion LP
//!
//! Pipeline, leaves first:
//!
//! 1. [`sensitivity`]: PTDF from the line list (reduced nodal susceptance, slack node 0)
//! 2. [`params`]: technoeconomic, existing-capacity, land-area and time-series
//!    tables joined into [`params::ModelData`]
//! 3. [`expansion`]: variables, objective and constraints of the LP
//! 4. [`solver`]: backend selection (`clarabel`, `highs`) and status mapping
//! 5. [`results`]: solved values reshaped into output tables and a run summary
//!
//! [`run_capacity_expansion`] chains all five.
//!
//! ## Example
//!
//! ```no_run
//! use grim_algo::{run_capacity_expansion, ModelParameters, SolverOptions, TechnologySets};
//! use grim_core::InputTables;
//!
//! let tables = InputTables::default(); // Load with grim-io
//! let result = run_capacity_expansion(
//!     &tables,
//!     &TechnologySets::default(),
//!     &ModelParameters::default(),
//!     &SolverOptions::default(),
//! )?;
//! println!("objective = {}", result.summary.objective);
//! # Ok::<(), grim_algo::ExpansionError>(())
//! ```

pub mod expansion;
pub mod grid;
pub mod params;
pub mod pipeline;
pub mod results;
pub mod sensitivity;
pub mod solver;
pub mod test_utils;

pub use expansion::{build_model, CapacityModel, ConstraintFamily, CostTerms};
pub use params::{assemble, AssemblyError, ModelData, ModelParameters, TechnologySets};
pub use pipeline::{prepare, run_capacity_expansion, BuildError, ExpansionError, PreparedModel};
pub use results::{extract, ExpansionResult, SolutionValues};
pub use sensitivity::{compute_ptdf, PtdfMatrix, SensitivityError};
pub use solver::{solve, LpBackend, LpProblem, LpSolverKind, SolveError, SolveStatus, SolverOptions};
