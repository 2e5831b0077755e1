//! Solver driver: backend selection, option pass-through and status mapping.
//!
//! The model builder hands over an [`LpProblem`] (variables, objective,
//! constraints). A backend turns it into a `good_lp` model for one concrete
//! solver, applies only the options that were explicitly configured, and
//! blocks until the solver returns.

use good_lp::{
    Constraint, Expression, ProblemVariables, ResolutionError, Solution, SolutionStatus, SolverModel,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, instrument, warn};

#[cfg(feature = "solver-clarabel")]
use clarabel::solver::SolverStatus as ClarabelStatus;
#[cfg(feature = "solver-clarabel")]
use good_lp::solvers::clarabel::clarabel as clarabel_solver;
#[cfg(feature = "solver-highs")]
use good_lp::solvers::highs::highs as highs_solver;

/// Terminal solver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Error,
}

impl SolveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::Error => "error",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-optimal solver outcomes. All are fatal for the run.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("model is infeasible ({solver})")]
    Infeasible { solver: &'static str },

    #[error("model is unbounded ({solver})")]
    Unbounded { solver: &'static str },

    #[error("solver {solver} failed: {message}")]
    Solver {
        solver: &'static str,
        message: String,
    },

    /// The solver stopped on a limit and its point is not a proven optimum
    #[error("solver {solver} stopped before reaching an optimum ({reason})")]
    NotOptimal {
        solver: &'static str,
        reason: String,
    },

    #[error("unknown LP solver '{name}'; supported values: {supported}")]
    UnknownSolver { name: String, supported: String },
}

impl SolveError {
    pub fn status(&self) -> SolveStatus {
        match self {
            SolveError::Infeasible { .. } => SolveStatus::Infeasible,
            SolveError::Unbounded { .. } => SolveStatus::Unbounded,
            SolveError::Solver { .. }
            | SolveError::NotOptimal { .. }
            | SolveError::UnknownSolver { .. } => SolveStatus::Error,
        }
    }

    fn from_resolution(solver: &'static str, err: ResolutionError) -> Self {
        match err {
            ResolutionError::Infeasible => SolveError::Infeasible { solver },
            ResolutionError::Unbounded => SolveError::Unbounded { solver },
            other => SolveError::Solver {
                solver,
                message: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpSolverKind {
    #[cfg(feature = "solver-clarabel")]
    Clarabel,
    #[cfg(feature = "solver-highs")]
    Highs,
}

/// Backend used when the config names none.
pub const DEFAULT_LP_SOLVER: &str = "clarabel";

const AVAILABLE_LP_SOLVERS: &[&str] = &[
    #[cfg(feature = "solver-clarabel")]
    "clarabel",
    #[cfg(feature = "solver-highs")]
    "highs",
];

impl LpSolverKind {
    pub fn available() -> &'static [&'static str] {
        AVAILABLE_LP_SOLVERS
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            #[cfg(feature = "solver-clarabel")]
            LpSolverKind::Clarabel => "clarabel",
            #[cfg(feature = "solver-highs")]
            LpSolverKind::Highs => "highs",
        }
    }

    pub fn backend(&self) -> Box<dyn LpBackend> {
        match *self {
            #[cfg(feature = "solver-clarabel")]
            LpSolverKind::Clarabel => Box::new(ClarabelBackend),
            #[cfg(feature = "solver-highs")]
            LpSolverKind::Highs => Box::new(HighsBackend),
        }
    }
}

fn unknown_solver_error(label: &str) -> SolveError {
    SolveError::UnknownSolver {
        name: label.to_string(),
        supported: LpSolverKind::available().join(", "),
    }
}

impl FromStr for LpSolverKind {
    type Err = SolveError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "clarabel" => {
                #[cfg(feature = "solver-clarabel")]
                {
                    Ok(LpSolverKind::Clarabel)
                }
                #[cfg(not(feature = "solver-clarabel"))]
                {
                    Err(unknown_solver_error(&normalized))
                }
            }
            "highs" => {
                #[cfg(feature = "solver-highs")]
                {
                    Ok(LpSolverKind::Highs)
                }
                #[cfg(not(feature = "solver-highs"))]
                {
                    Err(unknown_solver_error(&normalized))
                }
            }
            other => Err(unknown_solver_error(other)),
        }
    }
}

/// Solver selection and numerical knobs.
///
/// `None` leaves the backend's own default untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    pub name: String,
    pub crossover: Option<bool>,
    pub method: Option<String>,
    pub threads: Option<u32>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_LP_SOLVER.to_string(),
            crossover: None,
            method: None,
            threads: None,
        }
    }
}

impl SolverOptions {
    pub fn kind(&self) -> Result<LpSolverKind, SolveError> {
        self.name.parse()
    }
}

/// Solver-independent LP: variables, objective to minimise, constraints.
pub struct LpProblem {
    pub variables: ProblemVariables,
    pub objective: Expression,
    pub constraints: Vec<Constraint>,
}

impl LpProblem {
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}

/// A problem solved to optimality.
pub struct SolverOutcome {
    pub solver: &'static str,
    pub status: SolveStatus,
    pub solution: Box<dyn Solution>,
    pub elapsed: Duration,
}

impl fmt::Debug for SolverOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverOutcome")
            .field("solver", &self.solver)
            .field("status", &self.status)
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

/// One external LP solver reachable through `good_lp`.
pub trait LpBackend {
    fn name(&self) -> &'static str;

    /// Solve to optimality or report why not. Blocks until the solver returns.
    fn solve(
        &self,
        problem: LpProblem,
        options: &SolverOptions,
    ) -> Result<Box<dyn Solution>, SolveError>;
}

fn add_constraints<M: SolverModel>(mut model: M, constraints: Vec<Constraint>) -> M {
    for c in constraints {
        model = model.with(c);
    }
    model
}

/// Interior-point conic solver, pure Rust.
#[cfg(feature = "solver-clarabel")]
pub struct ClarabelBackend;

#[cfg(feature = "solver-clarabel")]
impl LpBackend for ClarabelBackend {
    fn name(&self) -> &'static str {
        "clarabel"
    }

    fn solve(
        &self,
        problem: LpProblem,
        options: &SolverOptions,
    ) -> Result<Box<dyn Solution>, SolveError> {
        if options.crossover.is_some() {
            warn!(solver = self.name(), "crossover option not supported, ignoring");
        }
        if let Some(method) = &options.method {
            warn!(solver = self.name(), method = %method, "method option not supported, ignoring");
        }
        if options.threads.is_some() {
            warn!(solver = self.name(), "threads option not supported, ignoring");
        }

        let model = problem
            .variables
            .minimise(problem.objective)
            .using(clarabel_solver);
        let model = add_constraints(model, problem.constraints);
        let solution = model
            .solve()
            .map_err(|e| SolveError::from_resolution(self.name(), e))?;

        // good_lp hands back a dual infeasibility certificate as a solution
        match solution.inner().status {
            ClarabelStatus::Solved => {}
            ClarabelStatus::AlmostSolved => {
                warn!(solver = self.name(), "solved to reduced accuracy");
            }
            ClarabelStatus::DualInfeasible | ClarabelStatus::AlmostDualInfeasible => {
                return Err(SolveError::Unbounded {
                    solver: self.name(),
                })
            }
            other => {
                return Err(SolveError::Solver {
                    solver: self.name(),
                    message: format!("unexpected status {:?}", other),
                })
            }
        }
        Ok(Box::new(solution))
    }
}

/// HiGHS simplex / IPM solver (native library).
#[cfg(feature = "solver-highs")]
pub struct HighsBackend;

#[cfg(feature = "solver-highs")]
impl LpBackend for HighsBackend {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve(
        &self,
        problem: LpProblem,
        options: &SolverOptions,
    ) -> Result<Box<dyn Solution>, SolveError> {
        let mut model = problem
            .variables
            .minimise(problem.objective)
            .using(highs_solver);
        if let Some(crossover) = options.crossover {
            model = model.set_option("run_crossover", if crossover { "on" } else { "off" });
        }
        if let Some(method) = &options.method {
            model = model.set_option("solver", method.as_str());
        }
        if let Some(threads) = options.threads {
            model = model.set_option("threads", threads as i32);
        }
        let model = add_constraints(model, problem.constraints);
        let solution = model
            .solve()
            .map_err(|e| SolveError::from_resolution(self.name(), e))?;
        Ok(Box::new(solution))
    }
}

/// Resolve the configured backend and solve.
#[instrument(skip_all, fields(solver = %options.name, constraints = problem.num_constraints()))]
pub fn solve(problem: LpProblem, options: &SolverOptions) -> Result<SolverOutcome, SolveError> {
    let backend = options.kind()?.backend();
    let start = Instant::now();
    let solution = backend.solve(problem, options)?;
    let elapsed = start.elapsed();
    check_optimal(backend.name(), solution.status())?;
    info!(
        solver = backend.name(),
        elapsed_ms = elapsed.as_millis() as u64,
        "solve finished"
    );
    Ok(SolverOutcome {
        solver: backend.name(),
        status: SolveStatus::Optimal,
        solution,
        elapsed,
    })
}

/// Reject points returned on a time or gap limit.
fn check_optimal(solver: &'static str, status: SolutionStatus) -> Result<(), SolveError> {
    match status {
        SolutionStatus::Optimal => Ok(()),
        SolutionStatus::TimeLimit => Err(SolveError::NotOptimal {
            solver,
            reason: "time limit reached".into(),
        }),
        SolutionStatus::GapLimit => Err(SolveError::NotOptimal {
            solver,
            reason: "gap limit reached".into(),
        }),
    }
}

#[cfg(all(test, feature = "solver-clarabel"))]
mod tests {
    use super::*;
    use good_lp::{constraint, variable, variables};

    #[test]
    fn parses_solver_names() {
        assert_eq!("clarabel".parse::<LpSolverKind>().unwrap(), LpSolverKind::Clarabel);
        assert_eq!(" Clarabel ".parse::<LpSolverKind>().unwrap(), LpSolverKind::Clarabel);
        let err = "gurobi".parse::<LpSolverKind>().unwrap_err();
        assert!(matches!(err, SolveError::UnknownSolver { .. }));
        assert!(err.to_string().contains("clarabel"));
    }

    #[cfg(not(feature = "solver-highs"))]
    #[test]
    fn highs_requires_feature() {
        assert!("highs".parse::<LpSolverKind>().is_err());
    }

    #[test]
    fn default_options_leave_knobs_unset() {
        let options = SolverOptions::default();
        assert_eq!(options.name, "clarabel");
        assert!(options.crossover.is_none());
        assert!(options.method.is_none());
        assert!(options.threads.is_none());
    }

    #[test]
    fn solves_small_lp() {
        let mut vars = variables!();
        let x = vars.add(variable().min(0.0));
        let y = vars.add(variable().min(0.0));
        let problem = LpProblem {
            variables: vars,
            objective: 2.0 * x + 3.0 * y,
            constraints: vec![constraint!(x + y >= 4.0)],
        };
        let outcome = solve(problem, &SolverOptions::default()).unwrap();
        assert!((outcome.solution.value(x) - 4.0).abs() < 1e-5);
        assert!(outcome.solution.value(y).abs() < 1e-5);
    }

    #[test]
    fn reports_infeasible() {
        let mut vars = variables!();
        let x = vars.add(variable().min(0.0));
        let problem = LpProblem {
            variables: vars,
            objective: Expression::from(x),
            constraints: vec![constraint!(x <= -1.0)],
        };
        let err = solve(problem, &SolverOptions::default()).unwrap_err();
        assert_eq!(err.status(), SolveStatus::Infeasible);
    }

    #[test]
    fn reports_unbounded() {
        let mut vars = variables!();
        let x = vars.add(variable().min(0.0));
        let problem = LpProblem {
            variables: vars,
            objective: -Expression::from(x),
            constraints: vec![],
        };
        let err = solve(problem, &SolverOptions::default()).unwrap_err();
        assert_eq!(err.status(), SolveStatus::Unbounded, "got {}", err);
    }

    #[test]
    fn limit_stops_are_not_optimal() {
        assert!(check_optimal("highs", SolutionStatus::Optimal).is_ok());
        let err = check_optimal("highs", SolutionStatus::TimeLimit).unwrap_err();
        assert!(matches!(err, SolveError::NotOptimal { .. }));
        assert_eq!(err.status(), SolveStatus::Error);
        assert!(err.to_string().contains("time limit"));
        assert!(check_optimal("highs", SolutionStatus::GapLimit).is_err());
    }

    #[test]
    fn optimal_outcome_carries_status() {
        let mut vars = variables!();
        let x = vars.add(variable().min(2.0));
        let problem = LpProblem {
            variables: vars,
            objective: Expression::from(x),
            constraints: vec![],
        };
        let outcome = solve(problem, &SolverOptions::default()).unwrap();
        assert_eq!(outcome.status, SolveStatus::Optimal);
    }

    #[test]
    fn unsupported_options_are_ignored() {
        let mut vars = variables!();
        let x = vars.add(variable().min(1.0));
        let problem = LpProblem {
            variables: vars,
            objective: Expression::from(x),
            constraints: vec![],
        };
        let options = SolverOptions {
            crossover: Some(true),
            method: Some("ipm".into()),
            threads: Some(4),
            ..SolverOptions::default()
        };
        let outcome = solve(problem, &options).unwrap();
        assert!((outcome.solution.value(x) - 1.0).abs() < 1e-5);
    }
}
