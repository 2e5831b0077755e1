pub mod optimize;
pub mod ptdf;
pub mod validate;

use grim_algo::{AssemblyError, BuildError, ExpansionError, SensitivityError, SolveError};
use grim_core::GrimError;

/// Process exit status for a failed command.
///
/// `2` when the model could not be built (bad inputs, bad configuration,
/// broken topology), `3` when the solver did not return an optimum, `1` for
/// everything else.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ExpansionError>() {
            return match e {
                ExpansionError::Build(_) => 2,
                ExpansionError::Solve(_) => 3,
                ExpansionError::Output(_) => 1,
            };
        }
        if cause.is::<BuildError>()
            || cause.is::<AssemblyError>()
            || cause.is::<SensitivityError>()
            || cause.is::<GrimError>()
        {
            return 2;
        }
        if let Some(e) = cause.downcast_ref::<SolveError>() {
            return match e {
                SolveError::UnknownSolver { .. } => 2,
                _ => 3,
            };
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn classifies_wrapped_errors() {
        let build: anyhow::Error = ExpansionError::from(SensitivityError::NoLines).into();
        assert_eq!(exit_code(&build), 2);

        let solve = anyhow::Error::from(ExpansionError::Solve(SolveError::Infeasible {
            solver: "clarabel".into(),
        }));
        assert_eq!(exit_code(&solve.context("running optimize")), 3);

        let io: anyhow::Result<()> = Err(GrimError::Config("nodes = 0".into()).into());
        assert_eq!(exit_code(&io.context("loading inputs").unwrap_err()), 2);

        assert_eq!(exit_code(&anyhow::anyhow!("something else")), 1);
    }
}
