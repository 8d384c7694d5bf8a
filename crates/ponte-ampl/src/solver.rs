//! The AMPL solver orchestrator.
//!
//! [`AmplSolver::optimize`] drives one full round trip: finalize the model,
//! serialize it to `<workdir>/<stem>.nl`, run the solver, parse
//! `<workdir>/<stem>.sol`, and reconstitute the objective from the
//! retained nonlinear residual. A nonzero solver exit is recorded on the
//! model and reported through the status API, not raised.

use crate::driver::run_solver;
use crate::error::AmplError;
use crate::reader::read_sol;
use crate::writer::write_nl;
use ponte_core::{Model, ModelError};
use ponte_solver::{classify_message, classify_result_num, SolveStatus, SolverCommand};
use ponte_tools::{capture_rss_bytes, rss_delta};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

/// Bridge to one AMPL-compatible solver executable.
#[derive(Debug, Clone)]
pub struct AmplSolver {
    command: SolverCommand,
}

impl AmplSolver {
    /// Create a solver handle from a command configuration.
    pub fn new(command: SolverCommand) -> Self {
        Self { command }
    }

    /// The underlying command configuration.
    pub fn command(&self) -> &SolverCommand {
        &self.command
    }

    /// Solve the model in place.
    ///
    /// On return the model carries status, result code, message, and exit
    /// code; a successful solve with primal values also fills the
    /// solution vector and the reconstituted objective.
    pub fn optimize(&self, model: &mut Model) -> Result<(), AmplError> {
        let started = Instant::now();
        let rss_before = capture_rss_bytes();
        let mapper = model.finalize().clone();

        let nl_path = self.command.problem_path();
        let file = File::create(&nl_path).map_err(AmplError::io(nl_path.clone()))?;
        let mut out = BufWriter::new(file);
        write_nl(model, &mapper, &self.command.file_stem, &mut out)
            .and_then(|()| out.flush())
            .map_err(AmplError::io(nl_path.clone()))?;

        let exitcode = run_solver(&self.command)?;
        model.solve_exitcode = exitcode;
        if exitcode != 0 {
            model.status = SolveStatus::Error;
            model.solve_result = "failure".to_string();
            model.solve_result_num = 999;
            tracing::warn!(
                component = "solver",
                operation = "optimize",
                status = "warn",
                exitcode,
                "Solver failed before writing a result; skipping SOL file"
            );
            return Ok(());
        }

        let sol_path = self.command.solution_path();
        let text =
            std::fs::read_to_string(&sol_path).map_err(AmplError::io(sol_path.clone()))?;
        let outcome = read_sol(&text, model.nvar, model.ncon, &mapper)?;

        model.solve_message = outcome.message;
        model.solve_result_num = outcome.solve_result_num;
        match classify_result_num(outcome.solve_result_num) {
            Some((status, result)) => {
                model.status = status;
                model.solve_result = result.to_string();
                if result == "solved?" {
                    tracing::warn!(
                        component = "solver",
                        operation = "optimize",
                        status = "warn",
                        solve_result_num = model.solve_result_num,
                        "Solver reports an uncertain optimum"
                    );
                }
            }
            None => {
                model.status = SolveStatus::NotSolved;
                model.solve_result = "?".to_string();
            }
        }
        if model.status == SolveStatus::NotSolved {
            if let Some(status) = classify_message(&model.solve_message) {
                model.status = status;
            }
        }

        if let Some(primal) = outcome.primal {
            model.solution = primal;
            model.objval = reconstitute_objective(model)?;
        } else {
            model.objval = f64::NAN;
        }

        let rss_after = capture_rss_bytes();
        tracing::debug!(
            component = "solver",
            operation = "optimize",
            status = "success",
            solver_status = model.status.as_str(),
            solve_result = %model.solve_result,
            solve_result_num = model.solve_result_num,
            objective_value = model.objval,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            rss_bytes = ?rss_after,
            rss_delta_bytes = ?rss_delta(rss_before, rss_after),
            "Solve round trip completed"
        );
        Ok(())
    }
}

/// Evaluate the original objective at the solution: nonlinear residual
/// plus the linear part's dot product plus the pulled-out constant.
fn reconstitute_objective(model: &Model) -> Result<f64, AmplError> {
    let mut value = model.obj_constant;
    if let Some(obj) = &model.obj {
        value += obj
            .eval(&model.solution)
            .map_err(|err| AmplError::Model(ModelError::from(err)))?;
    }
    for (id, coeff) in &model.lin_obj {
        value += coeff * model.solution[id.position()];
    }
    Ok(value)
}
