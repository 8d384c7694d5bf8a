//! Solver process driver.
//!
//! Spawns the solver as `<executable> <problem.nl> -AMPL key=val...` with
//! inherited stdio and blocks until it exits. No timeout is imposed; the
//! caller chose the solver and owns its lifetime.

use crate::error::AmplError;
use ponte_solver::SolverCommand;
use std::process::Command;
use std::time::Instant;

/// Run the solver to completion and return its exit code.
pub fn run_solver(command: &SolverCommand) -> Result<i32, AmplError> {
    let problem = command.problem_path();
    let options = command.option_args();

    tracing::debug!(
        component = "driver",
        operation = "spawn",
        status = "success",
        executable = %command.executable.display(),
        problem = %problem.display(),
        num_options = options.len(),
        "Spawning solver process"
    );

    let started = Instant::now();
    let mut child = Command::new(&command.executable)
        .arg(&problem)
        .arg("-AMPL")
        .args(&options)
        .spawn()
        .map_err(AmplError::io(command.executable.clone()))?;

    let status = child
        .wait()
        .map_err(AmplError::io(command.executable.clone()))?;
    // A termination by signal has no code; surface it as -1.
    let exitcode = status.code().unwrap_or(-1);

    if exitcode == 0 {
        tracing::debug!(
            component = "driver",
            operation = "wait",
            status = "success",
            exitcode,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Solver process finished"
        );
    } else {
        tracing::warn!(
            component = "driver",
            operation = "wait",
            status = "warn",
            exitcode,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Solver process exited with failure"
        );
    }
    Ok(exitcode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_executable_surfaces_io_error() {
        let command = SolverCommand::new("/nonexistent/ponte-no-such-solver");
        let err = run_solver(&command).unwrap_err();
        assert_eq!(err.code(), "AMPL_IO");
        assert!(err.to_string().contains("ponte-no-such-solver"));
    }
}
