//! SOL file parsing.
//!
//! The SOL layout is rigid: an optional message block, the literal
//! `Options`, a short integer option list, four count lines, the dual and
//! primal blocks, and an `objno` trailer carrying the solver's result
//! code. Everything unexpected is a format violation; interpretation of
//! the result code happens in the solver layer.

use crate::error::AmplError;
use ponte_core::IndexMapper;

/// What a well-formed SOL file yields.
#[derive(Debug, Clone)]
pub struct SolOutcome {
    /// Solver message block, newline-joined.
    pub message: String,
    /// Result code from the `objno` trailer.
    pub solve_result_num: i64,
    /// Primal values in user variable order, when the solver wrote any.
    pub primal: Option<Vec<f64>>,
}

struct Cursor<'a> {
    lines: std::str::Lines<'a>,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { lines: text.lines() }
    }

    fn try_next(&mut self) -> Option<&'a str> {
        self.lines.next()
    }

    fn next_line(&mut self, context: &str) -> Result<&'a str, AmplError> {
        self.try_next()
            .ok_or_else(|| AmplError::sol_format(format!("unexpected end of file in {}", context)))
    }

    fn next_int(&mut self, context: &str) -> Result<i64, AmplError> {
        let line = self.next_line(context)?;
        line.trim().parse().map_err(|_| {
            AmplError::sol_format(format!("expected integer in {}, got '{}'", context, line))
        })
    }

    fn next_float(&mut self, context: &str) -> Result<f64, AmplError> {
        let line = self.next_line(context)?;
        line.trim().parse().map_err(|_| {
            AmplError::sol_format(format!("expected float in {}, got '{}'", context, line))
        })
    }
}

/// Parse a SOL file against the dimensions and permutations of the model
/// it answers.
pub fn read_sol(
    text: &str,
    nvar: usize,
    ncon: usize,
    mapper: &IndexMapper,
) -> Result<SolOutcome, AmplError> {
    let mut cursor = Cursor::new(text);

    // Message block: skip leading blanks, then collect until a blank line.
    let mut line = cursor.next_line("message block")?;
    while line.trim().is_empty() {
        line = cursor.next_line("message block")?;
    }
    let mut message_lines = Vec::new();
    while !line.trim().is_empty() {
        message_lines.push(line.trim_end());
        line = cursor.next_line("message block")?;
    }
    let message = message_lines.join("\n");

    let mut options_line = cursor.next_line("options header")?;
    while options_line.trim().is_empty() {
        options_line = cursor.next_line("options header")?;
    }
    if options_line.trim() != "Options" {
        return Err(AmplError::sol_format(format!(
            "expected 'Options' literal, got '{}'",
            options_line
        )));
    }

    let mut options = Vec::with_capacity(3);
    for _ in 0..3 {
        options.push(cursor.next_int("options list")?);
    }
    let mut num_options = options[0];
    if !(3..=9).contains(&num_options) {
        return Err(AmplError::sol_format(format!(
            "option count {} outside 3..=9",
            num_options
        )));
    }
    let need_vbtol = options[2] == 3;
    if need_vbtol {
        num_options -= 2;
    }
    for _ in 0..(num_options - 3) {
        options.push(cursor.next_int("options list")?);
    }

    let n_constraints = cursor.next_int("constraint count")?;
    if n_constraints as usize != ncon {
        return Err(AmplError::sol_format(format!(
            "constraint count {} does not match model ({})",
            n_constraints, ncon
        )));
    }
    let n_duals = cursor.next_int("dual count")?;
    if n_duals != 0 && n_duals as usize != ncon {
        return Err(AmplError::sol_format(format!(
            "dual count {} must be 0 or {}",
            n_duals, ncon
        )));
    }
    let n_variables = cursor.next_int("variable count")?;
    if n_variables as usize != nvar {
        return Err(AmplError::sol_format(format!(
            "variable count {} does not match model ({})",
            n_variables, nvar
        )));
    }
    let n_vars_to_read = cursor.next_int("primal count")?;
    if n_vars_to_read != 0 && n_vars_to_read as usize != nvar {
        return Err(AmplError::sol_format(format!(
            "primal count {} must be 0 or {}",
            n_vars_to_read, nvar
        )));
    }

    if need_vbtol {
        cursor.next_line("vbtol")?;
    }
    for _ in 0..n_duals {
        cursor.next_line("dual block")?;
    }

    let primal = if n_vars_to_read > 0 {
        let mut solution = vec![0.0; nvar];
        for nl_index in 0..nvar {
            let value = cursor.next_float("primal block")?;
            solution[mapper.var_from_nl(nl_index).position()] = value;
        }
        Some(solution)
    } else {
        None
    };

    let mut solve_result_num = None;
    while let Some(line) = cursor.try_next() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("objno ") {
            let mut fields = rest.split_whitespace();
            let objno: i64 = fields
                .next()
                .and_then(|field| field.parse().ok())
                .ok_or_else(|| AmplError::sol_format("malformed objno line"))?;
            if objno != 0 {
                return Err(AmplError::sol_format(format!(
                    "objno {} is not 0",
                    objno
                )));
            }
            let num = fields
                .next()
                .and_then(|field| field.parse().ok())
                .ok_or_else(|| AmplError::sol_format("objno line missing result code"))?;
            solve_result_num = Some(num);
            break;
        }
    }
    let solve_result_num = solve_result_num
        .ok_or_else(|| AmplError::sol_format("missing objno trailer"))?;

    tracing::debug!(
        component = "sol_reader",
        operation = "read_sol",
        status = "success",
        solve_result_num,
        primal_values = primal.as_ref().map(|p| p.len()).unwrap_or(0),
        duals_skipped = n_duals,
        "Parsed SOL file"
    );

    Ok(SolOutcome {
        message,
        solve_result_num,
        primal,
    })
}
