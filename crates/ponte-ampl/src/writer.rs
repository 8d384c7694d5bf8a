//! NL file serialization.
//!
//! Emits the `g`-mode (text) NL format: the 10-line header followed by the
//! C/O/d/x/r/b/k/J/G segments in that order. Every variable index in the
//! body is the permuted 0-based NL column; constraints are emitted in
//! their permuted row order. Floats use Rust's shortest round-trip
//! formatting, which is locale-independent and f64-exact.

use ponte_core::{BoundCode, Bounds, IndexMapper, Model};
use ponte_expr::{Expr, Linearity};
use std::io::{self, Write};

/// Header counts derived from the model.
struct Counts {
    nranges: usize,
    neqns: usize,
    nlc: usize,
    nlo: usize,
    /// Variables nonlinear in either context.
    nlv: usize,
    /// Nonlinear discrete variables.
    nlvi: usize,
    /// Linear binary variables.
    nbv: usize,
    /// Linear integer variables.
    niv: usize,
    /// Jacobian nonzeros.
    nzc: usize,
    /// Objective gradient nonzeros.
    nzo: usize,
}

impl Counts {
    fn of(model: &Model) -> Self {
        use ponte_core::VarCategory;

        let nranges = model
            .r_codes
            .iter()
            .filter(|code| **code == BoundCode::Range)
            .count();
        let neqns = model
            .r_codes
            .iter()
            .filter(|code| **code == BoundCode::Fixed)
            .count();

        let mut nlv = 0;
        let mut nlvi = 0;
        let mut nbv = 0;
        let mut niv = 0;
        for (category, linearity) in model.var_categories.iter().zip(&model.var_linearities) {
            if linearity.is_nonlinear() {
                nlv += 1;
                if category.is_discrete() {
                    nlvi += 1;
                }
            } else {
                match category {
                    VarCategory::Binary => nbv += 1,
                    VarCategory::Integer => niv += 1,
                    VarCategory::Continuous => {}
                }
            }
        }

        Counts {
            nranges,
            neqns,
            nlc: model.num_nonlinear_cons(),
            nlo: usize::from(model.obj_linearity == Linearity::Nonlinear),
            nlv,
            nlvi,
            nbv,
            niv,
            nzc: model.lin_constrs.iter().map(|row| row.len()).sum(),
            nzo: model.lin_obj.len(),
        }
    }
}

/// Serialize a finalized model into NL format.
pub fn write_nl<W: Write>(
    model: &Model,
    mapper: &IndexMapper,
    name: &str,
    out: &mut W,
) -> io::Result<()> {
    let counts = Counts::of(model);

    write_header(model, &counts, name, out)?;
    write_constraint_bodies(model, mapper, out)?;
    write_objective_body(model, mapper, out)?;
    write_initial_guesses(model, mapper, out)?;
    write_constraint_bounds(model, mapper, out)?;
    write_variable_bounds(model, mapper, out)?;
    write_column_counts(model, mapper, out)?;
    write_jacobian_rows(model, mapper, out)?;
    write_gradient_row(model, mapper, out)?;

    tracing::debug!(
        component = "nl_writer",
        operation = "write_nl",
        status = "success",
        nvar = model.nvar,
        ncon = model.ncon,
        nonlinear_cons = counts.nlc,
        nonlinear_vars = counts.nlv,
        jacobian_nonzeros = counts.nzc,
        "Serialized model to NL format"
    );
    Ok(())
}

fn write_header<W: Write>(
    model: &Model,
    counts: &Counts,
    name: &str,
    out: &mut W,
) -> io::Result<()> {
    // The simplified ordering treats every nonlinear variable as nonlinear
    // in both contexts, so the three header counts coincide.
    writeln!(out, "g3 1 1 0\t# problem {}", name)?;
    writeln!(
        out,
        " {} {} 1 {} {}\t# vars, constraints, objectives, ranges, eqns",
        model.nvar, model.ncon, counts.nranges, counts.neqns
    )?;
    writeln!(
        out,
        " {} {}\t# nonlinear constraints, objectives",
        counts.nlc, counts.nlo
    )?;
    writeln!(out, " 0 0\t# network constraints: nonlinear, linear")?;
    writeln!(
        out,
        " {} {} {}\t# nonlinear vars in constraints, objectives, both",
        counts.nlv, counts.nlv, counts.nlv
    )?;
    writeln!(out, " 0 0 0 1\t# linear network variables; functions; arith, flags")?;
    writeln!(
        out,
        " {} {} {} 0 0\t# discrete variables: binary, integer, nonlinear (b,c,o)",
        counts.nbv, counts.niv, counts.nlvi
    )?;
    writeln!(
        out,
        " {} {}\t# nonzeros in Jacobian, gradients",
        counts.nzc, counts.nzo
    )?;
    writeln!(out, " 0 0\t# max name lengths: constraints, variables")?;
    writeln!(out, " 0 0 0 0 0\t# common exprs: b,c,o,c1,o1")?;
    Ok(())
}

/// Emit an expression in prefix notation, one node per line.
fn write_expr<W: Write>(out: &mut W, expr: &Expr, mapper: &IndexMapper) -> io::Result<()> {
    match expr {
        Expr::Const(c) => writeln!(out, "n{}", c),
        Expr::Var(id) => writeln!(out, "v{}", mapper.var_to_nl(*id)),
        Expr::Call(op, children) => {
            writeln!(out, "o{}", op.opcode())?;
            if op.is_variadic() {
                writeln!(out, "{}", children.len())?;
            }
            for child in children {
                write_expr(out, child, mapper)?;
            }
            Ok(())
        }
    }
}

fn write_constraint_bodies<W: Write>(
    model: &Model,
    mapper: &IndexMapper,
    out: &mut W,
) -> io::Result<()> {
    for (nl_row, orig) in mapper.con_reverse.iter().enumerate() {
        writeln!(out, "C{}", nl_row)?;
        write_expr(out, &model.constrs[*orig], mapper)?;
    }
    Ok(())
}

fn write_objective_body<W: Write>(
    model: &Model,
    mapper: &IndexMapper,
    out: &mut W,
) -> io::Result<()> {
    // The objective segment is always present; a purely linear objective
    // still carries the scalar 0 as its nonlinear part.
    writeln!(out, "O0 {}", model.sense.nl_code())?;
    match &model.obj {
        Some(obj) => write_expr(out, obj, mapper),
        None => writeln!(out, "n0"),
    }
}

fn write_initial_guesses<W: Write>(
    model: &Model,
    mapper: &IndexMapper,
    out: &mut W,
) -> io::Result<()> {
    // No dual guesses, ever.
    writeln!(out, "d0")?;

    let mut entries: Vec<(usize, f64)> = Vec::new();
    for (position, value) in model.x_0.iter().enumerate() {
        if *value != 0.0 {
            let id = ponte_expr::VariableId::new(position as u32 + 1);
            entries.push((mapper.var_to_nl(id), *value));
        }
    }
    entries.sort_by_key(|(nl, _)| *nl);

    writeln!(out, "x{}", entries.len())?;
    for (nl, value) in entries {
        writeln!(out, "{} {}", nl, value)?;
    }
    Ok(())
}

fn write_bound_line<W: Write>(out: &mut W, code: BoundCode, bounds: Bounds) -> io::Result<()> {
    match code {
        BoundCode::Range => writeln!(out, "0 {} {}", bounds.lower, bounds.upper),
        BoundCode::Upper => writeln!(out, "1 {}", bounds.upper),
        BoundCode::Lower => writeln!(out, "2 {}", bounds.lower),
        BoundCode::Free => writeln!(out, "3"),
        BoundCode::Fixed => writeln!(out, "4 {}", bounds.lower),
    }
}

fn write_constraint_bounds<W: Write>(
    model: &Model,
    mapper: &IndexMapper,
    out: &mut W,
) -> io::Result<()> {
    if model.ncon == 0 {
        return Ok(());
    }
    writeln!(out, "r")?;
    for orig in &mapper.con_reverse {
        write_bound_line(
            out,
            model.r_codes[*orig],
            Bounds::new(model.g_l[*orig], model.g_u[*orig]),
        )?;
    }
    Ok(())
}

fn write_variable_bounds<W: Write>(
    model: &Model,
    mapper: &IndexMapper,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "b")?;
    for id in &mapper.var_reverse {
        let bounds = Bounds::new(model.x_l[id.position()], model.x_u[id.position()]);
        write_bound_line(out, BoundCode::of(bounds), bounds)?;
    }
    Ok(())
}

fn write_column_counts<W: Write>(
    model: &Model,
    mapper: &IndexMapper,
    out: &mut W,
) -> io::Result<()> {
    if model.nvar == 0 {
        return Ok(());
    }
    // Cumulative Jacobian nonzero counts over the first nvar-1 NL columns.
    writeln!(out, "k{}", model.nvar - 1)?;
    let mut cumulative = 0;
    for id in mapper.var_reverse.iter().take(model.nvar - 1) {
        cumulative += model.j_counts[id.position()];
        writeln!(out, "{}", cumulative)?;
    }
    Ok(())
}

fn write_jacobian_rows<W: Write>(
    model: &Model,
    mapper: &IndexMapper,
    out: &mut W,
) -> io::Result<()> {
    for (nl_row, orig) in mapper.con_reverse.iter().enumerate() {
        let linear = &model.lin_constrs[*orig];
        if linear.is_empty() {
            continue;
        }
        let mut entries: Vec<(usize, f64)> = linear
            .iter()
            .map(|(id, coeff)| (mapper.var_to_nl(*id), *coeff))
            .collect();
        entries.sort_by_key(|(nl, _)| *nl);

        writeln!(out, "J{} {}", nl_row, entries.len())?;
        for (nl, coeff) in entries {
            writeln!(out, "{} {}", nl, coeff)?;
        }
    }
    Ok(())
}

fn write_gradient_row<W: Write>(
    model: &Model,
    mapper: &IndexMapper,
    out: &mut W,
) -> io::Result<()> {
    if model.lin_obj.is_empty() {
        return Ok(());
    }
    let mut entries: Vec<(usize, f64)> = model
        .lin_obj
        .iter()
        .map(|(id, coeff)| (mapper.var_to_nl(*id), *coeff))
        .collect();
    entries.sort_by_key(|(nl, _)| *nl);

    writeln!(out, "G0 {}", entries.len())?;
    for (nl, coeff) in entries {
        writeln!(out, "{} {}", nl, coeff)?;
    }
    Ok(())
}
