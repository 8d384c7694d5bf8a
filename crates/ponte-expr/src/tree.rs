//! Expression trees.
//!
//! An [`Expr`] is a plain tagged sum: constants, variable references, and
//! operator applications. Providers hand these to the model loader;
//! decomposition strips the linear part and whatever survives is serialized
//! to the NL file in prefix notation.

use crate::error::ExprError;
use crate::ids::VariableId;
use crate::op::Op;

/// Arithmetic expression over solver variables.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Const(f64),
    /// Reference to a variable by 1-based index.
    Var(VariableId),
    /// Operator applied to child expressions.
    Call(Op, Vec<Expr>),
}

impl Expr {
    /// Variable reference from a 1-based index.
    pub fn var(index: u32) -> Self {
        Expr::Var(VariableId::new(index))
    }

    /// Unary operator application.
    pub fn unary(op: Op, arg: Expr) -> Self {
        Expr::Call(op, vec![arg])
    }

    /// Binary operator application.
    pub fn binary(op: Op, lhs: Expr, rhs: Expr) -> Self {
        Expr::Call(op, vec![lhs, rhs])
    }

    /// Whether this is exactly the scalar zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(c) if *c == 0.0)
    }

    /// Validate variable ranges and operator arities over the whole tree.
    pub fn validate(&self, nvar: usize) -> Result<(), ExprError> {
        match self {
            Expr::Const(_) => Ok(()),
            Expr::Var(id) => {
                if id.inner() == 0 || id.inner() as usize > nvar {
                    return Err(ExprError::VariableOutOfRange {
                        index: id.inner(),
                        nvar,
                    });
                }
                Ok(())
            }
            Expr::Call(op, children) => {
                if !op.accepts(children.len()) {
                    return Err(ExprError::WrongArity {
                        op: *op,
                        found: children.len(),
                    });
                }
                for child in children {
                    child.validate(nvar)?;
                }
                Ok(())
            }
        }
    }

    /// Invoke `visit` for every variable reference in the tree.
    pub fn each_var(&self, visit: &mut impl FnMut(VariableId)) {
        match self {
            Expr::Const(_) => {}
            Expr::Var(id) => visit(*id),
            Expr::Call(_, children) => {
                for child in children {
                    child.each_var(visit);
                }
            }
        }
    }

    /// Evaluate against an assignment indexed by variable position.
    pub fn eval(&self, x: &[f64]) -> Result<f64, ExprError> {
        match self {
            Expr::Const(c) => Ok(*c),
            Expr::Var(id) => x.get(id.position()).copied().ok_or_else(|| {
                ExprError::VariableOutOfRange {
                    index: id.inner(),
                    nvar: x.len(),
                }
            }),
            Expr::Call(op, children) => {
                let mut args = Vec::with_capacity(children.len());
                for child in children {
                    args.push(child.eval(x)?);
                }
                Ok(op.apply(&args))
            }
        }
    }
}
