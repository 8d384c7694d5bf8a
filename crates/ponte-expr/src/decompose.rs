//! Linear-term decomposition.
//!
//! `process_expression` splits an expression into a coefficient map, a
//! floating constant, and a residual tree containing only the genuinely
//! nonlinear part. For every input `E` and assignment `x` the identity
//! `eval(E, x) == eval(residual, x) + constant + sum(L[j] * x[j])` holds
//! up to floating-point rounding.

use crate::ids::VariableId;
use crate::linearity::{analyze, pull_up_constants, Linearity, Tagged, TaggedNode};
use crate::op::Op;
use crate::tree::Expr;
use std::collections::{BTreeMap, BTreeSet};

/// Coefficients of the linear part, keyed by variable.
///
/// A zero coefficient is kept only while its variable also appears in the
/// residual tree, so the NL writer still lists the variable in the row.
pub type LinearMap = BTreeMap<VariableId, f64>;

/// Result of decomposing one expression.
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// Nonlinear remainder; the scalar 0 when the input was affine.
    pub residual: Expr,
    /// Constant pulled out of the expression.
    pub constant: f64,
    /// Overall class: `Nonlinear` iff the residual is not the scalar 0.
    pub linearity: Linearity,
    /// Variables appearing in the residual.
    pub nonlinear_vars: BTreeSet<VariableId>,
}

/// Decompose `expr`, accumulating linear coefficients into `linear`.
pub fn process_expression(expr: &Expr, linear: &mut LinearMap) -> Decomposition {
    // Every referenced variable gets a row, even if its net linear
    // coefficient turns out to be zero.
    expr.each_var(&mut |id| {
        linear.entry(id).or_insert(0.0);
    });

    let tagged = pull_up_constants(analyze(expr));

    let mut constant = 0.0;
    let residual = prune(tagged, 1.0, linear, &mut constant);

    let mut nonlinear_vars = BTreeSet::new();
    residual.each_var(&mut |id| {
        nonlinear_vars.insert(id);
    });

    linear.retain(|id, coeff| *coeff != 0.0 || nonlinear_vars.contains(id));

    let linearity = if residual.is_zero() {
        Linearity::Linear
    } else {
        Linearity::Nonlinear
    };

    Decomposition {
        residual,
        constant,
        linearity,
        nonlinear_vars,
    }
}

/// Rewrite the decorated tree, replacing every Const or Linear subtree in
/// an additive position with the scalar 0 while accumulating its value.
///
/// `sign` is the product of additive signs on the path from the root; it
/// only changes when descending through `-` and `neg`.
fn prune(tagged: Tagged, sign: f64, linear: &mut LinearMap, constant: &mut f64) -> Expr {
    match tagged.tag {
        Linearity::Const => {
            // Constants are single leaves after pull-up.
            if let TaggedNode::Const(c) = tagged.node {
                *constant += sign * c;
            }
            Expr::Const(0.0)
        }
        Linearity::Linear => {
            extract_linear(tagged, sign, linear, constant);
            Expr::Const(0.0)
        }
        Linearity::Nonlinear => match tagged.node {
            TaggedNode::Call(op @ (Op::Add | Op::Sum), children) => Expr::Call(
                op,
                children
                    .into_iter()
                    .map(|child| prune(child, sign, linear, constant))
                    .collect(),
            ),
            TaggedNode::Call(Op::Sub, mut children) => {
                if children.len() == 1 {
                    let a = children.pop().map(|c| prune(c, -sign, linear, constant));
                    Expr::Call(Op::Sub, a.into_iter().collect())
                } else {
                    let b = children.pop();
                    let a = children.pop();
                    let a = a.map(|c| prune(c, sign, linear, constant));
                    let b = b.map(|c| prune(c, -sign, linear, constant));
                    Expr::Call(Op::Sub, a.into_iter().chain(b).collect())
                }
            }
            TaggedNode::Call(Op::Neg, children) => Expr::Call(
                Op::Neg,
                children
                    .into_iter()
                    .map(|child| prune(child, -sign, linear, constant))
                    .collect(),
            ),
            // Non-additive nonlinear contexts are left untouched; nothing
            // inside them can be stripped without changing the value.
            node => Tagged {
                tag: Linearity::Nonlinear,
                node,
            }
            .into_expr(),
        },
    }
}

/// Accumulate a Linear-tagged subtree into the coefficient map.
fn extract_linear(tagged: Tagged, sign: f64, linear: &mut LinearMap, constant: &mut f64) {
    match tagged.node {
        TaggedNode::Const(c) => *constant += sign * c,
        TaggedNode::Var(id) => {
            *linear.entry(id).or_insert(0.0) += sign;
        }
        TaggedNode::Call(op, mut children) => match op {
            Op::Add | Op::Sum => {
                for child in children {
                    extract_linear(child, sign, linear, constant);
                }
            }
            Op::Sub => {
                if children.len() == 1 {
                    if let Some(a) = children.pop() {
                        extract_linear(a, -sign, linear, constant);
                    }
                } else {
                    let b = children.pop();
                    let a = children.pop();
                    if let Some(a) = a {
                        extract_linear(a, sign, linear, constant);
                    }
                    if let Some(b) = b {
                        extract_linear(b, -sign, linear, constant);
                    }
                }
            }
            Op::Neg => {
                if let Some(a) = children.pop() {
                    extract_linear(a, -sign, linear, constant);
                }
            }
            Op::Mul => {
                // A Linear product has exactly one Linear factor; the rest
                // are constant leaves after pull-up.
                let mut scale = sign;
                let mut linear_child = None;
                for child in children {
                    match child.tag {
                        Linearity::Const => {
                            if let TaggedNode::Const(c) = child.node {
                                scale *= c;
                            }
                        }
                        _ => linear_child = Some(child),
                    }
                }
                if let Some(child) = linear_child {
                    extract_linear(child, scale, linear, constant);
                }
            }
            Op::Div => {
                let denom = children.pop();
                let num = children.pop();
                let d = match denom {
                    Some(Tagged {
                        node: TaggedNode::Const(d),
                        ..
                    }) => d,
                    _ => 1.0,
                };
                if let Some(num) = num {
                    extract_linear(num, sign / d, linear, constant);
                }
            }
            // The analyzer never tags other operators Linear.
            _ => unreachable!("linear tag on operator '{}'", op),
        },
    }
}
