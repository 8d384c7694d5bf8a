//! Linearity analysis.
//!
//! A bottom-up pass decorates every node of an expression with a tag from
//! the ordered set Const < Linear < Nonlinear. The decorated copy is a
//! throwaway: decomposition consumes it and only the untagged residual
//! survives.

use crate::ids::VariableId;
use crate::op::Op;
use crate::tree::Expr;

/// Linearity class of an expression node, ordered by generality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Linearity {
    Const,
    Linear,
    Nonlinear,
}

impl Linearity {
    pub fn as_str(self) -> &'static str {
        match self {
            Linearity::Const => "const",
            Linearity::Linear => "linear",
            Linearity::Nonlinear => "nonlinear",
        }
    }
}

impl std::fmt::Display for Linearity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expression node decorated with its computed linearity.
#[derive(Debug, Clone)]
pub struct Tagged {
    pub tag: Linearity,
    pub node: TaggedNode,
}

#[derive(Debug, Clone)]
pub enum TaggedNode {
    Const(f64),
    Var(VariableId),
    Call(Op, Vec<Tagged>),
}

impl Tagged {
    /// Strip the tags back off, yielding the plain expression.
    pub fn into_expr(self) -> Expr {
        match self.node {
            TaggedNode::Const(c) => Expr::Const(c),
            TaggedNode::Var(id) => Expr::Var(id),
            TaggedNode::Call(op, children) => {
                Expr::Call(op, children.into_iter().map(Tagged::into_expr).collect())
            }
        }
    }
}

/// Decorate an expression with per-node linearity tags.
pub fn analyze(expr: &Expr) -> Tagged {
    match expr {
        Expr::Const(c) => Tagged {
            tag: Linearity::Const,
            node: TaggedNode::Const(*c),
        },
        Expr::Var(id) => Tagged {
            tag: Linearity::Linear,
            node: TaggedNode::Var(*id),
        },
        Expr::Call(op, children) => {
            let children: Vec<Tagged> = children.iter().map(analyze).collect();
            let tag = call_tag(*op, &children);
            Tagged {
                tag,
                node: TaggedNode::Call(*op, children),
            }
        }
    }
}

fn call_tag(op: Op, children: &[Tagged]) -> Linearity {
    let max = children
        .iter()
        .map(|c| c.tag)
        .max()
        .unwrap_or(Linearity::Const);
    match op {
        // Additive operators preserve the strongest child class.
        Op::Add | Op::Sub | Op::Sum | Op::Neg => max,
        Op::Mul => {
            let linear = children
                .iter()
                .filter(|c| c.tag == Linearity::Linear)
                .count();
            let nonlinear = children
                .iter()
                .filter(|c| c.tag == Linearity::Nonlinear)
                .count();
            if nonlinear > 0 || linear > 1 {
                Linearity::Nonlinear
            } else if linear == 1 {
                Linearity::Linear
            } else {
                Linearity::Const
            }
        }
        Op::Div => {
            let num = children
                .first()
                .map(|c| c.tag)
                .unwrap_or(Linearity::Const);
            let denom = children.get(1).map(|c| c.tag).unwrap_or(Linearity::Const);
            if denom == Linearity::Const && num <= Linearity::Linear {
                num
            } else {
                Linearity::Nonlinear
            }
        }
        // Everything else (transcendentals, powers, comparisons, `if`) is
        // nonlinear unless structurally constant.
        _ => {
            if max == Linearity::Const {
                Linearity::Const
            } else {
                Linearity::Nonlinear
            }
        }
    }
}

/// Fold every maximal constant subtree into a single `Const` leaf.
///
/// Evaluation uses the operators' IEEE semantics, so the rewrite is exact.
pub fn pull_up_constants(tagged: Tagged) -> Tagged {
    if tagged.tag == Linearity::Const {
        let value = eval_const(&tagged);
        return Tagged {
            tag: Linearity::Const,
            node: TaggedNode::Const(value),
        };
    }
    match tagged.node {
        TaggedNode::Call(op, children) => Tagged {
            tag: tagged.tag,
            node: TaggedNode::Call(op, children.into_iter().map(pull_up_constants).collect()),
        },
        node => Tagged {
            tag: tagged.tag,
            node,
        },
    }
}

fn eval_const(tagged: &Tagged) -> f64 {
    match &tagged.node {
        TaggedNode::Const(c) => *c,
        // A Const-tagged subtree cannot reference variables.
        TaggedNode::Var(_) => f64::NAN,
        TaggedNode::Call(op, children) => {
            let args: Vec<f64> = children.iter().map(eval_const).collect();
            op.apply(&args)
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::var(1)
    }

    fn y() -> Expr {
        Expr::var(2)
    }

    #[test]
    fn leaves() {
        assert_eq!(analyze(&Expr::Const(3.0)).tag, Linearity::Const);
        assert_eq!(analyze(&x()).tag, Linearity::Linear);
    }

    #[test]
    fn addition_takes_strongest_child() {
        let e = Expr::binary(Op::Add, x(), Expr::Const(1.0));
        assert_eq!(analyze(&e).tag, Linearity::Linear);

        let e = Expr::binary(Op::Add, x(), Expr::unary(Op::Sin, y()));
        assert_eq!(analyze(&e).tag, Linearity::Nonlinear);
    }

    #[test]
    fn product_of_constant_and_variable_is_linear() {
        let e = Expr::binary(Op::Mul, Expr::Const(2.0), x());
        assert_eq!(analyze(&e).tag, Linearity::Linear);
    }

    #[test]
    fn product_of_two_variables_is_nonlinear() {
        let e = Expr::binary(Op::Mul, x(), y());
        assert_eq!(analyze(&e).tag, Linearity::Nonlinear);
    }

    #[test]
    fn division_by_constant_keeps_class() {
        let e = Expr::binary(Op::Div, x(), Expr::Const(4.0));
        assert_eq!(analyze(&e).tag, Linearity::Linear);

        let e = Expr::binary(Op::Div, Expr::Const(4.0), x());
        assert_eq!(analyze(&e).tag, Linearity::Nonlinear);
    }

    #[test]
    fn transcendental_of_constant_is_constant() {
        let e = Expr::unary(Op::Exp, Expr::Const(0.0));
        assert_eq!(analyze(&e).tag, Linearity::Const);

        let e = Expr::unary(Op::Exp, x());
        assert_eq!(analyze(&e).tag, Linearity::Nonlinear);
    }

    #[test]
    fn negation_is_transparent() {
        let e = Expr::unary(Op::Neg, x());
        assert_eq!(analyze(&e).tag, Linearity::Linear);
        let e = Expr::unary(Op::Neg, Expr::Const(1.0));
        assert_eq!(analyze(&e).tag, Linearity::Const);
    }

    #[test]
    fn pull_up_folds_constant_subtrees() {
        // x + (2 * 3 + 1)  ->  x + 7
        let e = Expr::binary(
            Op::Add,
            x(),
            Expr::binary(
                Op::Add,
                Expr::binary(Op::Mul, Expr::Const(2.0), Expr::Const(3.0)),
                Expr::Const(1.0),
            ),
        );
        let folded = pull_up_constants(analyze(&e)).into_expr();
        assert_eq!(
            folded,
            Expr::Call(Op::Add, vec![x(), Expr::Const(7.0)])
        );
    }

    #[test]
    fn pull_up_folds_inside_nonlinear_context() {
        // sin(2 + 3) * x  ->  Const(sin(5)) * x, folded at the sin node.
        let e = Expr::binary(
            Op::Mul,
            Expr::unary(Op::Sin, Expr::binary(Op::Add, Expr::Const(2.0), Expr::Const(3.0))),
            x(),
        );
        let folded = pull_up_constants(analyze(&e)).into_expr();
        assert_eq!(
            folded,
            Expr::Call(Op::Mul, vec![Expr::Const(5.0_f64.sin()), x()])
        );
    }
}
