//! Upstream model source.

use ponte_expr::Expr;

/// Source of expression trees for a nonlinear problem.
///
/// The modeling layer sits behind this trait; the loader only needs the
/// objective tree and one comparison tree per constraint. Constraint
/// expressions arrive with their relation embedded (`rel(e, c)`,
/// `rel(c, e)`, or the three-child range `le(l, e, u)`) and the loader
/// extracts the bounds.
pub trait NlpProvider {
    /// Called once before any expression is requested.
    fn init_expr_graph(&mut self);

    /// Comparison tree of constraint `i` (1-based).
    fn constraint_expr(&self, i: usize) -> Expr;

    /// Objective expression tree.
    fn objective_expr(&self) -> Expr;
}
