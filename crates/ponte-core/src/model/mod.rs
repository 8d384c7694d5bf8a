//! The model aggregate.
//!
//! A [`Model`] owns every artifact of the bridge pipeline: user bounds,
//! decomposed linear maps and nonlinear residuals, per-context linearity
//! tags, the NL index permutations, and, after a solve, the solution and
//! status fields. It is populated by one of the `load_*` methods, finalized
//! by the solver right before serialization, and read-only afterwards.

mod error;
mod load;

pub use error::ModelError;

use crate::order::IndexMapper;
use crate::types::{BoundCode, Sense, VarCategory, VarLinearity};
use ponte_expr::{Expr, LinearMap, Linearity};
use ponte_solver::SolveStatus;

/// Aggregate state of one optimization problem.
#[derive(Debug, Clone)]
pub struct Model {
    pub nvar: usize,
    pub ncon: usize,

    /// Variable bounds.
    pub x_l: Vec<f64>,
    pub x_u: Vec<f64>,
    /// Constraint bounds, already shifted by the decomposition constants.
    pub g_l: Vec<f64>,
    pub g_u: Vec<f64>,
    /// Relation code per constraint.
    pub r_codes: Vec<BoundCode>,
    /// Number of constraints listing each variable in their linear part.
    pub j_counts: Vec<usize>,

    /// Linear part of each constraint.
    pub lin_constrs: Vec<LinearMap>,
    /// Linear part of the objective.
    pub lin_obj: LinearMap,
    /// Nonlinear residual of each constraint (scalar 0 when linear).
    pub constrs: Vec<Expr>,
    /// Nonlinear residual of the objective, if any.
    pub obj: Option<Expr>,
    /// Constant pulled out of the objective, re-added at reconstitution.
    pub obj_constant: f64,

    /// Per-variable linearity in the two NL ordering contexts.
    pub var_linearities: Vec<VarLinearity>,
    /// Per-constraint linearity.
    pub con_linearities: Vec<Linearity>,
    /// Objective linearity.
    pub obj_linearity: Linearity,
    /// Variable categories.
    pub var_categories: Vec<VarCategory>,

    pub sense: Sense,
    /// Warm-start vector (zeros unless the caller set one).
    pub x_0: Vec<f64>,

    /// Index permutations, built by [`Model::finalize`].
    pub mapper: Option<IndexMapper>,

    // Solve results.
    pub solution: Vec<f64>,
    pub objval: f64,
    pub status: SolveStatus,
    pub solve_result_num: i64,
    pub solve_result: String,
    pub solve_message: String,
    pub solve_exitcode: i32,
}

impl Model {
    /// Create an empty model; use a `load_*` method to populate it.
    pub fn new() -> Self {
        Self {
            nvar: 0,
            ncon: 0,
            x_l: Vec::new(),
            x_u: Vec::new(),
            g_l: Vec::new(),
            g_u: Vec::new(),
            r_codes: Vec::new(),
            j_counts: Vec::new(),
            lin_constrs: Vec::new(),
            lin_obj: LinearMap::new(),
            constrs: Vec::new(),
            obj: None,
            obj_constant: 0.0,
            var_linearities: Vec::new(),
            con_linearities: Vec::new(),
            obj_linearity: Linearity::Linear,
            var_categories: Vec::new(),
            sense: Sense::Minimize,
            x_0: Vec::new(),
            mapper: None,
            solution: Vec::new(),
            objval: f64::NAN,
            status: SolveStatus::NotSolved,
            solve_result_num: -1,
            solve_result: "?".to_string(),
            solve_message: String::new(),
            solve_exitcode: -1,
        }
    }

    /// Current solve status.
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Primal solution in user variable order.
    pub fn solution(&self) -> &[f64] {
        &self.solution
    }

    /// Reconstituted objective value (`NaN` before a successful solve).
    pub fn objective_value(&self) -> f64 {
        self.objval
    }

    /// Number of variables tagged nonlinear in either context.
    pub fn num_nonlinear_vars(&self) -> usize {
        self.var_linearities
            .iter()
            .filter(|lin| lin.is_nonlinear())
            .count()
    }

    /// Number of constraints with a nonlinear residual.
    pub fn num_nonlinear_cons(&self) -> usize {
        self.con_linearities
            .iter()
            .filter(|lin| **lin == Linearity::Nonlinear)
            .count()
    }

    /// Compute Jacobian counts and the NL index permutations.
    ///
    /// Idempotent; called by the solver before writing the NL file.
    pub fn finalize(&mut self) -> &IndexMapper {
        let mut j_counts = vec![0usize; self.nvar];
        for linear in &self.lin_constrs {
            for id in linear.keys() {
                j_counts[id.position()] += 1;
            }
        }
        self.j_counts = j_counts;

        let mapper = IndexMapper::build(
            &self.var_categories,
            &self.var_linearities,
            &self.con_linearities,
        );

        tracing::debug!(
            component = "model",
            operation = "finalize",
            status = "success",
            nvar = self.nvar,
            ncon = self.ncon,
            nonlinear_vars = self.num_nonlinear_vars(),
            nonlinear_cons = self.num_nonlinear_cons(),
            jacobian_nonzeros = self.j_counts.iter().sum::<usize>(),
            "Finalized model for NL serialization"
        );

        self.mapper.insert(mapper)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use ponte_expr::VariableId;

    #[test]
    fn new_model_is_empty() {
        let model = Model::new();
        assert_eq!(model.nvar, 0);
        assert_eq!(model.ncon, 0);
        assert_eq!(model.status(), SolveStatus::NotSolved);
        assert!(model.objective_value().is_nan());
        assert_eq!(model.solve_result, "?");
        assert_eq!(model.solve_result_num, -1);
    }

    #[test]
    fn finalize_counts_jacobian_entries() {
        let mut model = Model::new();
        model.nvar = 3;
        model.ncon = 2;
        model.var_categories = vec![VarCategory::Continuous; 3];
        model.var_linearities = vec![VarLinearity::linear(); 3];
        model.con_linearities = vec![Linearity::Linear; 2];

        let mut row0 = LinearMap::new();
        row0.insert(VariableId::new(1), 1.0);
        row0.insert(VariableId::new(2), 2.0);
        let mut row1 = LinearMap::new();
        row1.insert(VariableId::new(2), -1.0);
        model.lin_constrs = vec![row0, row1];

        model.finalize();
        assert_eq!(model.j_counts, vec![1, 2, 0]);
        assert!(model.mapper.is_some());
    }

    #[test]
    fn jacobian_counts_match_map_membership() {
        // j_counts[j] must equal the number of constraint maps containing j,
        // including entries kept with a zero coefficient.
        let mut model = Model::new();
        model.nvar = 2;
        model.ncon = 2;
        model.var_categories = vec![VarCategory::Continuous; 2];
        model.var_linearities = vec![VarLinearity::linear(); 2];
        model.con_linearities = vec![Linearity::Linear; 2];

        let mut row0 = LinearMap::new();
        row0.insert(VariableId::new(1), 0.0);
        let mut row1 = LinearMap::new();
        row1.insert(VariableId::new(1), 3.0);
        model.lin_constrs = vec![row0, row1];

        model.finalize();
        assert_eq!(model.j_counts, vec![2, 0]);
    }
}
