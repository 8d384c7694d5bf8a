//! Problem loading.
//!
//! Two entry points populate a [`Model`]: `load_nonlinear_problem` pulls
//! expression trees from an [`NlpProvider`] and runs the decomposition
//! pipeline on each, `load_linear_problem` ingests a dense matrix directly.

use crate::model::{Model, ModelError};
use crate::provider::NlpProvider;
use crate::types::{BoundCode, Bounds, Sense, VarCategory, VarLinearity};
use ponte_expr::{canonicalize, process_expression, Expr, LinearMap, Linearity, Op};

/// A constraint comparison tree reduced to its inner expression, bounds,
/// and relation code.
struct NormalizedConstraint {
    expr: Expr,
    bounds: Bounds,
    code: BoundCode,
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<(), ModelError> {
    if expected != found {
        return Err(ModelError::DimensionMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

/// Extract bounds and relation code from a constraint comparison tree.
///
/// Accepted heads are `<=`, `>=`, and `==` (two children, one side
/// constant), the three-child range `le(l, e, u)`, and the two-sided forms
/// `rel(a, b)` with neither side constant, which become `a - b rel 0`.
fn normalize_constraint(index: usize, raw: Expr) -> Result<NormalizedConstraint, ModelError> {
    let (op, mut children) = match raw {
        Expr::Call(op, children) if op.is_relation() => (op, children),
        _ => return Err(ModelError::ConstraintWithoutBounds { index }),
    };

    if children.len() == 3 {
        if op != Op::Le {
            return Err(ModelError::UnsupportedConstraint {
                index,
                reason: format!("three-child relation with head '{}'", op),
            });
        }
        let upper = children.pop();
        let expr = children.pop();
        let lower = children.pop();
        return match (lower, expr, upper) {
            (Some(Expr::Const(l)), Some(expr), Some(Expr::Const(u))) => Ok(NormalizedConstraint {
                expr,
                bounds: Bounds::new(l, u),
                code: BoundCode::Range,
            }),
            _ => Err(ModelError::UnsupportedConstraint {
                index,
                reason: "range bounds must be constants".to_string(),
            }),
        };
    }

    let rhs = children.pop();
    let lhs = children.pop();
    let (lhs, rhs) = match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => (lhs, rhs),
        _ => {
            return Err(ModelError::UnsupportedConstraint {
                index,
                reason: "relation needs two operands".to_string(),
            });
        }
    };

    let normalized = match op {
        Op::Le => match (lhs, rhs) {
            (expr, Expr::Const(u)) => NormalizedConstraint {
                expr,
                bounds: Bounds::new(f64::NEG_INFINITY, u),
                code: BoundCode::Upper,
            },
            (Expr::Const(l), expr) => NormalizedConstraint {
                expr,
                bounds: Bounds::new(l, f64::INFINITY),
                code: BoundCode::Lower,
            },
            (lhs, rhs) => NormalizedConstraint {
                expr: Expr::binary(Op::Sub, lhs, rhs),
                bounds: Bounds::new(f64::NEG_INFINITY, 0.0),
                code: BoundCode::Upper,
            },
        },
        Op::Ge => match (lhs, rhs) {
            (expr, Expr::Const(l)) => NormalizedConstraint {
                expr,
                bounds: Bounds::new(l, f64::INFINITY),
                code: BoundCode::Lower,
            },
            (Expr::Const(u), expr) => NormalizedConstraint {
                expr,
                bounds: Bounds::new(f64::NEG_INFINITY, u),
                code: BoundCode::Upper,
            },
            (lhs, rhs) => NormalizedConstraint {
                expr: Expr::binary(Op::Sub, lhs, rhs),
                bounds: Bounds::new(0.0, f64::INFINITY),
                code: BoundCode::Lower,
            },
        },
        Op::Eq => match (lhs, rhs) {
            (expr, Expr::Const(c)) | (Expr::Const(c), expr) => NormalizedConstraint {
                expr,
                bounds: Bounds::new(c, c),
                code: BoundCode::Fixed,
            },
            (lhs, rhs) => NormalizedConstraint {
                expr: Expr::binary(Op::Sub, lhs, rhs),
                bounds: Bounds::new(0.0, 0.0),
                code: BoundCode::Fixed,
            },
        },
        _ => {
            return Err(ModelError::UnsupportedConstraint {
                index,
                reason: format!("strict relation '{}' is not representable", op),
            });
        }
    };
    Ok(normalized)
}

impl Model {
    fn reset(&mut self, nvar: usize, ncon: usize, sense: Sense) {
        *self = Model::new();
        self.nvar = nvar;
        self.ncon = ncon;
        self.sense = sense;
        self.var_categories = vec![VarCategory::Continuous; nvar];
        self.var_linearities = vec![VarLinearity::linear(); nvar];
        self.con_linearities = vec![Linearity::Linear; ncon];
        self.constrs = vec![Expr::Const(0.0); ncon];
        self.lin_constrs = vec![LinearMap::new(); ncon];
        self.r_codes = vec![BoundCode::Free; ncon];
        self.g_l = vec![f64::NEG_INFINITY; ncon];
        self.g_u = vec![f64::INFINITY; ncon];
        self.x_0 = vec![0.0; nvar];
        self.solution = vec![0.0; nvar];
    }

    fn set_variable_bounds(&mut self, x_l: &[f64], x_u: &[f64]) -> Result<(), ModelError> {
        for (index, (lower, upper)) in x_l.iter().zip(x_u).enumerate() {
            if lower > upper {
                return Err(ModelError::InvalidVariableBounds {
                    index: index + 1,
                    lower: *lower,
                    upper: *upper,
                });
            }
        }
        self.x_l = x_l.to_vec();
        self.x_u = x_u.to_vec();
        Ok(())
    }

    /// Load a nonlinear program from an expression provider.
    ///
    /// Each constraint tree is normalized (bounds and relation extracted),
    /// decomposed into linear coefficients plus a nonlinear residual, and
    /// its bounds shifted by the pulled-out constant. The objective gets
    /// the same treatment; its constant is re-added at reconstitution.
    #[allow(clippy::too_many_arguments)]
    pub fn load_nonlinear_problem<P: NlpProvider>(
        &mut self,
        nvar: usize,
        ncon: usize,
        x_l: &[f64],
        x_u: &[f64],
        g_l: &[f64],
        g_u: &[f64],
        sense: Sense,
        provider: &mut P,
    ) -> Result<(), ModelError> {
        check_len("x_l", nvar, x_l.len())?;
        check_len("x_u", nvar, x_u.len())?;
        check_len("g_l", ncon, g_l.len())?;
        check_len("g_u", ncon, g_u.len())?;

        self.reset(nvar, ncon, sense);
        self.set_variable_bounds(x_l, x_u)?;
        self.g_l = g_l.to_vec();
        self.g_u = g_u.to_vec();

        provider.init_expr_graph();

        for i in 0..ncon {
            let raw = provider.constraint_expr(i + 1);
            raw.validate(nvar)?;
            let normalized = normalize_constraint(i, raw)?;

            let mut linear = LinearMap::new();
            let decomposed = process_expression(&normalized.expr, &mut linear);
            let bounds = normalized.bounds.shifted(-decomposed.constant);

            self.g_l[i] = bounds.lower;
            self.g_u[i] = bounds.upper;
            self.r_codes[i] = normalized.code;
            self.con_linearities[i] = decomposed.linearity;
            for id in &decomposed.nonlinear_vars {
                self.var_linearities[id.position()].in_constraints = Linearity::Nonlinear;
            }
            self.constrs[i] = canonicalize(decomposed.residual);
            self.lin_constrs[i] = linear;
        }

        let raw_obj = provider.objective_expr();
        raw_obj.validate(nvar)?;
        let mut linear = LinearMap::new();
        let decomposed = process_expression(&raw_obj, &mut linear);
        self.obj_constant = decomposed.constant;
        self.obj_linearity = decomposed.linearity;
        for id in &decomposed.nonlinear_vars {
            self.var_linearities[id.position()].in_objective = Linearity::Nonlinear;
        }
        self.obj = if decomposed.residual.is_zero() {
            None
        } else {
            Some(canonicalize(decomposed.residual))
        };
        self.lin_obj = linear;

        tracing::debug!(
            component = "model",
            operation = "load_nonlinear_problem",
            status = "success",
            nvar = nvar,
            ncon = ncon,
            nonlinear_cons = self.num_nonlinear_cons(),
            nonlinear_vars = self.num_nonlinear_vars(),
            obj_linearity = self.obj_linearity.as_str(),
            "Loaded nonlinear problem"
        );
        Ok(())
    }

    /// Load a linear program from a dense constraint matrix.
    ///
    /// `a` is row-major, one row per constraint; only nonzero entries are
    /// kept. Constraint relation codes come straight from the bound pair;
    /// a constraint with neither bound is rejected.
    pub fn load_linear_problem(
        &mut self,
        a: &[Vec<f64>],
        x_l: &[f64],
        x_u: &[f64],
        c: &[f64],
        g_l: &[f64],
        g_u: &[f64],
        sense: Sense,
    ) -> Result<(), ModelError> {
        let nvar = c.len();
        let ncon = a.len();
        check_len("x_l", nvar, x_l.len())?;
        check_len("x_u", nvar, x_u.len())?;
        check_len("g_l", ncon, g_l.len())?;
        check_len("g_u", ncon, g_u.len())?;
        for (i, row) in a.iter().enumerate() {
            if row.len() != nvar {
                return Err(ModelError::DimensionMismatch {
                    what: "A row",
                    expected: nvar,
                    found: row.len(),
                });
            }
            let code = BoundCode::of(Bounds::new(g_l[i], g_u[i]));
            if code == BoundCode::Free {
                return Err(ModelError::ConstraintWithoutBounds { index: i });
            }
        }

        self.reset(nvar, ncon, sense);
        self.set_variable_bounds(x_l, x_u)?;
        self.g_l = g_l.to_vec();
        self.g_u = g_u.to_vec();

        for (i, row) in a.iter().enumerate() {
            self.r_codes[i] = BoundCode::of(Bounds::new(g_l[i], g_u[i]));
            let mut linear = LinearMap::new();
            for (position, coeff) in row.iter().enumerate() {
                if *coeff != 0.0 {
                    linear.insert(ponte_expr::VariableId::new(position as u32 + 1), *coeff);
                }
            }
            self.lin_constrs[i] = linear;
        }

        let mut lin_obj = LinearMap::new();
        for (position, coeff) in c.iter().enumerate() {
            if *coeff != 0.0 {
                lin_obj.insert(ponte_expr::VariableId::new(position as u32 + 1), *coeff);
            }
        }
        self.lin_obj = lin_obj;

        tracing::debug!(
            component = "model",
            operation = "load_linear_problem",
            status = "success",
            nvar = nvar,
            ncon = ncon,
            nonzeros = self
                .lin_constrs
                .iter()
                .map(|linear| linear.len())
                .sum::<usize>(),
            "Loaded linear problem"
        );
        Ok(())
    }

    /// Assign variable categories; the vector must cover every variable.
    pub fn set_var_types(&mut self, categories: &[VarCategory]) -> Result<(), ModelError> {
        check_len("categories", self.nvar, categories.len())?;
        self.var_categories = categories.to_vec();
        Ok(())
    }

    /// Install a warm-start vector (the default is all zeros).
    pub fn set_warm_start(&mut self, x_0: &[f64]) -> Result<(), ModelError> {
        check_len("x_0", self.nvar, x_0.len())?;
        self.x_0 = x_0.to_vec();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use ponte_solver::SolveStatus;

    const INF: f64 = f64::INFINITY;

    /// min x1^2 + x2  s.t.  x1 + x2 == 1,  x1*x2 <= 4
    struct SampleNlp;

    impl NlpProvider for SampleNlp {
        fn init_expr_graph(&mut self) {}

        fn constraint_expr(&self, i: usize) -> Expr {
            match i {
                1 => Expr::binary(
                    Op::Eq,
                    Expr::binary(Op::Add, Expr::var(1), Expr::var(2)),
                    Expr::Const(1.0),
                ),
                _ => Expr::binary(
                    Op::Le,
                    Expr::binary(Op::Mul, Expr::var(1), Expr::var(2)),
                    Expr::Const(4.0),
                ),
            }
        }

        fn objective_expr(&self) -> Expr {
            Expr::binary(
                Op::Add,
                Expr::binary(Op::Pow, Expr::var(1), Expr::Const(2.0)),
                Expr::var(2),
            )
        }
    }

    fn load_sample() -> Model {
        let mut model = Model::new();
        model
            .load_nonlinear_problem(
                2,
                2,
                &[-INF, -INF],
                &[INF, INF],
                &[-INF, -INF],
                &[INF, INF],
                Sense::Minimize,
                &mut SampleNlp,
            )
            .unwrap();
        model
    }

    #[test]
    fn nonlinear_load_extracts_relations() {
        let model = load_sample();
        assert_eq!(model.r_codes[0], BoundCode::Fixed);
        assert_eq!(model.g_l[0], 1.0);
        assert_eq!(model.g_u[0], 1.0);
        assert_eq!(model.r_codes[1], BoundCode::Upper);
        assert_eq!(model.g_u[1], 4.0);
    }

    #[test]
    fn nonlinear_load_tags_linearities() {
        let model = load_sample();
        assert_eq!(model.con_linearities[0], Linearity::Linear);
        assert_eq!(model.con_linearities[1], Linearity::Nonlinear);
        assert_eq!(model.obj_linearity, Linearity::Nonlinear);
        // x1 is nonlinear in both contexts, x2 only in constraint 2.
        assert!(model.var_linearities[0].is_nonlinear());
        assert_eq!(model.var_linearities[0].in_objective, Linearity::Nonlinear);
        assert_eq!(model.var_linearities[1].in_objective, Linearity::Linear);
        assert_eq!(
            model.var_linearities[1].in_constraints,
            Linearity::Nonlinear
        );
    }

    #[test]
    fn nonlinear_load_splits_linear_parts() {
        let model = load_sample();
        // Constraint 1 is affine: both coefficients 1, residual zero.
        let row = &model.lin_constrs[0];
        assert_eq!(row.get(&ponte_expr::VariableId::new(1)), Some(&1.0));
        assert_eq!(row.get(&ponte_expr::VariableId::new(2)), Some(&1.0));
        assert!(model.constrs[0].is_zero());
        // Objective keeps x2 linearly, x1 only in the residual.
        assert_eq!(model.lin_obj.get(&ponte_expr::VariableId::new(2)), Some(&1.0));
        assert_eq!(model.lin_obj.get(&ponte_expr::VariableId::new(1)), Some(&0.0));
        assert!(model.obj.is_some());
    }

    #[test]
    fn constant_in_constraint_shifts_bounds() {
        // x1 + 3 <= 10  =>  x1 <= 7
        struct Shifted;
        impl NlpProvider for Shifted {
            fn init_expr_graph(&mut self) {}
            fn constraint_expr(&self, _i: usize) -> Expr {
                Expr::binary(
                    Op::Le,
                    Expr::binary(Op::Add, Expr::var(1), Expr::Const(3.0)),
                    Expr::Const(10.0),
                )
            }
            fn objective_expr(&self) -> Expr {
                Expr::var(1)
            }
        }
        let mut model = Model::new();
        model
            .load_nonlinear_problem(
                1,
                1,
                &[0.0],
                &[INF],
                &[-INF],
                &[INF],
                Sense::Minimize,
                &mut Shifted,
            )
            .unwrap();
        assert_eq!(model.g_u[0], 7.0);
        assert_eq!(model.r_codes[0], BoundCode::Upper);
    }

    #[test]
    fn range_constraint_extracts_both_bounds() {
        struct Ranged;
        impl NlpProvider for Ranged {
            fn init_expr_graph(&mut self) {}
            fn constraint_expr(&self, _i: usize) -> Expr {
                Expr::Call(
                    Op::Le,
                    vec![Expr::Const(-1.0), Expr::var(1), Expr::Const(2.0)],
                )
            }
            fn objective_expr(&self) -> Expr {
                Expr::var(1)
            }
        }
        let mut model = Model::new();
        model
            .load_nonlinear_problem(
                1,
                1,
                &[-INF],
                &[INF],
                &[-INF],
                &[INF],
                Sense::Minimize,
                &mut Ranged,
            )
            .unwrap();
        assert_eq!(model.r_codes[0], BoundCode::Range);
        assert_eq!(model.g_l[0], -1.0);
        assert_eq!(model.g_u[0], 2.0);
    }

    #[test]
    fn constraint_without_relation_is_rejected() {
        struct Bare;
        impl NlpProvider for Bare {
            fn init_expr_graph(&mut self) {}
            fn constraint_expr(&self, _i: usize) -> Expr {
                Expr::var(1)
            }
            fn objective_expr(&self) -> Expr {
                Expr::var(1)
            }
        }
        let mut model = Model::new();
        let err = model
            .load_nonlinear_problem(
                1,
                1,
                &[0.0],
                &[1.0],
                &[-INF],
                &[INF],
                Sense::Minimize,
                &mut Bare,
            )
            .unwrap_err();
        assert_eq!(err.code(), "CONSTRAINT_WITHOUT_BOUNDS");
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let mut model = Model::new();
        let err = model
            .load_nonlinear_problem(
                2,
                0,
                &[0.0],
                &[1.0, 1.0],
                &[],
                &[],
                Sense::Minimize,
                &mut SampleNlp,
            )
            .unwrap_err();
        assert_eq!(err.code(), "MODEL_DIMENSION_MISMATCH");
    }

    #[test]
    fn linear_load_keeps_only_nonzeros() {
        let mut model = Model::new();
        model
            .load_linear_problem(
                &[vec![1.0, 0.0], vec![2.0, -3.0]],
                &[0.0, 0.0],
                &[INF, INF],
                &[2.0, 0.0],
                &[1.0, -INF],
                &[INF, 5.0],
                Sense::Minimize,
            )
            .unwrap();
        assert_eq!(model.lin_constrs[0].len(), 1);
        assert_eq!(model.lin_constrs[1].len(), 2);
        assert_eq!(model.lin_obj.len(), 1);
        assert_eq!(model.r_codes[0], BoundCode::Lower);
        assert_eq!(model.r_codes[1], BoundCode::Upper);
        assert_eq!(model.status(), SolveStatus::NotSolved);
    }

    #[test]
    fn linear_load_rejects_free_constraint() {
        let mut model = Model::new();
        let err = model
            .load_linear_problem(
                &[vec![1.0]],
                &[0.0],
                &[1.0],
                &[1.0],
                &[-INF],
                &[INF],
                Sense::Minimize,
            )
            .unwrap_err();
        assert_eq!(err.code(), "CONSTRAINT_WITHOUT_BOUNDS");
    }

    #[test]
    fn var_types_and_warm_start_validate_length() {
        let mut model = Model::new();
        model
            .load_linear_problem(
                &[vec![1.0, 1.0]],
                &[0.0, 0.0],
                &[1.0, 1.0],
                &[1.0, 1.0],
                &[1.0],
                &[INF],
                Sense::Minimize,
            )
            .unwrap();
        assert!(model.set_var_types(&[VarCategory::Binary]).is_err());
        assert!(model
            .set_var_types(&[VarCategory::Binary, VarCategory::Continuous])
            .is_ok());
        assert!(model.set_warm_start(&[1.0]).is_err());
        assert!(model.set_warm_start(&[1.0, 0.5]).is_ok());
        assert_eq!(model.x_0, vec![1.0, 0.5]);
    }

    #[test]
    fn inverted_variable_bounds_are_rejected() {
        let mut model = Model::new();
        let err = model
            .load_linear_problem(
                &[vec![1.0]],
                &[2.0],
                &[1.0],
                &[1.0],
                &[0.0],
                &[INF],
                Sense::Minimize,
            )
            .unwrap_err();
        assert_eq!(err.code(), "VARIABLE_INVALID_BOUNDS");
    }
}
