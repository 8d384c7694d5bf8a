//! Model error types.

use ponte_expr::ExprError;

/// Errors raised while loading or finalizing a problem.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A provided vector disagrees with the declared dimensions.
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// Variable bounds are inverted.
    InvalidVariableBounds { index: usize, lower: f64, upper: f64 },
    /// A constraint ended up with neither a lower nor an upper bound.
    ConstraintWithoutBounds { index: usize },
    /// A constraint expression has a shape the bridge cannot normalize.
    UnsupportedConstraint { index: usize, reason: String },
    /// An expression failed structural validation.
    Expr(ExprError),
}

impl ModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::DimensionMismatch { .. } => "MODEL_DIMENSION_MISMATCH",
            ModelError::InvalidVariableBounds { .. } => "VARIABLE_INVALID_BOUNDS",
            ModelError::ConstraintWithoutBounds { .. } => "CONSTRAINT_WITHOUT_BOUNDS",
            ModelError::UnsupportedConstraint { .. } => "CONSTRAINT_UNSUPPORTED",
            ModelError::Expr(err) => err.code(),
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::DimensionMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "[{}] {} has length {}, expected {}",
                self.code(),
                what,
                found,
                expected
            ),
            ModelError::InvalidVariableBounds {
                index,
                lower,
                upper,
            } => write!(
                f,
                "[{}] Variable {} bounds invalid: lower ({}) > upper ({})",
                self.code(),
                index,
                lower,
                upper
            ),
            ModelError::ConstraintWithoutBounds { index } => write!(
                f,
                "[{}] Constraint {} has neither a lower nor an upper bound",
                self.code(),
                index
            ),
            ModelError::UnsupportedConstraint { index, reason } => write!(
                f,
                "[{}] Constraint {} cannot be normalized: {}",
                self.code(),
                index,
                reason
            ),
            ModelError::Expr(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ModelError {}

impl From<ExprError> for ModelError {
    fn from(err: ExprError) -> Self {
        ModelError::Expr(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_error_code() {
        let err = ModelError::DimensionMismatch {
            what: "x_l",
            expected: 3,
            found: 2,
        };
        assert!(err.to_string().starts_with("[MODEL_DIMENSION_MISMATCH]"));
        assert!(err.to_string().contains("x_l"));

        let err = ModelError::ConstraintWithoutBounds { index: 4 };
        assert!(err.to_string().contains("Constraint 4"));
    }

    #[test]
    fn expr_errors_keep_their_code() {
        let err = ModelError::from(ExprError::VariableOutOfRange { index: 5, nvar: 2 });
        assert_eq!(err.code(), "EXPR_VARIABLE_OUT_OF_RANGE");
    }
}
