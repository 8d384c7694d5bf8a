use ponte_expr::Linearity;

/// Optimization sense
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

impl Sense {
    /// NL objective-sense code: 0 = minimize, 1 = maximize.
    pub fn nl_code(self) -> u8 {
        match self {
            Sense::Minimize => 0,
            Sense::Maximize => 1,
        }
    }
}

/// Bounds for a variable or constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Unbounded on both sides.
    pub fn free() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Shift both finite bounds by `offset`.
    pub fn shifted(self, offset: f64) -> Self {
        let lower = if self.lower.is_finite() {
            self.lower + offset
        } else {
            self.lower
        };
        let upper = if self.upper.is_finite() {
            self.upper + offset
        } else {
            self.upper
        };
        Self::new(lower, upper)
    }
}

/// Category of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VarCategory {
    #[default]
    Continuous,
    Integer,
    Binary,
}

impl VarCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            VarCategory::Continuous => "continuous",
            VarCategory::Integer => "integer",
            VarCategory::Binary => "binary",
        }
    }

    /// Whether the variable is restricted to integral values.
    pub fn is_discrete(self) -> bool {
        !matches!(self, VarCategory::Continuous)
    }
}

/// Bound-shape code shared by the NL `r` and `b` segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundCode {
    /// `l <= x <= u`
    Range,
    /// `x <= u`
    Upper,
    /// `l <= x`
    Lower,
    /// Unbounded.
    Free,
    /// `x == c`
    Fixed,
}

impl BoundCode {
    /// The numeric code written to the NL file.
    pub fn code(self) -> u8 {
        match self {
            BoundCode::Range => 0,
            BoundCode::Upper => 1,
            BoundCode::Lower => 2,
            BoundCode::Free => 3,
            BoundCode::Fixed => 4,
        }
    }

    /// Classify a pair of bounds.
    pub fn of(bounds: Bounds) -> Self {
        match (bounds.lower.is_finite(), bounds.upper.is_finite()) {
            (true, true) if bounds.lower == bounds.upper => BoundCode::Fixed,
            (true, true) => BoundCode::Range,
            (false, true) => BoundCode::Upper,
            (true, false) => BoundCode::Lower,
            (false, false) => BoundCode::Free,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BoundCode::Range => "range",
            BoundCode::Upper => "upper",
            BoundCode::Lower => "lower",
            BoundCode::Free => "free",
            BoundCode::Fixed => "fixed",
        }
    }
}

/// Per-variable linearity in the two contexts the NL ordering cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarLinearity {
    /// Linearity across all constraints.
    pub in_constraints: Linearity,
    /// Linearity in the objective.
    pub in_objective: Linearity,
}

impl VarLinearity {
    pub fn linear() -> Self {
        Self {
            in_constraints: Linearity::Linear,
            in_objective: Linearity::Linear,
        }
    }

    /// Nonlinear in either context.
    pub fn is_nonlinear(self) -> bool {
        self.in_constraints == Linearity::Nonlinear || self.in_objective == Linearity::Nonlinear
    }
}
