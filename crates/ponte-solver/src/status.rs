//! Solve status classification.

/// Outcome of a solve attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// No solve has completed yet.
    NotSolved,
    /// Optimal solution found.
    Optimal,
    /// Problem is infeasible.
    Infeasible,
    /// Problem is unbounded.
    Unbounded,
    /// Solver stopped on a user-imposed limit.
    UserLimit,
    /// Solver failed.
    Error,
}

impl SolveStatus {
    /// Check if the status indicates an optimal solution.
    pub fn is_optimal(self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }

    /// Check if the status indicates infeasibility.
    pub fn is_infeasible(self) -> bool {
        matches!(self, SolveStatus::Infeasible)
    }

    /// Check if the status indicates unboundedness.
    pub fn is_unbounded(self) -> bool {
        matches!(self, SolveStatus::Unbounded)
    }

    /// Get a human-readable string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            SolveStatus::NotSolved => "not_solved",
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::UserLimit => "user_limit",
            SolveStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify an AMPL `solve_result_num` into a status and result string.
///
/// The hundreds band carries the meaning; [100, 200) is an optimal result
/// the solver itself is unsure about and callers should surface a warning.
/// Returns `None` outside [0, 600).
pub fn classify_result_num(num: i64) -> Option<(SolveStatus, &'static str)> {
    match num {
        0..=99 => Some((SolveStatus::Optimal, "solved")),
        100..=199 => Some((SolveStatus::Optimal, "solved?")),
        200..=299 => Some((SolveStatus::Infeasible, "infeasible")),
        300..=399 => Some((SolveStatus::Unbounded, "unbounded")),
        400..=499 => Some((SolveStatus::UserLimit, "limit")),
        500..=599 => Some((SolveStatus::Error, "failure")),
        _ => None,
    }
}

/// Last-resort classification from the solver's textual message.
///
/// Checked in order; the first matching substring wins.
pub fn classify_message(message: &str) -> Option<SolveStatus> {
    let lowered = message.to_lowercase();
    const PATTERNS: [(&str, SolveStatus); 5] = [
        ("optimal", SolveStatus::Optimal),
        ("infeasible", SolveStatus::Infeasible),
        ("unbounded", SolveStatus::Unbounded),
        ("limit", SolveStatus::UserLimit),
        ("error", SolveStatus::Error),
    ];
    PATTERNS
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map(|(_, status)| *status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_predicates() {
        assert!(SolveStatus::Optimal.is_optimal());
        assert!(!SolveStatus::Infeasible.is_optimal());
        assert!(SolveStatus::Infeasible.is_infeasible());
        assert!(SolveStatus::Unbounded.is_unbounded());
        assert!(!SolveStatus::NotSolved.is_optimal());
    }

    #[test]
    fn status_as_str() {
        assert_eq!(SolveStatus::Optimal.as_str(), "optimal");
        assert_eq!(SolveStatus::UserLimit.as_str(), "user_limit");
        assert_eq!(format!("{}", SolveStatus::Error), "error");
    }

    #[test]
    fn classification_covers_every_band() {
        // Total on [0, 600).
        for num in 0..600 {
            assert!(classify_result_num(num).is_some(), "num = {num}");
        }
        assert_eq!(classify_result_num(-1), None);
        assert_eq!(classify_result_num(600), None);
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(
            classify_result_num(0),
            Some((SolveStatus::Optimal, "solved"))
        );
        assert_eq!(
            classify_result_num(99),
            Some((SolveStatus::Optimal, "solved"))
        );
        assert_eq!(
            classify_result_num(100),
            Some((SolveStatus::Optimal, "solved?"))
        );
        assert_eq!(
            classify_result_num(200),
            Some((SolveStatus::Infeasible, "infeasible"))
        );
        assert_eq!(
            classify_result_num(300),
            Some((SolveStatus::Unbounded, "unbounded"))
        );
        assert_eq!(
            classify_result_num(400),
            Some((SolveStatus::UserLimit, "limit"))
        );
        assert_eq!(classify_result_num(599), Some((SolveStatus::Error, "failure")));
    }

    #[test]
    fn message_fallback_order() {
        assert_eq!(
            classify_message("Optimal Solution Found"),
            Some(SolveStatus::Optimal)
        );
        assert_eq!(
            classify_message("problem is INFEASIBLE"),
            Some(SolveStatus::Infeasible)
        );
        // "optimal" wins over later patterns when both appear.
        assert_eq!(
            classify_message("optimal within iteration limit"),
            Some(SolveStatus::Optimal)
        );
        assert_eq!(
            classify_message("time limit reached"),
            Some(SolveStatus::UserLimit)
        );
        assert_eq!(classify_message("restoration error"), Some(SolveStatus::Error));
        assert_eq!(classify_message("nothing to see"), None);
    }
}
