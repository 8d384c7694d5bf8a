//! Variable identifiers.
//!
//! Variable indices are 1-based on the user side (the first variable a
//! provider hands out is `VariableId::new(1)`); the NL wire uses 0-based
//! permuted positions, produced later by the index mapper.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct VariableId(u32);

impl VariableId {
    /// Create an ID from a 1-based index.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the 1-based index.
    pub fn inner(self) -> u32 {
        self.0
    }

    /// Get the 0-based position into dense per-variable vectors.
    pub fn position(self) -> usize {
        (self.0 as usize).saturating_sub(1)
    }
}

impl std::fmt::Display for VariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::VariableId;

    #[test]
    fn roundtrip_and_position() {
        let id = VariableId::new(7);
        assert_eq!(id.inner(), 7);
        assert_eq!(id.position(), 6);
    }

    #[test]
    fn display_uses_one_based_index() {
        assert_eq!(VariableId::new(3).to_string(), "x3");
    }
}
