use serde::{Deserialize, Serialize};
use std::fmt;

/// Candidate board number, 1-based (`NB1`, `NB2`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BoardId(pub usize);

impl BoardId {
    /// Board id for a 0-based position in the input list.
    pub fn from_index(index: usize) -> Self {
        Self(index + 1)
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NB{}", self.0)
    }
}

/// Unit (device under test) number, 1-based (`U1`, `U2`, ...).
///
/// Candidate unit `Un` of every board is compared against reference unit `Un`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub usize);

impl UnitId {
    pub fn from_index(index: usize) -> Self {
        Self(index + 1)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_one_based() {
        assert_eq!(BoardId::from_index(0).to_string(), "NB1");
        assert_eq!(UnitId::from_index(2).to_string(), "U3");
        assert_eq!(UnitId(3), UnitId::from_index(2));
    }
}
