//! Constraint identity types.

use std::fmt;

/// Reference to a constraint for identification.
///
/// # Example
///
/// ```
/// use plansmith_core::ConstraintRef;
///
/// let cr = ConstraintRef::new("flights", "Flight conflict");
/// assert_eq!(cr.full_name(), "flights/Flight conflict");
///
/// let simple = ConstraintRef::new("", "Required skill");
/// assert_eq!(simple.full_name(), "Required skill");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintRef {
    /// Package/module containing the constraint.
    pub package: String,
    /// Name of the constraint.
    pub name: String,
}

impl ConstraintRef {
    /// Creates a new constraint reference.
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Returns the fully qualified name.
    pub fn full_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.package, self.name)
        }
    }
}

impl fmt::Display for ConstraintRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Type of impact a constraint has on the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImpactType {
    /// Penalize (subtract from score).
    Penalty,
    /// Reward (add to score).
    Reward,
}

impl ImpactType {
    /// Applies the sign of this impact to a positive contribution.
    pub fn apply<S: std::ops::Neg<Output = S>>(self, magnitude: S) -> S {
        match self {
            ImpactType::Penalty => -magnitude,
            ImpactType::Reward => magnitude,
        }
    }
}
