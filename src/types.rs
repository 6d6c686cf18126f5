//! Small enums shared across the crate
use serde::{Deserialize, Serialize};

/// Spatial dimension of the problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum DomainSize {
    /// Triangles, velocity components x and y
    Two,
    /// Tetrahedra, velocity components x, y and z
    Three,
}

impl DomainSize {
    /// Number of spatial dimensions
    pub fn dim(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Number of nodes of the simplex element
    pub fn nodes_per_element(self) -> usize {
        self.dim() + 1
    }

    /// Share of the element measure lumped into each node
    /// (area / 3 for triangles, volume / 4 for tetrahedra)
    pub fn nodal_share(self) -> f64 {
        match self {
            Self::Two => 1. / 3.,
            Self::Three => 0.25,
        }
    }
}

impl Default for DomainSize {
    fn default() -> Self {
        Self::Two
    }
}

impl From<DomainSize> for usize {
    fn from(domain: DomainSize) -> usize {
        domain.dim()
    }
}

impl TryFrom<usize> for DomainSize {
    type Error = crate::Error;

    fn try_from(value: usize) -> crate::Result<Self> {
        match value {
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            _ => Err(crate::Error::config(
                "domain_size",
                value,
                "must be 2 or 3",
            )),
        }
    }
}

/// Time level of a nodal value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeLevel {
    /// Value of the step being solved
    Current,
    /// Converged value of the last step
    Previous,
}
