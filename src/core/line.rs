use std::{fmt, ops::Deref};

use serde::{Deserialize, Serialize};

/// Positional identity of one bit-line (qubit) inside a circuit or block.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LineId(pub usize);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for LineId {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<usize> for LineId {
    fn from(value: usize) -> Self {
        LineId(value)
    }
}

/// Convenience for building line lists out of plain indices.
pub fn lines<const N: usize>(indices: [usize; N]) -> [LineId; N] {
    indices.map(LineId)
}
