use std::fmt;

use serde::{Deserialize, Serialize};

use crate::LineId;


/// Errors raised by malformed gates
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// A Toffoli gate referenced the same line in two of its three positions
    #[error("Line {0} used more than once by the same gate")]
    RepeatedLine(LineId),
}
pub type GateError = Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateType {
    Not,
    Toffoli,
}

impl GateType {
    pub const fn name(&self) -> &'static str {
        match self {
            GateType::Not => "x",
            GateType::Toffoli => "ccx",
        }
    }
}

/// Elementary reversible gate. Both variants are involutions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "gate", rename_all = "snake_case")]
pub enum Gate {
    Not {
        target: LineId,
    },
    Toffoli {
        ctrl_a: LineId,
        ctrl_b: LineId,
        target: LineId,
    },
}

impl Gate {
    pub fn not(target: LineId) -> Self {
        Gate::Not { target }
    }

    pub fn toffoli(ctrl_a: LineId, ctrl_b: LineId, target: LineId) -> Self {
        Gate::Toffoli {
            ctrl_a,
            ctrl_b,
            target,
        }
    }

    pub fn gate_type(&self) -> GateType {
        match self {
            Gate::Not { .. } => GateType::Not,
            Gate::Toffoli { .. } => GateType::Toffoli,
        }
    }

    pub fn target(&self) -> LineId {
        match *self {
            Gate::Not { target } | Gate::Toffoli { target, .. } => target,
        }
    }

    /// Lines in `[controls.., target]` order
    pub fn lines(&self) -> Vec<LineId> {
        match *self {
            Gate::Not { target } => vec![target],
            Gate::Toffoli {
                ctrl_a,
                ctrl_b,
                target,
            } => vec![ctrl_a, ctrl_b, target],
        }
    }

    pub fn max_line(&self) -> LineId {
        match *self {
            Gate::Not { target } => target,
            Gate::Toffoli {
                ctrl_a,
                ctrl_b,
                target,
            } => ctrl_a.max(ctrl_b).max(target),
        }
    }

    pub fn validate(&self) -> Result<(), GateError> {
        if let Gate::Toffoli {
            ctrl_a,
            ctrl_b,
            target,
        } = *self
        {
            if ctrl_a == ctrl_b || ctrl_a == target {
                return Err(GateError::RepeatedLine(ctrl_a));
            }
            if ctrl_b == target {
                return Err(GateError::RepeatedLine(ctrl_b));
            }
        }
        Ok(())
    }

    /// Rewrites every line through `map`. Used to splice a block's local
    /// slots onto the global lines of a larger circuit.
    pub fn remap(&self, map: impl Fn(LineId) -> LineId) -> Self {
        match *self {
            Gate::Not { target } => Gate::Not {
                target: map(target),
            },
            Gate::Toffoli {
                ctrl_a,
                ctrl_b,
                target,
            } => Gate::Toffoli {
                ctrl_a: map(ctrl_a),
                ctrl_b: map(ctrl_b),
                target: map(target),
            },
        }
    }

    /// Every primitive here is self-inverse
    pub fn inverse(&self) -> Self {
        *self
    }

    /// Whether the target bit flips, given the current value of each line
    pub fn flips(&self, value: impl Fn(LineId) -> bool) -> bool {
        match *self {
            Gate::Not { .. } => true,
            Gate::Toffoli { ctrl_a, ctrl_b, .. } => value(ctrl_a) && value(ctrl_b),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gate_type().name())?;
        for line in self.lines() {
            write!(f, " {line}")?;
        }
        Ok(())
    }
}
