use std::sync::Arc;

use crate::{Block, CircuitError, Gate, LineId};

/// A trait defining the context that reversible gates are appended to.
///
/// Both a full [`Circuit`](crate::Circuit) and a [`BlockBuilder`](crate::BlockBuilder)
/// implement it, so the same gadget code can either emit gates straight into
/// a circuit or be captured as a named, reusable block.
///
/// ## Usage Example
///
/// ```rust
/// use reversible_oracle::{Circuit, CircuitContext, Gate, LineId};
///
/// let mut circuit = Circuit::new(3);
/// circuit.add_gate(Gate::toffoli(LineId(0), LineId(1), LineId(2))).unwrap();
/// assert_eq!(circuit.gate_count(), 1);
/// ```
pub trait CircuitContext {
    /// Width of the line address space. Valid lines are `0..num_lines()`.
    fn num_lines(&self) -> usize;

    /// Appends a single primitive gate.
    ///
    /// Fails without mutating when the gate touches a line outside the
    /// address space or repeats a line.
    fn add_gate(&mut self, gate: Gate) -> Result<(), CircuitError>;

    /// Appends `block` onto `lines`, mapping local slot `i` to `lines[i]`.
    ///
    /// `lines` must hold exactly `block.width()` distinct, in-range lines.
    /// Nothing is appended when validation fails.
    fn append_block(&mut self, block: &Arc<Block>, lines: &[LineId]) -> Result<(), CircuitError>;
}
