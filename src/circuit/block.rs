use std::sync::Arc;

use log::trace;
use serde::Serialize;

use super::{
    CircuitContext, CircuitError, check_gate, check_lines,
    block_key::{BlockKey, generate_block_key},
};
use crate::{Gate, LineId};

const INVERSE_SUFFIX: &str = "_dg";

/// Immutable named sequence of gates over local slots `0..width`.
///
/// A block is built once and then spliced onto any set of `width` distinct
/// lines of a larger circuit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Block {
    name: String,
    width: usize,
    gates: Vec<Gate>,
}

impl Block {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    pub fn key(&self) -> BlockKey {
        generate_block_key(&self.name, self.width, &self.gates)
    }

    /// Reverses the gate order. Every primitive is self-inverse, so this is
    /// the exact inverse transform.
    pub fn inverse(&self) -> Self {
        let name = match self.name.strip_suffix(INVERSE_SUFFIX) {
            Some(base) => base.to_owned(),
            None => format!("{}{INVERSE_SUFFIX}", self.name),
        };

        Self {
            name,
            width: self.width,
            gates: self.gates.iter().rev().map(Gate::inverse).collect(),
        }
    }

    /// Whether the reversed body is gate-for-gate identical to the body
    pub fn is_self_inverse(&self) -> bool {
        self.gates
            .iter()
            .rev()
            .map(Gate::inverse)
            .eq(self.gates.iter().copied())
    }

    /// Maps the body onto global `lines` after checking arity.
    pub fn instantiate(&self, lines: &[LineId]) -> Result<Vec<Gate>, CircuitError> {
        if lines.len() != self.width {
            return Err(CircuitError::InvalidArity {
                expected: self.width,
                got: lines.len(),
            });
        }
        Ok(self.remapped(lines).collect())
    }

    // Caller guarantees `lines.len() == self.width`
    pub(crate) fn remapped<'s>(&'s self, lines: &'s [LineId]) -> impl Iterator<Item = Gate> + 's {
        self.gates.iter().map(move |gate| gate.remap(|local| lines[*local]))
    }
}

/// Collects gates over local slots and freezes them into a [`Block`].
#[derive(Clone, Debug)]
pub struct BlockBuilder {
    name: String,
    width: usize,
    gates: Vec<Gate>,
}

impl BlockBuilder {
    pub fn new(name: impl Into<String>, width: usize) -> Self {
        Self {
            name: name.into(),
            width,
            gates: Vec::new(),
        }
    }

    /// Local slots in order, handy for wiring the body
    pub fn slots(&self) -> Vec<LineId> {
        (0..self.width).map(LineId).collect()
    }

    pub fn build(self) -> Block {
        trace!(
            "built block {} (width {}, {} gates)",
            self.name,
            self.width,
            self.gates.len()
        );
        Block {
            name: self.name,
            width: self.width,
            gates: self.gates,
        }
    }
}

impl CircuitContext for BlockBuilder {
    fn num_lines(&self) -> usize {
        self.width
    }

    fn add_gate(&mut self, gate: Gate) -> Result<(), CircuitError> {
        check_gate(&gate, self.width)?;
        self.gates.push(gate);
        Ok(())
    }

    /// Nested blocks are inlined into the builder's body.
    fn append_block(&mut self, block: &Arc<Block>, lines: &[LineId]) -> Result<(), CircuitError> {
        check_lines(lines, block.width(), self.width)?;
        self.gates.extend(block.remapped(lines));
        Ok(())
    }
}
