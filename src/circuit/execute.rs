//! Classical reference executor.
//!
//! Circuits built from `NOT` and Toffoli gates permute computational basis
//! states, so tracking one bit per line is an exact model of their action on
//! basis inputs. Used to check synthesized blocks, never by the synthesizer
//! itself.

use log::trace;

use super::check_lines;
use crate::{Block, Circuit, CircuitContext, CircuitError, Gate, GateError, LineId};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Line {line} out of range for a state of {num_lines} bits")]
    OutOfRange { line: LineId, num_lines: usize },
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Circuit(#[from] CircuitError),
}
pub type ExecuteError = Error;

/// One boolean per line, line 0 being the least significant bit of the
/// basis index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitState {
    bits: Vec<bool>,
}

impl BitState {
    pub fn zeroed(num_lines: usize) -> Self {
        Self {
            bits: vec![false; num_lines],
        }
    }

    pub fn from_bits(bits: impl IntoIterator<Item = bool>) -> Self {
        Self {
            bits: bits.into_iter().collect(),
        }
    }

    pub fn from_index(num_lines: usize, index: usize) -> Self {
        Self::from_bits((0..num_lines).map(|i| (index >> i) & 1 == 1))
    }

    pub fn to_index(&self) -> usize {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, bit)| **bit)
            .fold(0, |acc, (i, _)| acc | (1 << i))
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn get(&self, line: LineId) -> Result<bool, ExecuteError> {
        self.bits
            .get(*line)
            .copied()
            .ok_or(ExecuteError::OutOfRange {
                line,
                num_lines: self.bits.len(),
            })
    }

    pub fn set(&mut self, line: LineId, value: bool) -> Result<(), ExecuteError> {
        let num_lines = self.bits.len();
        let bit = self
            .bits
            .get_mut(*line)
            .ok_or(ExecuteError::OutOfRange { line, num_lines })?;
        *bit = value;
        Ok(())
    }

    pub fn apply_gate(&mut self, gate: &Gate) -> Result<(), ExecuteError> {
        gate.validate()?;
        let line = gate.max_line();
        if *line >= self.bits.len() {
            return Err(ExecuteError::OutOfRange {
                line,
                num_lines: self.bits.len(),
            });
        }

        let target = gate.target();
        if gate.flips(|line| self.bits[*line]) {
            self.bits[*target] ^= true;
        }
        trace!("{gate} -> line {target} = {}", self.bits[*target]);
        Ok(())
    }

    pub fn apply_gates<'a>(
        &mut self,
        gates: impl IntoIterator<Item = &'a Gate>,
    ) -> Result<(), ExecuteError> {
        gates.into_iter().try_for_each(|gate| self.apply_gate(gate))
    }

    /// Runs `block` spliced onto `lines`, which must be `block.width()`
    /// distinct lines of this state
    pub fn apply_block(&mut self, block: &Block, lines: &[LineId]) -> Result<(), ExecuteError> {
        check_lines(lines, block.width(), self.bits.len())?;
        let gates: Vec<Gate> = block.remapped(lines).collect();
        self.apply_gates(&gates)
    }

    pub fn run(&mut self, circuit: &Circuit) -> Result<(), ExecuteError> {
        if circuit.num_lines() > self.bits.len() {
            return Err(ExecuteError::OutOfRange {
                line: LineId(circuit.num_lines() - 1),
                num_lines: self.bits.len(),
            });
        }
        self.apply_gates(&circuit.flatten())
    }
}
