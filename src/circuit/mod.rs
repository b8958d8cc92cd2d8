use std::{collections::HashMap, sync::Arc};

use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::{Gate, GateError, GateType, LineId};

mod block;
pub use block::{Block, BlockBuilder};

pub mod block_key;
use block_key::BlockKey;

mod circuit_context;
pub use circuit_context::CircuitContext;

pub mod execute;

/// Errors raised while appending to a circuit or block
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Expected {expected} lines, got {got}")]
    InvalidArity { expected: usize, got: usize },
    #[error("Line {0} requested more than once")]
    DuplicateLine(LineId),
    #[error("Line {line} out of range for {num_lines} lines")]
    OutOfRange { line: LineId, num_lines: usize },
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error("Circuit description: {0}")]
    Json(String),
}
pub type CircuitError = Error;

/// Arity first, then duplicates, then range.
pub(crate) fn check_lines(
    lines: &[LineId],
    expected: usize,
    num_lines: usize,
) -> Result<(), CircuitError> {
    if lines.len() != expected {
        return Err(CircuitError::InvalidArity {
            expected,
            got: lines.len(),
        });
    }
    check_distinct(lines)?;
    match lines.iter().find(|line| ***line >= num_lines) {
        Some(&line) => Err(CircuitError::OutOfRange { line, num_lines }),
        None => Ok(()),
    }
}

pub(crate) fn check_distinct(lines: &[LineId]) -> Result<(), CircuitError> {
    match lines.iter().duplicates().next() {
        Some(&line) => Err(CircuitError::DuplicateLine(line)),
        None => Ok(()),
    }
}

pub(crate) fn check_gate(gate: &Gate, num_lines: usize) -> Result<(), CircuitError> {
    gate.validate()?;
    let line = gate.max_line();
    if *line >= num_lines {
        return Err(CircuitError::OutOfRange { line, num_lines });
    }
    Ok(())
}

new_key_type! { pub struct BlockId; }

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Gate(Gate),
    Call { block: BlockId, lines: Vec<LineId> },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GateCount {
    pub not: usize,
    pub toffoli: usize,
}

impl GateCount {
    pub fn total(&self) -> usize {
        self.not + self.toffoli
    }
}

/// Flattened, serializable form of a circuit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitDescription {
    pub name: String,
    pub num_lines: usize,
    pub gates: Vec<Gate>,
}

/// Append-only list of reversible instructions over `num_lines` lines.
#[derive(Clone, Debug)]
pub struct Circuit {
    name: String,
    num_lines: usize,
    blocks: SlotMap<BlockId, Arc<Block>>,
    block_index: HashMap<BlockKey, BlockId>,
    instructions: Vec<Instruction>,
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Circuit {
    pub fn new(num_lines: usize) -> Self {
        Self::with_name("circuit", num_lines)
    }

    pub fn with_name(name: impl Into<String>, num_lines: usize) -> Self {
        Self {
            name: name.into(),
            num_lines,
            blocks: SlotMap::with_key(),
            block_index: HashMap::new(),
            instructions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn block(&self, id: BlockId) -> Option<&Arc<Block>> {
        self.blocks.get(id)
    }

    /// Distinct block templates referenced by this circuit
    pub fn blocks(&self) -> impl Iterator<Item = &Arc<Block>> {
        self.blocks.values()
    }

    fn register_block(&mut self, block: &Arc<Block>) -> BlockId {
        let key = block.key();
        if let Some(&id) = self.block_index.get(&key) {
            return id;
        }
        let id = self.blocks.insert(Arc::clone(block));
        self.block_index.insert(key, id);
        debug!(
            "registered block {} (width {}) in circuit {}",
            block.name(),
            block.width(),
            self.name
        );
        id
    }

    /// Every primitive gate in execution order, in global line indices
    pub fn flatten(&self) -> Vec<Gate> {
        let mut gates = Vec::new();
        for instruction in &self.instructions {
            match instruction {
                Instruction::Gate(gate) => gates.push(*gate),
                Instruction::Call { block, lines } => {
                    gates.extend(self.blocks[*block].remapped(lines));
                }
            }
        }
        gates
    }

    pub fn gate_count(&self) -> usize {
        self.gate_counts().total()
    }

    pub fn gate_counts(&self) -> GateCount {
        let mut count = GateCount::default();
        for gate in self.flatten() {
            match gate.gate_type() {
                GateType::Not => count.not += 1,
                GateType::Toffoli => count.toffoli += 1,
            }
        }
        count
    }

    /// Circuit computing the inverse transform: instructions in reverse order,
    /// each block call replaced by a call of the inverted block.
    pub fn inverse(&self) -> Self {
        let name = format!("{}_dg", self.name);
        let mut inverse = Self::with_name(name, self.num_lines);

        for instruction in self.instructions.iter().rev() {
            match instruction {
                Instruction::Gate(gate) => {
                    inverse.instructions.push(Instruction::Gate(gate.inverse()));
                }
                Instruction::Call { block, lines } => {
                    let block = &self.blocks[*block];
                    let block = match block.is_self_inverse() {
                        true => Arc::clone(block),
                        false => Arc::new(block.inverse()),
                    };
                    let id = inverse.register_block(&block);
                    inverse.instructions.push(Instruction::Call {
                        block: id,
                        lines: lines.clone(),
                    });
                }
            }
        }

        inverse
    }

    pub fn description(&self) -> CircuitDescription {
        CircuitDescription {
            name: self.name.clone(),
            num_lines: self.num_lines,
            gates: self.flatten(),
        }
    }

    pub fn to_json(&self) -> Result<String, CircuitError> {
        serde_json::to_string_pretty(&self.description())
            .map_err(|err| CircuitError::Json(err.to_string()))
    }

    /// Rebuilds a flat circuit, validating every gate against `num_lines`.
    pub fn from_json(json: &str) -> Result<Self, CircuitError> {
        let description: CircuitDescription =
            serde_json::from_str(json).map_err(|err| CircuitError::Json(err.to_string()))?;
        Self::try_from(description)
    }
}

impl TryFrom<CircuitDescription> for Circuit {
    type Error = CircuitError;

    fn try_from(description: CircuitDescription) -> Result<Self, Self::Error> {
        let mut circuit = Self::with_name(description.name, description.num_lines);
        for gate in description.gates {
            circuit.add_gate(gate)?;
        }
        Ok(circuit)
    }
}

impl CircuitContext for Circuit {
    fn num_lines(&self) -> usize {
        self.num_lines
    }

    fn add_gate(&mut self, gate: Gate) -> Result<(), CircuitError> {
        check_gate(&gate, self.num_lines)?;
        trace!("{}: {gate}", self.name);
        self.instructions.push(Instruction::Gate(gate));
        Ok(())
    }

    fn append_block(&mut self, block: &Arc<Block>, lines: &[LineId]) -> Result<(), CircuitError> {
        check_lines(lines, block.width(), self.num_lines)?;
        let id = self.register_block(block);
        trace!("{}: {} on {:?}", self.name, block.name(), lines);
        self.instructions.push(Instruction::Call {
            block: id,
            lines: lines.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::lines;

    fn toffoli_block() -> Arc<Block> {
        let mut builder = BlockBuilder::new("ccx_block", 3);
        builder
            .add_gate(Gate::toffoli(LineId(0), LineId(1), LineId(2)))
            .unwrap();
        Arc::new(builder.build())
    }

    #[test]
    fn test_check_lines_order() {
        assert_eq!(
            check_lines(&lines([0, 0, 9]), 2, 3),
            Err(CircuitError::InvalidArity {
                expected: 2,
                got: 3
            })
        );
        assert_eq!(
            check_lines(&lines([9, 9]), 2, 3),
            Err(CircuitError::DuplicateLine(LineId(9)))
        );
        assert_eq!(
            check_lines(&lines([1, 9]), 2, 3),
            Err(CircuitError::OutOfRange {
                line: LineId(9),
                num_lines: 3
            })
        );
        assert_eq!(check_lines(&lines([2, 0]), 2, 3), Ok(()));
    }

    #[test]
    fn test_add_gate_out_of_range() {
        let mut circuit = Circuit::new(2);
        assert_eq!(
            circuit.add_gate(Gate::toffoli(LineId(0), LineId(1), LineId(2))),
            Err(CircuitError::OutOfRange {
                line: LineId(2),
                num_lines: 2
            })
        );
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_same_block_registered_once() {
        let block = toffoli_block();
        let mut circuit = Circuit::new(6);
        circuit.append_block(&block, &lines([0, 1, 2])).unwrap();
        circuit.append_block(&block, &lines([3, 4, 5])).unwrap();

        assert_eq!(circuit.len(), 2);
        assert_eq!(circuit.blocks().count(), 1);
        assert_eq!(
            circuit.flatten(),
            vec![
                Gate::toffoli(LineId(0), LineId(1), LineId(2)),
                Gate::toffoli(LineId(3), LineId(4), LineId(5)),
            ]
        );
    }

    #[test]
    fn test_failed_append_leaves_circuit_untouched() {
        let block = toffoli_block();
        let mut circuit = Circuit::new(3);
        circuit.add_gate(Gate::not(LineId(0))).unwrap();

        assert!(circuit.append_block(&block, &lines([0, 1])).is_err());
        assert!(circuit.append_block(&block, &lines([0, 1, 1])).is_err());
        assert!(circuit.append_block(&block, &lines([0, 1, 3])).is_err());

        assert_eq!(circuit.len(), 1);
        assert_eq!(circuit.blocks().count(), 0);
    }

    #[test]
    fn test_inverse_reverses_instructions() {
        let mut builder = BlockBuilder::new("prep", 2);
        builder.add_gate(Gate::not(LineId(0))).unwrap();
        builder.add_gate(Gate::not(LineId(1))).unwrap();
        let prep = Arc::new(builder.build());

        let mut circuit = Circuit::with_name("main", 4);
        circuit.add_gate(Gate::not(LineId(3))).unwrap();
        circuit.append_block(&prep, &lines([2, 1])).unwrap();
        circuit.append_block(&toffoli_block(), &lines([1, 2, 0])).unwrap();

        let inverse = circuit.inverse();
        assert_eq!(inverse.name(), "main_dg");
        assert!(inverse.blocks().any(|block| block.name() == "prep_dg"));

        let mut expected = circuit.flatten();
        expected.reverse();
        assert_eq!(inverse.flatten(), expected);
        assert_eq!(inverse.inverse().flatten(), circuit.flatten());
    }

    #[test]
    fn test_gate_counts() {
        let mut circuit = Circuit::new(3);
        circuit.add_gate(Gate::not(LineId(0))).unwrap();
        circuit.append_block(&toffoli_block(), &lines([2, 0, 1])).unwrap();
        assert_eq!(circuit.gate_counts(), GateCount { not: 1, toffoli: 1 });
        assert_eq!(circuit.gate_count(), 2);
    }

    #[test]
    fn test_json_round_trip_preserves_flat_gates() {
        let mut circuit = Circuit::with_name("json", 3);
        circuit.add_gate(Gate::not(LineId(1))).unwrap();
        circuit.append_block(&toffoli_block(), &lines([1, 2, 0])).unwrap();

        let json = circuit.to_json().unwrap();
        let restored = Circuit::from_json(&json).unwrap();

        assert_eq!(restored.name(), "json");
        assert_eq!(restored.num_lines(), 3);
        assert_eq!(restored.flatten(), circuit.flatten());
    }

    #[test]
    fn test_from_json_validates_gates() {
        let json = r#"{"name":"bad","num_lines":2,"gates":[{"gate":"not","target":5}]}"#;
        assert_eq!(
            Circuit::from_json(json).unwrap_err(),
            CircuitError::OutOfRange {
                line: LineId(5),
                num_lines: 2
            }
        );
        assert!(matches!(
            Circuit::from_json("not json").unwrap_err(),
            CircuitError::Json(_)
        ));
    }
}
