//! Marking oracle `t ^= c AND (a OR b)`.
//!
//! `OR` is not directly available in the `NOT`/Toffoli basis, so it is built
//! by De Morgan, `a OR b = NOT(NOT a AND NOT b)`, into a scratch line `w`.
//! The value in `w` is consumed once by the controlled write to `t` and then
//! erased by replaying the computation backwards, leaving `w` at zero again.
//!
//! `NOT(w)` followed by `Toffoli(NOT a, NOT b, w)` leaves `w = a OR b`
//! directly; no trailing negation of `w` is needed.
//!
//! ```text
//!  a ─X──●─────●──X─ a
//!  b ─X──●─────●──X─ b
//!  c ───────●─────── c
//!  t ───────⊕─────── t ⊕ c·(a+b)
//!  w ─X──⊕──●──⊕──X─ w
//! ```

use std::sync::Arc;

use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{
    Block, BlockBuilder, CircuitContext, CircuitError, Gate, LineId, circuit::check_distinct,
};

pub const ORACLE_NAME: &str = "U_f";
pub const ORACLE_WIDTH: usize = 5;

static ORACLE_BLOCK: Lazy<Arc<Block>> = Lazy::new(|| Arc::new(build_oracle_block()));

/// Line assignment for the oracle, one distinct line per role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OracleLines {
    input1: LineId,
    input2: LineId,
    control: LineId,
    target: LineId,
    ancilla: LineId,
}

impl OracleLines {
    pub fn new(
        input1: LineId,
        input2: LineId,
        control: LineId,
        target: LineId,
        ancilla: LineId,
    ) -> Result<Self, CircuitError> {
        check_distinct(&[input1, input2, control, target, ancilla])?;
        Ok(Self {
            input1,
            input2,
            control,
            target,
            ancilla,
        })
    }

    pub fn input1(&self) -> LineId {
        self.input1
    }

    pub fn input2(&self) -> LineId {
        self.input2
    }

    pub fn control(&self) -> LineId {
        self.control
    }

    pub fn target(&self) -> LineId {
        self.target
    }

    /// Must hold 0 when the oracle runs; it holds 0 again afterwards
    pub fn ancilla(&self) -> LineId {
        self.ancilla
    }

    /// Positional `[a, b, c, t, w]` form, matching the block's local slots
    pub fn to_array(&self) -> [LineId; ORACLE_WIDTH] {
        [
            self.input1,
            self.input2,
            self.control,
            self.target,
            self.ancilla,
        ]
    }
}

impl TryFrom<&[LineId]> for OracleLines {
    type Error = CircuitError;

    fn try_from(lines: &[LineId]) -> Result<Self, Self::Error> {
        match *lines {
            [a, b, c, t, w] => Self::new(a, b, c, t, w),
            _ => Err(CircuitError::InvalidArity {
                expected: ORACLE_WIDTH,
                got: lines.len(),
            }),
        }
    }
}

/// Takes `w` from 0 to `a OR b`, leaving `a` and `b` negated. Run backwards
/// it restores all three.
fn or_into_ancilla(a: LineId, b: LineId, w: LineId) -> [Gate; 4] {
    [
        Gate::not(a),
        Gate::not(b),
        Gate::not(w),
        Gate::toffoli(a, b, w),
    ]
}

fn emit_oracle<C: CircuitContext>(circuit: &mut C, lines: &OracleLines) -> Result<(), CircuitError> {
    let compute = or_into_ancilla(lines.input1, lines.input2, lines.ancilla);

    for gate in compute {
        circuit.add_gate(gate)?;
    }

    circuit.add_gate(Gate::toffoli(lines.control, lines.ancilla, lines.target))?;

    for gate in compute.iter().rev() {
        circuit.add_gate(gate.inverse())?;
    }

    Ok(())
}

fn build_oracle_block() -> Block {
    let mut builder = BlockBuilder::new(ORACLE_NAME, ORACLE_WIDTH);
    let slots = OracleLines::try_from(&builder.slots()[..]).expect("oracle slots are distinct");
    emit_oracle(&mut builder, &slots).expect("oracle body outside its block slots");
    builder.build()
}

/// Shared `U_f` template over local slots `[a, b, c, t, w]`
pub fn oracle_block() -> &'static Arc<Block> {
    &ORACLE_BLOCK
}

/// Reference predicate written into the target line
pub fn oracle_predicate(a: bool, b: bool, c: bool) -> bool {
    c && (a || b)
}

/// Appends the oracle block onto `lines`, read positionally as
/// `[a, b, c, t, w]`.
///
/// Fails with `InvalidArity`, `DuplicateLine` or `OutOfRange` (checked in
/// that order) without touching `circuit`.
pub fn append_oracle<C: CircuitContext>(
    circuit: &mut C,
    lines: &[LineId],
) -> Result<(), CircuitError> {
    let roles = OracleLines::try_from(lines)?;
    append_oracle_lines(circuit, &roles)
}

pub fn append_oracle_lines<C: CircuitContext>(
    circuit: &mut C,
    lines: &OracleLines,
) -> Result<(), CircuitError> {
    circuit.append_block(oracle_block(), &lines.to_array())?;
    debug!(
        "appended {ORACLE_NAME}: a={} b={} c={} t={} w={}",
        lines.input1, lines.input2, lines.control, lines.target, lines.ancilla
    );
    Ok(())
}
