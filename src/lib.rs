pub mod circuit;
mod core;
pub mod gadgets;

pub use crate::core::{
    gate::{Gate, GateError, GateType},
    line::{LineId, lines},
};

pub use circuit::{
    Block, BlockBuilder, BlockId, Circuit, CircuitContext, CircuitDescription, CircuitError,
    GateCount, Instruction,
    execute::{BitState, ExecuteError},
};
pub use gadgets::oracle::{
    ORACLE_NAME, ORACLE_WIDTH, OracleLines, append_oracle, append_oracle_lines, oracle_block,
    oracle_predicate,
};
