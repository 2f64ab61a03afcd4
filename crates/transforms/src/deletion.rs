//! Operand deletion for binary arithmetic.
//!
//! Instead of computing `a op b` the mutant keeps one of the operands and discards the
//! other. Both operands are already on the stack when the arithmetic instruction runs, so
//! the instruction is replaced by a stack shuffle that leaves exactly the kept operand.
//! Two-word operands (`long`, `double`) need the two-word forms of the shuffle opcodes.

use crate::context::MutationContext;
use crate::pipeline::Emitter;
use serde::{Deserialize, Serialize};
use stackmut_core::opcode::OperandSize;
use stackmut_core::{Instruction, Opcode};
use tracing::debug;

/// Which operand of `a op b` is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    /// Remove `a`, keep `b`.
    First,
    /// Remove `b`, keep `a`.
    Second,
}

impl Operand {
    pub const fn description(self) -> &'static str {
        match self {
            Operand::First => "AOD: Removed the first operand from an arithmetic expression",
            Operand::Second => "AOD: Removed the second operand from an arithmetic expression",
        }
    }

    /// Replacement for an arithmetic instruction with operands of `size`.
    pub const fn replacement(self, size: OperandSize) -> &'static [Opcode] {
        match (self, size) {
            // [a, b] -> [b, a] -> [b]
            (Operand::First, OperandSize::Single) => &[Opcode::SWAP, Opcode::POP],
            // [a, b] -> [b, a, b] -> [b, a] -> [b]
            (Operand::First, OperandSize::Double) => &[Opcode::DUP2_X2, Opcode::POP2, Opcode::POP2],
            (Operand::Second, OperandSize::Single) => &[Opcode::POP],
            (Operand::Second, OperandSize::Double) => &[Opcode::POP2],
        }
    }
}

/// Replaces a binary `add`/`sub`/`mul`/`div`/`rem` with the shuffle for `operand`; forwards
/// anything else.
pub fn visit(
    operand: Operand,
    mutator: &str,
    index: usize,
    instruction: &Instruction,
    ctx: &mut MutationContext,
    out: &mut Emitter,
) {
    let Instruction::Insn(op) = instruction else {
        out.forward(instruction);
        return;
    };
    let Some(size) = op.arithmetic_size() else {
        out.forward(instruction);
        return;
    };

    let id = ctx.register(mutator, index, operand.description());
    if ctx.should_mutate(&id) {
        let replacement = operand.replacement(size);
        debug!(
            "{}: {} -> {:?} at {}",
            mutator, op, replacement, index
        );
        for op in replacement {
            out.emit(Instruction::Insn(*op));
        }
    } else {
        out.forward(instruction);
    }
}
