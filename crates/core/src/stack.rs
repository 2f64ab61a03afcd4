//! Word-level operand stack model.
//!
//! `long` and `double` values take two words, everything else one. Effects here are
//! counted in words, which is what the stack-manipulation opcodes (`POP2`, `DUP2_X2`, ...)
//! operate on.

use crate::instruction::Instruction;
use crate::opcode::Opcode;
use crate::result::{Error, Result};

/// Words popped and pushed by one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackEffect {
    pub pops: usize,
    pub pushes: usize,
}

impl StackEffect {
    const fn new(pops: usize, pushes: usize) -> Self {
        Self { pops, pushes }
    }
}

/// Static stack effect of an instruction.
///
/// `None` for instructions whose effect depends on the type of a constant-pool entry
/// (field and method references, `LDC`) and for opcodes the model does not know. Class
/// references (`NEW`, `CHECKCAST`, `INSTANCEOF`, `ANEWARRAY`) always move one reference.
pub fn effect(instruction: &Instruction) -> Option<StackEffect> {
    use Opcode::*;
    let op = match instruction {
        Instruction::Label(_) | Instruction::Line(_) | Instruction::Iinc(..) => {
            return Some(StackEffect::new(0, 0));
        }
        // The third operand byte is the number of dimension counts popped.
        Instruction::Raw(MULTIANEWARRAY, operands) => {
            return operands.get(2).map(|dims| StackEffect::new(*dims as usize, 1));
        }
        other => other.opcode()?,
    };
    let (pops, pushes) = match op {
        NOP | GOTO | GOTO_W | RET | RETURN => (0, 0),
        NEW => (0, 1),
        CHECKCAST | INSTANCEOF | ANEWARRAY => (1, 1),
        TABLESWITCH | LOOKUPSWITCH => (1, 0),
        ACONST_NULL | ICONST_M1 | ICONST_0 | ICONST_1 | ICONST_2 | ICONST_3 | ICONST_4
        | ICONST_5 | FCONST_0 | FCONST_1 | FCONST_2 | BIPUSH | SIPUSH | ILOAD | FLOAD | ALOAD
        | JSR | JSR_W => (0, 1),
        LCONST_0 | LCONST_1 | DCONST_0 | DCONST_1 | LDC2_W | LLOAD | DLOAD => (0, 2),
        ISTORE | FSTORE | ASTORE | POP | IRETURN | FRETURN | ARETURN | ATHROW | MONITORENTER
        | MONITOREXIT => (1, 0),
        LSTORE | DSTORE | POP2 | LRETURN | DRETURN => (2, 0),
        IALOAD | FALOAD | AALOAD | BALOAD | CALOAD | SALOAD => (2, 1),
        LALOAD | DALOAD => (2, 2),
        IASTORE | FASTORE | AASTORE | BASTORE | CASTORE | SASTORE => (3, 0),
        LASTORE | DASTORE => (4, 0),
        DUP => (1, 2),
        DUP_X1 => (2, 3),
        DUP_X2 => (3, 4),
        DUP2 => (2, 4),
        DUP2_X1 => (3, 5),
        DUP2_X2 => (4, 6),
        SWAP => (2, 2),
        IADD | ISUB | IMUL | IDIV | IREM | FADD | FSUB | FMUL | FDIV | FREM | ISHL | ISHR
        | IUSHR | IAND | IOR | IXOR => (2, 1),
        LADD | LSUB | LMUL | LDIV | LREM | DADD | DSUB | DMUL | DDIV | DREM | LAND | LOR
        | LXOR => (4, 2),
        LSHL | LSHR | LUSHR => (3, 2),
        INEG | FNEG | I2F | F2I | I2B | I2C | I2S | NEWARRAY | ARRAYLENGTH => (1, 1),
        LNEG | DNEG | L2D | D2L => (2, 2),
        I2L | I2D | F2L | F2D => (1, 2),
        L2I | L2F | D2I | D2F => (2, 1),
        LCMP | DCMPL | DCMPG => (4, 1),
        FCMPL | FCMPG => (2, 1),
        IFEQ | IFNE | IFLT | IFGE | IFGT | IFLE | IFNULL | IFNONNULL => (1, 0),
        IF_ICMPEQ | IF_ICMPNE | IF_ICMPLT | IF_ICMPGE | IF_ICMPGT | IF_ICMPLE | IF_ACMPEQ
        | IF_ACMPNE => (2, 0),
        _ => return None,
    };
    Some(StackEffect::new(pops, pushes))
}

/// Runs a straight-line sequence against a depth counter.
///
/// Jumps are treated as falling through. Returns the depth after every instruction.
pub fn simulate(instructions: &[Instruction], initial_depth: usize) -> Result<Vec<usize>> {
    let mut depth = initial_depth;
    let mut depths = Vec::with_capacity(instructions.len());
    for (index, instruction) in instructions.iter().enumerate() {
        let op = instruction.opcode().unwrap_or(Opcode::NOP);
        let effect = effect(instruction).ok_or(Error::UnknownStackEffect { index, op })?;
        if effect.pops > depth {
            return Err(Error::StackUnderflow {
                index,
                op,
                needed: effect.pops,
                available: depth,
            });
        }
        depth = depth - effect.pops + effect.pushes;
        depths.push(depth);
    }
    Ok(depths)
}

/// Applies a pure stack-manipulation opcode to a concrete word stack (top is the last
/// element).
///
/// Only `POP`, `POP2`, `DUP*` and `SWAP` are accepted; anything else is
/// [`Error::UnsupportedOpcode`].
pub fn shuffle<T: Clone>(op: Opcode, words: &mut Vec<T>) -> Result<()> {
    let needed = match op {
        Opcode::POP | Opcode::DUP => 1,
        Opcode::POP2 | Opcode::DUP2 | Opcode::SWAP | Opcode::DUP_X1 => 2,
        Opcode::DUP_X2 | Opcode::DUP2_X1 => 3,
        Opcode::DUP2_X2 => 4,
        other => return Err(Error::UnsupportedOpcode(other)),
    };
    if words.len() < needed {
        return Err(Error::StackUnderflow {
            index: 0,
            op,
            needed,
            available: words.len(),
        });
    }

    let len = words.len();
    match op {
        Opcode::POP => {
            words.pop();
        }
        Opcode::POP2 => words.truncate(len - 2),
        Opcode::SWAP => words.swap(len - 1, len - 2),
        _ => {
            // DUPn_Xm: copy the top `n` words and insert them `m` words further down.
            let (copied, skipped) = match op {
                Opcode::DUP => (1, 0),
                Opcode::DUP_X1 => (1, 1),
                Opcode::DUP_X2 => (1, 2),
                Opcode::DUP2 => (2, 0),
                Opcode::DUP2_X1 => (2, 1),
                _ => (2, 2),
            };
            let top: Vec<T> = words[len - copied..].to_vec();
            let at = len - copied - skipped;
            words.splice(at..at, top);
        }
    }
    Ok(())
}
