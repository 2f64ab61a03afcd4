//! The instruction stream of a method body.

use crate::HexBytes;
use crate::opcode::{OperandShape, Opcode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbolic branch target.
///
/// Labels are placed in the stream as [`Instruction::Label`] pseudo-instructions, so a
/// branch keeps pointing at the same position no matter how many bytes the instructions
/// in between grow or shrink by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// One element of a method body.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    /// Position marker referenced by jumps.
    Label(Label),
    /// Start of a source line.
    Line(u32),
    /// Instruction without operands.
    Insn(Opcode),
    /// Local variable load, store or `RET`.
    Var(Opcode, u16),
    /// `BIPUSH`, `SIPUSH` or `NEWARRAY` with its immediate.
    Int(Opcode, i32),
    /// Conditional or unconditional branch.
    Jump(Opcode, Label),
    /// `IINC index delta`.
    Iinc(u16, i16),
    /// Instruction whose operand bytes are passed through untouched.
    Raw(Opcode, HexBytes),
    /// `TABLESWITCH`: key `low + n` jumps to `targets[n]`, any other key to `default`.
    TableSwitch {
        low: i32,
        default: Label,
        targets: Vec<Label>,
    },
    /// `LOOKUPSWITCH` with its `(key, target)` pairs in code order.
    LookupSwitch {
        default: Label,
        pairs: Vec<(i32, Label)>,
    },
}

impl Instruction {
    /// Opcode of a real instruction, `None` for labels and line markers.
    pub fn opcode(&self) -> Option<Opcode> {
        match self {
            Instruction::Label(_) | Instruction::Line(_) => None,
            Instruction::Insn(op)
            | Instruction::Var(op, _)
            | Instruction::Int(op, _)
            | Instruction::Jump(op, _)
            | Instruction::Raw(op, _) => Some(*op),
            Instruction::Iinc(..) => Some(Opcode::IINC),
            Instruction::TableSwitch { .. } => Some(Opcode::TABLESWITCH),
            Instruction::LookupSwitch { .. } => Some(Opcode::LOOKUPSWITCH),
        }
    }

    /// Encoded size in bytes when the instruction starts at code offset `pc`.
    ///
    /// Locals 0-3 use the implicit-index short form, locals above 255 and increments
    /// outside `i8` the `WIDE` form. Only switches depend on `pc`, through the padding
    /// that aligns their operands to four bytes.
    pub fn byte_len(&self, pc: usize) -> usize {
        match self {
            Instruction::Label(_) | Instruction::Line(_) => 0,
            Instruction::Var(op, index) if *index <= 3 && *op != Opcode::RET => 1,
            Instruction::Var(_, index) if *index > u8::MAX as u16 => 4,
            Instruction::Iinc(index, delta) => {
                if is_wide_iinc(*index, *delta) {
                    6
                } else {
                    3
                }
            }
            Instruction::Raw(_, bytes) => 1 + bytes.len(),
            Instruction::TableSwitch { targets, .. } => {
                1 + switch_padding(pc) + 12 + 4 * targets.len()
            }
            Instruction::LookupSwitch { pairs, .. } => 1 + switch_padding(pc) + 8 + 8 * pairs.len(),
            other => {
                let op = other.opcode().unwrap_or(Opcode::NOP);
                1 + op.shape().operand_len().unwrap_or(0)
            }
        }
    }

    /// Every label the instruction may transfer control to.
    pub fn branch_targets(&self) -> Vec<Label> {
        match self {
            Instruction::Jump(_, label) => vec![*label],
            Instruction::TableSwitch {
                default, targets, ..
            } => std::iter::once(*default).chain(targets.iter().copied()).collect(),
            Instruction::LookupSwitch { default, pairs } => std::iter::once(*default)
                .chain(pairs.iter().map(|(_, label)| *label))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Bytes between a switch opcode at `pc` and its first four-byte-aligned operand.
pub const fn switch_padding(pc: usize) -> usize {
    (4 - (pc + 1) % 4) % 4
}

/// Whether `IINC index delta` needs the `WIDE` prefix.
pub fn is_wide_iinc(index: u16, delta: i16) -> bool {
    index > u8::MAX as u16 || i8::try_from(delta).is_err()
}

impl From<Opcode> for Instruction {
    fn from(op: Opcode) -> Self {
        Instruction::Insn(op)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Label(label) => write!(f, "{label}:"),
            Instruction::Line(line) => write!(f, "LINE {line}"),
            Instruction::Insn(op) => write!(f, "{op}"),
            Instruction::Var(op, index) => write!(f, "{op} {index}"),
            Instruction::Int(op, value) => write!(f, "{op} {value}"),
            Instruction::Jump(op, label) => write!(f, "{op} {label}"),
            Instruction::Iinc(index, delta) => write!(f, "IINC {index} {delta}"),
            Instruction::Raw(op, bytes) if bytes.is_empty() => write!(f, "{op}"),
            Instruction::Raw(op, bytes) => write!(f, "{op} {bytes:?}"),
            Instruction::TableSwitch {
                low,
                default,
                targets,
            } => {
                write!(f, "TABLESWITCH {low}")?;
                for label in targets {
                    write!(f, " {label}")?;
                }
                write!(f, " default:{default}")
            }
            Instruction::LookupSwitch { default, pairs } => {
                f.write_str("LOOKUPSWITCH")?;
                for (key, label) in pairs {
                    write!(f, " {key}:{label}")?;
                }
                write!(f, " default:{default}")
            }
        }
    }
}

/// Builds the instruction kind an opcode requires, for opcodes without operands.
///
/// Returns `None` when the opcode needs an operand.
pub fn bare(op: Opcode) -> Option<Instruction> {
    matches!(op.shape(), OperandShape::None).then_some(Instruction::Insn(op))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_len_uses_short_forms_for_low_locals() {
        assert_eq!(Instruction::Var(Opcode::ILOAD, 0).byte_len(0), 1);
        assert_eq!(Instruction::Var(Opcode::DSTORE, 3).byte_len(0), 1);
        assert_eq!(Instruction::Var(Opcode::ILOAD, 4).byte_len(0), 2);
        assert_eq!(Instruction::Var(Opcode::RET, 1).byte_len(0), 2);
        assert_eq!(Instruction::Jump(Opcode::GOTO_W, Label(0)).byte_len(0), 5);
        assert_eq!(Instruction::Label(Label(2)).byte_len(0), 0);
        assert_eq!(
            Instruction::Raw(Opcode::INVOKESTATIC, HexBytes(vec![0, 5])).byte_len(0),
            3
        );
    }

    #[test]
    fn byte_len_counts_wide_forms() {
        assert_eq!(Instruction::Var(Opcode::ILOAD, 255).byte_len(0), 2);
        assert_eq!(Instruction::Var(Opcode::ILOAD, 256).byte_len(0), 4);
        assert_eq!(Instruction::Var(Opcode::RET, 300).byte_len(0), 4);
        assert_eq!(Instruction::Iinc(1, 127).byte_len(0), 3);
        assert_eq!(Instruction::Iinc(1, 200).byte_len(0), 6);
        assert_eq!(Instruction::Iinc(1, -129).byte_len(0), 6);
        assert_eq!(Instruction::Iinc(256, 1).byte_len(0), 6);
    }

    #[test]
    fn switch_length_depends_on_alignment() {
        let table = Instruction::TableSwitch {
            low: 0,
            default: Label(0),
            targets: vec![Label(1), Label(2)],
        };
        assert_eq!(table.byte_len(0), 1 + 3 + 12 + 8);
        assert_eq!(table.byte_len(3), 1 + 12 + 8);
        let lookup = Instruction::LookupSwitch {
            default: Label(0),
            pairs: vec![(7, Label(1))],
        };
        assert_eq!(lookup.byte_len(1), 1 + 2 + 8 + 8);
        assert_eq!(lookup.branch_targets(), vec![Label(0), Label(1)]);
    }

    #[test]
    fn display_renders_assembly() {
        assert_eq!(Instruction::Var(Opcode::ILOAD, 1).to_string(), "ILOAD 1");
        assert_eq!(
            Instruction::Jump(Opcode::IF_ICMPGE, Label(7)).to_string(),
            "IF_ICMPGE L7"
        );
        assert_eq!(Instruction::Label(Label(7)).to_string(), "L7:");
        assert_eq!(Instruction::Iinc(2, -1).to_string(), "IINC 2 -1");
        assert_eq!(
            Instruction::TableSwitch {
                low: 1,
                default: Label(0),
                targets: vec![Label(1), Label(2)],
            }
            .to_string(),
            "TABLESWITCH 1 L1 L2 default:L0"
        );
        assert_eq!(
            Instruction::LookupSwitch {
                default: Label(0),
                pairs: vec![(-5, Label(1)), (40, Label(2))],
            }
            .to_string(),
            "LOOKUPSWITCH -5:L1 40:L2 default:L0"
        );
        assert_eq!(
            Instruction::Raw(Opcode::GETSTATIC, HexBytes(vec![0x00, 0x0c])).to_string(),
            "GETSTATIC 000c"
        );
    }

    #[test]
    fn bare_rejects_operand_opcodes() {
        assert_eq!(bare(Opcode::SWAP), Some(Instruction::Insn(Opcode::SWAP)));
        assert_eq!(bare(Opcode::ILOAD), None);
        assert_eq!(bare(Opcode::IFEQ), None);
    }
}
