//! Module for encoding instruction streams back into `Code` arrays.
//!
//! Labels are resolved after byte offsets are assigned, so streams whose lengths changed
//! (operand deletion emits several instructions for one) re-encode with correct branch
//! offsets.

use crate::HexBytes;
use crate::decoder::LineEntry;
use crate::instruction::{Instruction, Label, is_wide_iinc, switch_padding};
use crate::opcode::{OperandShape, Opcode};
use crate::result::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Output of [`encode`]: the code array and its line number table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedCode {
    pub code: HexBytes,
    pub line_numbers: Vec<LineEntry>,
}

/// Encodes a sequence of instructions into a `Code` array.
///
/// Local accesses to slots 0-3 use the implicit-index short forms, locals above 255 and
/// large increments get a `WIDE` prefix. Branch offsets that do not fit the instruction
/// width and instructions whose operand kind does not match their opcode are errors.
///
/// # Examples
/// ```rust
/// use stackmut_core::{Instruction, Opcode, encoder};
///
/// let ins = [Instruction::Var(Opcode::ILOAD, 0), Instruction::Insn(Opcode::IRETURN)];
/// let encoded = encoder::encode(&ins).unwrap();
/// assert_eq!(encoded.code.0, vec![0x1a, 0xac]);
/// ```
pub fn encode(instructions: &[Instruction]) -> Result<EncodedCode> {
    let mut labels: HashMap<Label, usize> = HashMap::new();
    let mut offset = 0;
    for ins in instructions {
        if let Instruction::Label(label) = ins {
            labels.insert(*label, offset);
        }
        offset += ins.byte_len(offset);
    }
    let resolve = |label: Label| labels.get(&label).copied().ok_or(Error::UndefinedLabel(label));
    for ins in instructions {
        for label in ins.branch_targets() {
            resolve(label)?;
        }
    }

    let mut bytes = Vec::with_capacity(offset);
    let mut line_numbers = Vec::new();

    for ins in instructions {
        let pc = bytes.len();
        tracing::trace!("Encoding instruction: pc={}, ins='{}'", pc, ins);

        match ins {
            Instruction::Label(_) => {}
            Instruction::Line(line) => line_numbers.push(LineEntry {
                start_pc: pc as u32,
                line: *line,
            }),
            Instruction::Insn(op) => {
                expect_shape(*op, matches!(op.shape(), OperandShape::None))?;
                bytes.push(op.to_byte());
            }
            Instruction::Var(op, index) => {
                expect_shape(*op, matches!(op.shape(), OperandShape::Local))?;
                if let Some(short) = implicit_form(*op, *index) {
                    bytes.push(short);
                } else if let Ok(narrow) = u8::try_from(*index) {
                    bytes.extend([op.to_byte(), narrow]);
                } else {
                    bytes.extend([Opcode::WIDE.to_byte(), op.to_byte()]);
                    bytes.extend(index.to_be_bytes());
                }
            }
            Instruction::Int(op, value) => {
                let out_of_range = || Error::OperandOutOfRange {
                    op: *op,
                    value: *value as i64,
                };
                bytes.push(op.to_byte());
                match op.shape() {
                    OperandShape::SignedByte => {
                        let v = i8::try_from(*value).map_err(|_| out_of_range())?;
                        bytes.push(v as u8);
                    }
                    OperandShape::UnsignedByte => {
                        bytes.push(u8::try_from(*value).map_err(|_| out_of_range())?);
                    }
                    OperandShape::SignedShort => {
                        let v = i16::try_from(*value).map_err(|_| out_of_range())?;
                        bytes.extend(v.to_be_bytes());
                    }
                    _ => return Err(Error::UnsupportedOpcode(*op)),
                }
            }
            Instruction::Jump(op, label) => {
                let target = resolve(*label)?;
                let distance = target as i64 - pc as i64;
                let out_of_range = || Error::BranchOutOfRange {
                    offset: pc,
                    label: *label,
                    distance,
                };
                bytes.push(op.to_byte());
                match op.shape() {
                    OperandShape::Branch16 => {
                        let rel = i16::try_from(distance).map_err(|_| out_of_range())?;
                        bytes.extend(rel.to_be_bytes());
                    }
                    OperandShape::Branch32 => {
                        let rel = i32::try_from(distance).map_err(|_| out_of_range())?;
                        bytes.extend(rel.to_be_bytes());
                    }
                    _ => return Err(Error::UnsupportedOpcode(*op)),
                }
            }
            Instruction::Iinc(index, delta) => {
                if is_wide_iinc(*index, *delta) {
                    bytes.extend([Opcode::WIDE.to_byte(), Opcode::IINC.to_byte()]);
                    bytes.extend(index.to_be_bytes());
                    bytes.extend(delta.to_be_bytes());
                } else {
                    bytes.extend([Opcode::IINC.to_byte(), *index as u8, *delta as i8 as u8]);
                }
            }
            Instruction::TableSwitch {
                low,
                default,
                targets,
            } => {
                let high = i32::try_from(targets.len())
                    .ok()
                    .and_then(|n| low.checked_add(n - 1))
                    .filter(|_| !targets.is_empty())
                    .ok_or(Error::MalformedSwitch(pc))?;
                bytes.push(Opcode::TABLESWITCH.to_byte());
                bytes.resize(bytes.len() + switch_padding(pc), 0);
                bytes.extend(switch_offset(pc, resolve(*default)?)?.to_be_bytes());
                bytes.extend(low.to_be_bytes());
                bytes.extend(high.to_be_bytes());
                for label in targets {
                    bytes.extend(switch_offset(pc, resolve(*label)?)?.to_be_bytes());
                }
            }
            Instruction::LookupSwitch { default, pairs } => {
                let count = i32::try_from(pairs.len()).map_err(|_| Error::MalformedSwitch(pc))?;
                bytes.push(Opcode::LOOKUPSWITCH.to_byte());
                bytes.resize(bytes.len() + switch_padding(pc), 0);
                bytes.extend(switch_offset(pc, resolve(*default)?)?.to_be_bytes());
                bytes.extend(count.to_be_bytes());
                for (key, label) in pairs {
                    bytes.extend(key.to_be_bytes());
                    bytes.extend(switch_offset(pc, resolve(*label)?)?.to_be_bytes());
                }
            }
            Instruction::Raw(op, operands) => {
                expect_shape(
                    *op,
                    op.shape() == OperandShape::Constant(operands.len()),
                )?;
                bytes.push(op.to_byte());
                bytes.extend_from_slice(operands);
            }
        }
    }

    tracing::debug!(
        "Encoded {} instructions into {} bytes",
        instructions.len(),
        bytes.len()
    );
    Ok(EncodedCode {
        code: HexBytes(bytes),
        line_numbers,
    })
}

fn expect_shape(op: Opcode, matches: bool) -> Result<()> {
    if matches {
        Ok(())
    } else {
        Err(Error::UnsupportedOpcode(op))
    }
}

fn switch_offset(pc: usize, target: usize) -> Result<i32> {
    i32::try_from(target as i64 - pc as i64).map_err(|_| Error::MalformedSwitch(pc))
}

fn implicit_form(op: Opcode, index: u16) -> Option<u8> {
    if index > 3 {
        return None;
    }
    let base = match op {
        Opcode::ILOAD => 0x1a,
        Opcode::LLOAD => 0x1e,
        Opcode::FLOAD => 0x22,
        Opcode::DLOAD => 0x26,
        Opcode::ALOAD => 0x2a,
        Opcode::ISTORE => 0x3b,
        Opcode::LSTORE => 0x3f,
        Opcode::FSTORE => 0x43,
        Opcode::DSTORE => 0x47,
        Opcode::ASTORE => 0x4b,
        _ => return None,
    };
    Some(base + index as u8)
}
