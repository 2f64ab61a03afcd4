//! Turns code arrays and assembly listings into instruction streams.

use crate::HexBytes;
use crate::instruction::{Instruction, Label, bare, switch_padding};
use crate::opcode::{OperandShape, Opcode};
use crate::result::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// One `LineNumberTable` entry: the source line starting at a code offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineEntry {
    pub start_pc: u32,
    pub line: u32,
}

enum Decoded {
    Ready(Instruction),
    Branch(Opcode, i64),
    Table {
        low: i32,
        default: i64,
        targets: Vec<i64>,
    },
    Lookup {
        default: i64,
        pairs: Vec<(i32, i64)>,
    },
}

impl Decoded {
    /// Absolute code offsets this item may jump to.
    fn targets(&self) -> Vec<i64> {
        match self {
            Decoded::Ready(_) => Vec::new(),
            Decoded::Branch(_, target) => vec![*target],
            Decoded::Table {
                default, targets, ..
            } => std::iter::once(*default).chain(targets.iter().copied()).collect(),
            Decoded::Lookup { default, pairs } => std::iter::once(*default)
                .chain(pairs.iter().map(|(_, target)| *target))
                .collect(),
        }
    }
}

/// Big-endian reader over the code array that reports the offset of the instruction being
/// decoded when it runs out of bytes.
struct Reader<'a> {
    code: &'a [u8],
    start: usize,
}

impl Reader<'_> {
    fn bytes(&self, at: usize, len: usize) -> Result<&[u8]> {
        at.checked_add(len)
            .and_then(|end| self.code.get(at..end))
            .ok_or(Error::Truncated(self.start))
    }

    fn u16(&self, at: usize) -> Result<u16> {
        let b = self.bytes(at, 2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn i32(&self, at: usize) -> Result<i32> {
        let b = self.bytes(at, 4)?;
        Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// A switch entry count, checked against the bytes left so a corrupt count cannot
    /// allocate.
    fn count(&self, at: usize, entry_len: usize) -> Result<usize> {
        let raw = self.i32(at)?;
        let count = usize::try_from(raw).map_err(|_| Error::MalformedSwitch(self.start))?;
        if count > self.code.len() / entry_len {
            return Err(Error::Truncated(self.start));
        }
        Ok(count)
    }
}

/// Decodes a raw `Code` array.
///
/// Branch offsets become labels placed right before their target instruction, and each
/// line table entry becomes a `Line` marker before the instruction it starts at. Labels
/// are numbered in ascending target order, so decoding is deterministic.
pub fn decode_code(code: &[u8], lines: &[LineEntry]) -> Result<Vec<Instruction>> {
    let mut decoded: Vec<(usize, Decoded)> = Vec::new();
    let mut pc = 0;

    while pc < code.len() {
        let byte = code[pc];
        if let Some((op, index)) = implicit_local(byte) {
            decoded.push((pc, Decoded::Ready(Instruction::Var(op, index))));
            pc += 1;
            continue;
        }

        let op = Opcode::from_byte(byte);
        let Some(len) = op.shape().operand_len() else {
            let (item, len) = decode_variable(code, pc, op)?;
            decoded.push((pc, item));
            pc += len;
            continue;
        };
        let operands = code.get(pc + 1..pc + 1 + len).ok_or(Error::Truncated(pc))?;

        let item = match op.shape() {
            OperandShape::None => {
                if let Opcode::UNKNOWN(raw) = op {
                    tracing::warn!("Unknown opcode 0x{:02x} at pc={}, passing through", raw, pc);
                }
                Decoded::Ready(Instruction::Insn(op))
            }
            OperandShape::Local => Decoded::Ready(Instruction::Var(op, operands[0] as u16)),
            OperandShape::SignedByte => {
                Decoded::Ready(Instruction::Int(op, operands[0] as i8 as i32))
            }
            OperandShape::UnsignedByte => Decoded::Ready(Instruction::Int(op, operands[0] as i32)),
            OperandShape::SignedShort => Decoded::Ready(Instruction::Int(
                op,
                i16::from_be_bytes([operands[0], operands[1]]) as i32,
            )),
            OperandShape::Branch16 => {
                let rel = i16::from_be_bytes([operands[0], operands[1]]) as i64;
                Decoded::Branch(op, pc as i64 + rel)
            }
            OperandShape::Branch32 => {
                let rel =
                    i32::from_be_bytes([operands[0], operands[1], operands[2], operands[3]]) as i64;
                Decoded::Branch(op, pc as i64 + rel)
            }
            OperandShape::Iinc => Decoded::Ready(Instruction::Iinc(
                operands[0] as u16,
                operands[1] as i8 as i16,
            )),
            OperandShape::Constant(_) => {
                Decoded::Ready(Instruction::Raw(op, HexBytes(operands.to_vec())))
            }
            OperandShape::Variable => return Err(Error::UnsupportedOpcode(op)),
        };
        decoded.push((pc, item));
        pc += 1 + len;
    }

    let starts: BTreeSet<usize> = decoded.iter().map(|(pc, _)| *pc).collect();
    let mut targets = BTreeSet::new();
    for (pc, item) in &decoded {
        for target in item.targets() {
            let valid = usize::try_from(target).is_ok_and(|t| starts.contains(&t));
            if !valid {
                return Err(Error::InvalidBranchTarget {
                    offset: *pc,
                    target,
                });
            }
            targets.insert(target as usize);
        }
    }
    let labels: BTreeMap<usize, Label> = targets
        .into_iter()
        .enumerate()
        .map(|(n, target)| (target, Label(n as u32)))
        .collect();

    let mut line_starts: BTreeMap<usize, Vec<u32>> = BTreeMap::new();
    for entry in lines {
        line_starts
            .entry(entry.start_pc as usize)
            .or_default()
            .push(entry.line);
    }

    let mut instructions = Vec::with_capacity(decoded.len() + labels.len() + lines.len());
    for (pc, item) in decoded {
        if let Some(label) = labels.get(&pc) {
            instructions.push(Instruction::Label(*label));
        }
        if let Some(numbers) = line_starts.get(&pc) {
            instructions.extend(numbers.iter().map(|line| Instruction::Line(*line)));
        }
        // Every target was checked against `starts` above.
        let label = |target: i64| labels[&(target as usize)];
        instructions.push(match item {
            Decoded::Ready(insn) => insn,
            Decoded::Branch(op, target) => Instruction::Jump(op, label(target)),
            Decoded::Table {
                low,
                default,
                targets,
            } => Instruction::TableSwitch {
                low,
                default: label(default),
                targets: targets.into_iter().map(label).collect(),
            },
            Decoded::Lookup { default, pairs } => Instruction::LookupSwitch {
                default: label(default),
                pairs: pairs
                    .into_iter()
                    .map(|(key, target)| (key, label(target)))
                    .collect(),
            },
        });
    }

    tracing::debug!(
        "Decoded {} bytes into {} instructions ({} labels)",
        code.len(),
        instructions.len(),
        labels.len()
    );
    Ok(instructions)
}

/// Decodes `WIDE`, `TABLESWITCH` and `LOOKUPSWITCH`, whose length is not fixed by the
/// opcode. Returns the item and its total length in bytes.
fn decode_variable(code: &[u8], pc: usize, op: Opcode) -> Result<(Decoded, usize)> {
    let reader = Reader { code, start: pc };
    let base = pc as i64;
    match op {
        Opcode::WIDE => {
            let inner = Opcode::from_byte(reader.bytes(pc + 1, 1)?[0]);
            let index = reader.u16(pc + 2)?;
            if inner == Opcode::IINC {
                let delta = reader.u16(pc + 4)? as i16;
                Ok((Decoded::Ready(Instruction::Iinc(index, delta)), 6))
            } else if inner.shape() == OperandShape::Local {
                Ok((Decoded::Ready(Instruction::Var(inner, index)), 4))
            } else {
                Err(Error::UnsupportedOpcode(inner))
            }
        }
        Opcode::TABLESWITCH => {
            let at = pc + 1 + switch_padding(pc);
            let default = reader.i32(at)?;
            let low = reader.i32(at + 4)?;
            let high = reader.i32(at + 8)?;
            if high < low {
                return Err(Error::MalformedSwitch(pc));
            }
            let count = usize::try_from(high as i64 - low as i64 + 1)
                .map_err(|_| Error::MalformedSwitch(pc))?;
            if count > code.len() / 4 {
                return Err(Error::Truncated(pc));
            }
            let targets = (0..count)
                .map(|n| reader.i32(at + 12 + 4 * n).map(|rel| base + rel as i64))
                .collect::<Result<Vec<_>>>()?;
            let item = Decoded::Table {
                low,
                default: base + default as i64,
                targets,
            };
            Ok((item, at + 12 + 4 * count - pc))
        }
        Opcode::LOOKUPSWITCH => {
            let at = pc + 1 + switch_padding(pc);
            let default = reader.i32(at)?;
            let count = reader.count(at + 4, 8)?;
            let pairs = (0..count)
                .map(|n| {
                    let entry = at + 8 + 8 * n;
                    Ok((reader.i32(entry)?, base + reader.i32(entry + 4)? as i64))
                })
                .collect::<Result<Vec<_>>>()?;
            let item = Decoded::Lookup {
                default: base + default as i64,
                pairs,
            };
            Ok((item, at + 8 + 8 * count - pc))
        }
        other => Err(Error::UnsupportedOpcode(other)),
    }
}

/// Maps the implicit-index forms (`ILOAD_0` .. `ASTORE_3`) to an explicit opcode and index.
fn implicit_local(byte: u8) -> Option<(Opcode, u16)> {
    const LOADS: [Opcode; 5] = [
        Opcode::ILOAD,
        Opcode::LLOAD,
        Opcode::FLOAD,
        Opcode::DLOAD,
        Opcode::ALOAD,
    ];
    const STORES: [Opcode; 5] = [
        Opcode::ISTORE,
        Opcode::LSTORE,
        Opcode::FSTORE,
        Opcode::DSTORE,
        Opcode::ASTORE,
    ];
    match byte {
        0x1a..=0x2d => {
            let n = byte - 0x1a;
            Some((LOADS[(n / 4) as usize], (n % 4) as u16))
        }
        0x3b..=0x4e => {
            let n = byte - 0x3b;
            Some((STORES[(n / 4) as usize], (n % 4) as u16))
        }
        _ => None,
    }
}

/// Parses an assembly listing as produced by `Instruction`'s `Display`.
///
/// One instruction per line; `#` starts a comment. Labels are written `L3:`, line markers
/// `LINE 12`, opaque operands as one hex token (`INVOKESTATIC 0005`).
pub fn parse_assembly(asm: &str) -> Result<Vec<Instruction>> {
    if asm.trim().is_empty() {
        return Err(Error::ParseError {
            line: 0,
            msg: "empty assembly".into(),
            raw: asm.to_string(),
        });
    }

    let mut instructions = Vec::new();
    for (line_no, raw) in asm.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let fail = |msg: &str| Error::ParseError {
            line: line_no,
            msg: msg.to_string(),
            raw: raw.to_string(),
        };

        if let Some(name) = line.strip_suffix(':') {
            let label = parse_label(name).ok_or_else(|| fail("invalid label"))?;
            instructions.push(Instruction::Label(label));
            continue;
        }

        let mut parts = line.split_whitespace();
        let mnemonic = parts.next().ok_or_else(|| fail("missing opcode"))?;
        let operands: Vec<&str> = parts.collect();

        if mnemonic == "LINE" {
            let number = single(&operands)
                .and_then(|tok| tok.parse().ok())
                .ok_or_else(|| fail("invalid line number"))?;
            instructions.push(Instruction::Line(number));
            continue;
        }

        let op = Opcode::from_str(mnemonic).map_err(|e| fail(&e.to_string()))?;
        let insn = match op.shape() {
            OperandShape::None => {
                if !operands.is_empty() {
                    return Err(fail("unexpected operand"));
                }
                bare(op).ok_or_else(|| fail("opcode needs an operand"))?
            }
            OperandShape::Local => {
                let index = single(&operands)
                    .and_then(|tok| tok.parse().ok())
                    .ok_or_else(|| fail("invalid local index"))?;
                Instruction::Var(op, index)
            }
            OperandShape::SignedByte | OperandShape::UnsignedByte | OperandShape::SignedShort => {
                let value = single(&operands)
                    .and_then(|tok| tok.parse().ok())
                    .ok_or_else(|| fail("invalid immediate"))?;
                Instruction::Int(op, value)
            }
            OperandShape::Branch16 | OperandShape::Branch32 => {
                let label = single(&operands)
                    .and_then(parse_label)
                    .ok_or_else(|| fail("invalid jump target"))?;
                Instruction::Jump(op, label)
            }
            OperandShape::Iinc => match operands.as_slice() {
                [index, delta] => {
                    let index = index.parse().map_err(|_| fail("invalid local index"))?;
                    let delta = delta.parse().map_err(|_| fail("invalid increment"))?;
                    Instruction::Iinc(index, delta)
                }
                _ => return Err(fail("IINC takes an index and an increment")),
            },
            OperandShape::Constant(len) => {
                let tok = single(&operands).ok_or_else(|| fail("missing operand bytes"))?;
                let bytes = hex::decode(tok.trim_start_matches("0x"))
                    .map_err(|_| fail("invalid operand bytes"))?;
                if bytes.len() != len {
                    return Err(fail(&format!("{op} takes {len} operand bytes")));
                }
                Instruction::Raw(op, HexBytes(bytes))
            }
            OperandShape::Variable => {
                parse_switch(op, &operands).ok_or_else(|| fail("invalid switch operands"))?
            }
        };
        instructions.push(insn);
    }
    Ok(instructions)
}

/// Parses `TABLESWITCH low L1 L2 .. default:L0` and `LOOKUPSWITCH k1:L1 .. default:L0`.
/// `WIDE` is never written; wide operands are implied by their values.
fn parse_switch(op: Opcode, operands: &[&str]) -> Option<Instruction> {
    let (last, entries) = operands.split_last()?;
    let default = parse_label(last.strip_prefix("default:")?)?;
    match op {
        Opcode::TABLESWITCH => {
            let (low, targets) = entries.split_first()?;
            Some(Instruction::TableSwitch {
                low: low.parse().ok()?,
                default,
                targets: targets
                    .iter()
                    .map(|tok| parse_label(tok))
                    .collect::<Option<_>>()?,
            })
        }
        Opcode::LOOKUPSWITCH => {
            let pairs = entries
                .iter()
                .map(|tok| {
                    let (key, label) = tok.split_once(':')?;
                    Some((key.parse().ok()?, parse_label(label)?))
                })
                .collect::<Option<_>>()?;
            Some(Instruction::LookupSwitch { default, pairs })
        }
        _ => None,
    }
}

fn single<'a>(operands: &[&'a str]) -> Option<&'a str> {
    match operands {
        [only] => Some(only),
        _ => None,
    }
}

fn parse_label(token: &str) -> Option<Label> {
    token.strip_prefix('L')?.parse().ok().map(Label)
}
