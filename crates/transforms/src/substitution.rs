//! Table-driven opcode substitution.
//!
//! A [`SubstitutionTable`] maps an opcode to its replacement and a description of the
//! change. The same lookup drives both kinds of substitution: plain zero-operand
//! instructions ([`visit_plain`]) and conditional branches ([`visit_branch`]), where the
//! jump target is kept and only the condition changes.

use crate::context::MutationContext;
use crate::pipeline::Emitter;
use crate::{Error, Result};
use stackmut_core::stack;
use stackmut_core::{Instruction, Opcode};
use std::collections::HashSet;
use tracing::debug;

/// Replacement for one matched opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution {
    pub replacement: Opcode,
    pub description: &'static str,
}

/// Which instruction shape a table rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Zero-operand instructions.
    Plain,
    /// Conditional branches.
    Branch,
}

/// Immutable opcode substitution table.
#[derive(Debug)]
pub struct SubstitutionTable {
    pub name: &'static str,
    entries: &'static [(Opcode, Substitution)],
}

impl SubstitutionTable {
    pub const fn new(name: &'static str, entries: &'static [(Opcode, Substitution)]) -> Self {
        Self { name, entries }
    }

    pub fn lookup(&self, op: Opcode) -> Option<&Substitution> {
        self.entries
            .iter()
            .find(|(matched, _)| *matched == op)
            .map(|(_, substitution)| substitution)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks the table invariants.
    ///
    /// No opcode maps to itself or appears twice, every description ends with
    /// `"<from> to <to>"` in operator symbols, plain entries keep the stack effect and
    /// branch entries stay within their comparison family.
    pub fn validate(&self, kind: TableKind) -> Result<()> {
        let invalid = |msg: String| Error::InvalidTable {
            table: self.name,
            msg,
        };
        let mut seen = HashSet::new();
        for (from, substitution) in self.entries {
            let to = substitution.replacement;
            if *from == to {
                return Err(invalid(format!("{from} maps to itself")));
            }
            if !seen.insert(*from) {
                return Err(invalid(format!("{from} appears twice")));
            }

            let (Some(from_symbol), Some(to_symbol)) = (from.operator_symbol(), to.operator_symbol())
            else {
                return Err(invalid(format!("{from} -> {to} is not an operator change")));
            };
            let suffix = format!("{from_symbol} to {to_symbol}");
            if substitution.description.is_empty() || !substitution.description.ends_with(&suffix) {
                return Err(invalid(format!(
                    "description of {from} '{}' does not end with '{suffix}'",
                    substitution.description
                )));
            }

            match kind {
                TableKind::Plain => {
                    let before = stack::effect(&Instruction::Insn(*from));
                    let after = stack::effect(&Instruction::Insn(to));
                    if before.is_none() || before != after {
                        return Err(invalid(format!("{from} -> {to} changes the stack effect")));
                    }
                }
                TableKind::Branch => {
                    let family = |op: Opcode| op.comparison().map(|c| c.family);
                    if family(*from).is_none() || family(*from) != family(to) {
                        return Err(invalid(format!("{from} -> {to} leaves its comparison family")));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Substitutes a zero-operand instruction found in `table`; forwards anything else.
pub fn visit_plain(
    table: &SubstitutionTable,
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
    let Some(substitution) = table.lookup(*op) else {
        out.forward(instruction);
        return;
    };

    let id = ctx.register(mutator, index, substitution.description);
    if ctx.should_mutate(&id) {
        debug!("{}: {} -> {} at {}", table.name, op, substitution.replacement, index);
        out.emit(Instruction::Insn(substitution.replacement));
    } else {
        out.forward(instruction);
    }
}

/// Substitutes the condition of a branch found in `table`, keeping its label.
pub fn visit_branch(
    table: &SubstitutionTable,
    mutator: &str,
    index: usize,
    instruction: &Instruction,
    ctx: &mut MutationContext,
    out: &mut Emitter,
) {
    let Instruction::Jump(op, label) = instruction else {
        out.forward(instruction);
        return;
    };
    let Some(substitution) = table.lookup(*op) else {
        out.forward(instruction);
        return;
    };

    let id = ctx.register(mutator, index, substitution.description);
    if ctx.should_mutate(&id) {
        debug!(
            "{}: {} {} -> {} {} at {}",
            table.name, op, label, substitution.replacement, label, index
        );
        out.emit(Instruction::Jump(substitution.replacement, *label));
    } else {
        out.forward(instruction);
    }
}
