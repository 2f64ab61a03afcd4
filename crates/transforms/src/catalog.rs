//! The mutation operators the engine knows.
//!
//! | Group | Mutators |
//! |---|---|
//! | `AOR` | addition, subtraction, multiplication, division and modulus replacement |
//! | `ROR` | `==`, `!=`, `>=`, `>`, `<=`, `<` replacement |
//! | `AOD` | deletion of the first or second arithmetic operand |
//!
//! Every mutator is a [`Stage`], so any subset of the catalog can be put into a
//! [`Pipeline`](crate::pipeline::Pipeline).

/// Builds a `&'static` entry slice for a [`SubstitutionTable`](crate::substitution::SubstitutionTable).
///
/// Each `;`-terminated group lists `FROM => TO` opcode pairs sharing one description.
macro_rules! substitutions {
    ($($($from:ident => $to:ident),+ : $description:literal;)*) => {
        &[$($(
            (
                Opcode::$from,
                Substitution {
                    replacement: Opcode::$to,
                    description: $description,
                },
            ),
        )+)*]
    };
}

pub mod arithmetic;
pub mod relational;

use crate::context::MutationContext;
use crate::deletion::{self, Operand};
use crate::pipeline::{Emitter, Stage};
use crate::substitution::{self, SubstitutionTable, TableKind};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use stackmut_core::Instruction;
use stackmut_core::opcode::Relation;
use std::fmt;

/// Family a mutator belongs to, usable as a selection string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    /// Arithmetic operator replacement.
    #[serde(rename = "AOR")]
    Aor,
    /// Relational operator replacement.
    #[serde(rename = "ROR")]
    Ror,
    /// Arithmetic operand deletion.
    #[serde(rename = "AOD")]
    Aod,
}

impl Group {
    pub const fn name(self) -> &'static str {
        match self {
            Group::Aor => "AOR",
            Group::Ror => "ROR",
            Group::Aod => "AOD",
        }
    }
}

/// How a mutator rewrites an instruction.
#[derive(Debug, Clone, Copy)]
pub enum MutatorKind {
    /// Zero-operand instruction substitution.
    Insn(&'static SubstitutionTable),
    /// Conditional branch substitution.
    Jump(&'static SubstitutionTable),
    /// Operand deletion.
    Deletion(Operand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mutator {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulus,
    Equals,
    NotEqual,
    GreaterOrEqual,
    Greater,
    LessOrEqual,
    Less,
    DeleteFirstOperand,
    DeleteSecondOperand,
}

impl Mutator {
    /// The whole catalog, in enumeration order.
    pub const ALL: [Mutator; 13] = [
        Mutator::Addition,
        Mutator::Subtraction,
        Mutator::Multiplication,
        Mutator::Division,
        Mutator::Modulus,
        Mutator::Equals,
        Mutator::NotEqual,
        Mutator::GreaterOrEqual,
        Mutator::Greater,
        Mutator::LessOrEqual,
        Mutator::Less,
        Mutator::DeleteFirstOperand,
        Mutator::DeleteSecondOperand,
    ];

    /// Identifier stored in every [`MutationIdentifier`](crate::MutationIdentifier) the
    /// mutator produces.
    pub const fn global_id(self) -> &'static str {
        match self {
            Mutator::Addition => "aor.addition",
            Mutator::Subtraction => "aor.subtraction",
            Mutator::Multiplication => "aor.multiplication",
            Mutator::Division => "aor.division",
            Mutator::Modulus => "aor.modulus",
            Mutator::Equals => "ror.equals",
            Mutator::NotEqual => "ror.not_equal",
            Mutator::GreaterOrEqual => "ror.greater_or_equal",
            Mutator::Greater => "ror.greater",
            Mutator::LessOrEqual => "ror.less_or_equal",
            Mutator::Less => "ror.less",
            Mutator::DeleteFirstOperand => "aod.delete_first_operand",
            Mutator::DeleteSecondOperand => "aod.delete_second_operand",
        }
    }

    /// Display name used in reports.
    pub const fn name(self) -> &'static str {
        match self {
            Mutator::Addition => "ADDITION_MUTATOR",
            Mutator::Subtraction => "SUBTRACTION_MUTATOR",
            Mutator::Multiplication => "MULTIPLICATION_MUTATOR",
            Mutator::Division => "DIVISION_MUTATOR",
            Mutator::Modulus => "MODULUS_MUTATOR",
            Mutator::Equals => "EQUALS_MUTATOR",
            Mutator::NotEqual => "NOT_EQUAL_MUTATOR",
            Mutator::GreaterOrEqual => "GREATER_OR_EQUAL_MUTATOR",
            Mutator::Greater => "GREATER_MUTATOR",
            Mutator::LessOrEqual => "LESS_OR_EQUAL_MUTATOR",
            Mutator::Less => "LESS_MUTATOR",
            Mutator::DeleteFirstOperand => "DELETE_FIRST_OPERAND",
            Mutator::DeleteSecondOperand => "DELETE_SECOND_OPERAND",
        }
    }

    pub const fn group(self) -> Group {
        match self {
            Mutator::Addition
            | Mutator::Subtraction
            | Mutator::Multiplication
            | Mutator::Division
            | Mutator::Modulus => Group::Aor,
            Mutator::Equals
            | Mutator::NotEqual
            | Mutator::GreaterOrEqual
            | Mutator::Greater
            | Mutator::LessOrEqual
            | Mutator::Less => Group::Ror,
            Mutator::DeleteFirstOperand | Mutator::DeleteSecondOperand => Group::Aod,
        }
    }

    pub fn kind(self) -> MutatorKind {
        match self {
            Mutator::Addition => MutatorKind::Insn(&arithmetic::ADDITION),
            Mutator::Subtraction => MutatorKind::Insn(&arithmetic::SUBTRACTION),
            Mutator::Multiplication => MutatorKind::Insn(&arithmetic::MULTIPLICATION),
            Mutator::Division => MutatorKind::Insn(&arithmetic::DIVISION),
            Mutator::Modulus => MutatorKind::Insn(&arithmetic::MODULUS),
            Mutator::Equals => MutatorKind::Jump(&relational::EQUALS),
            Mutator::NotEqual => MutatorKind::Jump(&relational::NOT_EQUAL),
            Mutator::GreaterOrEqual => MutatorKind::Jump(&relational::GREATER_OR_EQUAL),
            Mutator::Greater => MutatorKind::Jump(&relational::GREATER),
            Mutator::LessOrEqual => MutatorKind::Jump(&relational::LESS_OR_EQUAL),
            Mutator::Less => MutatorKind::Jump(&relational::LESS),
            Mutator::DeleteFirstOperand => MutatorKind::Deletion(Operand::First),
            Mutator::DeleteSecondOperand => MutatorKind::Deletion(Operand::Second),
        }
    }

    /// The relation every branch is rewritten into, for `ROR` mutators.
    pub const fn relation(self) -> Option<Relation> {
        match self {
            Mutator::Equals => Some(Relation::Eq),
            Mutator::NotEqual => Some(Relation::Ne),
            Mutator::GreaterOrEqual => Some(Relation::Ge),
            Mutator::Greater => Some(Relation::Gt),
            Mutator::LessOrEqual => Some(Relation::Le),
            Mutator::Less => Some(Relation::Lt),
            _ => None,
        }
    }

    /// Looks a mutator up by display name or global id, ignoring case.
    pub fn from_name(name: &str) -> Option<Mutator> {
        Mutator::ALL.into_iter().find(|mutator| {
            mutator.name().eq_ignore_ascii_case(name) || mutator.global_id().eq_ignore_ascii_case(name)
        })
    }

    /// Resolves a selection string: `ALL`, a group name, a display name or a global id.
    pub fn from_selection(selection: &str) -> Result<Vec<Mutator>> {
        let selection = selection.trim();
        if selection.eq_ignore_ascii_case("ALL") {
            return Ok(Mutator::ALL.to_vec());
        }
        let by_group: Vec<Mutator> = Mutator::ALL
            .into_iter()
            .filter(|mutator| mutator.group().name().eq_ignore_ascii_case(selection))
            .collect();
        if !by_group.is_empty() {
            return Ok(by_group);
        }
        Mutator::from_name(selection)
            .map(|mutator| vec![mutator])
            .ok_or_else(|| Error::UnknownMutator(selection.to_string()))
    }

    /// Checks the mutator's table, if it has one.
    pub fn validate(self) -> Result<()> {
        match self.kind() {
            MutatorKind::Insn(table) => table.validate(TableKind::Plain),
            MutatorKind::Jump(table) => table.validate(TableKind::Branch),
            MutatorKind::Deletion(_) => Ok(()),
        }
    }
}

impl fmt::Display for Mutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Stage for Mutator {
    fn name(&self) -> &'static str {
        Mutator::name(*self)
    }

    fn visit(
        &self,
        index: usize,
        instruction: &Instruction,
        ctx: &mut MutationContext,
        out: &mut Emitter,
    ) {
        let id = self.global_id();
        match self.kind() {
            MutatorKind::Insn(table) => {
                substitution::visit_plain(table, id, index, instruction, ctx, out)
            }
            MutatorKind::Jump(table) => {
                substitution::visit_branch(table, id, index, instruction, ctx, out)
            }
            MutatorKind::Deletion(operand) => {
                deletion::visit(operand, id, index, instruction, ctx, out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackmut_core::opcode::{CompareFamily, Comparison};
    use std::collections::HashSet;

    #[test]
    fn every_table_is_consistent() {
        for mutator in Mutator::ALL {
            mutator.validate().unwrap();
        }
    }

    #[test]
    fn arithmetic_tables_cover_the_other_operators() {
        for mutator in &Mutator::ALL[..5] {
            let MutatorKind::Insn(table) = mutator.kind() else {
                panic!("{mutator} is not a plain substitution");
            };
            assert_eq!(table.len(), 16, "{mutator}");
        }
    }

    #[test]
    fn relational_tables_are_closed_over_their_families() {
        for mutator in Mutator::ALL {
            let (Some(relation), MutatorKind::Jump(table)) = (mutator.relation(), mutator.kind())
            else {
                continue;
            };
            let mut expected = 0;
            for family in CompareFamily::ALL {
                if !relation.is_equality() && !family.is_ordered() {
                    continue;
                }
                let target = Comparison { family, relation }.opcode().unwrap();
                for other in Relation::ALL {
                    if other == relation || (!other.is_equality() && !family.is_ordered()) {
                        continue;
                    }
                    let from = Comparison {
                        family,
                        relation: other,
                    }
                    .opcode()
                    .unwrap();
                    let entry = table.lookup(from).unwrap_or_else(|| panic!("{mutator} misses {from}"));
                    assert_eq!(entry.replacement, target, "{mutator}: {from}");
                    expected += 1;
                }
            }
            assert_eq!(table.len(), expected, "{mutator} has extra entries");
        }
    }

    #[test]
    fn ids_and_names_are_unique() {
        let ids: HashSet<_> = Mutator::ALL.iter().map(|m| m.global_id()).collect();
        let names: HashSet<_> = Mutator::ALL.iter().map(|m| m.name()).collect();
        assert_eq!(ids.len(), 13);
        assert_eq!(names.len(), 13);
    }

    #[test]
    fn selections_resolve_groups_names_and_ids() {
        assert_eq!(Mutator::from_selection("all").unwrap().len(), 13);
        assert_eq!(Mutator::from_selection("AOR").unwrap().len(), 5);
        assert_eq!(Mutator::from_selection("ror").unwrap().len(), 6);
        assert_eq!(
            Mutator::from_selection("aod").unwrap(),
            vec![Mutator::DeleteFirstOperand, Mutator::DeleteSecondOperand]
        );
        assert_eq!(
            Mutator::from_selection("greater_mutator").unwrap(),
            vec![Mutator::Greater]
        );
        assert_eq!(
            Mutator::from_selection("ror.less_or_equal").unwrap(),
            vec![Mutator::LessOrEqual]
        );
        assert!(matches!(
            Mutator::from_selection("NEGATE"),
            Err(Error::UnknownMutator(_))
        ));
    }
}
