//! Relational operator replacement tables.
//!
//! Each table rewrites every other comparison of a family into the table's relation, so the
//! branch keeps its operands and target and only the condition changes. The ordered
//! relations exist for int comparisons only; the equality tables also cover reference and
//! null tests.

use crate::substitution::{Substitution, SubstitutionTable};
use stackmut_core::Opcode;

pub static EQUALS: SubstitutionTable = SubstitutionTable::new(
    "EQUALS",
    substitutions![
        IFGT => IFEQ, IF_ICMPGT => IF_ICMPEQ: "ROR: Changed > to ==";
        IFLT => IFEQ, IF_ICMPLT => IF_ICMPEQ: "ROR: Changed < to ==";
        IFGE => IFEQ, IF_ICMPGE => IF_ICMPEQ: "ROR: Changed >= to ==";
        IFLE => IFEQ, IF_ICMPLE => IF_ICMPEQ: "ROR: Changed <= to ==";
        IFNE => IFEQ, IF_ICMPNE => IF_ICMPEQ, IF_ACMPNE => IF_ACMPEQ, IFNONNULL => IFNULL:
            "ROR: Changed != to ==";
    ],
);

pub static NOT_EQUAL: SubstitutionTable = SubstitutionTable::new(
    "NOT_EQUAL",
    substitutions![
        IFGT => IFNE, IF_ICMPGT => IF_ICMPNE: "ROR: Changed > to !=";
        IFLT => IFNE, IF_ICMPLT => IF_ICMPNE: "ROR: Changed < to !=";
        IFGE => IFNE, IF_ICMPGE => IF_ICMPNE: "ROR: Changed >= to !=";
        IFLE => IFNE, IF_ICMPLE => IF_ICMPNE: "ROR: Changed <= to !=";
        IFEQ => IFNE, IF_ICMPEQ => IF_ICMPNE, IF_ACMPEQ => IF_ACMPNE, IFNULL => IFNONNULL:
            "ROR: Changed == to !=";
    ],
);

pub static GREATER_OR_EQUAL: SubstitutionTable = SubstitutionTable::new(
    "GREATER_OR_EQUAL",
    substitutions![
        IFGT => IFGE, IF_ICMPGT => IF_ICMPGE: "ROR: Changed > to >=";
        IFLT => IFGE, IF_ICMPLT => IF_ICMPGE: "ROR: Changed < to >=";
        IFNE => IFGE, IF_ICMPNE => IF_ICMPGE: "ROR: Changed != to >=";
        IFLE => IFGE, IF_ICMPLE => IF_ICMPGE: "ROR: Changed <= to >=";
        IFEQ => IFGE, IF_ICMPEQ => IF_ICMPGE: "ROR: Changed == to >=";
    ],
);

pub static GREATER: SubstitutionTable = SubstitutionTable::new(
    "GREATER",
    substitutions![
        IFGE => IFGT, IF_ICMPGE => IF_ICMPGT: "ROR: Changed >= to >";
        IFLT => IFGT, IF_ICMPLT => IF_ICMPGT: "ROR: Changed < to >";
        IFNE => IFGT, IF_ICMPNE => IF_ICMPGT: "ROR: Changed != to >";
        IFLE => IFGT, IF_ICMPLE => IF_ICMPGT: "ROR: Changed <= to >";
        IFEQ => IFGT, IF_ICMPEQ => IF_ICMPGT: "ROR: Changed == to >";
    ],
);

pub static LESS_OR_EQUAL: SubstitutionTable = SubstitutionTable::new(
    "LESS_OR_EQUAL",
    substitutions![
        IFGT => IFLE, IF_ICMPGT => IF_ICMPLE: "ROR: Changed > to <=";
        IFLT => IFLE, IF_ICMPLT => IF_ICMPLE: "ROR: Changed < to <=";
        IFNE => IFLE, IF_ICMPNE => IF_ICMPLE: "ROR: Changed != to <=";
        IFGE => IFLE, IF_ICMPGE => IF_ICMPLE: "ROR: Changed >= to <=";
        IFEQ => IFLE, IF_ICMPEQ => IF_ICMPLE: "ROR: Changed == to <=";
    ],
);

pub static LESS: SubstitutionTable = SubstitutionTable::new(
    "LESS",
    substitutions![
        IFGT => IFLT, IF_ICMPGT => IF_ICMPLT: "ROR: Changed > to <";
        IFLE => IFLT, IF_ICMPLE => IF_ICMPLT: "ROR: Changed <= to <";
        IFNE => IFLT, IF_ICMPNE => IF_ICMPLT: "ROR: Changed != to <";
        IFGE => IFLT, IF_ICMPGE => IF_ICMPLT: "ROR: Changed >= to <";
        IFEQ => IFLT, IF_ICMPEQ => IF_ICMPLT: "ROR: Changed == to <";
    ],
);
