//! Arithmetic operator replacement tables.
//!
//! Each table rewrites every other binary operator into its own, for all four value types.

use crate::substitution::{Substitution, SubstitutionTable};
use stackmut_core::Opcode;

pub static ADDITION: SubstitutionTable = SubstitutionTable::new(
    "ADDITION",
    substitutions![
        ISUB => IADD, LSUB => LADD, FSUB => FADD, DSUB => DADD: "AOR: Changed - to +";
        IMUL => IADD, LMUL => LADD, FMUL => FADD, DMUL => DADD: "AOR: Changed * to +";
        IDIV => IADD, LDIV => LADD, FDIV => FADD, DDIV => DADD: "AOR: Changed / to +";
        IREM => IADD, LREM => LADD, FREM => FADD, DREM => DADD: "AOR: Changed % to +";
    ],
);

pub static SUBTRACTION: SubstitutionTable = SubstitutionTable::new(
    "SUBTRACTION",
    substitutions![
        IADD => ISUB, LADD => LSUB, FADD => FSUB, DADD => DSUB: "AOR: Changed + to -";
        IMUL => ISUB, LMUL => LSUB, FMUL => FSUB, DMUL => DSUB: "AOR: Changed * to -";
        IDIV => ISUB, LDIV => LSUB, FDIV => FSUB, DDIV => DSUB: "AOR: Changed / to -";
        IREM => ISUB, LREM => LSUB, FREM => FSUB, DREM => DSUB: "AOR: Changed % to -";
    ],
);

pub static MULTIPLICATION: SubstitutionTable = SubstitutionTable::new(
    "MULTIPLICATION",
    substitutions![
        IADD => IMUL, LADD => LMUL, FADD => FMUL, DADD => DMUL: "AOR: Changed + to *";
        ISUB => IMUL, LSUB => LMUL, FSUB => FMUL, DSUB => DMUL: "AOR: Changed - to *";
        IDIV => IMUL, LDIV => LMUL, FDIV => FMUL, DDIV => DMUL: "AOR: Changed / to *";
        IREM => IMUL, LREM => LMUL, FREM => FMUL, DREM => DMUL: "AOR: Changed % to *";
    ],
);

pub static DIVISION: SubstitutionTable = SubstitutionTable::new(
    "DIVISION",
    substitutions![
        IADD => IDIV, LADD => LDIV, FADD => FDIV, DADD => DDIV: "AOR: Changed + to /";
        ISUB => IDIV, LSUB => LDIV, FSUB => FDIV, DSUB => DDIV: "AOR: Changed - to /";
        IMUL => IDIV, LMUL => LDIV, FMUL => FDIV, DMUL => DDIV: "AOR: Changed * to /";
        IREM => IDIV, LREM => LDIV, FREM => FDIV, DREM => DDIV: "AOR: Changed % to /";
    ],
);

pub static MODULUS: SubstitutionTable = SubstitutionTable::new(
    "MODULUS",
    substitutions![
        IADD => IREM, LADD => LREM, FADD => FREM, DADD => DREM: "AOR: Changed + to %";
        ISUB => IREM, LSUB => LREM, FSUB => FREM, DSUB => DREM: "AOR: Changed - to %";
        IMUL => IREM, LMUL => LREM, FMUL => FREM, DMUL => DREM: "AOR: Changed * to %";
        IDIV => IREM, LDIV => LREM, FDIV => FREM, DDIV => DREM: "AOR: Changed / to %";
    ],
);
