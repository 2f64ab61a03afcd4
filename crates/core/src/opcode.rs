//! JVM opcodes and the static facts the mutation engine derives from them.
//!
//! The enumeration mirrors the class-file instruction set. The implicit-index short forms
//! (`ILOAD_0`, `ASTORE_3`, ...) are not listed: the decoder folds them into their explicit
//! counterparts so every local access is a `Var` instruction. Any byte without a variant
//! decodes as [`Opcode::UNKNOWN`].

use crate::result::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! opcodes {
    ($($name:ident = $byte:literal,)*) => {
        /// A single JVM opcode.
        #[allow(non_camel_case_types, clippy::upper_case_acronyms)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Opcode {
            $($name,)*
            /// A byte value with no named opcode.
            UNKNOWN(u8),
        }

        impl Opcode {
            /// Maps a raw byte to its opcode.
            pub const fn from_byte(byte: u8) -> Self {
                match byte {
                    $($byte => Opcode::$name,)*
                    other => Opcode::UNKNOWN(other),
                }
            }

            /// Returns the byte encoding of the opcode.
            pub const fn to_byte(self) -> u8 {
                match self {
                    $(Opcode::$name => $byte,)*
                    Opcode::UNKNOWN(byte) => byte,
                }
            }

            /// Returns the mnemonic, or `None` for unknown bytes.
            pub const fn mnemonic(self) -> Option<&'static str> {
                match self {
                    $(Opcode::$name => Some(stringify!($name)),)*
                    Opcode::UNKNOWN(_) => None,
                }
            }

            fn from_mnemonic(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($name) => Some(Opcode::$name),)*
                    _ => None,
                }
            }
        }
    };
}

opcodes! {
    NOP = 0x00,
    ACONST_NULL = 0x01,
    ICONST_M1 = 0x02,
    ICONST_0 = 0x03,
    ICONST_1 = 0x04,
    ICONST_2 = 0x05,
    ICONST_3 = 0x06,
    ICONST_4 = 0x07,
    ICONST_5 = 0x08,
    LCONST_0 = 0x09,
    LCONST_1 = 0x0a,
    FCONST_0 = 0x0b,
    FCONST_1 = 0x0c,
    FCONST_2 = 0x0d,
    DCONST_0 = 0x0e,
    DCONST_1 = 0x0f,
    BIPUSH = 0x10,
    SIPUSH = 0x11,
    LDC = 0x12,
    LDC_W = 0x13,
    LDC2_W = 0x14,
    ILOAD = 0x15,
    LLOAD = 0x16,
    FLOAD = 0x17,
    DLOAD = 0x18,
    ALOAD = 0x19,
    IALOAD = 0x2e,
    LALOAD = 0x2f,
    FALOAD = 0x30,
    DALOAD = 0x31,
    AALOAD = 0x32,
    BALOAD = 0x33,
    CALOAD = 0x34,
    SALOAD = 0x35,
    ISTORE = 0x36,
    LSTORE = 0x37,
    FSTORE = 0x38,
    DSTORE = 0x39,
    ASTORE = 0x3a,
    IASTORE = 0x4f,
    LASTORE = 0x50,
    FASTORE = 0x51,
    DASTORE = 0x52,
    AASTORE = 0x53,
    BASTORE = 0x54,
    CASTORE = 0x55,
    SASTORE = 0x56,
    POP = 0x57,
    POP2 = 0x58,
    DUP = 0x59,
    DUP_X1 = 0x5a,
    DUP_X2 = 0x5b,
    DUP2 = 0x5c,
    DUP2_X1 = 0x5d,
    DUP2_X2 = 0x5e,
    SWAP = 0x5f,
    IADD = 0x60,
    LADD = 0x61,
    FADD = 0x62,
    DADD = 0x63,
    ISUB = 0x64,
    LSUB = 0x65,
    FSUB = 0x66,
    DSUB = 0x67,
    IMUL = 0x68,
    LMUL = 0x69,
    FMUL = 0x6a,
    DMUL = 0x6b,
    IDIV = 0x6c,
    LDIV = 0x6d,
    FDIV = 0x6e,
    DDIV = 0x6f,
    IREM = 0x70,
    LREM = 0x71,
    FREM = 0x72,
    DREM = 0x73,
    INEG = 0x74,
    LNEG = 0x75,
    FNEG = 0x76,
    DNEG = 0x77,
    ISHL = 0x78,
    LSHL = 0x79,
    ISHR = 0x7a,
    LSHR = 0x7b,
    IUSHR = 0x7c,
    LUSHR = 0x7d,
    IAND = 0x7e,
    LAND = 0x7f,
    IOR = 0x80,
    LOR = 0x81,
    IXOR = 0x82,
    LXOR = 0x83,
    IINC = 0x84,
    I2L = 0x85,
    I2F = 0x86,
    I2D = 0x87,
    L2I = 0x88,
    L2F = 0x89,
    L2D = 0x8a,
    F2I = 0x8b,
    F2L = 0x8c,
    F2D = 0x8d,
    D2I = 0x8e,
    D2L = 0x8f,
    D2F = 0x90,
    I2B = 0x91,
    I2C = 0x92,
    I2S = 0x93,
    LCMP = 0x94,
    FCMPL = 0x95,
    FCMPG = 0x96,
    DCMPL = 0x97,
    DCMPG = 0x98,
    IFEQ = 0x99,
    IFNE = 0x9a,
    IFLT = 0x9b,
    IFGE = 0x9c,
    IFGT = 0x9d,
    IFLE = 0x9e,
    IF_ICMPEQ = 0x9f,
    IF_ICMPNE = 0xa0,
    IF_ICMPLT = 0xa1,
    IF_ICMPGE = 0xa2,
    IF_ICMPGT = 0xa3,
    IF_ICMPLE = 0xa4,
    IF_ACMPEQ = 0xa5,
    IF_ACMPNE = 0xa6,
    GOTO = 0xa7,
    JSR = 0xa8,
    RET = 0xa9,
    TABLESWITCH = 0xaa,
    LOOKUPSWITCH = 0xab,
    IRETURN = 0xac,
    LRETURN = 0xad,
    FRETURN = 0xae,
    DRETURN = 0xaf,
    ARETURN = 0xb0,
    RETURN = 0xb1,
    GETSTATIC = 0xb2,
    PUTSTATIC = 0xb3,
    GETFIELD = 0xb4,
    PUTFIELD = 0xb5,
    INVOKEVIRTUAL = 0xb6,
    INVOKESPECIAL = 0xb7,
    INVOKESTATIC = 0xb8,
    INVOKEINTERFACE = 0xb9,
    INVOKEDYNAMIC = 0xba,
    NEW = 0xbb,
    NEWARRAY = 0xbc,
    ANEWARRAY = 0xbd,
    ARRAYLENGTH = 0xbe,
    ATHROW = 0xbf,
    CHECKCAST = 0xc0,
    INSTANCEOF = 0xc1,
    MONITORENTER = 0xc2,
    MONITOREXIT = 0xc3,
    WIDE = 0xc4,
    MULTIANEWARRAY = 0xc5,
    IFNULL = 0xc6,
    IFNONNULL = 0xc7,
    GOTO_W = 0xc8,
    JSR_W = 0xc9,
}

/// How the bytes following an opcode are laid out in the code array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandShape {
    /// No operand bytes.
    None,
    /// Unsigned one-byte local variable index.
    Local,
    /// Signed one-byte immediate (`BIPUSH`).
    SignedByte,
    /// Unsigned one-byte immediate (`NEWARRAY` array type).
    UnsignedByte,
    /// Signed two-byte immediate (`SIPUSH`).
    SignedShort,
    /// Signed two-byte branch offset.
    Branch16,
    /// Signed four-byte branch offset.
    Branch32,
    /// Local index byte followed by a signed increment byte.
    Iinc,
    /// Fixed number of opaque bytes (constant-pool references and friends).
    Constant(usize),
    /// Padded or prefixed layouts the engine does not model.
    Variable,
}

impl OperandShape {
    /// Number of operand bytes, or `None` for [`OperandShape::Variable`].
    pub const fn operand_len(self) -> Option<usize> {
        match self {
            OperandShape::None => Some(0),
            OperandShape::Local | OperandShape::SignedByte | OperandShape::UnsignedByte => Some(1),
            OperandShape::SignedShort | OperandShape::Branch16 | OperandShape::Iinc => Some(2),
            OperandShape::Branch32 => Some(4),
            OperandShape::Constant(len) => Some(len),
            OperandShape::Variable => None,
        }
    }
}

/// Stack width of the operands consumed by an arithmetic instruction.
///
/// `int` and `float` values occupy one operand-stack word, `long` and `double` values two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandSize {
    Single,
    Double,
}

/// The relation tested by a conditional branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Relation {
    Eq,
    Ne,
    Lt,
    Ge,
    Gt,
    Le,
}

impl Relation {
    pub const ALL: [Relation; 6] = [
        Relation::Eq,
        Relation::Ne,
        Relation::Lt,
        Relation::Ge,
        Relation::Gt,
        Relation::Le,
    ];

    pub const fn symbol(self) -> &'static str {
        match self {
            Relation::Eq => "==",
            Relation::Ne => "!=",
            Relation::Lt => "<",
            Relation::Ge => ">=",
            Relation::Gt => ">",
            Relation::Le => "<=",
        }
    }

    pub const fn is_equality(self) -> bool {
        matches!(self, Relation::Eq | Relation::Ne)
    }
}

/// Operands a conditional branch compares.
///
/// A branch may only ever be rewritten into another branch of the same family, since the
/// families differ in how many stack words they consume and of which type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompareFamily {
    /// `IFxx`: one int against zero.
    Zero,
    /// `IF_ICMPxx`: two ints.
    Int,
    /// `IF_ACMPxx`: two references.
    Reference,
    /// `IFNULL` / `IFNONNULL`: one reference against null.
    Null,
}

impl CompareFamily {
    pub const ALL: [CompareFamily; 4] = [
        CompareFamily::Zero,
        CompareFamily::Int,
        CompareFamily::Reference,
        CompareFamily::Null,
    ];

    /// Whether ordering relations exist in this family.
    pub const fn is_ordered(self) -> bool {
        matches!(self, CompareFamily::Zero | CompareFamily::Int)
    }
}

/// Family and relation of a conditional branch opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Comparison {
    pub family: CompareFamily,
    pub relation: Relation,
}

impl Comparison {
    /// The branch opcode testing this comparison, if the family supports the relation.
    pub const fn opcode(self) -> Option<Opcode> {
        use CompareFamily::*;
        use Relation::*;
        let op = match (self.family, self.relation) {
            (Zero, Eq) => Opcode::IFEQ,
            (Zero, Ne) => Opcode::IFNE,
            (Zero, Lt) => Opcode::IFLT,
            (Zero, Ge) => Opcode::IFGE,
            (Zero, Gt) => Opcode::IFGT,
            (Zero, Le) => Opcode::IFLE,
            (Int, Eq) => Opcode::IF_ICMPEQ,
            (Int, Ne) => Opcode::IF_ICMPNE,
            (Int, Lt) => Opcode::IF_ICMPLT,
            (Int, Ge) => Opcode::IF_ICMPGE,
            (Int, Gt) => Opcode::IF_ICMPGT,
            (Int, Le) => Opcode::IF_ICMPLE,
            (Reference, Eq) => Opcode::IF_ACMPEQ,
            (Reference, Ne) => Opcode::IF_ACMPNE,
            (Null, Eq) => Opcode::IFNULL,
            (Null, Ne) => Opcode::IFNONNULL,
            _ => return None,
        };
        Some(op)
    }
}

impl Opcode {
    /// Operand layout of this opcode in the code array.
    pub const fn shape(self) -> OperandShape {
        use Opcode::*;
        match self {
            ILOAD | LLOAD | FLOAD | DLOAD | ALOAD | ISTORE | LSTORE | FSTORE | DSTORE | ASTORE
            | RET => OperandShape::Local,
            BIPUSH => OperandShape::SignedByte,
            NEWARRAY => OperandShape::UnsignedByte,
            SIPUSH => OperandShape::SignedShort,
            IFEQ | IFNE | IFLT | IFGE | IFGT | IFLE | IF_ICMPEQ | IF_ICMPNE | IF_ICMPLT
            | IF_ICMPGE | IF_ICMPGT | IF_ICMPLE | IF_ACMPEQ | IF_ACMPNE | GOTO | JSR | IFNULL
            | IFNONNULL => OperandShape::Branch16,
            GOTO_W | JSR_W => OperandShape::Branch32,
            IINC => OperandShape::Iinc,
            LDC => OperandShape::Constant(1),
            LDC_W | LDC2_W | GETSTATIC | PUTSTATIC | GETFIELD | PUTFIELD | INVOKEVIRTUAL
            | INVOKESPECIAL | INVOKESTATIC | NEW | ANEWARRAY | CHECKCAST | INSTANCEOF => {
                OperandShape::Constant(2)
            }
            MULTIANEWARRAY => OperandShape::Constant(3),
            INVOKEINTERFACE | INVOKEDYNAMIC => OperandShape::Constant(4),
            TABLESWITCH | LOOKUPSWITCH | WIDE => OperandShape::Variable,
            _ => OperandShape::None,
        }
    }

    /// Whether the opcode transfers control to a label.
    pub const fn is_jump(self) -> bool {
        matches!(self.shape(), OperandShape::Branch16 | OperandShape::Branch32)
    }

    /// Whether the opcode returns from the method.
    pub const fn is_return(self) -> bool {
        use Opcode::*;
        matches!(self, IRETURN | LRETURN | FRETURN | DRETURN | ARETURN | RETURN)
    }

    /// Operand size of a binary `add`/`sub`/`mul`/`div`/`rem` instruction, `None` for any
    /// other opcode.
    pub const fn arithmetic_size(self) -> Option<OperandSize> {
        use Opcode::*;
        match self {
            IADD | ISUB | IMUL | IDIV | IREM | FADD | FSUB | FMUL | FDIV | FREM => {
                Some(OperandSize::Single)
            }
            LADD | LSUB | LMUL | LDIV | LREM | DADD | DSUB | DMUL | DDIV | DREM => {
                Some(OperandSize::Double)
            }
            _ => None,
        }
    }

    /// Family and relation of a conditional branch, `None` for anything else.
    pub const fn comparison(self) -> Option<Comparison> {
        use CompareFamily::*;
        use Opcode::*;
        use Relation::*;
        let (family, relation) = match self {
            IFEQ => (Zero, Eq),
            IFNE => (Zero, Ne),
            IFLT => (Zero, Lt),
            IFGE => (Zero, Ge),
            IFGT => (Zero, Gt),
            IFLE => (Zero, Le),
            IF_ICMPEQ => (Int, Eq),
            IF_ICMPNE => (Int, Ne),
            IF_ICMPLT => (Int, Lt),
            IF_ICMPGE => (Int, Ge),
            IF_ICMPGT => (Int, Gt),
            IF_ICMPLE => (Int, Le),
            IF_ACMPEQ => (Reference, Eq),
            IF_ACMPNE => (Reference, Ne),
            IFNULL => (Null, Eq),
            IFNONNULL => (Null, Ne),
            _ => return None,
        };
        Some(Comparison { family, relation })
    }

    /// Source-level operator the opcode implements, used in mutation descriptions.
    pub const fn operator_symbol(self) -> Option<&'static str> {
        use Opcode::*;
        if let Some(comparison) = self.comparison() {
            return Some(comparison.relation.symbol());
        }
        match self {
            IADD | LADD | FADD | DADD => Some("+"),
            ISUB | LSUB | FSUB | DSUB => Some("-"),
            IMUL | LMUL | FMUL | DMUL => Some("*"),
            IDIV | LDIV | FDIV | DDIV => Some("/"),
            IREM | LREM | FREM | DREM => Some("%"),
            _ => None,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mnemonic() {
            Some(name) => f.write_str(name),
            None => write!(f, "UNKNOWN_0x{:02x}", self.to_byte()),
        }
    }
}

impl FromStr for Opcode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(op) = Opcode::from_mnemonic(s) {
            return Ok(op);
        }
        if let Some(hex_part) = s.strip_prefix("UNKNOWN_0x")
            && let Ok(byte) = u8::from_str_radix(hex_part, 16)
        {
            return Ok(Opcode::from_byte(byte));
        }
        Err(Error::UnknownMnemonic(s.to_string()))
    }
}
