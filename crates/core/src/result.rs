//! Core results and error types

use crate::instruction::Label;
use crate::opcode::Opcode;
use thiserror::Error;

/// Core error type encompassing all core module errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A branch offset does not fit the width of its instruction.
    #[error("branch at offset {offset} to {label} needs {distance}, out of range")]
    BranchOutOfRange {
        /// Byte offset of the branch instruction.
        offset: usize,
        /// Target label.
        label: Label,
        /// Signed distance that would have to be encoded.
        distance: i64,
    },

    /// Failed to read file at the specified path.
    #[error("could not read file '{path}': {source}")]
    FileRead {
        /// The path to the file that could not be read.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to decode hex string.
    #[error("hex decode failed: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// A branch offset points outside the code array or into the middle of an instruction.
    #[error("branch at offset {offset} targets {target}, which is not an instruction boundary")]
    InvalidBranchTarget {
        /// Byte offset of the branch instruction.
        offset: usize,
        /// Absolute target offset.
        target: i64,
    },

    /// An operand value cannot be represented by its instruction.
    #[error("operand {value} out of range for {op}")]
    OperandOutOfRange {
        /// The instruction's opcode.
        op: Opcode,
        /// The offending operand value.
        value: i64,
    },

    /// A switch instruction whose bounds or entry count make no sense.
    #[error("malformed switch at offset {0}")]
    MalformedSwitch(usize),

    /// Failed to parse assembly at the specified line.
    #[error("assembly parse error at line {line}: {msg} ⇒ `{raw}`")]
    ParseError {
        /// The line number where parsing failed.
        line: usize,
        /// Description of the parsing error.
        msg: String,
        /// The raw content that failed to parse.
        raw: String,
    },

    /// Stack depth would become negative.
    #[error("stack underflow at instruction {index}: {op} needs {needed} words, {available} available")]
    StackUnderflow {
        /// Instruction index.
        index: usize,
        /// Opcode that underflowed.
        op: Opcode,
        /// Words the instruction pops.
        needed: usize,
        /// Words on the stack before it.
        available: usize,
    },

    /// The code array ends inside an instruction.
    #[error("code truncated at offset {0}")]
    Truncated(usize),

    /// A jump refers to a label that is never placed.
    #[error("undefined label {0}")]
    UndefinedLabel(Label),

    /// The mnemonic does not name an opcode.
    #[error("unknown mnemonic: {0}")]
    UnknownMnemonic(String),

    /// The instruction's stack effect depends on constant-pool data.
    #[error("stack effect of {op} at instruction {index} is not known")]
    UnknownStackEffect {
        /// Instruction index.
        index: usize,
        /// Opcode without a static effect.
        op: Opcode,
    },

    /// The opcode has a layout the decoder does not model.
    #[error("unsupported opcode: {0}")]
    UnsupportedOpcode(Opcode),
}

/// Core result type
pub type Result<T> = std::result::Result<T, Error>;
