pub mod coverage;
pub mod decoder;
pub mod encoder;
pub mod hex_bytes;
pub mod instruction;
pub mod method;
pub mod opcode;
pub mod result;
pub mod stack;

pub use hex_bytes::{HexArray, HexBytes};
pub use instruction::{Instruction, Label};
pub use method::{ClassName, Location, Method, MethodName};
pub use opcode::Opcode;
pub use result::{Error, Result};

/// Strips an optional `0x` prefix and surrounding whitespace from a hex string.
///
/// Odd-length input is rejected before decoding so the error names the real problem.
pub fn normalize_hex_string(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.len() % 2 != 0 {
        return Err(Error::HexDecode(hex::FromHexError::OddLength));
    }
    Ok(digits.to_ascii_lowercase())
}

/// Reads code bytes either from a hex string or from a file containing one.
pub fn input_to_bytes(input: &str, is_file: bool) -> Result<Vec<u8>> {
    let text = if is_file {
        std::fs::read_to_string(input).map_err(|source| Error::FileRead {
            path: input.to_string(),
            source,
        })?
    } else {
        input.to_string()
    };
    let normalized = normalize_hex_string(&text)?;
    Ok(hex::decode(normalized)?)
}
