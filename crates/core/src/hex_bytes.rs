//! Hex-rendered byte containers.
//!
//! [`HexBytes`] holds the operand bytes of `Raw` instructions and encoded code arrays,
//! [`HexArray`] the coverage fingerprint. Both print as lowercase hex, with no prefix.

use crate::normalize_hex_string;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::ops::Deref;

/// Operand or code bytes.
///
/// ```
/// use stackmut_core::{HexBytes, Instruction, Opcode};
///
/// let operands = HexBytes(vec![0x00, 0x0c]);
/// assert_eq!(format!("{operands:?}"), "000c");
/// let insn = Instruction::Raw(Opcode::GETSTATIC, operands);
/// assert_eq!(insn.to_string(), "GETSTATIC 000c");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct HexBytes(pub Vec<u8>);

impl Deref for HexBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for HexBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

// Accepts the `0x` prefix and upper case, like the CLI input.
impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let normalized = normalize_hex_string(&text).map_err(de::Error::custom)?;
        hex::decode(normalized)
            .map(HexBytes)
            .map_err(de::Error::custom)
    }
}

/// Fixed-size digest, serialized as a hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexArray<const N: usize>(pub [u8; N]);

impl<const N: usize> fmt::Debug for HexArray<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl<const N: usize> Serialize for HexArray<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}
