//! Module for the `decode` subcommand, which prints a method body as assembly.
//!
//! The listing is in the same format the assembly parser reads, so it can be edited and
//! fed back to `enumerate` or `apply` as an `.asm` file.

use super::read_instructions;
use clap::Args;
use stackmut_core::Instruction;
use std::error::Error;

/// Arguments for the `decode` subcommand.
#[derive(Args)]
pub struct DecodeArgs {
    /// Code as a hex string (0x...), a file holding hex, or an `.asm` assembly listing.
    pub input: String,
}

impl super::Command for DecodeArgs {
    fn execute(self) -> Result<(), Box<dyn Error>> {
        let instructions = read_instructions(&self.input)?;
        print!("{}", listing(&instructions));
        Ok(())
    }
}

/// Renders instructions one per line, with labels flush left and everything else indented.
pub fn listing(instructions: &[Instruction]) -> String {
    let mut out = String::new();
    for instruction in instructions {
        if !matches!(instruction, Instruction::Label(_)) {
            out.push_str("    ");
        }
        out.push_str(&instruction.to_string());
        out.push('\n');
    }
    out
}
