use clap::{Args, Subcommand};
use stackmut_core::decoder::{decode_code, parse_assembly};
use stackmut_core::{Instruction, Location, Method, input_to_bytes};
use stackmut_transform::{EngineConfig, MutationEngine};
use std::error::Error;
use std::path::Path;

pub mod apply;
pub mod decode;
pub mod enumerate;

use thiserror::Error;

/// Errors raised by the subcommands themselves.
#[derive(Debug, Error)]
pub enum CliError {
    /// Decoding, parsing or encoding failed.
    #[error("core error: {0}")]
    Core(#[from] stackmut_core::Error),
    /// Engine configuration failed.
    #[error("engine error: {0}")]
    Transform(#[from] stackmut_transform::Error),
    /// File read error.
    #[error("file error: {0}")]
    File(#[from] std::io::Error),
    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The requested mutation is not a candidate of the method.
    #[error("no {mutator} mutation at instruction {index}")]
    NoSuchMutation { mutator: String, index: usize },
}

/// CLI subcommands for stackmut.
#[derive(Subcommand)]
pub enum Cmd {
    /// Decode a method body to assembly.
    Decode(decode::DecodeArgs),
    /// List the mutations found in a method body.
    Enumerate(enumerate::EnumerateArgs),
    /// Materialize one mutation and print the mutant.
    Apply(apply::ApplyArgs),
}

/// Trait for executing CLI subcommands.
pub trait Command {
    /// Executes the subcommand.
    fn execute(self) -> Result<(), Box<dyn Error>>;
}

impl Command for Cmd {
    fn execute(self) -> Result<(), Box<dyn Error>> {
        match self {
            Cmd::Decode(args) => args.execute(),
            Cmd::Enumerate(args) => args.execute(),
            Cmd::Apply(args) => args.execute(),
        }
    }
}

/// The method a command works on.
#[derive(Args, Clone, Debug)]
pub struct MethodArgs {
    /// Code as a hex string (0x...), a file holding hex, or an `.asm` assembly listing.
    pub input: String,
    /// Owning class, dotted or slashed.
    #[arg(long, default_value = "Unknown")]
    pub class: String,
    /// Method name.
    #[arg(long, default_value = "method")]
    pub method: String,
    /// Method descriptor.
    #[arg(long, default_value = "()V")]
    pub descriptor: String,
}

impl MethodArgs {
    pub fn load(&self) -> Result<Method, CliError> {
        let location = Location::new(self.class.as_str(), &self.method, &self.descriptor);
        Ok(Method::new(location, read_instructions(&self.input)?))
    }
}

/// Engine selection shared by `enumerate` and `apply`.
#[derive(Args, Clone, Debug)]
pub struct EngineArgs {
    /// JSON engine config.
    #[arg(long)]
    pub config: Option<String>,
    /// Comma-separated mutator selections (names, ids, groups or ALL); overrides the config.
    #[arg(long)]
    pub mutators: Option<String>,
}

impl EngineArgs {
    pub fn engine(&self) -> Result<MutationEngine, CliError> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(mutators) = &self.mutators {
            config.mutators = mutators
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(MutationEngine::from_config(&config)?)
    }
}

/// Reads a method body from a hex string, a hex file or an assembly file.
pub fn read_instructions(input: &str) -> Result<Vec<Instruction>, CliError> {
    let path = Path::new(input);
    let is_file = !input.starts_with("0x") && path.is_file();
    if is_file && path.extension().is_some_and(|ext| ext == "asm") {
        let asm = std::fs::read_to_string(path)?;
        return Ok(parse_assembly(&asm)?);
    }
    let bytes = input_to_bytes(input, is_file)?;
    Ok(decode_code(&bytes, &[])?)
}
