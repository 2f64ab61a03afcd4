//! Module for the `apply` subcommand, which materializes one mutation and prints the mutant
//! as assembly or as re-encoded code.

use super::decode::listing;
use super::{CliError, EngineArgs, MethodArgs};
use clap::Args;
use stackmut_core::encoder::encode;
use stackmut_transform::{Mutator, MutationIdentifier};
use std::error::Error;
use tracing::info;

/// Arguments for the `apply` subcommand.
#[derive(Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub method: MethodArgs,
    #[command(flatten)]
    pub engine: EngineArgs,
    /// Mutator display name or global id.
    #[arg(long)]
    pub mutator: String,
    /// Instruction index of the mutation.
    #[arg(long)]
    pub index: usize,
    /// Exact description; defaults to the first candidate of the mutator at the index.
    #[arg(long)]
    pub description: Option<String>,
    /// Print the mutant as hex code instead of assembly.
    #[arg(long)]
    pub hex: bool,
}

impl super::Command for ApplyArgs {
    fn execute(self) -> Result<(), Box<dyn Error>> {
        let method = self.method.load()?;
        let engine = self.engine.engine()?;

        let no_such = || CliError::NoSuchMutation {
            mutator: self.mutator.clone(),
            index: self.index,
        };
        let mutator = Mutator::from_name(&self.mutator).ok_or_else(no_such)?;
        let target = select(
            &engine.enumerate(&method),
            mutator,
            self.index,
            self.description.as_deref(),
        )
        .ok_or_else(no_such)?;
        info!("applying {}", target);

        let mutant = engine.apply(&method, &target);
        if self.hex {
            let encoded = encode(&mutant).map_err(CliError::from)?;
            println!("0x{}", hex::encode(&encoded.code.0));
        } else {
            print!("{}", listing(&mutant));
        }
        Ok(())
    }
}

/// First candidate of `mutator` at `index`, optionally with exactly `description`.
fn select(
    candidates: &[MutationIdentifier],
    mutator: Mutator,
    index: usize,
    description: Option<&str>,
) -> Option<MutationIdentifier> {
    candidates
        .iter()
        .find(|id| {
            id.mutator == mutator.global_id()
                && id.index == index
                && description.is_none_or(|d| d == id.description)
        })
        .cloned()
}
