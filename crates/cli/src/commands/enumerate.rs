//! Module for the `enumerate` subcommand, which lists every mutation the enabled mutators
//! find in a method body.

use super::{EngineArgs, MethodArgs};
use clap::Args;
use std::error::Error;

/// Arguments for the `enumerate` subcommand.
#[derive(Args)]
pub struct EnumerateArgs {
    #[command(flatten)]
    pub method: MethodArgs,
    #[command(flatten)]
    pub engine: EngineArgs,
    /// Print the candidates as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

impl super::Command for EnumerateArgs {
    fn execute(self) -> Result<(), Box<dyn Error>> {
        let method = self.method.load()?;
        let engine = self.engine.engine()?;

        let details: Vec<_> = engine
            .enumerate(&method)
            .iter()
            .filter_map(|id| engine.details(&method, id))
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&details)?);
            return Ok(());
        }

        println!("{}: {} mutations", method.location, details.len());
        for detail in details {
            let line = detail
                .line
                .map(|line| line.to_string())
                .unwrap_or_else(|| "-".into());
            println!(
                "{:>5} {:>6}  {:<26} {}",
                detail.id.index, line, detail.mutator, detail.id.description
            );
        }
        Ok(())
    }
}
