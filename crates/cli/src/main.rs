use clap::Parser;
use stackmut_cli::commands::{Cmd, Command};

/// stackmut CLI
///
/// Decodes JVM method bodies, lists the mutations the operator catalog finds in them and
/// materializes single mutants.
#[derive(Parser)]
#[command(name = "stackmut")]
#[command(about = "stackmut: bytecode mutation engine")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli.command.execute()
}
