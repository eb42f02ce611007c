use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    check::{self, CheckArgs},
    divide::{self, DivideArgs},
    sample::{self, SampleArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "cake-sim", about = "Envy-free cake division CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Divide the cake described by a JSON request.
    Divide(DivideArgs),
    /// Emit a seeded random request.
    Sample(SampleArgs),
    /// Audit a response against its request for envy.
    Check(CheckArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Divide(args) => divide::run(&args),
        Command::Sample(args) => sample::run(&args),
        Command::Check(args) => check::run(&args),
    }
}
