use std::error::Error;
use std::path::PathBuf;

use cake_div::{sample_request, SampleShape};
use clap::Args;

use super::emit;

#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Number of agents (3 or 4).
    #[arg(long, default_value_t = 3)]
    pub agents: usize,
    /// Number of unit segments per agent.
    #[arg(long = "cake-size", default_value_t = 10)]
    pub cake_size: usize,
    /// Seed of the request generator.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Draw piecewise-linear instead of piecewise-constant densities.
    #[arg(long)]
    pub linear: bool,
    /// Write the request here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Pretty-print the request.
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: &SampleArgs) -> Result<(), Box<dyn Error>> {
    let shape = if args.linear {
        SampleShape::Linear
    } else {
        SampleShape::Flat
    };
    let request = sample_request(args.seed, args.agents, args.cake_size, shape)?;
    emit(&request, args.pretty, args.out.as_deref())
}
