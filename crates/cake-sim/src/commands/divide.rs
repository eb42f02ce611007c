use std::error::Error;
use std::path::PathBuf;

use cake_core::serde::from_json_slice;
use cake_core::DivisionConfig;
use cake_div::{divide, DivisionRequest};
use clap::Args;
use tracing::info;

use super::{emit, read_input};

#[derive(Args, Debug)]
pub struct DivideArgs {
    /// JSON request; read from stdin when omitted.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// YAML file overriding the protocol constants.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Grid resolution, overriding the configuration file.
    #[arg(long)]
    pub epsilon: Option<f64>,
    /// Write the response here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Pretty-print the response.
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: &DivideArgs) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => DivisionConfig::load(path)?,
        None => DivisionConfig::default(),
    };
    if let Some(epsilon) = args.epsilon {
        config.epsilon = epsilon;
    }
    let request: DivisionRequest = from_json_slice(&read_input(args.input.as_deref())?)?;
    let response = divide(&request, &config)?;
    info!(
        cuts = ?response.division,
        condition = ?response.record.condition,
        "writing response"
    );
    emit(&response, args.pretty, args.out.as_deref())
}
