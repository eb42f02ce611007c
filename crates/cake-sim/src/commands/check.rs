use std::error::Error;
use std::fs;
use std::path::PathBuf;

use cake_core::serde::from_json_slice;
use cake_div::{envy_report, DivisionRequest, DivisionResponse};
use clap::Args;
use tracing::warn;

use super::emit;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// JSON request the response was computed for.
    #[arg(long)]
    pub input: PathBuf,
    /// JSON response produced by `cake-sim divide`.
    #[arg(long)]
    pub response: PathBuf,
    /// Fail when any agent's envy exceeds this many percent.
    #[arg(long)]
    pub max_envy: Option<f64>,
    /// Pretty-print the report.
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: &CheckArgs) -> Result<(), Box<dyn Error>> {
    let request: DivisionRequest = from_json_slice(&fs::read(&args.input)?)?;
    let response: DivisionResponse = from_json_slice(&fs::read(&args.response)?)?;
    let report = envy_report(&request, &response.division, &response.assignment)?;
    emit(&report, args.pretty, None)?;
    if let Some(limit) = args.max_envy {
        if !report.is_envy_free(limit) {
            warn!(max_envy = report.max_envy, limit, "envy above limit");
            return Err(format!("max envy {:.6}% exceeds {limit}%", report.max_envy).into());
        }
    }
    Ok(())
}
