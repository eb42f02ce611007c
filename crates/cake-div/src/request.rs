//! JSON request validation and normalization onto the unit cake.

use cake_core::{CakeError, DivisionConfig, ErrorInfo, Segment, ValuationModel};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Relative slack on the cake boundaries when validating coverage.
const COVERAGE_TOLERANCE: f64 = 1e-9;

/// A division request in the caller's units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionRequest {
    /// Piecewise-linear valuation of each agent, in positional order.
    pub preferences: Vec<Vec<Segment>>,
    /// Length of the cake; every agent's segments must cover `[0, cake_size]`.
    #[serde(alias = "cakeSize")]
    pub cake_size: f64,
}

impl DivisionRequest {
    /// Number of agents in the request.
    pub fn agent_count(&self) -> usize {
        self.preferences.len()
    }

    /// Valuations in the caller's units, checked for well-formedness.
    pub fn valuations(&self) -> Result<Vec<ValuationModel>, CakeError> {
        self.preferences
            .iter()
            .enumerate()
            .map(|(agent, segments)| {
                ValuationModel::new(segments.clone()).map_err(|err| tag_agent(err, agent))
            })
            .collect()
    }
}

fn tag_agent(err: CakeError, agent: usize) -> CakeError {
    match err {
        CakeError::Input(info) => CakeError::Input(info.with_context("agent", agent)),
        other => other,
    }
}

/// Checks agent count, cake size and that every valuation covers the cake.
pub fn validate_request(request: &DivisionRequest) -> Result<(), CakeError> {
    let agents = request.agent_count();
    if !(3..=4).contains(&agents) {
        return Err(CakeError::Input(
            ErrorInfo::new("agent-count", "only three or four agents are supported")
                .with_context("agents", agents),
        ));
    }
    if !(request.cake_size.is_finite() && request.cake_size > 0.0) {
        return Err(CakeError::Input(
            ErrorInfo::new("cake-size", "cake size must be positive and finite")
                .with_context("cake_size", request.cake_size),
        ));
    }
    let slack = COVERAGE_TOLERANCE * request.cake_size.max(1.0);
    for (agent, model) in request.valuations()?.iter().enumerate() {
        if model.start().abs() > slack || (model.end() - request.cake_size).abs() > slack {
            return Err(CakeError::Input(
                ErrorInfo::new("coverage", "segments must cover the whole cake")
                    .with_context("agent", agent)
                    .with_context("start", model.start())
                    .with_context("end", model.end())
                    .with_context("cake_size", request.cake_size),
            ));
        }
    }
    Ok(())
}

/// Maps every valuation onto `[0, 1]` with densities at most the
/// configured normalization cap.
///
/// Agents that value nothing are treated as valuing everything uniformly.
pub fn normalize_request(
    request: &DivisionRequest,
    config: &DivisionConfig,
) -> Result<Vec<ValuationModel>, CakeError> {
    validate_request(request)?;
    let cap = config.normalization_cap;
    let normalized: Vec<ValuationModel> = request
        .valuations()?
        .into_iter()
        .enumerate()
        .map(|(agent, model)| {
            let peak = model.max_density();
            if peak > 0.0 {
                model.rescaled(request.cake_size, peak / cap)
            } else {
                warn!(agent, "agent values nothing; using a uniform valuation");
                ValuationModel::uniform(cap)
            }
        })
        .collect();
    Ok(normalized)
}
