//! Seeded random requests for exercising the pipeline.

use cake_core::{AgentRng, CakeError, ErrorInfo, Segment};
use serde::{Deserialize, Serialize};

use crate::request::DivisionRequest;

/// Upper bound (exclusive) of sampled densities.
const MAX_SAMPLED_DENSITY: f64 = 10.0;

/// Shape of the sampled densities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SampleShape {
    /// Constant density on every unit segment.
    #[default]
    Flat,
    /// Independently drawn endpoint densities on every unit segment.
    Linear,
}

/// Random request with `cake_size` unit segments per agent.
///
/// Every agent draws from its own stream of `seed`.
pub fn sample_request(
    seed: u64,
    agents: usize,
    cake_size: usize,
    shape: SampleShape,
) -> Result<DivisionRequest, CakeError> {
    if !(3..=4).contains(&agents) {
        return Err(CakeError::Input(
            ErrorInfo::new("agent-count", "only three or four agents are supported")
                .with_context("agents", agents),
        ));
    }
    if cake_size == 0 {
        return Err(CakeError::input("cake-size", "cake size must be at least one unit"));
    }
    let preferences = (0..agents)
        .map(|agent| {
            let mut rng = AgentRng::for_agent(seed, agent);
            (0..cake_size)
                .map(|unit| {
                    let start = unit as f64;
                    let first = rng.density(MAX_SAMPLED_DENSITY);
                    let second = match shape {
                        SampleShape::Flat => first,
                        SampleShape::Linear => rng.density(MAX_SAMPLED_DENSITY),
                    };
                    Segment::new(start, start + 1.0, first, second)
                })
                .collect()
        })
        .collect();
    Ok(DivisionRequest {
        preferences,
        cake_size: cake_size as f64,
    })
}
