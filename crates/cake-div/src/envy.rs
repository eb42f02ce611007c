//! Envy audit of a finished division, on the caller's exact valuations.

use std::collections::BTreeMap;

use cake_core::{CakeError, ErrorInfo};
use serde::{Deserialize, Serialize};

use crate::request::DivisionRequest;
use crate::response::percent_values;

/// What one agent thinks of its own slice and of the best other one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEnvy {
    /// Zero-based agent index.
    pub agent: usize,
    /// One-based slice the agent received.
    pub slice: usize,
    /// Own slice, in percent of the agent's total value.
    pub own_share: f64,
    /// Best slice held by someone else, in percent.
    pub best_other_share: f64,
    /// `max(0, best_other_share - own_share)`.
    pub envy: f64,
}

/// Per-agent envy and the worst case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvyReport {
    /// One entry per agent.
    pub agents: Vec<AgentEnvy>,
    /// Largest envy over all agents, in percent.
    pub max_envy: f64,
}

impl EnvyReport {
    /// Whether nobody envies anyone by more than `tolerance` percent.
    pub fn is_envy_free(&self, tolerance: f64) -> bool {
        self.max_envy <= tolerance
    }
}

/// Audits `cuts` (cake units) under `assignment` (one-based slice to agent).
pub fn envy_report(
    request: &DivisionRequest,
    cuts: &[f64],
    assignment: &BTreeMap<usize, usize>,
) -> Result<EnvyReport, CakeError> {
    let agents = request.agent_count();
    if cuts.len() + 1 != agents {
        return Err(CakeError::Input(
            ErrorInfo::new("cut-count", "expected one cut fewer than agents")
                .with_context("cuts", cuts.len())
                .with_context("agents", agents),
        ));
    }
    let mut slice_of = vec![None; agents];
    for (&slice, &agent) in assignment {
        if slice == 0 || slice > agents || agent >= agents || slice_of[agent].is_some() {
            return Err(CakeError::Input(
                ErrorInfo::new("assignment", "assignment must pair every slice with a distinct agent")
                    .with_context("slice", slice)
                    .with_context("agent", agent),
            ));
        }
        slice_of[agent] = Some(slice - 1);
    }
    let shares = percent_values(request, cuts)?;
    let mut entries = Vec::with_capacity(agents);
    for (agent, slice) in slice_of.into_iter().enumerate() {
        let slice = slice.ok_or_else(|| {
            CakeError::Input(
                ErrorInfo::new("assignment", "agent received no slice").with_context("agent", agent),
            )
        })?;
        let own_share = shares[agent][slice];
        let best_other_share = shares[agent]
            .iter()
            .enumerate()
            .filter(|&(other, _)| other != slice)
            .map(|(_, &share)| share)
            .fold(0.0, f64::max);
        entries.push(AgentEnvy {
            agent,
            slice: slice + 1,
            own_share,
            best_other_share,
            envy: (best_other_share - own_share).max(0.0),
        });
    }
    let max_envy = entries.iter().map(|entry| entry.envy).fold(0.0, f64::max);
    Ok(EnvyReport {
        agents: entries,
        max_envy,
    })
}
