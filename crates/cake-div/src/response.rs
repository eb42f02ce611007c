//! End-to-end pipeline from a request to a formatted response.

use std::collections::BTreeMap;

use cake_core::serde::stable_hash_string;
use cake_core::{CakeError, DivisionConfig, DivisionProvenance, InvariantRecord, SchemaVersion};
use cake_query::{OracleStats, QueryEngine};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assignment::assign_slices;
use crate::request::{normalize_request, DivisionRequest};
use crate::search::find_division;

/// Division in the caller's units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionResponse {
    /// Interior cut positions in cake units.
    pub division: Vec<f64>,
    /// Agent 0's equipartition cuts in cake units.
    pub equipartition: Vec<f64>,
    /// One-based slice number to zero-based agent index.
    pub assignment: BTreeMap<usize, usize>,
    /// How the division was certified.
    pub record: InvariantRecord,
    /// `alpha` at which the division was certified.
    pub alpha: f64,
    /// `percent_values[agent][slice]`: share of the agent's total value, in percent.
    pub percent_values: Vec<Vec<f64>>,
    /// Oracle and cache counters.
    pub stats: OracleStats,
    /// Request fingerprint and grid.
    pub provenance: DivisionProvenance,
}

/// Share of each agent's total value held by every slice, in percent.
///
/// Evaluated exactly on the caller's valuations; an agent with no value at
/// all sees every slice as an equal share.
pub fn percent_values(request: &DivisionRequest, cuts: &[f64]) -> Result<Vec<Vec<f64>>, CakeError> {
    let mut edges = Vec::with_capacity(cuts.len() + 2);
    edges.push(0.0);
    edges.extend_from_slice(cuts);
    edges.push(request.cake_size);
    let slices = edges.len() - 1;
    let shares = request
        .valuations()?
        .iter()
        .map(|model| {
            let total = model.total();
            edges
                .windows(2)
                .map(|pair| {
                    if total > 0.0 {
                        100.0 * model.integrate(pair[0], pair[1]) / total
                    } else {
                        100.0 / slices as f64
                    }
                })
                .collect()
        })
        .collect();
    Ok(shares)
}

/// Validates, normalizes and divides the cake described by `request`.
pub fn divide(request: &DivisionRequest, config: &DivisionConfig) -> Result<DivisionResponse, CakeError> {
    let request_hash = stable_hash_string(request)?;
    let valuations = normalize_request(request, config)?;
    let engine = QueryEngine::new(&valuations, config)?;
    info!(agents = request.agent_count(), cake_size = request.cake_size, %request_hash, "dividing cake");

    let outcome = find_division(&engine, request.agent_count())?;
    let agent_of = assign_slices(&engine, &outcome.division)?;
    let division = outcome.division.scaled_cuts(request.cake_size);
    let response = DivisionResponse {
        percent_values: percent_values(request, &division)?,
        division,
        equipartition: outcome.equipartition.scaled_cuts(request.cake_size),
        assignment: agent_of
            .iter()
            .enumerate()
            .map(|(slice, &agent)| (slice + 1, agent))
            .collect(),
        record: outcome.record,
        alpha: outcome.alpha,
        stats: engine.stats(),
        provenance: DivisionProvenance {
            schema_version: SchemaVersion::default(),
            request_hash,
            epsilon: engine.epsilon(),
        },
    };
    info!(
        cuts = ?response.division,
        oracle_calls = response.stats.oracle_calls,
        cache_hits = response.stats.cache_hits,
        "division complete"
    );
    Ok(response)
}
