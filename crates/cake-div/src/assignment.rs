//! Minimum-cost bijection between slices and agents.

use cake_core::{CakeError, Division, ErrorInfo};
use cake_query::QueryEngine;
use itertools::Itertools;
use tracing::debug;

use crate::preference::SliceTable;

/// Cost assigned to a slice an agent ranks more than the tolerance below its best.
pub const SENTINEL_COST: f64 = 1e9;

/// Envy cost matrix `cost[agent][slice] = best − value`, with edges above
/// `tolerance` replaced by [`SENTINEL_COST`].
pub fn cost_matrix(table: &SliceTable, tolerance: f64) -> Vec<Vec<f64>> {
    table
        .values()
        .iter()
        .enumerate()
        .map(|(agent, values)| {
            let best = table.best_value(agent);
            values
                .iter()
                .map(|value| {
                    let cost = best - value;
                    if cost > tolerance {
                        SENTINEL_COST
                    } else {
                        cost.max(0.0)
                    }
                })
                .collect()
        })
        .collect()
}

/// Exact minimum-cost perfect matching by enumerating permutations.
///
/// Returns `slice_of[agent]` and the total cost; ties keep the lexicographically
/// first permutation.
pub fn min_cost_matching(cost: &[Vec<f64>]) -> (Vec<usize>, f64) {
    let n = cost.len();
    let mut best: Option<(Vec<usize>, f64)> = None;
    for perm in (0..n).permutations(n) {
        let total: f64 = perm.iter().enumerate().map(|(agent, &slice)| cost[agent][slice]).sum();
        if best.as_ref().map_or(true, |(_, current)| total < *current) {
            best = Some((perm, total));
        }
    }
    best.unwrap_or_default()
}

/// Assignment of slices to agents in which nobody gives up more than
/// `tolerance`, as `agent_of[slice]`.
pub fn feasible_assignment(table: &SliceTable, tolerance: f64) -> Option<Vec<usize>> {
    let cost = cost_matrix(table, tolerance);
    let (slice_of, _) = min_cost_matching(&cost);
    let feasible = !slice_of.is_empty()
        && slice_of
            .iter()
            .enumerate()
            .all(|(agent, &slice)| cost[agent][slice] < SENTINEL_COST);
    feasible.then(|| invert(&slice_of))
}

fn invert(slice_of: &[usize]) -> Vec<usize> {
    let mut agent_of = vec![0; slice_of.len()];
    for (agent, &slice) in slice_of.iter().enumerate() {
        agent_of[slice] = agent;
    }
    agent_of
}

/// Assigns every slice of `division` to one agent, as `agent_of[slice]`.
///
/// Fails with [`CakeError::Invariant`] when some agent would have to accept a
/// slice more than `ε / 12` below its best.
pub fn assign_slices(engine: &QueryEngine<'_>, division: &Division) -> Result<Vec<usize>, CakeError> {
    if engine.agent_count() != division.agent_count() {
        return Err(CakeError::Input(
            ErrorInfo::new("agent-count", "division and agents disagree")
                .with_context("agents", engine.agent_count())
                .with_context("slices", division.agent_count()),
        ));
    }
    let tolerance = engine.config().preference_tolerance();
    let table = SliceTable::measure(engine, division)?;
    match feasible_assignment(&table, tolerance) {
        Some(agent_of) => {
            debug!(?agent_of, "slices assigned");
            Ok(agent_of)
        }
        None => Err(CakeError::Invariant(
            ErrorInfo::new("assignment-infeasible", "no envy-free assignment within tolerance")
                .with_context("cuts", format!("{:?}", division.cuts()))
                .with_context("tolerance", tolerance)
                .with_hint("the certified division does not admit a tolerance-bounded matching"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_prefers_zero_cost_edges() {
        let cost = vec![
            vec![0.0, 1.0, 1.0],
            vec![1.0, 1.0, 0.0],
            vec![1.0, 0.0, 1.0],
        ];
        let (slice_of, total) = min_cost_matching(&cost);
        assert_eq!(slice_of, vec![0, 2, 1]);
        assert_eq!(total, 0.0);
    }

    #[test]
    fn sentinel_edges_make_assignment_infeasible() {
        let table = SliceTable::from_values(vec![
            vec![1.0, 0.0, 0.0],
            vec![1.0, 0.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ]);
        assert_eq!(feasible_assignment(&table, 0.1), None);
        let relaxed = feasible_assignment(&table, 1.0).unwrap();
        assert_eq!(relaxed.len(), 3);
    }

    #[test]
    fn assignment_is_indexed_by_slice() {
        let table = SliceTable::from_values(vec![
            vec![0.0, 0.0, 1.0],
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
        ]);
        assert_eq!(feasible_assignment(&table, 0.01), Some(vec![1, 2, 0]));
    }
}
