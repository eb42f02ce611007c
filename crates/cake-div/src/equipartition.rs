//! Initial division into slices of equal value to one cutting agent.

use cake_core::{Bounds, CakeError, Division, ErrorInfo};
use cake_query::{CutResult, QueryEngine};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Division in which the cutting agent values every slice equally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equipartition {
    /// The equal-value division.
    pub division: Division,
    /// The cutter's value of one slice. For agent 0 this is the lower end of
    /// the alpha search.
    pub reference_value: f64,
}

/// Cuts the cake into `agent_count` slices agent 0 values equally.
pub fn compute_equipartition(
    engine: &QueryEngine<'_>,
    agent_count: usize,
) -> Result<Equipartition, CakeError> {
    compute_equipartition_by(engine, agent_count, 0)
}

/// Cuts the cake into `agent_count` slices `cutter` values equally.
pub fn compute_equipartition_by(
    engine: &QueryEngine<'_>,
    agent_count: usize,
    cutter: usize,
) -> Result<Equipartition, CakeError> {
    if cutter >= engine.agent_count() {
        return Err(CakeError::InvalidRange(
            ErrorInfo::new("cutter", "cutting agent out of range")
                .with_context("cutter", cutter)
                .with_context("agents", engine.agent_count()),
        ));
    }
    match agent_count {
        3 => three_slices(engine, cutter),
        4 => four_slices(engine, cutter),
        _ => Err(CakeError::Input(
            ErrorInfo::new("agent-count", "only three or four agents are supported")
                .with_context("agents", agent_count),
        )),
    }
}

/// Which way the first cut has to move.
enum Shift {
    Right,
    Left,
}

fn bisect_first_cut(
    engine: &QueryEngine<'_>,
    mut probe: impl FnMut(f64) -> Result<Shift, CakeError>,
) -> Result<f64, CakeError> {
    let config = engine.config();
    let mut bracket = Bounds::new(0.0, 1.0);
    let mut iterations = 0;
    while bracket.width() > config.fixed_point_tolerance
        && iterations < config.fixed_point_iteration_cap
        && !bracket.is_stalled()
    {
        let left = bracket.midpoint();
        bracket = match probe(left)? {
            Shift::Right => bracket.raise_lower(left),
            Shift::Left => bracket.drop_upper(left),
        };
        iterations += 1;
    }
    debug!(iterations, lower = bracket.lower, upper = bracket.upper, "equipartition bracket closed");
    Ok(bracket.lower)
}

fn three_slices(engine: &QueryEngine<'_>, cutter: usize) -> Result<Equipartition, CakeError> {
    let split = |left: f64| -> Result<Option<(f64, f64, f64)>, CakeError> {
        let value = engine.value_query(cutter, 0.0, left)?;
        match engine.backward_cut(cutter, 1.0, value)? {
            CutResult::Found(right) if right >= left => {
                let middle = engine.value_query(cutter, left, right)?;
                Ok(Some((right, value, middle)))
            }
            _ => Ok(None),
        }
    };
    let left = bisect_first_cut(engine, |left| {
        Ok(match split(left)? {
            Some((_, value, middle)) if middle > value => Shift::Right,
            _ => Shift::Left,
        })
    })?;
    let (right, value) = match split(left)? {
        Some((right, value, _)) => (right, value),
        None => (left, engine.value_query(cutter, 0.0, left)?),
    };
    Ok(Equipartition {
        division: Division::three(left, right)?,
        reference_value: value,
    })
}

fn four_slices(engine: &QueryEngine<'_>, cutter: usize) -> Result<Equipartition, CakeError> {
    let split = |left: f64| -> Result<Option<(f64, f64, f64, f64)>, CakeError> {
        let value = engine.value_query(cutter, 0.0, left)?;
        let CutResult::Found(middle) = engine.forward_cut(cutter, left, value)? else {
            return Ok(None);
        };
        let CutResult::Found(right) = engine.forward_cut(cutter, middle, value)? else {
            return Ok(None);
        };
        let last = engine.value_query(cutter, right, 1.0)?;
        Ok(Some((middle, right, value, last)))
    };
    let left = bisect_first_cut(engine, |left| {
        Ok(match split(left)? {
            Some((_, _, value, last)) if last > value => Shift::Right,
            Some(_) => Shift::Left,
            None => {
                // No room for two more slices of this value: compare directly.
                let first = engine.value_query(cutter, 0.0, left)?;
                let rest = engine.value_query(cutter, left, 1.0)?;
                if rest > 3.0 * first {
                    Shift::Right
                } else {
                    Shift::Left
                }
            }
        })
    })?;
    match split(left)? {
        Some((middle, right, value, _)) => Ok(Equipartition {
            division: Division::four(left, middle, right)?,
            reference_value: value,
        }),
        None => Err(CakeError::Invariant(
            ErrorInfo::new("equipartition", "no four-slice equipartition found")
                .with_context("cutter", cutter)
                .with_context("left", left),
        )),
    }
}
