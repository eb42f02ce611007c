//! Cut queries: inverting the value query on the ε-grid.
//!
//! Phase one halves a bracket around the unknown endpoint until it sits inside
//! the closure of one grid cell (at most `cut_iteration_cap` halvings). Phase two
//! solves the interpolation patch of that cell in closed form and keeps a
//! solution only if it re-evaluates to the requested value.

use cake_core::{Bounds, CakeError, ErrorInfo};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::QueryEngine;
use crate::interpolate::{solve, Axis, ORIENTATIONS};

/// Slack on unit cell coordinates when accepting an inverted solution.
const COORDINATE_SLACK: f64 = 1e-9;

/// Outcome of a cut query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CutResult {
    /// Position of the requested endpoint.
    Found(f64),
    /// The value cannot be enclosed in this direction.
    Unreachable,
}

impl CutResult {
    /// Position if one was found.
    pub fn position(self) -> Option<f64> {
        match self {
            CutResult::Found(position) => Some(position),
            CutResult::Unreachable => None,
        }
    }

    /// Position, or `boundary` when the value was unreachable.
    pub fn or_boundary(self, boundary: f64) -> f64 {
        self.position().unwrap_or(boundary)
    }
}

/// Which endpoint of the interval a cut query solves for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutDirection {
    /// The known point is the start; solve for the end to its right.
    Forward,
    /// The known point is the end; solve for the start to its left.
    Backward,
}

impl CutDirection {
    /// Direction from the `end_cut_wanted` flag.
    pub fn from_end_wanted(end_cut_wanted: bool) -> Self {
        if end_cut_wanted {
            CutDirection::Forward
        } else {
            CutDirection::Backward
        }
    }

    fn boundary(self) -> f64 {
        match self {
            CutDirection::Forward => 1.0,
            CutDirection::Backward => 0.0,
        }
    }
}

impl QueryEngine<'_> {
    /// Finds the endpoint that makes the interval anchored at `known` worth
    /// exactly `value` to `agent`.
    pub fn cut_query(
        &self,
        agent: usize,
        known: f64,
        value: f64,
        direction: CutDirection,
    ) -> Result<CutResult, CakeError> {
        self.check_agent(agent)?;
        self.check_position("known", known)?;
        if !value.is_finite() {
            return Err(CakeError::InvalidRange(
                ErrorInfo::new("cut-value", "cut value must be finite").with_context("value", value),
            ));
        }
        if value <= 0.0 {
            return Ok(CutResult::Found(known));
        }
        let reachable = self.interval_value(agent, known, direction.boundary(), direction)?;
        let tolerance = self.config().consistency_tolerance;
        if value > reachable + tolerance {
            debug!(agent, known, value, reachable, ?direction, "cut value unreachable");
            return Ok(CutResult::Unreachable);
        }
        if value >= reachable {
            return Ok(CutResult::Found(direction.boundary()));
        }
        let bracket = self.locate_cell(agent, known, value, direction)?;
        self.invert_in_cell(agent, known, value, direction, bracket)
    }

    /// Forward cut from `start`.
    pub fn forward_cut(&self, agent: usize, start: f64, value: f64) -> Result<CutResult, CakeError> {
        self.cut_query(agent, start, value, CutDirection::Forward)
    }

    /// Backward cut from `end`.
    pub fn backward_cut(&self, agent: usize, end: f64, value: f64) -> Result<CutResult, CakeError> {
        self.cut_query(agent, end, value, CutDirection::Backward)
    }

    /// Point splitting `[start, end]` into two halves of equal value to `agent`.
    pub fn bisection_cut_query(&self, agent: usize, start: f64, end: f64) -> Result<f64, CakeError> {
        if start == end {
            return Ok(start);
        }
        if end < start {
            return Err(CakeError::InvalidRange(
                ErrorInfo::new("reversed-interval", "bisection needs start <= end")
                    .with_context("start", start)
                    .with_context("end", end),
            ));
        }
        let half = self.value_query(agent, start, end)? / 2.0;
        match self.forward_cut(agent, start, half)? {
            CutResult::Found(position) => Ok(position.clamp(start, end)),
            CutResult::Unreachable => {
                warn!(agent, start, end, "closed-form bisection failed, falling back to search");
                self.balance_by_search(agent, start, end)
            }
        }
    }

    fn interval_value(
        &self,
        agent: usize,
        known: f64,
        other: f64,
        direction: CutDirection,
    ) -> Result<f64, CakeError> {
        match direction {
            CutDirection::Forward => self.value_query(agent, known, other),
            CutDirection::Backward => self.value_query(agent, other, known),
        }
    }

    fn locate_cell(
        &self,
        agent: usize,
        known: f64,
        value: f64,
        direction: CutDirection,
    ) -> Result<Bounds, CakeError> {
        let mut bracket = match direction {
            CutDirection::Forward => Bounds::new(known, 1.0),
            CutDirection::Backward => Bounds::new(0.0, known),
        };
        let cap = self.config().cut_iteration_cap;
        let mut iterations = 0;
        while bracket.upper > self.grid_point(self.cell_of(bracket.lower) + 1) && iterations < cap {
            let mid = bracket.midpoint();
            let probe = self.interval_value(agent, known, mid, direction)?;
            // The interval grows with `mid` going forward and shrinks going backward.
            let solution_above = match direction {
                CutDirection::Forward => probe < value,
                CutDirection::Backward => probe > value,
            };
            bracket = if solution_above {
                bracket.raise_lower(mid)
            } else {
                bracket.drop_upper(mid)
            };
            iterations += 1;
        }
        Ok(bracket)
    }

    fn candidate_cells(&self, bracket: Bounds) -> Vec<usize> {
        let base = self.cell_of(bracket.lower);
        let mut cells = vec![base];
        let upper_cell = self.cell_of(bracket.upper);
        if upper_cell != base {
            cells.push(upper_cell);
        }
        if base + 1 < self.cell_count() && !cells.contains(&(base + 1)) {
            cells.push(base + 1);
        }
        if base > 0 && !cells.contains(&(base - 1)) {
            cells.push(base - 1);
        }
        cells
    }

    fn invert_in_cell(
        &self,
        agent: usize,
        known: f64,
        value: f64,
        direction: CutDirection,
        bracket: Bounds,
    ) -> Result<CutResult, CakeError> {
        let epsilon = self.epsilon();
        let tolerance = self.config().consistency_tolerance;
        for cell in self.candidate_cells(bracket) {
            for orientation in ORIENTATIONS {
                let candidate = match direction {
                    CutDirection::Forward => {
                        let start_cell = self.cell_of(known);
                        let u = self.start_coordinate(start_cell, known);
                        let corners = self.corners(agent, start_cell, cell);
                        solve(&corners, orientation, Axis::End, u, value)
                            .filter(|w| (-COORDINATE_SLACK..=1.0 + COORDINATE_SLACK).contains(w))
                            .map(|w| w.clamp(0.0, 1.0))
                            .filter(|&w| orientation.admits(u, w, COORDINATE_SLACK))
                            .map(|w| (self.grid_point(cell) + w * epsilon).clamp(known, 1.0))
                    }
                    CutDirection::Backward => {
                        let end_cell = self.cell_of(known);
                        let w = self.end_coordinate(end_cell, known);
                        let corners = self.corners(agent, cell, end_cell);
                        solve(&corners, orientation, Axis::Start, w, value)
                            .filter(|u| (-COORDINATE_SLACK..=1.0 + COORDINATE_SLACK).contains(u))
                            .map(|u| u.clamp(0.0, 1.0))
                            .filter(|&u| orientation.admits(u, w, COORDINATE_SLACK))
                            .map(|u| (self.grid_point(cell + 1) - u * epsilon).clamp(0.0, known))
                    }
                };
                let Some(position) = candidate else {
                    continue;
                };
                let check = self.interval_value(agent, known, position, direction)?;
                if (check - value).abs() <= tolerance {
                    return Ok(CutResult::Found(position));
                }
            }
        }
        debug!(agent, known, value, ?direction, "no self-consistent inversion in cell");
        Ok(CutResult::Unreachable)
    }

    fn balance_by_search(&self, agent: usize, start: f64, end: f64) -> Result<f64, CakeError> {
        let mut bracket = Bounds::new(start, end);
        let mut iterations = 0;
        while bracket.width() > self.config().fixed_point_tolerance
            && iterations < self.config().fixed_point_iteration_cap
            && !bracket.is_stalled()
        {
            let mid = bracket.midpoint();
            let left = self.value_query(agent, start, mid)?;
            let right = self.value_query(agent, mid, end)?;
            bracket = if left < right {
                bracket.raise_lower(mid)
            } else {
                bracket.drop_upper(mid)
            };
            iterations += 1;
        }
        Ok(bracket.midpoint())
    }
}
