use std::cell::{Cell, RefCell};

use cake_core::{CakeError, Division, DivisionConfig, ErrorInfo, ValuationModel};

use crate::cache::{OracleStats, QueryCache};
use crate::interpolate::{evaluate, CellCorners};

/// Value and cut queries for one request's agents.
///
/// Raw valuations are only ever sampled at grid points through the hungry
/// oracle; every other answer is interpolated from cached grid corners. The
/// engine is single-threaded (`!Sync`) and owns its cache.
#[derive(Debug)]
pub struct QueryEngine<'a> {
    valuations: &'a [ValuationModel],
    config: DivisionConfig,
    cells: usize,
    epsilon: f64,
    cache: RefCell<QueryCache>,
    oracle_calls: Cell<u64>,
}

impl<'a> QueryEngine<'a> {
    /// Creates an engine over normalized valuations on `[0, 1]`.
    pub fn new(
        valuations: &'a [ValuationModel],
        config: &DivisionConfig,
    ) -> Result<Self, CakeError> {
        config.validate()?;
        if valuations.is_empty() {
            return Err(CakeError::input("no-agents", "at least one valuation is required"));
        }
        Ok(Self {
            valuations,
            config: config.clone(),
            cells: config.grid_cells(),
            epsilon: config.grid_epsilon(),
            cache: RefCell::new(QueryCache::default()),
            oracle_calls: Cell::new(0),
        })
    }

    /// Number of agents the engine answers for.
    pub fn agent_count(&self) -> usize {
        self.valuations.len()
    }

    /// Grid resolution.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Protocol constants in force.
    pub fn config(&self) -> &DivisionConfig {
        &self.config
    }

    /// Snapshot of oracle and cache counters.
    pub fn stats(&self) -> OracleStats {
        let cache = self.cache.borrow();
        OracleStats {
            oracle_calls: self.oracle_calls.get(),
            cache_hits: cache.hits(),
            cached_cell_pairs: cache.len() as u64,
        }
    }

    pub(crate) fn check_agent(&self, agent: usize) -> Result<(), CakeError> {
        if agent < self.valuations.len() {
            Ok(())
        } else {
            Err(CakeError::InvalidRange(
                ErrorInfo::new("agent-index", "agent index out of range")
                    .with_context("agent", agent)
                    .with_context("agents", self.valuations.len()),
            ))
        }
    }

    pub(crate) fn check_position(&self, name: &str, position: f64) -> Result<(), CakeError> {
        if (0.0..=1.0).contains(&position) {
            Ok(())
        } else {
            Err(CakeError::InvalidRange(
                ErrorInfo::new("position-range", "query bounds must lie in [0, 1]")
                    .with_context(name, position),
            ))
        }
    }

    /// Grid point `index * ε`.
    pub fn grid_point(&self, index: usize) -> f64 {
        index as f64 / self.cells as f64
    }

    /// Index of the cell containing `x`; `1.0` belongs to the last cell.
    pub fn cell_of(&self, x: f64) -> usize {
        let scaled = (x * self.cells as f64).floor();
        if scaled <= 0.0 {
            0
        } else {
            (scaled as usize).min(self.cells - 1)
        }
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.cells
    }

    /// Unit `u` coordinate of a start position inside `cell`.
    pub(crate) fn start_coordinate(&self, cell: usize, start: f64) -> f64 {
        ((self.grid_point(cell + 1) - start) * self.cells as f64).clamp(0.0, 1.0)
    }

    /// Unit `w` coordinate of an end position inside `cell`.
    pub(crate) fn end_coordinate(&self, cell: usize, end: f64) -> f64 {
        ((end - self.grid_point(cell)) * self.cells as f64).clamp(0.0, 1.0)
    }

    /// Hungry oracle `H(i, j) = raw/2 + ε·(end − start)` between grid points
    /// `i·ε` and `j·ε`.
    ///
    /// Signed: `j < i` returns `-H(j, i)`, which keeps interpolation additive
    /// when both endpoints share a cell.
    pub fn hungry(&self, agent: usize, from: usize, to: usize) -> f64 {
        self.oracle_calls.set(self.oracle_calls.get() + 1);
        let (lo, hi, sign) = if from <= to {
            (from, to, 1.0)
        } else {
            (to, from, -1.0)
        };
        let start = self.grid_point(lo);
        let end = self.grid_point(hi);
        let raw = self.valuations[agent].integrate(start, end);
        sign * (raw / 2.0 + self.epsilon * (end - start))
    }

    /// Corner values for the cell pair, sampled once per engine.
    pub fn corners(&self, agent: usize, start_cell: usize, end_cell: usize) -> CellCorners {
        let key = (agent, start_cell, end_cell);
        if let Some(corners) = self.cache.borrow_mut().get(key) {
            return corners;
        }
        let corners = CellCorners {
            h00: self.hungry(agent, start_cell + 1, end_cell),
            h10: self.hungry(agent, start_cell, end_cell),
            h01: self.hungry(agent, start_cell + 1, end_cell + 1),
            h11: self.hungry(agent, start_cell, end_cell + 1),
        };
        self.cache.borrow_mut().insert(key, corners);
        corners
    }

    /// Value agent `agent` assigns to `[start, end]`.
    ///
    /// Both bounds must lie in `[0, 1]`; `end <= start` yields zero.
    pub fn value_query(&self, agent: usize, start: f64, end: f64) -> Result<f64, CakeError> {
        self.check_agent(agent)?;
        self.check_position("start", start)?;
        self.check_position("end", end)?;
        if end <= start {
            return Ok(0.0);
        }
        let start_cell = self.cell_of(start);
        let end_cell = self.cell_of(end);
        let u = self.start_coordinate(start_cell, start);
        let w = self.end_coordinate(end_cell, end);
        let corners = self.corners(agent, start_cell, end_cell);
        Ok(evaluate(&corners, u, w).max(0.0))
    }

    /// Value of the whole cake for `agent`.
    pub fn total_value(&self, agent: usize) -> Result<f64, CakeError> {
        self.value_query(agent, 0.0, 1.0)
    }

    /// Exact trapezoidal value of `[start, end]`, bypassing the oracle grid.
    pub fn exact_value(&self, agent: usize, start: f64, end: f64) -> Result<f64, CakeError> {
        self.check_agent(agent)?;
        Ok(self.valuations[agent].integrate(start, end))
    }

    /// Value of every slice of `division` for `agent`.
    pub fn slice_values(&self, agent: usize, division: &Division) -> Result<Vec<f64>, CakeError> {
        division
            .slices()
            .into_iter()
            .map(|(start, end)| self.value_query(agent, start, end))
            .collect()
    }
}
