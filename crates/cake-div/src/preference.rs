//! Slice preference tests shared by certification and assignment.

use cake_core::{CakeError, Division};
use cake_query::QueryEngine;

/// Every agent's values for every slice of one division, `values[agent][slice]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceTable {
    values: Vec<Vec<f64>>,
}

impl SliceTable {
    /// Queries all agents of `engine` on `division`.
    pub fn measure(engine: &QueryEngine<'_>, division: &Division) -> Result<Self, CakeError> {
        let values = (0..engine.agent_count())
            .map(|agent| engine.slice_values(agent, division))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { values })
    }

    /// Wraps a precomputed table.
    pub fn from_values(values: Vec<Vec<f64>>) -> Self {
        Self { values }
    }

    /// Raw table.
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Value of `slice` for `agent`.
    pub fn value(&self, agent: usize, slice: usize) -> f64 {
        self.values[agent][slice]
    }

    /// Best slice value of `agent`.
    pub fn best_value(&self, agent: usize) -> f64 {
        self.values[agent].iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// First index attaining the maximum for `agent`.
    pub fn favourite(&self, agent: usize) -> usize {
        let mut best = 0;
        for (slice, &value) in self.values[agent].iter().enumerate() {
            if value > self.values[agent][best] {
                best = slice;
            }
        }
        best
    }

    /// Whether `agent` ranks `slice` within `tolerance` of its best slice.
    pub fn accepts(&self, agent: usize, slice: usize, tolerance: f64) -> bool {
        self.best_value(agent) - self.value(agent, slice) <= tolerance
    }

    /// Whether at least two of the non-cutting agents accept `slice`.
    pub fn contested_by_pair(&self, slice: usize, tolerance: f64) -> bool {
        (1..self.values.len())
            .filter(|&agent| self.accepts(agent, slice, tolerance))
            .count()
            >= 2
    }
}
