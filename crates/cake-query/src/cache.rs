use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::interpolate::CellCorners;

/// Counters describing how often the raw valuations were sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OracleStats {
    /// Grid-aligned hungry oracle evaluations.
    pub oracle_calls: u64,
    /// Corner lookups answered from the cache.
    pub cache_hits: u64,
    /// Distinct `(agent, start cell, end cell)` entries held by the cache.
    pub cached_cell_pairs: u64,
}

/// Memo of grid-corner oracle values keyed by `(agent, start cell, end cell)`.
///
/// Lives as long as one [`crate::QueryEngine`]; nothing is shared between
/// requests.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<(usize, usize, usize), CellCorners>,
    hits: u64,
}

impl QueryCache {
    /// Looks up a cell pair, counting the hit.
    pub fn get(&mut self, key: (usize, usize, usize)) -> Option<CellCorners> {
        let found = self.entries.get(&key).copied();
        if found.is_some() {
            self.hits += 1;
        }
        found
    }

    /// Stores the corners of a freshly sampled cell pair.
    pub fn insert(&mut self, key: (usize, usize, usize), corners: CellCorners) {
        self.entries.insert(key, corners);
    }

    /// Number of lookups served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of cell pairs held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no cell pair has been sampled yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
