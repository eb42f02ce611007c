#![deny(missing_docs)]
#![doc = "Grid-sampled value and cut queries over piecewise-linear valuations."]

/// Memoized grid-corner oracle values.
pub mod cache;
pub mod cut;
/// Query engine owning one request's valuations and cache.
pub mod engine;
pub mod interpolate;

pub use cache::{OracleStats, QueryCache};
pub use cut::{CutDirection, CutResult};
pub use engine::QueryEngine;
pub use interpolate::{CellCorners, Orientation};
