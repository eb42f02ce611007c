#![deny(missing_docs)]
#![doc = "Core valuation, division and error types shared by the envy-free cake division crates."]

/// Search brackets.
pub mod bounds;
/// Protocol constants loaded from YAML.
pub mod config;
pub mod division;
pub mod errors;
pub mod provenance;
pub mod rng;
/// Canonical JSON and hashing helpers.
pub mod serde;
pub mod valuation;

pub use bounds::Bounds;
pub use config::DivisionConfig;
pub use division::{
    Condition, Division, FourAgentPortion, InvariantRecord, ThreeAgentPortion, ORDER_TOLERANCE,
};
pub use errors::{CakeError, ErrorInfo};
pub use provenance::{DivisionProvenance, SchemaVersion};
pub use rng::{agent_seed, AgentRng};
pub use valuation::{Segment, ValuationModel};
