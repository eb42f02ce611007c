#![deny(missing_docs)]
#![doc = "Envy-free division of a one-dimensional cake among three or four agents."]

/// Minimum-cost slice assignment.
pub mod assignment;
pub mod cases;
pub mod envy;
pub mod equipartition;
/// Slice preference tables.
pub mod preference;
pub mod request;
pub mod response;
pub mod sample;
pub mod search;

pub use assignment::{
    assign_slices, cost_matrix, feasible_assignment, min_cost_matching, SENTINEL_COST,
};
pub use cases::{SliceCase, Strategy, FOUR_AGENT_CASES, THREE_AGENT_CASES};
pub use envy::{envy_report, AgentEnvy, EnvyReport};
pub use equipartition::{compute_equipartition, compute_equipartition_by, Equipartition};
pub use preference::SliceTable;
pub use request::{normalize_request, validate_request, DivisionRequest};
pub use response::{divide, percent_values, DivisionResponse};
pub use sample::{sample_request, SampleShape};
pub use search::{
    alpha_threshold, certify, find_division, find_envy_free_division, CertifyResult,
    SearchOutcome,
};
