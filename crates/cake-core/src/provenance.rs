//! Provenance and schema descriptors attached to division responses.

use serde::{Deserialize, Serialize};

/// Semantic version describing the schema of serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Ties a response to the exact request and grid that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DivisionProvenance {
    /// Schema of the response payload.
    pub schema_version: SchemaVersion,
    /// SHA-256 of the canonical request JSON.
    pub request_hash: String,
    /// Grid resolution the oracle was sampled at.
    pub epsilon: f64,
}
