//! Cut positions and certification records.

use serde::{Deserialize, Serialize};

use crate::errors::{CakeError, ErrorInfo};

/// Slack allowed on cut ordering before a division is rejected.
pub const ORDER_TOLERANCE: f64 = 1e-12;

/// Two cuts defining slices `[0,left]`, `[left,right]`, `[right,1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreeAgentPortion {
    /// First cut.
    pub left: f64,
    /// Second cut.
    pub right: f64,
}

/// Three cuts defining four consecutive slices of the cake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FourAgentPortion {
    /// First cut.
    pub left: f64,
    /// Second cut.
    pub middle: f64,
    /// Third cut.
    pub right: f64,
}

/// A division of the normalized cake `[0, 1]` into consecutive slices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Division {
    /// Three slices.
    Three(ThreeAgentPortion),
    /// Four slices.
    Four(FourAgentPortion),
}

fn ordered_cuts(cuts: &[f64]) -> Result<Vec<f64>, CakeError> {
    let mut previous = 0.0;
    let mut ordered = Vec::with_capacity(cuts.len());
    for (idx, &cut) in cuts.iter().enumerate() {
        if !cut.is_finite() || cut < previous - ORDER_TOLERANCE || cut > 1.0 + ORDER_TOLERANCE {
            return Err(CakeError::InvalidDivision(
                ErrorInfo::new("cut-order", "cuts must be non-decreasing inside [0, 1]")
                    .with_context("cut", idx)
                    .with_context("position", cut)
                    .with_context("previous", previous),
            ));
        }
        let clamped = cut.clamp(previous, 1.0);
        ordered.push(clamped);
        previous = clamped;
    }
    Ok(ordered)
}

impl Division {
    /// Validated three-slice division.
    pub fn three(left: f64, right: f64) -> Result<Self, CakeError> {
        let cuts = ordered_cuts(&[left, right])?;
        Ok(Division::Three(ThreeAgentPortion {
            left: cuts[0],
            right: cuts[1],
        }))
    }

    /// Validated four-slice division.
    pub fn four(left: f64, middle: f64, right: f64) -> Result<Self, CakeError> {
        let cuts = ordered_cuts(&[left, middle, right])?;
        Ok(Division::Four(FourAgentPortion {
            left: cuts[0],
            middle: cuts[1],
            right: cuts[2],
        }))
    }

    /// Validated division from two or three cut positions.
    pub fn from_cuts(cuts: &[f64]) -> Result<Self, CakeError> {
        match cuts {
            [left, right] => Self::three(*left, *right),
            [left, middle, right] => Self::four(*left, *middle, *right),
            _ => Err(CakeError::InvalidDivision(
                ErrorInfo::new("cut-count", "expected two or three cuts")
                    .with_context("cuts", cuts.len()),
            )),
        }
    }

    /// Number of slices, which equals the number of agents served.
    pub fn agent_count(&self) -> usize {
        match self {
            Division::Three(_) => 3,
            Division::Four(_) => 4,
        }
    }

    /// Interior cut positions in increasing order.
    pub fn cuts(&self) -> Vec<f64> {
        match self {
            Division::Three(portion) => vec![portion.left, portion.right],
            Division::Four(portion) => vec![portion.left, portion.middle, portion.right],
        }
    }

    /// Slice `[start, end]` pairs covering `[0, 1]`.
    pub fn slices(&self) -> Vec<(f64, f64)> {
        let mut edges = Vec::with_capacity(self.agent_count() + 1);
        edges.push(0.0);
        edges.extend(self.cuts());
        edges.push(1.0);
        edges.windows(2).map(|pair| (pair[0], pair[1])).collect()
    }

    /// Cut positions mapped back to a cake of length `cake_size`.
    pub fn scaled_cuts(&self, cake_size: f64) -> Vec<f64> {
        self.cuts().into_iter().map(|cut| cut * cake_size).collect()
    }
}

/// Which family of hypotheses certified a division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// The equipartition was already envy-free.
    Equipartition,
    /// One slice preferred by at least two of the non-cutting agents.
    A,
    /// Two slices each preferred by at least two of the non-cutting agents.
    B,
}

/// Diagnostic record of how a division was certified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantRecord {
    /// Certifying condition.
    pub condition: Condition,
    /// Zero-based indices of the contested slice(s).
    pub slices: Vec<usize>,
    /// Agent whose indifference fixed the otherwise free cut (condition B only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indifferent_agent: Option<usize>,
}

impl InvariantRecord {
    /// Record for an equipartition that needed no search.
    pub fn equipartition() -> Self {
        Self {
            condition: Condition::Equipartition,
            slices: Vec::new(),
            indifferent_agent: None,
        }
    }

    /// Record for a single contested slice.
    pub fn single(slice: usize) -> Self {
        Self {
            condition: Condition::A,
            slices: vec![slice],
            indifferent_agent: None,
        }
    }

    /// Record for a pair of contested slices pinned by `indifferent_agent`.
    pub fn pair(first: usize, second: usize, indifferent_agent: usize) -> Self {
        Self {
            condition: Condition::B,
            slices: vec![first, second],
            indifferent_agent: Some(indifferent_agent),
        }
    }
}
