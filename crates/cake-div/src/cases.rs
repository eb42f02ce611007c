//! Hypothesis table for certifying an envy-free division at a given `alpha`.
//!
//! Every hypothesis names one or two contested slices. Agent 0 values each
//! remaining slice at exactly `alpha`: slices left of the first contested one
//! are cut forward from `0`, slices right of the last contested one are cut
//! backward from `1`. When two slices are contested the cut closing the first
//! one is free and is pinned by an indifferent agent who must value both
//! contested slices equally.

use cake_core::{Bounds, CakeError, Division};
use cake_query::{CutResult, QueryEngine};
use serde::{Deserialize, Serialize};

const CUTTER: usize = 0;

/// A contested-slice hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SliceCase {
    /// One slice wanted by the non-cutting agents (condition A).
    Single {
        /// Contested slice.
        pivot: usize,
    },
    /// Two neighbouring contested slices (condition B).
    Adjacent {
        /// Left contested slice.
        first: usize,
        /// Right contested slice.
        second: usize,
    },
    /// Two contested slices with one slice between them (condition B).
    OneApart {
        /// Left contested slice.
        first: usize,
        /// Right contested slice.
        second: usize,
    },
    /// The outermost slices of a four-way division (condition B).
    TwoApart {
        /// Left contested slice.
        first: usize,
        /// Right contested slice.
        second: usize,
    },
}

/// Hypotheses for three agents, in the order they are tried.
pub const THREE_AGENT_CASES: [SliceCase; 3] = [
    SliceCase::Single { pivot: 0 },
    SliceCase::Single { pivot: 1 },
    SliceCase::Single { pivot: 2 },
];

/// Hypotheses for four agents, in the order they are tried.
pub const FOUR_AGENT_CASES: [SliceCase; 10] = [
    SliceCase::Single { pivot: 0 },
    SliceCase::Single { pivot: 1 },
    SliceCase::Single { pivot: 2 },
    SliceCase::Single { pivot: 3 },
    SliceCase::Adjacent { first: 0, second: 1 },
    SliceCase::Adjacent { first: 1, second: 2 },
    SliceCase::Adjacent { first: 2, second: 3 },
    SliceCase::OneApart { first: 0, second: 2 },
    SliceCase::OneApart { first: 1, second: 3 },
    SliceCase::TwoApart { first: 0, second: 3 },
];

/// Derives a candidate division for one hypothesis, or `None` when the
/// hypothesis cannot be realized at this `alpha`.
pub type Strategy = fn(
    engine: &QueryEngine<'_>,
    case: SliceCase,
    slices: usize,
    alpha: f64,
    indifferent: Option<usize>,
) -> Result<Option<Division>, CakeError>;

impl SliceCase {
    /// Hypothesis table for `agent_count` agents.
    pub fn table(agent_count: usize) -> &'static [SliceCase] {
        match agent_count {
            3 => &THREE_AGENT_CASES,
            4 => &FOUR_AGENT_CASES,
            _ => &[],
        }
    }

    /// Contested slice indices in increasing order.
    pub fn contested(self) -> Vec<usize> {
        match self {
            SliceCase::Single { pivot } => vec![pivot],
            SliceCase::Adjacent { first, second }
            | SliceCase::OneApart { first, second }
            | SliceCase::TwoApart { first, second } => vec![first, second],
        }
    }

    /// First and last contested slice.
    pub fn span(self) -> (usize, usize) {
        match self {
            SliceCase::Single { pivot } => (pivot, pivot),
            SliceCase::Adjacent { first, second }
            | SliceCase::OneApart { first, second }
            | SliceCase::TwoApart { first, second } => (first, second),
        }
    }

    /// Agents that may pin the free cut; `[None]` when nothing is free.
    pub fn indifferent_agents(self, agent_count: usize) -> Vec<Option<usize>> {
        match self {
            SliceCase::Single { .. } => vec![None],
            _ => (1..agent_count).map(Some).collect(),
        }
    }

    /// Derivation routine for this hypothesis.
    pub fn strategy(self) -> Strategy {
        match self {
            SliceCase::Single { .. } => derive_single,
            SliceCase::Adjacent { .. } => derive_adjacent,
            SliceCase::OneApart { .. } | SliceCase::TwoApart { .. } => derive_spread,
        }
    }

    /// Runs the strategy for this hypothesis.
    pub fn derive(
        self,
        engine: &QueryEngine<'_>,
        slices: usize,
        alpha: f64,
        indifferent: Option<usize>,
    ) -> Result<Option<Division>, CakeError> {
        (self.strategy())(engine, self, slices, alpha, indifferent)
    }
}

/// Cut positions `edges[k]` for `k` in `0..=slices`; unset edges are `None`.
#[derive(Clone)]
struct Edges {
    edges: Vec<Option<f64>>,
}

impl Edges {
    /// Fixes every edge outside the contested span from agent 0's `alpha` cuts.
    fn anchored(
        engine: &QueryEngine<'_>,
        slices: usize,
        alpha: f64,
        (first, last): (usize, usize),
    ) -> Result<Option<Self>, CakeError> {
        let mut edges = vec![None; slices + 1];
        edges[0] = Some(0.0);
        edges[slices] = Some(1.0);
        let mut position = 0.0;
        for edge in 1..=first {
            let CutResult::Found(next) = engine.forward_cut(CUTTER, position, alpha)? else {
                return Ok(None);
            };
            position = next;
            edges[edge] = Some(position);
        }
        let mut position = 1.0;
        for edge in (last + 1..slices).rev() {
            let CutResult::Found(next) = engine.backward_cut(CUTTER, position, alpha)? else {
                return Ok(None);
            };
            position = next;
            edges[edge] = Some(position);
        }
        Ok(Some(Self { edges }))
    }

    fn get(&self, edge: usize) -> Option<f64> {
        self.edges[edge]
    }

    fn set(&mut self, edge: usize, position: f64) {
        self.edges[edge] = Some(position);
    }

    /// Chains forward `alpha` cuts from `edge` up to `until` (exclusive end edge).
    fn chain_forward(
        &mut self,
        engine: &QueryEngine<'_>,
        alpha: f64,
        edge: usize,
        until: usize,
    ) -> Result<bool, CakeError> {
        let Some(mut position) = self.get(edge) else {
            return Ok(false);
        };
        for next_edge in edge + 1..until {
            let CutResult::Found(next) = engine.forward_cut(CUTTER, position, alpha)? else {
                return Ok(false);
            };
            position = next;
            self.set(next_edge, position);
        }
        Ok(true)
    }

    fn into_division(self) -> Option<Division> {
        let cuts = self.edges[1..self.edges.len() - 1]
            .iter()
            .copied()
            .collect::<Option<Vec<_>>>()?;
        Division::from_cuts(&cuts).ok()
    }
}

fn derive_single(
    engine: &QueryEngine<'_>,
    case: SliceCase,
    slices: usize,
    alpha: f64,
    _indifferent: Option<usize>,
) -> Result<Option<Division>, CakeError> {
    Ok(Edges::anchored(engine, slices, alpha, case.span())?.and_then(Edges::into_division))
}

fn derive_adjacent(
    engine: &QueryEngine<'_>,
    case: SliceCase,
    slices: usize,
    alpha: f64,
    indifferent: Option<usize>,
) -> Result<Option<Division>, CakeError> {
    let (first, second) = case.span();
    let Some(agent) = indifferent else {
        return Ok(None);
    };
    let Some(mut edges) = Edges::anchored(engine, slices, alpha, (first, second))? else {
        return Ok(None);
    };
    let (Some(start), Some(end)) = (edges.get(first), edges.get(second + 1)) else {
        return Ok(None);
    };
    if end < start {
        return Ok(None);
    }
    edges.set(first + 1, engine.bisection_cut_query(agent, start, end)?);
    Ok(edges.into_division())
}

/// Contested slices separated by `alpha` slices: bisect the cut closing the
/// first contested slice until the indifferent agent values both equally.
fn derive_spread(
    engine: &QueryEngine<'_>,
    case: SliceCase,
    slices: usize,
    alpha: f64,
    indifferent: Option<usize>,
) -> Result<Option<Division>, CakeError> {
    let (first, second) = case.span();
    let Some(agent) = indifferent else {
        return Ok(None);
    };
    let Some(anchors) = Edges::anchored(engine, slices, alpha, (first, second))? else {
        return Ok(None);
    };
    let (Some(start), Some(end)) = (anchors.get(first), anchors.get(second + 1)) else {
        return Ok(None);
    };
    if end < start {
        return Ok(None);
    }

    // `Some(gap)` is first minus second contested value; `None` means the
    // free cut leaves no room for the slices between the contested ones.
    let place = |free: f64| -> Result<Option<(Edges, f64)>, CakeError> {
        let mut edges = anchors.clone();
        edges.set(first + 1, free);
        if !edges.chain_forward(engine, alpha, first + 1, second + 1)? {
            return Ok(None);
        }
        let Some(second_start) = edges.get(second) else {
            return Ok(None);
        };
        if second_start > end {
            return Ok(None);
        }
        let gap = engine.value_query(agent, start, free)?
            - engine.value_query(agent, second_start, end)?;
        Ok(Some((edges, gap)))
    };

    let config = engine.config();
    let mut bracket = Bounds::new(start, end);
    let mut iterations = 0;
    while bracket.width() > config.fixed_point_tolerance
        && iterations < config.fixed_point_iteration_cap
        && !bracket.is_stalled()
    {
        let free = bracket.midpoint();
        bracket = match place(free)? {
            Some((_, gap)) if gap < 0.0 => bracket.raise_lower(free),
            _ => bracket.drop_upper(free),
        };
        iterations += 1;
    }
    let placed = match place(bracket.midpoint())? {
        Some(placed) => Some(placed),
        None => place(bracket.lower)?,
    };
    Ok(placed.and_then(|(edges, _)| edges.into_division()))
}
