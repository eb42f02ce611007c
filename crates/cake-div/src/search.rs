//! Outer bisection over `alpha`, the value agent 0 assigns to every
//! uncontested slice.

use cake_core::{Bounds, CakeError, Division, DivisionConfig, ErrorInfo, InvariantRecord};
use cake_query::QueryEngine;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::assignment::feasible_assignment;
use crate::cases::SliceCase;
use crate::equipartition::{compute_equipartition, compute_equipartition_by, Equipartition};
use crate::preference::SliceTable;

const CUTTER: usize = 0;

/// Outcome of testing every hypothesis at one `alpha`.
#[derive(Debug, Clone, PartialEq)]
pub enum CertifyResult {
    /// A hypothesis held; the division and how it was certified.
    Certified(Division, InvariantRecord),
    /// No hypothesis held.
    NotCertified,
}

impl CertifyResult {
    /// Whether some hypothesis held.
    pub fn is_certified(&self) -> bool {
        matches!(self, CertifyResult::Certified(..))
    }
}

/// Result of [`find_envy_free_division`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Certified division.
    pub division: Division,
    /// Agent 0's equipartition the search started from.
    pub equipartition: Division,
    /// How the division was certified.
    pub record: InvariantRecord,
    /// `alpha` at which the division was certified. For an equipartition,
    /// the cutter's value of one slice.
    pub alpha: f64,
    /// Agent whose cuts produced `division`.
    pub cutter: usize,
    /// Outer bisection steps taken.
    pub iterations: usize,
}

/// Bracket width at which the alpha bisection stops.
pub fn alpha_threshold(config: &DivisionConfig, agent_count: usize) -> f64 {
    let epsilon = config.grid_epsilon();
    match agent_count {
        3 => (epsilon / 10.0).powi(4) / 12.0,
        _ => epsilon.powi(4) / 12.0,
    }
}

/// Tests the hypotheses for `agent_count` agents in priority order at `alpha`.
///
/// A pair hypothesis needs agent 0 to value both contested slices at most
/// `alpha`, which usually only becomes possible above the equipartition value.
/// With four agents certification can therefore turn back on after failing.
/// The bisection only relies on its lower end staying certified.
pub fn certify(
    engine: &QueryEngine<'_>,
    agent_count: usize,
    alpha: f64,
) -> Result<CertifyResult, CakeError> {
    let tolerance = engine.config().preference_tolerance();
    for &case in SliceCase::table(agent_count) {
        for indifferent in case.indifferent_agents(agent_count) {
            let Some(division) = case.derive(engine, agent_count, alpha, indifferent)? else {
                continue;
            };
            let table = SliceTable::measure(engine, &division)?;
            let cutter_accepts = case
                .contested()
                .into_iter()
                .all(|slice| table.value(CUTTER, slice) <= alpha + tolerance);
            if !cutter_accepts {
                continue;
            }
            let holds = match case {
                // Three agents: both others name the pivot as their favourite.
                SliceCase::Single { pivot } if agent_count == 3 => {
                    (1..agent_count).all(|agent| table.favourite(agent) == pivot)
                }
                _ => case
                    .contested()
                    .into_iter()
                    .all(|slice| table.contested_by_pair(slice, tolerance)),
            };
            if holds {
                let record = match (case, indifferent) {
                    (SliceCase::Single { pivot }, _) => InvariantRecord::single(pivot),
                    (_, Some(agent)) => {
                        let (first, second) = case.span();
                        InvariantRecord::pair(first, second, agent)
                    }
                    (_, None) => continue,
                };
                return Ok(CertifyResult::Certified(division, record));
            }
        }
    }
    Ok(CertifyResult::NotCertified)
}

fn check_agent_count(engine: &QueryEngine<'_>, agent_count: usize) -> Result<(), CakeError> {
    if engine.agent_count() != agent_count {
        return Err(CakeError::Input(
            ErrorInfo::new("agent-count", "engine and search disagree on the number of agents")
                .with_context("engine", engine.agent_count())
                .with_context("requested", agent_count),
        ));
    }
    Ok(())
}

fn equipartition_outcome(cut: Equipartition, start: Division, cutter: usize) -> SearchOutcome {
    SearchOutcome {
        division: cut.division,
        equipartition: start,
        record: InvariantRecord::equipartition(),
        alpha: cut.reference_value,
        cutter,
        iterations: 0,
    }
}

/// Finds a division every agent can be assigned a slice of without envy
/// beyond `ε / 12`.
///
/// Starts from agent 0's equipartition and bisects `alpha` over agent 0's
/// cuts.
pub fn find_envy_free_division(
    engine: &QueryEngine<'_>,
    agent_count: usize,
) -> Result<SearchOutcome, CakeError> {
    check_agent_count(engine, agent_count)?;
    let start = compute_equipartition(engine, agent_count)?;
    let tolerance = engine.config().preference_tolerance();
    let table = SliceTable::measure(engine, &start.division)?;
    if feasible_assignment(&table, tolerance).is_some() {
        info!(cuts = ?start.division.cuts(), "equipartition is already envy-free");
        return Ok(equipartition_outcome(start, start.division, CUTTER));
    }
    bisect_alpha(engine, agent_count, start)
}

/// Like [`find_envy_free_division`], but first accepts the equipartition of
/// any agent, tried in index order, that already admits an assignment without
/// envy beyond `ε / 12`.
///
/// An agent who values a region nobody else wants would otherwise split it
/// with its own cuts whenever it is agent 0.
pub fn find_division(
    engine: &QueryEngine<'_>,
    agent_count: usize,
) -> Result<SearchOutcome, CakeError> {
    check_agent_count(engine, agent_count)?;
    let start = compute_equipartition(engine, agent_count)?;
    let tolerance = engine.config().preference_tolerance();
    for cutter in 0..agent_count {
        let cut = if cutter == CUTTER {
            start
        } else {
            compute_equipartition_by(engine, agent_count, cutter)?
        };
        let table = SliceTable::measure(engine, &cut.division)?;
        if feasible_assignment(&table, tolerance).is_some() {
            info!(cutter, cuts = ?cut.division.cuts(), "equipartition is already envy-free");
            return Ok(equipartition_outcome(cut, start.division, cutter));
        }
    }
    bisect_alpha(engine, agent_count, start)
}

fn bisect_alpha(
    engine: &QueryEngine<'_>,
    agent_count: usize,
    start: Equipartition,
) -> Result<SearchOutcome, CakeError> {
    let Equipartition {
        division: equipartition,
        reference_value,
    } = start;
    let mut certified = match certify(engine, agent_count, reference_value)? {
        CertifyResult::Certified(division, record) => Some((division, record, reference_value)),
        CertifyResult::NotCertified => None,
    };
    let threshold = alpha_threshold(engine.config(), agent_count);
    let cap = engine.config().alpha_iteration_cap;
    let mut bracket = Bounds::new(reference_value, 1.0);
    let mut iterations = 0;
    while bracket.width() > threshold && iterations < cap && !bracket.is_stalled() {
        let alpha = bracket.midpoint();
        bracket = match certify(engine, agent_count, alpha)? {
            CertifyResult::Certified(division, record) => {
                certified = Some((division, record, alpha));
                bracket.raise_lower(alpha)
            }
            CertifyResult::NotCertified => bracket.drop_upper(alpha),
        };
        iterations += 1;
    }
    debug!(iterations, lower = bracket.lower, upper = bracket.upper, "alpha bracket closed");

    match certified {
        Some((division, record, alpha)) => {
            info!(alpha, ?record, cuts = ?division.cuts(), "division certified");
            Ok(SearchOutcome {
                division,
                equipartition,
                record,
                alpha,
                cutter: CUTTER,
                iterations,
            })
        }
        None => {
            warn!(iterations, "no hypothesis certified; keeping the equipartition");
            Ok(SearchOutcome {
                iterations,
                ..equipartition_outcome(start, equipartition, CUTTER)
            })
        }
    }
}
