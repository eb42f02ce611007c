mod common;

use cake_core::DivisionConfig;
use cake_query::QueryEngine;
use common::fixture_valuations;
use proptest::prelude::*;

#[test]
fn grid_aligned_queries_match_hungry_formula() {
    let valuations = fixture_valuations();
    let engine = QueryEngine::new(&valuations, &DivisionConfig::with_epsilon(0.05)).unwrap();
    let eps = engine.epsilon();
    for agent in 0..valuations.len() {
        let value = engine.value_query(agent, 0.1, 0.6).unwrap();
        let raw = valuations[agent].integrate(0.1, 0.6);
        assert!((value - (raw / 2.0 + eps * 0.5)).abs() < 1e-12, "agent {agent}");
    }
}

#[test]
fn uniform_agent_value_is_linear_in_length() {
    let valuations = fixture_valuations();
    let engine = QueryEngine::new(&valuations, &DivisionConfig::default()).unwrap();
    let eps = engine.epsilon();
    let value = engine.value_query(0, 0.123, 0.4567).unwrap();
    assert!((value - (0.5 + eps) * (0.4567 - 0.123)).abs() < 1e-12);
}

#[test]
fn reversed_interval_is_worth_nothing() {
    let valuations = fixture_valuations();
    let engine = QueryEngine::new(&valuations, &DivisionConfig::default()).unwrap();
    assert_eq!(engine.value_query(1, 0.8, 0.3).unwrap(), 0.0);
    assert_eq!(engine.value_query(1, 0.3, 0.3).unwrap(), 0.0);
}

#[test]
fn out_of_range_bounds_fail_fast() {
    let valuations = fixture_valuations();
    let engine = QueryEngine::new(&valuations, &DivisionConfig::default()).unwrap();
    let err = engine.value_query(0, -0.1, 0.5).unwrap_err();
    assert_eq!(err.info().code, "position-range");
    let err = engine.value_query(0, 0.1, 1.5).unwrap_err();
    assert_eq!(err.info().code, "position-range");
    let err = engine.value_query(9, 0.1, 0.5).unwrap_err();
    assert_eq!(err.info().code, "agent-index");
    assert!(engine.value_query(0, f64::NAN, 0.5).is_err());
}

#[test]
fn corners_are_sampled_once_per_cell_pair() {
    let valuations = fixture_valuations();
    let engine = QueryEngine::new(&valuations, &DivisionConfig::with_epsilon(0.1)).unwrap();
    engine.value_query(1, 0.12, 0.57).unwrap();
    let first = engine.stats();
    assert_eq!(first.oracle_calls, 4);
    assert_eq!(first.cached_cell_pairs, 1);
    engine.value_query(1, 0.15, 0.51).unwrap();
    let second = engine.stats();
    assert_eq!(second.oracle_calls, 4);
    assert_eq!(second.cache_hits, 1);
}

#[test]
fn strictly_longer_intervals_are_worth_more() {
    let valuations = fixture_valuations();
    let engine = QueryEngine::new(&valuations, &DivisionConfig::default()).unwrap();
    // agent 2 values nothing past 0.25, the hungry term still orders intervals
    let short = engine.value_query(2, 0.5, 0.6).unwrap();
    let long = engine.value_query(2, 0.5, 0.7).unwrap();
    assert!(long > short);
    assert!(short > 0.0);
}

proptest! {
    #[test]
    fn value_query_is_additive(agent in 0usize..3, a in 0.0f64..=1.0, b in 0.0f64..=1.0, c in 0.0f64..=1.0) {
        let valuations = fixture_valuations();
        let engine = QueryEngine::new(&valuations, &DivisionConfig::default()).unwrap();
        let mut points = [a, b, c];
        points.sort_by(|x, y| x.partial_cmp(y).unwrap());
        let whole = engine.value_query(agent, points[0], points[2]).unwrap();
        let split = engine.value_query(agent, points[0], points[1]).unwrap()
            + engine.value_query(agent, points[1], points[2]).unwrap();
        prop_assert!((whole - split).abs() < 1e-9);
    }
}
