mod common;

use std::collections::BTreeMap;

use cake_core::{CakeError, Condition, DivisionConfig, Segment};
use cake_div::{divide, envy_report, sample_request, DivisionRequest, SampleShape};
use common::flat_request;

#[test]
fn isolated_region_gets_its_own_slice() {
    for special in 0..4 {
        let mut request = flat_request(4.0, &[1.0, 1.0, 2.0, 1.0]);
        request.preferences[special] = vec![
            Segment::flat(0.0, 1.0, 10.0),
            Segment::flat(1.0, 4.0, 0.0),
        ];
        let config = DivisionConfig::default();
        let response = divide(&request, &config).unwrap();
        assert!((response.division[0] - 1.0).abs() <= config.epsilon * request.cake_size);
        assert_eq!(response.assignment[&1], special);
        assert_eq!(response.record.condition, Condition::Equipartition);
        assert!(response.percent_values[special][0] > 99.0);
    }
}

#[test]
fn three_uniform_agents_get_thirds() {
    let request = flat_request(3.0, &[1.0, 5.0, 0.5]);
    let response = divide(&request, &DivisionConfig::default()).unwrap();
    assert!((response.division[0] - 1.0).abs() < 1e-6);
    assert!((response.division[1] - 2.0).abs() < 1e-6);
    for row in &response.percent_values {
        for share in row {
            assert!((share - 100.0 / 3.0).abs() < 1e-4);
        }
    }
    let report = envy_report(&request, &response.division, &response.assignment).unwrap();
    assert!(report.is_envy_free(1e-4));
}

#[test]
fn response_serializes_with_one_based_slices() {
    let request = flat_request(1.0, &[1.0, 1.0, 1.0, 1.0]);
    let response = divide(&request, &DivisionConfig::default()).unwrap();
    let json = serde_json::to_value(&response).unwrap();
    let assignment = json["assignment"].as_object().unwrap();
    let keys: Vec<&str> = assignment.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["1", "2", "3", "4"]);
    assert_eq!(json["record"]["condition"], "equipartition");
    assert_eq!(json["provenance"]["request_hash"].as_str().unwrap().len(), 64);
    assert!(json["stats"]["oracle_calls"].as_u64().unwrap() > 0);

    let again = divide(&request, &DivisionConfig::default()).unwrap();
    assert_eq!(response.provenance, again.provenance);
}

#[test]
fn camel_case_requests_are_accepted() {
    let json = r#"{
        "cakeSize": 2.0,
        "preferences": [
            [{"start": 0.0, "end": 2.0, "startValue": 1.0, "endValue": 1.0}],
            [{"start": 0.0, "end": 1.0, "startValue": 0.0, "endValue": 2.0},
             {"start": 1.0, "end": 2.0, "startValue": 2.0, "endValue": 0.0}],
            [{"start": 0.0, "end": 2.0, "startValue": 3.0, "endValue": 3.0}]
        ]
    }"#;
    let request: DivisionRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.cake_size, 2.0);
    let response = divide(&request, &DivisionConfig::default()).unwrap();
    assert_eq!(response.division.len(), 2);
    assert_eq!(response.assignment.len(), 3);
}

#[test]
fn malformed_requests_are_rejected() {
    let config = DivisionConfig::default();

    let too_few = flat_request(1.0, &[1.0, 1.0]);
    assert_eq!(divide(&too_few, &config).unwrap_err().info().code, "agent-count");

    let mut gap = flat_request(1.0, &[1.0, 1.0, 1.0]);
    gap.preferences[2] = vec![Segment::flat(0.0, 0.4, 1.0), Segment::flat(0.5, 1.0, 1.0)];
    let err = divide(&gap, &config).unwrap_err();
    assert_eq!(err.info().code, "segment-gap");
    assert_eq!(err.info().context.get("agent").map(String::as_str), Some("2"));

    let mut short = flat_request(1.0, &[1.0, 1.0, 1.0]);
    short.preferences[0] = vec![Segment::flat(0.0, 0.8, 1.0)];
    assert_eq!(divide(&short, &config).unwrap_err().info().code, "coverage");

    let empty = flat_request(0.0, &[1.0, 1.0, 1.0]);
    assert!(matches!(divide(&empty, &config), Err(CakeError::Input(_))));

    let bad_config = DivisionConfig::with_epsilon(0.0);
    let request = flat_request(1.0, &[1.0, 1.0, 1.0]);
    assert!(matches!(divide(&request, &bad_config), Err(CakeError::Config(_))));
}

#[test]
fn agents_valuing_nothing_still_receive_a_slice() {
    let request = flat_request(1.0, &[1.0, 0.0, 1.0]);
    let response = divide(&request, &DivisionConfig::default()).unwrap();
    assert_eq!(response.assignment.len(), 3);
    for share in &response.percent_values[1] {
        assert!((share - 100.0 / 3.0).abs() < 1e-9);
    }
}

#[test]
fn sampled_three_agent_requests_are_divided() {
    let config = DivisionConfig::with_epsilon(0.05);
    for seed in 0..4 {
        for shape in [SampleShape::Flat, SampleShape::Linear] {
            let request = sample_request(seed, 3, 5, shape).unwrap();
            let response = divide(&request, &config).unwrap();
            let mut agents: Vec<usize> = response.assignment.values().copied().collect();
            agents.sort_unstable();
            assert_eq!(agents, vec![0, 1, 2]);
            for row in &response.percent_values {
                assert!((row.iter().sum::<f64>() - 100.0).abs() < 1e-6);
            }
            let report = envy_report(&request, &response.division, &response.assignment).unwrap();
            assert_eq!(report.agents.len(), 3);
        }
    }
}

#[test]
fn sampled_four_agent_requests_are_divided() {
    let config = DivisionConfig::with_epsilon(0.05);
    let mut pairs = 0;
    for seed in 0..4 {
        for shape in [SampleShape::Flat, SampleShape::Linear] {
            let request = sample_request(seed, 4, 6, shape).unwrap();
            let response = divide(&request, &config).unwrap();
            let mut agents: Vec<usize> = response.assignment.values().copied().collect();
            agents.sort_unstable();
            assert_eq!(agents, vec![0, 1, 2, 3]);
            for row in &response.percent_values {
                assert!((row.iter().sum::<f64>() - 100.0).abs() < 1e-6);
            }
            if response.record.condition == Condition::B {
                assert_eq!(response.record.slices.len(), 2);
                assert!(response.record.indifferent_agent.is_some());
                pairs += 1;
            }
            let report = envy_report(&request, &response.division, &response.assignment).unwrap();
            assert_eq!(report.agents.len(), 4);
        }
    }
    assert!(pairs > 0);
}

#[test]
fn envy_report_flags_lopsided_assignments() {
    let request = flat_request(3.0, &[1.0, 1.0, 1.0]);
    let assignment: BTreeMap<usize, usize> = [(1, 0), (2, 1), (3, 2)].into_iter().collect();
    let report = envy_report(&request, &[0.5, 2.5], &assignment).unwrap();
    assert!((report.max_envy - 50.0).abs() < 1e-9);
    assert_eq!(report.agents[0].slice, 1);
    assert!(!report.is_envy_free(1.0));

    let duplicated: BTreeMap<usize, usize> = [(1, 0), (2, 0), (3, 2)].into_iter().collect();
    assert_eq!(
        envy_report(&request, &[1.0, 2.0], &duplicated).unwrap_err().info().code,
        "assignment"
    );
}
