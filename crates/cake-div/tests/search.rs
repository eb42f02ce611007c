mod common;

use cake_core::{Condition, DivisionConfig, InvariantRecord, Segment, ValuationModel};
use cake_div::{
    alpha_threshold, assign_slices, certify, compute_equipartition, find_division,
    find_envy_free_division, normalize_request, sample_request, CertifyResult, SampleShape,
    SliceTable,
};
use cake_query::QueryEngine;
use common::{plateau, uniform};

#[test]
fn uniform_agents_take_the_fast_path() {
    let valuations = vec![uniform(), uniform(), uniform()];
    let engine = QueryEngine::new(&valuations, &DivisionConfig::default()).unwrap();
    let outcome = find_envy_free_division(&engine, 3).unwrap();
    assert_eq!(outcome.record, InvariantRecord::equipartition());
    assert_eq!(outcome.iterations, 0);
    assert_eq!(outcome.division, outcome.equipartition);
}

#[test]
fn contested_middle_shrinks_until_someone_is_indifferent() {
    let valuations = vec![uniform(), plateau(0.3, 0.7, 0.1), plateau(0.3, 0.7, 0.1)];
    let config = DivisionConfig::default();
    let engine = QueryEngine::new(&valuations, &config).unwrap();
    let outcome = find_envy_free_division(&engine, 3).unwrap();
    assert_eq!(outcome.record, InvariantRecord::single(1));
    let cuts = outcome.division.cuts();
    assert!((cuts[0] + cuts[1] - 1.0).abs() < 1e-6, "cuts {cuts:?}");
    assert!(cuts[0] > 0.38 && cuts[0] < 0.47, "cuts {cuts:?}");

    let agent_of = assign_slices(&engine, &outcome.division).unwrap();
    assert_ne!(agent_of[1], 0);

    let table = SliceTable::measure(&engine, &outcome.division).unwrap();
    let tolerance = config.preference_tolerance();
    for (slice, &agent) in agent_of.iter().enumerate() {
        assert!(table.accepts(agent, slice, tolerance));
    }
}

#[test]
fn certification_does_not_flicker_along_alpha() {
    let valuations = vec![uniform(), plateau(0.3, 0.7, 0.1), plateau(0.3, 0.7, 0.1)];
    let engine = QueryEngine::new(&valuations, &DivisionConfig::default()).unwrap();
    let start = compute_equipartition(&engine, 3).unwrap().reference_value;
    let end = engine.total_value(0).unwrap() / 2.0;
    let mut seen_failure = false;
    for step in 0..=40 {
        let alpha = start + (end - start) * step as f64 / 40.0;
        let certified = certify(&engine, 3, alpha).unwrap().is_certified();
        assert!(!(seen_failure && certified), "certified again at alpha {alpha}");
        seen_failure |= !certified;
    }
    assert!(seen_failure);
}

#[test]
fn four_agent_certification_returns_only_through_pairs() {
    let config = DivisionConfig::with_epsilon(0.05);
    for seed in 0..10 {
        for shape in [SampleShape::Flat, SampleShape::Linear] {
            let request = sample_request(seed, 4, 6, shape).unwrap();
            let valuations = normalize_request(&request, &config).unwrap();
            let engine = QueryEngine::new(&valuations, &config).unwrap();
            let start = compute_equipartition(&engine, 4).unwrap().reference_value;
            let end = engine.total_value(0).unwrap() / 2.0;
            let mut single_failed = false;
            let mut any_failed = false;
            for step in 0..=60 {
                let alpha = start + (end - start) * step as f64 / 60.0;
                let condition = match certify(&engine, 4, alpha).unwrap() {
                    CertifyResult::Certified(_, record) => Some(record.condition),
                    CertifyResult::NotCertified => None,
                };
                let single = condition == Some(Condition::A);
                assert!(
                    !(single_failed && single),
                    "seed {seed} {shape:?}: condition A again at alpha {alpha}"
                );
                if any_failed {
                    assert_ne!(
                        condition,
                        Some(Condition::A),
                        "seed {seed} {shape:?}: alpha {alpha}"
                    );
                }
                single_failed |= !single;
                any_failed |= condition.is_none();
            }
            assert!(single_failed, "seed {seed} {shape:?}");
        }
    }
}

#[test]
fn unreachable_alpha_certifies_nothing() {
    let hot = plateau(0.4, 0.6, 0.05);
    let valuations = vec![uniform(), hot.clone(), hot, uniform()];
    let engine = QueryEngine::new(&valuations, &DivisionConfig::default()).unwrap();
    assert_eq!(certify(&engine, 4, 0.9).unwrap(), CertifyResult::NotCertified);
}

#[test]
fn three_contesting_agents_need_two_special_slices() {
    let valuations = vec![
        uniform(),
        plateau(0.38, 0.58, 0.05),
        plateau(0.4, 0.6, 0.05),
        plateau(0.42, 0.62, 0.05),
    ];
    let config = DivisionConfig::default();
    let engine = QueryEngine::new(&valuations, &config).unwrap();
    let outcome = find_envy_free_division(&engine, 4).unwrap();
    assert_eq!(outcome.record.condition, Condition::B);
    assert_eq!(outcome.record.slices, vec![1, 2]);
    assert!(outcome.alpha > compute_equipartition(&engine, 4).unwrap().reference_value);

    let agent_of = assign_slices(&engine, &outcome.division).unwrap();
    let cutter_slice = agent_of.iter().position(|&agent| agent == 0).unwrap();
    assert!(cutter_slice == 0 || cutter_slice == 3);

    assert_eq!(find_division(&engine, 4).unwrap(), outcome);
}

#[test]
fn another_agents_equipartition_can_settle_the_division() {
    let isolated = ValuationModel::new(vec![
        Segment::flat(0.0, 0.25, 1.0),
        Segment::flat(0.25, 1.0, 0.0),
    ])
    .unwrap();
    let valuations = vec![isolated, uniform(), uniform(), uniform()];
    let engine = QueryEngine::new(&valuations, &DivisionConfig::default()).unwrap();

    let searched = find_envy_free_division(&engine, 4).unwrap();
    assert_eq!(searched.cutter, 0);
    assert_ne!(searched.record, InvariantRecord::equipartition());

    let outcome = find_division(&engine, 4).unwrap();
    assert_eq!(outcome.cutter, 1);
    assert_eq!(outcome.record, InvariantRecord::equipartition());
    assert_eq!(outcome.equipartition, searched.equipartition);
    let cuts = outcome.division.cuts();
    assert!((cuts[0] - 0.25).abs() < 1e-9, "cuts {cuts:?}");
    assert_eq!(assign_slices(&engine, &outcome.division).unwrap()[0], 0);
}

#[test]
fn alpha_threshold_is_tighter_for_three_agents() {
    let config = DivisionConfig::default();
    assert!(alpha_threshold(&config, 3) < alpha_threshold(&config, 4));
    assert!((alpha_threshold(&config, 4) - 1e-8 / 12.0).abs() < 1e-20);
}
