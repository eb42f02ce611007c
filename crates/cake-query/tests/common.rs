use cake_core::{Segment, ValuationModel};

pub fn fixture_valuations() -> Vec<ValuationModel> {
    vec![
        ValuationModel::uniform(1.0),
        ValuationModel::new(vec![
            Segment::new(0.0, 0.37, 0.2, 1.0),
            Segment::flat(0.37, 0.5, 0.0),
            Segment::new(0.5, 1.0, 1.0, 0.1),
        ])
        .unwrap(),
        ValuationModel::new(vec![
            Segment::flat(0.0, 0.25, 1.0),
            Segment::flat(0.25, 1.0, 0.0),
        ])
        .unwrap(),
    ]
}
