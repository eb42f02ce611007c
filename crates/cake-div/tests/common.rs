#![allow(dead_code)]

use cake_core::{Segment, ValuationModel};
use cake_div::DivisionRequest;

pub fn uniform() -> ValuationModel {
    ValuationModel::uniform(1.0)
}

/// Density 1 on `[low, high]`, `background` elsewhere.
pub fn plateau(low: f64, high: f64, background: f64) -> ValuationModel {
    ValuationModel::new(vec![
        Segment::flat(0.0, low, background),
        Segment::flat(low, high, 1.0),
        Segment::flat(high, 1.0, background),
    ])
    .unwrap()
}

pub fn lopsided() -> ValuationModel {
    ValuationModel::new(vec![
        Segment::new(0.0, 0.5, 0.2, 1.0),
        Segment::flat(0.5, 1.0, 0.3),
    ])
    .unwrap()
}

pub fn flat_request(cake_size: f64, densities: &[f64]) -> DivisionRequest {
    DivisionRequest {
        preferences: densities
            .iter()
            .map(|&density| vec![Segment::flat(0.0, cake_size, density)])
            .collect(),
        cake_size,
    }
}
