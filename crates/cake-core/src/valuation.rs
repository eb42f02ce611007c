//! Piecewise-linear valuation densities.

use serde::{Deserialize, Serialize};

use crate::errors::{CakeError, ErrorInfo};

const CONTIGUITY_TOLERANCE: f64 = 1e-9;

/// One linear piece of an agent's valuation density.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Left end of the piece.
    pub start: f64,
    /// Right end of the piece.
    pub end: f64,
    /// Density at `start`.
    #[serde(alias = "startValue")]
    pub start_value: f64,
    /// Density at `end`.
    #[serde(alias = "endValue")]
    pub end_value: f64,
}

impl Segment {
    /// Creates a segment with a linearly varying density.
    pub fn new(start: f64, end: f64, start_value: f64, end_value: f64) -> Self {
        Self {
            start,
            end,
            start_value,
            end_value,
        }
    }

    /// Creates a segment with constant density.
    pub fn flat(start: f64, end: f64, value: f64) -> Self {
        Self::new(start, end, value, value)
    }

    /// Density at `x`, linearly interpolated between the endpoint values.
    pub fn density_at(&self, x: f64) -> f64 {
        let width = self.end - self.start;
        if width <= 0.0 {
            return self.start_value;
        }
        let t = ((x - self.start) / width).clamp(0.0, 1.0);
        self.start_value + (self.end_value - self.start_value) * t
    }

    /// Trapezoidal area of the density over `[from, to] ∩ [start, end]`.
    pub fn area(&self, from: f64, to: f64) -> f64 {
        let lo = from.max(self.start);
        let hi = to.min(self.end);
        if hi <= lo {
            return 0.0;
        }
        (hi - lo) * (self.density_at(lo) + self.density_at(hi)) / 2.0
    }
}

/// Ordered, contiguous segments describing one agent's valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationModel {
    segments: Vec<Segment>,
}

impl ValuationModel {
    /// Builds a model, checking that the segments are well formed and contiguous.
    pub fn new(segments: Vec<Segment>) -> Result<Self, CakeError> {
        if segments.is_empty() {
            return Err(CakeError::Input(ErrorInfo::new(
                "empty-valuation",
                "a valuation needs at least one segment",
            )));
        }
        for (idx, segment) in segments.iter().enumerate() {
            let finite = [
                segment.start,
                segment.end,
                segment.start_value,
                segment.end_value,
            ]
            .iter()
            .all(|value| value.is_finite());
            if !finite {
                return Err(CakeError::Input(
                    ErrorInfo::new("non-finite-segment", "segment fields must be finite")
                        .with_context("segment", idx),
                ));
            }
            if segment.start >= segment.end {
                return Err(CakeError::Input(
                    ErrorInfo::new("empty-segment", "segment start must precede its end")
                        .with_context("segment", idx)
                        .with_context("start", segment.start)
                        .with_context("end", segment.end),
                ));
            }
            if segment.start_value < 0.0 || segment.end_value < 0.0 {
                return Err(CakeError::Input(
                    ErrorInfo::new("negative-density", "densities must be non-negative")
                        .with_context("segment", idx),
                ));
            }
        }
        for (idx, pair) in segments.windows(2).enumerate() {
            if (pair[1].start - pair[0].end).abs() > CONTIGUITY_TOLERANCE {
                return Err(CakeError::Input(
                    ErrorInfo::new("segment-gap", "segments must be contiguous")
                        .with_context("segment", idx + 1)
                        .with_context("expected_start", pair[0].end)
                        .with_context("start", pair[1].start)
                        .with_hint("fill gaps with zero-valued segments"),
                ));
            }
        }
        Ok(Self { segments })
    }

    /// Uniform density `value` over `[0, 1]`.
    pub fn uniform(value: f64) -> Self {
        Self {
            segments: vec![Segment::flat(0.0, 1.0, value)],
        }
    }

    /// Returns the segments in positional order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Left end of the first segment.
    pub fn start(&self) -> f64 {
        self.segments[0].start
    }

    /// Right end of the last segment.
    pub fn end(&self) -> f64 {
        self.segments[self.segments.len() - 1].end
    }

    /// Density at `x`; zero outside the covered range.
    pub fn density_at(&self, x: f64) -> f64 {
        self.segments
            .iter()
            .find(|segment| segment.start <= x && x <= segment.end)
            .map(|segment| segment.density_at(x))
            .unwrap_or(0.0)
    }

    /// Exact value of `[start, end]`: trapezoidal area under the density.
    ///
    /// Returns zero when `end <= start`.
    pub fn integrate(&self, start: f64, end: f64) -> f64 {
        if end <= start {
            return 0.0;
        }
        self.segments
            .iter()
            .skip_while(|segment| segment.end <= start)
            .take_while(|segment| segment.start < end)
            .map(|segment| segment.area(start, end))
            .sum()
    }

    /// Value of the whole covered range.
    pub fn total(&self) -> f64 {
        self.integrate(self.start(), self.end())
    }

    /// Largest density value over all segments.
    pub fn max_density(&self) -> f64 {
        self.segments
            .iter()
            .map(|segment| segment.start_value.max(segment.end_value))
            .fold(0.0, f64::max)
    }

    /// Rescales positions by `1 / position_scale` and densities by `1 / value_scale`.
    pub fn rescaled(&self, position_scale: f64, value_scale: f64) -> Self {
        let segments = self
            .segments
            .iter()
            .map(|segment| Segment {
                start: segment.start / position_scale,
                end: segment.end / position_scale,
                start_value: segment.start_value / value_scale,
                end_value: segment.end_value / value_scale,
            })
            .collect();
        Self { segments }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_area_matches_closed_form() {
        let model = ValuationModel::new(vec![Segment::new(0.0, 1.0, 0.0, 1.0)]).unwrap();
        assert!((model.integrate(0.0, 0.5) - 0.125).abs() < 1e-12);
        assert!((model.total() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn reversed_interval_is_empty() {
        let model = ValuationModel::uniform(1.0);
        assert_eq!(model.integrate(0.7, 0.2), 0.0);
    }
}
