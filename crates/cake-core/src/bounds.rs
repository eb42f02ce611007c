use serde::{Deserialize, Serialize};

/// Search bracket `[lower, upper]`.
///
/// Update steps return a new bracket; a search loop owns its bracket and
/// rebinds it on every iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower end of the bracket.
    pub lower: f64,
    /// Upper end of the bracket.
    pub upper: f64,
}

impl Bounds {
    /// Creates a bracket, swapping the ends if they arrive reversed.
    pub fn new(lower: f64, upper: f64) -> Self {
        if lower <= upper {
            Self { lower, upper }
        } else {
            Self {
                lower: upper,
                upper: lower,
            }
        }
    }

    /// Midpoint of the bracket.
    pub fn midpoint(&self) -> f64 {
        self.lower + (self.upper - self.lower) / 2.0
    }

    /// Width of the bracket.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Bracket with its lower end moved up to `value`.
    #[must_use]
    pub fn raise_lower(self, value: f64) -> Self {
        Self::new(value, self.upper)
    }

    /// Bracket with its upper end moved down to `value`.
    #[must_use]
    pub fn drop_upper(self, value: f64) -> Self {
        Self::new(self.lower, value)
    }

    /// True once the midpoint can no longer be distinguished from either end.
    pub fn is_stalled(&self) -> bool {
        let mid = self.midpoint();
        mid <= self.lower || mid >= self.upper
    }
}
