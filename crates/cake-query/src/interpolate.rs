//! Closed-form interpolation between grid-corner oracle values.
//!
//! A query `[start, end]` with `start` in cell `[a, a+ε]` and `end` in cell
//! `[b, b+ε]` is located by two unit coordinates:
//!
//! * `u = (a + ε - start) / ε`, growing as the start moves left,
//! * `w = (end - b) / ε`, growing as the end moves right.
//!
//! The unit square is split along its diagonal. Each half is an affine patch
//! over three of the four corners, written uniformly as
//! `f = h00 + p * (via - h00) + q * (h11 - via)` where `(p, q, via)` comes from
//! the [`Orientation`] table.

use serde::{Deserialize, Serialize};

/// Hungry oracle values at the four corners of a cell pair.
///
/// The `h` indices read `(u, w)`: `h10` is the interval from the lower grid
/// point of the start cell to the lower grid point of the end cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellCorners {
    /// `H(a + ε, b)`.
    pub h00: f64,
    /// `H(a, b)`.
    pub h10: f64,
    /// `H(a + ε, b + ε)`.
    pub h01: f64,
    /// `H(a, b + ε)`.
    pub h11: f64,
}

/// Which triangle of the unit square a query falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// `u >= w`: the start is further from its cell's upper edge.
    StartDominant,
    /// `w > u`: the end is further from its cell's lower edge.
    EndDominant,
}

/// One of the two unit coordinates of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// The `u` coordinate of the start cell.
    Start,
    /// The `w` coordinate of the end cell.
    End,
}

/// Both orientations, in the order cut inversion tries them.
pub const ORIENTATIONS: [Orientation; 2] = [Orientation::StartDominant, Orientation::EndDominant];

/// Slope of the patch along `p` and along `q`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Coefficients {
    along_p: f64,
    along_q: f64,
}

impl Orientation {
    /// Orientation selected by the coordinates of a query.
    pub fn select(u: f64, w: f64) -> Self {
        if u >= w {
            Orientation::StartDominant
        } else {
            Orientation::EndDominant
        }
    }

    /// Axis that plays the `p` role.
    fn p_axis(self) -> Axis {
        match self {
            Orientation::StartDominant => Axis::Start,
            Orientation::EndDominant => Axis::End,
        }
    }

    fn via(self, corners: &CellCorners) -> f64 {
        match self {
            Orientation::StartDominant => corners.h10,
            Orientation::EndDominant => corners.h01,
        }
    }

    fn coefficients(self, corners: &CellCorners) -> Coefficients {
        let via = self.via(corners);
        Coefficients {
            along_p: via - corners.h00,
            along_q: corners.h11 - via,
        }
    }

    /// Whether `(u, w)` lies in this orientation's triangle, with slack `slack`.
    pub fn admits(self, u: f64, w: f64, slack: f64) -> bool {
        match self {
            Orientation::StartDominant => u + slack >= w,
            Orientation::EndDominant => w + slack >= u,
        }
    }

    fn split(self, u: f64, w: f64) -> (f64, f64) {
        match self.p_axis() {
            Axis::Start => (u, w),
            Axis::End => (w, u),
        }
    }
}

/// Interpolated value at `(u, w)` using the orientation's triangle.
pub fn evaluate_with(corners: &CellCorners, orientation: Orientation, u: f64, w: f64) -> f64 {
    let coefficients = orientation.coefficients(corners);
    let (p, q) = orientation.split(u, w);
    corners.h00 + p * coefficients.along_p + q * coefficients.along_q
}

/// Interpolated value at `(u, w)`, choosing the triangle that contains it.
pub fn evaluate(corners: &CellCorners, u: f64, w: f64) -> f64 {
    evaluate_with(corners, Orientation::select(u, w), u, w)
}

/// Solves the patch for the coordinate on `unknown` given the other coordinate
/// and a target value. Returns `None` when the patch is flat along `unknown`.
pub fn solve(
    corners: &CellCorners,
    orientation: Orientation,
    unknown: Axis,
    known: f64,
    target: f64,
) -> Option<f64> {
    let coefficients = orientation.coefficients(corners);
    let (unknown_slope, known_slope) = if unknown == orientation.p_axis() {
        (coefficients.along_p, coefficients.along_q)
    } else {
        (coefficients.along_q, coefficients.along_p)
    };
    if unknown_slope.abs() < f64::MIN_POSITIVE {
        return None;
    }
    let solved = (target - corners.h00 - known * known_slope) / unknown_slope;
    solved.is_finite().then_some(solved)
}
