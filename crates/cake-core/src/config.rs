use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CakeError, ErrorInfo};

/// YAML-configurable constants of the division protocol.
///
/// The values are fixed for the lifetime of a request and never mutated by the
/// solvers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionConfig {
    /// Oracle grid resolution. Rounded so that `1 / epsilon` is an integer.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Hard cap on halvings when locating a grid cell.
    #[serde(default = "default_cut_iteration_cap")]
    pub cut_iteration_cap: usize,
    /// Bracket width at which fixed-point searches stop.
    #[serde(default = "default_fixed_point_tolerance")]
    pub fixed_point_tolerance: f64,
    /// Iteration cap for fixed-point searches.
    #[serde(default = "default_fixed_point_iteration_cap")]
    pub fixed_point_iteration_cap: usize,
    /// Agreement required between an inverted cut and a re-evaluated value query.
    #[serde(default = "default_consistency_tolerance")]
    pub consistency_tolerance: f64,
    /// Iteration cap for the outer alpha bisection.
    #[serde(default = "default_alpha_iteration_cap")]
    pub alpha_iteration_cap: usize,
    /// Largest density allowed after normalization.
    #[serde(default = "default_normalization_cap")]
    pub normalization_cap: f64,
}

fn default_epsilon() -> f64 {
    0.01
}

fn default_cut_iteration_cap() -> usize {
    52
}

fn default_fixed_point_tolerance() -> f64 {
    1e-15
}

fn default_fixed_point_iteration_cap() -> usize {
    200
}

fn default_consistency_tolerance() -> f64 {
    1e-10
}

fn default_alpha_iteration_cap() -> usize {
    200
}

fn default_normalization_cap() -> f64 {
    1.0
}

impl Default for DivisionConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            cut_iteration_cap: default_cut_iteration_cap(),
            fixed_point_tolerance: default_fixed_point_tolerance(),
            fixed_point_iteration_cap: default_fixed_point_iteration_cap(),
            consistency_tolerance: default_consistency_tolerance(),
            alpha_iteration_cap: default_alpha_iteration_cap(),
            normalization_cap: default_normalization_cap(),
        }
    }
}

impl DivisionConfig {
    /// Configuration with a custom grid resolution and default everything else.
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self {
            epsilon,
            ..Self::default()
        }
    }

    /// Number of grid cells covering `[0, 1]`.
    pub fn grid_cells(&self) -> usize {
        ((1.0 / self.epsilon).round() as usize).max(1)
    }

    /// Grid resolution after rounding to an integral number of cells.
    pub fn grid_epsilon(&self) -> f64 {
        1.0 / self.grid_cells() as f64
    }

    /// Preference tolerance `ε / 12` used by certification and assignment.
    pub fn preference_tolerance(&self) -> f64 {
        self.grid_epsilon() / 12.0
    }

    /// Checks that every constant lies in its admissible range.
    pub fn validate(&self) -> Result<(), CakeError> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0 && self.epsilon <= 0.5) {
            return Err(CakeError::Config(
                ErrorInfo::new("epsilon-range", "epsilon must lie in (0, 0.5]")
                    .with_context("epsilon", self.epsilon),
            ));
        }
        if self.cut_iteration_cap == 0
            || self.fixed_point_iteration_cap == 0
            || self.alpha_iteration_cap == 0
        {
            return Err(CakeError::config(
                "iteration-cap",
                "iteration caps must be positive",
            ));
        }
        if !(self.fixed_point_tolerance > 0.0 && self.consistency_tolerance > 0.0) {
            return Err(CakeError::config(
                "tolerance-range",
                "tolerances must be positive",
            ));
        }
        if !(self.normalization_cap.is_finite() && self.normalization_cap > 0.0) {
            return Err(CakeError::Config(
                ErrorInfo::new("normalization-cap", "normalization cap must be positive")
                    .with_context("normalization_cap", self.normalization_cap),
            ));
        }
        Ok(())
    }

    /// Parses and validates a YAML configuration.
    pub fn from_yaml_str(data: &str) -> Result<Self, CakeError> {
        let config: Self =
            serde_yaml::from_str(data).map_err(|err| CakeError::serde("yaml_deserialize", err))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, CakeError> {
        let data = fs::read_to_string(path).map_err(|err| {
            CakeError::Config(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        Self::from_yaml_str(&data)
    }
}
