//! Setup module for configuring ODE simulations.
//!
//! This module provides the [`SimulationSetup`] struct and its builder for configuring
//! the numerical integration of a scenario. It handles:
//!
//! - Time horizon (start and end times) and the number of evenly spaced samples
//! - Error tolerance settings (relative and absolute)
//! - Step-size limits and the step budget after which integration is abandoned

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::error::SimulationError;

/// Configuration for numerical integration of the network
///
/// # Fields
///
/// * `t0` - Start time of the simulation in seconds (default: 0.0)
/// * `t1` - End time of the simulation in seconds (default: 3600.0)
/// * `n_points` - Number of evenly spaced output samples including both ends (default: 1001)
/// * `rtol` - Relative tolerance for error control (default: 1e-6)
/// * `atol` - Absolute tolerance for error control (default: 1e-12)
/// * `initial_step` - First trial step; estimated from the problem when `None`
/// * `min_step` - Integration fails once the step size has to drop below this (default: 1e-12)
/// * `max_step` - Upper bound for the step size, unbounded when `None`
/// * `max_steps` - Maximum number of accepted steps over the whole horizon (default: 500000)
///
/// # Examples
///
/// ```
/// use tempo_sim::prelude::SimulationSetupBuilder;
///
/// let setup = SimulationSetupBuilder::default()
///     .t1(600.0)
///     .n_points(61)
///     .rtol(1e-8)
///     .build()
///     .unwrap();
///
/// assert_eq!(setup.time_points().len(), 61);
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSetup {
    #[builder(default = "0.0")]
    pub t0: f64,
    #[builder(default = "3600.0")]
    pub t1: f64,
    #[builder(default = "1001")]
    pub n_points: usize,
    #[builder(default = "1e-6")]
    pub rtol: f64,
    #[builder(default = "1e-12")]
    pub atol: f64,
    #[builder(default, setter(strip_option))]
    pub initial_step: Option<f64>,
    #[builder(default = "1e-12")]
    pub min_step: f64,
    #[builder(default, setter(strip_option))]
    pub max_step: Option<f64>,
    #[builder(default = "500_000")]
    pub max_steps: usize,
}

impl Default for SimulationSetup {
    fn default() -> Self {
        Self {
            t0: 0.0,
            t1: 3600.0,
            n_points: 1001,
            rtol: 1e-6,
            atol: 1e-12,
            initial_step: None,
            min_step: 1e-12,
            max_step: None,
            max_steps: 500_000,
        }
    }
}

impl SimulationSetup {
    /// Checks that the setup describes a usable time grid and tolerances.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let invalid = |reason: String| Err(SimulationError::InvalidSetup(reason));

        if !self.t0.is_finite() || !self.t1.is_finite() {
            return invalid("time span must be finite".into());
        }
        if self.t1 <= self.t0 {
            return invalid(format!("t1 ({}) must exceed t0 ({})", self.t1, self.t0));
        }
        if self.n_points < 2 {
            return invalid(format!("n_points must be >= 2, got {}", self.n_points));
        }
        if !(self.rtol.is_finite() && self.rtol > 0.0) {
            return invalid(format!("rtol must be finite and > 0, got {}", self.rtol));
        }
        if !(self.atol.is_finite() && self.atol > 0.0) {
            return invalid(format!("atol must be finite and > 0, got {}", self.atol));
        }
        if !(self.min_step.is_finite() && self.min_step > 0.0) {
            return invalid(format!("min_step must be finite and > 0, got {}", self.min_step));
        }
        if let Some(max_step) = self.max_step {
            if max_step.is_nan() || max_step < self.min_step {
                return invalid(format!("max_step ({max_step}) is below min_step"));
            }
        }
        if let Some(h0) = self.initial_step {
            if !(h0.is_finite() && h0 > 0.0) {
                return invalid(format!("initial_step must be finite and > 0, got {h0}"));
            }
        }
        if self.max_steps == 0 {
            return invalid("max_steps must be > 0".into());
        }

        Ok(())
    }

    /// Evenly spaced sample times from `t0` to `t1`, both included exactly.
    pub fn time_points(&self) -> Vec<f64> {
        let n = self.n_points.max(2);
        let span = self.t1 - self.t0;
        let last = n - 1;

        (0..n)
            .map(|i| {
                if i == last {
                    self.t1
                } else {
                    self.t0 + span * (i as f64) / (last as f64)
                }
            })
            .collect()
    }

    /// Merges integration settings from another setup into this one
    ///
    /// Tolerances and step controls are taken from `other` while the time
    /// grid (`t0`, `t1`, `n_points`) is preserved.
    pub fn merge(&mut self, other: &SimulationSetup) {
        self.rtol = other.rtol;
        self.atol = other.atol;
        self.initial_step = other.initial_step;
        self.min_step = other.min_step;
        self.max_step = other.max_step;
        self.max_steps = other.max_steps;
    }
}
