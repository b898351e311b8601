//! Simulation Error Module
//!
//! This module provides the error type shared by every layer of the simulator.
//!
//! # Key Error Types
//!
//! The [`SimulationError`] enum covers the failure points of a simulation run:
//! - Lookups of species that are not part of the network
//! - Scenarios with physically invalid initial conditions or rate overrides
//! - Simulation setups that cannot describe a time grid
//! - Integrations that could not satisfy the requested tolerances
//!
//! Scenario-level errors are attached to the scenario's entry of a batch result,
//! so a failing scenario never aborts the remaining ones.

use thiserror::Error;

use super::result::Trajectory;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Unknown species '{0}'")]
    UnknownSpecies(String),
    #[error("Invalid scenario '{scenario}': {reason}")]
    InvalidScenario { scenario: String, reason: String },
    #[error("Invalid simulation setup: {0}")]
    InvalidSetup(String),
    #[error("Integration of scenario '{scenario}' failed at t = {time}: {reason}")]
    IntegrationFailure {
        scenario: String,
        /// Last time point the solver reached successfully
        time: f64,
        /// State at `time`
        state: Vec<f64>,
        /// Samples collected before the failure
        partial: Box<Trajectory>,
        reason: String,
    },
}

impl SimulationError {
    /// Name of the scenario this error belongs to, if any.
    pub fn scenario(&self) -> Option<&str> {
        match self {
            SimulationError::InvalidScenario { scenario, .. }
            | SimulationError::IntegrationFailure { scenario, .. } => Some(scenario),
            _ => None,
        }
    }

    /// Partial trajectory of a failed integration.
    pub fn partial_trajectory(&self) -> Option<&Trajectory> {
        match self {
            SimulationError::IntegrationFailure { partial, .. } => Some(&**partial),
            _ => None,
        }
    }
}
