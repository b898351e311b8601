//! Integrator Driver
//!
//! [`Simulator`] integrates scenarios of the double-track network over the time
//! grid of a [`SimulationSetup`]. Each scenario is prepared, integrated to
//! completion and returned as a [`Trajectory`]; failures are attached to the
//! scenario they belong to so a batch always yields one entry per scenario.
//!
//! With the `parallel` feature, [`Simulator::par_simulate_batch`] spreads the
//! independent scenarios of a batch over the rayon thread pool.

use std::collections::BTreeMap;

use derive_builder::Builder;
use log::{debug, info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::SimulationError;
use super::result::Trajectory;
use super::scenario::{InitialAmounts, PreparedScenario, Scenario, ScenarioSet};
use super::setup::SimulationSetup;
use super::stepper::DormandPrince;
use crate::network::constants::RateConstants;
use crate::network::system::ReactionNetwork;

/// Outcome of every scenario of a batch, keyed by scenario name.
pub type BatchResult = BTreeMap<String, Result<Trajectory, SimulationError>>;

/// Global configuration shared by all scenarios of a run.
///
/// # Examples
///
/// ```
/// use tempo_sim::prelude::*;
///
/// let simulator = SimulatorBuilder::default()
///     .setup(SimulationSetupBuilder::default().t1(60.0).n_points(7).build().unwrap())
///     .build()
///     .unwrap();
///
/// let results = simulator.simulate_batch(&default_scenarios());
/// assert_eq!(results.len(), 3);
/// assert!(results.values().all(|r| r.is_ok()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Builder, Serialize, Deserialize)]
#[builder(default)]
#[serde(default)]
pub struct Simulator {
    pub constants: RateConstants,
    pub amounts: InitialAmounts,
    pub setup: SimulationSetup,
}

impl Simulator {
    pub fn new(constants: RateConstants, amounts: InitialAmounts, setup: SimulationSetup) -> Self {
        Self {
            constants,
            amounts,
            setup,
        }
    }

    /// Prepares and integrates a single scenario.
    ///
    /// # Errors
    ///
    /// * [`SimulationError::InvalidSetup`] if the time grid or tolerances are unusable
    /// * [`SimulationError::InvalidScenario`] if the scenario is physically invalid
    /// * [`SimulationError::IntegrationFailure`] if the solver stops before `t1`
    pub fn simulate(&self, name: &str, scenario: &Scenario) -> Result<Trajectory, SimulationError> {
        self.setup.validate()?;
        let prepared = scenario.prepare(name, &self.constants, &self.amounts)?;
        self.integrate(&prepared)
    }

    /// Integrates an already prepared scenario over the configured time grid.
    pub fn integrate(&self, prepared: &PreparedScenario) -> Result<Trajectory, SimulationError> {
        self.setup.validate()?;

        let network = ReactionNetwork::new(prepared.constants);
        let stepper = DormandPrince::from(&self.setup);
        let times = self.setup.time_points();

        info!(
            "Integrating scenario '{}' over [{}, {}] with {} samples",
            prepared.name, self.setup.t0, self.setup.t1, self.setup.n_points
        );

        match stepper.integrate(&network, &prepared.y0, &times) {
            Ok(output) => {
                debug!(
                    "Scenario '{}' finished: {} accepted, {} rejected steps",
                    prepared.name, output.statistics.accepted, output.statistics.rejected
                );
                Ok(output.into())
            }
            Err(interrupted) => {
                let interrupted = *interrupted;
                Err(SimulationError::IntegrationFailure {
                    scenario: prepared.name.clone(),
                    time: interrupted.time,
                    state: interrupted.state,
                    partial: Box::new(interrupted.output.into()),
                    reason: interrupted.reason.to_string(),
                })
            }
        }
    }

    /// Integrates every scenario one after another.
    pub fn simulate_batch(&self, scenarios: &ScenarioSet) -> BatchResult {
        scenarios
            .iter()
            .map(|(name, scenario)| (name.clone(), self.simulate_logged(name, scenario)))
            .collect()
    }

    /// Integrates the scenarios of a batch concurrently.
    ///
    /// Scenarios share no mutable state, so the result is identical to
    /// [`Simulator::simulate_batch`].
    #[cfg(feature = "parallel")]
    pub fn par_simulate_batch(&self, scenarios: &ScenarioSet) -> BatchResult {
        scenarios
            .par_iter()
            .map(|(name, scenario)| (name.clone(), self.simulate_logged(name, scenario)))
            .collect()
    }

    fn simulate_logged(&self, name: &str, scenario: &Scenario) -> Result<Trajectory, SimulationError> {
        let result = self.simulate(name, scenario);
        if let Err(e) = &result {
            warn!("{e}");
        }
        result
    }
}
