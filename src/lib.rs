//! TEMPO Double-Track Amplification Simulator
//!
//! This library models the TEMPO isothermal amplification chemistry as a
//! 22-species, 30-reaction ODE network and integrates it for a set of assay
//! scenarios. It provides:
//! - The species catalogue and the reaction network with its rate constants
//! - A scenario builder turning primer/template loads into initial states
//! - An adaptive Dormand-Prince integrator with mixed tolerance control
//! - A reporter extracting the fluorescent signal `F` from trajectories
//! - JSON configuration loading and saving

#![warn(unused_imports)]

/// Commonly used types and functionality re-exported for convenience
pub mod prelude {
    pub use crate::io::*;
    pub use crate::network::constants::*;
    pub use crate::network::rates::*;
    pub use crate::network::reactions::*;
    pub use crate::network::system::*;
    pub use crate::report::*;
    pub use crate::simulation::error::*;
    pub use crate::simulation::result::*;
    pub use crate::simulation::runner::*;
    pub use crate::simulation::scenario::*;
    pub use crate::simulation::setup::*;
    pub use crate::species::*;
}

/// Species catalogue and slot order of the state vector
pub mod species;

/// Reaction network of the double-track amplification
pub mod network {
    /// Rate constants and per-scenario overrides
    pub mod constants;
    /// Mass-action and Michaelis-Menten flux evaluation
    pub mod rates;
    /// Reaction catalogue and stoichiometry
    pub mod reactions;
    /// Right-hand side of the ODE system
    pub mod system;
}

/// Scenario preparation and numerical integration
pub mod simulation {
    pub use crate::simulation::setup::SimulationSetup;

    /// Error types for simulation failures
    pub mod error;
    /// Simulation result data structures
    pub mod result;
    /// Scenario driver and batch execution
    pub mod runner;
    /// Assay scenarios and initial state construction
    pub mod scenario;
    /// Simulation setup and configuration
    pub mod setup;
    /// Adaptive Runge-Kutta stepper
    pub mod stepper;
}

/// Observable extraction and run summaries
pub mod report;

/// Reading and writing configuration and result files
pub mod io;
