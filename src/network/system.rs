//! Derivative Function
//!
//! Assembles the ODE right-hand side `dy/dt = N·v(y)` from the fluxes of
//! [`evaluate_fluxes`] and the stoichiometry table of [`Reaction`].
//!
//! [`derivative`] is a pure function of `(t, y, constants)`. [`ReactionNetwork`]
//! binds it to one parameter set so it can be handed to an integrator, either the
//! crate's own adaptive stepper or any `peroxide` solver through [`ODEProblem`].

use anyhow::bail;
use peroxide::fuga::ODEProblem;
use serde::{Deserialize, Serialize};

use super::constants::RateConstants;
use super::rates::{evaluate_fluxes, Fluxes};
use super::reactions::Reaction;
use crate::species::N_SPECIES;

/// Writes the time derivative of `y` into `dy`.
///
/// The network is autonomous, so `t` does not enter the result. Both slices must
/// hold [`N_SPECIES`] values.
pub fn derivative(_t: f64, y: &[f64], constants: &RateConstants, dy: &mut [f64]) {
    let fluxes = evaluate_fluxes(y, constants);
    apply_stoichiometry(&fluxes, dy);
}

/// Accumulates `N·v` into a zeroed `dy`.
pub fn apply_stoichiometry(fluxes: &Fluxes, dy: &mut [f64]) {
    dy.iter_mut().for_each(|x| *x = 0.0);

    for (reaction, rate) in fluxes.iter() {
        let stoichiometry = reaction.stoichiometry();
        for reactant in stoichiometry.reactants {
            dy[reactant.index()] -= rate;
        }
        for product in stoichiometry.products {
            dy[product.index()] += rate;
        }
    }
}

/// The double-track network bound to a single parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReactionNetwork {
    constants: RateConstants,
}

impl ReactionNetwork {
    pub fn new(constants: RateConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &RateConstants {
        &self.constants
    }

    pub fn num_species(&self) -> usize {
        N_SPECIES
    }

    pub fn fluxes(&self, y: &[f64]) -> Fluxes {
        evaluate_fluxes(y, &self.constants)
    }

    /// Convenience wrapper around [`derivative`] that allocates the output.
    pub fn derivative(&self, t: f64, y: &[f64]) -> Vec<f64> {
        let mut dy = vec![0.0; N_SPECIES];
        derivative(t, y, &self.constants, &mut dy);
        dy
    }

    /// Flux of a single reaction at `y`.
    pub fn flux(&self, reaction: Reaction, y: &[f64]) -> f64 {
        self.fluxes(y)[reaction]
    }
}

impl ODEProblem for ReactionNetwork {
    fn rhs(&self, t: f64, y: &[f64], dy: &mut [f64]) -> anyhow::Result<()> {
        if y.len() != N_SPECIES || dy.len() != N_SPECIES {
            bail!(
                "state has {} entries and derivative {}, expected {}",
                y.len(),
                dy.len(),
                N_SPECIES
            );
        }

        derivative(t, y, &self.constants, dy);
        Ok(())
    }
}
