//! Rate Law Evaluator
//!
//! Computes every flux of the network from a state vector and a parameter set.
//! Binding, annealing and capture fluxes follow mass-action kinetics, extensions are
//! first order in the bound complex, and the eight catalytic fluxes are
//! Michaelis–Menten terms whose denominators carry the regularizer
//! [`RateConstants::epsilon`].
//!
//! Evaluation is pure and total: negative or NaN concentrations simply propagate
//! into the fluxes. Keeping the state physical is the integrator's job.

use std::ops::Index;

use super::constants::RateConstants;
use super::reactions::{Reaction, N_REACTIONS};
use crate::species::Species;

/// Instantaneous fluxes, indexed by [`Reaction`]. Units are μM·s⁻¹.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fluxes([f64; N_REACTIONS]);

impl Fluxes {
    /// Wraps raw flux values given in flux order.
    pub fn from_raw(values: [f64; N_REACTIONS]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Pairs of reaction and flux value in flux order.
    pub fn iter(&self) -> impl Iterator<Item = (Reaction, f64)> + '_ {
        Reaction::ALL.iter().copied().zip(self.0.iter().copied())
    }
}

impl Index<Reaction> for Fluxes {
    type Output = f64;

    fn index(&self, reaction: Reaction) -> &Self::Output {
        &self.0[reaction.index()]
    }
}

/// Michaelis–Menten flux `kcat·E·S / (Km + S + ε)`.
#[inline]
pub fn michaelis_menten(kcat: f64, km: f64, enzyme: f64, substrate: f64, epsilon: f64) -> f64 {
    kcat * enzyme * substrate / (km + substrate + epsilon)
}

/// Evaluates all 30 fluxes at `y`.
///
/// `y` must hold at least one value per species in slot order.
pub fn evaluate_fluxes(y: &[f64], p: &RateConstants) -> Fluxes {
    let c = |species: Species| y[species.index()];

    let (fp, bp, fpp) = (c(Species::Fp), c(Species::Bp), c(Species::Fpp));
    let (st, at, st2, at2) = (c(Species::St), c(Species::At), c(Species::St2), c(Species::At2));
    let (d, d2) = (c(Species::D), c(Species::D2));
    let (enzyme, cd, cd2) = (c(Species::C), c(Species::Cd), c(Species::Cd2));
    let reporter = c(Species::R);
    let eps = p.epsilon;

    let mut v = [0.0; N_REACTIONS];
    let mut set = |reaction: Reaction, value: f64| v[reaction.index()] = value;

    set(Reaction::R1, p.k1 * fp * d);
    set(Reaction::R1Ext, p.k1_ext * c(Species::FpD));
    set(Reaction::R2, p.k2 * bp * d);
    set(Reaction::R2Ext, p.k2_ext * c(Species::BpD));
    set(Reaction::R3, p.k3 * bp * st);
    set(Reaction::R3Ext, p.k3_ext * c(Species::BpSt));
    set(Reaction::R4, p.k4 * fp * at);
    set(Reaction::R4Ext, p.k4_ext * c(Species::FpAt));
    set(Reaction::R5, p.k5 * st * at);
    set(Reaction::R6, p.k6 * fpp * d);
    set(Reaction::R6Ext, p.k6_ext * c(Species::FppD));
    set(Reaction::R7, p.k7 * fpp * at);
    set(Reaction::R7Ext, p.k7_ext * c(Species::FppAt));
    set(Reaction::R8, p.k8 * bp * st2);
    set(Reaction::R9, p.k9 * bp * d2);
    set(Reaction::R9Ext, p.k9_ext * c(Species::BpD2));
    set(Reaction::R10, p.k10 * fpp * d2);
    set(Reaction::R10Ext, p.k10_ext * c(Species::FppD2));
    set(Reaction::R11, p.k11 * fpp * at2);
    set(Reaction::R12, p.k12 * st2 * at2);
    set(Reaction::R13, p.k13 * enzyme * d);
    set(Reaction::R14, p.k14 * enzyme * d2);

    set(Reaction::V1, michaelis_menten(p.kcat1, p.km1, cd, reporter, eps));
    set(Reaction::V2, michaelis_menten(p.kcat2, p.km2, cd2, reporter, eps));
    set(Reaction::V3, michaelis_menten(p.kcat3, p.km3, cd, fp, eps));
    set(Reaction::V4, michaelis_menten(p.kcat3, p.km3, cd, bp, eps));
    set(Reaction::V5, michaelis_menten(p.kcat3, p.km3, cd, fpp, eps));
    set(Reaction::V6, michaelis_menten(p.kcat4, p.km4, cd2, fp, eps));
    set(Reaction::V7, michaelis_menten(p.kcat4, p.km4, cd2, bp, eps));
    set(Reaction::V8, michaelis_menten(p.kcat4, p.km4, cd2, fpp, eps));

    Fluxes(v)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::species::N_SPECIES;

    fn state(values: &[(Species, f64)]) -> Vec<f64> {
        let mut y = vec![0.0; N_SPECIES];
        for (species, value) in values {
            y[species.index()] = *value;
        }
        y
    }

    #[test]
    fn test_mass_action_fluxes() {
        let p = RateConstants::default();
        let y = state(&[
            (Species::Fp, 0.2),
            (Species::Bp, 0.4),
            (Species::D, 0.01),
            (Species::St, 0.05),
            (Species::At, 0.03),
            (Species::FpD, 0.002),
        ]);

        let v = evaluate_fluxes(&y, &p);
        assert_relative_eq!(v[Reaction::R1], 0.1 * 0.2 * 0.01);
        assert_relative_eq!(v[Reaction::R1Ext], 0.002);
        assert_relative_eq!(v[Reaction::R2], 0.1 * 0.4 * 0.01);
        assert_relative_eq!(v[Reaction::R3], 0.1 * 0.4 * 0.05);
        assert_relative_eq!(v[Reaction::R5], 1.0 * 0.05 * 0.03);
        assert_eq!(v[Reaction::R6], 0.0);
    }

    #[test]
    fn test_michaelis_menten_fluxes() {
        let p = RateConstants::default();
        let y = state(&[
            (Species::Cd, 0.01),
            (Species::Cd2, 0.02),
            (Species::R, 0.5),
            (Species::Bp, 0.4),
        ]);

        let v = evaluate_fluxes(&y, &p);
        assert_relative_eq!(v[Reaction::V1], 0.038 * 0.01 * 0.5 / (3.7 + 0.5));
        assert_relative_eq!(v[Reaction::V2], 0.38 * 0.02 * 0.5 / (0.37 + 0.5));
        assert_relative_eq!(v[Reaction::V4], 0.019 * 0.01 * 0.4 / (7.4 + 0.4));
        assert_relative_eq!(v[Reaction::V7], 0.19 * 0.02 * 0.4 / (0.74 + 0.4));
        assert_eq!(v[Reaction::V3], 0.0);
    }

    #[test]
    fn test_epsilon_guards_vanishing_denominator() {
        let p = RateConstants {
            km1: 0.0,
            ..Default::default()
        };
        let y = state(&[(Species::Cd, 0.0)]);

        let v = evaluate_fluxes(&y, &p);
        assert_eq!(v[Reaction::V1], 0.0);
        assert!(v.as_slice().iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_epsilon_does_not_bias_relevant_concentrations() {
        let exact = 0.38 * 1e-6 * 1e-6 / (0.37 + 1e-6);
        let regularized = michaelis_menten(0.38, 0.37, 1e-6, 1e-6, 1e-16);
        assert_relative_eq!(exact, regularized, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_inputs_propagate_without_panicking() {
        let p = RateConstants::default();
        let mut y = state(&[(Species::Fp, -0.1), (Species::D, 0.5)]);
        y[Species::R.index()] = f64::NAN;
        y[Species::Cd.index()] = 1.0;

        let v = evaluate_fluxes(&y, &p);
        assert!(v[Reaction::R1] < 0.0);
        assert!(v[Reaction::V1].is_nan());
    }
}
