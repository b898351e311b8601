//! Rate constants of the double-track network.
//!
//! [`RateConstants`] is an immutable value that is passed explicitly into the rate
//! law evaluator and the derivative function. Scenario-specific overrides produce a
//! new value via [`RateConstants::with_overrides`] rather than mutating a shared set.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Regularizer added to every Michaelis–Menten denominator.
pub const MM_EPSILON: f64 = 1e-16;

/// Complete parameter set of the reaction network.
///
/// Binding constants are in μM⁻¹·s⁻¹, extension and catalytic constants in s⁻¹,
/// Michaelis constants in μM.
///
/// # Examples
///
/// ```
/// use tempo_sim::prelude::RateConstantsBuilder;
///
/// let constants = RateConstantsBuilder::default()
///     .k13(1e-3)
///     .build()
///     .unwrap();
///
/// assert_eq!(constants.k13, 1e-3);
/// assert_eq!(constants.k5, 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Builder, Serialize, Deserialize)]
#[builder(default)]
#[serde(default)]
pub struct RateConstants {
    // Probe/template binding
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
    pub k4: f64,
    /// ST·AT cross-annealing
    pub k5: f64,
    pub k6: f64,
    pub k7: f64,
    pub k8: f64,
    pub k9: f64,
    pub k10: f64,
    pub k11: f64,
    /// ST2·AT2 cross-annealing
    pub k12: f64,
    /// Enzyme capture by `D`
    pub k13: f64,
    /// Enzyme capture by `D2`
    pub k14: f64,

    // First-order extension of bound complexes
    pub k1_ext: f64,
    pub k2_ext: f64,
    pub k3_ext: f64,
    pub k4_ext: f64,
    pub k6_ext: f64,
    pub k7_ext: f64,
    pub k9_ext: f64,
    pub k10_ext: f64,

    /// Reporter cleavage by `CD`
    pub kcat1: f64,
    pub km1: f64,
    /// Reporter cleavage by `CD2`
    pub kcat2: f64,
    pub km2: f64,
    /// Probe degradation by `CD`
    pub kcat3: f64,
    pub km3: f64,
    /// Probe degradation by `CD2`
    pub kcat4: f64,
    pub km4: f64,

    pub epsilon: f64,
}

impl Default for RateConstants {
    fn default() -> Self {
        let kcat1 = 0.038;
        let km1 = 3.7;
        let kcat2 = 0.38;
        let km2 = 0.37;

        Self {
            k1: 0.1,
            k2: 0.1,
            k3: 0.1,
            k4: 0.1,
            k5: 1.0,
            k6: 0.08,
            k7: 0.08,
            k8: 0.1,
            k9: 0.1,
            k10: 0.1,
            k11: 0.1,
            k12: 1.0,
            k13: 5e-4,
            k14: 1.0,
            k1_ext: 1.0,
            k2_ext: 1.0,
            k3_ext: 1.0,
            k4_ext: 1.0,
            k6_ext: 1.0,
            k7_ext: 1.0,
            k9_ext: 1.0,
            k10_ext: 1.0,
            kcat1,
            km1,
            kcat2,
            km2,
            kcat3: kcat1 / 2.0,
            km3: km1 * 2.0,
            kcat4: kcat2 / 2.0,
            km4: km2 * 2.0,
            epsilon: MM_EPSILON,
        }
    }
}

/// Per-scenario substitutions for the overridable binding constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateOverrides {
    pub k6: f64,
    pub k7: f64,
    pub k9: Option<f64>,
    pub k10: Option<f64>,
}

impl RateConstants {
    /// Returns a copy with the scenario-specific constants substituted.
    pub fn with_overrides(&self, overrides: &RateOverrides) -> Self {
        Self {
            k6: overrides.k6,
            k7: overrides.k7,
            k9: overrides.k9.unwrap_or(self.k9),
            k10: overrides.k10.unwrap_or(self.k10),
            ..*self
        }
    }

    /// Returns a copy in which the probe-degradation fluxes (V3–V8) vanish.
    ///
    /// Useful to isolate the binding/extension bookkeeping of the probes.
    pub fn without_probe_degradation(&self) -> Self {
        Self {
            kcat3: 0.0,
            kcat4: 0.0,
            ..*self
        }
    }

    /// Named view over every constant, in declaration order.
    pub fn entries(&self) -> [(&'static str, f64); 31] {
        [
            ("k1", self.k1),
            ("k2", self.k2),
            ("k3", self.k3),
            ("k4", self.k4),
            ("k5", self.k5),
            ("k6", self.k6),
            ("k7", self.k7),
            ("k8", self.k8),
            ("k9", self.k9),
            ("k10", self.k10),
            ("k11", self.k11),
            ("k12", self.k12),
            ("k13", self.k13),
            ("k14", self.k14),
            ("k1_ext", self.k1_ext),
            ("k2_ext", self.k2_ext),
            ("k3_ext", self.k3_ext),
            ("k4_ext", self.k4_ext),
            ("k6_ext", self.k6_ext),
            ("k7_ext", self.k7_ext),
            ("k9_ext", self.k9_ext),
            ("k10_ext", self.k10_ext),
            ("kcat1", self.kcat1),
            ("km1", self.km1),
            ("kcat2", self.kcat2),
            ("km2", self.km2),
            ("kcat3", self.kcat3),
            ("km3", self.km3),
            ("kcat4", self.kcat4),
            ("km4", self.km4),
            ("epsilon", self.epsilon),
        ]
    }

    /// Name of the first constant that is negative or not finite.
    pub fn first_invalid(&self) -> Option<&'static str> {
        self.entries()
            .into_iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
            .map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_michaelis_menten_pairs() {
        let constants = RateConstants::default();
        assert_eq!(constants.kcat3, 0.019);
        assert_eq!(constants.km3, 7.4);
        assert_eq!(constants.kcat4, 0.19);
        assert_eq!(constants.km4, 0.74);
        assert_eq!(constants.epsilon, MM_EPSILON);
    }

    #[test]
    fn test_overrides_substitute_only_named_constants() {
        let base = RateConstants::default();
        let overridden = base.with_overrides(&RateOverrides {
            k6: 0.5,
            k7: 0.25,
            k9: None,
            k10: Some(0.3),
        });

        assert_eq!(overridden.k6, 0.5);
        assert_eq!(overridden.k7, 0.25);
        assert_eq!(overridden.k9, base.k9);
        assert_eq!(overridden.k10, 0.3);
        assert_eq!(overridden.k13, base.k13);
        assert_eq!(overridden.kcat2, base.kcat2);
    }

    #[test]
    fn test_builder_falls_back_to_defaults() {
        let constants = RateConstantsBuilder::default().k1(2.0).build().unwrap();
        assert_eq!(constants.k1, 2.0);
        assert_eq!(constants.k14, RateConstants::default().k14);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let constants: RateConstants = serde_json::from_str(r#"{"k13": 0.002}"#).unwrap();
        assert_eq!(constants.k13, 0.002);
        assert_eq!(constants.km1, 3.7);
    }

    #[test]
    fn test_first_invalid() {
        assert_eq!(RateConstants::default().first_invalid(), None);

        let constants = RateConstants {
            km2: -1.0,
            ..Default::default()
        };
        assert_eq!(constants.first_invalid(), Some("km2"));
    }
}
