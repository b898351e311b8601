//! Scenario Builder
//!
//! A [`Scenario`] describes one assay condition: the initial concentrations of the
//! three probes, the template load and the binding constants that differ between
//! conditions. [`Scenario::prepare`] turns it into a full initial state vector and a
//! resolved [`RateConstants`] value, rejecting physically invalid inputs before any
//! integration starts.
//!
//! Enzyme, reporter and reaction volume are shared by every scenario of a run and
//! live in [`InitialAmounts`].

use std::collections::BTreeMap;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::error::SimulationError;
use crate::network::constants::{RateConstants, RateOverrides};
use crate::species::{Species, N_SPECIES};

/// Avogadro constant in mol⁻¹.
pub const AVOGADRO: f64 = 6.022_140_76e23;

/// Template copies per reaction in the reference assay.
pub const DEFAULT_TEMPLATE_COPIES: f64 = 1200.0;

/// Scenarios of a run, keyed by scenario name.
pub type ScenarioSet = BTreeMap<String, Scenario>;

/// Converts a copy number in `volume_l` litres into a micromolar concentration.
///
/// ```
/// use tempo_sim::prelude::copies_to_micromolar;
///
/// let c = copies_to_micromolar(6.02214076e17, 1.0);
/// assert!((c - 1.0).abs() < 1e-12);
/// ```
pub fn copies_to_micromolar(copies: f64, volume_l: f64) -> f64 {
    copies / (AVOGADRO * volume_l) * 1e6
}

/// Initial load of the first template pool `D`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateAmount {
    /// Copy number in the whole reaction volume
    Copies(f64),
    /// Concentration in μM
    Micromolar(f64),
}

impl TemplateAmount {
    pub fn to_micromolar(self, volume_l: f64) -> f64 {
        match self {
            TemplateAmount::Copies(copies) => copies_to_micromolar(copies, volume_l),
            TemplateAmount::Micromolar(concentration) => concentration,
        }
    }
}

impl Default for TemplateAmount {
    fn default() -> Self {
        TemplateAmount::Copies(DEFAULT_TEMPLATE_COPIES)
    }
}

/// Amounts shared by all scenarios of a run.
///
/// # Fields
///
/// * `enzyme` - Initial free enzyme `C` in μM (default: 0.05)
/// * `reporter` - Initial quenched reporter `R` in μM (default: 0.5)
/// * `volume_l` - Reaction volume in litres, used for copy-number conversion (default: 20 μL)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialAmounts {
    pub enzyme: f64,
    pub reporter: f64,
    pub volume_l: f64,
}

impl Default for InitialAmounts {
    fn default() -> Self {
        Self {
            enzyme: 0.05,
            reporter: 0.5,
            volume_l: 20e-6,
        }
    }
}

/// One assay condition.
///
/// # Examples
///
/// ```
/// use tempo_sim::prelude::*;
///
/// let scenario = ScenarioBuilder::default()
///     .fp0(0.2)
///     .bp0(0.4)
///     .fpp0(0.2)
///     .build()
///     .unwrap();
///
/// let prepared = scenario
///     .prepare("FP/FPP/BP", &RateConstants::default(), &InitialAmounts::default())
///     .unwrap();
///
/// assert_eq!(prepared.y0[Species::Bp.index()], 0.4);
/// assert_eq!(prepared.y0[Species::F.index()], 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(default)]
#[serde(default)]
pub struct Scenario {
    /// Initial forward probe `FP` in μM
    pub fp0: f64,
    /// Initial backward probe `BP` in μM
    pub bp0: f64,
    /// Initial second-track forward probe `FPP` in μM
    pub fpp0: f64,
    pub template: TemplateAmount,
    /// Initial second template pool `D2` in μM
    pub d2_0: f64,
    pub k6: f64,
    pub k7: f64,
    #[builder(setter(strip_option))]
    pub k9: Option<f64>,
    #[builder(setter(strip_option))]
    pub k10: Option<f64>,
}

impl Default for Scenario {
    fn default() -> Self {
        let constants = RateConstants::default();
        Self {
            fp0: 0.0,
            bp0: 0.0,
            fpp0: 0.0,
            template: TemplateAmount::default(),
            d2_0: 0.0,
            k6: constants.k6,
            k7: constants.k7,
            k9: None,
            k10: None,
        }
    }
}

/// Initial state and resolved parameters of a scenario, ready for integration.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedScenario {
    pub name: String,
    pub y0: Vec<f64>,
    pub constants: RateConstants,
}

impl Scenario {
    pub fn overrides(&self) -> RateOverrides {
        RateOverrides {
            k6: self.k6,
            k7: self.k7,
            k9: self.k9,
            k10: self.k10,
        }
    }

    /// Builds the initial state vector and the scenario's parameter set.
    ///
    /// All slots not named by the scenario start at zero.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidScenario`] if any concentration, copy number,
    /// amount or rate constant is negative or not finite.
    pub fn prepare(
        &self,
        name: &str,
        base: &RateConstants,
        amounts: &InitialAmounts,
    ) -> Result<PreparedScenario, SimulationError> {
        let invalid = |reason: String| SimulationError::InvalidScenario {
            scenario: name.to_string(),
            reason,
        };

        if !(amounts.volume_l.is_finite() && amounts.volume_l > 0.0) {
            return Err(invalid(format!(
                "reaction volume must be positive, got {} L",
                amounts.volume_l
            )));
        }

        let d0 = match self.template {
            TemplateAmount::Copies(copies) if !copies.is_finite() || copies < 0.0 => {
                return Err(invalid(format!("template copy number is {copies}")));
            }
            template => template.to_micromolar(amounts.volume_l),
        };

        let initial = [
            (Species::Fp, self.fp0),
            (Species::Bp, self.bp0),
            (Species::Fpp, self.fpp0),
            (Species::D, d0),
            (Species::D2, self.d2_0),
            (Species::C, amounts.enzyme),
            (Species::R, amounts.reporter),
        ];

        let mut y0 = vec![0.0; N_SPECIES];
        for (species, value) in initial {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!(
                    "initial concentration of {species} is {value}"
                )));
            }
            y0[species.index()] = value;
        }

        let constants = base.with_overrides(&self.overrides());
        if let Some(constant) = constants.first_invalid() {
            return Err(invalid(format!(
                "rate constant {constant} must be finite and non-negative"
            )));
        }

        Ok(PreparedScenario {
            name: name.to_string(),
            y0,
            constants,
        })
    }
}

/// The three probe combinations of the reference double-track assay.
pub fn default_scenarios() -> ScenarioSet {
    let scenario = |fp0: f64, bp0: f64, fpp0: f64| Scenario {
        fp0,
        bp0,
        fpp0,
        ..Default::default()
    };

    ScenarioSet::from([
        ("FP/FPP/BP".to_string(), scenario(0.2, 0.4, 0.2)),
        ("FPP/BP".to_string(), scenario(0.0, 0.4, 0.4)),
        ("FP/BP".to_string(), scenario(0.4, 0.4, 0.0)),
    ])
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_copies_to_micromolar() {
        let d0 = copies_to_micromolar(1200.0, 20e-6);
        assert_relative_eq!(d0, 1200.0 / (6.02214076e23 * 20e-6) * 1e6);
        assert_relative_eq!(d0, 9.963e-11, max_relative = 1e-3);
    }

    #[test]
    fn test_prepare_fills_listed_slots_only() {
        let scenario = ScenarioBuilder::default()
            .fp0(0.2)
            .bp0(0.4)
            .fpp0(0.2)
            .d2_0(0.001)
            .build()
            .unwrap();
        let amounts = InitialAmounts::default();
        let prepared = scenario
            .prepare("test", &RateConstants::default(), &amounts)
            .unwrap();

        let expected_d0 = copies_to_micromolar(DEFAULT_TEMPLATE_COPIES, amounts.volume_l);
        for species in Species::ALL {
            let value = prepared.y0[species.index()];
            match species {
                Species::Fp | Species::Fpp => assert_eq!(value, 0.2),
                Species::Bp => assert_eq!(value, 0.4),
                Species::D => assert_eq!(value, expected_d0),
                Species::D2 => assert_eq!(value, 0.001),
                Species::C => assert_eq!(value, 0.05),
                Species::R => assert_eq!(value, 0.5),
                _ => assert_eq!(value, 0.0, "{species} should start empty"),
            }
        }
    }

    #[test]
    fn test_prepare_substitutes_overrides() {
        let scenario = ScenarioBuilder::default()
            .k6(0.2)
            .k7(0.3)
            .k9(0.4)
            .build()
            .unwrap();
        let base = RateConstants::default();
        let prepared = scenario
            .prepare("k", &base, &InitialAmounts::default())
            .unwrap();

        assert_eq!(prepared.constants.k6, 0.2);
        assert_eq!(prepared.constants.k7, 0.3);
        assert_eq!(prepared.constants.k9, 0.4);
        assert_eq!(prepared.constants.k10, base.k10);
    }

    #[test]
    fn test_micromolar_template() {
        let scenario = ScenarioBuilder::default()
            .template(TemplateAmount::Micromolar(1e-3))
            .build()
            .unwrap();
        let prepared = scenario
            .prepare("uM", &RateConstants::default(), &InitialAmounts::default())
            .unwrap();
        assert_eq!(prepared.y0[Species::D.index()], 1e-3);
    }

    #[test]
    fn test_negative_concentration_is_rejected() {
        let scenario = ScenarioBuilder::default().bp0(-0.1).build().unwrap();
        let err = scenario
            .prepare("bad", &RateConstants::default(), &InitialAmounts::default())
            .unwrap_err();

        match err {
            SimulationError::InvalidScenario { scenario, reason } => {
                assert_eq!(scenario, "bad");
                assert!(reason.contains("BP"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        let base = RateConstants::default();
        let amounts = InitialAmounts::default();

        let copies = ScenarioBuilder::default()
            .template(TemplateAmount::Copies(-5.0))
            .build()
            .unwrap();
        assert!(copies.prepare("copies", &base, &amounts).is_err());

        let nan = ScenarioBuilder::default().fp0(f64::NAN).build().unwrap();
        assert!(nan.prepare("nan", &base, &amounts).is_err());

        let rate = ScenarioBuilder::default().k7(-1.0).build().unwrap();
        assert!(rate.prepare("rate", &base, &amounts).is_err());

        let no_volume = InitialAmounts {
            volume_l: 0.0,
            ..Default::default()
        };
        assert!(Scenario::default().prepare("vol", &base, &no_volume).is_err());
    }

    #[test]
    fn test_default_scenarios() {
        let scenarios = default_scenarios();
        assert_eq!(scenarios.len(), 3);

        let fpp_bp = &scenarios["FPP/BP"];
        assert_eq!((fpp_bp.fp0, fpp_bp.bp0, fpp_bp.fpp0), (0.0, 0.4, 0.4));
        assert_eq!(fpp_bp.k6, 0.08);
        assert_eq!(fpp_bp.template, TemplateAmount::Copies(1200.0));
    }

    #[test]
    fn test_scenario_json() {
        let scenario: Scenario =
            serde_json::from_str(r#"{"fp0": 0.2, "template": {"micromolar": 0.001}}"#).unwrap();
        assert_eq!(scenario.fp0, 0.2);
        assert_eq!(scenario.template, TemplateAmount::Micromolar(0.001));
        assert_eq!(scenario.k7, 0.08);
        assert_eq!(scenario.k10, None);
    }
}
