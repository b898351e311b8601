//! Species Index
//!
//! Fixed mapping between the 22 species of the double-track network and their slot
//! in the state vector. The slot order is part of the public contract: state
//! vectors, trajectories and the stoichiometry matrix are all laid out this way.

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::simulation::error::SimulationError;

/// Number of dynamic species in the network.
pub const N_SPECIES: usize = 22;

/// A molecular species tracked by the simulator.
///
/// Concentrations are in micromolar. The discriminant is the slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    /// Free forward probe
    #[serde(rename = "FP")]
    Fp = 0,
    /// Free backward probe
    #[serde(rename = "BP")]
    Bp = 1,
    /// Free forward probe, second track
    #[serde(rename = "FPP")]
    Fpp = 2,
    #[serde(rename = "FP_D")]
    FpD = 3,
    #[serde(rename = "FPP_D")]
    FppD = 4,
    #[serde(rename = "BP_D")]
    BpD = 5,
    #[serde(rename = "BP_ST")]
    BpSt = 6,
    #[serde(rename = "FP_AT")]
    FpAt = 7,
    #[serde(rename = "FPP_AT")]
    FppAt = 8,
    /// Released sense strand, first pool
    #[serde(rename = "ST")]
    St = 9,
    /// Released activator strand, first pool
    #[serde(rename = "AT")]
    At = 10,
    #[serde(rename = "ST2")]
    St2 = 11,
    #[serde(rename = "AT2")]
    At2 = 12,
    /// Template, first pool
    #[serde(rename = "D")]
    D = 13,
    /// Template, second pool
    #[serde(rename = "D2")]
    D2 = 14,
    /// Free catalytic enzyme
    #[serde(rename = "C")]
    C = 15,
    /// Enzyme activated by `D`
    #[serde(rename = "CD")]
    Cd = 16,
    /// Enzyme activated by `D2`
    #[serde(rename = "CD2")]
    Cd2 = 17,
    /// Quenched reporter
    #[serde(rename = "R")]
    R = 18,
    /// Cleaved, fluorescent reporter
    #[serde(rename = "F")]
    F = 19,
    #[serde(rename = "BP_D2")]
    BpD2 = 20,
    #[serde(rename = "FPP_D2")]
    FppD2 = 21,
}

lazy_static::lazy_static! {
    static ref NAME_TO_SPECIES: HashMap<&'static str, Species> =
        Species::ALL.iter().map(|s| (s.name(), *s)).collect();
}

impl Species {
    /// All species in slot order.
    pub const ALL: [Species; N_SPECIES] = [
        Species::Fp,
        Species::Bp,
        Species::Fpp,
        Species::FpD,
        Species::FppD,
        Species::BpD,
        Species::BpSt,
        Species::FpAt,
        Species::FppAt,
        Species::St,
        Species::At,
        Species::St2,
        Species::At2,
        Species::D,
        Species::D2,
        Species::C,
        Species::Cd,
        Species::Cd2,
        Species::R,
        Species::F,
        Species::BpD2,
        Species::FppD2,
    ];

    /// Slot of this species in a state vector.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Canonical name as used in scenario files and output labels.
    pub const fn name(self) -> &'static str {
        match self {
            Species::Fp => "FP",
            Species::Bp => "BP",
            Species::Fpp => "FPP",
            Species::FpD => "FP_D",
            Species::FppD => "FPP_D",
            Species::BpD => "BP_D",
            Species::BpSt => "BP_ST",
            Species::FpAt => "FP_AT",
            Species::FppAt => "FPP_AT",
            Species::St => "ST",
            Species::At => "AT",
            Species::St2 => "ST2",
            Species::At2 => "AT2",
            Species::D => "D",
            Species::D2 => "D2",
            Species::C => "C",
            Species::Cd => "CD",
            Species::Cd2 => "CD2",
            Species::R => "R",
            Species::F => "F",
            Species::BpD2 => "BP_D2",
            Species::FppD2 => "FPP_D2",
        }
    }

    /// Looks up a species by its canonical name.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownSpecies`] if no species carries this name.
    pub fn from_name(name: &str) -> Result<Species, SimulationError> {
        NAME_TO_SPECIES
            .get(name)
            .copied()
            .ok_or_else(|| SimulationError::UnknownSpecies(name.to_string()))
    }

    /// Looks up the species from a slot index.
    pub fn from_index(index: usize) -> Option<Species> {
        Species::ALL.get(index).copied()
    }
}

/// Resolves a species name directly to its state-vector slot.
pub fn index_of(name: &str) -> Result<usize, SimulationError> {
    Species::from_name(name).map(Species::index)
}

/// Species names in slot order, e.g. for labelling output columns.
pub fn names() -> impl Iterator<Item = &'static str> {
    Species::ALL.iter().map(|s| s.name())
}

impl FromStr for Species {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Species::from_name(s)
    }
}

impl Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_slots_are_unique_and_dense() {
        let slots: HashSet<usize> = Species::ALL.iter().map(|s| s.index()).collect();
        assert_eq!(slots.len(), N_SPECIES);
        assert!(slots.iter().all(|&i| i < N_SPECIES));

        for (i, species) in Species::ALL.iter().enumerate() {
            assert_eq!(species.index(), i);
            assert_eq!(Species::from_index(i), Some(*species));
        }
    }

    #[test]
    fn test_name_roundtrip() {
        for species in Species::ALL {
            assert_eq!(Species::from_name(species.name()).unwrap(), species);
            assert_eq!(species.name().parse::<Species>().unwrap(), species);
        }
    }

    #[test]
    fn test_known_slots() {
        assert_eq!(index_of("FP").unwrap(), 0);
        assert_eq!(index_of("F").unwrap(), 19);
        assert_eq!(index_of("BP_D2").unwrap(), 20);
        assert_eq!(index_of("FPP_D2").unwrap(), 21);
    }

    #[test]
    fn test_unknown_species() {
        let err = Species::from_name("XYZ").unwrap_err();
        assert!(matches!(err, SimulationError::UnknownSpecies(name) if name == "XYZ"));
        assert!(index_of("fp").is_err());
    }

    #[test]
    fn test_names_in_slot_order() {
        let names: Vec<&str> = names().collect();
        assert_eq!(names.len(), N_SPECIES);
        assert_eq!(&names[..3], &["FP", "BP", "FPP"]);
        assert_eq!(names[N_SPECIES - 1], "FPP_D2");
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&Species::BpSt).unwrap();
        assert_eq!(json, "\"BP_ST\"");
        let species: Species = serde_json::from_str("\"CD2\"").unwrap();
        assert_eq!(species, Species::Cd2);
    }
}
