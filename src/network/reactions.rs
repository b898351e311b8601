//! Reaction topology of the double-track network.
//!
//! Every flux of the model is a [`Reaction`]. Its [`Stoichiometry`] lists which
//! species it consumes and produces (all coefficients are one) and which species
//! enter its rate law without being consumed (templates and enzymes).
//!
//! The table is the single source of truth for the derivative function: the right
//! hand side is assembled by walking it, so each reaction is balanced against its
//! own listing by construction.

use std::fmt::{self, Display};

use ndarray::Array2;

use crate::species::{Species, N_SPECIES};

/// Number of fluxes in the network.
pub const N_REACTIONS: usize = 30;

/// A single flux of the network, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reaction {
    R1 = 0,
    R1Ext,
    R2,
    R2Ext,
    R3,
    R3Ext,
    R4,
    R4Ext,
    R5,
    R6,
    R6Ext,
    R7,
    R7Ext,
    R8,
    R9,
    R9Ext,
    R10,
    R10Ext,
    R11,
    R12,
    R13,
    R14,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
    V7,
    V8,
}

/// Reactants, products and rate-law modifiers of a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stoichiometry {
    pub reactants: &'static [Species],
    pub products: &'static [Species],
    /// Species that scale the flux but are left unchanged by it
    pub modifiers: &'static [Species],
}

/// Classification used for diagnostics and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKind {
    Binding,
    Extension,
    CrossAnnealing,
    EnzymeCapture,
    ReporterCleavage,
    ProbeDegradation,
}

const fn stoich(
    reactants: &'static [Species],
    products: &'static [Species],
    modifiers: &'static [Species],
) -> Stoichiometry {
    Stoichiometry {
        reactants,
        products,
        modifiers,
    }
}

impl Reaction {
    /// All reactions in flux order.
    pub const ALL: [Reaction; N_REACTIONS] = [
        Reaction::R1,
        Reaction::R1Ext,
        Reaction::R2,
        Reaction::R2Ext,
        Reaction::R3,
        Reaction::R3Ext,
        Reaction::R4,
        Reaction::R4Ext,
        Reaction::R5,
        Reaction::R6,
        Reaction::R6Ext,
        Reaction::R7,
        Reaction::R7Ext,
        Reaction::R8,
        Reaction::R9,
        Reaction::R9Ext,
        Reaction::R10,
        Reaction::R10Ext,
        Reaction::R11,
        Reaction::R12,
        Reaction::R13,
        Reaction::R14,
        Reaction::V1,
        Reaction::V2,
        Reaction::V3,
        Reaction::V4,
        Reaction::V5,
        Reaction::V6,
        Reaction::V7,
        Reaction::V8,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Reaction::R1 => "r1",
            Reaction::R1Ext => "r1e",
            Reaction::R2 => "r2",
            Reaction::R2Ext => "r2e",
            Reaction::R3 => "r3",
            Reaction::R3Ext => "r3e",
            Reaction::R4 => "r4",
            Reaction::R4Ext => "r4e",
            Reaction::R5 => "r5",
            Reaction::R6 => "r6",
            Reaction::R6Ext => "r6e",
            Reaction::R7 => "r7",
            Reaction::R7Ext => "r7e",
            Reaction::R8 => "r8",
            Reaction::R9 => "r9",
            Reaction::R9Ext => "r9e",
            Reaction::R10 => "r10",
            Reaction::R10Ext => "r10e",
            Reaction::R11 => "r11",
            Reaction::R12 => "r12",
            Reaction::R13 => "r13",
            Reaction::R14 => "r14",
            Reaction::V1 => "V1",
            Reaction::V2 => "V2",
            Reaction::V3 => "V3",
            Reaction::V4 => "V4",
            Reaction::V5 => "V5",
            Reaction::V6 => "V6",
            Reaction::V7 => "V7",
            Reaction::V8 => "V8",
        }
    }

    pub const fn kind(self) -> ReactionKind {
        use Reaction::*;

        match self {
            R1 | R2 | R3 | R4 | R6 | R7 | R8 | R9 | R10 | R11 => ReactionKind::Binding,
            R1Ext | R2Ext | R3Ext | R4Ext | R6Ext | R7Ext | R9Ext | R10Ext => {
                ReactionKind::Extension
            }
            R5 | R12 => ReactionKind::CrossAnnealing,
            R13 | R14 => ReactionKind::EnzymeCapture,
            V1 | V2 => ReactionKind::ReporterCleavage,
            V3 | V4 | V5 | V6 | V7 | V8 => ReactionKind::ProbeDegradation,
        }
    }

    /// Species consumed, produced and merely involved by this reaction.
    pub const fn stoichiometry(self) -> Stoichiometry {
        use Species::*;

        match self {
            Reaction::R1 => stoich(&[Fp, D], &[FpD], &[]),
            Reaction::R1Ext => stoich(&[FpD], &[St, D], &[]),
            Reaction::R2 => stoich(&[Bp], &[BpD], &[D]),
            Reaction::R2Ext => stoich(&[BpD], &[At], &[]),
            Reaction::R3 => stoich(&[Bp, St], &[BpSt], &[]),
            Reaction::R3Ext => stoich(&[BpSt], &[D], &[]),
            Reaction::R4 => stoich(&[Fp, At], &[FpAt], &[]),
            Reaction::R4Ext => stoich(&[FpAt], &[D], &[]),
            Reaction::R5 => stoich(&[St, At], &[D], &[]),
            Reaction::R6 => stoich(&[Fpp, D], &[FppD], &[]),
            Reaction::R6Ext => stoich(&[FppD], &[St2, D], &[]),
            Reaction::R7 => stoich(&[Fpp], &[FppAt], &[At]),
            Reaction::R7Ext => stoich(&[FppAt], &[St2], &[]),
            Reaction::R8 => stoich(&[Bp, St2], &[D2], &[]),
            Reaction::R9 => stoich(&[Bp, D2], &[BpD2], &[]),
            Reaction::R9Ext => stoich(&[BpD2], &[At2, D2], &[]),
            Reaction::R10 => stoich(&[Fpp, D2], &[FppD2], &[]),
            Reaction::R10Ext => stoich(&[FppD2], &[St2, D2], &[]),
            Reaction::R11 => stoich(&[Fpp, At2], &[D2], &[]),
            Reaction::R12 => stoich(&[St2, At2], &[D2], &[]),
            Reaction::R13 => stoich(&[C, D], &[Cd], &[]),
            Reaction::R14 => stoich(&[C, D2], &[Cd2], &[]),
            Reaction::V1 => stoich(&[R], &[F], &[Cd]),
            Reaction::V2 => stoich(&[R], &[F], &[Cd2]),
            Reaction::V3 => stoich(&[Fp], &[], &[Cd]),
            Reaction::V4 => stoich(&[Bp], &[], &[Cd]),
            Reaction::V5 => stoich(&[Fpp], &[], &[Cd]),
            Reaction::V6 => stoich(&[Fp], &[], &[Cd2]),
            Reaction::V7 => stoich(&[Bp], &[], &[Cd2]),
            Reaction::V8 => stoich(&[Fpp], &[], &[Cd2]),
        }
    }

    /// Net stoichiometric coefficient of `species` in this reaction.
    pub fn coefficient(self, species: Species) -> f64 {
        let stoichiometry = self.stoichiometry();
        let consumed = stoichiometry
            .reactants
            .iter()
            .filter(|&&s| s == species)
            .count();
        let produced = stoichiometry
            .products
            .iter()
            .filter(|&&s| s == species)
            .count();

        produced as f64 - consumed as f64
    }
}

impl Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stoichiometry = self.stoichiometry();
        let side = |species: &[Species]| {
            if species.is_empty() {
                "∅".to_string()
            } else {
                species
                    .iter()
                    .map(|s| s.name())
                    .collect::<Vec<_>>()
                    .join(" + ")
            }
        };

        write!(
            f,
            "{}: {} -> {}",
            self.name(),
            side(stoichiometry.reactants),
            side(stoichiometry.products)
        )
    }
}

/// Derives the stoichiometry matrix of the network.
///
/// Rows are species in slot order, columns are reactions in flux order. Negative
/// entries mark consumption, positive entries production. Modifiers do not appear.
pub fn stoichiometry_matrix() -> Array2<f64> {
    let mut matrix = Array2::zeros((N_SPECIES, N_REACTIONS));

    for reaction in Reaction::ALL {
        let stoichiometry = reaction.stoichiometry();
        for reactant in stoichiometry.reactants {
            matrix[(reactant.index(), reaction.index())] -= 1.0;
        }
        for product in stoichiometry.products {
            matrix[(product.index(), reaction.index())] += 1.0;
        }
    }

    matrix
}
