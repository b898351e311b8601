//! Simulation Result Module
//!
//! [`Trajectory`] holds the sampled state of one integrated scenario: the time
//! grid, the full 22-species state at every sample and the stepper statistics.
//! It is immutable once produced; accessors hand out per-species series or a dense
//! matrix for diagnostic consumers such as an external plotting tool.

use ndarray::Array2;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use super::stepper::{StepStatistics, StepperOutput};
use crate::species::{Species, N_SPECIES};

/// Sampled solution of one scenario.
///
/// # Fields
///
/// * `time` - Sample times in seconds
/// * `states` - State vectors in species slot order, one per sample
/// * `statistics` - Accepted/rejected step counters of the integration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    time: Vec<f64>,
    states: Vec<Vec<f64>>,
    statistics: StepStatistics,
}

impl From<StepperOutput> for Trajectory {
    fn from(output: StepperOutput) -> Self {
        Self {
            time: output.time,
            states: output.states,
            statistics: output.statistics,
        }
    }
}

impl Trajectory {
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn states(&self) -> &[Vec<f64>] {
        &self.states
    }

    pub fn statistics(&self) -> &StepStatistics {
        &self.statistics
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Concentration of `species` at every sample.
    pub fn species_series(&self, species: Species) -> Vec<f64> {
        self.states.iter().map(|row| row[species.index()]).collect()
    }

    /// Iterates `(time, state)` samples in order.
    pub fn samples(&self) -> impl Iterator<Item = (f64, &[f64])> + '_ {
        self.time
            .iter()
            .copied()
            .zip(self.states.iter().map(|s| s.as_slice()))
    }

    pub fn initial_state(&self) -> Option<&[f64]> {
        self.states.first().map(|s| s.as_slice())
    }

    pub fn final_state(&self) -> Option<&[f64]> {
        self.states.last().map(|s| s.as_slice())
    }

    /// Last sample of `species`.
    pub fn final_value(&self, species: Species) -> Option<f64> {
        self.final_state().map(|s| s[species.index()])
    }

    /// Largest concentration of `species` and the time it is reached.
    pub fn peak(&self, species: Species) -> Option<(f64, f64)> {
        self.samples()
            .map(|(t, state)| (t, state[species.index()]))
            .max_by_key(|(_, value)| OrderedFloat(*value))
    }

    /// Smallest concentration over all species and samples.
    pub fn min_concentration(&self) -> Option<f64> {
        self.states
            .iter()
            .flatten()
            .copied()
            .min_by_key(|value| OrderedFloat(*value))
    }

    /// Samples × species matrix of the full state.
    pub fn to_matrix(&self) -> Array2<f64> {
        let mut matrix = Array2::zeros((self.len(), N_SPECIES));
        for (i, row) in self.states.iter().enumerate() {
            for (j, value) in row.iter().enumerate().take(N_SPECIES) {
                matrix[(i, j)] = *value;
            }
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trajectory() -> Trajectory {
        let mut first = vec![0.0; N_SPECIES];
        first[Species::R.index()] = 0.5;
        let mut second = first.clone();
        second[Species::F.index()] = 0.1;
        second[Species::R.index()] = 0.4;
        let mut third = second.clone();
        third[Species::F.index()] = 0.3;
        third[Species::R.index()] = 0.2;

        StepperOutput {
            time: vec![0.0, 60.0, 120.0],
            states: vec![first, second, third],
            statistics: StepStatistics::default(),
        }
        .into()
    }

    #[test]
    fn test_species_series() {
        let trajectory = trajectory();
        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.species_series(Species::F), vec![0.0, 0.1, 0.3]);
        assert_eq!(trajectory.final_value(Species::R), Some(0.2));
    }

    #[test]
    fn test_peak_and_minimum() {
        let trajectory = trajectory();
        assert_eq!(trajectory.peak(Species::F), Some((120.0, 0.3)));
        assert_eq!(trajectory.peak(Species::R), Some((0.0, 0.5)));
        assert_eq!(trajectory.min_concentration(), Some(0.0));
    }

    #[test]
    fn test_to_matrix() {
        let matrix = trajectory().to_matrix();
        assert_eq!(matrix.shape(), &[3, N_SPECIES]);
        assert_eq!(matrix[(2, Species::F.index())], 0.3);
    }
}
