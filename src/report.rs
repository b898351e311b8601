//! Reporter
//!
//! Extracts the observable of a run (by default the fluorescent product `F`) from
//! completed trajectories, as `(time, value)` pairs ready for an external plotting
//! tool, and renders a per-scenario summary table for the terminal.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tabled::{builder::Builder, settings::Style};

use crate::simulation::error::SimulationError;
use crate::simulation::result::Trajectory;
use crate::simulation::runner::BatchResult;
use crate::species::Species;

/// Unit of the reported time axis. Trajectories are integrated in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Seconds,
    #[default]
    Minutes,
}

impl TimeUnit {
    pub fn from_seconds(self, t: f64) -> f64 {
        match self {
            TimeUnit::Seconds => t,
            TimeUnit::Minutes => t / 60.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeUnit::Seconds => "s",
            TimeUnit::Minutes => "min",
        }
    }
}

/// Time series of one observable species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservableSeries {
    pub species: Species,
    pub time_unit: TimeUnit,
    pub points: Vec<(f64, f64)>,
}

impl ObservableSeries {
    pub fn times(&self) -> Vec<f64> {
        self.points.iter().map(|(t, _)| *t).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, v)| *v).collect()
    }

    pub fn last(&self) -> Option<(f64, f64)> {
        self.points.last().copied()
    }

    /// Whether no sample drops below its predecessor by more than `tolerance`.
    pub fn is_non_decreasing(&self, tolerance: f64) -> bool {
        self.points
            .iter()
            .tuple_windows()
            .all(|((_, a), (_, b))| *b >= *a - tolerance)
    }

    /// First time at which the series reaches half of its final value.
    pub fn time_to_half_max(&self) -> Option<f64> {
        let (_, final_value) = self.last()?;
        if final_value <= 0.0 {
            return None;
        }
        self.points
            .iter()
            .find(|(_, value)| *value >= 0.5 * final_value)
            .map(|(t, _)| *t)
    }
}

/// Extracts observables from trajectories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reporter {
    pub observable: Species,
    pub time_unit: TimeUnit,
}

impl Default for Reporter {
    fn default() -> Self {
        Self {
            observable: Species::F,
            time_unit: TimeUnit::Minutes,
        }
    }
}

impl Reporter {
    pub fn new(observable: Species, time_unit: TimeUnit) -> Self {
        Self {
            observable,
            time_unit,
        }
    }

    /// Observable of a single trajectory.
    pub fn series(&self, trajectory: &Trajectory) -> ObservableSeries {
        let points = trajectory
            .samples()
            .map(|(t, state)| {
                (
                    self.time_unit.from_seconds(t),
                    state[self.observable.index()],
                )
            })
            .collect();

        ObservableSeries {
            species: self.observable,
            time_unit: self.time_unit,
            points,
        }
    }

    /// Observables of every successful scenario of a batch.
    pub fn collect(&self, results: &BatchResult) -> BTreeMap<String, ObservableSeries> {
        results
            .iter()
            .filter_map(|(name, result)| {
                result
                    .as_ref()
                    .ok()
                    .map(|trajectory| (name.clone(), self.series(trajectory)))
            })
            .collect()
    }

    /// Per-scenario summary of a batch.
    pub fn summarize(&self, results: &BatchResult) -> BatchSummary {
        let rows = results
            .iter()
            .map(|(name, result)| match result {
                Ok(trajectory) => {
                    let series = self.series(trajectory);
                    SummaryRow {
                        scenario: name.clone(),
                        status: Status::Completed,
                        final_value: series.last().map(|(_, v)| v),
                        time_to_half_max: series.time_to_half_max(),
                        accepted_steps: Some(trajectory.statistics().accepted),
                        rejected_steps: Some(trajectory.statistics().rejected),
                        message: None,
                    }
                }
                Err(error) => SummaryRow::failed(name, error, self),
            })
            .collect();

        BatchSummary {
            observable: self.observable,
            time_unit: self.time_unit,
            rows,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Completed,
    Invalid,
    Failed,
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Completed => write!(f, "completed"),
            Status::Invalid => write!(f, "invalid"),
            Status::Failed => write!(f, "failed"),
        }
    }
}

/// One line of a [`BatchSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub scenario: String,
    pub status: Status,
    pub final_value: Option<f64>,
    pub time_to_half_max: Option<f64>,
    pub accepted_steps: Option<usize>,
    pub rejected_steps: Option<usize>,
    pub message: Option<String>,
}

impl SummaryRow {
    fn failed(name: &str, error: &SimulationError, reporter: &Reporter) -> Self {
        let status = match error {
            SimulationError::IntegrationFailure { .. } => Status::Failed,
            _ => Status::Invalid,
        };
        // A failed integration still reports how far it got
        let partial = error.partial_trajectory().map(|t| reporter.series(t));

        SummaryRow {
            scenario: name.to_string(),
            status,
            final_value: partial.as_ref().and_then(|s| s.last()).map(|(_, v)| v),
            time_to_half_max: None,
            accepted_steps: error.partial_trajectory().map(|t| t.statistics().accepted),
            rejected_steps: error.partial_trajectory().map(|t| t.statistics().rejected),
            message: Some(error.to_string()),
        }
    }
}

/// Tabular summary of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub observable: Species,
    pub time_unit: TimeUnit,
    pub rows: Vec<SummaryRow>,
}

impl BatchSummary {
    pub fn completed(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.status == Status::Completed)
            .count()
    }
}

impl Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_opt = |value: Option<f64>| value.map_or("-".to_string(), |v| format!("{v:.4e}"));
        let fmt_count = |value: Option<usize>| value.map_or("-".to_string(), |v| v.to_string());

        let mut builder = Builder::default();
        builder.push_record(vec![
            "Scenario".to_string(),
            "Status".to_string(),
            format!("{} (end) [μM]", self.observable),
            format!("t½ [{}]", self.time_unit.label()),
            "Accepted".to_string(),
            "Rejected".to_string(),
        ]);

        for row in &self.rows {
            builder.push_record(vec![
                row.scenario.clone(),
                row.status.to_string(),
                fmt_opt(row.final_value),
                row.time_to_half_max
                    .map_or("-".to_string(), |t| format!("{t:.2}")),
                fmt_count(row.accepted_steps),
                fmt_count(row.rejected_steps),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        write!(f, "{table}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::stepper::{StepStatistics, StepperOutput};
    use crate::species::N_SPECIES;

    fn trajectory(f_values: &[f64]) -> Trajectory {
        let states = f_values
            .iter()
            .map(|f| {
                let mut state = vec![0.0; N_SPECIES];
                state[Species::F.index()] = *f;
                state[Species::R.index()] = 0.5 - f;
                state
            })
            .collect();
        let time = (0..f_values.len()).map(|i| 60.0 * i as f64).collect();

        StepperOutput {
            time,
            states,
            statistics: StepStatistics {
                accepted: 10,
                rejected: 2,
                rhs_evaluations: 73,
            },
        }
        .into()
    }

    #[test]
    fn test_series_in_minutes() {
        let series = Reporter::default().series(&trajectory(&[0.0, 0.1, 0.2]));
        assert_eq!(series.points, vec![(0.0, 0.0), (1.0, 0.1), (2.0, 0.2)]);
        assert_eq!(series.species, Species::F);
    }

    #[test]
    fn test_series_of_other_species_in_seconds() {
        let reporter = Reporter::new(Species::R, TimeUnit::Seconds);
        let series = reporter.series(&trajectory(&[0.0, 0.25]));
        assert_eq!(series.times(), vec![0.0, 60.0]);
        assert_eq!(series.values(), vec![0.5, 0.25]);
    }

    #[test]
    fn test_monotonicity_and_half_max() {
        let series = Reporter::default().series(&trajectory(&[0.0, 0.1, 0.3, 0.4]));
        assert!(series.is_non_decreasing(0.0));
        assert_eq!(series.time_to_half_max(), Some(2.0));

        let dipping = Reporter::default().series(&trajectory(&[0.0, 0.2, 0.1]));
        assert!(!dipping.is_non_decreasing(1e-12));

        let flat = Reporter::default().series(&trajectory(&[0.0, 0.0]));
        assert_eq!(flat.time_to_half_max(), None);
    }

    #[test]
    fn test_collect_and_summary_skip_failures() {
        let mut results = BatchResult::new();
        results.insert("ok".to_string(), Ok(trajectory(&[0.0, 0.2])));
        results.insert(
            "bad".to_string(),
            Err(SimulationError::InvalidScenario {
                scenario: "bad".to_string(),
                reason: "negative".to_string(),
            }),
        );

        let reporter = Reporter::default();
        let collected = reporter.collect(&results);
        assert_eq!(collected.keys().collect::<Vec<_>>(), vec!["ok"]);

        let summary = reporter.summarize(&results);
        assert_eq!(summary.completed(), 1);
        let bad = summary.rows.iter().find(|r| r.scenario == "bad").unwrap();
        assert_eq!(bad.status, Status::Invalid);
        assert!(bad.message.as_deref().unwrap().contains("negative"));

        let rendered = summary.to_string();
        assert!(rendered.contains("Scenario"));
        assert!(rendered.contains("completed"));
        assert!(rendered.contains("invalid"));
    }
}
