use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::constants::RateConstants;
use crate::report::ObservableSeries;
use crate::simulation::runner::Simulator;
use crate::simulation::scenario::{default_scenarios, InitialAmounts, ScenarioSet};
use crate::simulation::setup::SimulationSetup;

/// Complete description of a simulation run as stored on disk.
///
/// Every section is optional in the file; missing sections fall back to the
/// reference assay (default constants, amounts, setup and the three default
/// scenarios).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub constants: RateConstants,
    pub amounts: InitialAmounts,
    pub setup: SimulationSetup,
    pub scenarios: ScenarioSet,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            constants: RateConstants::default(),
            amounts: InitialAmounts::default(),
            setup: SimulationSetup::default(),
            scenarios: default_scenarios(),
        }
    }
}

impl SimulationConfig {
    pub fn simulator(&self) -> Simulator {
        Simulator::new(self.constants, self.amounts, self.setup.clone())
    }
}

/// Loads and parses a simulation configuration from a JSON file.
///
/// # Arguments
///
/// * `path` - Path to the JSON file containing the configuration
///
/// # Errors
///
/// This function will return an error if:
/// * The file cannot be found or opened (`IOError::FileNotFound`)
/// * The file contents cannot be parsed as a configuration (`IOError::JsonParseError`)
pub fn load_config(path: impl Into<PathBuf>) -> Result<SimulationConfig, IOError> {
    let path = path.into();
    let file = std::fs::File::open(path).map_err(IOError::FileNotFound)?;
    serde_json::from_reader(file).map_err(IOError::JsonParseError)
}

/// Saves a simulation configuration to a JSON file.
pub fn save_config(path: impl Into<PathBuf>, config: &SimulationConfig) -> Result<(), IOError> {
    let path = path.into();
    let file = std::fs::File::create(path).map_err(IOError::FileNotFound)?;
    serde_json::to_writer_pretty(file, config).map_err(IOError::JsonParseError)
}

/// Loads a bare scenario set (scenario name to scenario) from a JSON file.
pub fn load_scenarios(path: impl Into<PathBuf>) -> Result<ScenarioSet, IOError> {
    let path = path.into();
    let file = std::fs::File::open(path).map_err(IOError::FileNotFound)?;
    serde_json::from_reader(file).map_err(IOError::JsonParseError)
}

/// Writes observable series, keyed by scenario name, as pretty JSON.
pub fn save_series(
    path: impl Into<PathBuf>,
    series: &std::collections::BTreeMap<String, ObservableSeries>,
) -> Result<(), IOError> {
    let path = path.into();
    let file = std::fs::File::create(path).map_err(IOError::FileNotFound)?;
    serde_json::to_writer_pretty(file, series).map_err(IOError::JsonParseError)
}

/// Represents errors that can occur while reading or writing run files.
#[derive(Error, Debug)]
pub enum IOError {
    /// The file could not be found, opened or created.
    #[error("File not found: {0}")]
    FileNotFound(#[from] std::io::Error),

    /// The file contents could not be parsed or serialized as JSON.
    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::simulation::scenario::TemplateAmount;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = SimulationConfig::default();
        save_config(&path, &config).unwrap();
        let loaded = load_config(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "setup": {{"t1": 600.0, "n_points": 11}},
                "scenarios": {{"FP only": {{"fp0": 0.4, "template": {{"copies": 120}}}}}}
            }}"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.setup.t1, 600.0);
        assert_eq!(config.setup.rtol, 1e-6);
        assert_eq!(config.constants, RateConstants::default());
        assert_eq!(config.scenarios.len(), 1);
        assert_eq!(
            config.scenarios["FP only"].template,
            TemplateAmount::Copies(120.0)
        );
    }

    #[test]
    fn test_load_scenarios() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"a": {{"bp0": 0.4}}, "b": {{"fpp0": 0.1, "k6": 0.5}}}}"#).unwrap();

        let scenarios = load_scenarios(file.path()).unwrap();
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios["b"].k6, 0.5);
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("does/not/exist.json");
        assert!(matches!(result, Err(IOError::FileNotFound(_))));
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            load_config(file.path()),
            Err(IOError::JsonParseError(_))
        ));
    }
}
