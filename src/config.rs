use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::predict::{EngineConfig, GroundStation, PredictError};
use crate::tracker::Settings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("station: {0}")]
    Station(#[from] PredictError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub station: StationConfig,
    pub tle: TleConfig,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
}

impl StationConfig {
    pub fn ground_station(&self) -> Result<GroundStation, ConfigError> {
        Ok(GroundStation::from_coordinates(
            &self.coordinates,
            Some(self.altitude_m),
        )?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TleConfig {
    /// A TLE file or a directory of them.
    pub path: PathBuf,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.station.ground_station()?;
        Ok(config)
    }
}
