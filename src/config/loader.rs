//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from YAML.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::ClosurePolicy;

use super::types::{AggregationConfig, EngineConfig, SweeperConfig};

/// Name of the configuration file inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "engine.yaml";

/// Loads and provides access to the engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/
/// └── engine.yaml   # sweeper, aggregation and closure settings
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config")?;
/// println!("Sweeping every {:?}", loader.sweeper().interval());
/// # Ok::<(), attendance_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads `engine.yaml` from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - The file is missing ([`EngineError::ConfigNotFound`])
    /// - The file contains invalid YAML ([`EngineError::ConfigParseError`])
    /// - A value is out of range ([`EngineError::InvalidConfig`])
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let config_path = path.as_ref().join(CONFIG_FILE_NAME);
        let path_str = config_path.display().to_string();

        let content = fs::read_to_string(&config_path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::parse(&content, &path_str)
    }

    /// Parses a configuration from a YAML string.
    pub fn from_yaml_str(content: &str) -> EngineResult<Self> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, source: &str) -> EngineResult<Self> {
        let config: EngineConfig =
            serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
                path: source.to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;

        tracing::debug!(
            source,
            interval_secs = config.sweeper.interval_secs,
            concurrency = config.sweeper.concurrency,
            "Loaded engine configuration"
        );
        Ok(Self { config })
    }

    /// Wraps an already-built configuration after validating it.
    pub fn from_config(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the sweeper settings.
    pub fn sweeper(&self) -> &SweeperConfig {
        &self.config.sweeper
    }

    /// Returns the aggregation settings.
    pub fn aggregation(&self) -> AggregationConfig {
        self.config.aggregation
    }

    /// Returns the closure policy for tenants without one of their own.
    pub fn default_closure_policy(&self) -> ClosurePolicy {
        self.config.closure.default_policy
    }
}
