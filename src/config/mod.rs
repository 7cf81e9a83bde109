//! Configuration management for ImageScaler

use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::error::{Result, ScalerError};
use crate::processing::FilterType;

/// Largest accepted target dimension
pub const MAX_DIMENSION: u32 = 32768;

/// Work and completion queues hold this many items per worker
pub const QUEUE_SLOTS_PER_WORKER: usize = 2;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target geometry and input selection
    pub scale: ScaleConfig,

    /// Worker pool settings
    pub pipeline: PipelineConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Target geometry and input selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,

    /// File name suffix selecting eligible inputs (e.g. ".jpg")
    pub extension: String,

    /// Resampling filter
    pub filter: FilterType,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            extension: ".jpg".to_string(),
            filter: FilterType::Lanczos3,
        }
    }
}

/// Worker pool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of transform workers
    pub workers: usize,

    /// Interval of the ETA ticker in milliseconds
    pub eta_interval_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 6,
            eta_interval_ms: 1000,
        }
    }
}

impl PipelineConfig {
    /// Capacity of both bounded queues
    pub fn queue_capacity(&self) -> usize {
        self.workers.max(1) * QUEUE_SLOTS_PER_WORKER
    }

    /// ETA ticker period
    pub fn eta_interval(&self) -> Duration {
        Duration::from_millis(self.eta_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(ScalerError::config("Worker count must be greater than 0"));
        }
        if self.eta_interval_ms == 0 {
            return Err(ScalerError::config("ETA interval must be greater than 0"));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl ScaleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.width > MAX_DIMENSION
            || self.height == 0 || self.height > MAX_DIMENSION
        {
            return Err(ScalerError::invalid_parameters(format!(
                "Dimensions must be between 1-{}, got {}x{}",
                MAX_DIMENSION, self.width, self.height
            )));
        }
        if self.extension.is_empty() {
            return Err(ScalerError::config("Extension filter must not be empty"));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ScalerError::config(
                format!("Failed to read config file {:?}: {}", path.as_ref(), e)
            ))?;

        let extension = path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension.to_lowercase().as_str() {
            "toml" => toml::from_str(&content).map_err(Into::into),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(Into::into),
            _ => Err(ScalerError::config(
                "Unsupported config file format. Use .toml or .yaml"
            )),
        }
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let extension = path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let content = match extension.to_lowercase().as_str() {
            "toml" => toml::to_string_pretty(self)
                .map_err(|e| ScalerError::config(format!("TOML serialization failed: {}", e)))?,
            "yaml" | "yml" => serde_yaml::to_string(self)
                .map_err(|e| ScalerError::config(format!("YAML serialization failed: {}", e)))?,
            _ => return Err(ScalerError::config(
                "Unsupported config file format. Use .toml or .yaml"
            )),
        };

        std::fs::write(&path, content)
            .map_err(|e| ScalerError::config(
                format!("Failed to write config file {:?}: {}", path.as_ref(), e)
            ))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.scale.validate()?;
        self.pipeline.validate()?;
        Ok(())
    }
}
