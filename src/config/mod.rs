//! Configuration management for imgutil

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ImageUtilError, Result};
use crate::processing::{FilterType, Strictness};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resize option validation settings
    pub options: OptionsConfig,

    /// Image processing settings
    pub processing: ProcessingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// How raw resize options are validated
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    /// Reject (strict) or drop (lenient) unrecognized option keys
    pub strictness: Strictness,
}

/// Image processing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Resampling filter used by every resize mode
    pub filter: FilterType,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    pub level: String,

    /// Enable JSON logging
    pub json_format: bool,

    /// Log file path (None = stderr)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file: None,
        }
    }
}

/// Policy for fitting an image into the requested bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Fit inside the box, then pad to the exact box size
    Contain,
    /// Cover the whole box, cropping the overflow
    Cover,
    /// Stretch to the exact box size, ignoring aspect ratio
    Fill,
    /// Fit inside the box without padding
    #[default]
    Fit,
}

impl ResizeMode {
    /// Every supported resize mode, in canonical order
    pub const ALL: [ResizeMode; 4] = [Self::Contain, Self::Cover, Self::Fill, Self::Fit];

    /// Lowercase name of the mode
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contain => "contain",
            Self::Cover => "cover",
            Self::Fill => "fill",
            Self::Fit => "fit",
        }
    }
}

impl fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResizeMode {
    type Err = ImageUtilError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == value)
            .ok_or_else(|| {
                ImageUtilError::validation(format!("Invalid image resize mode: '{}'!", value))
            })
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ImageUtilError::config(format!(
                "Failed to read config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        match config_extension(path.as_ref()).as_str() {
            "toml" => toml::from_str(&content).map_err(Into::into),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(Into::into),
            _ => Err(ImageUtilError::config(
                "Unsupported config file format. Use .toml or .yaml",
            )),
        }
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = match config_extension(path.as_ref()).as_str() {
            "toml" => toml::to_string_pretty(self).map_err(|e| {
                ImageUtilError::config(format!("TOML serialization failed: {}", e))
            })?,
            "yaml" | "yml" => serde_yaml::to_string(self).map_err(|e| {
                ImageUtilError::config(format!("YAML serialization failed: {}", e))
            })?,
            _ => {
                return Err(ImageUtilError::config(
                    "Unsupported config file format. Use .toml or .yaml",
                ))
            }
        };

        std::fs::write(&path, content).map_err(|e| {
            ImageUtilError::config(format!(
                "Failed to write config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.logging.level.trim().is_empty() {
            return Err(ImageUtilError::config("Log level must not be empty"));
        }

        if let Some(file) = &self.logging.file {
            if file.as_os_str().is_empty() {
                return Err(ImageUtilError::config("Log file path must not be empty"));
            }
        }

        Ok(())
    }
}

fn config_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase()
}
