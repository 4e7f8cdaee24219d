//! Run configuration loaded from YAML

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration and credential-loading errors
///
/// All of these are fatal and reported before any fetch begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML
    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// input_dir does not exist or is not a directory
    #[error("Input directory '{0}' does not exist")]
    MissingInputDir(PathBuf),

    /// focus_file was configured but does not exist
    #[error("Focus file '{0}' does not exist")]
    MissingFocusFile(PathBuf),

    /// output_dir could not be created
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Credential directory could not be read
    #[error("Failed to read credential directory '{path}': {source}")]
    CredentialDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A credential file lacks a required field
    #[error("Credential file '{path}' is missing required field {field}")]
    MissingCredentialField { path: String, field: &'static str },

    /// No environment in input_dir yielded usable credentials
    #[error("No usable credential files found in '{0}'")]
    NoEnvironments(PathBuf),
}

impl ConfigError {
    /// Create an IO error with path context
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Run configuration loaded from a YAML file
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory containing one credential file per environment
    pub input_dir: PathBuf,

    /// Directory the CSV reports are written to (created if missing)
    pub output_dir: PathBuf,

    /// Optional focus rule file; without it every resource passes
    #[serde(default)]
    pub focus_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::io(path.display().to_string(), e))?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Validate paths and create the output directory.
    ///
    /// Fails fast so that no fetch is attempted when the run could not
    /// produce a complete report set anyway.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.input_dir.is_dir() {
            return Err(ConfigError::MissingInputDir(self.input_dir.clone()));
        }

        fs::create_dir_all(&self.output_dir).map_err(|e| ConfigError::OutputDir {
            path: self.output_dir.display().to_string(),
            source: e,
        })?;

        if let Some(focus_file) = &self.focus_file {
            if !focus_file.is_file() {
                return Err(ConfigError::MissingFocusFile(focus_file.clone()));
            }
        }

        Ok(())
    }
}
