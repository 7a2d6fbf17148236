//! Deployment configuration
//!
//! One TOML file of named sections, one section per stack, each holding
//! plain string key/values (`aws_account`, `aws_region`, plus whatever the
//! stack needs). Loaded once in `main` and passed by reference into every
//! wiring function - no ambient global state.

use stackkit::EnvironmentTarget;
use std::fs;
use std::path::Path;
use thiserror::Error;
use toml::{Table, Value};

/// Errors that make a configuration unusable; all fatal at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required section is absent
    #[error("missing config section: [{0}]")]
    MissingSection(String),

    /// A required key is absent from its section
    #[error("missing config key: {0}.{1}")]
    MissingKey(String, String),

    /// A key is present but does not hold a string
    #[error("config key {0}.{1} is not a string")]
    NotAString(String, String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Parsed deployment configuration
#[derive(Debug)]
pub struct Config {
    sections: Table,
}

impl Config {
    /// Load and parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let sections = content.parse::<Table>()?;
        Ok(Self { sections })
    }

    fn section(&self, name: &str) -> Result<&Table> {
        match self.sections.get(name) {
            Some(Value::Table(table)) => Ok(table),
            _ => Err(ConfigError::MissingSection(name.to_string())),
        }
    }

    /// Read the exact stored string for `(section, key)`
    pub fn get(&self, section: &str, key: &str) -> Result<&str> {
        match self.section(section)?.get(key) {
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(ConfigError::NotAString(
                section.to_string(),
                key.to_string(),
            )),
            None => Err(ConfigError::MissingKey(
                section.to_string(),
                key.to_string(),
            )),
        }
    }

    /// Environment target from a section's `aws_account` / `aws_region`
    pub fn env_target(&self, section: &str) -> Result<EnvironmentTarget> {
        Ok(EnvironmentTarget::new(
            self.get(section, "aws_account")?,
            self.get(section, "aws_region")?,
        ))
    }

    /// Verify every named section exists
    ///
    /// Run before any resource declaration so a broken configuration aborts
    /// the run with nothing declared.
    pub fn require_sections(&self, names: &[&str]) -> Result<()> {
        for name in names {
            self.section(name)?;
        }
        Ok(())
    }
}
