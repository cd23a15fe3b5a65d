//! Configuration for fixture checking
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (fixtures.toml)
//! - Environment variables (FIXTURES__*)
//!
//! ## Example config file (fixtures.toml):
//! ```toml
//! [compiler]
//! max_depth = 10
//! unknown_keys = "allow"
//!
//! [output]
//! format = "pretty"
//! fail_on_warnings = false
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::compiler::CompileOptions;
use crate::error::Result;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Compiler settings
    #[serde(default)]
    pub compiler: CompileOptions,

    /// CLI output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON layout for written reports and exported schemas
    #[serde(default)]
    pub format: OutputFormat,

    /// Treat compile warnings as a failed check
    #[serde(default)]
    pub fail_on_warnings: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl OutputFormat {
    pub fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        Ok(match self {
            Self::Pretty => serde_json::to_string_pretty(value)?,
            Self::Compact => serde_json::to_string(value)?,
        })
    }
}

impl FixtureConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a required file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = ["fixtures.toml", ".fixtures.toml", "config/fixtures.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from platform config directory
        if let Some(dirs) = directories::ProjectDirs::from("dev", "familiar", "fixtures") {
            let user_config = dirs.config_dir().join("fixtures.toml");
            if user_config.exists() {
                builder = builder.add_source(File::from(user_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // FIXTURES__COMPILER__MAX_DEPTH=4
        builder = builder.add_source(
            Environment::with_prefix("FIXTURES")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
