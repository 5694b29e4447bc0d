//! Configuration management for catalogue projection
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (catalogue.toml)
//! - Environment variables (CATALOGUE__*)
//!
//! ## Example config file (catalogue.toml):
//! ```toml
//! [projection]
//! missing_identifier = "deny"
//!
//! [export]
//! output_format = "compact"
//! include_checksum = true
//! include_timestamp = false
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::projection::{MissingIdentifierPolicy, ProjectionOptions};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogueConfig {
    /// Projection settings
    #[serde(default)]
    pub projection: ProjectionConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// Projection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// What to do with reachable nodes that need an identifier and lack one
    #[serde(default)]
    pub missing_identifier: MissingIdentifierPolicy,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output format (pretty or compact)
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Embed the document checksum
    #[serde(default = "default_true")]
    pub include_checksum: bool,

    /// Embed the generation timestamp
    #[serde(default = "default_true")]
    pub include_timestamp: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_true() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Pretty,
            include_checksum: true,
            include_timestamp: true,
        }
    }
}

impl CatalogueConfig {
    /// Load configuration from the default locations, with an optional
    /// explicit file on top
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "catalogue.toml",
            ".catalogue.toml",
            "config/catalogue.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("org", "iso19110", "catalogue") {
            let xdg_config = config_dir.config_dir().join("catalogue.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // CATALOGUE__PROJECTION__MISSING_IDENTIFIER=deny
        builder = builder.add_source(
            Environment::with_prefix("CATALOGUE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    pub fn projection_options(&self) -> ProjectionOptions {
        ProjectionOptions {
            missing_identifier: self.projection.missing_identifier,
        }
    }
}
