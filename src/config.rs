//! Configuration management for catalog drift checks
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (drift.toml)
//! - Environment variables (DRIFT__*)
//!
//! ## Example config file (drift.toml):
//! ```toml
//! [source]
//! name = "staging"
//! host = "staging-db.internal"
//! database = "shop"
//! user = "readonly"
//! password_env = "STAGING_DB_PASSWORD"
//!
//! [[targets]]
//! name = "prod-eu"
//! host = "prod-eu-db.internal"
//! port = 3307
//! database = "shop"
//! user = "readonly"
//! password_env = "PROD_EU_DB_PASSWORD"
//!
//! [reader]
//! connect_timeout_secs = 10
//! max_connections = 2
//!
//! [output]
//! format = "text"
//! pretty = true
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::profile::{ComparisonRequest, ConnectionProfile};
use crate::reader::ReaderOptions;
use crate::report::ReportFormat;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriftConfig {
    /// Reference database
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ConnectionProfile>,

    /// Databases checked against the source, in order
    #[serde(default)]
    pub targets: Vec<ConnectionProfile>,

    /// Catalog reader settings
    #[serde(default)]
    pub reader: ReaderOptions,

    /// Report settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: ReportFormat,

    /// Pretty-print JSON reports
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            pretty: true,
        }
    }
}

impl DriftConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = ["drift.toml", ".drift.toml", "config/drift.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "catalog-drift") {
            let xdg_config = config_dir.config_dir().join("drift.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("DRIFT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load only the given file, ignoring default locations and environment
    pub fn from_file(path: &Path) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file. Passwords are never written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Request comparing the configured source against the configured targets
    pub fn request(&self) -> ComparisonRequest {
        ComparisonRequest {
            source: self.source.clone(),
            targets: self.targets.clone(),
        }
    }

    /// Source followed by every target
    pub fn profiles(&self) -> Vec<ConnectionProfile> {
        self.source
            .iter()
            .chain(self.targets.iter())
            .cloned()
            .collect()
    }

    /// Starter configuration with placeholder connections
    pub fn example() -> Self {
        let mut source = ConnectionProfile::new("staging", "staging-db.internal", "app");
        source.password_env = Some("STAGING_DB_PASSWORD".to_string());
        let mut target = ConnectionProfile::new("production", "prod-db.internal", "app");
        target.password_env = Some("PROD_DB_PASSWORD".to_string());

        Self {
            source: Some(source),
            targets: vec![target],
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DriftConfig::default();
        assert!(config.source.is_none());
        assert_eq!(config.reader.connect_timeout_secs, 10);
        assert_eq!(config.output.format, ReportFormat::Text);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_serialize_config() {
        let config = DriftConfig::example();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[source]"));
        assert!(toml_str.contains("[[targets]]"));
        assert!(toml_str.contains("password_env"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drift.toml");
        std::fs::write(
            &path,
            r#"
[source]
name = "staging"
host = "db1"
database = "shop"
password = "secret"

[[targets]]
name = "prod-a"
host = "db2"
port = 3307
database = "shop"

[[targets]]
host = "db3"
database = "shop"

[output]
format = "json"
"#,
        )
        .unwrap();

        let config = DriftConfig::from_file(&path).unwrap();
        let source = config.source.as_ref().unwrap();
        assert_eq!(source.port, 3306);
        assert_eq!(source.user, "root");
        assert_eq!(source.password.as_deref(), Some("secret"));
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[0].port, 3307);
        assert_eq!(config.targets[1].label(), "db3:3306/shop");
        assert_eq!(config.output.format, ReportFormat::Json);
        assert!(config.request().validate().is_ok());
        assert_eq!(config.profiles().len(), 3);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drift.toml");
        std::fs::write(&path, "[[targets]]\nport = \"not a port\"\n").unwrap();

        let err = DriftConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, crate::error::DriftError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error"));

        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            DriftConfig::load_from(Some(&missing)),
            Err(crate::error::DriftError::Config(_))
        ));
    }

    #[test]
    fn test_save_round_trip_drops_passwords() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drift.toml");
        let mut config = DriftConfig::example();
        config.targets[0].password = Some("hunter2".to_string());
        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("hunter2"));

        let loaded = DriftConfig::from_file(&path).unwrap();
        assert_eq!(loaded.targets[0].host, "prod-db.internal");
        assert!(loaded.targets[0].password.is_none());
    }
}
