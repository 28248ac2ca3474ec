//! Error types for catalog comparison

use thiserror::Error;

/// Result type for drift operations
pub type Result<T> = std::result::Result<T, DriftError>;

/// Boxed cause carried by a [`ConnectivityError`]
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A database could not be reached, authenticated against, or read.
#[derive(Error, Debug)]
#[error("cannot read {database} at {host}:{port}: {cause}")]
pub struct ConnectivityError {
    pub host: String,
    pub port: u16,
    pub database: String,
    #[source]
    pub cause: Cause,
}

impl ConnectivityError {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        cause: impl Into<Cause>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            cause: cause.into(),
        }
    }
}

/// Catalog drift errors
#[derive(Error, Debug)]
pub enum DriftError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to connect to source database {profile}: {source}")]
    SourceUnavailable {
        profile: String,
        source: ConnectivityError,
    },

    #[error("Failed to connect to target database {target}: {source}")]
    TargetUnavailable {
        target: String,
        source: ConnectivityError,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl DriftError {
    /// Label of the connection profile that caused the failure, if any
    pub fn profile_label(&self) -> Option<&str> {
        match self {
            DriftError::SourceUnavailable { profile, .. } => Some(profile),
            DriftError::TargetUnavailable { target, .. } => Some(target),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_error_names_target() {
        let err = DriftError::TargetUnavailable {
            target: "prod-replica".to_string(),
            source: ConnectivityError::new("db2", 3306, "shop", "connection refused"),
        };
        let message = err.to_string();
        assert!(message.contains("prod-replica"));
        assert!(message.contains("db2:3306"));
        assert!(message.contains("connection refused"));
        assert_eq!(err.profile_label(), Some("prod-replica"));
    }

    #[test]
    fn test_connectivity_error_exposes_cause() {
        use std::error::Error as _;
        let err = ConnectivityError::new("localhost", 3307, "shop", "unknown database");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("unknown database"));
    }
}
